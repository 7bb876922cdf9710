//! Table of conversions between elementary kinds.

use super::types::ElementaryKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Allowed,
    AllowedWithWarning(Vec<WarningKind>),
    Forbidden(ForbiddenReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    SignedToUnsigned,
    Narrowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    Incompatible,
    LargerConstant,
}

/// Conversion applied silently by assignments, returns and calls.
pub fn implicit(from: ElementaryKind, to: ElementaryKind, is_constant: bool) -> Conversion {
    if from == to {
        return Conversion::Allowed;
    }

    match (from, to) {
        (ElementaryKind::Nil, _) | (_, ElementaryKind::Nil) => {
            Conversion::Forbidden(ForbiddenReason::Incompatible)
        }
        (ElementaryKind::String, _) | (_, ElementaryKind::String) => {
            Conversion::Forbidden(ForbiddenReason::Incompatible)
        }
        (ElementaryKind::Bool, to) if to.is_integer() => Conversion::Allowed,
        (from, ElementaryKind::Bool) if from.is_integer() => Conversion::Allowed,
        (from, to) if from.is_integer() && to.is_integer() => integer_to_integer(from, to, is_constant),
        (from, to) if from.is_integer() && to.is_float() => Conversion::Allowed,
        (from, to) if from.is_float() && to.is_float() => Conversion::Allowed,
        _ => Conversion::Forbidden(ForbiddenReason::Incompatible),
    }
}

fn integer_to_integer(from: ElementaryKind, to: ElementaryKind, is_constant: bool) -> Conversion {
    if is_constant {
        return match (from.bit_width(), to.bit_width()) {
            (Some(from_width), Some(to_width)) if to_width < from_width => {
                Conversion::Forbidden(ForbiddenReason::LargerConstant)
            }
            _ => Conversion::Allowed,
        };
    }

    let mut warnings = vec![];
    if from.is_signed() && to.is_unsigned() {
        warnings.push(WarningKind::SignedToUnsigned);
    }
    if to < from {
        warnings.push(WarningKind::Narrowing);
    }

    if warnings.is_empty() {
        Conversion::Allowed
    } else {
        Conversion::AllowedWithWarning(warnings)
    }
}

/// Conversion requested with `T(value)`.
pub fn explicit(from: ElementaryKind, to: ElementaryKind, is_constant: bool) -> Conversion {
    if from == to {
        return Conversion::Allowed;
    }

    let castable = |kind: ElementaryKind| kind.is_numeric() || kind == ElementaryKind::Bool;
    if castable(from) && castable(to) {
        return Conversion::Allowed;
    }

    if to == ElementaryKind::String && from != ElementaryKind::Nil && is_constant {
        return Conversion::Allowed;
    }

    Conversion::Forbidden(ForbiddenReason::Incompatible)
}

/// Whether an implicit conversion keeps the value in the same family
/// (integer to integer, integer to float, float to float).
pub fn same_category(from: ElementaryKind, to: ElementaryKind) -> bool {
    (from.is_integer() && to.is_numeric()) || (from.is_float() && to.is_float())
}
