use thiserror::Error;

use super::{
    conversion::{self, Conversion, ForbiddenReason, WarningKind},
    type_set::TypeSet,
    types::{Type, TypeId, TypeOperator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    Identical,
    ImplicitConversion,
    ExplicitConversion,
    PatternMatching,
    /// Implicit conversion that ignores array dimension sizes.
    Generic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonFlags {
    /// The candidate is the argument list of a function call.
    pub function_call: bool,
}

impl ComparisonFlags {
    pub fn function_call() -> Self {
        ComparisonFlags {
            function_call: true,
        }
    }
}

/// Why two types did not compare equal. `Display` gives the diagnostic text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    #[error("Unable to convert from \"{from}\" to \"{to}\".")]
    Unconvertible { from: String, to: String },
    #[error("Unable to convert from \"{from}\" to \"{to}\". Attempting to assign larger constant to smaller variable.")]
    LargerConstant { from: String, to: String },
    #[error("Unable to convert from \"{from}\" to \"{to}\". An implicit conversion already happened.")]
    AfterImplicitConversion { from: String, to: String },
    #[error("Array mismatch at type comparison.")]
    ArrayMismatch,
    #[error("Array member type mismatch. \"{from}\" != \"{to}\".")]
    ArrayMemberMismatch { from: String, to: String },
    #[error("Mismatch at the size of the {ordinal} array dimension {from} != {to}.")]
    ArrayDimensionMismatch { ordinal: String, from: u64, to: u64 },
}

/// A conversion that succeeded but deserves the user's attention.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    #[error("Implicit conversion from \"{from}\" to \"{to}\" during assignment.")]
    Narrowing { from: String, to: String },
    #[error("Implicit signed to unsigned conversion from \"{from}\" to \"{to}\" during assignment.")]
    SignedToUnsigned { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub success: bool,
    /// The sum operand the candidate was matched to, if a sum was involved.
    pub matched_type: Option<TypeId>,
    pub mismatch: Option<Mismatch>,
    pub warnings: Vec<ConversionWarning>,
}

impl ComparisonResult {
    /// The mismatch text prefixed with a space, or an empty string.
    pub fn reason_suffix(&self) -> String {
        match &self.mismatch {
            Some(mismatch) => format!(" {}", mismatch),
            None => String::new(),
        }
    }
}

/// Compares the candidate `from` against the destination `to`.
pub fn compare(
    set: &TypeSet,
    from: TypeId,
    to: TypeId,
    mode: ComparisonMode,
    flags: ComparisonFlags,
) -> ComparisonResult {
    let mut comparator = Comparator {
        set,
        mode,
        flags,
        warnings: vec![],
        mismatch: None,
        matched: None,
        converted_across: false,
    };

    let success = comparator.equals(from, to);
    comparator.finish(success)
}

/// Structural equality, ignoring constness.
pub fn identical(set: &TypeSet, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }

    match (set.get(a), set.get(b)) {
        (Type::Elementary { kind: k1, .. }, Type::Elementary { kind: k2, .. }) => k1 == k2,
        (
            Type::Operator {
                op: o1,
                operands: a1,
            },
            Type::Operator {
                op: o2,
                operands: a2,
            },
        ) => o1 == o2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| identical(set, *x, *y)),
        (Type::Leaf { name: n1, ty: t1 }, Type::Leaf { name: n2, ty: t2 })
        | (Type::Defined { name: n1, ty: t1 }, Type::Defined { name: n2, ty: t2 }) => {
            n1 == n2 && identical(set, *t1, *t2)
        }
        (
            Type::Array {
                member: m1,
                dimensions: d1,
            },
            Type::Array {
                member: m2,
                dimensions: d2,
            },
        ) => d1 == d2 && identical(set, *m1, *m2),
        (Type::Function { arg: a1, ret: r1 }, Type::Function { arg: a2, ret: r2 }) => {
            identical(set, *a1, *a2) && identical(set, *r1, *r2)
        }
        (Type::Wildcard, Type::Wildcard) => true,
        _ => false,
    }
}

/// English ordinal of a 1-based position: 1st, 2nd, 3rd, 4th, 11th, 21st.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

struct Comparator<'a> {
    set: &'a TypeSet,
    mode: ComparisonMode,
    flags: ComparisonFlags,
    warnings: Vec<ConversionWarning>,
    mismatch: Option<Mismatch>,
    matched: Option<TypeId>,
    /// An argument only fit a sum operand through a cross-category conversion.
    converted_across: bool,
}

impl Comparator<'_> {
    fn finish(self, success: bool) -> ComparisonResult {
        if success {
            return ComparisonResult {
                success,
                matched_type: self.matched,
                mismatch: None,
                warnings: self.warnings,
            };
        }

        let mismatch = match self.mismatch {
            Some(Mismatch::Unconvertible { from, to }) if self.converted_across => {
                Some(Mismatch::AfterImplicitConversion { from, to })
            }
            other => other,
        };

        ComparisonResult {
            success,
            matched_type: None,
            mismatch,
            warnings: vec![],
        }
    }

    fn equals(&mut self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        if self.mode == ComparisonMode::Identical {
            return identical(self.set, from, to);
        }

        let set = self.set;
        match (set.get(from), set.get(to)) {
            // A single wildcard stands for one element, never a whole product
            (
                Type::Wildcard,
                Type::Operator {
                    op: TypeOperator::Product,
                    ..
                },
            ) if self.mode == ComparisonMode::PatternMatching => false,
            (Type::Wildcard, _) | (_, Type::Wildcard) => true,
            (Type::Leaf { ty, .. }, _) => self.equals(*ty, to),
            (_, Type::Leaf { ty, .. }) => self.equals(from, *ty),
            (Type::Defined { name: n1, .. }, Type::Defined { name: n2, .. }) if n1 == n2 => true,
            // Patterns name a defined type, they never stand for its contents
            (Type::Defined { .. }, _) | (_, Type::Defined { .. })
                if self.mode == ComparisonMode::PatternMatching && !self.is_sum(to) =>
            {
                self.unconvertible(from, to);
                false
            }
            (Type::Defined { ty, .. }, _) if self.mode != ComparisonMode::PatternMatching => self.equals(*ty, to),
            (_, Type::Defined { ty, .. }) if self.mode != ComparisonMode::PatternMatching => self.equals(from, *ty),
            (
                Type::Operator {
                    op: TypeOperator::Sum,
                    operands: sources,
                },
                Type::Operator {
                    op: TypeOperator::Sum,
                    operands: targets,
                },
            ) => sources.iter().all(|source| self.sum_walk(*source, targets)),
            (
                _,
                Type::Operator {
                    op: TypeOperator::Sum,
                    operands,
                },
            ) => self.sum_walk(from, operands),
            (
                Type::Operator {
                    op: TypeOperator::Sum,
                    operands,
                },
                _,
            ) => operands.iter().all(|operand| self.equals(*operand, to)),
            (
                Type::Operator {
                    op: o1,
                    operands: a1,
                },
                Type::Operator {
                    op: o2,
                    operands: a2,
                },
            ) => {
                o1 == o2
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2).all(|(x, y)| self.equals(*x, *y))
            }
            (Type::Elementary { .. }, Type::Elementary { .. }) => self.elementary(from, to),
            (
                Type::Array {
                    member: m1,
                    dimensions: d1,
                },
                Type::Array {
                    member: m2,
                    dimensions: d2,
                },
            ) => self.arrays((*m1, d1), (*m2, d2)),
            (Type::Function { arg: a1, ret: r1 }, Type::Function { arg: a2, ret: r2 }) => {
                self.equals(*a1, *a2) && self.equals(*r1, *r2)
            }
            (Type::Operator { .. }, _) | (_, Type::Operator { .. }) => false,
            _ => {
                self.unconvertible(from, to);
                false
            }
        }
    }

    /// Finds the operand of a sum that `from` can stand for, preferring an
    /// identical operand over a convertible one.
    fn sum_walk(&mut self, from: TypeId, operands: &[TypeId]) -> bool {
        let stripped = self.set.strip_leaf(from);
        if let Some(operand) = operands
            .iter()
            .find(|operand| identical(self.set, stripped, self.set.strip_leaf(**operand)))
        {
            self.matched = Some(*operand);
            return true;
        }

        for operand in operands {
            let mark = self.warnings.len();
            self.mismatch = None;

            if self.equals(from, *operand) {
                self.matched = Some(*operand);
                return true;
            }
            self.warnings.truncate(mark);
        }

        false
    }

    fn elementary(&mut self, from: TypeId, to: TypeId) -> bool {
        let set = self.set;
        let (
            Type::Elementary {
                kind: from_kind,
                is_constant,
            },
            Type::Elementary { kind: to_kind, .. },
        ) = (set.get(from), set.get(to))
        else {
            return false;
        };

        if from_kind == to_kind {
            return true;
        }

        let conversion = match self.mode {
            ComparisonMode::PatternMatching if !self.flags.function_call => {
                return false;
            }
            ComparisonMode::ExplicitConversion => conversion::explicit(*from_kind, *to_kind, *is_constant),
            _ => conversion::implicit(*from_kind, *to_kind, *is_constant),
        };

        match conversion {
            Conversion::Forbidden(reason) => {
                let (from, to) = (set.to_string(from), set.to_string(to));
                self.mismatch = Some(match reason {
                    ForbiddenReason::Incompatible => Mismatch::Unconvertible { from, to },
                    ForbiddenReason::LargerConstant => Mismatch::LargerConstant { from, to },
                });
                false
            }
            _ if self.mode == ComparisonMode::PatternMatching
                && !conversion::same_category(*from_kind, *to_kind) =>
            {
                self.converted_across = true;
                false
            }
            Conversion::AllowedWithWarning(kinds) => {
                for kind in kinds {
                    let (from, to) = (set.to_string(from), set.to_string(to));
                    self.warnings.push(match kind {
                        WarningKind::SignedToUnsigned => ConversionWarning::SignedToUnsigned { from, to },
                        WarningKind::Narrowing => ConversionWarning::Narrowing { from, to },
                    });
                }
                true
            }
            Conversion::Allowed => true,
        }
    }

    fn arrays(&mut self, from: (TypeId, &Vec<Option<u64>>), to: (TypeId, &Vec<Option<u64>>)) -> bool {
        let (from_member, from_dimensions) = from;
        let (to_member, to_dimensions) = to;

        if from_dimensions.len() != to_dimensions.len() {
            self.mismatch = Some(Mismatch::ArrayMismatch);
            return false;
        }

        if self.mode != ComparisonMode::Generic {
            let sizes_fit = from_dimensions
                .iter()
                .zip(to_dimensions)
                .all(|(from, to)| to.is_none() || from == to);

            if !sizes_fit {
                self.mismatch = Some(Mismatch::ArrayMismatch);
                return false;
            }
        }

        self.equals(from_member, to_member)
    }

    fn is_sum(&self, ty: TypeId) -> bool {
        matches!(
            self.set.get(ty),
            Type::Operator {
                op: TypeOperator::Sum,
                ..
            }
        )
    }

    fn unconvertible(&mut self, from: TypeId, to: TypeId) {
        self.mismatch = Some(Mismatch::Unconvertible {
            from: self.set.to_string(from),
            to: self.set.to_string(to),
        });
    }
}
