use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref ELEMENTARY_LOOKUP: HashMap<&'static str, ElementaryKind> = {
        let mut map = HashMap::new();
        for kind in ElementaryKind::ALL {
            map.insert(kind.name(), kind);
        }
        map
    };
}

/// Handle of a type inside a [`TypeSet`](super::type_set::TypeSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Built-in primitive types. Integer kinds are declared in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementaryKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Int,
    UInt,
    F32,
    F64,
    String,
    Bool,
    Nil,
}

impl ElementaryKind {
    pub const ALL: [ElementaryKind; 15] = [
        ElementaryKind::I8,
        ElementaryKind::U8,
        ElementaryKind::I16,
        ElementaryKind::U16,
        ElementaryKind::I32,
        ElementaryKind::U32,
        ElementaryKind::I64,
        ElementaryKind::U64,
        ElementaryKind::Int,
        ElementaryKind::UInt,
        ElementaryKind::F32,
        ElementaryKind::F64,
        ElementaryKind::String,
        ElementaryKind::Bool,
        ElementaryKind::Nil,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ElementaryKind::I8 => "i8",
            ElementaryKind::U8 => "u8",
            ElementaryKind::I16 => "i16",
            ElementaryKind::U16 => "u16",
            ElementaryKind::I32 => "i32",
            ElementaryKind::U32 => "u32",
            ElementaryKind::I64 => "i64",
            ElementaryKind::U64 => "u64",
            ElementaryKind::Int => "int",
            ElementaryKind::UInt => "uint",
            ElementaryKind::F32 => "f32",
            ElementaryKind::F64 => "f64",
            ElementaryKind::String => "string",
            ElementaryKind::Bool => "bool",
            ElementaryKind::Nil => "nil",
        }
    }

    pub fn from_name(name: &str) -> Option<ElementaryKind> {
        ELEMENTARY_LOOKUP.get(name).copied()
    }

    /// Narrowest unsigned kind able to hold an integer literal.
    pub fn for_literal(value: u64) -> ElementaryKind {
        if value <= u8::MAX as u64 {
            ElementaryKind::U8
        } else if value <= u16::MAX as u64 {
            ElementaryKind::U16
        } else if value <= u32::MAX as u64 {
            ElementaryKind::U32
        } else {
            ElementaryKind::U64
        }
    }

    pub fn is_integer(&self) -> bool {
        *self <= ElementaryKind::UInt
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            ElementaryKind::I8
                | ElementaryKind::I16
                | ElementaryKind::I32
                | ElementaryKind::I64
                | ElementaryKind::Int
        )
    }

    pub fn is_unsigned(&self) -> bool {
        self.is_integer() && !self.is_signed()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementaryKind::F32 | ElementaryKind::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Size in bits, `None` for string and nil.
    /// Largest value a signed integer kind holds.
    pub fn signed_max(&self) -> Option<u64> {
        match (self.is_signed(), self.bit_width()) {
            (true, Some(width)) => Some((1u64 << (width - 1)) - 1),
            _ => None,
        }
    }

    pub fn bit_width(&self) -> Option<u32> {
        match self {
            ElementaryKind::Bool => Some(1),
            ElementaryKind::I8 | ElementaryKind::U8 => Some(8),
            ElementaryKind::I16 | ElementaryKind::U16 => Some(16),
            ElementaryKind::I32 | ElementaryKind::U32 | ElementaryKind::F32 => Some(32),
            ElementaryKind::I64
            | ElementaryKind::U64
            | ElementaryKind::Int
            | ElementaryKind::UInt
            | ElementaryKind::F64 => Some(64),
            ElementaryKind::String | ElementaryKind::Nil => None,
        }
    }

    /// Signed kind of the same width, used for negated unsigned constants.
    pub fn to_signed(&self) -> ElementaryKind {
        match self {
            ElementaryKind::U8 => ElementaryKind::I8,
            ElementaryKind::U16 => ElementaryKind::I16,
            ElementaryKind::U32 => ElementaryKind::I32,
            ElementaryKind::U64 => ElementaryKind::I64,
            ElementaryKind::UInt => ElementaryKind::Int,
            other => *other,
        }
    }
}

impl Display for ElementaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeOperator {
    Implication,
    Sum,
    Product,
}

impl TypeOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            TypeOperator::Implication => "->",
            TypeOperator::Sum => "|",
            TypeOperator::Product => ",",
        }
    }
}

/// The shape of a type. Children are handles into the same set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Elementary {
        kind: ElementaryKind,
        is_constant: bool,
    },
    Operator {
        op: TypeOperator,
        operands: Vec<TypeId>,
    },
    /// A named field, `a:i32`.
    Leaf {
        name: String,
        ty: TypeId,
    },
    Defined {
        name: String,
        ty: TypeId,
    },
    /// `None` dimensions are unspecified (`u64[]`).
    Array {
        member: TypeId,
        dimensions: Vec<Option<u64>>,
    },
    Function {
        arg: TypeId,
        ret: TypeId,
    },
    Wildcard,
}
