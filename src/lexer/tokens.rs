use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("module", TokenKind::Module);
        map.insert("import", TokenKind::Import);
        map.insert("type", TokenKind::Type);
        map.insert("fn", TokenKind::Fn);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("match", TokenKind::Match);
        map.insert("class", TokenKind::Class);
        map.insert("instance", TokenKind::Instance);
        map.insert("as", TokenKind::As);
        map.insert("default", TokenKind::Default);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    Float,
    String,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=
    FatArrow,   // =>

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,
    Pipe,

    Dot,
    Semicolon,
    Colon,
    Comma,
    Arrow,

    PlusPlus,
    MinusMinus,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Module,
    Import,
    Type,
    Fn,
    Return,
    If,
    Elif,
    Else,
    For,
    In,
    Match,
    Class,
    Instance,
    As,
    Default,
    True,
    False,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::String | TokenKind::Identifier | TokenKind::Integer | TokenKind::Float => {
                write!(f, "{} ({})", self.kind, self.value)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}
