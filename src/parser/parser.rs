//! Parser implementation for building the syntax tree.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//! - Type description handlers

use std::{collections::HashMap, rc::Rc};

use tracing::debug;

use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::{parse_module_stmt, parse_stmt, skip_separators},
    types::{create_token_type_lookups, TypeBPLookup, TypeLEDHandler, TypeLEDLookup, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, terminated by an EOF token
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Arena receiving the parsed nodes
    ast: Ast,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
    type_led_lookup: TypeLEDLookup,
    type_binding_power_lookup: TypeBPLookup,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position::new(0, 0, Rc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span::new(end.clone(), end),
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            ast: Ast::new(),
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            type_led_lookup: HashMap::new(),
            type_binding_power_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the token `n` positions ahead of the current one.
    pub fn peek(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(&mut self, expected_kind: TokenKind, error: Option<Error>) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// An `UnexpectedTokenDetailed` error at the current token.
    pub fn unexpected(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from(message),
            },
            token.span.start.clone(),
        )
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Whether the current token starts on the same line as `position`.
    pub fn on_line_of(&self, position: &Position) -> bool {
        self.current_token().span.start.line == position.line
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_bp_lookup(&self) -> &TypeBPLookup {
        &self.type_binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    pub fn get_type_led_lookup(&self) -> &TypeLEDLookup {
        &self.type_led_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Prefix handlers do not touch the binding power table, so a token that
    /// only starts expressions ends the expression before it.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type left denotation handler.
    pub fn type_led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: TypeLEDHandler) {
        self.type_binding_power_lookup.insert(kind, binding_power);
        self.type_led_lookup.insert(kind, led_fn);
    }

    /// Registers a type null denotation handler.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// End position of the last consumed token.
    pub fn previous_end(&self) -> Position {
        let index = self.pos.saturating_sub(1);
        self.tokens[index].span.end.clone()
    }

    /// Span starting at `start` and ending at the last consumed token.
    pub fn span_from(&self, start: &Position) -> Span {
        Span::new(start.clone(), self.previous_end())
    }

    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.add(kind, span)
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn span_of(&self, node: NodeId) -> &Span {
        self.ast.span(node)
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    pub fn into_ast(self) -> Ast {
        self.ast
    }
}

/// Parses a stream of tokens into a syntax tree.
///
/// Top-level statements become children of a `Root` node. `module` blocks
/// are only accepted here.
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> Result<Ast, Error> {
    let mut parser = Parser::new(tokens, Rc::clone(&file));
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let start = parser.current_token().span.start.clone();
    let mut children = vec![];

    skip_separators(&mut parser);
    while parser.has_tokens() {
        let child = if parser.current_token_kind() == TokenKind::Module {
            parse_module_stmt(&mut parser)?
        } else {
            parse_stmt(&mut parser)?
        };
        children.push(child);
        skip_separators(&mut parser);
    }

    let span = if children.is_empty() {
        Span::new(start.clone(), start)
    } else {
        parser.span_from(&start)
    };
    let root = parser.add(NodeKind::Root { children }, span);

    let mut ast = parser.into_ast();
    ast.set_root(root);

    debug!(file = %file, nodes = ast.len(), "Parsed source");
    Ok(ast)
}
