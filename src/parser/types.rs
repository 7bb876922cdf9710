//! Type description parsing.
//!
//! Type descriptions appear in `type` declarations, function signatures,
//! variable declarations and match patterns. They use their own Pratt tables:
//!
//! - `->` implication, right associative and loosest
//! - `|` sum
//! - `,` product
//! - `name:type` leaves and `_` wildcards
//! - `[N]` / `[]` array specifiers, tightest
//!
//! Parentheses group as usual.

use std::collections::HashMap;

use crate::{
    ast::ast::{NodeId, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    types::types::TypeOperator,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<NodeId, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, NodeId, BindingPower) -> Result<NodeId, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenParen, parse_grouping_type);

    parser.type_led(TokenKind::Arrow, BindingPower::Relational, parse_operator_type);
    parser.type_led(TokenKind::Pipe, BindingPower::Additive, parse_operator_type);
    parser.type_led(TokenKind::Comma, BindingPower::Multiplicative, parse_operator_type);
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
}

/// Parses a type name, a `_` wildcard or a `name:type` leaf.
pub fn parse_symbol_type(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    if token.value == "_" {
        return Ok(parser.add(NodeKind::TypeWildcard, token.span));
    }

    if parser.current_token_kind() != TokenKind::Colon {
        return Ok(parser.add(NodeKind::TypeName { name: token.value }, token.span));
    }

    parser.advance();
    let ty = parse_type(parser, BindingPower::Unary)?;
    let span = token.span.to(parser.span_of(ty));

    Ok(parser.add(
        NodeKind::TypeLeaf {
            name: token.value,
            ty,
        },
        span,
    ))
}

pub fn parse_grouping_type(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let inner = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(inner)
}

pub fn parse_operator_type(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    let operator = parser.advance().clone();
    let (op, right_bp) = match operator.kind {
        TokenKind::Comma => (TypeOperator::Product, bp),
        TokenKind::Pipe => (TypeOperator::Sum, bp),
        // Implication associates to the right
        _ => (TypeOperator::Implication, BindingPower::Logical),
    };

    let right = parse_type(parser, right_bp)?;
    let span = parser.span_of(left).to(parser.span_of(right));

    Ok(parser.add(NodeKind::TypeOperator { op, left, right }, span))
}

/// Parses one or more consecutive `[N]` / `[]` specifiers after a member type.
pub fn parse_array_type(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    let mut dimensions = vec![];

    while parser.current_token_kind() == TokenKind::OpenBracket {
        parser.advance();

        if parser.current_token_kind() == TokenKind::Integer {
            let token = parser.advance().clone();
            let size = token.value.parse::<u64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )
            })?;
            dimensions.push(Some(size));
        } else {
            dimensions.push(None);
        }

        parser.expect(TokenKind::CloseBracket)?;
    }

    let span = parser.span_from(&parser.span_of(left).start.clone());
    Ok(parser.add(NodeKind::TypeArray { member: left, dimensions }, span))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(parser.unexpected("expected a type description"));
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        let led = match parser.get_type_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected("expected a type operator")),
        };
        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}
