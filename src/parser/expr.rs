use crate::{
    ast::{
        ast::{IfBranch, NodeId, NodeKind},
        expressions::{BinaryOperator, UnaryOperator},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser, stmt::parse_block_stmt, types::parse_type};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.current_token().span.start.clone(),
            ));
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs.
    // An operator on a new line starts the next statement instead.
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);
        if token_bp <= bp || !parser.on_line_of(&parser.previous_end()) {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.span_of(left).start.clone(),
                ));
            }
        };
        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.current_token().clone();

    let kind = match token.kind {
        TokenKind::Integer => match token.value.parse::<u64>() {
            Ok(value) => NodeKind::Integer { value },
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::Float => match token.value.parse::<f64>() {
            Ok(value) => NodeKind::Float { value },
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::Identifier => NodeKind::Identifier {
            name: token.value.clone(),
        },
        TokenKind::String => NodeKind::String {
            value: token.value.clone(),
        },
        TokenKind::True => NodeKind::Bool { value: true },
        TokenKind::False => NodeKind::Bool { value: false },
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    parser.advance();
    Ok(parser.add(kind, token.span))
}

pub fn parse_binary_expr(parser: &mut Parser, left: NodeId, bp: BindingPower) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();
    let op = match BinaryOperator::from_token(operator_token.kind) {
        Some(op) => op,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;
    let span = parser.span_of(left).to(parser.span_of(right));

    Ok(parser.add(NodeKind::Binary { op, left, right }, span))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();
    let op = match UnaryOperator::prefix_from_token(operator_token.kind) {
        Some(op) => op,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;
    let span = operator_token.span.to(parser.span_of(operand));

    Ok(parser.add(NodeKind::Unary { op, operand }, span))
}

pub fn parse_postfix_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();
    let op = match UnaryOperator::postfix_from_token(operator_token.kind) {
        Some(op) => op,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let span = parser.span_of(left).to(&operator_token.span);
    Ok(parser.add(NodeKind::Unary { op, operand: left }, span))
}

pub fn parse_assignment_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.advance();

    // Assignment associates to the right
    let value = parse_expr(parser, BindingPower::Comma)?;
    let span = parser.span_of(left).to(parser.span_of(value));

    Ok(parser.add(NodeKind::Assignment { target: left, value }, span))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses a comma separated list of expressions up to `close`.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<NodeId>, Error> {
    let mut members = vec![];

    while parser.current_token_kind() != close {
        if !parser.has_tokens() {
            return Err(parser.unexpected("unterminated list"));
        }

        members.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != close {
            return Err(parser.unexpected("expected `,` between list items"));
        }
    }

    parser.expect(close)?;
    Ok(members)
}

pub fn parse_call_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let args = parse_expr_list(parser, TokenKind::CloseParen)?;

    let span = parser.span_from(&parser.span_of(left).start.clone());
    Ok(parser.add(NodeKind::Call { callee: left, args }, span))
}

pub fn parse_index_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(&parser.span_of(left).start.clone());
    Ok(parser.add(NodeKind::Index { object: left, index }, span))
}

pub fn parse_member_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.expect(TokenKind::Dot)?;

    let error = parser.unexpected("expected member name after `.`");
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let member = parser.add(
        NodeKind::Identifier {
            name: token.value.clone(),
        },
        token.span.clone(),
    );

    let span = parser.span_of(left).to(&token.span);
    Ok(parser.add(NodeKind::Member { object: left, member }, span))
}

/// `name:type`, valid only directly after an identifier.
pub fn parse_var_decl_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    let name = match parser.ast().identifier_name(left) {
        Some(name) => name.to_string(),
        None => return Err(parser.unexpected("a variable declaration needs a plain identifier")),
    };

    parser.expect(TokenKind::Colon)?;
    let ty = parse_type(parser, BindingPower::Unary)?;
    let span = parser.span_of(left).to(parser.span_of(ty));

    Ok(parser.add(NodeKind::VarDecl { name, ty }, span))
}

pub fn parse_bracket_list_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;
    let members = parse_expr_list(parser, TokenKind::CloseBracket)?;

    let span = parser.span_from(&start);
    Ok(parser.add(NodeKind::BracketList { members }, span))
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;

    let mut branches = vec![];
    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_stmt(parser)?;
    branches.push(IfBranch { condition, body });

    while parser.current_token_kind() == TokenKind::Elif {
        parser.advance();
        let condition = parse_expr(parser, BindingPower::Default)?;
        let body = parse_block_stmt(parser)?;
        branches.push(IfBranch { condition, body });
    }

    let otherwise = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_block_stmt(parser)?)
    } else {
        None
    };

    let span = parser.span_from(&start);
    Ok(parser.add(NodeKind::If { branches, otherwise }, span))
}

pub fn parse_for_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::For)?.span.start;

    let error = parser.unexpected("expected the loop variable after `for`");
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let variable = parser.add(NodeKind::Identifier { name: token.value }, token.span);

    parser.expect(TokenKind::In)?;
    let iterable = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block_stmt(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.add(
        NodeKind::For {
            variable,
            iterable,
            body,
        },
        span,
    ))
}

/// `PATTERN => expr` or `PATTERN => { ... }`.
pub fn parse_match_case(parser: &mut Parser) -> Result<NodeId, Error> {
    let pattern = parse_type(parser, BindingPower::Default)?;

    let error = parser.unexpected("expected `=>` after a match pattern");
    parser.expect_error(TokenKind::FatArrow, Some(error))?;

    let body = if parser.current_token_kind() == TokenKind::OpenCurly {
        parse_block_stmt(parser)?
    } else {
        parse_expr(parser, BindingPower::Default)?
    };

    let span = parser.span_of(pattern).to(parser.span_of(body));
    Ok(parser.add(NodeKind::MatchCase { pattern, body }, span))
}

pub fn parse_match_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Match)?.span.start;
    let subject = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::OpenCurly)?;
    let mut cases = vec![];

    loop {
        while matches!(
            parser.current_token_kind(),
            TokenKind::Comma | TokenKind::Semicolon
        ) {
            parser.advance();
        }

        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => return Err(parser.unexpected("unterminated match expression")),
            _ => cases.push(parse_match_case(parser)?),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    let span = parser.span_from(&start);
    Ok(parser.add(
        NodeKind::Match {
            subject: Some(subject),
            cases,
        },
        span,
    ))
}
