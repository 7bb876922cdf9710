use crate::{
    ast::ast::{GenericParam, NodeId, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{expr::parse_match_case, parser::Parser, types::parse_type};

/// Skips optional `;` statement separators.
pub fn skip_separators(parser: &mut Parser) {
    while parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
    }
}

pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    parse_expr(parser, BindingPower::Default)
}

/// Parses statements until the closing `}` of the enclosing construct.
fn parse_stmts_until_close(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    let mut statements = vec![];

    skip_separators(parser);
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}`"));
        }

        statements.push(parse_stmt(parser)?);
        skip_separators(parser);
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(statements)
}

/// `module NAME { ... }`, only accepted at the top level of a file.
pub fn parse_module_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Module)?.span.start;

    let error = parser.unexpected("expected module name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenCurly)?;
    let body = parse_stmts_until_close(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.add(NodeKind::Module { name, body }, span))
}

pub fn parse_nested_module_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.advance().clone();
    let name = if parser.current_token_kind() == TokenKind::Identifier {
        parser.current_token().value.clone()
    } else {
        token.value
    };

    Err(Error::new(ErrorImpl::NestedModule { name }, token.span.start))
}

pub fn parse_import_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Import)?.span.start;

    let error = parser.unexpected("expected module name after `import`");
    let module = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let span = parser.span_from(&start);
    Ok(parser.add(NodeKind::Import { module }, span))
}

pub fn parse_type_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Type)?.span.start;

    let error = parser.unexpected("expected type name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenCurly)?;
    let description = parse_type(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseCurly)?;

    let span = parser.span_from(&start);
    Ok(parser.add(NodeKind::TypeDecl { name, description }, span))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;
    let statements = parse_stmts_until_close(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.add(NodeKind::Block { statements }, span))
}

/// Whether a `PATTERN => ...` case starts at the current token.
fn case_follows(parser: &Parser) -> bool {
    let line = parser.current_token().span.start.line;

    for offset in 0.. {
        let token = parser.peek(offset);
        if token.span.start.line != line {
            return false;
        }

        match token.kind {
            TokenKind::FatArrow => return true,
            TokenKind::OpenCurly | TokenKind::CloseCurly | TokenKind::EOF => return false,
            _ => {}
        }
    }

    false
}

/// `fn NAME(ARGS) [-> RET]` followed by a block, a bare list of match cases,
/// or nothing at all for a signature.
pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Fn)?.span.start;

    let error = parser.unexpected("expected function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;
    let args = if parser.current_token_kind() == TokenKind::CloseParen {
        None
    } else {
        Some(parse_type(parser, BindingPower::Default)?)
    };
    parser.expect(TokenKind::CloseParen)?;

    let ret = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = if parser.current_token_kind() == TokenKind::OpenCurly {
        Some(parse_block_stmt(parser)?)
    } else if case_follows(parser) {
        let cases_start = parser.current_token().span.start.clone();
        let mut cases = vec![];
        while case_follows(parser) {
            cases.push(parse_match_case(parser)?);
            skip_separators(parser);
        }

        let span = parser.span_from(&cases_start);
        Some(parser.add(NodeKind::Match { subject: None, cases }, span))
    } else {
        None
    };

    let span = parser.span_from(&start);
    Ok(parser.add(
        NodeKind::FnDecl {
            name,
            args,
            ret,
            body,
        },
        span,
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.expect(TokenKind::Return)?;

    let has_value = parser.on_line_of(&token.span.start)
        && !matches!(
            parser.current_token_kind(),
            TokenKind::CloseCurly | TokenKind::Semicolon | TokenKind::EOF
        );
    let value = if has_value {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let span = parser.span_from(&token.span.start);
    Ok(parser.add(NodeKind::Return { value }, span))
}

/// Parses the `{ fn ... }` body shared by typeclasses and their instances.
fn parse_method_list(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    parser.expect(TokenKind::OpenCurly)?;
    let mut methods = vec![];

    skip_separators(parser);
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if parser.current_token_kind() != TokenKind::Fn {
            return Err(parser.unexpected("expected a function declaration"));
        }

        methods.push(parse_fn_decl_stmt(parser)?);
        skip_separators(parser);
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(methods)
}

/// `class NAME <Type T> { fn ... }`
pub fn parse_typeclass_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Class)?.span.start;

    let error = parser.unexpected("expected typeclass name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let mut generics = vec![];
    if parser.current_token_kind() == TokenKind::Less {
        parser.advance();
        loop {
            let kind = parser.expect(TokenKind::Identifier)?.value;
            let name = parser.expect(TokenKind::Identifier)?.value;
            generics.push(GenericParam { kind, name });

            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
            } else {
                break;
            }
        }
        parser.expect(TokenKind::Greater)?;
    }

    let methods = parse_method_list(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.add(
        NodeKind::Typeclass {
            name,
            generics,
            methods,
        },
        span,
    ))
}

/// `instance CLASS TYPE [as NAME] [default] { fn ... }`
pub fn parse_instance_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect(TokenKind::Instance)?.span.start;

    let error = parser.unexpected("expected typeclass name");
    let class = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    let error = parser.unexpected("expected the instantiated type name");
    let type_name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let alias = if parser.current_token_kind() == TokenKind::As {
        parser.advance();
        Some(parser.expect(TokenKind::Identifier)?.value)
    } else {
        None
    };

    let is_default = parser.current_token_kind() == TokenKind::Default;
    if is_default {
        parser.advance();
    }

    let methods = parse_method_list(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.add(
        NodeKind::TypeInstance {
            class,
            type_name,
            alias,
            is_default,
            methods,
        },
        span,
    ))
}
