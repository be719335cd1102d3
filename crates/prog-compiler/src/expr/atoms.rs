//! Atomic expressions and postfix indexing.

use prog_types::{Container, TypeDescriptor, Value};

use super::{ExprParser, pratt};
use crate::ast::{Expr, ExprKind};
use crate::catalog::ArgInfo;
use crate::error::CompileError;
use crate::lexer::Token;

/// Parse an atom followed by any number of `[index]` suffixes.
pub(super) fn parse_postfix(parser: &mut ExprParser<'_>) -> Result<Expr, CompileError> {
    let mut expr = parse_atom(parser)?;
    while parser.stream.check(&Token::LBracket) {
        parser.stream.advance();
        let index = pratt::parse_pratt(parser, 0)?;
        parser.stream.expect(Token::RBracket)?;
        expr = index_into(parser, expr, index)?;
    }
    Ok(expr)
}

fn index_into(parser: &ExprParser<'_>, target: Expr, index: Expr) -> Result<Expr, CompileError> {
    let (key_type, result) = match target.ty.container() {
        Container::Scalar => {
            return Err(parser.error(format!("cannot index into {}", target.ty.without_literal())));
        }
        Container::Sequence => (TypeDescriptor::NUMBER, target.ty.element()),
        Container::Mapping => (TypeDescriptor::TEXT, target.ty.element()),
        Container::MultiMapping => (
            TypeDescriptor::TEXT,
            TypeDescriptor::sequence_of(target.ty.base()),
        ),
    };
    if !index.ty.compatible_with(&key_type) {
        return Err(parser.error(format!(
            "{} index must be {}, found {}",
            target.ty.without_literal(),
            key_type,
            index.ty.without_literal()
        )));
    }
    Ok(Expr::new(
        ExprKind::Index {
            target: Box::new(target),
            index: Box::new(index),
        },
        result,
    ))
}

fn parse_atom(parser: &mut ExprParser<'_>) -> Result<Expr, CompileError> {
    let Some(token) = parser.stream.advance() else {
        return Err(parser.error("expected an expression, found end of line"));
    };

    match token {
        Token::Number(n) => Ok(literal(Value::number(*n))),
        Token::Text(s) => Ok(literal(Value::text(s.clone()))),
        Token::True => Ok(literal(Value::boolean(true))),
        Token::False => Ok(literal(Value::boolean(false))),
        Token::Null => parse_null(parser),
        Token::LParen => {
            let inner = pratt::parse_pratt(parser, 0)?;
            parser.stream.expect(Token::RParen)?;
            Ok(inner)
        }
        Token::At => parse_prog_call(parser),
        Token::Ident(name) => {
            if parser.stream.check(&Token::LParen) {
                parse_function_call(parser, name)
            } else {
                let ty = parser
                    .space
                    .get(name)
                    .ok_or_else(|| parser.error(format!("unknown variable '{}'", name)))?;
                Ok(Expr::new(ExprKind::Variable(name.to_ascii_lowercase()), ty))
            }
        }
        other => Err(parser.error(format!("unexpected '{}' in expression", other))),
    }
}

fn literal(value: Value) -> Expr {
    let ty = value.ty().as_literal();
    Expr::new(ExprKind::Literal(value), ty)
}

/// `null(<type>)` - a typed null constant.
fn parse_null(parser: &mut ExprParser<'_>) -> Result<Expr, CompileError> {
    parser.stream.expect(Token::LParen)?;
    let start = parser.stream.current_pos();
    while !parser.stream.check(&Token::RParen) {
        if parser.stream.advance().is_none() {
            return Err(parser.error("expected ')' to close null(...)"));
        }
    }
    let end = parser.stream.current_pos();
    parser.stream.advance();

    let text = parser.stream.text_between(start, end);
    let ty = TypeDescriptor::parse(text).map_err(|err| parser.error(err.to_string()))?;
    if ty.is_void() {
        return Err(parser.error("null cannot be of type void"));
    }
    let ty = ty.without_literal();
    Ok(Expr::new(ExprKind::Literal(Value::null(ty)), ty.as_literal()))
}

/// Parenthesised, comma-separated arguments. The opening paren is next.
fn parse_arguments(parser: &mut ExprParser<'_>) -> Result<Vec<Expr>, CompileError> {
    parser.stream.expect(Token::LParen)?;
    let mut args = Vec::new();
    if parser.stream.check(&Token::RParen) {
        parser.stream.advance();
        return Ok(args);
    }
    loop {
        let arg = pratt::parse_pratt(parser, 0)?;
        if arg.ty.is_void() {
            return Err(parser.error("a void call cannot be used as an argument"));
        }
        args.push(arg);
        match parser.stream.advance() {
            Some(Token::Comma) => continue,
            Some(Token::RParen) => break,
            Some(other) => {
                return Err(parser.error(format!("expected ',' or ')', found '{}'", other)));
            }
            None => return Err(parser.error("expected ')' to close the argument list")),
        }
    }
    Ok(args)
}

fn parse_function_call(parser: &mut ExprParser<'_>, name: &str) -> Result<Expr, CompileError> {
    let args = parse_arguments(parser)?;
    let infos: Vec<ArgInfo> = args
        .iter()
        .map(|arg| ArgInfo {
            ty: arg.ty,
            literal_text: arg.literal_text().map(str::to_string),
        })
        .collect();

    let binding = parser
        .env
        .functions
        .resolve(name, &infos, parser.env.registers)
        .map_err(|message| parser.error(message))?;

    Ok(Expr::new(
        ExprKind::Call {
            function: binding.id,
            name: name.to_ascii_lowercase(),
            args,
        },
        binding.return_type.without_literal(),
    ))
}

/// `@name(args)` - a call to another prog.
fn parse_prog_call(parser: &mut ExprParser<'_>) -> Result<Expr, CompileError> {
    let name = match parser.stream.advance() {
        Some(Token::Ident(name)) => name.clone(),
        Some(other) => return Err(parser.error(format!("expected a prog name after '@', found '{}'", other))),
        None => return Err(parser.error("expected a prog name after '@'")),
    };
    let signature = parser
        .env
        .progs
        .signature(&name)
        .ok_or_else(|| parser.error(format!("unknown prog '{}'", name)))?;

    let args = parse_arguments(parser)?;
    // Surplus arguments are only allowed when the callee opts in; the
    // declared parameters keep their types either way.
    if !signature.accepts_any_parameters && args.len() > signature.parameters.len() {
        return Err(parser.error(format!(
            "prog '{}' takes {} argument(s), {} given",
            signature.name,
            signature.parameters.len(),
            args.len()
        )));
    }
    for (arg, param) in args.iter().zip(&signature.parameters) {
        if !arg.ty.compatible_with(&param.ty) {
            return Err(parser.error(format!(
                "argument '{}' of prog '{}' must be {}, found {}",
                param.name,
                signature.name,
                param.ty,
                arg.ty.without_literal()
            )));
        }
    }

    Ok(Expr::new(
        ExprKind::ProgCall {
            prog: signature.id,
            name: signature.name,
            args,
        },
        signature.return_type.without_literal(),
    ))
}
