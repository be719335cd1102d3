//! Pratt parser core - precedence climbing plus operator typing.

use prog_types::{PayloadKind, TypeDescriptor};

use super::{ExprParser, atoms};
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::error::CompileError;
use crate::lexer::Token;

/// Source-level binary operators before typing picks the runtime operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
}

/// Binding power of each binary operator; higher binds tighter. All are
/// left-associative.
fn binary_op_info(token: &Token) -> Option<(u8, SourceOp)> {
    match token {
        Token::Or => Some((10, SourceOp::Or)),
        Token::And => Some((20, SourceOp::And)),
        Token::EqEq => Some((30, SourceOp::Eq)),
        Token::BangEq => Some((30, SourceOp::Ne)),
        Token::Lt => Some((30, SourceOp::Lt)),
        Token::LtEq => Some((30, SourceOp::Le)),
        Token::Gt => Some((30, SourceOp::Gt)),
        Token::GtEq => Some((30, SourceOp::Ge)),
        Token::Plus | Token::PlusWord => Some((40, SourceOp::Plus)),
        Token::Minus | Token::MinusWord => Some((40, SourceOp::Minus)),
        Token::Star | Token::Times => Some((50, SourceOp::Mul)),
        Token::Slash => Some((50, SourceOp::Div)),
        Token::Percent | Token::Mod => Some((50, SourceOp::Mod)),
        _ => None,
    }
}

pub(super) fn parse_pratt(parser: &mut ExprParser<'_>, min_prec: u8) -> Result<Expr, CompileError> {
    let mut left = parse_prefix(parser)?;

    while let Some(token) = parser.stream.peek() {
        let Some((prec, op)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        parser.stream.advance();
        let right = parse_pratt(parser, prec + 1)?;
        left = type_binary(parser, op, left, right)?;
    }

    Ok(left)
}

fn parse_prefix(parser: &mut ExprParser<'_>) -> Result<Expr, CompileError> {
    match parser.stream.peek() {
        Some(Token::Not) => {
            parser.stream.advance();
            let operand = parse_prefix(parser)?;
            if !is_scalar_kind(&operand.ty, PayloadKind::Boolean) {
                return Err(parser.error(format!("'not' needs a boolean, found {}", operand.ty)));
            }
            let ty = keep_literal(TypeDescriptor::BOOLEAN, &[&operand]);
            Ok(unary(UnaryOp::Not, operand, ty))
        }
        Some(Token::Minus | Token::MinusWord) => {
            parser.stream.advance();
            let operand = parse_prefix(parser)?;
            let ty = if is_scalar_kind(&operand.ty, PayloadKind::Number) {
                TypeDescriptor::NUMBER
            } else if is_scalar_kind(&operand.ty, PayloadKind::TimeSpan) {
                TypeDescriptor::TIMESPAN
            } else {
                return Err(parser.error(format!("cannot negate {}", operand.ty)));
            };
            let ty = keep_literal(ty, &[&operand]);
            Ok(unary(UnaryOp::Neg, operand, ty))
        }
        _ => atoms::parse_postfix(parser),
    }
}

fn unary(op: UnaryOp, operand: Expr, ty: TypeDescriptor) -> Expr {
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
    )
}

fn is_scalar_kind(ty: &TypeDescriptor, kind: PayloadKind) -> bool {
    ty.is_scalar() && ty.base().payload_kind() == kind
}

/// Results of operations on literals stay literal.
fn keep_literal(ty: TypeDescriptor, operands: &[&Expr]) -> TypeDescriptor {
    if operands.iter().all(|e| e.ty.is_literal()) {
        ty.as_literal()
    } else {
        ty
    }
}

fn type_binary(
    parser: &ExprParser<'_>,
    op: SourceOp,
    left: Expr,
    right: Expr,
) -> Result<Expr, CompileError> {
    use PayloadKind as K;

    let (lt, rt) = (left.ty, right.ty);
    if lt.is_void() || rt.is_void() {
        return Err(parser.error("a void call cannot be used as a value"));
    }
    let kinds = if lt.is_scalar() && rt.is_scalar() {
        Some((lt.base().payload_kind(), rt.base().payload_kind()))
    } else {
        None
    };

    let typed = match (op, kinds) {
        (SourceOp::And, Some((K::Boolean, K::Boolean))) => Some((BinaryOp::And, TypeDescriptor::BOOLEAN)),
        (SourceOp::Or, Some((K::Boolean, K::Boolean))) => Some((BinaryOp::Or, TypeDescriptor::BOOLEAN)),

        (SourceOp::Eq | SourceOp::Ne, _)
            if lt.compatible_with(&rt) || rt.compatible_with(&lt) =>
        {
            let op = if op == SourceOp::Eq { BinaryOp::Eq } else { BinaryOp::Ne };
            Some((op, TypeDescriptor::BOOLEAN))
        }

        (SourceOp::Lt | SourceOp::Le | SourceOp::Gt | SourceOp::Ge, Some((a, b)))
            if a == b && matches!(a, K::Number | K::Text | K::DateTime | K::TimeSpan) =>
        {
            let op = match op {
                SourceOp::Lt => BinaryOp::Lt,
                SourceOp::Le => BinaryOp::Le,
                SourceOp::Gt => BinaryOp::Gt,
                _ => BinaryOp::Ge,
            };
            Some((op, TypeDescriptor::BOOLEAN))
        }

        (SourceOp::Plus, Some((K::Text, _)) | Some((_, K::Text))) => {
            Some((BinaryOp::Concat, TypeDescriptor::TEXT))
        }
        (SourceOp::Plus, Some((K::Number, K::Number))) => Some((BinaryOp::Add, TypeDescriptor::NUMBER)),
        (SourceOp::Plus, Some((K::DateTime, K::TimeSpan) | (K::TimeSpan, K::DateTime))) => {
            Some((BinaryOp::Add, TypeDescriptor::DATETIME))
        }
        (SourceOp::Plus, Some((K::TimeSpan, K::TimeSpan))) => Some((BinaryOp::Add, TypeDescriptor::TIMESPAN)),

        (SourceOp::Minus, Some((K::Number, K::Number))) => Some((BinaryOp::Sub, TypeDescriptor::NUMBER)),
        (SourceOp::Minus, Some((K::DateTime, K::TimeSpan))) => Some((BinaryOp::Sub, TypeDescriptor::DATETIME)),
        (SourceOp::Minus, Some((K::DateTime, K::DateTime))) => Some((BinaryOp::Sub, TypeDescriptor::TIMESPAN)),
        (SourceOp::Minus, Some((K::TimeSpan, K::TimeSpan))) => Some((BinaryOp::Sub, TypeDescriptor::TIMESPAN)),

        (SourceOp::Mul, Some((K::Number, K::Number))) => Some((BinaryOp::Mul, TypeDescriptor::NUMBER)),
        (SourceOp::Mul, Some((K::TimeSpan, K::Number) | (K::Number, K::TimeSpan))) => {
            Some((BinaryOp::Mul, TypeDescriptor::TIMESPAN))
        }

        (SourceOp::Div, Some((K::Number, K::Number))) => Some((BinaryOp::Div, TypeDescriptor::NUMBER)),
        (SourceOp::Div, Some((K::TimeSpan, K::Number))) => Some((BinaryOp::Div, TypeDescriptor::TIMESPAN)),
        (SourceOp::Div, Some((K::TimeSpan, K::TimeSpan))) => Some((BinaryOp::Div, TypeDescriptor::NUMBER)),

        (SourceOp::Mod, Some((K::Number, K::Number))) => Some((BinaryOp::Mod, TypeDescriptor::NUMBER)),

        _ => None,
    };

    let Some((op_kind, ty)) = typed else {
        return Err(parser.error(format!(
            "operator {:?} cannot combine {} and {}",
            op,
            lt.without_literal(),
            rt.without_literal()
        )));
    };

    let ty = keep_literal(ty, &[&left, &right]);
    Ok(Expr::new(
        ExprKind::Binary {
            op: op_kind,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
    ))
}
