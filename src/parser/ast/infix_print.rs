//! Fully-parenthesized infix printer. Every binary, unary, assignment and
//! ternary expression is wrapped in parentheses so the output's
//! parenthesization is an unambiguous record of the parser's precedence and
//! associativity decisions — this is the testable property the value-model
//! and parser sections of the design rely on (`2 ** 3 ** 2` must print as
//! `(2 ** (3 ** 2))`, not as a looser rendering that merely round-trips).

use super::{AssignOp, BinaryOp, CastKind, Expr, UnaryOp};

/// Render `expr` as a fully-parenthesized infix expression.
pub fn print_expr(expr: &Expr<'_>, source: &[u8]) -> String {
    let mut out = String::new();
    write_expr(expr, source, &mut out);
    out
}

fn write_expr(expr: &Expr<'_>, source: &[u8], out: &mut String) {
    match expr {
        Expr::Integer { value, .. } | Expr::Float { value, .. } | Expr::String { value, .. } => {
            out.push_str(&String::from_utf8_lossy(value));
        }
        Expr::Boolean { value, .. } => out.push_str(if *value { "true" } else { "false" }),
        Expr::Null { .. } => out.push_str("null"),
        Expr::Variable { name, .. } => out.push_str(&String::from_utf8_lossy(name.as_str(source))),
        Expr::Binary { left, op, right, .. } => {
            out.push('(');
            write_expr(left, source, out);
            out.push(' ');
            out.push_str(binary_op_str(*op));
            out.push(' ');
            write_expr(right, source, out);
            out.push(')');
        }
        Expr::Unary { op, expr, .. } => {
            out.push('(');
            match op {
                UnaryOp::PreInc => out.push_str("++"),
                UnaryOp::PreDec => out.push_str("--"),
                UnaryOp::Plus => out.push('+'),
                UnaryOp::Minus => out.push('-'),
                UnaryOp::Not => out.push('!'),
                UnaryOp::BitNot => out.push('~'),
                UnaryOp::ErrorSuppress => out.push('@'),
                UnaryOp::Reference => out.push('&'),
            }
            write_expr(expr, source, out);
            out.push(')');
        }
        Expr::PostInc { var, .. } => {
            out.push('(');
            write_expr(var, source, out);
            out.push_str("++)");
        }
        Expr::PostDec { var, .. } => {
            out.push('(');
            write_expr(var, source, out);
            out.push_str("--)");
        }
        Expr::Assign { var, expr, .. } => {
            out.push('(');
            write_expr(var, source, out);
            out.push_str(" = ");
            write_expr(expr, source, out);
            out.push(')');
        }
        Expr::AssignRef { var, expr, .. } => {
            out.push('(');
            write_expr(var, source, out);
            out.push_str(" =& ");
            write_expr(expr, source, out);
            out.push(')');
        }
        Expr::AssignOp { var, op, expr, .. } => {
            out.push('(');
            write_expr(var, source, out);
            out.push(' ');
            out.push_str(assign_op_str(*op));
            out.push(' ');
            write_expr(expr, source, out);
            out.push(')');
        }
        Expr::Ternary {
            condition,
            if_true,
            if_false,
            ..
        } => {
            out.push('(');
            write_expr(condition, source, out);
            match if_true {
                Some(consequence) => {
                    out.push_str(" ? ");
                    write_expr(consequence, source, out);
                    out.push_str(" : ");
                }
                None => out.push_str(" ?: "),
            }
            write_expr(if_false, source, out);
            out.push(')');
        }
        Expr::Cast { kind, expr, .. } => {
            out.push('(');
            out.push('(');
            out.push_str(cast_kind_str(*kind));
            out.push(')');
            write_expr(expr, source, out);
            out.push(')');
        }
        Expr::Clone { expr, .. } => {
            out.push_str("(clone ");
            write_expr(expr, source, out);
            out.push(')');
        }
        Expr::ArrayDimFetch { array, dim, .. } => {
            write_expr(array, source, out);
            out.push('[');
            if let Some(dim) = dim {
                write_expr(dim, source, out);
            }
            out.push(']');
        }
        Expr::PropertyFetch { target, property, .. } => {
            write_expr(target, source, out);
            out.push_str("->");
            write_expr(property, source, out);
        }
        Expr::NullsafePropertyFetch { target, property, .. } => {
            write_expr(target, source, out);
            out.push_str("?->");
            write_expr(property, source, out);
        }
        _ => {
            // Nodes with no operator precedence to disambiguate (calls,
            // literals handled above, declarations as expressions, etc.)
            // print as their source text verbatim.
            let span = expr.span();
            out.push_str(&String::from_utf8_lossy(span.as_str(source)));
        }
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Plus => "+",
        BinaryOp::Minus => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Concat => ".",
        BinaryOp::Eq => "=",
        BinaryOp::EqEq => "==",
        BinaryOp::EqEqEq => "===",
        BinaryOp::NotEq => "!=",
        BinaryOp::NotEqEq => "!==",
        BinaryOp::Lt => "<",
        BinaryOp::LtEq => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::GtEq => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Coalesce => "??",
        BinaryOp::Spaceship => "<=>",
        BinaryOp::Pow => "**",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>",
        BinaryOp::LogicalAnd => "and",
        BinaryOp::LogicalOr => "or",
        BinaryOp::LogicalXor => "xor",
        BinaryOp::Instanceof => "instanceof",
    }
}

fn assign_op_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Plus => "+=",
        AssignOp::Minus => "-=",
        AssignOp::Mul => "*=",
        AssignOp::Div => "/=",
        AssignOp::Mod => "%=",
        AssignOp::Concat => ".=",
        AssignOp::BitAnd => "&=",
        AssignOp::BitOr => "|=",
        AssignOp::BitXor => "^=",
        AssignOp::ShiftLeft => "<<=",
        AssignOp::ShiftRight => ">>=",
        AssignOp::Pow => "**=",
        AssignOp::Coalesce => "??=",
    }
}

fn cast_kind_str(kind: CastKind) -> &'static str {
    match kind {
        CastKind::Int => "int",
        CastKind::Bool => "bool",
        CastKind::Float => "float",
        CastKind::String => "string",
        CastKind::Array => "array",
        CastKind::Object => "object",
        CastKind::Unset => "unset",
        CastKind::Void => "void",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parser::Parser;
    use bumpalo::Bump;

    fn print_first_expr_stmt(source: &str) -> String {
        let bytes = source.as_bytes();
        let arena = Bump::new();
        let lexer = Lexer::new(bytes);
        let mut parser = Parser::new(lexer, &arena);
        let program = parser.parse_program();
        let stmt = program.statements[0];
        match stmt {
            crate::parser::ast::Stmt::Expression { expr, .. } => print_expr(expr, bytes),
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(
            print_first_expr_stmt("<?php 2 ** 3 ** 2;"),
            "(2 ** (3 ** 2))"
        );
    }

    #[test]
    fn mixed_precedence_fully_parenthesizes() {
        assert_eq!(
            print_first_expr_stmt("<?php $a + $b * $c + $d / $e - $f;"),
            "((($a + ($b * $c)) + ($d / $e)) - $f)"
        );
    }

    #[test]
    fn short_ternary() {
        assert_eq!(print_first_expr_stmt("<?php $a ?: $b;"), "($a ?: $b)");
    }

    #[test]
    fn full_ternary() {
        assert_eq!(
            print_first_expr_stmt("<?php $a ? $b : $c;"),
            "($a ? $b : $c)"
        );
    }
}
