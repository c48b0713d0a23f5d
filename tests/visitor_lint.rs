use bumpalo::Bump;
use php_engine::parser::ast::visitor::{walk_expr, walk_stmt, Visitor};
use php_engine::parser::ast::{Expr, Stmt};
use php_engine::parser::lexer::Lexer;
use php_engine::parser::parser::Parser;
use php_engine::parser::span::Span;

#[derive(Default)]
struct LintVisitor {
    gotos: Vec<Span>,
    evals: Vec<Span>,
}

impl<'ast> Visitor<'ast> for LintVisitor {
    fn visit_stmt(&mut self, stmt: php_engine::parser::ast::StmtId<'ast>) -> bool {
        if let Stmt::Goto { span, .. } = stmt {
            self.gotos.push(*span);
        }

        walk_stmt(self, stmt);
        true
    }

    fn visit_expr(&mut self, expr: php_engine::parser::ast::ExprId<'ast>) -> bool {
        if let Expr::Eval { span, .. } = expr {
            self.evals.push(*span);
        }

        walk_expr(self, expr);
        true
    }
}

#[derive(Default)]
struct SkippingVisitor {
    variables: Vec<String>,
}

impl<'ast> Visitor<'ast> for SkippingVisitor {
    fn visit_expr(&mut self, expr: php_engine::parser::ast::ExprId<'ast>) -> bool {
        if let Expr::Eval { .. } = expr {
            return false;
        }
        if let Expr::Variable { span, .. } = expr {
            self.variables.push(format!("{span:?}"));
        }

        walk_expr(self, expr);
        true
    }
}

#[test]
fn visit_expr_returning_false_skips_its_subtree() {
    let code = r#"<?php
$kept = 1;
$value = eval($hidden);
"#;

    let arena = Bump::new();
    let lexer = Lexer::new(code.as_bytes());
    let mut parser = Parser::new(lexer, &arena);
    let program = parser.parse_program();

    let mut visitor = SkippingVisitor::default();
    visitor.visit_program(&program);

    // $kept, $value are reached; $hidden lives inside the skipped eval() subtree.
    assert_eq!(visitor.variables.len(), 2);
}

#[test]
fn visitor_drives_simple_lint() {
    let code = r#"<?php
function demo($items) {
    foreach ($items as $item) {
        if ($item) {
            goto end;
        }
    }

    $value = eval('2 + 2');
    $closure = function() use ($items) {
        return eval('3');
    };
    $matches = match ($value) {
        4 => eval('4'),
        default => $value,
    };
    end:
        return $matches;
}
"#;

    let arena = Bump::new();
    let lexer = Lexer::new(code.as_bytes());
    let mut parser = Parser::new(lexer, &arena);
    let program = parser.parse_program();

    let mut visitor = LintVisitor::default();
    visitor.visit_program(&program);

    assert_eq!(visitor.gotos.len(), 1);
    assert_eq!(visitor.evals.len(), 3);
}
