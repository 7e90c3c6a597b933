//! Small constructors for the nodes the lowering pass emits.
//!
//! Nothing here runs a fixer afterwards, so every helper that can produce an
//! expression of lower precedence than a call wraps it in parentheses itself.

use swc_common::{SyntaxContext, DUMMY_SP};
use swc_ecma_ast::*;

pub(crate) fn invalid() -> Expr {
    Expr::Invalid(Invalid { span: DUMMY_SP })
}

/// Move an expression out of the tree, leaving a placeholder.
pub(crate) fn take_expr(expr: &mut Box<Expr>) -> Box<Expr> {
    std::mem::replace(expr, Box::new(invalid()))
}

/// Look through parentheses and TypeScript-only wrappers.
pub(crate) fn peel(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(ParenExpr { expr, .. })
        | Expr::TsAs(TsAsExpr { expr, .. })
        | Expr::TsNonNull(TsNonNullExpr { expr, .. })
        | Expr::TsSatisfies(TsSatisfiesExpr { expr, .. })
        | Expr::TsTypeAssertion(TsTypeAssertion { expr, .. })
        | Expr::TsConstAssertion(TsConstAssertion { expr, .. }) => peel(expr),
        other => other,
    }
}

pub(crate) fn peel_mut(expr: &mut Expr) -> &mut Expr {
    match expr {
        Expr::Paren(ParenExpr { expr, .. })
        | Expr::TsAs(TsAsExpr { expr, .. })
        | Expr::TsNonNull(TsNonNullExpr { expr, .. })
        | Expr::TsSatisfies(TsSatisfiesExpr { expr, .. })
        | Expr::TsTypeAssertion(TsTypeAssertion { expr, .. })
        | Expr::TsConstAssertion(TsConstAssertion { expr, .. }) => peel_mut(expr),
        other => other,
    }
}

/// The member expression an assignment writes to, if any.
pub(crate) fn target_member_mut(target: &mut AssignTarget) -> Option<&mut MemberExpr> {
    let AssignTarget::Simple(simple) = target else {
        return None;
    };
    let inner = match simple {
        SimpleAssignTarget::Member(member) => return Some(member),
        SimpleAssignTarget::Paren(ParenExpr { expr, .. })
        | SimpleAssignTarget::TsAs(TsAsExpr { expr, .. })
        | SimpleAssignTarget::TsNonNull(TsNonNullExpr { expr, .. })
        | SimpleAssignTarget::TsSatisfies(TsSatisfiesExpr { expr, .. })
        | SimpleAssignTarget::TsTypeAssertion(TsTypeAssertion { expr, .. }) => expr,
        _ => return None,
    };
    match peel_mut(inner) {
        Expr::Member(member) => Some(member),
        _ => None,
    }
}

pub(crate) fn ident(id: &Ident) -> Box<Expr> {
    Box::new(Expr::Ident(id.clone()))
}

pub(crate) fn str_lit(value: &str) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Str(Str::from(value))))
}

pub(crate) fn boolean(value: bool) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Bool(Bool {
        span: DUMMY_SP,
        value,
    })))
}

pub(crate) fn paren(expr: Expr) -> Expr {
    Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr: Box::new(expr),
    })
}

/// `(a, b, c)`, or just `last` when there is nothing before it.
pub(crate) fn sequence(mut prelude: Vec<Box<Expr>>, last: Expr) -> Expr {
    if prelude.is_empty() {
        return last;
    }
    prelude.push(Box::new(last));
    paren(Expr::Seq(SeqExpr {
        span: DUMMY_SP,
        exprs: prelude,
    }))
}

pub(crate) fn assign_to(id: &Ident, value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Assign(AssignExpr {
        span: DUMMY_SP,
        op: AssignOp::Assign,
        left: AssignTarget::Simple(SimpleAssignTarget::Ident(BindingIdent::from(id.clone()))),
        right: value,
    }))
}

pub(crate) fn binary(left: Box<Expr>, op: BinaryOp, right: Box<Expr>) -> Expr {
    Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op,
        left,
        right,
    })
}

/// `++id`, `id--` and so on.
pub(crate) fn update_ident(id: &Ident, op: UpdateOp, prefix: bool) -> Box<Expr> {
    Box::new(Expr::Update(UpdateExpr {
        span: DUMMY_SP,
        op,
        prefix,
        arg: ident(id),
    }))
}

/// `callee(args...)`, tagged with `ctxt`.
pub(crate) fn call(
    ctxt: SyntaxContext,
    callee: Box<Expr>,
    args: Vec<ExprOrSpread>,
) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt,
        callee: Callee::Expr(callee),
        args,
        type_args: None,
    })
}

pub(crate) fn named_call(ctxt: SyntaxContext, name: &str, args: Vec<Box<Expr>>) -> Expr {
    let callee = Box::new(Expr::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP)));
    call(ctxt, callee, args.into_iter().map(arg).collect())
}

pub(crate) fn arg(expr: Box<Expr>) -> ExprOrSpread {
    ExprOrSpread { spread: None, expr }
}

/// `object.name`
pub(crate) fn dot(object: Expr, name: &str) -> Box<Expr> {
    Box::new(Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(object),
        prop: MemberProp::Ident(IdentName::new(name.into(), DUMMY_SP)),
    }))
}

/// Expressions that can be evaluated twice without a visible difference.
pub(crate) fn is_reusable(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(_) | Expr::This(_) | Expr::Lit(_))
}

/// Parenthesize `expr` unless it already binds at least as tightly as a
/// binary operand.
pub(crate) fn operand(expr: Box<Expr>) -> Box<Expr> {
    match *expr {
        Expr::Ident(_)
        | Expr::Lit(_)
        | Expr::This(_)
        | Expr::Paren(_)
        | Expr::Call(_)
        | Expr::Member(_)
        | Expr::Array(_)
        | Expr::Object(_)
        | Expr::Tpl(_) => expr,
        other => Box::new(paren(other)),
    }
}

/// `var a, b;`
pub(crate) fn var_decl(names: Vec<Ident>) -> Stmt {
    Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind: VarDeclKind::Var,
        declare: false,
        decls: names
            .into_iter()
            .map(|name| VarDeclarator {
                span: DUMMY_SP,
                name: Pat::Ident(BindingIdent::from(name)),
                init: None,
                definite: false,
            })
            .collect(),
    })))
}

fn is_directive(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::Expr(ExprStmt { expr, .. }) if matches!(&**expr, Expr::Lit(Lit::Str(_)))
    )
}

/// Number of leading directives (`"use strict"` and friends).
pub(crate) fn directive_count(stmts: &[Stmt]) -> usize {
    stmts.iter().take_while(|stmt| is_directive(stmt)).count()
}

/// Whether the directive prologue of `stmts` contains `"use strict"`. Only
/// the unescaped spelling counts.
pub(crate) fn has_use_strict(stmts: &[Stmt]) -> bool {
    stmts[..directive_count(stmts)].iter().any(|stmt| match stmt {
        Stmt::Expr(ExprStmt { expr, .. }) => match &**expr {
            Expr::Lit(Lit::Str(s)) => {
                s.value.as_str() == Some("use strict")
                    && s.raw.as_ref().map_or(true, |raw| raw.len() == "'use strict'".len())
            }
            _ => false,
        },
        _ => false,
    })
}

pub(crate) fn module_directive_count(items: &[ModuleItem]) -> usize {
    items
        .iter()
        .take_while(|item| matches!(item, ModuleItem::Stmt(stmt) if is_directive(stmt)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(text: &str) -> Stmt {
        Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: str_lit(text),
        })
    }

    #[test]
    fn test_directive_count() {
        let stmts = vec![directive("use strict"), directive("use asm"), var_decl(vec![])];
        assert_eq!(directive_count(&stmts), 2);
        assert_eq!(directive_count(&stmts[2..]), 0);
    }

    #[test]
    fn test_has_use_strict() {
        assert!(has_use_strict(&[directive("use asm"), directive("use strict")]));
        assert!(!has_use_strict(&[directive("use asm")]));
        // a string after the prologue is just an expression
        assert!(!has_use_strict(&[var_decl(vec![]), directive("use strict")]));
    }

    #[test]
    fn test_peel_looks_through_wrappers() {
        let member = Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: str_lit("o"),
            prop: MemberProp::Ident(IdentName::new("x".into(), DUMMY_SP)),
        });
        let wrapped = paren(Expr::TsNonNull(TsNonNullExpr {
            span: DUMMY_SP,
            expr: Box::new(member),
        }));
        assert!(matches!(peel(&wrapped), Expr::Member(_)));
    }

    #[test]
    fn test_sequence_without_prelude_is_the_value() {
        assert!(matches!(sequence(vec![], invalid()), Expr::Invalid(_)));
        assert!(matches!(sequence(vec![str_lit("a")], invalid()), Expr::Paren(_)));
    }

    #[test]
    fn test_operand_parenthesizes_low_precedence() {
        assert!(matches!(*operand(str_lit("a")), Expr::Lit(_)));
        let sum = Box::new(binary(str_lit("a"), BinaryOp::Add, str_lit("b")));
        assert!(matches!(*operand(sum), Expr::Paren(_)));
    }
}
