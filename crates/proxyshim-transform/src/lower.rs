//! The lowering pass.
//!
//! [`Lowering`] walks a program bottom-up: the operands of a node are lowered
//! first, then the node itself is replaced. Replacement nodes are never
//! visited again, and every call the pass creates carries the pass's own
//! syntax context, so running the pass over its own output leaves it alone.
//!
//! | source                  | lowered                                                      |
//! |-------------------------|--------------------------------------------------------------|
//! | `o.k`                   | `globalGetter(o, "k")`                                       |
//! | `o[e] = v`              | `globalSetter(o, e, v)`                                      |
//! | `r.m(a)`                | `(t = r, globalGetter(t, "m").call(objectTarget(t), a))`     |
//! | `o.k += v`              | `globalSetter(o, "k", globalGetter(o, "k") + v)`             |
//! | `o.k ??= v`             | `(globalGetter(o, "k") ?? globalSetter(o, "k", v))`          |
//! | `++o.k`                 | `(v = globalGetter(o, "k"), globalSetter(o, "k", ++v))`      |
//! | `o.k++`                 | `(v = globalGetter(o, "k"), w = v++, globalSetter(o, "k", v), w)` |
//! | `delete o.k`            | `globalDeleter(o, "k")`                                      |
//! | ``r.tag`x` ``           | ``(t = r, globalGetter(t, "tag").bind(objectTarget(t)))`x` `` |
//!
//! Temporaries are declared with `var` at the top of the nearest function
//! body, static block or program.
//!
//! In strict code, setter and deleter calls get a trailing `true` so the
//! runtime performs the fallback write or delete in strict mode.
//!
//! Left alone: `apply`/`bind`/`call` reads and calls, private names, `super`
//! accesses. Optional chains and member targets inside destructuring patterns
//! stay native too, and are reported as [`NativeSite`]s.

use crate::builder::*;
use crate::config::TransformConfig;
use crate::names::TempNames;
use proxyshim_diagnostics::DiagnosticCode;
use proxyshim_runtime::DispatchNames;
use serde::Serialize;
use swc_common::{Mark, Span, SyntaxContext, DUMMY_SP};
use swc_ecma_ast::*;
use swc_ecma_visit::{VisitMut, VisitMutWith};

/// Counts of rewritten sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoweringStats {
    pub reads: usize,
    pub writes: usize,
    pub calls: usize,
    pub deletes: usize,
    pub updates: usize,
    pub tagged_templates: usize,
    pub temporaries: usize,
    pub native_sites: usize,
}

impl LoweringStats {
    /// Total number of rewritten sites.
    pub fn rewritten(&self) -> usize {
        self.reads + self.writes + self.calls + self.deletes + self.updates + self.tagged_templates
    }
}

/// A property operation that was deliberately left native.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeSite {
    pub code: DiagnosticCode,
    pub span: Span,
}

impl NativeSite {
    pub fn message(&self) -> &'static str {
        match self.code {
            DiagnosticCode::NativeOptionalChain => {
                "optional chain is evaluated natively and bypasses virtual objects"
            }
            DiagnosticCode::NativePatternTarget => {
                "member target in a destructuring pattern or loop head is assigned natively"
            }
            _ => "property operation left native",
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self.code {
            DiagnosticCode::NativeOptionalChain => {
                Some("check for null explicitly if the receiver may be a virtual object")
            }
            DiagnosticCode::NativePatternTarget => {
                Some("destructure into a local and assign the property separately")
            }
            _ => None,
        }
    }
}

/// The lowering pass for one program.
///
/// Must be created inside `swc_common::GLOBALS`, since it allocates a
/// [`Mark`] to tag its own output.
pub struct Lowering {
    names: DispatchNames,
    passthrough: Vec<String>,
    temps: TempNames,
    lowered: SyntaxContext,
    scopes: Vec<Vec<Ident>>,
    strict: bool,
    stats: LoweringStats,
    native_sites: Vec<NativeSite>,
}

impl Lowering {
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            names: config.dispatch.clone(),
            passthrough: config.passthrough_names(),
            temps: TempNames::seeded(config.seed),
            lowered: SyntaxContext::empty().apply_mark(Mark::new()),
            scopes: Vec::new(),
            strict: false,
            stats: LoweringStats::default(),
            native_sites: Vec::new(),
        }
    }

    pub fn lower_program(&mut self, program: &mut Program) {
        program.visit_mut_with(self);
        log::debug!(
            "lowered {} sites ({} reads, {} writes, {} calls), {} temporaries",
            self.stats.rewritten(),
            self.stats.reads,
            self.stats.writes,
            self.stats.calls,
            self.stats.temporaries
        );
    }

    pub fn stats(&self) -> LoweringStats {
        self.stats
    }

    pub fn native_sites(&self) -> &[NativeSite] {
        &self.native_sites
    }

    /// The syntax context carried by every call this pass creates.
    pub fn lowered_ctxt(&self) -> SyntaxContext {
        self.lowered
    }

    fn is_passthrough(&self, name: &str) -> bool {
        self.passthrough.iter().any(|p| p == name)
    }

    /// Whether reading or calling through `prop` goes through the runtime.
    fn dispatches_read(&self, prop: &MemberProp) -> bool {
        match prop {
            MemberProp::Ident(name) => !self.is_passthrough(&name.sym),
            MemberProp::Computed(computed) => match &*computed.expr {
                Expr::Lit(Lit::Str(s)) => s.value.as_str().map_or(true, |v| !self.is_passthrough(v)),
                _ => true,
            },
            MemberProp::PrivateName(_) => false,
        }
    }

    fn dispatches_write(prop: &MemberProp) -> bool {
        !matches!(prop, MemberProp::PrivateName(_))
    }

    fn temp(&mut self) -> Ident {
        let id = self.temps.next_ident();
        self.stats.temporaries += 1;
        match self.scopes.last_mut() {
            Some(scope) => scope.push(id.clone()),
            None => self.scopes.push(vec![id.clone()]),
        }
        id
    }

    /// `expr` if it can be evaluated twice, else a temporary assigned in
    /// `prelude`.
    fn reusable(&mut self, expr: Box<Expr>, prelude: &mut Vec<Box<Expr>>) -> Box<Expr> {
        if is_reusable(&expr) {
            return expr;
        }
        let id = self.temp();
        prelude.push(assign_to(&id, expr));
        ident(&id)
    }

    fn native(&mut self, code: DiagnosticCode, span: Span) {
        log::warn!("{} at {:?}: left native", code.as_str(), span);
        self.stats.native_sites += 1;
        self.native_sites.push(NativeSite { code, span });
    }

    fn getter(&self, object: Box<Expr>, key: Box<Expr>) -> Expr {
        named_call(self.lowered, &self.names.getter, vec![object, key])
    }

    fn setter(&self, object: Box<Expr>, key: Box<Expr>, value: Box<Expr>) -> Expr {
        let mut args = vec![object, key, value];
        if self.strict {
            args.push(boolean(true));
        }
        named_call(self.lowered, &self.names.setter, args)
    }

    fn deleter(&self, object: Box<Expr>, key: Box<Expr>) -> Expr {
        let mut args = vec![object, key];
        if self.strict {
            args.push(boolean(true));
        }
        named_call(self.lowered, &self.names.deleter, args)
    }

    fn target_of(&self, id: &Ident) -> Box<Expr> {
        Box::new(named_call(self.lowered, &self.names.target, vec![ident(id)]))
    }

    fn visit_scoped_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        self.scopes.push(Vec::new());
        stmts.visit_mut_children_with(self);
        let temps = self.scopes.pop().unwrap_or_default();
        if !temps.is_empty() {
            stmts.insert(directive_count(stmts), var_decl(temps));
        }
    }

    /// Run `visit` with strict mode switched on if `strict`, then restore.
    fn in_mode(&mut self, strict: bool, visit: impl FnOnce(&mut Self)) {
        let outer = self.strict;
        self.strict = outer || strict;
        visit(self);
        self.strict = outer;
    }

    fn visit_member_parts(&mut self, member: &mut MemberExpr) {
        member.obj.visit_mut_with(self);
        if let MemberProp::Computed(computed) = &mut member.prop {
            computed.expr.visit_mut_with(self);
        }
    }

    /// Lower the operands of `expr` without touching `expr` itself. Member
    /// expressions in callee, target and operand positions only have their
    /// object and key lowered.
    fn visit_operands(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Member(member) => self.visit_member_parts(member),
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &mut call.callee {
                    match peel_mut(callee) {
                        Expr::Member(member) => self.visit_member_parts(member),
                        other => other.visit_mut_with(self),
                    }
                } else {
                    call.callee.visit_mut_with(self);
                }
                call.args.visit_mut_with(self);
            }
            Expr::Assign(assign) => {
                match target_member_mut(&mut assign.left) {
                    Some(member) => self.visit_member_parts(member),
                    None => assign.left.visit_mut_with(self),
                }
                assign.right.visit_mut_with(self);
            }
            Expr::Update(UpdateExpr { arg, .. })
            | Expr::Unary(UnaryExpr {
                op: UnaryOp::Delete,
                arg,
                ..
            }) => match peel_mut(arg) {
                Expr::Member(member) => self.visit_member_parts(member),
                other => other.visit_mut_with(self),
            },
            Expr::TaggedTpl(tagged) => {
                match peel_mut(&mut tagged.tag) {
                    Expr::Member(member) => self.visit_member_parts(member),
                    other => other.visit_mut_with(self),
                }
                tagged.tpl.visit_mut_with(self);
            }
            Expr::OptChain(chain) => {
                if chain.optional {
                    self.native(DiagnosticCode::NativeOptionalChain, chain.span);
                }
                match &mut *chain.base {
                    OptChainBase::Member(member) => self.visit_member_parts(member),
                    OptChainBase::Call(call) => {
                        match peel_mut(&mut call.callee) {
                            Expr::Member(member) => self.visit_member_parts(member),
                            other => other.visit_mut_with(self),
                        }
                        call.args.visit_mut_with(self);
                    }
                }
            }
            _ => expr.visit_mut_children_with(self),
        }
    }

    /// The replacement for `expr`, once its operands are lowered.
    fn lower_site(&mut self, expr: &mut Expr) -> Option<Expr> {
        match expr {
            Expr::Member(member) if self.dispatches_read(&member.prop) => {
                let (object, key) = split(member)?;
                self.stats.reads += 1;
                log::trace!("read");
                Some(self.getter(object, key))
            }
            Expr::Call(call) => self.lower_call(call),
            Expr::Assign(assign) => self.lower_assign(assign),
            Expr::Update(update) => self.lower_update(update),
            Expr::Unary(UnaryExpr {
                op: UnaryOp::Delete,
                arg,
                ..
            }) => {
                let member = match peel_mut(arg) {
                    Expr::Member(member) if Self::dispatches_write(&member.prop) => member,
                    _ => return None,
                };
                let (object, key) = split(member)?;
                self.stats.deletes += 1;
                log::trace!("delete");
                Some(self.deleter(object, key))
            }
            Expr::TaggedTpl(tagged) => {
                self.lower_tag(&mut tagged.tag);
                None
            }
            Expr::New(new) => {
                // `new f(a)(b)` would call the constructed value
                if matches!(&*new.callee, Expr::Call(call) if call.ctxt == self.lowered) {
                    new.callee = Box::new(paren(*take_expr(&mut new.callee)));
                }
                None
            }
            _ => None,
        }
    }

    fn lower_call(&mut self, call: &mut CallExpr) -> Option<Expr> {
        let Callee::Expr(callee) = &mut call.callee else {
            return None;
        };
        let member = match peel_mut(callee) {
            Expr::Member(member) if self.dispatches_read(&member.prop) => member,
            _ => return None,
        };
        let (receiver, key) = split(member)?;

        let recv = self.temp();
        let method = self.getter(ident(&recv), key);
        let mut args = vec![arg(self.target_of(&recv))];
        args.append(&mut call.args);
        let invoke = Expr::Call(CallExpr {
            span: call.span,
            ctxt: self.lowered,
            callee: Callee::Expr(dot(method, "call")),
            args,
            type_args: None,
        });

        self.stats.calls += 1;
        log::trace!("call");
        Some(sequence(vec![assign_to(&recv, receiver)], invoke))
    }

    fn lower_assign(&mut self, assign: &mut AssignExpr) -> Option<Expr> {
        let member = target_member_mut(&mut assign.left)?;
        if !Self::dispatches_write(&member.prop) {
            return None;
        }
        let (object, key) = split(member)?;
        let value = take_expr(&mut assign.right);
        self.stats.writes += 1;
        log::trace!("write {:?}", assign.op);

        if assign.op == AssignOp::Assign {
            return Some(self.setter(object, key, value));
        }

        let mut prelude = Vec::new();
        let object = self.reusable(object, &mut prelude);
        let key = self.reusable(key, &mut prelude);
        let current = Box::new(self.getter(object.clone(), key.clone()));

        let lowered = match logical_op(assign.op) {
            Some(op) => paren(binary(current, op, Box::new(self.setter(object, key, value)))),
            None => {
                let op = compound_op(assign.op)?;
                let updated = Box::new(binary(current, op, operand(value)));
                self.setter(object, key, updated)
            }
        };
        Some(sequence(prelude, lowered))
    }

    fn lower_update(&mut self, update: &mut UpdateExpr) -> Option<Expr> {
        let member = match peel_mut(&mut update.arg) {
            Expr::Member(member) if Self::dispatches_write(&member.prop) => member,
            _ => return None,
        };
        let (object, key) = split(member)?;
        self.stats.updates += 1;
        log::trace!("update");

        // Native ++/-- on a temporary; numeric conversion stays the engine's
        let mut prelude = Vec::new();
        let object = self.reusable(object, &mut prelude);
        let key = self.reusable(key, &mut prelude);
        let value = self.temp();
        prelude.push(assign_to(&value, Box::new(self.getter(object.clone(), key.clone()))));

        if update.prefix {
            let updated = update_ident(&value, update.op, true);
            return Some(sequence(prelude, self.setter(object, key, updated)));
        }

        let old = self.temp();
        prelude.push(assign_to(&old, update_ident(&value, update.op, false)));
        prelude.push(Box::new(self.setter(object, key, ident(&value))));
        Some(sequence(prelude, Expr::Ident(old)))
    }

    /// Bind a member tag to its receiver so the tag function sees the same
    /// `this` as a native tagged call.
    fn lower_tag(&mut self, tag: &mut Box<Expr>) {
        let member = match peel_mut(tag) {
            Expr::Member(member) if self.dispatches_read(&member.prop) => member,
            _ => return,
        };
        let Some((receiver, key)) = split(member) else {
            return;
        };

        let recv = self.temp();
        let method = self.getter(ident(&recv), key);
        let bound = call(self.lowered, dot(method, "bind"), vec![arg(self.target_of(&recv))]);
        *tag = Box::new(sequence(vec![assign_to(&recv, receiver)], bound));

        self.stats.tagged_templates += 1;
        log::trace!("tagged template");
    }
}

/// Take the object and the key of `member`: identifiers become string
/// literals, computed keys are kept as written.
fn split(member: &mut MemberExpr) -> Option<(Box<Expr>, Box<Expr>)> {
    let key = match &mut member.prop {
        MemberProp::Ident(name) => str_lit(&name.sym),
        MemberProp::Computed(computed) => {
            let key = take_expr(&mut computed.expr);
            match *key {
                Expr::Seq(seq) => Box::new(paren(Expr::Seq(seq))),
                other => Box::new(other),
            }
        }
        MemberProp::PrivateName(_) => return None,
    };
    Some((take_expr(&mut member.obj), key))
}

fn logical_op(op: AssignOp) -> Option<BinaryOp> {
    match op {
        AssignOp::AndAssign => Some(BinaryOp::LogicalAnd),
        AssignOp::OrAssign => Some(BinaryOp::LogicalOr),
        AssignOp::NullishAssign => Some(BinaryOp::NullishCoalescing),
        _ => None,
    }
}

fn compound_op(op: AssignOp) -> Option<BinaryOp> {
    Some(match op {
        AssignOp::AddAssign => BinaryOp::Add,
        AssignOp::SubAssign => BinaryOp::Sub,
        AssignOp::MulAssign => BinaryOp::Mul,
        AssignOp::DivAssign => BinaryOp::Div,
        AssignOp::ModAssign => BinaryOp::Mod,
        AssignOp::ExpAssign => BinaryOp::Exp,
        AssignOp::LShiftAssign => BinaryOp::LShift,
        AssignOp::RShiftAssign => BinaryOp::RShift,
        AssignOp::ZeroFillRShiftAssign => BinaryOp::ZeroFillRShift,
        AssignOp::BitOrAssign => BinaryOp::BitOr,
        AssignOp::BitXorAssign => BinaryOp::BitXor,
        AssignOp::BitAndAssign => BinaryOp::BitAnd,
        _ => return None,
    })
}

impl VisitMut for Lowering {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if let Expr::Call(call) = expr {
            if call.ctxt == self.lowered {
                return;
            }
        }
        self.visit_operands(expr);
        if let Some(lowered) = self.lower_site(expr) {
            *expr = lowered;
        }
    }

    fn visit_mut_pat(&mut self, pat: &mut Pat) {
        if let Pat::Expr(expr) = pat {
            if let Expr::Member(member) = peel_mut(expr) {
                if Self::dispatches_write(&member.prop) {
                    self.native(DiagnosticCode::NativePatternTarget, member.span);
                }
                self.visit_member_parts(member);
                return;
            }
        }
        pat.visit_mut_children_with(self);
    }

    fn visit_mut_script(&mut self, script: &mut Script) {
        let strict = has_use_strict(&script.body);
        self.in_mode(strict, |this| this.visit_scoped_stmts(&mut script.body));
    }

    fn visit_mut_module(&mut self, module: &mut Module) {
        self.scopes.push(Vec::new());
        self.in_mode(true, |this| module.body.visit_mut_children_with(this));
        let temps = self.scopes.pop().unwrap_or_default();
        if !temps.is_empty() {
            let at = module_directive_count(&module.body);
            module.body.insert(at, ModuleItem::Stmt(var_decl(temps)));
        }
    }

    fn visit_mut_function(&mut self, function: &mut Function) {
        function.decorators.visit_mut_with(self);
        let strict = function
            .body
            .as_ref()
            .is_some_and(|body| has_use_strict(&body.stmts));
        self.in_mode(strict, |this| {
            // parameter defaults run in the caller's scope for our purposes
            function.params.visit_mut_with(this);
            if let Some(body) = &mut function.body {
                this.visit_scoped_stmts(&mut body.stmts);
            }
        });
    }

    fn visit_mut_class(&mut self, class: &mut Class) {
        self.in_mode(true, |this| class.visit_mut_children_with(this));
    }

    fn visit_mut_constructor(&mut self, constructor: &mut Constructor) {
        constructor.params.visit_mut_with(self);
        if let Some(body) = &mut constructor.body {
            self.visit_scoped_stmts(&mut body.stmts);
        }
    }

    fn visit_mut_getter_prop(&mut self, getter: &mut GetterProp) {
        getter.key.visit_mut_with(self);
        if let Some(body) = &mut getter.body {
            let strict = has_use_strict(&body.stmts);
            self.in_mode(strict, |this| this.visit_scoped_stmts(&mut body.stmts));
        }
    }

    fn visit_mut_setter_prop(&mut self, setter: &mut SetterProp) {
        setter.key.visit_mut_with(self);
        let strict = setter
            .body
            .as_ref()
            .is_some_and(|body| has_use_strict(&body.stmts));
        self.in_mode(strict, |this| {
            setter.param.visit_mut_with(this);
            if let Some(body) = &mut setter.body {
                this.visit_scoped_stmts(&mut body.stmts);
            }
        });
    }

    fn visit_mut_static_block(&mut self, block: &mut StaticBlock) {
        self.visit_scoped_stmts(&mut block.body.stmts);
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        let strict = matches!(
            &*arrow.body,
            BlockStmtOrExpr::BlockStmt(block) if has_use_strict(&block.stmts)
        );
        self.in_mode(strict, |this| this.visit_arrow_parts(arrow));
    }
}

impl Lowering {
    fn visit_arrow_parts(&mut self, arrow: &mut ArrowExpr) {
        arrow.params.visit_mut_with(self);
        match &mut *arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => self.visit_scoped_stmts(&mut block.stmts),
            BlockStmtOrExpr::Expr(body) => {
                self.scopes.push(Vec::new());
                body.visit_mut_with(self);
                let temps = self.scopes.pop().unwrap_or_default();
                if !temps.is_empty() {
                    let value = take_expr(body);
                    *arrow.body = BlockStmtOrExpr::BlockStmt(BlockStmt {
                        span: DUMMY_SP,
                        ctxt: SyntaxContext::empty(),
                        stmts: vec![
                            var_decl(temps),
                            Stmt::Return(ReturnStmt {
                                span: DUMMY_SP,
                                arg: Some(value),
                            }),
                        ],
                    });
                }
            }
        }
    }
}
