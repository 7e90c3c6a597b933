//! Runs programs natively and rewritten, and compares the results.

use proxyshim_jsruntime::{run_rewritten, run_script, EngineError, EngineLimits, ScriptEngine};
use proxyshim_runtime::{DispatchNames, NamesError};
use proxyshim_transform::{rewrite_source, RewriteError, TransformConfig};

fn limits() -> EngineLimits {
    EngineLimits::default()
}

fn unquote(value: String) -> String {
    value.trim_matches('"').to_string()
}

/// Completion value of `source` after rewriting, on an engine without `Proxy`.
fn rewritten(source: &str) -> String {
    let config = TransformConfig::default().with_seed(5);
    match run_rewritten(source, "test.js", &config, &limits()) {
        Ok(value) => unquote(value),
        Err(err) => panic!("rewritten program failed: {}\n{}", err, source),
    }
}

fn native(source: &str) -> String {
    unquote(run_script(source, &limits(), true).unwrap())
}

fn assert_transparent(source: &str) {
    assert_eq!(rewritten(source), native(source), "{}", source);
}

#[test]
fn test_write_then_read() {
    assert_eq!(rewritten("const obj = {}; obj.bar = 7; obj.bar;"), "7");
}

#[test]
fn test_set_handler_result_is_the_assignment_value() {
    let setup = "const obj = new Proxy({}, { set(property, value) { return this.bar = value * 2; } });";
    assert_eq!(rewritten(&format!("{} obj.bing = 3;", setup)), "6");
    assert_eq!(rewritten(&format!("{} obj.bing = 3; obj.bar;", setup)), "6");
}

#[test]
fn test_plain_object_transparency() {
    let programs = [
        "var o = { a: { b: { c: 1 } } }; o.a.b.c + o['a']['b']['c'];",
        "var o = { 1: 'one', k: 'v' }; var c = 'k'; o[1] + o['k'] + o[c];",
        "var o = {}; o.x = 1; o['y'] = 2; o[3] = 3; Object.keys(o).join();",
        "var o = { x: 1, y: 2 }; var r = delete o.x; [r, 'x' in o, o.y].join();",
        "var o = { v: 2, m(a, b) { return this.v * a + b; } }; o.m(3, 4);",
        "var a = [3, 1, 2]; a.sort(); a.push(4); a.length + ':' + a.join('') + ':' + 'abc'.toUpperCase() + 'xyz'.length;",
        "var s = 'a-b-c'; s.split('-').map(function (p) { return p.toUpperCase(); }).join('');",
        "var x = (1, { v: 9 }).v; x;",
    ];
    for program in programs {
        assert_transparent(program);
    }
}

#[test]
fn test_computed_keys_are_evaluated_once() {
    assert_transparent(
        "var i = 0; var o = { k1: 5 }; function key() { i++; return 'k1'; } \
         o[key()] += 1; o[key()]++; o[key()]; [i, o.k1].join();",
    );
}

#[test]
fn test_receiver_is_evaluated_once() {
    assert_eq!(
        rewritten(
            "var n = 0; function f() { n++; return { v: 5, m() { return this.v; } }; } \
             var r = f().m(); [n, r].join();"
        ),
        "1,5"
    );
}

#[test]
fn test_compound_and_update_assignments() {
    assert_transparent(
        "var o = { n: '5' }; var a = o.n++; var b = ++o.n; o.s = 'x'; o.s += 1; \
         o.m = 3; o.m *= 2 + 1; o.m **= 2; o.m -= 1; o.b = 6; o.b >>= 1; o.b |= 8; \
         [a, b, o.n, o.s, o.m, o.b].join();",
    );
    assert_transparent("var o = { n: 1n }; o.n++; ++o.n; o.n += 1n; String(o.n);");
    assert_eq!(rewritten("var o = { n: 1n }; o.n++; ++o.n; o.n += 1n; String(o.n);"), "4");
    assert_transparent("var o = { n: 10n }; var a = o.n--; var b = --o.n; [a, b, o.n].join();");
}

#[test]
fn test_logical_assignments_short_circuit() {
    assert_transparent(
        "var o = { a: 0, b: 1 }; var calls = 0; function v() { calls++; return 9; } \
         o.a ||= v(); o.b ||= v(); o.c ??= v(); o.c ??= v(); o.a &&= 4; \
         [o.a, o.b, o.c, calls].join();",
    );
}

#[test]
fn test_call_binding_utilities_keep_native_semantics() {
    assert_transparent(
        "var o = { v: 2, m(a) { return this.v + a; } }; var other = { v: 10 }; \
         [o.m.call(other, 1), o.m.apply(other, [2]), o.m.bind(other)(3)].join();",
    );
}

#[test]
fn test_this_binding_on_plain_receivers() {
    assert_transparent(
        "class P { constructor(x) { this.x = x; } get double() { return this.x * 2; } \
         inc() { this.x++; return this; } } new P(2).inc().inc().double;",
    );
}

#[test]
fn test_this_is_the_target_for_virtual_receivers() {
    assert_eq!(
        rewritten(
            "var target = { v: 3, m() { return this === target && this.v; } }; \
             var p = new Proxy(target, {}); p.m();"
        ),
        "3"
    );
}

#[test]
fn test_default_behavior_operates_on_target() {
    assert_eq!(
        rewritten(
            "var t = {}; var p = new Proxy(t); p.a = 1; p.b = p.a + 1; delete p.a; \
             Object.keys(t).join() + '=' + t.b;"
        ),
        "b=2"
    );
}

#[test]
fn test_get_handler_receives_key_with_target_as_this() {
    assert_eq!(
        rewritten(
            "var t = { base: 10 }; var p = new Proxy(t, { get(k) { return this.base + k.length; } }); \
             p.abc + p['x'];"
        ),
        "24"
    );
}

#[test]
fn test_delete_handler_result() {
    assert_eq!(
        rewritten(
            "var log = []; var p = new Proxy({ x: 1 }, { deleteProperty(k) { log.push(k); return 'gone'; } }); \
             var r = delete p.x; r + ':' + log.join();"
        ),
        "gone:x"
    );
}

#[test]
fn test_nested_virtual_objects_forward() {
    assert_eq!(
        rewritten(
            "var inner = new Proxy({ v: 1 }, { get(k) { return 'inner:' + k; } }); \
             var outer = new Proxy(inner, {}); outer.v;"
        ),
        "inner:v"
    );
}

#[test]
fn test_define_property_routes_through_definer() {
    assert_eq!(
        rewritten(
            "var t = {}; var p = new Proxy(t, {}); \
             var r = Object.defineProperty(p, 'x', { value: 3, enumerable: true }); \
             [r === p, t.x, Object.keys(t).join()].join();"
        ),
        "true,3,x"
    );
    assert_transparent("var o = {}; Object.defineProperty(o, 'y', { value: 4 }) === o && o.y;");
}

#[test]
fn test_is_proxy() {
    assert_eq!(
        rewritten("[isProxy(new Proxy({}, {})), isProxy({}), isProxy(null), isProxy(1)].join();"),
        "true,false,false,false"
    );
}

#[test]
fn test_proxy_requires_new() {
    assert_eq!(
        rewritten("var r; try { Proxy({}); r = 'no'; } catch (e) { r = e instanceof TypeError; } r;"),
        "true"
    );
}

#[test]
fn test_tagged_templates_keep_this() {
    assert_transparent(
        "var o = { p: '>', tag(s, v) { return this.p + s[0] + v; } }; o.tag`a${1}`;",
    );
}

#[test]
fn test_new_with_member_callee() {
    assert_transparent("var ns = { C: function (v) { this.v = v; } }; new ns.C(4).v;");
}

#[test]
fn test_optional_chains_and_destructuring_stay_native() {
    assert_transparent("var o = { a: { b: 1 } }; [o?.a?.b, o.x?.y, o.a.b?.toFixed(1)].join();");
    assert_transparent(
        "var o = {}; [o.a, o.b] = [1, 2]; ({ c: o.c } = { c: 3 }); \
         for (o.d of [4]) {} o.a + o.b + o.c + o.d;",
    );
}

#[test]
fn test_temporaries_in_nested_scopes() {
    assert_transparent(
        "function fib(o, n) { return n < 2 ? n : o.f(o, n - 1) + o.f(o, n - 2); } \
         var o = { f: fib }; o.f(o, 15);",
    );
    assert_transparent("var o = { m() { return 5; } }; var f = () => o.m(); f() + f();");
    assert_transparent(
        "var o = { m() { return 2; } }; class A { x = o.m(); static { A.y = o.m() + 1; } } \
         new A().x + A.y;",
    );
    assert_transparent(
        "var o = { m() { return 7; } }; function g(a = o.m()) { return a; } g() + g(1);",
    );
}

#[test]
fn test_strict_mode_program() {
    assert_transparent("'use strict'; var o = { a: 1 }; o.a += 1; o.b = o.a; o.b;");
}

#[test]
fn test_strict_mode_failures_throw() {
    let frozen_write_in_class = "var f = Object.freeze({ a: 1 }); \
         class W { run(o) { o.a = 2; } } \
         var r; try { new W().run(f); r = 'silent'; } catch (e) { r = e instanceof TypeError; } \
         [r, f.a].join();";
    assert_transparent(frozen_write_in_class);
    assert_eq!(rewritten(frozen_write_in_class), "true,1");

    assert_transparent(
        "function d(o) { 'use strict'; return delete o.a; } var f = Object.freeze({ a: 1 }); \
         var r; try { d(f); r = 'silent'; } catch (e) { r = e instanceof TypeError; } r;",
    );
    assert_transparent(
        "'use strict'; var r; try { 'abc'.x = 1; r = 'silent'; } \
         catch (e) { r = e instanceof TypeError; } r;",
    );
    assert_transparent(
        "var f = Object.freeze({ a: 1 }); var g = () => { 'use strict'; f.a = 3; }; \
         var r; try { g(); r = 'silent'; } catch (e) { r = e instanceof TypeError; } r;",
    );
}

#[test]
fn test_sloppy_mode_failures_stay_silent() {
    let source = "var f = Object.freeze({ a: 1 }); f.a = 2; var d = delete f.a; \
                  'abc'.x = 1; [f.a, d].join();";
    assert_transparent(source);
    assert_eq!(rewritten(source), "1,false");
}

#[test]
fn test_virtual_default_operations_follow_caller_mode() {
    assert_eq!(
        rewritten(
            "var p = new Proxy(Object.freeze({ a: 1 }), {}); p.a = 5; \
             var d = delete p.a; [p.a, d].join();"
        ),
        "1,false"
    );
    assert_eq!(
        rewritten(
            "'use strict'; var p = new Proxy(Object.freeze({ a: 1 }), {}); \
             var r; try { p.a = 5; r = 'silent'; } catch (e) { r = e instanceof TypeError; } r;"
        ),
        "true"
    );
}

#[test]
fn test_runtime_runs_without_es2015_globals() {
    let config = TransformConfig::default().with_seed(5);
    let source = "var p = new Proxy({ v: 2 }, { get(k) { return k + this.v; } }); \
                  var o = { n: 1 }; o.n += 1; delete o.x; \
                  [p.q, o.n, isProxy(p), isProxy(o), objectTarget(p).v].join();";
    let code = rewrite_source(source, "portable.js", &config).unwrap().code;

    let mut engine = ScriptEngine::without_native_proxy(&limits()).unwrap();
    engine
        .eval(
            "delete globalThis.Symbol; delete globalThis.WeakMap; delete globalThis.WeakSet; \
             delete globalThis.Map; delete globalThis.Set; delete globalThis.Reflect;",
        )
        .unwrap();
    assert_eq!(unquote(engine.eval("typeof WeakMap + typeof Symbol").unwrap()), "undefinedundefined");
    assert_eq!(unquote(engine.eval(&code).unwrap()), "q2,2,true,false,2");
}

#[test]
fn test_errors_propagate() {
    let config = TransformConfig::default();
    let err = run_rewritten("var o = null; o.x;", "e.js", &config, &limits()).unwrap_err();
    assert!(matches!(err, EngineError::Script(_)));

    let err = run_rewritten(
        "var p = new Proxy({}, { get() { throw new Error('boom'); } }); p.x;",
        "e.js",
        &config,
        &limits(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("boom"), "{}", err);
}

#[test]
fn test_custom_dispatch_names() {
    let dispatch = DispatchNames {
        getter: "__get".to_string(),
        setter: "__set".to_string(),
        target: "__unwrap".to_string(),
        constructor: "Virtual".to_string(),
        ..Default::default()
    };
    let config = TransformConfig::default().with_dispatch(dispatch);
    let source = "var p = new Virtual({ v: 1 }, { get(k) { return k; } }); \
                  var o = { n: 1, m() { return this.n; } }; o.n = 4; p.q + o.m();";
    let value = run_rewritten(source, "names.js", &config, &limits()).unwrap();
    assert_eq!(unquote(value), "q4");
}

#[test]
fn test_dispatch_names_may_not_shadow_runtime_locals() {
    let dispatch = DispatchNames {
        getter: "target".to_string(),
        ..Default::default()
    };
    let config = TransformConfig::default().with_dispatch(dispatch);
    let err = run_rewritten("var o = { a: 1 }; o.a;", "names.js", &config, &limits()).unwrap_err();
    assert!(
        matches!(err, EngineError::Rewrite(RewriteError::Names(NamesError::Reserved(ref name))) if name == "target"),
        "{:?}",
        err
    );
}

#[test]
fn test_rewritten_program_parse_error() {
    let err = run_rewritten("o.x = ;", "bad.js", &TransformConfig::default(), &limits()).unwrap_err();
    assert!(matches!(err, EngineError::Rewrite(_)));
}
