use pretty_assertions::assert_eq;
use vdm_ir::{Location, Name, Type};

use super::*;

fn n(s: &str) -> Name {
    Name::intern(s)
}

#[test]
fn lookup_walks_outward_and_shadows() {
    let global = Context::global();
    global.bind(n("x"), Value::int(1));
    let module = global.module_scope(n("M"), Location::DUMMY);
    let block = module.child_scope("block", Location::DUMMY);
    block.bind(n("x"), Value::int(2));

    assert_eq!(block.lookup(n("x")), Some(Value::int(2)));
    assert_eq!(module.lookup(n("x")), Some(Value::int(1)));
    assert_eq!(block.lookup(n("y")), None);
    assert!(!block.is_bound(n("y")));
}

#[test]
fn assignment_respects_mutability() {
    let global = Context::global();
    global.declare(n("counter"), Value::int(0));
    global.bind(n("k"), Value::int(5));
    let inner = global.child_scope("inner", Location::DUMMY);

    assert_eq!(inner.assign(n("counter"), Value::int(1)), Ok(()));
    assert_eq!(global.lookup(n("counter")), Some(Value::int(1)));
    assert_eq!(inner.assign(n("k"), Value::int(6)), Err(AssignError::Immutable));
    assert_eq!(inner.assign(n("nope"), Value::int(6)), Err(AssignError::Undefined));
}

#[test]
fn bind_all_installs_match_results() {
    let ctx = Context::global();
    let mut b = Bindings::new();
    b.bind(n("a"), Value::int(1), Location::DUMMY).ok();
    b.bind(n("b"), Value::int(2), Location::DUMMY).ok();
    ctx.bind_all(&b);
    assert_eq!(
        ctx.local_bindings(),
        vec![(n("a"), Value::int(1)), (n("b"), Value::int(2))]
    );
}

#[test]
fn call_frames_form_dynamic_stack() {
    let global = Context::global();
    let f_site = Location::at(n("t.vdmsl"), 3, 1);
    let g_site = Location::at(n("t.vdmsl"), 8, 1);

    let f = global.call_frame("f", f_site, &global, None);
    let body = f.child_scope("let", Location::DUMMY);
    let g = global.call_frame("g", g_site, &body, None);

    assert_eq!(f.call_depth(), 1);
    assert_eq!(g.call_depth(), 2);
    assert!(g.parent().is_some_and(|p| p.ptr_eq(&global)));

    let names: Vec<String> = g.call_stack().iter().map(|c| c.title().to_string()).collect();
    assert_eq!(names, vec!["g".to_string(), "f".to_string()]);

    let trace = g.backtrace();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.frames()[0].location, g_site);
}

#[test]
fn self_object_comes_from_enclosing_call() {
    let global = Context::global();
    let state = global.object_scope(n("Account"), Location::DUMMY);
    let Value::Object(obj) = Value::object(n("Account"), state) else {
        panic!("expected object");
    };
    let call = global.call_frame("deposit", Location::DUMMY, &global, Some(obj.clone()));
    let block = call.child_scope("block", Location::DUMMY);
    assert_eq!(block.self_object().map(|o| o.id), Some(obj.id));
    assert!(global.self_object().is_none());
}

#[test]
fn frames_list_lexical_chain() {
    let global = Context::global();
    let module = global.module_scope(n("M"), Location::DUMMY);
    let kinds: Vec<FrameKind> = module.frames().map(Context::kind).collect();
    assert_eq!(kinds, vec![FrameKind::Module(n("M")), FrameKind::Global]);
    assert_eq!(global.title(), "global environment");
}

#[test]
fn instantiation_scope_resolves_type_parameters() {
    let t = n("T");
    let global = Context::global();
    assert_eq!(global.resolve_type(&Type::Param(t)), Type::Param(t));

    let outer = global.instantiation_scope(vec![(t, Type::Bool)], Location::DUMMY);
    let inner = outer
        .child_scope("call", Location::DUMMY)
        .instantiation_scope(vec![(t, Type::Int)], Location::DUMMY);
    assert_eq!(
        outer.resolve_type(&Type::Seq(Box::new(Type::Param(t)))),
        Type::Seq(Box::new(Type::Bool))
    );
    assert_eq!(inner.resolve_type(&Type::Param(t)), Type::Int);
}

#[test]
fn clearing_a_frame_releases_closures_over_it() {
    let global = Context::global();
    let module = global.module_scope(n("M"), Location::DUMMY);
    let body = std::sync::Arc::new(vdm_ir::Expr::new(
        vdm_ir::ExprKind::Int(1),
        Location::DUMMY,
    ));
    let f = crate::FunctionValue::lambda(Vec::new(), body, module.clone());
    module.bind(n("f"), Value::function(f));
    assert_eq!(module.strong_count(), 2);

    module.clear();
    assert_eq!(module.strong_count(), 1);
    assert_eq!(module.lookup(n("f")), None);
}
