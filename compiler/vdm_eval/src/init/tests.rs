use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use vdm_ir::{BinaryOp, DefinitionKind, ExprKind, Location, Module, StateDef, Type};

use super::*;
use crate::hooks::{EvalHook, HookError, HookRegistry};
use crate::test_support::*;
use crate::EvalConfig;

#[derive(Default)]
struct ModuleCounter {
    attempts: AtomicUsize,
}

impl EvalHook for ModuleCounter {
    fn before_module(&self, _module: &Module, _ctx: &Context) -> Result<(), HookError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counted_interpreter(config: EvalConfig) -> (Interpreter, Arc<ModuleCounter>) {
    let hooks = Arc::new(HookRegistry::new());
    let counter = hooks.register(ModuleCounter::default());
    let interp = Interpreter::builder().hooks(hooks).config(config).build();
    (interp, counter)
}

fn lookup(interp: &Interpreter, n: &str) -> Option<Value> {
    interp.root().lookup(name(n))
}

#[test]
fn forward_reference_across_modules_takes_a_second_pass() {
    let modules = ModuleList::new(vec![
        module("A", vec![value_def("a", bin(BinaryOp::Add, var("b"), int(1)))]),
        module("B", vec![value_def("b", int(2))]),
    ]);
    let mut interp = Interpreter::new();
    let report = initialize(&modules, &mut interp).unwrap();

    assert_eq!(
        report,
        InitReport {
            passes: 2,
            initialized: vec![name("B"), name("A")],
        }
    );
    assert_eq!(lookup(&interp, "a"), Some(Value::int(3)));
}

#[test]
fn forward_reference_within_a_module_resolves_in_one_pass() {
    let modules = ModuleList::new(vec![module(
        "M",
        vec![
            value_def("x", bin(BinaryOp::Mul, var("y"), int(2))),
            value_def("y", int(5)),
        ],
    )]);
    let mut interp = Interpreter::new();
    let report = initialize(&modules, &mut interp).unwrap();

    assert_eq!(report.passes, 1);
    assert_eq!(lookup(&interp, "x"), Some(Value::int(10)));
}

#[test]
fn values_may_call_functions_declared_later() {
    let modules = ModuleList::new(vec![module(
        "M",
        vec![
            value_def("v", call("double", vec![int(21)])),
            function("double", &["n"], bin(BinaryOp::Add, var("n"), var("n"))),
        ],
    )]);
    let mut interp = Interpreter::new();
    initialize(&modules, &mut interp).unwrap();
    assert_eq!(lookup(&interp, "v"), Some(Value::int(42)));
}

#[test]
fn circular_values_exhaust_every_pass() {
    let modules = ModuleList::new(vec![
        module("A", vec![value_def("a", var("b"))]),
        module("B", vec![value_def("b", var("a"))]),
    ]);
    let (mut interp, counter) = counted_interpreter(EvalConfig::new());
    let err = initialize(&modules, &mut interp).unwrap_err();

    assert!(err.is_not_in_scope());
    assert_eq!(err.number(), 4034);
    assert_eq!(counter.attempts.load(Ordering::SeqCst), 10);
}

#[test]
fn pass_budget_follows_config() {
    let modules = ModuleList::new(vec![
        module("A", vec![value_def("a", var("b"))]),
        module("B", vec![value_def("b", var("a"))]),
    ]);
    let (mut interp, counter) = counted_interpreter(EvalConfig::new().init_passes(2));
    assert!(initialize(&modules, &mut interp).is_err());
    assert_eq!(counter.attempts.load(Ordering::SeqCst), 4);
}

#[test]
fn other_errors_are_preferred_over_not_in_scope() {
    let modules = ModuleList::new(vec![
        module("A", vec![value_def("a", var("b"))]),
        module("B", vec![value_def("b", bin(BinaryOp::IntDiv, int(1), int(0)))]),
    ]);
    let mut interp = Interpreter::new();
    let err = initialize(&modules, &mut interp).unwrap_err();
    assert_eq!(err.number(), 4134);
}

#[test]
fn runaway_recursion_stops_after_one_pass() {
    let modules = ModuleList::new(vec![module(
        "M",
        vec![
            function(
                "f",
                &["n"],
                call("f", vec![bin(BinaryOp::Add, var("n"), int(1))]),
            ),
            value_def("v", call("f", vec![int(0)])),
        ],
    )]);
    let (mut interp, counter) = counted_interpreter(EvalConfig::new().max_call_depth(64));
    let err = initialize(&modules, &mut interp).unwrap_err();

    assert!(err.is_stack_overflow());
    assert_eq!(counter.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn renames_resolve_through_the_root() {
    let alias = Definition::new(
        name("alias"),
        DefinitionKind::Rename { target: name("a") },
        Location::DUMMY,
    );
    let modules = ModuleList::new(vec![
        module("B", vec![alias]),
        module("A", vec![value_def("a", int(7))]),
    ]);
    let mut interp = Interpreter::new();
    let report = initialize(&modules, &mut interp).unwrap();

    assert_eq!(report.passes, 2);
    assert_eq!(lookup(&interp, "alias"), Some(Value::int(7)));
}

#[test]
fn module_state_is_visible_to_operations() {
    let record = record_type("S", &[("count", Type::Int)]);
    let init = expr(ExprKind::MkRecord {
        ty: Arc::clone(&record),
        args: vec![int(3)],
    });
    let state = Definition::new(
        name("S"),
        DefinitionKind::State(StateDef {
            record,
            init: Some(init),
        }),
        Location::DUMMY,
    );
    let bump = operation(
        "bump",
        &[],
        block(
            vec![],
            vec![
                assign("count", bin(BinaryOp::Add, var("count"), int(1))),
                ret(var("count")),
            ],
        ),
    );
    let modules = ModuleList::new(vec![module("M", vec![state, bump])]);
    let mut interp = Interpreter::new();
    initialize(&modules, &mut interp).unwrap();

    assert_eq!(interp.call(name("bump"), vec![]).unwrap(), Value::int(4));
    assert_eq!(interp.call(name("bump"), vec![]).unwrap(), Value::int(5));
    // State fields are not exported.
    assert_eq!(lookup(&interp, "count"), None);
}

#[test]
fn classes_are_registered_not_exported() {
    let modules = ModuleList::new(vec![class(
        "Counter",
        vec![
            instance_variable("total", int(0)),
            value_def("limit", int(10)),
        ],
    )]);
    let mut interp = Interpreter::new();
    let report = initialize(&modules, &mut interp).unwrap();

    assert_eq!(report.initialized, vec![name("Counter")]);
    assert!(interp.classes().contains(name("Counter")));
    assert_eq!(lookup(&interp, "limit"), None);

    let entry = interp.classes().get(name("Counter")).unwrap();
    assert_eq!(entry.context.local(name("limit")), Some(Value::int(10)));
    // Instance variables belong to objects.
    assert_eq!(entry.context.local(name("total")), None);
}

#[test]
fn empty_module_list_succeeds_immediately() {
    let modules = ModuleList::default();
    let mut interp = Interpreter::new();
    let report = initialize(&modules, &mut interp).unwrap();
    assert_eq!(
        report,
        InitReport {
            passes: 1,
            initialized: vec![],
        }
    );
}

#[test]
fn initial_context_is_empty() {
    let ctx = ModuleList::default().initial_context();
    assert!(ctx.local_bindings().is_empty());
    assert!(ctx.parent().is_none());
}

#[test]
fn module_scopes_are_released_with_the_last_interpreter() {
    let modules = ModuleList::new(vec![module(
        "M",
        vec![
            function("twice", &["x"], bin(BinaryOp::Mul, var("x"), int(2))),
            value_def("four", call("twice", vec![int(2)])),
        ],
    )]);
    let mut interp = Interpreter::new();
    initialize(&modules, &mut interp).unwrap();
    let scope = lookup(&interp, "twice")
        .unwrap()
        .as_function()
        .unwrap()
        .closure
        .clone();
    let root = interp.root().clone();

    let sibling = interp.for_thread(crate::ThreadId(1));
    drop(interp);
    assert_eq!(sibling.root().lookup(name("four")), Some(Value::int(4)));
    assert!(scope.strong_count() > 1);

    drop(sibling);
    assert_eq!(scope.strong_count(), 1);
    assert_eq!(root.lookup(name("twice")), None);
}
