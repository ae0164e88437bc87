use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults() {
    let config = EvalConfig::default();
    assert_eq!(config.max_call_depth, 1024);
    assert_eq!(config.init_passes, 5);
    assert!(config.dedupe_bindings);
    assert!(config.check_preconditions);
}

#[test]
fn setters_chain() {
    let config = EvalConfig::new()
        .max_call_depth(16)
        .init_passes(2)
        .dedupe_bindings(false)
        .check_preconditions(false);
    assert_eq!(
        config,
        EvalConfig {
            max_call_depth: 16,
            init_passes: 2,
            dedupe_bindings: false,
            check_preconditions: false,
        }
    );
}
