use super::*;

#[test]
fn test_deep_recursion() {
    // This would overflow without stack growth
    fn deep_recurse(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
    }

    assert_eq!(deep_recurse(100_000), 100_000);
}

#[test]
fn test_works_with_result_type() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(123));
    assert_eq!(result, Ok(123));
}

#[test]
fn test_call_depth_limit() {
    let mut depth = CallDepth::new(2);
    assert!(depth.enter().is_ok());
    assert!(depth.enter().is_ok());
    assert_eq!(depth.enter(), Err(DepthExceeded { limit: 2 }));
    assert_eq!(depth.current(), 2);

    depth.leave();
    assert_eq!(depth.current(), 1);
    assert!(depth.enter().is_ok());
}

#[test]
fn test_leave_never_underflows() {
    let mut depth = CallDepth::new(4);
    depth.leave();
    assert_eq!(depth.current(), 0);
    assert_eq!(depth.limit(), 4);
}
