use super::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();
    let hello = interner.intern("hello");
    let world = interner.intern("world");
    assert_ne!(hello, world);
    assert_eq!(interner.lookup(hello), "hello");
    assert_eq!(interner.lookup(world), "world");
    assert_eq!(interner.intern("hello"), hello);
}

#[test]
fn test_empty_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.len(), 1);
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_len_counts_distinct() {
    let interner = StringInterner::new();
    interner.intern("a");
    interner.intern("b");
    interner.intern("a");
    assert_eq!(interner.len(), 3);
}

#[test]
fn test_concurrent_interning() {
    let interner = std::sync::Arc::new(StringInterner::new());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let interner = std::sync::Arc::clone(&interner);
            std::thread::spawn(move || {
                (0..100)
                    .map(|i| interner.intern(&format!("n{}", (i + t) % 100)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        let names = handle.join().unwrap();
        for name in names {
            assert!(interner.lookup(name).starts_with('n'));
        }
    }
    assert_eq!(interner.len(), 101);
}
