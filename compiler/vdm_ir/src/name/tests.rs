use super::*;

#[test]
fn test_index_round_trips() {
    let name = Name::from_index(1000);
    assert_eq!(name.index(), 1000);
    assert_eq!(Name::EMPTY.index(), 0);
}

#[test]
fn test_name_empty() {
    assert_eq!(Name::EMPTY.as_str(), "");
    assert_eq!(Name::intern(""), Name::EMPTY);
}

#[test]
fn test_intern_is_stable() {
    let a = Name::intern("card_of_s");
    let b = Name::intern("card_of_s");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "card_of_s");
    assert_eq!(a.to_string(), "card_of_s");
}

#[test]
fn test_name_ord_follows_text() {
    let b = Name::intern("ord_b");
    let a = Name::intern("ord_a");
    assert!(a < b);
    let mut names = vec![b, a];
    names.sort();
    assert_eq!(names, vec![a, b]);
}
