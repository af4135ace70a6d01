use super::entries;
use crate::dict::{DictError, Trie};

#[test]
fn test_node_and_key_counts() {
    let entries = entries(&[("hello", "ハロー"), ("help", "ヘルプ")]);
    let trie = Trie::build(&entries).unwrap();
    // root + h e l l o + p
    assert_eq!(trie.node_count(), 7);
    assert_eq!(trie.key_count(), 2);
    assert!(trie.root().value.is_none());
}

#[test]
fn test_children_are_ordered() {
    let entries = entries(&[("zip", "ジップ"), ("app", "アップ"), ("map", "マップ")]);
    let trie = Trie::build(&entries).unwrap();
    let firsts: Vec<char> = trie.root().children.keys().copied().collect();
    assert_eq!(firsts, vec!['a', 'm', 'z']);
}

#[test]
fn test_prefix_key_is_terminal() {
    let entries = entries(&[("cat", "キャット"), ("cats", "キャッツ")]);
    let trie = Trie::build(&entries).unwrap();
    let mut id = 0;
    for c in "cat".chars() {
        id = trie.node(id).children[&c];
    }
    assert_eq!(trie.node(id).value, Some("キャット"));
    assert_eq!(trie.node(id).children.len(), 1);
}

#[test]
fn test_duplicate_with_same_value() {
    let entries = entries(&[("cat", "キャット"), ("cat", "キャット")]);
    let trie = Trie::build(&entries).unwrap();
    assert_eq!(trie.key_count(), 1);
}

#[test]
fn test_duplicate_with_conflicting_value() {
    let entries = entries(&[("cat", "キャット"), ("cat", "カット")]);
    match Trie::build(&entries) {
        Err(DictError::ConflictingValue {
            key,
            existing,
            incoming,
        }) => {
            assert_eq!(key, "cat");
            assert_eq!(existing, "キャット");
            assert_eq!(incoming, "カット");
        }
        other => panic!("expected ConflictingValue, got {other:?}"),
    }
}

#[test]
fn test_empty_key_and_value() {
    let empty_key = entries(&[("", "カラ")]);
    assert!(matches!(Trie::build(&empty_key), Err(DictError::EmptyKey)));

    let empty_value = entries(&[("blank", "")]);
    assert!(matches!(
        Trie::build(&empty_value),
        Err(DictError::EmptyValue(k)) if k == "blank"
    ));
}

#[test]
fn test_unnormalized_keys_rejected() {
    for key in ["Hello", " zip", "zip ", "CAFÉ"] {
        let entries = entries(&[(key, "カナ")]);
        assert!(
            matches!(Trie::build(&entries), Err(DictError::UnnormalizedKey(k)) if k == key),
            "{key:?}"
        );
    }

    let entries = entries(&[("don't", "ドント"), ("café", "カフェ")]);
    assert_eq!(Trie::build(&entries).unwrap().key_count(), 2);
}
