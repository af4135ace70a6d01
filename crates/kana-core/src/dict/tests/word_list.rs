use super::{entries, sample_entries, sample_matcher};
use crate::dict::{compile, CompileOptions, SortedWordList};

#[test]
fn test_from_words_sorts_and_dedups() {
    let list = SortedWordList::from_words(
        ["zip", "cat", "hello", "cat"].map(String::from),
        "words",
    );
    assert_eq!(list.words(), &["cat", "hello", "zip"]);
    assert_eq!(list.len(), 3);
    assert!(list.contains("hello"));
    assert!(!list.contains("hel"));
}

#[test]
fn test_find_words_by_prefix() {
    let list = SortedWordList::from_entries(&sample_entries(), "sample");
    assert_eq!(
        list.find_words_by_prefix("cat", 10),
        vec!["cat", "catalog", "category"]
    );
    assert_eq!(list.find_words_by_prefix("cat", 2), vec!["cat", "catalog"]);
    assert_eq!(list.find_words_by_prefix("he", 10), vec!["hello", "help"]);
    assert_eq!(list.find_words_by_prefix("zipper", 10), Vec::<&str>::new());
    assert_eq!(list.find_words_by_prefix("zz", 10), Vec::<&str>::new());
}

#[test]
fn test_find_words_by_prefix_empty_or_zero() {
    let list = SortedWordList::from_entries(&sample_entries(), "sample");
    assert!(list.find_words_by_prefix("", 10).is_empty());
    assert!(list.find_words_by_prefix("cat", 0).is_empty());
}

#[test]
fn test_check_consistency() {
    let matcher = sample_matcher();
    let list = SortedWordList::from_entries(&sample_entries(), "sample");
    list.check_consistency(&matcher).unwrap();
}

#[test]
fn test_check_consistency_detects_mismatch() {
    let matcher = sample_matcher();

    let mut fewer = sample_entries();
    fewer.pop();
    let short = SortedWordList::from_entries(&fewer, "short");
    assert!(short.check_consistency(&matcher).is_err());

    let mut renamed = sample_entries();
    renamed[0].key = "cab".to_string();
    let other = SortedWordList::from_entries(&renamed, "renamed");
    assert!(other.check_consistency(&matcher).is_err());
}

#[test]
fn test_matcher_keys_match_word_list() {
    let entries = entries(&[("b", "ビー"), ("a", "エー"), ("ab", "アブ")]);
    let matcher = compile(&entries, &CompileOptions::default())
        .unwrap()
        .matcher;
    let list = SortedWordList::from_entries(&entries, "letters");
    assert_eq!(matcher.keys(), list.words());
}
