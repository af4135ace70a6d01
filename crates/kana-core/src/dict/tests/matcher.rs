use super::{entries, sample_entries};
use crate::dict::{MatcherProgram, RadixTree, Trie, ValueTable};

fn emit(entries: &[crate::dict::DictEntry]) -> (MatcherProgram, Vec<String>) {
    let trie = Trie::build(entries).unwrap();
    let tree = RadixTree::compact(&trie);
    let values = ValueTable::from_entries(entries);
    let program = MatcherProgram::emit(&tree, &values).unwrap();
    let values = values.values().iter().map(|v| v.to_string()).collect();
    (program, values)
}

#[test]
fn test_run_exact_keys() {
    let entries = sample_entries();
    let (program, values) = emit(&entries);
    for entry in &entries {
        let idx = program.run(&entry.key).unwrap();
        assert_eq!(values[idx as usize], entry.value, "{}", entry.key);
    }
}

#[test]
fn test_run_misses() {
    let (program, _) = emit(&sample_entries());
    assert_eq!(program.run(""), None);
    assert_eq!(program.run("xyz"), None);
    // prefix of a key, not itself a key
    assert_eq!(program.run("hel"), None);
    assert_eq!(program.run("ca"), None);
    // key plus a suffix
    assert_eq!(program.run("helpers"), None);
    // diverges inside a multi-character edge
    assert_eq!(program.run("catx"), None);
}

#[test]
fn test_shared_value_index() {
    let (program, _) = emit(&sample_entries());
    let cat = program.run("cat").unwrap();
    let kat = program.run("kat").unwrap();
    assert_eq!(cat, kat);
}

#[test]
fn test_counts() {
    let entries = entries(&[("hello", "ハロー"), ("help", "ヘルプ")]);
    let (program, values) = emit(&entries);
    assert_eq!(program.node_count(), 4);
    assert_eq!(program.edge_count(), 3);
    assert_eq!(program.label_bytes(), "hel".len() + "lo".len() + "p".len());
    assert_eq!(program.terminal_count(), 2);
    assert_eq!(values.len(), 2);
}

#[test]
fn test_keys_ascending() {
    let entries = sample_entries();
    let (program, _) = emit(&entries);
    let keys: Vec<String> = program.keys().into_iter().map(|(k, _)| k).collect();
    let expected: Vec<String> = entries.iter().map(|e| e.key.clone()).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_non_ascii_keys() {
    let entries = entries(&[("café", "カフェ"), ("cafe", "カフェ"), ("naïve", "ナイーブ")]);
    let (program, _) = emit(&entries);
    assert!(program.run("café").is_some());
    assert_eq!(program.run("café"), program.run("cafe"));
    assert!(program.run("naïve").is_some());
    assert_eq!(program.run("caf"), None);
}

#[test]
fn test_validate_accepts_emitted_program() {
    let (program, values) = emit(&sample_entries());
    program.validate(values.len()).unwrap();
    assert!(program.validate(values.len() - 1).is_err());
}
