mod matcher;
mod trie;
mod word_list;

use crate::dict::{compile, CompileOptions, DictEntry, KanaMatcher};

pub(super) fn entries(pairs: &[(&str, &str)]) -> Vec<DictEntry> {
    pairs.iter().map(|&(k, v)| DictEntry::new(k, v)).collect()
}

pub(super) fn sample_entries() -> Vec<DictEntry> {
    entries(&[
        ("cat", "キャット"),
        ("catalog", "カタログ"),
        ("category", "カテゴリー"),
        ("hello", "ハロー"),
        ("help", "ヘルプ"),
        ("kat", "キャット"),
        ("world", "ワールド"),
        ("zip", "ジップ"),
    ])
}

pub(super) fn sample_matcher() -> KanaMatcher {
    compile(&sample_entries(), &CompileOptions::default().with_label("sample"))
        .unwrap()
        .matcher
}

/// `count` distinct three-character katakana values keyed `word000..`.
pub(super) fn numbered_entries(count: usize) -> Vec<DictEntry> {
    let kana: Vec<char> = "アイウエオカキクケコ".chars().collect();
    (0..count)
        .map(|i| {
            let value: String = [kana[i % 10], kana[(i / 10) % 10], kana[(i / 100) % 10]]
                .iter()
                .collect();
            DictEntry::new(format!("word{i:03}"), value)
        })
        .collect()
}
