//! JSON dictionary sources: a single object mapping English words to kana.

use std::fs;
use std::io;
use std::path::Path;

use kana_core::dict::{
    compile, CompileOptions, CompileStats, DictError, KanaMatcher, SortedWordList,
};
use kana_core::normalize::{normalize_entries, NormalizedEntries};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dictionary source must be a JSON object of word to kana")]
    NotAnObject,

    #[error("value for {0:?} is not a string")]
    NonStringValue(String),

    #[error("only {found} entries after normalization (expected at least {min})")]
    TooFewEntries { found: usize, min: usize },

    #[error(transparent)]
    Dict(#[from] DictError),
}

/// Parse a JSON object into raw `(word, kana)` pairs, in file order where
/// the parser preserves it.
pub fn parse_json(text: &str) -> Result<Vec<(String, String)>, SourceError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Object(map) = value else {
        return Err(SourceError::NotAnObject);
    };
    map.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(kana) => Ok((key, kana)),
            _ => Err(SourceError::NonStringValue(key)),
        })
        .collect()
}

/// Read and normalize a source file, rejecting it if fewer than
/// `min_entries` entries survive.
pub fn load_entries(path: &Path, min_entries: usize) -> Result<NormalizedEntries, SourceError> {
    let text = fs::read_to_string(path)?;
    let normalized = normalize_entries(parse_json(&text)?);

    if !normalized.duplicate_keys.is_empty() {
        warn!(
            count = normalized.duplicate_keys.len(),
            sample = ?normalized.duplicate_keys.iter().take(5).collect::<Vec<_>>(),
            "duplicate keys after normalization"
        );
    }
    if !normalized.conflicting_keys.is_empty() {
        warn!(
            count = normalized.conflicting_keys.len(),
            sample = ?normalized.conflicting_keys.iter().take(5).collect::<Vec<_>>(),
            "conflicting values, keeping the last one"
        );
    }

    if normalized.entries.len() < min_entries {
        return Err(SourceError::TooFewEntries {
            found: normalized.entries.len(),
            min: min_entries,
        });
    }
    info!(path = %path.display(), entries = normalized.entries.len(), "loaded source");
    Ok(normalized)
}

/// Both artifacts compiled from one source file.
#[derive(Debug)]
pub struct SourceBuild {
    pub matcher: KanaMatcher,
    pub words: SortedWordList,
    pub stats: CompileStats,
}

impl SourceBuild {
    pub fn from_path(
        path: &Path,
        options: &CompileOptions,
        min_entries: usize,
    ) -> Result<Self, SourceError> {
        let normalized = load_entries(path, min_entries)?;
        let compiled = compile(&normalized.entries, options)?;
        let words = SortedWordList::from_entries(&normalized.entries, &options.source_label);
        words.check_consistency(&compiled.matcher)?;
        Ok(Self {
            matcher: compiled.matcher,
            words,
            stats: compiled.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kana_core::dict::KanaDictionary;

    fn write_source(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("source.json");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_parse_json_object() {
        let mut pairs = parse_json(r#"{"hello": "ハロー", "World": "ワールド"}"#).unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("World".to_string(), "ワールド".to_string()),
                ("hello".to_string(), "ハロー".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_json_rejects_non_string_value() {
        let err = parse_json(r#"{"hello": 1}"#).unwrap_err();
        assert!(matches!(err, SourceError::NonStringValue(k) if k == "hello"));
    }

    #[test]
    fn test_parse_json_rejects_non_object() {
        assert!(matches!(
            parse_json(r#"["hello"]"#),
            Err(SourceError::NotAnObject)
        ));
        assert!(matches!(parse_json("{"), Err(SourceError::Json(_))));
    }

    #[test]
    fn test_load_entries_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, r#"{" Hello ": " ハロー ", "zip": "ジップ", "": "x"}"#);
        let normalized = load_entries(&path, 1).unwrap();
        let keys: Vec<&str> = normalized.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["hello", "zip"]);
        assert_eq!(normalized.entries[0].value, "ハロー");
    }

    #[test]
    fn test_load_entries_min_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, r#"{"hello": "ハロー"}"#);
        assert!(matches!(
            load_entries(&path, 2),
            Err(SourceError::TooFewEntries { found: 1, min: 2 })
        ));
    }

    #[test]
    fn test_build_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(
            &dir,
            r#"{"hello": "ハロー", "world": "ワールド", "zip": "ジップ"}"#,
        );
        let options = CompileOptions::default().with_label("source.json");
        let build = SourceBuild::from_path(&path, &options, 1).unwrap();

        assert_eq!(build.stats.entry_count, 3);
        assert_eq!(build.matcher.lookup("world"), Some("ワールド"));
        assert_eq!(build.words.len(), 3);
        assert_eq!(build.words.source_label(), "source.json");
    }

    #[test]
    fn test_build_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceBuild::from_path(
            &dir.path().join("missing.json"),
            &CompileOptions::default(),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
