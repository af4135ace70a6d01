//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub compile: CompileSettings,
    pub source: SourceSettings,
    pub prefix: PrefixSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompileSettings {
    pub checkpoint_span: u32,
    pub self_check: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub min_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrefixSettings {
    pub default_limit: usize,
    pub min_limit: usize,
    pub max_limit: usize,
    pub overscan: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(compile.checkpoint_span);
    check_positive!(prefix.default_limit);
    check_positive!(prefix.min_limit);
    check_positive!(prefix.max_limit);
    check_positive!(prefix.overscan);

    let p = &s.prefix;
    if p.min_limit > p.max_limit {
        return Err(SettingsError::InvalidValue {
            field: "prefix.min_limit".to_string(),
            reason: "must not exceed prefix.max_limit".to_string(),
        });
    }
    if !(p.min_limit..=p.max_limit).contains(&p.default_limit) {
        return Err(SettingsError::InvalidValue {
            field: "prefix.default_limit".to_string(),
            reason: "must lie within [min_limit, max_limit]".to_string(),
        });
    }

    Ok(())
}
