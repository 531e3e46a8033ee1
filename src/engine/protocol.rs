//! The per-engine protocol document: a key→template TOML file describing
//! how to talk to one external engine binary over the UCI wire. Loaded
//! once per [`crate::engine::Engine`] and validated at construction time.

use include_flate::flate;
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

flate!(static DEFAULT_UCI_TOML: str from "assets/uci_protocol.toml");

const PLACEHOLDER_INT: &str = "{int}";
const PLACEHOLDER_STR: &str = "{str}";
const PLACEHOLDER_BOOL: &str = "{bool}";

/// A key→template document describing one external engine's UCI dialect.
/// Every templated field carries exactly one placeholder of the kind
/// named in its validation rule; [`ProtocolConfig::validate`] checks this
/// for every constructor, per the spec's "driver validates at load time"
/// requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub executable: String,
    pub name: Option<String>,
    pub description: Option<String>,

    #[serde(default = "default_show_uci")]
    pub show_uci: String,
    #[serde(default = "default_uci_ok_token")]
    pub uci_ok_token: String,
    #[serde(default = "default_isready")]
    pub isready: String,
    #[serde(default = "default_readyok_token")]
    pub readyok_token: String,
    pub newgame: Option<String>,
    #[serde(default = "default_stop")]
    pub stop: String,
    #[serde(default = "default_quit")]
    pub quit: String,

    /// Exactly one `{str}` placeholder (the FEN to analyze).
    pub position_template: String,
    /// Exactly one `{int}` placeholder (search depth).
    pub go_depth_template: String,
    /// Exactly one `{int}` placeholder (node cap).
    pub go_nodes_template: String,
    /// Exactly one `{int}` placeholder (time cap, milliseconds).
    pub go_time_template: String,

    /// Exactly one `{int}` placeholder, when present.
    pub multipv_template: Option<String>,
    /// Exactly one `{int}` placeholder, when present.
    pub threads_template: Option<String>,
    /// Exactly one `{int}` placeholder, when present.
    pub hash_template: Option<String>,
    /// Exactly one `{bool}` placeholder, when present.
    pub chess960_template: Option<String>,
    /// Exactly one `{bool}` placeholder, when present.
    pub wdl_template: Option<String>,

    #[serde(default)]
    pub setup: Vec<String>,
}

fn default_show_uci() -> String {
    "uci".to_owned()
}
fn default_uci_ok_token() -> String {
    "uciok".to_owned()
}
fn default_isready() -> String {
    "isready".to_owned()
}
fn default_readyok_token() -> String {
    "readyok".to_owned()
}
fn default_stop() -> String {
    "stop".to_owned()
}
fn default_quit() -> String {
    "quit".to_owned()
}

impl ProtocolConfig {
    /// The built-in plain-UCI protocol document, compressed into the
    /// binary with `include-flate`.
    pub fn default_uci() -> ProtocolConfig {
        let mut config: ProtocolConfig =
            toml::from_str(&DEFAULT_UCI_TOML).expect("built-in UCI protocol document is well-formed");
        config.validate().expect("built-in UCI protocol document validates");
        config
    }

    pub fn from_toml_str(s: &str) -> Result<ProtocolConfig, EngineError> {
        let config: ProtocolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every templated field carries exactly one placeholder
    /// of its expected kind and no placeholder of a different kind.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_template("position_template", &self.position_template, PLACEHOLDER_STR)?;
        check_template("go_depth_template", &self.go_depth_template, PLACEHOLDER_INT)?;
        check_template("go_nodes_template", &self.go_nodes_template, PLACEHOLDER_INT)?;
        check_template("go_time_template", &self.go_time_template, PLACEHOLDER_INT)?;
        if let Some(t) = &self.multipv_template {
            check_template("multipv_template", t, PLACEHOLDER_INT)?;
        }
        if let Some(t) = &self.threads_template {
            check_template("threads_template", t, PLACEHOLDER_INT)?;
        }
        if let Some(t) = &self.hash_template {
            check_template("hash_template", t, PLACEHOLDER_INT)?;
        }
        if let Some(t) = &self.chess960_template {
            check_template("chess960_template", t, PLACEHOLDER_BOOL)?;
        }
        if let Some(t) = &self.wdl_template {
            check_template("wdl_template", t, PLACEHOLDER_BOOL)?;
        }
        Ok(())
    }

    pub fn fill_int(template: &str, value: i64) -> String {
        template.replace(PLACEHOLDER_INT, &value.to_string())
    }

    pub fn fill_str(template: &str, value: &str) -> String {
        template.replace(PLACEHOLDER_STR, value)
    }

    pub fn fill_bool(template: &str, value: bool) -> String {
        template.replace(PLACEHOLDER_BOOL, if value { "true" } else { "false" })
    }
}

fn check_template(key: &'static str, template: &str, expected: &'static str) -> Result<(), EngineError> {
    let others = [PLACEHOLDER_INT, PLACEHOLDER_STR, PLACEHOLDER_BOOL]
        .into_iter()
        .filter(|&p| p != expected);
    for other in others {
        if template.contains(other) {
            return Err(EngineError::TemplateMismatch { key, expected, found: 0 });
        }
    }
    let found = template.matches(expected).count();
    if found != 1 {
        return Err(EngineError::TemplateMismatch { key, expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_protocol_validates() {
        let config = ProtocolConfig::default_uci();
        assert_eq!(config.executable, "stockfish");
    }

    #[test]
    fn rejects_missing_placeholder() {
        let mut config = ProtocolConfig::default_uci();
        config.position_template = "position startpos".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_wrong_placeholder_kind() {
        let mut config = ProtocolConfig::default_uci();
        config.go_nodes_template = "go nodes {str}".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn fill_helpers_substitute_in_place() {
        assert_eq!(ProtocolConfig::fill_int("go nodes {int}", 1000), "go nodes 1000");
        assert_eq!(ProtocolConfig::fill_str("position fen {str}", "abc"), "position fen abc");
        assert_eq!(ProtocolConfig::fill_bool("x {bool}", true), "x true");
    }
}
