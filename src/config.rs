use serde::Serialize;

/// How the driver prints the board after each move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Driver configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Board snapshot format.
    pub output: OutputFormat,
    /// Coordinate moves replayed before reading stdin.
    pub script: Vec<String>,
    /// Whether text boards carry rank and file labels.
    pub show_coords: bool,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            log_filter: lookup("CHESS_LOG")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            output: lookup("CHESS_OUTPUT")
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(defaults.output),
            script: lookup("CHESS_SCRIPT")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.script),
            show_coords: lookup("CHESS_SHOW_COORDS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.show_coords),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_filter: "chess_rules=info".to_string(),
            output: OutputFormat::Text,
            script: Vec::new(),
            show_coords: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_filter, "chess_rules=info");
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.script.is_empty());
        assert!(config.show_coords);
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        let config = load(&[]);
        assert_eq!(config.log_filter, "chess_rules=info");
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("CHESS_LOG", "chess_rules=debug"),
            ("CHESS_OUTPUT", "JSON"),
            ("CHESS_SCRIPT", "e2e4  e7e5\nf1c4"),
            ("CHESS_SHOW_COORDS", "false"),
        ]);
        assert_eq!(config.log_filter, "chess_rules=debug");
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.script, ["e2e4", "e7e5", "f1c4"]);
        assert!(!config.show_coords);
    }

    #[test]
    fn chess_log_wins_over_rust_log() {
        let config = load(&[("RUST_LOG", "warn"), ("CHESS_LOG", "trace")]);
        assert_eq!(config.log_filter, "trace");
        let config = load(&[("RUST_LOG", "warn")]);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = load(&[("CHESS_OUTPUT", "xml"), ("CHESS_SHOW_COORDS", "maybe")]);
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.show_coords);
    }
}
