use std::{fmt, fs, io, path::Path};

use mathml_semantics::SemanticsConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(flatten)]
    pub semantics: SemanticsConfig,
    /// Check the structural invariants of every tree before printing it.
    pub verify: bool,
}

/// Why a config file could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "cannot read the file: {err}"),
            ConfigError::Parse(err) => write!(f, "{err}"),
        }
    }
}

/// Loads the configuration from a TOML file. Missing keys keep their defaults.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

fn parse_config(s: &str) -> Result<Config, ConfigError> {
    toml::from_str(s).map_err(ConfigError::Parse)
}

#[cfg(test)]
mod tests {
    use mathml_semantics::PrettyPrint;

    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
pretty-print = "always"
brief = true
verify = true
        "#;
        let config = parse_config(toml_content).unwrap();
        assert!(matches!(config.semantics.pretty_print, PrettyPrint::Always));
        assert!(config.semantics.brief);
        assert!(config.verify);
    }

    #[test]
    fn test_invalid_config() {
        let invalid_toml = "invalid_toml";
        let result = parse_config(invalid_toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
brief = true
        "#;
        let config = parse_config(toml_content).unwrap();
        assert!(matches!(config.semantics.pretty_print, PrettyPrint::Never));
        assert!(config.semantics.brief);
        assert!(!config.verify);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config_file(Path::new("does/not/exist.toml"));
        let Err(err @ ConfigError::Io(_)) = result else {
            panic!("expected an I/O error");
        };
        assert!(err.to_string().starts_with("cannot read the file: "));
    }
}
