//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `api_url`.
pub const ENV_API_URL: &str = "LEDGER_API_URL";
/// Environment variable overriding `ledger_name`.
pub const ENV_LEDGER_NAME: &str = "LEDGER_NAME";
/// Environment variable overriding `credential`.
pub const ENV_CREDENTIAL: &str = "LEDGER_CREDENTIAL";

/// Why a configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {}", join_problems(.0))]
    Invalid(Vec<ValidationError>),
}

impl ConfigError {
    /// Every field-level problem, when validation failed.
    pub fn problems(&self) -> &[ValidationError] {
        match self {
            ConfigError::Invalid(problems) => problems,
            _ => &[],
        }
    }
}

fn join_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load, override from the environment, and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: ClientConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Invalid)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment variables.
pub fn from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Apply overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
        config.api_url = url;
    }
    if let Some(name) = lookup(ENV_LEDGER_NAME).filter(|v| !v.is_empty()) {
        config.ledger_name = name;
    }
    if let Some(credential) = lookup(ENV_CREDENTIAL).filter(|v| !v.is_empty()) {
        config.credential = Some(credential);
    }
}

impl ClientConfig {
    /// See [`from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://localhost:1999"),
            (ENV_CREDENTIAL, "secret"),
            (ENV_LEDGER_NAME, ""),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::new("from-file");
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url, "http://localhost:1999");
        assert_eq!(config.credential.as_deref(), Some("secret"));
        assert_eq!(config.ledger_name, "from-file");
    }

    #[test]
    fn test_load_invalid_file() {
        let path = std::env::temp_dir().join(format!("ledger-client-{}.toml", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "ledger_name = \"\"\napi_url = \"http://localhost:1\"").unwrap();

        let result = load_config(&path);
        let _ = fs::remove_file(&path);
        // LEDGER_NAME may be set in the environment running the tests.
        if std::env::var(ENV_LEDGER_NAME).map(|v| v.is_empty()).unwrap_or(true) {
            let err = result.unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
            assert!(err.problems().iter().any(|p| p.field == "ledger_name"));
            assert!(err.to_string().contains("ledger_name: must not be empty"));
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().starts_with("cannot read /definitely/not/here.toml: "));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.problems().is_empty());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let path = std::env::temp_dir().join(format!("ledger-client-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "ledger_name = [").unwrap();

        let err = load_config(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&*path.to_string_lossy()));
    }

    #[test]
    fn test_every_problem_is_reported() {
        let err = ConfigError::Invalid(vec![
            ValidationError {
                field: "api_url".into(),
                message: "must be an absolute URL".into(),
            },
            ValidationError {
                field: "ledger_name".into(),
                message: "must not be empty".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: api_url: must be an absolute URL; ledger_name: must not be empty"
        );
    }
}
