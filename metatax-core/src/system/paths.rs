use std::path::PathBuf;
use std::sync::OnceLock;

static METATAX_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Name of the configuration file looked up inside the home directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the metatax home directory
/// Checks METATAX_HOME environment variable, falls back to ${HOME}/.metatax
pub fn metatax_home() -> PathBuf {
    METATAX_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("METATAX_HOME") {
                PathBuf::from(path)
            } else {
                let home = std::env::var("HOME").unwrap_or_else(|_| {
                    std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string())
                });
                PathBuf::from(home).join(".metatax")
            }
        })
        .clone()
}

/// Get the configuration file path
/// Checks METATAX_CONFIG environment variable, falls back to METATAX_HOME/config.toml
pub fn default_config_path() -> PathBuf {
    match std::env::var("METATAX_CONFIG") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => metatax_home().join(CONFIG_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_lives_under_home_by_default() {
        if std::env::var("METATAX_CONFIG").is_err() {
            let path = default_config_path();
            assert_eq!(path, metatax_home().join("config.toml"));
        }
    }
}
