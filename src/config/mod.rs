use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(alias = "databaseURL", alias = "database")]
    pub database_url: Option<String>,
    pub collection: Option<String>,
    #[serde(alias = "auth")]
    pub auth_token: Option<String>,
    pub page_size: Option<usize>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub export_dir: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    #[serde(alias = "yes")]
    pub assume_yes: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".subadmin").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Reads a YAML config. With `allow_missing`, a missing file yields the
/// empty config instead of an error.
pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# subadmin config
#
# Location (default):
#   ~/.subadmin/config.yml

# Store (required, or pass --database-url / SUBADMIN_DATABASE_URL)
# database_url: https://your-project-default-rtdb.firebaseio.com
collection: users
# auth_token: <database secret or ID token>

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080

# Table
page_size: 10
output_format: table

# Export (defaults to the current directory)
# export_dir: ~/exports

# Output styling
no_color: false

# Skip confirmation prompts for delete/clear
assume_yes: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "failed to create config directory '{}': {e}",
                parent.display()
            )
        })?;
    }
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.collection.as_deref(), Some("users"));
        assert_eq!(cfg.page_size, Some(10));
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.assume_yes, Some(false));
    }

    #[test]
    fn missing_file_handling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn aliases_are_accepted() {
        let cfg: ConfigFile =
            serde_yaml::from_str("databaseURL: https://x.firebaseio.com\nauth: secret\nyes: true\n")
                .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("https://x.firebaseio.com"));
        assert_eq!(cfg.auth_token.as_deref(), Some("secret"));
        assert_eq!(cfg.assume_yes, Some(true));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/exports"), home.join("exports"));
        }
        assert_eq!(expand_tilde("./exports"), PathBuf::from("./exports"));
    }
}
