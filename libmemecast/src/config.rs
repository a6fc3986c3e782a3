//! Configuration management for Memecast

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::template::Template;
use crate::types::ContentKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: GlobalSettings,
    pub accounts: Vec<Account>,
}

/// Run-wide settings, all optional in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Suppress real submissions, file deletion, and the inter-post delay
    #[serde(default)]
    pub debug_mode: bool,
    /// Minimum wall-clock gap between submissions, across all accounts
    #[serde(default = "default_delay_minutes")]
    pub delay_minutes: u64,
    /// Kill switch: when false the run ends immediately with an empty ledger
    #[serde(default = "default_posting_enabled")]
    pub posting_enabled: bool,
    /// Directory holding the per-forum `<forum>-images` folders
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
}

fn default_delay_minutes() -> u64 {
    33
}

fn default_posting_enabled() -> bool {
    true
}

fn default_media_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            debug_mode: false,
            delay_minutes: default_delay_minutes(),
            posting_enabled: default_posting_enabled(),
            media_root: default_media_root(),
        }
    }
}

/// One Reddit identity plus its posting targets, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    pub password: String,
    pub profile: Profile,
    pub subreddits: Vec<ForumTarget>,
}

/// Per-account template variables
///
/// `content_type` and `hyperlink` are the enumerated keys the core cares
/// about; every other key in the profile table lands in `extras` and is only
/// validated when a template actually references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub content_type: ContentKind,
    #[serde(default)]
    pub hyperlink: Option<String>,
    #[serde(flatten)]
    pub extras: HashMap<String, String>,
}

impl Profile {
    /// Build the substitution map for template rendering
    ///
    /// `hyperlink` is always present, as the empty string when unset.
    pub fn template_vars(&self, username: &str) -> HashMap<String, String> {
        let mut vars = self.extras.clone();
        vars.insert(
            "hyperlink".to_string(),
            self.hyperlink.clone().unwrap_or_default(),
        );
        vars.insert("username".to_string(), username.to_string());
        vars
    }
}

/// A target subreddit and the templates used when posting to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTarget {
    pub name: String,
    pub title_template: Template,
    pub description_template: Template,
    #[serde(default)]
    pub flair_text: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("MEMECAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("memecast").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[settings]
debug_mode = true
delay_minutes = 15
posting_enabled = true
media_root = "/tmp/content"

[[accounts]]
username = "alice"
client_id = "id"
client_secret = "secret"
password = "pw"

[accounts.profile]
content_type = "meme"
hyperlink = "https://example.com"
zodiac_sign = "aries"

[[accounts.subreddits]]
name = "memes"
title_template = ["A", "B"]
description_template = "Check this out: {hyperlink}"
flair_text = "OC"
"#,
        );

        let config = Config::load_from_path(&path).unwrap();
        assert!(config.settings.debug_mode);
        assert_eq!(config.settings.delay_minutes, 15);
        assert_eq!(config.settings.media_root, PathBuf::from("/tmp/content"));
        assert_eq!(config.accounts.len(), 1);

        let account = &config.accounts[0];
        assert_eq!(account.username, "alice");
        assert_eq!(account.profile.content_type, ContentKind::Meme);
        assert_eq!(
            account.profile.extras.get("zodiac_sign"),
            Some(&"aries".to_string())
        );

        let target = &account.subreddits[0];
        assert_eq!(target.name, "memes");
        assert_eq!(
            target.title_template,
            Template::Many(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(target.flair_text, Some("OC".to_string()));
    }

    #[test]
    fn test_settings_defaults_when_section_absent() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[[accounts]]
username = "bob"
client_id = "id"
client_secret = "secret"
password = "pw"

[accounts.profile]
content_type = "text"

[[accounts.subreddits]]
name = "askreddit"
title_template = "hello"
description_template = "world"
"#,
        );

        let config = Config::load_from_path(&path).unwrap();
        assert!(!config.settings.debug_mode);
        assert_eq!(config.settings.delay_minutes, 33);
        assert!(config.settings.posting_enabled);
        assert_eq!(config.settings.media_root, PathBuf::from("."));
        assert_eq!(config.accounts[0].profile.hyperlink, None);
        assert_eq!(config.accounts[0].subreddits[0].flair_text, None);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let path = PathBuf::from("/nonexistent/memecast/config.toml");
        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(crate::MemecastError::Config(ConfigError::ReadError(_)))
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "accounts = not valid toml");
        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(crate::MemecastError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_invalid_content_type_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[[accounts]]
username = "bob"
client_id = "id"
client_secret = "secret"
password = "pw"

[accounts.profile]
content_type = "video"

[[accounts.subreddits]]
name = "videos"
title_template = "t"
description_template = "d"
"#,
        );
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn test_template_vars_hyperlink_default() {
        let profile = Profile {
            content_type: ContentKind::Text,
            hyperlink: None,
            extras: HashMap::new(),
        };
        let vars = profile.template_vars("alice");
        assert_eq!(vars.get("hyperlink"), Some(&String::new()));
        assert_eq!(vars.get("username"), Some(&"alice".to_string()));
    }

    #[test]
    fn test_template_vars_include_extras() {
        let mut extras = HashMap::new();
        extras.insert("zodiac_sign".to_string(), "leo".to_string());
        let profile = Profile {
            content_type: ContentKind::Meme,
            hyperlink: Some("https://x".to_string()),
            extras,
        };
        let vars = profile.template_vars("bob");
        assert_eq!(vars.get("zodiac_sign"), Some(&"leo".to_string()));
        assert_eq!(vars.get("hyperlink"), Some(&"https://x".to_string()));
    }
}
