use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use marklink_html::{
  AppSettings,
  ExternalTracker,
  IssueNameStyle,
  Metas,
  compose_metas,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_APP_URL: &str = "http://localhost:3000/";

/// Configuration for marklink.
///
/// Fields are loaded from a TOML or JSON config file and can be adjusted
/// with `--config KEY=VALUE` overrides on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base URL the application is served from.
  pub app_url: String,

  /// Prefix relative links are resolved against. Falls back to `app_url`.
  pub url_prefix: Option<String>,

  /// Whether relative short-links resolve through the wiki.
  pub wiki: bool,

  /// Target every remaining text run of a commit message links to.
  pub default_link: Option<String>,

  /// Repository the rendered content belongs to.
  pub repository: Option<RepositoryConfig>,

  /// Extra metas, applied over the ones composed from `repository`.
  pub metas: HashMap<String, String>,
}

/// Repository identity and issue tracker settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
  /// Owner name.
  pub user: String,

  /// Repository name.
  pub name: String,

  /// External issue tracker bare issue references point at.
  pub external_tracker: Option<ExternalTracker>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      app_url:      DEFAULT_APP_URL.to_string(),
      url_prefix:   None,
      wiki:         false,
      default_link: None,
      repository:   None,
      metas:        HashMap::new(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  #[allow(
    clippy::option_if_let_else,
    reason = "Clearer with explicit match on extension"
  )]
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content)
              .map_err(ConfigError::from)
              .map_err(|e| {
                ConfigError::Config(format!(
                  "Failed to parse JSON config from {}: {}",
                  path.display(),
                  e
                ))
              })
          },
          "toml" => {
            toml::from_str(&content)
              .map_err(ConfigError::from)
              .map_err(|e| {
                ConfigError::Config(format!(
                  "Failed to parse TOML config from {}: {}",
                  path.display(),
                  e
                ))
              })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from the given files, or a discovered one, and apply
  /// `KEY=VALUE` overrides on top.
  ///
  /// Explicit files are merged in order, later files taking precedence.
  /// Without explicit files the first config file found by
  /// [`Config::find_config_file`] is used, and defaults otherwise.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    if !config.app_url.contains("://") {
      log::warn!(
        "app_url '{}' is not an absolute URL; generated links may be broken",
        config.app_url
      );
    }

    Ok(config)
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// Recognized keys are `app_url`, `url_prefix`, `wiki`, `default_link`,
  /// `repository.user`, `repository.name`, `repository.tracker_format`,
  /// `repository.tracker_style` and `metas.<name>`. An empty value clears an
  /// optional field.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust
  /// use marklink_config::Config;
  ///
  /// let mut config = Config::default();
  /// config.apply_overrides(&[
  ///   "wiki=true".to_string(),
  ///   "repository.user=gogits".to_string(),
  /// ])?;
  /// assert!(config.wiki);
  /// # Ok::<(), marklink_config::ConfigError>(())
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "app_url" => value.clone_into(&mut self.app_url),
      "url_prefix" => self.url_prefix = non_empty(value),
      "wiki" => self.wiki = parse_bool(key, value)?,
      "default_link" => self.default_link = non_empty(value),
      "repository.user" => {
        value.clone_into(&mut self.repository.get_or_insert_default().user);
      },
      "repository.name" => {
        value.clone_into(&mut self.repository.get_or_insert_default().name);
      },
      "repository.tracker_format" => {
        value.clone_into(&mut self.tracker_mut().format);
      },
      "repository.tracker_style" => {
        self.tracker_mut().style = value
          .parse::<IssueNameStyle>()
          .map_err(ConfigError::Metas)?;
      },
      _ => {
        let Some(name) = key.strip_prefix("metas.").filter(|n| !n.is_empty())
        else {
          return Err(ConfigError::Config(format!(
            "Unknown configuration key: '{key}'"
          )));
        };
        self.metas.insert(name.to_string(), value.to_string());
      },
    }

    log::debug!("Applied config override {key}={value}");
    Ok(())
  }

  fn tracker_mut(&mut self) -> &mut ExternalTracker {
    self
      .repository
      .get_or_insert_default()
      .external_tracker
      .get_or_insert_default()
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - `app_url`: replaced unless other's is the default
  /// - `wiki`: Other's value always replaces
  /// - `metas`: Other's entries are merged in (can override individual keys)
  pub fn merge(&mut self, other: Self) {
    if other.app_url != DEFAULT_APP_URL {
      self.app_url = other.app_url;
    }
    if other.url_prefix.is_some() {
      self.url_prefix = other.url_prefix;
    }
    self.wiki = other.wiki;
    if other.default_link.is_some() {
      self.default_link = other.default_link;
    }
    if other.repository.is_some() {
      self.repository = other.repository;
    }
    self.metas.extend(other.metas);
  }

  /// Application settings derived from `app_url`.
  #[must_use]
  pub fn settings(&self) -> AppSettings {
    AppSettings::new(&self.app_url)
  }

  /// Prefix relative links resolve against.
  #[must_use]
  pub fn url_prefix(&self) -> &str {
    self.url_prefix.as_deref().unwrap_or(&self.app_url)
  }

  /// Metas for the configured repository, with `metas` applied on top.
  #[must_use]
  pub fn metas(&self) -> Metas {
    let mut metas = self
      .repository
      .as_ref()
      .map(|repo| {
        compose_metas(&repo.user, &repo.name, repo.external_tracker.as_ref())
      })
      .unwrap_or_default();
    metas.extend(self.metas.clone());
    metas
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "marklink.toml",
          "marklink.json",
          ".marklink.toml",
          ".marklink.json",
          ".config/marklink.toml",
          ".config/marklink.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home);
          for filename in &["marklink.toml", "marklink.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        if let Ok(home) = std::env::var("HOME") {
          let home_config_dir =
            PathBuf::from(home).join(".config").join("marklink");
          for filename in &["config.toml", "config.json"] {
            let config_path = home_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

fn non_empty(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "on" | "1" => Ok(true),
    "false" | "no" | "off" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'"
      )))
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use marklink_html::metas::{FORMAT, REPO, STYLE, USER};

  use super::*;

  #[test]
  fn test_apply_overrides_string() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "app_url=https://git.example.com".to_string(),
        "url_prefix=https://git.example.com/owner/repo".to_string(),
      ])
      .unwrap();

    assert_eq!(config.app_url, "https://git.example.com");
    assert_eq!(config.url_prefix(), "https://git.example.com/owner/repo");
    assert_eq!(config.settings().app_url(), "https://git.example.com/");
  }

  #[test]
  fn test_apply_overrides_boolean() {
    let mut config = Config::default();

    config.apply_overrides(&["wiki=yes".to_string()]).unwrap();
    assert!(config.wiki);

    config.apply_overrides(&["wiki=off".to_string()]).unwrap();
    assert!(!config.wiki);
  }

  #[test]
  fn test_apply_overrides_invalid_boolean() {
    let mut config = Config::default();
    let result = config.apply_overrides(&["wiki=maybe".to_string()]);
    assert!(result.is_err());
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();
    let result = config.apply_overrides(&["wiki".to_string()]);
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();
    let result = config.apply_overrides(&["colour=blue".to_string()]);
    assert!(result.unwrap_err().to_string().contains("Unknown"));

    let result = config.apply_overrides(&["metas.=x".to_string()]);
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_value_clears_optional_field() {
    let mut config = Config::default();
    config.default_link = Some("https://example.com".to_string());

    config.apply_overrides(&["default_link=".to_string()]).unwrap();
    assert_eq!(config.default_link, None);
  }

  #[test]
  fn test_apply_overrides_repository() {
    let mut config = Config::default();

    config
      .apply_overrides(&[
        "repository.user=someUser".to_string(),
        "repository.name=someRepo".to_string(),
        "repository.tracker_format=https://someurl.com/{user}/{repo}/{index}"
          .to_string(),
        "repository.tracker_style=alphanumeric".to_string(),
        "metas.project=ABC".to_string(),
      ])
      .unwrap();

    let metas = config.metas();
    assert_eq!(metas[USER], "someUser");
    assert_eq!(metas[REPO], "someRepo");
    assert_eq!(metas[FORMAT], "https://someurl.com/{user}/{repo}/{index}");
    assert_eq!(metas[STYLE], "alphanumeric");
    assert_eq!(metas["project"], "ABC");
  }

  #[test]
  fn test_invalid_tracker_style() {
    let mut config = Config::default();
    let result =
      config.apply_overrides(&["repository.tracker_style=roman".to_string()]);
    assert!(matches!(result, Err(ConfigError::Metas(_))));
  }

  #[test]
  fn test_metas_without_tracker() {
    let mut config = Config::default();
    config.repository = Some(RepositoryConfig {
      user:             "owner".to_string(),
      name:             "repo".to_string(),
      external_tracker: None,
    });
    assert!(config.metas().is_empty());

    config.metas.insert(STYLE.to_string(), "alphanumeric".to_string());
    assert_eq!(config.metas()[STYLE], "alphanumeric");
  }

  #[test]
  fn test_config_merge() {
    let mut base = Config::default();
    base.app_url = "https://git.example.com/".to_string();
    base.url_prefix = Some("https://git.example.com/a/b".to_string());
    base.metas.insert("a".to_string(), "1".to_string());

    let mut other = Config::default();
    other.wiki = true;
    other.default_link = Some("https://git.example.com/a/b/commit/1".to_string());
    other.metas.insert("a".to_string(), "2".to_string());
    other.metas.insert("b".to_string(), "3".to_string());

    base.merge(other);

    // Defaults in the other config do not reset explicit values
    assert_eq!(base.app_url, "https://git.example.com/");
    assert_eq!(base.url_prefix.as_deref(), Some("https://git.example.com/a/b"));
    assert!(base.wiki);
    assert_eq!(
      base.default_link.as_deref(),
      Some("https://git.example.com/a/b/commit/1")
    );
    assert_eq!(base.metas["a"], "2");
    assert_eq!(base.metas["b"], "3");
  }

  #[test]
  fn test_url_prefix_falls_back_to_app_url() {
    let config = Config::default();
    assert_eq!(config.url_prefix(), "http://localhost:3000/");
  }
}
