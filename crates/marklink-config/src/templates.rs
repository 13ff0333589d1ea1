use crate::error::ConfigError;

/// Default configuration template in TOML, commented so that a freshly
/// generated file explains itself.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# marklink configuration file

# Base URL the application is served from. Mentions and cross-repository
# issue references link here.
app_url = "http://localhost:3000/"

# Prefix relative links are resolved against. Defaults to `app_url`.
# url_prefix = "http://localhost:3000/owner/repo/"

# Resolve short-links through the wiki, so that `[[Page]]` links to
# `<url_prefix>/wiki/Page`.
wiki = false

# Link every remaining text run of a commit message to this URL.
# default_link = "http://localhost:3000/owner/repo/commit/0123456789"

# Repository the rendered content belongs to.
[repository]
user = "owner"
name = "repo"

# Send bare issue references to an external tracker instead. `{user}`,
# `{repo}` and `{index}` are substituted, as is any key under [metas].
# [repository.external_tracker]
# format = "https://tracker.example.com/{user}/{repo}/issues/{index}"
# style = "numeric" # or "alphanumeric" for references such as ABC-123

# Extra substitution variables for external tracker URL templates.
[metas]
# project = "ABC"
"#;

/// Default configuration template in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "app_url": "http://localhost:3000/",
  "url_prefix": null,
  "wiki": false,
  "default_link": null,
  "repository": {
    "user": "owner",
    "name": "repo",
    "external_tracker": null
  },
  "metas": {}
}
"#;

/// Get the configuration template for `format`, `toml` or `json`.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => {
      Err(ConfigError::Config(format!(
        "Unsupported config format: {format}"
      )))
    },
  }
}
