//! Application-level settings consumed by the link builders.
use url::Url;

/// Base URL the application is served from, and the values derived from it.
///
/// Mention links and cross-repository issue links are built against
/// [`AppSettings::app_url`]; relative URL prefixes are cut down using
/// [`AppSettings::app_sub_url_depth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
  app_url:           String,
  app_sub_url:       String,
  app_sub_url_depth: usize,
}

impl AppSettings {
  /// Create settings for an application served at `app_url`.
  ///
  /// A trailing `/` is appended when missing. The sub-URL is the path of
  /// `app_url` without its trailing slash (`/gitea` for
  /// `https://example.com/gitea/`), and its depth is the number of `/` it
  /// contains.
  #[must_use]
  pub fn new(app_url: &str) -> Self {
    let app_url = if app_url.ends_with('/') {
      app_url.to_string()
    } else {
      format!("{app_url}/")
    };

    let app_sub_url = Url::parse(&app_url)
      .map(|url| url.path().trim_end_matches('/').to_string())
      .unwrap_or_default();
    let app_sub_url_depth = app_sub_url.matches('/').count();

    Self {
      app_url,
      app_sub_url,
      app_sub_url_depth,
    }
  }

  /// The application base URL, always ending with `/`.
  #[must_use]
  pub fn app_url(&self) -> &str {
    &self.app_url
  }

  /// Path component of the base URL, without trailing slash.
  #[must_use]
  pub fn app_sub_url(&self) -> &str {
    &self.app_sub_url
  }

  #[must_use]
  pub const fn app_sub_url_depth(&self) -> usize {
    self.app_sub_url_depth
  }
}

impl Default for AppSettings {
  fn default() -> Self {
    Self::new("http://localhost:3000/")
  }
}
