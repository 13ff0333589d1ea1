//! # marklink-html
//!
//! Post-processor for rendered Markdown. It rewrites the plain text runs of an
//! HTML fragment so that mentions, issue references, commit hashes, wiki
//! short-links, email addresses and bare URLs become links, without touching
//! existing anchors, inline code or preformatted blocks.
//!
//! ## Quick Start
//!
//! ```rust
//! use marklink_html::{AppSettings, Metas, PostProcessor};
//!
//! let processor =
//!   PostProcessor::new(AppSettings::new("https://git.example.com/"))?;
//! let html = processor.post_process(
//!   b"<p>hello @alice</p>",
//!   "https://git.example.com/owner/repo",
//!   &Metas::new(),
//!   false,
//! )?;
//!
//! assert_eq!(
//!   html,
//!   r#"<p>hello <a href="https://git.example.com/alice">@alice</a></p>"#
//! );
//! # Ok::<(), marklink_html::PostProcessError>(())
//! ```
//!
//! ## Processor chains
//!
//! [`PostProcessor::post_process`] runs [`processors::DEFAULT_PROCESSORS`]
//! and also expands `[[short-links]]` written inside existing anchors.
//! [`PostProcessor::render_commit_message`] runs
//! [`processors::COMMIT_MESSAGE_PROCESSORS`], optionally followed by a
//! processor turning every remaining text run into a link to the commit.
//!
//! Custom chains can be run through [`RenderContext`].

pub mod context;
mod dom;
pub mod error;
pub mod links;
pub mod metas;
pub mod patterns;
pub mod processors;
pub mod render;
pub mod settings;
mod shortlink;
mod walker;

use log::debug;

pub use crate::{
  context::RenderContext,
  error::{PostProcessError, RenderError},
  metas::{ExternalTracker, IssueNameStyle, Metas, compose_metas},
  patterns::IssuePatterns,
  processors::{
    COMMIT_MESSAGE_PROCESSORS,
    DEFAULT_PROCESSORS,
    DefaultLinkProcessor,
    Processor,
    TextMatch,
  },
  settings::AppSettings,
};
use crate::patterns::MENTION;

/// Entry point holding the application settings and the patterns derived
/// from them.
///
/// Build one when the configuration is loaded and share it; every call is
/// independent and it can be used from several threads at once.
#[derive(Debug, Clone)]
pub struct PostProcessor {
  settings:       AppSettings,
  issue_patterns: IssuePatterns,
}

impl PostProcessor {
  /// # Errors
  ///
  /// Returns [`PostProcessError::Pattern`] if the full issue URL pattern for
  /// the application URL does not compile.
  pub fn new(settings: AppSettings) -> Result<Self, PostProcessError> {
    let issue_patterns = IssuePatterns::new(&settings)?;
    debug!(
      "Built post-processor for application at {}",
      settings.app_url()
    );
    Ok(Self {
      settings,
      issue_patterns,
    })
  }

  #[must_use]
  pub const fn settings(&self) -> &AppSettings {
    &self.settings
  }

  #[must_use]
  pub const fn issue_patterns(&self) -> &IssuePatterns {
    &self.issue_patterns
  }

  /// Context running `processors` with this processor's settings.
  #[must_use]
  pub const fn context<'a>(
    &'a self,
    url_prefix: &'a str,
    metas: &'a Metas,
    processors: &'a [&'a dyn Processor],
  ) -> RenderContext<'a> {
    RenderContext::new(
      &self.settings,
      &self.issue_patterns,
      metas,
      url_prefix,
      processors,
    )
  }

  /// Rewrite an issue, pull request, comment or wiki page body.
  ///
  /// Relative links resolve against `url_prefix`, through `wiki/` when
  /// `is_wiki_markdown` is set.
  ///
  /// # Errors
  ///
  /// See [`RenderContext::post_process`].
  pub fn post_process(
    &self,
    raw: &[u8],
    url_prefix: &str,
    metas: &Metas,
    is_wiki_markdown: bool,
  ) -> Result<String, PostProcessError> {
    self
      .context(url_prefix, metas, DEFAULT_PROCESSORS)
      .with_wiki_markdown(is_wiki_markdown)
      .with_link_revisiting(true)
      .post_process(raw)
  }

  /// Rewrite a rendered commit message.
  ///
  /// Short-links are not expanded. When `default_link` is not empty, every
  /// text run left over after the other processors becomes a link to it.
  ///
  /// # Errors
  ///
  /// See [`RenderContext::post_process`].
  pub fn render_commit_message(
    &self,
    raw: &[u8],
    url_prefix: &str,
    default_link: &str,
    metas: &Metas,
  ) -> Result<String, PostProcessError> {
    if default_link.is_empty() {
      return self
        .context(url_prefix, metas, COMMIT_MESSAGE_PROCESSORS)
        .post_process(raw);
    }

    debug!("Linking remaining commit message text to {default_link}");
    let fallback = DefaultLinkProcessor {
      link: default_link.to_string(),
    };
    let mut chain: Vec<&dyn Processor> = COMMIT_MESSAGE_PROCESSORS.to_vec();
    chain.push(&fallback);

    self.context(url_prefix, metas, &chain).post_process(raw)
  }
}

/// Names of every user mentioned in `content`, without the `@`, in order of
/// appearance.
#[must_use]
pub fn find_all_mentions(content: &str) -> Vec<String> {
  MENTION
    .captures_iter(content)
    .filter_map(|caps| caps.get(1))
    .map(|mention| mention.as_str().trim_start_matches('@').to_string())
    .collect()
}
