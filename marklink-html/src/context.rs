//! Parameters and driver for one rewrite pass.
use kuchikikiki::parse_html;
use log::trace;
use tendril::TendrilSink;

use crate::{
  dom::find_body,
  error::{PostProcessError, RenderError},
  metas::Metas,
  patterns::IssuePatterns,
  processors::Processor,
  render::render_children,
  settings::AppSettings,
  walker::visit_node,
};

/// Everything one rewrite pass reads. Nothing in it is mutated by the pass.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
  pub(crate) settings:                    &'a AppSettings,
  pub(crate) issue_patterns:              &'a IssuePatterns,
  pub(crate) metas:                       &'a Metas,
  pub(crate) url_prefix:                  &'a str,
  pub(crate) is_wiki_markdown:            bool,
  pub(crate) processors:                  &'a [&'a dyn Processor],
  pub(crate) visit_links_for_short_links: bool,
}

impl<'a> RenderContext<'a> {
  #[must_use]
  pub const fn new(
    settings: &'a AppSettings,
    issue_patterns: &'a IssuePatterns,
    metas: &'a Metas,
    url_prefix: &'a str,
    processors: &'a [&'a dyn Processor],
  ) -> Self {
    Self {
      settings,
      issue_patterns,
      metas,
      url_prefix,
      is_wiki_markdown: false,
      processors,
      visit_links_for_short_links: false,
    }
  }

  /// Resolve relative short-links through the wiki.
  #[must_use]
  pub const fn with_wiki_markdown(mut self, is_wiki_markdown: bool) -> Self {
    self.is_wiki_markdown = is_wiki_markdown;
    self
  }

  /// Rewrite short-links found in the text of existing anchors.
  #[must_use]
  pub const fn with_link_revisiting(mut self, enabled: bool) -> Self {
    self.visit_links_for_short_links = enabled;
    self
  }

  #[must_use]
  pub const fn url_prefix(&self) -> &'a str {
    self.url_prefix
  }

  #[must_use]
  pub const fn metas(&self) -> &'a Metas {
    self.metas
  }

  #[must_use]
  pub const fn settings(&self) -> &'a AppSettings {
    self.settings
  }

  /// Parse `raw` as an HTML fragment, run the processors over it and
  /// serialize the result.
  ///
  /// # Errors
  ///
  /// Returns [`PostProcessError::InvalidHtml`] if `raw` is not UTF-8, and
  /// [`PostProcessError::Render`] if the rewritten tree cannot be serialized.
  pub fn post_process(&self, raw: &[u8]) -> Result<String, PostProcessError> {
    let fragment =
      std::str::from_utf8(raw).map_err(|e| PostProcessError::InvalidHtml {
        reason: e.to_string(),
      })?;

    let mut wrapped = String::with_capacity(fragment.len() + 13);
    wrapped.push_str("<body>");
    wrapped.push_str(fragment);
    wrapped.push_str("</body>");

    let document = parse_html().one(wrapped);
    let body =
      find_body(&document).ok_or_else(|| PostProcessError::InvalidHtml {
        reason: "no body element in parsed document".to_string(),
      })?;

    let mut child = body.first_child();
    while let Some(current) = child {
      visit_node(self, &current);
      child = current.next_sibling();
    }

    let mut out = Vec::with_capacity(raw.len() + 50);
    render_children(&mut out, &body)?;
    let html = String::from_utf8(out).map_err(RenderError::from)?;

    trace!(
      "Post-processed {} bytes of HTML into {} bytes",
      raw.len(),
      html.len()
    );
    Ok(html)
  }
}
