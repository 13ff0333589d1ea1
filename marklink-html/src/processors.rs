//! Text rewriters run against every eligible text node.
//!
//! Each processor finds at most one match in a text node; the walker picks up
//! the remainder when it reaches the split-off sibling.
use std::ops::Range;

use kuchikikiki::NodeRef;
use log::trace;
use regex::Regex;

use crate::{
  context::RenderContext,
  dom::create_link,
  links::{cutout_verbose_prefix, expand_template, short_sha, url_join},
  metas::{FORMAT, IssueNameStyle},
  patterns::{
    ANY_SHA1, CROSS_REFERENCE_ISSUE, EMAIL, ISSUE_ALPHANUMERIC, ISSUE_NUMERIC,
    LINK, MENTION, SHA1_CURRENT, SHORT_LINK,
  },
  shortlink,
};

/// A match within one text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
  /// Byte range replaced by the built node.
  pub span:   Range<usize>,
  /// Capture group ranges, group 0 being the whole match.
  pub groups: Vec<Option<Range<usize>>>,
}

impl TextMatch {
  fn from_regex(re: &Regex, text: &str, replaced_group: usize) -> Option<Self> {
    let caps = re.captures(text)?;
    let span = caps.get(replaced_group)?.range();
    let groups = caps.iter().map(|group| group.map(|m| m.range())).collect();
    Some(Self { span, groups })
  }

  /// Text of capture group `index`, if it participated in the match.
  #[must_use]
  pub fn group<'t>(&self, text: &'t str, index: usize) -> Option<&'t str> {
    self
      .groups
      .get(index)
      .and_then(Option::clone)
      .and_then(|range| text.get(range))
  }
}

/// A matcher and rewriter pair.
pub trait Processor: Sync {
  /// Find the first match in `text`.
  fn find(&self, ctx: &RenderContext<'_>, text: &str) -> Option<TextMatch>;

  /// Build the node replacing `found.span` of `text`.
  fn build(
    &self,
    ctx: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef;
}

/// `@user` to a link to the user's profile.
#[derive(Debug, Clone, Copy)]
pub struct MentionProcessor;

impl Processor for MentionProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&MENTION, text, 1)
  }

  fn build(
    &self,
    ctx: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let mention = &text[found.span.clone()];
    let user = mention.trim_start_matches('@');
    trace!("Linking mention of {user}");
    create_link(&url_join(ctx.settings.app_url(), &[user]), mention)
  }
}

/// `[[...]]` short-links.
///
/// The `no_link` variant emits bare text or images, for use inside existing
/// anchors.
#[derive(Debug, Clone, Copy)]
pub struct ShortLinkProcessor {
  pub no_link: bool,
}

impl Processor for ShortLinkProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&SHORT_LINK, text, 0)
  }

  fn build(
    &self,
    ctx: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let content = found.group(text, 1).unwrap_or_default();
    let tail = found.group(text, 2).unwrap_or_default();
    trace!("Building short-link [[{content}]]{tail}");
    shortlink::build(ctx, content, tail, self.no_link)
  }
}

/// Full issue and pull request URLs on this instance, shortened to `#index`.
#[derive(Debug, Clone, Copy)]
pub struct FullIssuePatternProcessor;

impl Processor for FullIssuePatternProcessor {
  fn find(&self, ctx: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(ctx.issue_patterns.full(), text, 0)
  }

  fn build(
    &self,
    _: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let index = found.group(text, 1).unwrap_or_default();
    create_link(&text[found.span.clone()], &format!("#{index}"))
  }
}

/// Bare issue references in the style requested by the metas.
#[derive(Debug, Clone, Copy)]
pub struct IssueIndexPatternProcessor;

impl Processor for IssueIndexPatternProcessor {
  fn find(&self, ctx: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    let pattern = match IssueNameStyle::from_metas(ctx.metas) {
      IssueNameStyle::Numeric => &ISSUE_NUMERIC,
      IssueNameStyle::Alphanumeric => &ISSUE_ALPHANUMERIC,
    };
    TextMatch::from_regex(pattern, text, 1)
  }

  fn build(
    &self,
    ctx: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let id = &text[found.span.clone()];
    let index = match IssueNameStyle::from_metas(ctx.metas) {
      IssueNameStyle::Numeric => id.trim_start_matches('#'),
      IssueNameStyle::Alphanumeric => id,
    };

    let href = match ctx.metas.get(FORMAT) {
      Some(format) => expand_template(format, ctx.metas, index),
      None => {
        url_join(cutout_verbose_prefix(ctx.settings, ctx.url_prefix), &[
          "issues", index,
        ])
      },
    };
    create_link(&href, id)
  }
}

/// `owner/repo#index` references into other repositories.
#[derive(Debug, Clone, Copy)]
pub struct CrossReferenceIssueIndexPatternProcessor;

impl Processor for CrossReferenceIssueIndexPatternProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&CROSS_REFERENCE_ISSUE, text, 1)
  }

  fn build(
    &self,
    ctx: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let reference = &text[found.span.clone()];
    let (repo, issue) = reference.split_once('#').unwrap_or((reference, ""));
    create_link(
      &url_join(ctx.settings.app_url(), &[repo, "issues", issue]),
      reference,
    )
  }
}

/// URLs pointing at a full commit hash, optionally into a file and line.
#[derive(Debug, Clone, Copy)]
pub struct FullSha1PatternProcessor;

impl Processor for FullSha1PatternProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&ANY_SHA1, text, 0)
  }

  fn build(
    &self,
    _: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let hash = found.group(text, 1).unwrap_or_default();
    let mut label = short_sha(hash).to_string();
    if let Some(subtree) = found.group(text, 2) {
      label.push('/');
      label.push_str(subtree);
    }
    if let Some(line) = found.group(text, 3) {
      label = format!("{label} ({line})");
    }
    create_link(&text[found.span.clone()], &label)
  }
}

/// Bare commit hashes, linked into the current repository.
#[derive(Debug, Clone, Copy)]
pub struct Sha1CurrentPatternProcessor;

impl Processor for Sha1CurrentPatternProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&SHA1_CURRENT, text, 1)
  }

  fn build(
    &self,
    ctx: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let hash = &text[found.span.clone()];
    create_link(&url_join(ctx.url_prefix, &["commit", hash]), short_sha(hash))
  }
}

#[derive(Debug, Clone, Copy)]
pub struct EmailAddressProcessor;

impl Processor for EmailAddressProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&EMAIL, text, 0)
  }

  fn build(
    &self,
    _: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let mail = &text[found.span.clone()];
    create_link(&format!("mailto:{mail}"), mail)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct LinkProcessor;

impl Processor for LinkProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    TextMatch::from_regex(&LINK, text, 0)
  }

  fn build(
    &self,
    _: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    let uri = &text[found.span.clone()];
    create_link(uri, uri)
  }
}

/// Turns the whole remaining text of a node into one link to `link`.
///
/// Always matches, so the empty text left in front of a leading match becomes
/// an empty anchor.
#[derive(Debug, Clone)]
pub struct DefaultLinkProcessor {
  pub link: String,
}

impl Processor for DefaultLinkProcessor {
  fn find(&self, _: &RenderContext<'_>, text: &str) -> Option<TextMatch> {
    let span = 0..text.len();
    Some(TextMatch {
      span:   span.clone(),
      groups: vec![Some(span)],
    })
  }

  fn build(
    &self,
    _: &RenderContext<'_>,
    text: &str,
    found: &TextMatch,
  ) -> NodeRef {
    create_link(&self.link, &text[found.span.clone()])
  }
}

/// Chain run over issue, pull request and comment bodies and wiki pages.
pub const DEFAULT_PROCESSORS: &[&dyn Processor] = &[
  &MentionProcessor,
  &ShortLinkProcessor { no_link: false },
  &FullIssuePatternProcessor,
  &IssueIndexPatternProcessor,
  &CrossReferenceIssueIndexPatternProcessor,
  &FullSha1PatternProcessor,
  &Sha1CurrentPatternProcessor,
  &EmailAddressProcessor,
  &LinkProcessor,
];

/// Chain run over commit messages; short-links are not expanded there.
pub const COMMIT_MESSAGE_PROCESSORS: &[&dyn Processor] = &[
  &MentionProcessor,
  &FullIssuePatternProcessor,
  &IssueIndexPatternProcessor,
  &CrossReferenceIssueIndexPatternProcessor,
  &FullSha1PatternProcessor,
  &Sha1CurrentPatternProcessor,
  &EmailAddressProcessor,
  &LinkProcessor,
];

/// Chain run over text already inside an anchor.
pub(crate) const ANCHOR_TEXT_PROCESSORS: &[&dyn Processor] =
  &[&ShortLinkProcessor { no_link: true }];

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_text_match_groups() {
    let text = "see @alice";
    let found = TextMatch::from_regex(&MENTION, text, 1).expect("match");
    assert_eq!(found.span, 4..10);
    assert_eq!(found.group(text, 0), Some(" @alice"));
    assert_eq!(found.group(text, 1), Some("@alice"));
    assert_eq!(found.group(text, 7), None);
  }

  #[test]
  fn test_full_sha_optional_groups() {
    let text = "https://example.com/owner/repo/commit/\
                d8a994ef243349f321568f9e36d5c3f444b99cae/src/main.rs#L12";
    let found = TextMatch::from_regex(&ANY_SHA1, text, 0).expect("match");
    assert_eq!(
      found.group(text, 1),
      Some("d8a994ef243349f321568f9e36d5c3f444b99cae")
    );
    assert_eq!(found.group(text, 2), Some("src/main.rs"));
    assert_eq!(found.group(text, 3), Some("L12"));
  }

  #[test]
  fn test_chains_differ_only_by_short_links() {
    assert_eq!(DEFAULT_PROCESSORS.len(), COMMIT_MESSAGE_PROCESSORS.len() + 1);
  }
}
