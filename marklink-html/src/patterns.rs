//! Compiled matchers, one per syntax class.
//!
//! None of these perform extra validation: a link is produced even if the
//! referenced user, issue or commit does not exist.
//!
//! Word characters and word boundaries are ASCII-only (`[[:word:]]`,
//! `(?-u:\b)`), so a non-ASCII letter next to a reference separates it like
//! punctuation does.
use std::sync::LazyLock;

use log::error;
use regex::Regex;

use crate::settings::AppSettings;

/// `@user` mentions.
pub static MENTION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:\s|^|[^[:word:]])(@[0-9a-zA-Z\-_.]+)").unwrap_or_else(|e| {
    error!("Failed to compile MENTION regex: {e}");
    never_matching_regex()
  })
});

/// Numeric issue references, e.g. `#1287`.
pub static ISSUE_NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:\s|^|[^[:word:]])(#[0-9]+)(?-u:\b)").unwrap_or_else(|e| {
    error!("Failed to compile ISSUE_NUMERIC regex: {e}");
    never_matching_regex()
  })
});

/// Alphanumeric issue references, e.g. `ABC-1234`.
pub static ISSUE_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:\s|^|[^[:word:]])([A-Z]{1,10}-[1-9][0-9]*)(?-u:\b)")
    .unwrap_or_else(|e| {
      error!("Failed to compile ISSUE_ALPHANUMERIC regex: {e}");
      never_matching_regex()
    })
});

/// Issue references into another repository, e.g. `owner/repo#12345`.
pub static CROSS_REFERENCE_ISSUE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?:\s|^|[^[:word:]])([0-9a-zA-Z\-_.]+/[0-9a-zA-Z\-_.]+#[0-9]+)(?-u:\b)",
  )
  .unwrap_or_else(|e| {
    error!("Failed to compile CROSS_REFERENCE_ISSUE regex: {e}");
    never_matching_regex()
  })
});

/// Commit hashes in the current repository. Abbreviated hashes of 7 or more
/// characters are accepted, as git does.
pub static SHA1_CURRENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:\s|^|[^[:word:]])([0-9a-f]{7,40})(?-u:\b)").unwrap_or_else(
    |e| {
      error!("Failed to compile SHA1_CURRENT regex: {e}");
      never_matching_regex()
    },
  )
});

/// `[[name|link|key=value]]` short-links with an optional word suffix.
pub static SHORT_LINK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[\[(.*?)\]\]([[:word:]]*)").unwrap_or_else(|e| {
    error!("Failed to compile SHORT_LINK regex: {e}");
    never_matching_regex()
  })
});

/// URLs with a full commit hash as fifth path segment. Groups: hash, subtree
/// path, fragment (line locator).
pub static ANY_SHA1: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"https?://(?:\S+/){4}([0-9a-f]{40})/?([^#\s]+)?(?:#(\S+))?")
    .unwrap_or_else(|e| {
      error!("Failed to compile ANY_SHA1 regex: {e}");
      never_matching_regex()
    })
});

/// Absolute URL prefix, `scheme://`.
pub static VALID_LINK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[a-z][[:word:]-]+://").unwrap_or_else(|e| {
    error!("Failed to compile VALID_LINK regex: {e}");
    never_matching_regex()
  })
});

/// Email addresses, as accepted by CommonMark and the HTML5 email input type.
pub static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*",
  )
  .unwrap_or_else(|e| {
    error!("Failed to compile EMAIL regex: {e}");
    never_matching_regex()
  })
});

/// Bare `http`/`https`/`www.` links not already turned into anchors.
pub static LINK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?:(?:http|https)://(?:[\-;:&=+$,[:word:]]+@)?[A-Za-z0-9.\-]+|(?:www\.|[\-;:&=+$,[:word:]]+@)[A-Za-z0-9.\-]+)(?:(?:/[+~%/.[:word:]\-]*)?\??(?:[\-+:=&;%@.[:word:]]*)#?(?:[.!/\\[:word:]]*))?",
  )
  .unwrap_or_else(|e| {
    error!("Failed to compile LINK regex: {e}");
    never_matching_regex()
  })
});

/// Template placeholders such as `{user}`.
pub static TEMPLATE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\{([[:word:]]+)\}").unwrap_or_else(|e| {
    error!("Failed to compile TEMPLATE_PLACEHOLDER regex: {e}");
    never_matching_regex()
  })
});

/// Patterns that depend on the application URL.
///
/// Built once per [`AppSettings`] and shared by every rewrite pass.
#[derive(Debug, Clone)]
pub struct IssuePatterns {
  full: Regex,
}

impl IssuePatterns {
  /// Compile the full issue/pull request URL pattern for `settings`.
  ///
  /// # Errors
  ///
  /// Returns an error if the resulting pattern does not compile.
  pub fn new(settings: &AppSettings) -> Result<Self, regex::Error> {
    let full = Regex::new(&format!(
      r"{}[[:word:]]+/[[:word:]]+/(?:issues|pulls)/((?:[[:word:]]{{1,10}}-)?[1-9][0-9]*)([\?|#]\S+.(\S+)?)?(?-u:\b)",
      regex::escape(settings.app_url())
    ))?;
    Ok(Self { full })
  }

  /// Links to an issue or pull request on this instance. Group 1 is the
  /// index, group 2 an optional query or fragment.
  #[must_use]
  pub const fn full(&self) -> &Regex {
    &self.full
  }
}

/// Create a regex that never matches anything.
///
/// Used as a fallback when one of the static patterns fails to compile, so
/// that a broken pattern disables its rewriter instead of aborting.
#[must_use]
#[allow(
  clippy::expect_used,
  reason = "The pattern is a constant known to compile"
)]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("Failed to compile never-matching regex")
}
