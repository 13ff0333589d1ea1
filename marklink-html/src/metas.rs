//! Per-repository metadata consumed by the issue reference rewriter.
use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Repository-level substitution variables, such as the external issue
/// tracker URL template and the issue numbering style.
pub type Metas = HashMap<String, String>;

/// Selects the bare issue reference syntax.
pub const STYLE: &str = "style";
/// External issue tracker URL template, e.g.
/// `https://tracker.example.com/{user}/{repo}/issues/{index}`.
pub const FORMAT: &str = "format";
/// Placeholder name substituted with the referenced issue index.
pub const INDEX: &str = "index";
/// Repository name.
pub const REPO: &str = "repo";
/// Repository owner name.
pub const USER: &str = "user";

/// How bare issue references are written in a repository.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IssueNameStyle {
  /// `#1287`
  #[default]
  Numeric,
  /// `ABC-1234`
  Alphanumeric,
}

impl IssueNameStyle {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Numeric => "numeric",
      Self::Alphanumeric => "alphanumeric",
    }
  }

  /// Style requested by `metas`, numeric unless `alphanumeric` is asked for.
  #[must_use]
  pub fn from_metas(metas: &Metas) -> Self {
    match metas.get(STYLE).map(String::as_str) {
      Some("alphanumeric") => Self::Alphanumeric,
      _ => Self::Numeric,
    }
  }
}

impl fmt::Display for IssueNameStyle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for IssueNameStyle {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "numeric" => Ok(Self::Numeric),
      "alphanumeric" => Ok(Self::Alphanumeric),
      other => Err(format!("unknown issue name style: {other}")),
    }
  }
}

/// An external issue tracker a repository points its issue references at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalTracker {
  /// URL template; see [`FORMAT`].
  pub format: String,
  pub style:  IssueNameStyle,
}

/// Build the metas map for the repository `user/repo`.
///
/// Without an external tracker the map is empty, which makes bare issue
/// references link to the repository's own issue list.
#[must_use]
pub fn compose_metas(
  user: &str,
  repo: &str,
  tracker: Option<&ExternalTracker>,
) -> Metas {
  let Some(tracker) = tracker else {
    return Metas::new();
  };

  Metas::from([
    (USER.to_string(), user.to_string()),
    (REPO.to_string(), repo.to_string()),
    (FORMAT.to_string(), tracker.format.clone()),
    (STYLE.to_string(), tracker.style.to_string()),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_compose_metas_without_tracker() {
    assert!(compose_metas("testOwner", "testRepo", None).is_empty());
  }

  #[test]
  fn test_compose_metas_with_tracker() {
    let mut tracker = ExternalTracker {
      format: "https://someurl.com/{user}/{repo}/{issue}".to_string(),
      style:  IssueNameStyle::Numeric,
    };

    let metas = compose_metas("testOwner", "testRepo", Some(&tracker));
    assert_eq!(metas[STYLE], "numeric");
    assert_eq!(metas[REPO], "testRepo");
    assert_eq!(metas[USER], "testOwner");
    assert_eq!(metas[FORMAT], "https://someurl.com/{user}/{repo}/{issue}");

    tracker.style = IssueNameStyle::Alphanumeric;
    let metas = compose_metas("testOwner", "testRepo", Some(&tracker));
    assert_eq!(metas[STYLE], "alphanumeric");
  }

  #[test]
  fn test_style_from_metas_defaults_to_numeric() {
    assert_eq!(
      IssueNameStyle::from_metas(&Metas::new()),
      IssueNameStyle::Numeric
    );
    let metas = Metas::from([(STYLE.to_string(), "bogus".to_string())]);
    assert_eq!(IssueNameStyle::from_metas(&metas), IssueNameStyle::Numeric);
  }

  #[test]
  fn test_style_round_trips_through_str() {
    assert_eq!(
      "alphanumeric".parse::<IssueNameStyle>(),
      Ok(IssueNameStyle::Alphanumeric)
    );
    assert!("roman".parse::<IssueNameStyle>().is_err());
  }
}
