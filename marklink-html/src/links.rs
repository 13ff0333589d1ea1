//! URL helpers shared by the rewriters.
use std::borrow::Cow;

use url::{ParseError, Position, Url};

use crate::{
  metas::{INDEX, Metas},
  patterns::{TEMPLATE_PLACEHOLDER, VALID_LINK},
  settings::AppSettings,
};

/// Length commit hashes are shortened to in link text.
pub const SHORT_SHA_LEN: usize = 10;

/// Anchor used to resolve references against relative bases. Only the path,
/// query and fragment of the result are kept.
const RELATIVE_ANCHOR: &str = "http://relative.invalid/";

/// Whether `link` starts with an absolute URL scheme such as `https://`.
#[must_use]
pub fn is_link(link: &str) -> bool {
  VALID_LINK.is_match(link)
}

/// Whether `link` points at the application itself.
///
/// Root-relative paths always do; absolute URLs do when host and port match
/// the application URL.
#[must_use]
pub fn is_same_domain(settings: &AppSettings, link: &str) -> bool {
  if link.starts_with('/') {
    return true;
  }

  match (Url::parse(settings.app_url()), Url::parse(link)) {
    (Ok(app), Ok(other)) => {
      app.host_str() == other.host_str() && app.port() == other.port()
    },
    _ => false,
  }
}

/// Join `elems` as a path and resolve it against `base`, the way a browser
/// resolves a relative link found on a page at `base/`.
///
/// The elements are cleaned like a POSIX path join (`.` and `..` segments are
/// folded, empty elements dropped). If `base` is relative and not rooted, the
/// result is relative too. An empty string is returned when `base` cannot be
/// parsed.
#[must_use]
pub fn url_join(base: &str, elems: &[&str]) -> String {
  let base: Cow<'_, str> = if base.ends_with('/') {
    Cow::Borrowed(base)
  } else {
    Cow::Owned(format!("{base}/"))
  };
  let reference = join_path(elems);

  match Url::parse(&base) {
    Ok(base_url) => {
      base_url
        .join(&reference)
        .map(String::from)
        .unwrap_or_default()
    },
    Err(ParseError::RelativeUrlWithoutBase) => {
      let resolved = Url::parse(RELATIVE_ANCHOR)
        .and_then(|anchor| anchor.join(&base))
        .and_then(|base_url| base_url.join(&reference));
      let Ok(resolved) = resolved else {
        return String::new();
      };

      let path = &resolved[Position::BeforePath..];
      if base.starts_with('/') {
        path.to_string()
      } else {
        path.strip_prefix('/').unwrap_or(path).to_string()
      }
    },
    Err(_) => String::new(),
  }
}

/// Cut a root-relative URL prefix down to its `/owner/repo` part, accounting
/// for the application sub-URL. Other prefixes are returned unchanged.
///
/// `/owner/repo/src/branch/main` becomes `/owner/repo` for an application
/// served at the domain root.
#[must_use]
pub fn cutout_verbose_prefix<'p>(
  settings: &AppSettings,
  prefix: &'p str,
) -> &'p str {
  if !prefix.starts_with('/') {
    return prefix;
  }

  let limit = 3 + settings.app_sub_url_depth();
  let mut count = 0;
  for (i, byte) in prefix.bytes().enumerate() {
    if byte == b'/' {
      count += 1;
    }
    if count >= limit {
      return &prefix[..i];
    }
  }
  prefix
}

/// Shorten a commit hash for display.
#[must_use]
pub fn short_sha(sha: &str) -> &str {
  let sha = sha.strip_prefix("commit-").unwrap_or(sha);
  sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

/// Substitute `{key}` placeholders in `template`.
///
/// `{index}` is replaced by `index`; every other placeholder by the matching
/// entry of `metas`. Unknown placeholders are kept verbatim.
#[must_use]
pub fn expand_template(template: &str, metas: &Metas, index: &str) -> String {
  TEMPLATE_PLACEHOLDER
    .replace_all(template, |caps: &regex::Captures<'_>| {
      let key = &caps[1];
      if key == INDEX {
        return index.to_string();
      }
      metas
        .get(key)
        .cloned()
        .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Final path component of `path`, `.` for an empty path.
pub(crate) fn base_name(path: &str) -> &str {
  if path.is_empty() {
    return ".";
  }
  let trimmed = path.trim_end_matches('/');
  if trimmed.is_empty() {
    return "/";
  }
  trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Extension of the final path component of `path`, including the dot.
pub(crate) fn extension(path: &str) -> &str {
  let name_start = path.rfind('/').map_or(0, |i| i + 1);
  path[name_start..]
    .rfind('.')
    .map_or("", |i| &path[name_start + i..])
}

fn join_path(elems: &[&str]) -> String {
  let parts: Vec<&str> = elems
    .iter()
    .copied()
    .filter(|elem| !elem.is_empty())
    .collect();
  if parts.is_empty() {
    return String::new();
  }
  clean_path(&parts.join("/"))
}

fn clean_path(path: &str) -> String {
  let rooted = path.starts_with('/');
  let mut segments: Vec<&str> = Vec::new();

  for segment in path.split('/') {
    match segment {
      "" | "." => {},
      ".." => {
        if segments.last().is_some_and(|last| *last != "..") {
          segments.pop();
        } else if !rooted {
          segments.push("..");
        }
      },
      _ => segments.push(segment),
    }
  }

  let joined = segments.join("/");
  if rooted {
    format!("/{joined}")
  } else if joined.is_empty() {
    ".".to_string()
  } else {
    joined
  }
}
