//! `[[...]]` short-link parsing and node construction.
//!
//! The content between the brackets is split on `|`. Pieces without `=` are
//! positional: the first is the display name, the second the link target,
//! unless the name slot is still free and the piece looks like an absolute
//! link, in which case it takes the link slot (pushing a previous link into
//! the name slot). This accepts both `[[Text|target]]` and
//! `[[https://target|Text]]`. Pieces with `=` are `key=value` options.
use std::collections::HashMap;

use kuchikikiki::NodeRef;

use crate::{
  context::RenderContext,
  dom,
  links::{base_name, extension, is_link, is_same_domain, url_join},
};

const IMAGE_EXTENSIONS: &[&str] = &[
  ".jpg", ".jpeg", ".png", ".tif", ".tiff", ".webp", ".gif", ".bmp", ".ico",
  ".svg",
];

/// Parsed `|`-separated short-link arguments.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ShortLinkProps {
  props: HashMap<String, String>,
}

impl ShortLinkProps {
  pub(crate) fn parse(content: &str) -> Self {
    let mut props: HashMap<String, String> = HashMap::new();

    for piece in content.split('|') {
      let Some((key, value)) = piece.split_once('=') else {
        let name_is_empty = props.get("name").is_none_or(String::is_empty);
        if name_is_empty && is_link(piece) {
          if let Some(previous) =
            props.get("link").filter(|link| !link.is_empty()).cloned()
          {
            props.insert("name".to_string(), previous);
          }
          props.insert("link".to_string(), piece.trim().to_string());
        } else if name_is_empty {
          props.insert("name".to_string(), piece.to_string());
        } else {
          props.insert("link".to_string(), piece.trim().to_string());
        }
        continue;
      };

      let value = html_escape::decode_html_entities(value);
      props.insert(key.to_string(), strip_smart_quotes(&value).to_string());
    }

    Self { props }
  }

  /// Value of `key`, treating empty values as absent.
  pub(crate) fn get(&self, key: &str) -> Option<&str> {
    self
      .props
      .get(key)
      .map(String::as_str)
      .filter(|value| !value.is_empty())
  }
}

fn strip_smart_quotes(value: &str) -> &str {
  value
    .strip_prefix('“')
    .and_then(|rest| rest.strip_suffix('”'))
    .or_else(|| {
      value
        .strip_prefix('‘')
        .and_then(|rest| rest.strip_suffix('’'))
    })
    .unwrap_or(value)
}

/// Build the replacement for a short-link with bracket `content` and word
/// `tail`.
///
/// With `no_link` the text or image is returned bare instead of being wrapped
/// in an anchor.
pub(crate) fn build(
  ctx: &RenderContext<'_>,
  content: &str,
  tail: &str,
  no_link: bool,
) -> NodeRef {
  let props = ShortLinkProps::parse(content);

  let mut link = props
    .get("link")
    .or_else(|| props.get("name"))
    .unwrap_or_default()
    .to_string();
  let mut name = props
    .get("title")
    .or_else(|| props.get("name"))
    .unwrap_or(&link)
    .to_string();
  name.push_str(tail);

  let image = IMAGE_EXTENSIONS.contains(&extension(&link));
  let absolute = is_link(&link);
  if !absolute {
    link = link.replace(' ', if image { "+" } else { "-" });
  }

  let child = if image {
    if !absolute {
      let prefix = if is_same_domain(ctx.settings, ctx.url_prefix) {
        ctx.url_prefix.replacen("/src/", "/raw/", 1)
      } else {
        ctx.url_prefix.to_string()
      };
      if ctx.is_wiki_markdown {
        link = url_join("wiki", &["raw", link.as_str()]);
      }
      link = url_join(&prefix, &[link.as_str()]);
    }

    let title = props
      .get("title")
      .or_else(|| props.get("alt"))
      .unwrap_or_else(|| base_name(&name))
      .to_string();
    let alt = props.get("alt").unwrap_or(&name).to_string();

    let mut attributes = vec![("src", link.as_str()), ("title", title.as_str())];
    if !alt.is_empty() {
      attributes.push(("alt", alt.as_str()));
    }
    dom::new_element("img", &attributes)
  } else {
    if !absolute {
      if ctx.is_wiki_markdown {
        link = url_join("wiki", &[link.as_str()]);
      }
      link = url_join(ctx.url_prefix, &[link.as_str()]);
    }
    NodeRef::new_text(name)
  };

  if no_link {
    return child;
  }
  let anchor = dom::new_element("a", &[("href", link.as_str())]);
  anchor.append(child);
  anchor
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_github_order() {
    let props = ShortLinkProps::parse("Link Text|target-page");
    assert_eq!(props.get("name"), Some("Link Text"));
    assert_eq!(props.get("link"), Some("target-page"));
  }

  #[test]
  fn test_mediawiki_order_with_absolute_link() {
    let props = ShortLinkProps::parse("https://example.com/page|Link Text");
    assert_eq!(props.get("name"), Some("Link Text"));
    assert_eq!(props.get("link"), Some("https://example.com/page"));

    let props = ShortLinkProps::parse("https://a.example.com|https://b.example.com");
    assert_eq!(props.get("name"), Some("https://a.example.com"));
    assert_eq!(props.get("link"), Some("https://b.example.com"));
  }

  #[test]
  fn test_extra_positional_pieces_overwrite_link() {
    let props = ShortLinkProps::parse("Name|first|second");
    assert_eq!(props.get("name"), Some("Name"));
    assert_eq!(props.get("link"), Some("second"));
  }

  #[test]
  fn test_options_are_decoded_and_unquoted() {
    let props =
      ShortLinkProps::parse("image.png|title=“A &amp; B”|alt=‘plain’|width=20");
    assert_eq!(props.get("title"), Some("A & B"));
    assert_eq!(props.get("alt"), Some("plain"));
    assert_eq!(props.get("width"), Some("20"));
  }

  #[test]
  fn test_option_value_may_contain_equals() {
    let props = ShortLinkProps::parse("Page|title=a=b");
    assert_eq!(props.get("title"), Some("a=b"));
  }

  #[test]
  fn test_empty_values_count_as_absent() {
    let props = ShortLinkProps::parse("|title=");
    assert_eq!(props.get("name"), None);
    assert_eq!(props.get("title"), None);
  }
}
