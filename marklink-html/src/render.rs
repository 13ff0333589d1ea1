//! HTML fragment serializer.
//!
//! Produces the conventional rendering expected by the templates consuming
//! post-processed markup: void elements are self-closed (`<img .../>`), text
//! and attribute values escape `& ' < > "` and carriage returns, and the
//! contents of raw text elements are written verbatim.
use std::io::Write;

use kuchikikiki::{NodeData, NodeRef};

use crate::{dom, error::RenderError};

const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link",
  "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
  "iframe",
  "noembed",
  "noframes",
  "noscript",
  "plaintext",
  "script",
  "style",
  "xmp",
];

/// Elements in which a leading newline is dropped by the parser, and so must
/// be written twice to survive a round trip.
const NEWLINE_SENSITIVE: &[&str] = &["pre", "listing", "textarea"];

/// Serialize every child of `parent`, in order.
///
/// # Errors
///
/// Returns an error if writing fails or the tree contains a void element with
/// children.
pub fn render_children<W: Write>(
  out: &mut W,
  parent: &NodeRef,
) -> Result<(), RenderError> {
  let mut child = parent.first_child();
  while let Some(node) = child {
    render_node(out, &node)?;
    child = node.next_sibling();
  }
  Ok(())
}

/// Serialize `node` and its descendants.
///
/// # Errors
///
/// See [`render_children`].
pub fn render_node<W: Write>(
  out: &mut W,
  node: &NodeRef,
) -> Result<(), RenderError> {
  match node.data() {
    NodeData::Text(text) => write_escaped(out, &text.borrow())?,
    NodeData::Comment(comment) => {
      write!(out, "<!--{}-->", comment.borrow())?;
    },
    NodeData::Element(element) => {
      let tag = element.name.local.as_ref();

      write!(out, "<{tag}")?;
      for (name, attribute) in &element.attributes.borrow().map {
        out.write_all(b" ")?;
        if let Some(prefix) = &attribute.prefix {
          write!(out, "{}:", prefix.as_ref())?;
        }
        write!(out, "{}=\"", name.local.as_ref())?;
        write_escaped(out, &attribute.value)?;
        out.write_all(b"\"")?;
      }

      if VOID_ELEMENTS.contains(&tag) {
        if node.first_child().is_some() {
          return Err(RenderError::VoidElementChildren(tag.to_string()));
        }
        out.write_all(b"/>")?;
        return Ok(());
      }
      out.write_all(b">")?;

      let contents = dom::content_root(node);
      if NEWLINE_SENSITIVE.contains(&tag)
        && contents
          .first_child()
          .and_then(|first| first.as_text().map(|t| t.borrow().starts_with('\n')))
          .unwrap_or(false)
      {
        out.write_all(b"\n")?;
      }

      if RAW_TEXT_ELEMENTS.contains(&tag) {
        let mut child = contents.first_child();
        while let Some(current) = child {
          match current.as_text() {
            Some(text) => out.write_all(text.borrow().as_bytes())?,
            None => render_node(out, &current)?,
          }
          child = current.next_sibling();
        }
      } else {
        render_children(out, &contents)?;
      }

      write!(out, "</{tag}>")?;
    },
    NodeData::Document(_) | NodeData::DocumentFragment => {
      render_children(out, node)?;
    },
    NodeData::Doctype(_) | NodeData::ProcessingInstruction(_) => {},
  }
  Ok(())
}

fn write_escaped<W: Write>(out: &mut W, text: &str) -> Result<(), RenderError> {
  let mut last = 0;
  for (i, byte) in text.bytes().enumerate() {
    let escaped: &[u8] = match byte {
      b'&' => b"&amp;",
      b'\'' => b"&#39;",
      b'<' => b"&lt;",
      b'>' => b"&gt;",
      b'"' => b"&#34;",
      b'\r' => b"&#13;",
      _ => continue,
    };
    out.write_all(&text.as_bytes()[last..i])?;
    out.write_all(escaped)?;
    last = i + 1;
  }
  out.write_all(&text.as_bytes()[last..])?;
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]

  use std::io;

  use kuchikikiki::NodeRef;

  use super::*;
  use crate::dom::{create_link, new_element};

  fn render(node: &NodeRef) -> String {
    let mut out = Vec::new();
    render_node(&mut out, node).expect("render");
    String::from_utf8(out).expect("utf-8")
  }

  #[test]
  fn test_text_is_escaped() {
    let text = NodeRef::new_text("a < b & 'c' \"d\"");
    assert_eq!(render(&text), "a &lt; b &amp; &#39;c&#39; &#34;d&#34;");
  }

  #[test]
  fn test_void_elements_self_close() {
    let image = new_element("img", &[("src", "a.png"), ("alt", "A & B")]);
    assert_eq!(render(&image), r#"<img src="a.png" alt="A &amp; B"/>"#);
  }

  #[test]
  fn test_link_with_text() {
    let link = create_link("https://example.com/?a=1&b=2", "example");
    assert_eq!(
      render(&link),
      r#"<a href="https://example.com/?a=1&amp;b=2">example</a>"#
    );
  }

  #[test]
  fn test_void_element_with_children_fails() {
    let image = new_element("img", &[("src", "a.png")]);
    image.append(NodeRef::new_text("oops"));

    let mut out = Vec::new();
    let err = render_node(&mut out, &image).expect_err("must fail");
    assert!(matches!(err, RenderError::VoidElementChildren(ref tag) if tag == "img"));
  }

  #[test]
  fn test_raw_text_is_not_escaped() {
    let script = new_element("script", &[]);
    script.append(NodeRef::new_text("if (a < b) {}"));
    assert_eq!(render(&script), "<script>if (a < b) {}</script>");
  }

  #[test]
  fn test_pre_leading_newline_is_preserved() {
    let pre = new_element("pre", &[]);
    pre.append(NodeRef::new_text("\ncode"));
    assert_eq!(render(&pre), "<pre>\n\ncode</pre>");
  }

  struct FailingWriter;

  impl Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
      Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn test_writer_errors_propagate() {
    let link = create_link("/", "home");
    let err = render_node(&mut FailingWriter, &link).expect_err("must fail");
    assert!(matches!(err, RenderError::Io(_)));
  }
}
