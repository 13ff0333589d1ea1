#![allow(clippy::expect_used, reason = "Fine in tests")]
use marklink_html::{AppSettings, Metas, PostProcessor};

const PREFIX: &str = "/gogits/gogs";
const DEFAULT_LINK: &str = "http://example.com/x";

fn render(input: &str, default_link: &str) -> String {
  PostProcessor::new(AppSettings::new("http://localhost:3000/"))
    .expect("valid settings")
    .render_commit_message(input.as_bytes(), PREFIX, default_link, &Metas::new())
    .expect("render commit message")
}

#[test]
fn test_whole_text_becomes_default_link() {
  assert_eq!(
    render("fix the build", DEFAULT_LINK),
    r#"<a href="http://example.com/x">fix the build</a>"#
  );
}

#[test]
fn test_default_link_surrounds_other_links() {
  assert_eq!(
    render("fix #12 crash", DEFAULT_LINK),
    "<a href=\"http://example.com/x\">fix </a><a \
     href=\"/gogits/gogs/issues/12\">#12</a><a href=\"http://example.com/x\"> \
     crash</a>"
  );
}

#[test]
fn test_leading_match_leaves_empty_default_link() {
  assert_eq!(
    render("#12 crash", DEFAULT_LINK),
    "<a href=\"http://example.com/x\"></a><a \
     href=\"/gogits/gogs/issues/12\">#12</a><a href=\"http://example.com/x\"> \
     crash</a>"
  );
}

#[test]
fn test_without_default_link() {
  assert_eq!(
    render("<p>fix #12</p>", ""),
    r#"<p>fix <a href="/gogits/gogs/issues/12">#12</a></p>"#
  );
}

#[test]
fn test_short_links_are_not_expanded() {
  assert_eq!(render("see [[Tips]]", ""), "see [[Tips]]");
}

#[test]
fn test_existing_anchor_text_is_left_alone() {
  let input = r#"<a href="/y">[[Tips]]</a>"#;
  assert_eq!(render(input, DEFAULT_LINK), input);
}
