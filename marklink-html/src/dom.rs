//! Small helpers over the kuchikikiki node tree.
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, local_name, ns};

/// Create an HTML element with `attributes` in the given order.
pub(crate) fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    attributes.iter().map(|(name, value)| {
      (ExpandedName::new(ns!(), *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// `<a href="{href}">{content}</a>`
pub(crate) fn create_link(href: &str, content: &str) -> NodeRef {
  let link = new_element("a", &[("href", href)]);
  link.append(NodeRef::new_text(content));
  link
}

/// Local tag name of `node` if it is an element.
pub(crate) fn tag_name(node: &NodeRef) -> Option<LocalName> {
  node.as_element().map(|element| element.name.local.clone())
}

/// The `<body>` element of a parsed document.
pub(crate) fn find_body(document: &NodeRef) -> Option<NodeRef> {
  document
    .descendants()
    .find(|node| tag_name(node).is_some_and(|name| name == local_name!("body")))
}

/// Node whose children hold the content of `node`; for `<template>` that is
/// its separate contents fragment.
pub(crate) fn content_root(node: &NodeRef) -> NodeRef {
  node
    .as_element()
    .and_then(|element| element.template_contents.clone())
    .unwrap_or_else(|| node.clone())
}
