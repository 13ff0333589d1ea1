//! Tree traversal and in-place text splicing.
//!
//! Children are iterated through `next_sibling` as the loop advances, so nodes
//! spliced in after the current one are visited as ordinary siblings.
use kuchikikiki::NodeRef;
use markup5ever::local_name;

use crate::{
  context::RenderContext,
  dom::tag_name,
  processors::{ANCHOR_TEXT_PROCESSORS, Processor},
};

/// Primary traversal. Skips `code`, `pre` and existing anchors; anchors are
/// revisited for short-links when the context asks for it.
pub(crate) fn visit_node(ctx: &RenderContext<'_>, node: &NodeRef) {
  if node.as_text().is_some() {
    text_node(ctx, node, ctx.processors);
    return;
  }

  let Some(tag) = tag_name(node) else {
    return;
  };
  if tag == local_name!("a") {
    if ctx.visit_links_for_short_links {
      visit_node_for_short_links(ctx, node);
    }
    return;
  }
  if tag == local_name!("code") || tag == local_name!("pre") {
    return;
  }

  let mut child = node.first_child();
  while let Some(current) = child {
    visit_node(ctx, &current);
    child = current.next_sibling();
  }
}

/// Secondary traversal inside an anchor, rewriting only short-links and
/// never producing nested anchors.
pub(crate) fn visit_node_for_short_links(
  ctx: &RenderContext<'_>,
  node: &NodeRef,
) {
  if node.as_text().is_some() {
    text_node(ctx, node, ANCHOR_TEXT_PROCESSORS);
    return;
  }

  let Some(tag) = tag_name(node) else {
    return;
  };
  if tag == local_name!("code") || tag == local_name!("pre") {
    return;
  }

  let mut child = node.first_child();
  while let Some(current) = child {
    visit_node_for_short_links(ctx, &current);
    child = current.next_sibling();
  }
}

/// Run each processor once against `node`. A processor that matches leaves
/// only the text before the match in `node`, so later processors see that
/// prefix.
pub(crate) fn text_node(
  ctx: &RenderContext<'_>,
  node: &NodeRef,
  processors: &[&dyn Processor],
) {
  let Some(text) = node.as_text() else {
    return;
  };

  for processor in processors {
    let replacement = {
      let content = text.borrow();
      processor
        .find(ctx, &content)
        .map(|found| (found.span.clone(), processor.build(ctx, &content, &found)))
    };

    if let Some((span, new_node)) = replacement {
      replace_content(node, span, &new_node);
    }
  }
}

/// Replace `span` of the text node `node` with `new_node`.
///
/// `node` keeps the text before the span; the text after it, if any, is
/// inserted as a new text node following `new_node`.
pub(crate) fn replace_content(
  node: &NodeRef,
  span: std::ops::Range<usize>,
  new_node: &NodeRef,
) {
  let Some(text) = node.as_text() else {
    return;
  };

  let after = {
    let mut content = text.borrow_mut();
    let after = content.split_off(span.end);
    content.truncate(span.start);
    after
  };

  node.insert_after(new_node.clone());
  if !after.is_empty() {
    new_node.insert_after(NodeRef::new_text(after));
  }
}
