//! Block-context repair: moves a placeholder to a structurally valid spot
//! before its replacement is inserted.
//!
//! For a split, every ancestor between the placeholder and its block
//! container is duplicated so content before the placeholder stays in the
//! original chain and content after it moves to the copy:
//!
//! ```text
//! <p>A<span>B<m/>C</span>D</p>
//!   -> <p>A<span>B</span></p><m/><p><span>C</span>D</p>
//! ```
//!
//! A copied ancestor that is itself a placeholder (an enclosing paired
//! shortcode) is unwrapped: its id is already taken by the original, so
//! the content after the split stays as plain markup.

use shortcodes_html::{Document, NodeData, NodeId};

use crate::config::{ParserConfig, Placement};

/// Nearest ancestor element whose name is in the block set.
///
/// Returns `None` when the walk reaches the fragment root first.
pub(crate) fn block_ancestor(doc: &Document, node: NodeId, config: &ParserConfig) -> Option<NodeId> {
    doc.ancestors(node)
        .map_while(|id| match doc.data(id) {
            NodeData::Element { name, .. } => Some((id, name)),
            _ => None,
        })
        .find(|(_, name)| config.is_block_element(name))
        .map(|(id, _)| id)
}

/// Move `marker` according to `placement` relative to its block ancestor.
pub(crate) fn relocate(
    doc: &mut Document,
    marker: NodeId,
    block: NodeId,
    placement: Placement,
    config: &ParserConfig,
) {
    match placement {
        Placement::Inline => {}
        Placement::BeforeBlock => doc.insert_before(block, marker),
        Placement::AfterBlock => doc.insert_after(block, marker),
        Placement::Split => split_at(doc, marker, block, &config.marker_class),
    }
    tracing::debug!(placement = %placement, marker = marker.index(), "Relocated shortcode marker");
}

fn split_at(doc: &mut Document, marker: NodeId, block: NodeId, marker_class: &str) {
    let stop = doc.parent(block);
    let mut at = marker;
    let mut splitee = doc.parent(marker);

    while let Some(current) = splitee
        && Some(current) != stop
    {
        let clone = doc.shallow_clone(current);
        doc.insert_after(current, clone);
        while let Some(next) = doc.next_sibling(at) {
            doc.append_child(clone, next);
        }
        if is_placeholder(doc, clone, marker_class) {
            unwrap(doc, clone);
        }
        at = current;
        splitee = doc.parent(current);
    }

    doc.insert_after(block, marker);
}

fn is_placeholder(doc: &Document, id: NodeId, marker_class: &str) -> bool {
    doc.attr(id, "class") == Some(marker_class) && doc.attr(id, "data-tagid").is_some()
}

/// Replace `node` with its children.
fn unwrap(doc: &mut Document, node: NodeId) {
    for child in doc.children(node).to_vec() {
        doc.insert_before(node, child);
    }
    doc.detach(node);
}
