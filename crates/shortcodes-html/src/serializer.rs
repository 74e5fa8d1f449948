//! HTML serializer for [`Document`] trees.
//!
//! Text and attribute values are written as stored, so markup that came
//! from the parser round-trips. Attribute values are always double-quoted.

use std::fmt::Write;

use crate::dom::{Document, NodeData, NodeId};
use crate::elements::is_void_element;

/// Serialize every top-level node of a document.
#[must_use]
pub fn serialize(doc: &Document) -> String {
    doc.inner_html(doc.root())
}

/// Serialize a single node and its subtree into `out`.
pub(crate) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        NodeData::Root => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        NodeData::Element { name, attrs } => {
            out.push('<');
            out.push_str(name);
            for attr in attrs {
                // Writing to a String cannot fail
                let _ = write!(out, r#" {}="{}""#, attr.name, attr.value.replace('"', "&quot;"));
            }
            out.push('>');
            if is_void_element(name) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            let _ = write!(out, "</{name}>");
        }
        NodeData::Text(text) | NodeData::Raw(text) => out.push_str(text),
        NodeData::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeData::Doctype(text) => {
            let _ = write!(out, "<!DOCTYPE {text}>");
        }
    }
}
