//! Lenient HTML fragment parser.
//!
//! Built on the quick-xml pull reader with end-name checks disabled, so
//! common HTML shapes parse: void elements without a slash, unmatched end
//! tags, unquoted and valueless attributes. Text and attribute values are
//! stored as written; entity references are kept verbatim so the tree
//! serializes back to the same markup.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::dom::{Attribute, Document, NodeData, NodeId};
use crate::elements::{is_raw_text_element, is_void_element};
use crate::entities::escape_bare_text_markup;
use crate::error::HtmlError;

/// Parse HTML fragments into a [`Document`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a fragment. Top-level nodes become children of the document root.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader rejects the markup (for example an
    /// unterminated tag or comment).
    pub fn parse_fragment(&self, html: &str) -> Result<Document, HtmlError> {
        let html = escape_bare_text_markup(html);
        let mut reader = Reader::from_str(&html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut doc = Document::new();
        let mut open: Vec<NodeId> = vec![doc.root()];

        loop {
            let parent = open.last().copied().unwrap_or_else(|| doc.root());
            match reader.read_event()? {
                Event::Start(e) => {
                    let element = self.create_element(&mut doc, &reader, &e);
                    doc.append_child(parent, element);
                    let name = doc.element_name(element).unwrap_or_default().to_owned();
                    if is_void_element(&name) {
                        continue;
                    }
                    if is_raw_text_element(&name) {
                        let body = reader.read_text(e.name())?;
                        if !body.is_empty() {
                            let text = doc.create_text(body.into_owned());
                            doc.append_child(element, text);
                        }
                        continue;
                    }
                    open.push(element);
                }
                Event::Empty(e) => {
                    let element = self.create_element(&mut doc, &reader, &e);
                    doc.append_child(parent, element);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    append_text(&mut doc, parent, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    append_text(&mut doc, parent, &format!("&{entity};"));
                }
                Event::CData(e) => {
                    let body = reader.decoder().decode(&e)?;
                    let raw = doc.create_raw(format!("<![CDATA[{body}]]>"));
                    doc.append_child(parent, raw);
                }
                Event::Comment(e) => {
                    let body = reader.decoder().decode(&e)?;
                    let comment = doc.create_comment(body.into_owned());
                    doc.append_child(parent, comment);
                }
                Event::DocType(e) => {
                    let body = reader.decoder().decode(&e)?;
                    let doctype = doc.create_doctype(body.trim().to_owned());
                    doc.append_child(parent, doctype);
                }
                Event::End(e) => {
                    let name = self.decode_name(&reader, e.name().as_ref());
                    close_element(&doc, &mut open, &name);
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) => {}
            }
        }

        tracing::trace!(top_level = doc.children(doc.root()).len(), "Parsed HTML fragment");
        Ok(doc)
    }

    fn create_element(&self, doc: &mut Document, reader: &Reader<&[u8]>, e: &BytesStart) -> NodeId {
        let name = self.decode_name(reader, e.name().as_ref());
        let attrs = e
            .html_attributes()
            .flatten()
            .map(|attr| {
                let key = self.decode_name(reader, attr.key.as_ref());
                let value = reader.decoder().decode(&attr.value).map_or_else(
                    |_| String::from_utf8_lossy(&attr.value).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                Attribute::new(key, value)
            })
            .collect();
        doc.create_element(name, attrs)
    }

    fn decode_name(&self, reader: &Reader<&[u8]>, name: &[u8]) -> String {
        reader
            .decoder()
            .decode(name)
            .map_or_else(
                |_| String::from_utf8_lossy(name).into_owned(),
                std::borrow::Cow::into_owned,
            )
            .to_ascii_lowercase()
    }
}

/// Append text to `parent`, merging with a preceding text node.
fn append_text(doc: &mut Document, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(&last) = doc.children(parent).last()
        && let NodeData::Text(existing) = doc.data_mut(last)
    {
        existing.push_str(text);
        return;
    }
    let node = doc.create_text(text);
    doc.append_child(parent, node);
}

/// Pop open elements up to and including the nearest one named `name`.
/// Unmatched end tags are dropped.
fn close_element(doc: &Document, open: &mut Vec<NodeId>, name: &str) {
    let Some(pos) = open
        .iter()
        .rposition(|&id| doc.element_name(id) == Some(name))
    else {
        tracing::trace!(tag = %name, "Ignoring unmatched end tag");
        return;
    };
    open.truncate(pos);
}
