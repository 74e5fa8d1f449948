//! HTML fragment tree for shortcode processing.
//!
//! Provides the tree the shortcode engine parses rewritten content into,
//! mutates around marker elements, and serializes back to text:
//!
//! - [`Document`]: arena of nodes addressed by [`NodeId`], with explicit
//!   parent and child links
//! - [`HtmlParser`]: lenient fragment parser built on quick-xml
//! - [`serialize`]: HTML serialization of a node or a whole document
//!
//! # Example
//!
//! ```
//! use shortcodes_html::HtmlParser;
//!
//! let doc = HtmlParser::new().parse_fragment("<p>A<span>B</span></p>").unwrap();
//! let span = doc.find_element(|name, _| name == "span").unwrap();
//! assert_eq!(doc.inner_html(span), "B");
//! assert_eq!(doc.to_html(), "<p>A<span>B</span></p>");
//! ```

mod dom;
mod elements;
mod entities;
mod error;
mod parser;
mod serializer;

pub use dom::{Attribute, Document, NodeData, NodeId};
pub use elements::{is_raw_text_element, is_void_element};
pub use error::HtmlError;
pub use parser::HtmlParser;
pub use serializer::serialize;
