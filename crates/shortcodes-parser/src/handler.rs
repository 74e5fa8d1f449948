//! Shortcode handler trait and its input/output types.

use crate::attributes::Attributes;

/// Result of a handler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerOutput {
    /// Replacement markup. May be empty.
    Html(String),
    /// The handler cannot render this shortcode; the error policy decides.
    Unknown,
}

impl HandlerOutput {
    /// Create an HTML output.
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }
}

/// A shortcode occurrence passed to a handler.
#[derive(Debug, Clone, Copy)]
pub struct ShortcodeCall<'a> {
    /// Shortcode name.
    pub name: &'a str,
    /// Attributes in source order.
    pub attrs: &'a Attributes,
    /// Serialized inner content (empty for unpaired shortcodes).
    pub content: &'a str,
}

/// Where the shortcode was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcodeSite<'a> {
    /// Element content. The output is parsed as HTML.
    Content,
    /// Attribute value. The output is spliced into the value as text.
    Attribute {
        /// Owning element name.
        element: &'a str,
        /// Attribute name.
        attribute: &'a str,
    },
}

/// Side-channel context for a handler invocation.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Site of the shortcode.
    pub site: ShortcodeSite<'a>,
    /// Source text of the open tag.
    pub source: &'a str,
}

impl HandlerContext<'_> {
    /// Check whether markup may be returned.
    #[must_use]
    pub fn allows_html(&self) -> bool {
        matches!(self.site, ShortcodeSite::Content)
    }
}

/// Handler for a registered shortcode.
///
/// Implemented for any `Fn(&ShortcodeCall, &HandlerContext) -> HandlerOutput`
/// closure that is `Send + Sync`. Use
/// [`ShortcodeParser::register_fn`](crate::ShortcodeParser::register_fn) to
/// register a closure without annotating its argument types.
///
/// # Example
///
/// ```
/// use shortcodes_parser::{HandlerContext, HandlerOutput, ShortcodeCall, ShortcodeHandler};
///
/// struct Abbr;
///
/// impl ShortcodeHandler for Abbr {
///     fn render(&self, call: &ShortcodeCall<'_>, _ctx: &HandlerContext<'_>) -> HandlerOutput {
///         match call.attrs.get("title") {
///             Some(title) => HandlerOutput::html(format!(
///                 r#"<abbr title="{title}">{}</abbr>"#,
///                 call.content
///             )),
///             None => HandlerOutput::Unknown,
///         }
///     }
/// }
/// ```
pub trait ShortcodeHandler: Send + Sync {
    /// Render a shortcode occurrence.
    fn render(&self, call: &ShortcodeCall<'_>, ctx: &HandlerContext<'_>) -> HandlerOutput;
}

impl<F> ShortcodeHandler for F
where
    F: Fn(&ShortcodeCall<'_>, &HandlerContext<'_>) -> HandlerOutput + Send + Sync,
{
    fn render(&self, call: &ShortcodeCall<'_>, ctx: &HandlerContext<'_>) -> HandlerOutput {
        self(call, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upper(call: &ShortcodeCall<'_>, _ctx: &HandlerContext<'_>) -> HandlerOutput {
        HandlerOutput::html(call.content.to_uppercase())
    }

    #[test]
    fn test_fn_item_is_handler() {
        let attrs = Attributes::new();
        let call = ShortcodeCall {
            name: "upper",
            attrs: &attrs,
            content: "abc",
        };
        let ctx = HandlerContext {
            site: ShortcodeSite::Content,
            source: "[upper]",
        };
        assert_eq!(upper.render(&call, &ctx), HandlerOutput::Html("ABC".to_owned()));
    }

    #[test]
    fn test_allows_html() {
        let content = HandlerContext {
            site: ShortcodeSite::Content,
            source: "[x]",
        };
        let attribute = HandlerContext {
            site: ShortcodeSite::Attribute {
                element: "a",
                attribute: "href",
            },
            source: "[x]",
        };
        assert!(content.allows_html());
        assert!(!attribute.allows_html());
    }
}
