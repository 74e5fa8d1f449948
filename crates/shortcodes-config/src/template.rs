//! Template shortcodes defined in configuration.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;
use shortcodes_parser::{
    ExpectedResult, HandlerContext, HandlerOutput, ShortcodeCall, ShortcodeHandler,
    ShortcodeOptions,
};

/// `{{ content }}`, `{{ name }}` and `{{ attrs.key }}` placeholders.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("invalid placeholder regex")
});

/// A `[shortcodes.<name>]` table.
///
/// ```toml
/// [shortcodes.note]
/// template = '<aside class="{{ attrs.kind }}">{{ content }}</aside>'
/// has_start_and_end = true
/// expected_result = "block"
/// required_attrs = ["kind"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateShortcode {
    /// Replacement markup with placeholders.
    pub template: String,
    /// The shortcode takes a `[/name]` close tag.
    #[serde(default)]
    pub has_start_and_end: bool,
    /// Kind of markup the template produces.
    #[serde(default)]
    pub expected_result: ExpectedResult,
    /// Attributes that must be present. A shortcode missing one is not
    /// rendered and falls to the error behavior.
    #[serde(default)]
    pub required_attrs: Vec<String>,
}

impl TemplateShortcode {
    /// Registration options for this shortcode.
    #[must_use]
    pub fn options(&self) -> ShortcodeOptions {
        ShortcodeOptions {
            has_start_and_end: self.has_start_and_end,
            expected_result: self.expected_result,
        }
    }

    /// Handler rendering this template.
    #[must_use]
    pub fn handler(&self) -> TemplateHandler {
        TemplateHandler {
            template: self.template.clone(),
            required_attrs: self.required_attrs.clone(),
        }
    }
}

/// Handler substituting placeholders in a fixed template.
///
/// Attribute values are HTML-escaped when the output lands in element
/// content. Unknown placeholders are kept as written.
#[derive(Debug, Clone)]
pub struct TemplateHandler {
    template: String,
    required_attrs: Vec<String>,
}

impl TemplateHandler {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            required_attrs: Vec::new(),
        }
    }

    /// Require an attribute to be present.
    #[must_use]
    pub fn with_required_attr(mut self, name: impl Into<String>) -> Self {
        self.required_attrs.push(name.into());
        self
    }
}

impl ShortcodeHandler for TemplateHandler {
    fn render(&self, call: &ShortcodeCall<'_>, ctx: &HandlerContext<'_>) -> HandlerOutput {
        if let Some(missing) = self
            .required_attrs
            .iter()
            .find(|attr| call.attrs.get(attr).is_none())
        {
            tracing::debug!(name = %call.name, attr = %missing, "Missing required attribute");
            return HandlerOutput::Unknown;
        }

        let html = PLACEHOLDER.replace_all(&self.template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match key {
                "content" => call.content.to_owned(),
                "name" => call.name.to_owned(),
                _ => match key.strip_prefix("attrs.") {
                    Some(attr) => {
                        let value = call.attrs.get(attr).unwrap_or_default();
                        if ctx.allows_html() {
                            escape_html(value)
                        } else {
                            value.to_owned()
                        }
                    }
                    None => caps[0].to_owned(),
                },
            }
        });
        HandlerOutput::html(html)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shortcodes_parser::{Attributes, ShortcodeSite};

    fn render(handler: &TemplateHandler, attrs: &Attributes, content: &str) -> HandlerOutput {
        let call = ShortcodeCall {
            name: "note",
            attrs,
            content,
        };
        let ctx = HandlerContext {
            site: ShortcodeSite::Content,
            source: "[note]",
        };
        handler.render(&call, &ctx)
    }

    #[test]
    fn test_placeholders_substituted() {
        let handler = TemplateHandler::new(
            r#"<aside class="{{ attrs.kind }}" data-name="{{name}}">{{ content }}</aside>"#,
        );
        let attrs = Attributes::parse(r#"kind="tip""#);
        assert_eq!(
            render(&handler, &attrs, "<b>Hi</b>"),
            HandlerOutput::html(r#"<aside class="tip" data-name="note"><b>Hi</b></aside>"#)
        );
    }

    #[test]
    fn test_missing_attr_is_empty() {
        let handler = TemplateHandler::new("[{{ attrs.kind }}]");
        assert_eq!(
            render(&handler, &Attributes::new(), ""),
            HandlerOutput::html("[]")
        );
    }

    #[test]
    fn test_required_attr_missing_is_unknown() {
        let handler = TemplateHandler::new("{{ attrs.src }}").with_required_attr("src");
        assert_eq!(render(&handler, &Attributes::new(), ""), HandlerOutput::Unknown);
    }

    #[test]
    fn test_attr_values_escaped_in_content() {
        let handler = TemplateHandler::new("{{ attrs.title }}");
        let attrs: Attributes = [("title", "a<b & \"c\"")].into_iter().collect();
        assert_eq!(
            render(&handler, &attrs, ""),
            HandlerOutput::html("a&lt;b &amp; &quot;c&quot;")
        );
    }

    #[test]
    fn test_attr_values_raw_in_attributes() {
        let handler = TemplateHandler::new("/page/{{ attrs.id }}");
        let attrs: Attributes = [("id", "a&b")].into_iter().collect();
        let call = ShortcodeCall {
            name: "link",
            attrs: &attrs,
            content: "",
        };
        let ctx = HandlerContext {
            site: ShortcodeSite::Attribute {
                element: "a",
                attribute: "href",
            },
            source: "[link]",
        };
        assert_eq!(handler.render(&call, &ctx), HandlerOutput::html("/page/a&b"));
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let handler = TemplateHandler::new("{{ other }}");
        assert_eq!(
            render(&handler, &Attributes::new(), ""),
            HandlerOutput::html("{{ other }}")
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let shortcode: TemplateShortcode = toml::from_str(r#"template = "<hr>""#).unwrap();
        assert_eq!(shortcode.options(), ShortcodeOptions::default());
        assert!(shortcode.required_attrs.is_empty());
    }
}
