//! Content substitution: replaces placeholders in the tree with handler
//! output, in processing order.

use shortcodes_html::{Attribute, Document, HtmlParser, NodeId};

use crate::config::{ParserConfig, Placement};
use crate::error::ShortcodeError;
use crate::handler::{HandlerContext, HandlerOutput, ShortcodeCall, ShortcodeSite};
use crate::policy;
use crate::registry::Registry;
use crate::repair::{block_ancestor, relocate};
use crate::scanner::Token;

/// Shared state for one parse call.
pub(crate) struct Substitution<'a> {
    pub config: &'a ParserConfig,
    pub registry: &'a Registry,
    pub tokens: &'a [Token],
}

impl Substitution<'_> {
    /// Repair around the placeholder of `tokens[index]` and replace it.
    ///
    /// A placeholder that is no longer in the tree (for example inside a
    /// raw-text element) is skipped; the leftover pass handles it.
    pub fn process(&self, doc: &mut Document, index: usize) -> Result<(), ShortcodeError> {
        let token = &self.tokens[index];
        let Some(marker) = self.find_marker(doc, token) else {
            tracing::debug!(name = %token.name, index, "Shortcode marker not found in tree");
            return Ok(());
        };

        let content = doc.inner_html(marker);
        let placement = self.config.placement.classify(&token.attrs);
        let block = block_ancestor(doc, marker, self.config);

        let replacement = match block {
            None if placement != Placement::Inline => {
                let error = ShortcodeError::InvalidPlacement {
                    name: token.name.clone(),
                    placement,
                };
                let source = self.source_text(token, &content);
                policy::structural(self.config.error_behavior, error, &source, true)?
            }
            _ => {
                if let Some(block) = block {
                    relocate(doc, marker, block, placement, self.config);
                }
                self.invoke(token, &content, ShortcodeSite::Content)?
            }
        };

        insert_fragment(doc, marker, &replacement);
        doc.detach(marker);
        tracing::debug!(name = %token.name, index, "Substituted shortcode");
        Ok(())
    }

    /// Call the handler for `token`, routing `Unknown` through the policy.
    pub fn invoke(
        &self,
        token: &Token,
        content: &str,
        site: ShortcodeSite<'_>,
    ) -> Result<String, ShortcodeError> {
        let call = ShortcodeCall {
            name: &token.name,
            attrs: &token.attrs,
            content,
        };
        let ctx = HandlerContext {
            site,
            source: &token.text,
        };

        match self.registry.render(&call, &ctx) {
            HandlerOutput::Html(html) => Ok(html),
            HandlerOutput::Unknown => policy::unresolved(
                self.config.error_behavior,
                ShortcodeError::HandlerUnknown {
                    name: token.name.clone(),
                },
                &token.text,
                &self.source_text(token, content),
                ctx.allows_html(),
            ),
        }
    }

    /// Original text of a shortcode: the open tag, and for a pair its inner
    /// content and close tag.
    pub fn source_text(&self, token: &Token, content: &str) -> String {
        match token.counterpart.map(|c| &self.tokens[c]) {
            Some(close) => format!("{}{content}{}", token.text, close.text),
            None => token.text.clone(),
        }
    }

    fn find_marker(&self, doc: &Document, token: &Token) -> Option<NodeId> {
        let element = token.marker.element()?;
        let id = token.index.to_string();
        let class = self.config.marker_class.as_str();
        doc.find_element(|name, attrs| {
            name == element && has_attr(attrs, "class", class) && has_attr(attrs, "data-tagid", &id)
        })
    }
}

fn has_attr(attrs: &[Attribute], name: &str, value: &str) -> bool {
    attrs.iter().any(|a| a.name == name && a.value == value)
}

/// Parse `html` and insert its top-level nodes after `anchor`.
///
/// Output that cannot be parsed is inserted verbatim.
fn insert_fragment(doc: &mut Document, anchor: NodeId, html: &str) {
    if html.is_empty() {
        return;
    }
    let nodes = match HtmlParser::new().parse_fragment(html) {
        Ok(fragment) => doc.import_fragment(&fragment),
        Err(e) => {
            tracing::warn!(error = %e, "Inserting unparsable shortcode output verbatim");
            vec![doc.create_raw(html)]
        }
    };

    let mut previous = anchor;
    for node in nodes {
        doc.insert_after(previous, node);
        previous = node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorBehavior;
    use crate::nesting::resolve;
    use crate::registry::{ExpectedResult, ShortcodeOptions};
    use crate::rewriter::rewrite;
    use crate::scanner::scan;
    use pretty_assertions::assert_eq;

    fn wrap(call: &ShortcodeCall<'_>, _: &HandlerContext<'_>) -> HandlerOutput {
        HandlerOutput::html(format!("<section>{}</section>", call.content))
    }

    fn decline(_: &ShortcodeCall<'_>, _: &HandlerContext<'_>) -> HandlerOutput {
        HandlerOutput::Unknown
    }

    fn registry() -> Registry {
        let mut registry = Registry::default();
        registry.insert(
            "wrap",
            Box::new(wrap),
            Some(
                ShortcodeOptions::new()
                    .paired()
                    .with_expected_result(ExpectedResult::Block),
            ),
        );
        registry.insert("decline", Box::new(decline), Some(ShortcodeOptions::new().paired()));
        registry.insert("pic", Box::new(decline), None);
        registry
    }

    fn run(text: &str, behavior: ErrorBehavior) -> Result<String, ShortcodeError> {
        let registry = registry();
        let config = ParserConfig::new().with_error_behavior(behavior);
        let mut tokens = scan(text, &registry);
        let order = resolve(&mut tokens, &registry, behavior, true)?;
        let rewritten = rewrite(text, &tokens, &config)?;
        let mut doc = HtmlParser::new().parse_fragment(&rewritten)?;
        let substitution = Substitution {
            config: &config,
            registry: &registry,
            tokens: &tokens,
        };
        for index in order {
            substitution.process(&mut doc, index)?;
        }
        Ok(doc.to_html())
    }

    #[test]
    fn test_paired_content_passed_to_handler() {
        assert_eq!(
            run("[wrap]<em>x</em>[/wrap]", ErrorBehavior::Leave).unwrap(),
            "<section><em>x</em></section>"
        );
    }

    #[test]
    fn test_unknown_paired_leave_keeps_inner_content() {
        assert_eq!(
            run("<p>[decline]a <b>b</b>[/decline]</p>", ErrorBehavior::Leave).unwrap(),
            "<p>[decline]a <b>b</b>[/decline]</p>"
        );
    }

    #[test]
    fn test_unknown_warn_and_strip() {
        assert_eq!(
            run("<p>[pic]</p>", ErrorBehavior::Warn).unwrap(),
            r#"<p><strong class="warning">[pic]</strong></p>"#
        );
        assert_eq!(run("<p>x[pic]</p>", ErrorBehavior::Strip).unwrap(), "<p>x</p>");
        assert!(matches!(
            run("<p>[pic]</p>", ErrorBehavior::Fail),
            Err(ShortcodeError::HandlerUnknown { .. })
        ));
    }

    #[test]
    fn test_invalid_placement_goes_through_policy() {
        let text = r#"<span>[pic class="center"]</span>"#;
        assert_eq!(
            run(text, ErrorBehavior::Leave).unwrap(),
            r#"<span>[pic class="center"]</span>"#
        );
        assert_eq!(run(text, ErrorBehavior::Strip).unwrap(), "<span></span>");
        assert!(matches!(
            run(text, ErrorBehavior::Fail),
            Err(ShortcodeError::InvalidPlacement {
                placement: Placement::Split,
                ..
            })
        ));
    }

    #[test]
    fn test_unparsable_output_inserted_verbatim() {
        let mut registry = Registry::default();
        registry.insert(
            "broken",
            Box::new(|_: &ShortcodeCall<'_>, _: &HandlerContext<'_>| HandlerOutput::html("<b")),
            None,
        );
        let config = ParserConfig::default();
        let mut tokens = scan("<p>[broken]</p>", &registry);
        let order = resolve(&mut tokens, &registry, config.error_behavior, true).unwrap();
        let rewritten = rewrite("<p>[broken]</p>", &tokens, &config).unwrap();
        let mut doc = HtmlParser::new().parse_fragment(&rewritten).unwrap();
        let substitution = Substitution {
            config: &config,
            registry: &registry,
            tokens: &tokens,
        };
        for index in order {
            substitution.process(&mut doc, index).unwrap();
        }
        assert_eq!(doc.to_html(), "<p><b</p>");
    }
}
