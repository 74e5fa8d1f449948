//! Marker rewriter: replaces token spans with placeholder elements.
//!
//! Placeholders carry the token index in `data-tagid` so they can be found
//! again once the text is parsed into a tree:
//!
//! ```text
//! [img src=a.png]      ->  <span class="MARKER" data-tagid="0"></span>
//! [box]x[/box]         ->  <div class="MARKER" data-tagid="1">x</div>
//! ```

use crate::config::ParserConfig;
use crate::error::ShortcodeError;
use crate::policy;
use crate::scanner::{MarkerKind, Token, TokenKind};
use crate::splice::TextSplicer;

/// Rewrite `text` with every token replaced according to its marker kind.
///
/// # Errors
///
/// Returns [`ShortcodeError::UnresolvedTag`] for an unregistered tag in
/// `fail` mode.
pub(crate) fn rewrite(
    text: &str,
    tokens: &[Token],
    config: &ParserConfig,
) -> Result<String, ShortcodeError> {
    let mut splicer = TextSplicer::new();

    for token in tokens.iter().rev() {
        let replacement = match &token.marker {
            MarkerKind::Passthrough => continue,
            MarkerKind::Literal(text) => text.clone(),
            MarkerKind::Unresolved => policy::unresolved(
                config.error_behavior,
                ShortcodeError::UnresolvedTag {
                    name: token.name.clone(),
                },
                &token.text,
                &token.text,
                true,
            )?,
            MarkerKind::Inline | MarkerKind::Block => placeholder(token, &config.marker_class),
        };
        splicer.replace(token.start..token.end, replacement);
    }

    Ok(splicer.apply(text))
}

/// Placeholder markup for a placeholder token.
fn placeholder(token: &Token, marker_class: &str) -> String {
    let Some(element) = token.marker.element() else {
        return token.text.clone();
    };
    match (token.kind, token.counterpart) {
        (TokenKind::Close, Some(_)) => format!("</{element}>"),
        (TokenKind::Close, None) => token.text.clone(),
        (TokenKind::Open, Some(_)) => {
            format!(r#"<{element} class="{marker_class}" data-tagid="{}">"#, token.index)
        }
        (TokenKind::Open, None) => format!(
            r#"<{element} class="{marker_class}" data-tagid="{}"></{element}>"#,
            token.index
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorBehavior;
    use crate::handler::{HandlerContext, HandlerOutput, ShortcodeCall};
    use crate::nesting::resolve;
    use crate::registry::{ExpectedResult, Registry, ShortcodeOptions};
    use crate::scanner::scan;
    use pretty_assertions::assert_eq;

    fn noop(_: &ShortcodeCall<'_>, _: &HandlerContext<'_>) -> HandlerOutput {
        HandlerOutput::html("")
    }

    fn rewrite_with(text: &str, behavior: ErrorBehavior) -> Result<String, ShortcodeError> {
        let mut registry = Registry::default();
        registry.insert(
            "box",
            Box::new(noop),
            Some(
                ShortcodeOptions::new()
                    .paired()
                    .with_expected_result(ExpectedResult::Block),
            ),
        );
        registry.insert("img", Box::new(noop), None);

        let config = ParserConfig::new()
            .with_error_behavior(behavior)
            .with_marker_class("m");
        let mut tokens = scan(text, &registry);
        resolve(&mut tokens, &registry, behavior, true)?;
        rewrite(text, &tokens, &config)
    }

    #[test]
    fn test_single_placeholder() {
        assert_eq!(
            rewrite_with("a [img src=x] b", ErrorBehavior::Leave).unwrap(),
            r#"a <span class="m" data-tagid="0"></span> b"#
        );
    }

    #[test]
    fn test_paired_placeholders() {
        assert_eq!(
            rewrite_with("[box]in [img] side[/box]", ErrorBehavior::Leave).unwrap(),
            r#"<div class="m" data-tagid="0">in <span class="m" data-tagid="1"></span> side</div>"#
        );
    }

    #[test]
    fn test_escaped_unwrapped() {
        assert_eq!(
            rewrite_with("[[img]] and [[box]]x[[/box]]", ErrorBehavior::Fail).unwrap(),
            "[img] and [box]x[/box]"
        );
    }

    #[test]
    fn test_passthrough_untouched() {
        assert_eq!(
            rewrite_with("[quote]x[/quote]", ErrorBehavior::Fail).unwrap(),
            "[quote]x[/quote]"
        );
    }

    #[test]
    fn test_unresolved_modes() {
        let text = "a [nope] b";
        assert_eq!(rewrite_with(text, ErrorBehavior::Strip).unwrap(), "a  b");
        assert_eq!(
            rewrite_with(text, ErrorBehavior::Warn).unwrap(),
            r#"a <strong class="warning">[nope]</strong> b"#
        );
        assert_eq!(rewrite_with(text, ErrorBehavior::Leave).unwrap(), text);
        assert!(matches!(
            rewrite_with(text, ErrorBehavior::Fail),
            Err(ShortcodeError::UnresolvedTag { .. })
        ));
    }

    #[test]
    fn test_structural_literal_applied() {
        assert_eq!(
            rewrite_with("x[/box]y", ErrorBehavior::Strip).unwrap(),
            "xy"
        );
    }
}
