//! Shortcodes inside attribute values.
//!
//! Attribute values cannot hold markup, so there are no placeholders and no
//! repair: tokens are resolved and handler output is spliced straight into
//! the value. Paired shortcodes receive their rendered inner text as content.

use std::ops::Range;

use shortcodes_html::Document;

use crate::error::ShortcodeError;
use crate::handler::ShortcodeSite;
use crate::nesting::resolve;
use crate::policy;
use crate::scanner::{MarkerKind, TokenKind, scan_plain};
use crate::splice::TextSplicer;
use crate::substitute::Substitution;

/// Substitute shortcodes in every attribute value containing brackets.
pub(crate) fn substitute_attributes(
    doc: &mut Document,
    substitution: &Substitution<'_>,
) -> Result<(), ShortcodeError> {
    for node in doc.descendants(doc.root()) {
        let Some(element) = doc.element_name(node).map(str::to_owned) else {
            continue;
        };

        let candidates: Vec<(usize, String, String)> = doc
            .attributes(node)
            .iter()
            .enumerate()
            .filter(|(_, a)| a.value.contains('[') && a.value.contains(']'))
            .map(|(i, a)| (i, a.name.clone(), a.value.clone()))
            .collect();

        for (position, name, value) in candidates {
            let site = ShortcodeSite::Attribute {
                element: &element,
                attribute: &name,
            };
            let replaced = substitute_value(&value, substitution, site)?;
            if replaced != value
                && let Some(attr) = doc.attributes_mut(node).and_then(|a| a.get_mut(position))
            {
                tracing::debug!(element = %element, attribute = %name, "Substituted shortcodes in attribute");
                attr.value = replaced;
            }
        }
    }
    Ok(())
}

/// Substitute shortcodes in a single attribute value.
pub(crate) fn substitute_value(
    value: &str,
    substitution: &Substitution<'_>,
    site: ShortcodeSite<'_>,
) -> Result<String, ShortcodeError> {
    let mut tokens = scan_plain(value, substitution.registry);
    if tokens.is_empty() {
        return Ok(value.to_owned());
    }
    let behavior = substitution.config.error_behavior;
    resolve(&mut tokens, substitution.registry, behavior, false)?;

    let local = Substitution {
        config: substitution.config,
        registry: substitution.registry,
        tokens: &tokens,
    };
    render_span(value, &local, 0..tokens.len(), 0..value.len(), site)
}

/// Render `bytes` of `text`, which contains exactly the tokens in `range`.
fn render_span(
    text: &str,
    substitution: &Substitution<'_>,
    range: Range<usize>,
    bytes: Range<usize>,
    site: ShortcodeSite<'_>,
) -> Result<String, ShortcodeError> {
    let tokens = substitution.tokens;
    let behavior = substitution.config.error_behavior;
    let mut splicer = TextSplicer::new();
    let mut i = range.start;

    while i < range.end {
        let token = &tokens[i];
        let mut next = i + 1;
        let mut end = token.end;

        let replacement = match (&token.marker, token.kind, token.counterpart) {
            (MarkerKind::Literal(literal), _, _) => Some(literal.clone()),
            (MarkerKind::Unresolved, _, _) => Some(policy::unresolved(
                behavior,
                ShortcodeError::UnresolvedTag {
                    name: token.name.clone(),
                },
                &token.text,
                &token.text,
                false,
            )?),
            (MarkerKind::Inline | MarkerKind::Block, TokenKind::Open, Some(close)) => {
                let inner = render_span(
                    text,
                    substitution,
                    i + 1..close,
                    token.end..tokens[close].start,
                    site,
                )?;
                next = close + 1;
                end = tokens[close].end;
                Some(substitution.invoke(token, &inner, site)?)
            }
            (MarkerKind::Inline | MarkerKind::Block, TokenKind::Open, None) => {
                Some(substitution.invoke(token, "", site)?)
            }
            _ => None,
        };

        if let Some(replacement) = replacement {
            splicer.replace(token.start - bytes.start..end - bytes.start, replacement);
        }
        i = next;
    }

    Ok(splicer.apply(&text[bytes]))
}
