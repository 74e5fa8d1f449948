//! Nesting resolver: pairs open and close tokens and orders substitution.
//!
//! The processing order lists open tokens so that every shortcode nested
//! inside another comes before it; siblings keep source order. Structural
//! errors turn the offending token into a literal chosen by the error policy.

use crate::config::ErrorBehavior;
use crate::error::ShortcodeError;
use crate::policy;
use crate::registry::Registry;
use crate::scanner::{MarkerKind, Token, TokenKind};

/// Pair tokens and return the processing order as token indices.
///
/// Only placeholder tokens take part; literals, unresolved and pass-through
/// tokens are skipped. Matched pairs get their `counterpart` set.
///
/// # Errors
///
/// Returns the structural error in `fail` mode.
pub(crate) fn resolve(
    tokens: &mut [Token],
    registry: &Registry,
    behavior: ErrorBehavior,
    allow_html: bool,
) -> Result<Vec<usize>, ShortcodeError> {
    let mut order = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for i in 0..tokens.len() {
        if tokens[i].marker.element().is_none() {
            continue;
        }

        match tokens[i].kind {
            TokenKind::Open if tokens[i].has_start_and_end => stack.push(i),
            TokenKind::Open => order.push(i),
            TokenKind::Close => {
                let Some(&top) = stack.last() else {
                    if registry.contains(&tokens[i].name) {
                        let error = ShortcodeError::UnexpectedClose {
                            name: tokens[i].name.clone(),
                        };
                        replace_with_policy(&mut tokens[i], error, behavior, allow_html)?;
                    } else {
                        // Bracket text that merely looks like a close tag
                        tokens[i].marker = MarkerKind::Passthrough;
                    }
                    continue;
                };

                if tokens[top].name == tokens[i].name {
                    stack.pop();
                    tokens[top].counterpart = Some(i);
                    tokens[i].counterpart = Some(top);
                    order.push(top);
                } else {
                    let error = ShortcodeError::MismatchedClose {
                        expected: tokens[top].name.clone(),
                        found: tokens[i].name.clone(),
                    };
                    replace_with_policy(&mut tokens[i], error, behavior, allow_html)?;
                }
            }
        }
    }

    for open in stack {
        let error = ShortcodeError::UnclosedTag {
            name: tokens[open].name.clone(),
        };
        replace_with_policy(&mut tokens[open], error, behavior, allow_html)?;
    }

    tracing::debug!(order = ?order, "Resolved shortcode nesting");
    Ok(order)
}

fn replace_with_policy(
    token: &mut Token,
    error: ShortcodeError,
    behavior: ErrorBehavior,
    allow_html: bool,
) -> Result<(), ShortcodeError> {
    let replacement = policy::structural(behavior, error, &token.text, allow_html)?;
    token.marker = MarkerKind::Literal(replacement);
    Ok(())
}
