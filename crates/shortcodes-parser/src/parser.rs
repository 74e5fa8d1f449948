//! Shortcode parser: the entry point tying the pipeline together.
//!
//! ```text
//! content
//!   -> editor wrapper stripping
//!   -> scan -> resolve nesting -> rewrite tokens as placeholders
//!   -> parse tree -> attribute values -> substitute placeholders in order
//!   -> serialize -> leftover placeholder cleanup
//! ```

use std::ops::Range;

use regex::{Captures, Regex};
use shortcodes_html::{Document, HtmlParser};

use crate::attribute_values::substitute_attributes;
use crate::config::{ErrorBehavior, ParserConfig};
use crate::editor::is_template_fragment;
use crate::error::ShortcodeError;
use crate::handler::{HandlerContext, HandlerOutput, ShortcodeCall, ShortcodeHandler, ShortcodeSite};
use crate::nesting::resolve;
use crate::registry::{Registry, ShortcodeOptions};
use crate::rewriter::rewrite;
use crate::scanner::{Token, scan, scan_plain};
use crate::substitute::Substitution;

/// Scanned tokens and the order in which they would be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Tokens in source order. Offsets refer to the analyzed text.
    pub tokens: Vec<Token>,
    /// Indices into `tokens`, nested shortcodes first.
    pub order: Vec<usize>,
}

/// Shortcode parser with its registration table and configuration.
///
/// Registration takes `&mut self` and parsing takes `&self`, so a parser
/// shared behind an `Arc` is read-only.
///
/// # Example
///
/// ```
/// use shortcodes_parser::{
///     ExpectedResult, HandlerOutput, ParserConfig, ShortcodeOptions, ShortcodeParser,
/// };
///
/// let mut parser = ShortcodeParser::new(ParserConfig::default());
/// parser.register_fn(
///     "note",
///     |call, _| HandlerOutput::html(format!("<aside>{}</aside>", call.content)),
///     Some(
///         ShortcodeOptions::new()
///             .paired()
///             .with_expected_result(ExpectedResult::Block),
///     ),
/// );
///
/// let html = parser.parse("<p>[note]</p>Hi<p>[/note]</p>").unwrap();
/// assert_eq!(html, "<aside>Hi</aside>");
/// ```
#[derive(Debug, Default)]
pub struct ShortcodeParser {
    config: ParserConfig,
    registry: Registry,
}

impl ShortcodeParser {
    /// Create a parser with no registered shortcodes.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Register a handler under `name`, replacing any previous registration.
    ///
    /// Names that cannot appear in shortcode syntax are ignored.
    pub fn register<H>(
        &mut self,
        name: &str,
        handler: H,
        options: Option<ShortcodeOptions>,
    ) -> &mut Self
    where
        H: ShortcodeHandler + 'static,
    {
        self.registry.insert(name, Box::new(handler), options);
        self
    }

    /// Register a closure, inferring its argument types.
    pub fn register_fn<F>(
        &mut self,
        name: &str,
        handler: F,
        options: Option<ShortcodeOptions>,
    ) -> &mut Self
    where
        F: Fn(&ShortcodeCall<'_>, &HandlerContext<'_>) -> HandlerOutput + Send + Sync + 'static,
    {
        self.register(name, handler, options)
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_shortcode<H>(
        mut self,
        name: &str,
        handler: H,
        options: Option<ShortcodeOptions>,
    ) -> Self
    where
        H: ShortcodeHandler + 'static,
    {
        self.register(name, handler, options);
        self
    }

    /// Remove a registration. Returns `true` if it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.registry.remove(name)
    }

    /// Check whether `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Options given at registration, `None` if absent or not registered.
    #[must_use]
    pub fn options(&self, name: &str) -> Option<&ShortcodeOptions> {
        self.registry.options(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Scan `content` and resolve nesting without substituting anything.
    ///
    /// Content is analyzed as given: editor wrappers are not stripped, so
    /// token offsets match the input.
    ///
    /// # Errors
    ///
    /// Returns a structural error in `fail` mode.
    pub fn analyze(&self, content: &str) -> Result<Analysis, ShortcodeError> {
        let mut tokens = scan(content, &self.registry);
        let order = resolve(&mut tokens, &self.registry, self.config.error_behavior, true)?;
        Ok(Analysis { tokens, order })
    }

    /// Substitute every shortcode in `content`.
    ///
    /// Content without shortcode syntax is returned unchanged.
    ///
    /// # Errors
    ///
    /// In `fail` mode, returns the first error met. In every other mode the
    /// error policy produces replacement text and this never fails.
    pub fn parse(&self, content: &str) -> Result<String, ShortcodeError> {
        if is_template_fragment(content) {
            tracing::debug!("Skipping template fragment");
            return Ok(content.to_owned());
        }
        if self.registry.is_empty() || content.trim().is_empty() {
            return Ok(content.to_owned());
        }

        let stripped = self.registry.strip_editor_wrappers(content);
        let mut tokens = scan(&stripped, &self.registry);
        if tokens.is_empty() && scan_plain(&stripped, &self.registry).is_empty() {
            return Ok(content.to_owned());
        }
        tracing::debug!(tokens = tokens.len(), "Scanned shortcodes");

        let behavior = self.config.error_behavior;
        let order = resolve(&mut tokens, &self.registry, behavior, true)?;
        let rewritten = rewrite(&stripped, &tokens, &self.config)?;

        let mut doc = match HtmlParser::new().parse_fragment(&rewritten) {
            Ok(doc) => doc,
            Err(e) if behavior == ErrorBehavior::Fail => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Content is not a valid tree, leaving it unchanged");
                return Ok(content.to_owned());
            }
        };

        let substitution = Substitution {
            config: &self.config,
            registry: &self.registry,
            tokens: &tokens,
        };
        self.substitute(&mut doc, &substitution, &order)?;

        let html = doc.to_html();
        self.replace_leftovers(&html, &substitution)
    }

    fn substitute(
        &self,
        doc: &mut Document,
        substitution: &Substitution<'_>,
        order: &[usize],
    ) -> Result<(), ShortcodeError> {
        substitute_attributes(doc, substitution)?;
        for &index in order {
            substitution.process(doc, index)?;
        }
        tracing::debug!(count = order.len(), marker = %self.config.marker_class, "Substituted shortcodes");
        Ok(())
    }

    /// Replace placeholders that never became tree elements, such as those
    /// inside `script` bodies or comments. A paired placeholder passes the
    /// text up to its closing tag as content.
    fn replace_leftovers(
        &self,
        html: &str,
        substitution: &Substitution<'_>,
    ) -> Result<String, ShortcodeError> {
        if !html.contains(self.config.marker_class.as_str()) {
            return Ok(html.to_owned());
        }

        let pattern = format!(
            r#"<(span|div) class="{}" data-tagid="(\d+)">"#,
            regex::escape(&self.config.marker_class)
        );
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build leftover marker pattern");
                return Ok(html.to_owned());
            }
        };

        let mut html = html.to_owned();
        // The last placeholder never encloses another one, so nested pairs
        // resolve innermost first.
        for _ in 0..substitution.tokens.len() {
            let Some(leftover) = re
                .captures_iter(&html)
                .filter_map(|caps| Leftover::from_captures(&caps, &html, substitution.tokens))
                .last()
            else {
                break;
            };
            let token = leftover.token;
            tracing::debug!(name = %token.name, index = token.index, "Replacing leftover marker");
            let replacement =
                substitution.invoke(token, &html[leftover.content], ShortcodeSite::Content)?;
            html.replace_range(leftover.range, &replacement);
        }
        Ok(html)
    }
}

/// A placeholder found in serialized output.
struct Leftover<'a> {
    /// Opening tag through the matching closing tag, if any.
    range: Range<usize>,
    content: Range<usize>,
    token: &'a Token,
}

impl<'a> Leftover<'a> {
    fn from_captures(caps: &Captures<'_>, html: &str, tokens: &'a [Token]) -> Option<Self> {
        let open = caps.get(0)?;
        let element = caps.get(1)?.as_str();
        let index: usize = caps.get(2)?.as_str().parse().ok()?;
        let token = tokens.get(index)?;
        token.marker.element()?;

        let close = format!("</{element}>");
        let (content_end, end) = match html[open.end()..].find(&close) {
            Some(pos) => (open.end() + pos, open.end() + pos + close.len()),
            None => (open.end(), open.end()),
        };
        Some(Self {
            range: open.start()..end,
            content: open.end()..content_end,
            token,
        })
    }
}
