//! Tag scanner: lexes shortcode tokens out of raw text.
//!
//! Grammar (names are ASCII word characters, case-sensitive):
//!
//! ```text
//! [name attr="value" ...]    open (a trailing `/` is allowed)
//! [/name]                    close
//! [[name ...]]  [[/name]]    escaped, unwraps to `[name ...]` / `[/name]`
//! ```
//!
//! HTML tags and comments are skipped when scanning element content, so
//! shortcodes inside attribute values are left for the attribute path.
//! `script` and `style` bodies are scanned as plain text.

use std::fmt;

use shortcodes_html::is_raw_text_element;

use crate::attributes::Attributes;
use crate::registry::{ExpectedResult, Registry, is_name_byte};

/// Open or close tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `[name ...]`
    Open,
    /// `[/name]`
    Close,
}

/// Which side of a token carried a doubled bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Escape {
    /// Leading `[[`.
    pub open: bool,
    /// Trailing `]]`.
    pub close: bool,
}

impl Escape {
    #[must_use]
    pub const fn any(self) -> bool {
        self.open || self.close
    }
}

/// How a token is rewritten before the tree is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    /// `span` placeholder.
    Inline,
    /// `div` placeholder.
    Block,
    /// Replaced by fixed text: an unwrapped escape or an error-policy result.
    Literal(String),
    /// Unregistered name; replaced according to the error policy.
    Unresolved,
    /// Unregistered open/close pair; left untouched.
    Passthrough,
}

impl MarkerKind {
    /// Placeholder element name, `None` for non-placeholder kinds.
    #[must_use]
    pub const fn element(&self) -> Option<&'static str> {
        match self {
            Self::Inline => Some("span"),
            Self::Block => Some("div"),
            Self::Literal(_) | Self::Unresolved | Self::Passthrough => None,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Block => f.write_str("block"),
            Self::Literal(text) => write!(f, "literal({text:?})"),
            Self::Unresolved => f.write_str("unresolved"),
            Self::Passthrough => f.write_str("passthrough"),
        }
    }
}

/// A shortcode tag found in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Position in the token sequence; the placeholder's `data-tagid`.
    pub index: usize,
    /// Exact source text, brackets included.
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub kind: TokenKind,
    pub name: String,
    pub attrs: Attributes,
    pub escape: Escape,
    /// The name was registered with options.
    pub registered: bool,
    /// The tag is expected to have a counterpart.
    pub has_start_and_end: bool,
    pub marker: MarkerKind,
    /// Index of the matching open or close token.
    pub counterpart: Option<usize>,
}

impl Token {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.kind == TokenKind::Open
    }

    #[must_use]
    pub fn is_close(&self) -> bool {
        self.kind == TokenKind::Close
    }

    #[must_use]
    pub fn is_escaped(&self) -> bool {
        self.escape.any()
    }
}

/// Scan element content. HTML tags and comments are skipped.
pub(crate) fn scan(text: &str, registry: &Registry) -> Vec<Token> {
    Scanner::new(text, true).run(registry)
}

/// Scan text with no markup in it, such as an attribute value.
pub(crate) fn scan_plain(text: &str, registry: &Registry) -> Vec<Token> {
    Scanner::new(text, false).run(registry)
}

struct RawTag {
    start: usize,
    end: usize,
    kind: TokenKind,
    name: (usize, usize),
    attrs: (usize, usize),
    escape: Escape,
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    skip_markup: bool,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, skip_markup: bool) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            skip_markup,
        }
    }

    fn run(&self, registry: &Registry) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut i = 0;
        // End of the raw-text body being scanned, if any.
        let mut raw_end = 0;

        while i < self.bytes.len() {
            match self.bytes[i] {
                b'<' if self.skip_markup && i >= raw_end && self.starts_markup(i + 1) => {
                    let end = self.markup_end(i);
                    if let Some(name) = self.raw_text_opening(i, end) {
                        raw_end = self.raw_text_end(end, name);
                    }
                    i = end;
                }
                b'[' => match self.tag_at(i) {
                    Some(raw) => {
                        i = raw.end;
                        let token = self.classify(raw, tokens.len(), registry);
                        tokens.push(token);
                    }
                    None => i += 1,
                },
                _ => i += 1,
            }
        }

        apply_lookahead(&mut tokens);
        tracing::debug!(tokens = tokens.len(), "Scanned shortcode tokens");
        tokens
    }

    fn starts_markup(&self, at: usize) -> bool {
        self.bytes
            .get(at)
            .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
    }

    /// Index just past the HTML tag or comment starting at `start`.
    fn markup_end(&self, start: usize) -> usize {
        let rest = &self.text[start..];
        if rest.starts_with("<!--") {
            return rest
                .find("-->")
                .map_or(self.bytes.len(), |pos| start + pos + 3);
        }

        let mut quote = None;
        for (offset, &b) in self.bytes[start..].iter().enumerate() {
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'>') => return start + offset + 1,
                _ => {}
            }
        }
        self.bytes.len()
    }

    /// Name of a `script` or `style` opening tag spanning `start..end`.
    fn raw_text_opening(&self, start: usize, end: usize) -> Option<&'a str> {
        let tag = &self.text[start + 1..end];
        let len = tag
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(tag.len());
        let name = &tag[..len];
        (is_raw_text_element(name) && !tag.ends_with("/>")).then_some(name)
    }

    /// Index of the `</name` ending a raw-text body, or the text length.
    fn raw_text_end(&self, from: usize, name: &str) -> usize {
        let needle = format!("</{}", name.to_ascii_lowercase());
        self.text[from..]
            .to_ascii_lowercase()
            .find(&needle)
            .map_or(self.bytes.len(), |pos| from + pos)
    }

    fn tag_at(&self, start: usize) -> Option<RawTag> {
        let open_escape = self.bytes.get(start + 1) == Some(&b'[');
        let core_start = start + usize::from(open_escape);
        let (kind, name, attrs, core_end) = self.core_at(core_start)?;
        let close_escape = self.bytes.get(core_end) == Some(&b']');

        Some(RawTag {
            start,
            end: core_end + usize::from(close_escape),
            kind,
            name,
            attrs,
            escape: Escape {
                open: open_escape,
                close: close_escape,
            },
        })
    }

    /// Match `[name ...]` or `[/name]` at `at`, returning the kind, name
    /// range, attribute range and the index past the closing bracket.
    fn core_at(&self, at: usize) -> Option<(TokenKind, (usize, usize), (usize, usize), usize)> {
        let mut p = at + 1;
        let kind = if self.bytes.get(p) == Some(&b'/') {
            p += 1;
            TokenKind::Close
        } else {
            TokenKind::Open
        };

        let name_start = p;
        while p < self.bytes.len() && is_name_byte(self.bytes[p]) {
            p += 1;
        }
        if p == name_start {
            return None;
        }
        let name = (name_start, p);

        match (kind, self.bytes.get(p)) {
            (_, Some(b']')) => Some((kind, name, (p, p), p + 1)),
            (TokenKind::Open, Some(&b)) if b.is_ascii_whitespace() || b == b',' || b == b'/' => {
                let close = self.find_tag_close(p)?;
                Some((kind, name, (p, close), close + 1))
            }
            _ => None,
        }
    }

    /// Find the `]` ending an open tag. Brackets inside quoted values are
    /// skipped; an unterminated quote falls back to the first `]`. A `[`
    /// before the end means this is not a tag.
    fn find_tag_close(&self, from: usize) -> Option<usize> {
        let mut quote = None;
        for (j, &b) in self.bytes.iter().enumerate().skip(from) {
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b']') => return Some(j),
                (None, b'[') => return None,
                (None, _) => {}
            }
        }

        for (j, &b) in self.bytes.iter().enumerate().skip(from) {
            match b {
                b']' => return Some(j),
                b'[' => return None,
                _ => {}
            }
        }
        None
    }

    fn classify(&self, raw: RawTag, index: usize, registry: &Registry) -> Token {
        let text = &self.text[raw.start..raw.end];
        let name = &self.text[raw.name.0..raw.name.1];
        let body = self.text[raw.attrs.0..raw.attrs.1].trim();
        let body = body.strip_suffix('/').unwrap_or(body);
        let attrs = Attributes::parse(body);

        let options = registry.options(name);
        let marker = if raw.escape.any() {
            let from = usize::from(raw.escape.open);
            let to = text.len() - usize::from(raw.escape.close);
            MarkerKind::Literal(text[from..to].to_owned())
        } else if let Some(options) = options {
            if options.expected_result == ExpectedResult::Block {
                MarkerKind::Block
            } else {
                MarkerKind::Inline
            }
        } else if registry.contains(name) || is_numeric(name) {
            MarkerKind::Inline
        } else {
            MarkerKind::Unresolved
        };

        Token {
            index,
            text: text.to_owned(),
            start: raw.start,
            end: raw.end,
            kind: raw.kind,
            name: name.to_owned(),
            attrs,
            escape: raw.escape,
            registered: options.is_some(),
            has_start_and_end: options.is_some_and(|o| o.has_start_and_end),
            marker,
            counterpart: None,
        }
    }
}

fn is_numeric(name: &str) -> bool {
    name.bytes().all(|b| b.is_ascii_digit())
}

/// Pair an open tag without options with an immediately following close of
/// the same name. Unregistered pairs are left untouched in the output.
fn apply_lookahead(tokens: &mut [Token]) {
    for i in 1..tokens.len() {
        let (head, tail) = tokens.split_at_mut(i);
        let (open, close) = (&mut head[i - 1], &mut tail[0]);
        if !open.is_open()
            || open.registered
            || open.is_escaped()
            || !close.is_close()
            || close.is_escaped()
            || close.name != open.name
        {
            continue;
        }
        open.has_start_and_end = true;
        if open.marker == MarkerKind::Unresolved {
            open.marker = MarkerKind::Passthrough;
            close.marker = MarkerKind::Passthrough;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerContext, HandlerOutput, ShortcodeCall};
    use crate::registry::ShortcodeOptions;
    use pretty_assertions::assert_eq;

    fn noop(_: &ShortcodeCall<'_>, _: &HandlerContext<'_>) -> HandlerOutput {
        HandlerOutput::html("")
    }

    fn registry() -> Registry {
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
        registry.insert(
            "icon",
            Box::new(noop),
            Some(ShortcodeOptions::new().with_expected_result(ExpectedResult::Inline)),
        );
        registry.insert(
            "mix",
            Box::new(noop),
            Some(
                ShortcodeOptions::new()
                    .paired()
                    .with_expected_result(ExpectedResult::Mixed),
            ),
        );
        registry.insert("legacy", Box::new(noop), None);
        registry
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_scan_offsets_and_kinds() {
        let text = "a [box]b[/box] c";
        let tokens = scan(text, &registry());
        assert_eq!(texts(&tokens), vec!["[box]", "[/box]"]);
        assert_eq!((tokens[0].start, tokens[0].end), (2, 7));
        assert_eq!(&text[tokens[1].start..tokens[1].end], "[/box]");
        assert_eq!(tokens[0].kind, TokenKind::Open);
        assert_eq!(tokens[1].kind, TokenKind::Close);
        assert_eq!(tokens[1].index, 1);
    }

    #[test]
    fn test_registered_metadata() {
        let tokens = scan("[box][/box][icon][legacy]", &registry());
        assert!(tokens[0].registered);
        assert!(tokens[0].has_start_and_end);
        assert_eq!(tokens[0].marker, MarkerKind::Block);
        assert_eq!(tokens[1].marker, MarkerKind::Block);
        assert_eq!(tokens[2].marker, MarkerKind::Inline);
        assert!(!tokens[2].has_start_and_end);
        assert!(!tokens[3].registered);
        assert_eq!(tokens[3].marker, MarkerKind::Inline);
    }

    #[test]
    fn test_attributes_parsed() {
        let tokens = scan(r#"[icon name="star" size=2 /]"#, &registry());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].attrs.get("name"), Some("star"));
        assert_eq!(tokens[0].attrs.get("size"), Some("2"));
    }

    #[test]
    fn test_bracket_inside_quoted_value() {
        let tokens = scan(r#"[icon title="a [b] c"]"#, &registry());
        assert_eq!(texts(&tokens), vec![r#"[icon title="a [b] c"]"#]);
        assert_eq!(tokens[0].attrs.get("title"), Some("a [b] c"));
    }

    #[test]
    fn test_malformed_attributes_keep_tag() {
        let tokens = scan("[icon autoplay]", &registry());
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].attrs.is_empty());
    }

    #[test]
    fn test_not_a_tag() {
        let tokens = scan("[] [ box] [box-x] [/box x] [a [icon]", &registry());
        assert_eq!(texts(&tokens), vec!["[icon]"]);
    }

    #[test]
    fn test_html_tags_skipped() {
        let tokens = scan(r#"<a title="[icon]">[icon]</a><!-- [box] -->"#, &registry());
        assert_eq!(texts(&tokens), vec!["[icon]"]);
        assert_eq!(tokens[0].start, 18);
    }

    #[test]
    fn test_script_body_scanned_as_text() {
        let tokens = scan("<script>if (a<b) [icon]</script><p>[icon]</p>", &registry());
        assert_eq!(texts(&tokens), vec!["[icon]", "[icon]"]);
        assert_eq!(tokens[0].start, 17);
    }

    #[test]
    fn test_style_body_ends_at_close_tag() {
        let tokens = scan(
            r#"<STYLE>p<b{content:"[icon]"}</STYLE><a title="[icon]">[box][/box]</a>"#,
            &registry(),
        );
        assert_eq!(texts(&tokens), vec!["[icon]", "[box]", "[/box]"]);
    }

    #[test]
    fn test_mixed_result_uses_inline_marker() {
        let tokens = scan("[mix]x[/mix]", &registry());
        assert_eq!(tokens[0].marker, MarkerKind::Inline);
        assert_eq!(tokens[1].marker, MarkerKind::Inline);
        assert!(tokens[0].has_start_and_end);
    }

    #[test]
    fn test_plain_scan_does_not_skip_markup() {
        let tokens = scan_plain(r#"<a title="[icon]">"#, &registry());
        assert_eq!(texts(&tokens), vec!["[icon]"]);
    }

    #[test]
    fn test_unregistered_tokens() {
        let tokens = scan("[unknown] [42]", &registry());
        assert_eq!(tokens[0].marker, MarkerKind::Unresolved);
        assert_eq!(tokens[1].marker, MarkerKind::Inline);
    }

    #[test]
    fn test_escaped_tokens_unwrap() {
        let tokens = scan("[[icon]] [[/box]] [[box]", &registry());
        assert_eq!(texts(&tokens), vec!["[[icon]]", "[[/box]]", "[[box]"]);
        assert_eq!(tokens[0].marker, MarkerKind::Literal("[icon]".to_owned()));
        assert_eq!(tokens[1].marker, MarkerKind::Literal("[/box]".to_owned()));
        assert_eq!(tokens[2].marker, MarkerKind::Literal("[box]".to_owned()));
        assert_eq!(
            tokens[2].escape,
            Escape {
                open: true,
                close: false
            }
        );
    }

    #[test]
    fn test_lookahead_pairs_legacy_tags() {
        let tokens = scan("[legacy]x[/legacy]", &registry());
        assert!(tokens[0].has_start_and_end);
        assert_eq!(tokens[0].marker, MarkerKind::Inline);
        assert_eq!(tokens[1].marker, MarkerKind::Inline);
    }

    #[test]
    fn test_lookahead_passes_through_unregistered_pairs() {
        let tokens = scan("[foo]x[/foo] [bar]", &registry());
        assert_eq!(tokens[0].marker, MarkerKind::Passthrough);
        assert_eq!(tokens[1].marker, MarkerKind::Passthrough);
        assert!(tokens[0].has_start_and_end);
        assert_eq!(tokens[2].marker, MarkerKind::Unresolved);
    }

    #[test]
    fn test_lookahead_needs_adjacent_close() {
        let tokens = scan("[foo][icon][/foo]", &registry());
        assert_eq!(tokens[0].marker, MarkerKind::Unresolved);
        assert!(!tokens[0].has_start_and_end);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "héllo [icon] wörld";
        let tokens = scan(text, &registry());
        assert_eq!(&text[tokens[0].start..tokens[0].end], "[icon]");
    }
}
