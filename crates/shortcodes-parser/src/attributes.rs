//! Shortcode attribute parsing.
//!
//! Parses the body of an open tag: `name="value"`, `name='value'` or
//! `name=value`, separated by whitespace or commas.

use std::sync::LazyLock;

use regex::Regex;

/// One attribute at the start of the remaining input, after separators.
static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\s,]*([^\s/'"=,\]]+)\s*=\s*(?:'([^']*)'|"([^"]*)"|([^\s,\]'"]+))"#)
        .expect("invalid attribute regex")
});

/// Ordered attribute map of a shortcode.
///
/// Keeps source order. A repeated name keeps its first position and takes the
/// last value.
///
/// # Example
///
/// ```
/// use shortcodes_parser::Attributes;
///
/// let attrs = Attributes::parse(r#"id=3 class="left", title='A "quoted" title'"#);
/// assert_eq!(attrs.get("id"), Some("3"));
/// assert_eq!(attrs.get("class"), Some("left"));
/// assert_eq!(attrs.get("title"), Some(r#"A "quoted" title"#));
/// assert_eq!(attrs.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an attribute string.
    ///
    /// Input that does not fully match the attribute grammar yields an empty
    /// map; a malformed attribute never fails the tag it belongs to.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut attrs = Self::new();
        let mut remaining = input;

        loop {
            if remaining.trim_start_matches(|c: char| c.is_whitespace() || c == ',').is_empty() {
                return attrs;
            }
            let Some(caps) = ATTRIBUTE_PATTERN.captures(remaining) else {
                tracing::debug!(input = %input, "Ignoring malformed shortcode attributes");
                return Self::new();
            };
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            attrs.insert(&caps[1], value);
            remaining = &remaining[caps[0].len()..];
        }
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty() {
        assert!(Attributes::parse("").is_empty());
        assert!(Attributes::parse("  , ").is_empty());
    }

    #[test]
    fn test_parse_quote_styles() {
        let attrs = Attributes::parse(r#"a="one two" b='three' c=four"#);
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(
            pairs,
            vec![("a", "one two"), ("b", "three"), ("c", "four")]
        );
    }

    #[test]
    fn test_parse_comma_separated() {
        let attrs = Attributes::parse("width=100,height=200");
        assert_eq!(attrs.get("width"), Some("100"));
        assert_eq!(attrs.get("height"), Some("200"));
    }

    #[test]
    fn test_parse_spaces_around_equals() {
        let attrs = Attributes::parse(r#"class = "center""#);
        assert_eq!(attrs.get("class"), Some("center"));
    }

    #[test]
    fn test_parse_empty_quoted_value() {
        let attrs = Attributes::parse(r#"alt="""#);
        assert_eq!(attrs.get("alt"), Some(""));
    }

    #[test]
    fn test_duplicate_name_takes_last_value() {
        let attrs = Attributes::parse("a=1 b=2 a=3");
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_malformed_yields_no_attributes() {
        assert!(Attributes::parse("autoplay").is_empty());
        assert!(Attributes::parse(r#"a=1 "stray""#).is_empty());
        assert!(Attributes::parse(r#"a="unterminated"#).is_empty());
    }

    #[test]
    fn test_from_iterator() {
        let attrs: Attributes = [("id", "1"), ("class", "left")].into_iter().collect();
        assert_eq!(attrs.get("class"), Some("left"));
        assert_eq!(attrs.len(), 2);
    }
}
