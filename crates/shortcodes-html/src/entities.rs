//! Text normalization ahead of tree parsing.
//!
//! The reader rejects `&` that does not start a reference, which is common in
//! hand-written HTML (`Fish & Chips`), and reads any `<` as the start of a
//! tag (`1 < 2`). Such characters in text are rewritten to `&amp;` and `&lt;`
//! before parsing. Tag bodies and raw-text element contents are left alone.

use crate::elements::is_raw_text_element;

/// Escape `&` that does not start a character reference and `<` that does
/// not start markup.
pub fn escape_bare_text_markup(html: &str) -> String {
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len() + 16);
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' if starts_markup(bytes, i + 1) => {
                let end = tag_end(bytes, i);
                let raw_name = opening_tag_name(&html[i..end]);
                i = end;
                if let Some(name) = raw_name.filter(|n| is_raw_text_element(n)) {
                    i = raw_text_end(html, i, name);
                }
            }
            b'<' => {
                out.push_str(&html[copied..i]);
                out.push_str("&lt;");
                i += 1;
                copied = i;
            }
            b'&' if !starts_reference(bytes, i + 1) => {
                out.push_str(&html[copied..i]);
                out.push_str("&amp;");
                i += 1;
                copied = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&html[copied..]);
    out
}

fn starts_markup(bytes: &[u8], at: usize) -> bool {
    bytes
        .get(at)
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Index just past the `>` closing the tag that starts at `start`.
fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote = None;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return start + offset + 1,
            _ => {}
        }
    }
    bytes.len()
}

fn opening_tag_name(tag: &str) -> Option<&str> {
    let body = tag.strip_prefix('<')?;
    let end = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    (end > 0).then(|| &body[..end])
}

/// Index of the `</name` that ends a raw-text element, or the input length.
fn raw_text_end(html: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{}", name.to_ascii_lowercase());
    html[from..]
        .to_ascii_lowercase()
        .find(&needle)
        .map_or(html.len(), |pos| from + pos)
}

/// Check for `name;`, `#123;` or `#x1F;` after an ampersand.
fn starts_reference(bytes: &[u8], at: usize) -> bool {
    let rest = &bytes[at.min(bytes.len())..];
    let (digits, hex): (&[u8], bool) = match rest {
        [b'#', b'x' | b'X', tail @ ..] => (tail, true),
        [b'#', tail @ ..] => (tail, false),
        _ => {
            let len = rest
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric())
                .count();
            return len > 0 && rest.get(len) == Some(&b';');
        }
    };
    let len = digits
        .iter()
        .take_while(|b| {
            if hex {
                b.is_ascii_hexdigit()
            } else {
                b.is_ascii_digit()
            }
        })
        .count();
    len > 0 && digits.get(len) == Some(&b';')
}
