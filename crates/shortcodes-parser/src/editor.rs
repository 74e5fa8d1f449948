//! Rich-text editor quirks handled before scanning.
//!
//! The editor wraps every top-level construct in `<p>`, including a block
//! shortcode tag standing on its own line. Those wrappers are removed so the
//! block replacement does not end up inside a paragraph.

use regex::Regex;

/// Paragraph-wrapper patterns for one block or mixed shortcode.
#[derive(Debug)]
pub(crate) struct WrapperRule {
    open: Regex,
    close: Option<Regex>,
}

impl WrapperRule {
    /// Build the patterns for `name`. The close pattern exists only for
    /// paired shortcodes.
    pub fn new(name: &str, paired: bool) -> Option<Self> {
        let name = regex::escape(name);
        let open = Regex::new(&format!(r"<p>(\[{name}(?:[\s,/][^\]]*)?\])</p>"));
        let close = paired
            .then(|| Regex::new(&format!(r"<p>(\[/{name}\])</p>")))
            .transpose();

        match (open, close) {
            (Ok(open), Ok(close)) => Some(Self { open, close }),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(name = %name, error = %e, "Could not build wrapper pattern");
                None
            }
        }
    }

    /// Remove `<p>` wrappers enclosing only the shortcode tag.
    pub fn apply(&self, content: &str) -> String {
        let content = self.open.replace_all(content, "$1");
        match &self.close {
            Some(close) => close.replace_all(&content, "$1").into_owned(),
            None => content.into_owned(),
        }
    }
}

/// Check for table-row fragments inside the first `<script>` block with no
/// enclosing `<table>`.
///
/// Templates injected as script bodies hold orphaned `<tr>`/`<td>` markup that
/// a tree round-trip would destroy; such content is left untouched.
pub(crate) fn is_template_fragment(content: &str) -> bool {
    let Some(start) = content.find("<script") else {
        return false;
    };
    let rest = &content[start..];
    let Some(end) = rest.find("</script>") else {
        return false;
    };
    let script = &rest[..end + "</script>".len()];
    !script.contains("<table") && (script.contains("<tr") || script.contains("<td"))
}
