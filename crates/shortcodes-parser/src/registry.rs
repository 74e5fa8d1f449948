//! Registration table of shortcode handlers and their metadata.

use std::collections::BTreeMap;
use std::fmt;

use crate::editor::WrapperRule;
use crate::handler::{HandlerContext, HandlerOutput, ShortcodeCall, ShortcodeHandler};

/// What kind of markup a handler produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExpectedResult {
    /// Plain text.
    #[default]
    Text,
    /// Inline elements.
    Inline,
    /// Block elements. The placeholder is a `div`.
    Block,
    /// Either inline or block elements.
    Mixed,
}

impl ExpectedResult {
    /// Whether editor paragraph wrappers around the tags are removed.
    #[must_use]
    pub const fn strips_wrappers(self) -> bool {
        matches!(self, Self::Block | Self::Mixed)
    }
}

/// Metadata supplied when registering a shortcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShortcodeOptions {
    /// The shortcode has a matching `[/name]` close tag.
    pub has_start_and_end: bool,
    /// Kind of markup the handler returns.
    pub expected_result: ExpectedResult,
}

impl ShortcodeOptions {
    /// Options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the shortcode as paired with a close tag.
    #[must_use]
    pub fn paired(mut self) -> Self {
        self.has_start_and_end = true;
        self
    }

    /// Set the expected result.
    #[must_use]
    pub fn with_expected_result(mut self, expected: ExpectedResult) -> Self {
        self.expected_result = expected;
        self
    }
}

/// Check whether `name` can appear in shortcode syntax.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

pub(crate) const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub(crate) struct Registration {
    handler: Box<dyn ShortcodeHandler>,
    pub(crate) options: Option<ShortcodeOptions>,
    wrappers: Option<WrapperRule>,
}

/// Handlers keyed by shortcode name.
#[derive(Default)]
pub(crate) struct Registry {
    entries: BTreeMap<String, Registration>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, r)| (name, &r.options)))
            .finish()
    }
}

impl Registry {
    /// Register or replace a handler. Returns `false` for unusable names.
    pub fn insert(
        &mut self,
        name: &str,
        handler: Box<dyn ShortcodeHandler>,
        options: Option<ShortcodeOptions>,
    ) -> bool {
        if !is_valid_name(name) {
            tracing::debug!(name = %name, "Ignoring shortcode with invalid name");
            return false;
        }
        let wrappers = options
            .filter(|o| o.expected_result.strips_wrappers())
            .and_then(|o| WrapperRule::new(name, o.has_start_and_end));
        let replaced = self
            .entries
            .insert(
                name.to_owned(),
                Registration {
                    handler,
                    options,
                    wrappers,
                },
            )
            .is_some();
        tracing::debug!(name = %name, replaced, "Registered shortcode");
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Metadata of a registered shortcode, `None` if absent or registered
    /// without options.
    pub fn options(&self, name: &str) -> Option<&ShortcodeOptions> {
        self.entries.get(name).and_then(|r| r.options.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Invoke the handler for `call.name`; unregistered names are `Unknown`.
    pub fn render(&self, call: &ShortcodeCall<'_>, ctx: &HandlerContext<'_>) -> HandlerOutput {
        match self.entries.get(call.name) {
            Some(registration) => registration.handler.render(call, ctx),
            None => HandlerOutput::Unknown,
        }
    }

    /// Remove editor `<p>` wrappers around block and mixed shortcodes.
    pub fn strip_editor_wrappers(&self, content: &str) -> String {
        let mut content = content.to_owned();
        for rule in self.entries.values().filter_map(|r| r.wrappers.as_ref()) {
            content = rule.apply(&content);
        }
        content
    }
}
