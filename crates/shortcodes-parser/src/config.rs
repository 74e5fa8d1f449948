//! Engine configuration.
//!
//! [`ParserConfig`] is immutable once handed to a
//! [`ShortcodeParser`](crate::ShortcodeParser); build it with the `with_*`
//! methods or deserialize it with the `serde` feature.

use std::fmt;
use std::str::FromStr;

use crate::attributes::Attributes;
use crate::error::UnknownErrorBehavior;

/// Marker class used when none is configured.
pub const DEFAULT_MARKER_CLASS: &str = "--ss-shortcode-marker";

/// Block-level element names used when none are configured.
pub const DEFAULT_BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "blockquote",
    "canvas",
    "dd",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// What to emit for a shortcode the engine cannot process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorBehavior {
    /// Replace with nothing.
    Strip,
    /// Replace with `<strong class="warning">...</strong>`.
    Warn,
    /// Keep the original shortcode text.
    #[default]
    Leave,
    /// Abort the parse with an error.
    Fail,
}

impl ErrorBehavior {
    /// All modes, in declaration order.
    pub const ALL: [Self; 4] = [Self::Strip, Self::Warn, Self::Leave, Self::Fail];

    /// Lower-case mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strip => "strip",
            Self::Warn => "warn",
            Self::Leave => "leave",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for ErrorBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorBehavior {
    type Err = UnknownErrorBehavior;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownErrorBehavior(s.to_owned()))
    }
}

/// Where a shortcode's replacement must land relative to its block ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Replace in place.
    Inline,
    /// Move in front of the nearest block ancestor.
    BeforeBlock,
    /// Move behind the nearest block ancestor.
    AfterBlock,
    /// Split every ancestor up to the block ancestor and land between the halves.
    Split,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inline => "inline",
            Self::BeforeBlock => "before-block",
            Self::AfterBlock => "after-block",
            Self::Split => "split",
        })
    }
}

/// Attribute values that select a non-inline [`Placement`].
///
/// The value is read from the shortcode's `location` attribute, falling back
/// to `class`. Values are compared exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlacementRules {
    /// Values mapping to [`Placement::BeforeBlock`].
    pub before: Vec<String>,
    /// Values mapping to [`Placement::AfterBlock`].
    pub after: Vec<String>,
    /// Values mapping to [`Placement::Split`].
    pub split: Vec<String>,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            before: vec!["left".to_owned(), "right".to_owned()],
            after: Vec::new(),
            split: vec!["center".to_owned(), "leftAlone".to_owned()],
        }
    }
}

impl PlacementRules {
    /// Classify a shortcode by its attributes.
    #[must_use]
    pub fn classify(&self, attrs: &Attributes) -> Placement {
        let value = attrs
            .get("location")
            .filter(|v| !v.is_empty())
            .or_else(|| attrs.get("class").filter(|v| !v.is_empty()));
        let Some(value) = value else {
            return Placement::Inline;
        };
        let matches = |list: &[String]| list.iter().any(|v| v == value);

        if matches(&self.before) {
            Placement::BeforeBlock
        } else if matches(&self.split) {
            Placement::Split
        } else if matches(&self.after) {
            Placement::AfterBlock
        } else {
            Placement::Inline
        }
    }
}

/// Configuration for [`ShortcodeParser`](crate::ShortcodeParser).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    /// Policy applied at every recoverable error site.
    pub error_behavior: ErrorBehavior,
    /// Class attribute carried by placeholder elements.
    pub marker_class: String,
    /// Element names treated as block containers during repair.
    pub block_elements: Vec<String>,
    /// Attribute values that select a placement.
    pub placement: PlacementRules,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            error_behavior: ErrorBehavior::default(),
            marker_class: DEFAULT_MARKER_CLASS.to_owned(),
            block_elements: DEFAULT_BLOCK_ELEMENTS.iter().map(|&s| s.to_owned()).collect(),
            placement: PlacementRules::default(),
        }
    }
}

impl ParserConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error behavior.
    #[must_use]
    pub fn with_error_behavior(mut self, behavior: ErrorBehavior) -> Self {
        self.error_behavior = behavior;
        self
    }

    /// Set the placeholder class.
    #[must_use]
    pub fn with_marker_class(mut self, class: impl Into<String>) -> Self {
        self.marker_class = class.into();
        self
    }

    /// Replace the block element set.
    #[must_use]
    pub fn with_block_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block_elements = elements.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the placement rules.
    #[must_use]
    pub fn with_placement(mut self, placement: PlacementRules) -> Self {
        self.placement = placement;
        self
    }

    /// Check whether `name` is a block container.
    #[must_use]
    pub fn is_block_element(&self, name: &str) -> bool {
        self.block_elements
            .iter()
            .any(|b| b.eq_ignore_ascii_case(name))
    }
}
