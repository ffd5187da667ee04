use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Character-styling toggles and parameters, applied to a whole block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatKind {
    Bold,
    Italic,
    Underline,
    Code,
    Color,
    Highlight,
}

impl FormatKind {
    /// Kinds that carry a parameter (a CSS color) rather than a presence flag
    pub fn is_parameterized(&self) -> bool {
        matches!(self, FormatKind::Color | FormatKind::Highlight)
    }
}

/// Value stored for a format kind: a presence toggle or a parameter string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatValue {
    Flag(bool),
    Param(String),
}

impl From<bool> for FormatValue {
    fn from(flag: bool) -> Self {
        FormatValue::Flag(flag)
    }
}

impl From<&str> for FormatValue {
    fn from(param: &str) -> Self {
        FormatValue::Param(param.to_string())
    }
}

impl From<String> for FormatValue {
    fn from(param: String) -> Self {
        FormatValue::Param(param)
    }
}

/// Per-block formatting state keyed by kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatState(BTreeMap<FormatKind, FormatValue>);

impl FormatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: FormatKind) -> Option<&FormatValue> {
        self.0.get(&kind)
    }

    pub fn set(&mut self, kind: FormatKind, value: impl Into<FormatValue>) {
        self.0.insert(kind, value.into());
    }

    pub fn with(mut self, kind: FormatKind, value: impl Into<FormatValue>) -> Self {
        self.set(kind, value);
        self
    }

    /// Whether `kind` should produce markup.
    ///
    /// Toggle kinds accept `true` or any non-empty string; color and highlight
    /// need a non-empty parameter string.
    pub fn is_active(&self, kind: FormatKind) -> bool {
        match (self.0.get(&kind), kind.is_parameterized()) {
            (Some(FormatValue::Flag(flag)), false) => *flag,
            (Some(FormatValue::Param(param)), _) => !param.is_empty(),
            _ => false,
        }
    }

    /// Parameter string of an active color/highlight format
    pub fn param(&self, kind: FormatKind) -> Option<&str> {
        match self.0.get(&kind) {
            Some(FormatValue::Param(param)) if !param.is_empty() => Some(param),
            _ => None,
        }
    }

    /// Flip the current truthiness and store it as a boolean (the key is kept)
    pub fn toggle(&mut self, kind: FormatKind) {
        let next = !self.is_active(kind);
        self.set(kind, next);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FormatKind, &FormatValue)> {
        self.0.iter()
    }
}

impl FromIterator<(FormatKind, FormatValue)> for FormatState {
    fn from_iter<T: IntoIterator<Item = (FormatKind, FormatValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
