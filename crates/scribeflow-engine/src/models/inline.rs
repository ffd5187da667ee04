use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::BlockId;

/// Identifier of an inline element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineElementId(pub String);

impl InlineElementId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for InlineElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InlineElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InlineElementType {
    Link,
    Mention,
    Variable,
    Command,
}

/// Annotation anchored to a character range of a block.
///
/// Offsets are captured when the element is created and are not moved when the
/// owning block's content is edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineElement {
    pub id: InlineElementId,
    #[serde(rename = "type")]
    pub element_type: InlineElementType,
    pub block_id: BlockId,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Opaque payload, e.g. `url` and `text` for links
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl InlineElement {
    pub fn url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }
}

/// Inline element data without an id, as handed to `add_inline_element`
#[derive(Debug, Clone, PartialEq)]
pub struct NewInlineElement {
    pub element_type: InlineElementType,
    pub block_id: BlockId,
    pub start_offset: usize,
    pub end_offset: usize,
    pub data: BTreeMap<String, Value>,
}

impl NewInlineElement {
    pub fn link(block_id: BlockId, range: std::ops::Range<usize>, url: &str, text: &str) -> Self {
        let data = BTreeMap::from([
            ("url".to_string(), Value::from(url)),
            ("text".to_string(), Value::from(text)),
        ]);
        Self {
            element_type: InlineElementType::Link,
            block_id,
            start_offset: range.start,
            end_offset: range.end,
            data,
        }
    }

    pub(crate) fn into_element(self, id: InlineElementId) -> InlineElement {
        InlineElement {
            id,
            element_type: self.element_type,
            block_id: self.block_id,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            data: self.data,
        }
    }
}

/// Partial inline element fields merged by `update_inline_element`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineElementUpdate {
    pub element_type: Option<InlineElementType>,
    pub block_id: Option<BlockId>,
    pub start_offset: Option<usize>,
    pub end_offset: Option<usize>,
    pub data: Option<BTreeMap<String, Value>>,
}

impl InlineElementUpdate {
    pub fn range(mut self, range: std::ops::Range<usize>) -> Self {
        self.start_offset = Some(range.start);
        self.end_offset = Some(range.end);
        self
    }

    pub fn data(mut self, data: BTreeMap<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub(crate) fn apply_to(&self, element: &InlineElement) -> InlineElement {
        let mut updated = element.clone();
        if let Some(element_type) = self.element_type {
            updated.element_type = element_type;
        }
        if let Some(block_id) = &self.block_id {
            updated.block_id = block_id.clone();
        }
        if let Some(start) = self.start_offset {
            updated.start_offset = start;
        }
        if let Some(end) = self.end_offset {
            updated.end_offset = end;
        }
        if let Some(data) = &self.data {
            updated.data = data.clone();
        }
        updated
    }
}
