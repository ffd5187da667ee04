use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::FormatState;

/// Stable identifier of a block, unique for the lifetime of the document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl BlockId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Block type classification (closed set, dispatched exhaustively)
///
/// Persisted as the camelCase tag (`"paragraph"`, `"bulletList"`, ...). A tag this
/// build does not know about loads as [`BlockType::Unsupported`] so one corrupt
/// block never prevents the rest of the document from loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    CodeBlock,
    Quote,
    Callout,
    /// Unrecognized tag carried through from a persisted snapshot
    Unsupported(String),
}

/// What the Tab key does inside a block of a given type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPolicy {
    /// Tab / Shift+Tab change the list nesting depth
    Indent,
    /// Tab inserts a literal tab character at the caret
    InsertTab,
    /// Tab is swallowed without effect
    Ignore,
}

impl BlockType {
    /// Every type a user can pick from the toolbar, in menu order
    pub const ALL: [BlockType; 9] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::BulletList,
        BlockType::NumberedList,
        BlockType::CodeBlock,
        BlockType::Quote,
        BlockType::Callout,
    ];

    pub fn tag(&self) -> &str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Heading3 => "heading3",
            BlockType::BulletList => "bulletList",
            BlockType::NumberedList => "numberedList",
            BlockType::CodeBlock => "codeBlock",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
            BlockType::Unsupported(tag) => tag,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockType::BulletList | BlockType::NumberedList)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, BlockType::Unsupported(_))
    }

    /// Heading level (1-3) for heading blocks
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockType::Heading1 => Some(1),
            BlockType::Heading2 => Some(2),
            BlockType::Heading3 => Some(3),
            _ => None,
        }
    }

    /// Whether the block's format state is rendered; code blocks show their text verbatim
    pub fn applies_formatting(&self) -> bool {
        match self {
            BlockType::Paragraph
            | BlockType::Heading1
            | BlockType::Heading2
            | BlockType::Heading3
            | BlockType::BulletList
            | BlockType::NumberedList
            | BlockType::Quote
            | BlockType::Callout => true,
            BlockType::CodeBlock | BlockType::Unsupported(_) => false,
        }
    }

    pub fn tab_policy(&self) -> TabPolicy {
        match self {
            BlockType::BulletList | BlockType::NumberedList => TabPolicy::Indent,
            BlockType::CodeBlock => TabPolicy::InsertTab,
            BlockType::Paragraph
            | BlockType::Heading1
            | BlockType::Heading2
            | BlockType::Heading3
            | BlockType::Quote
            | BlockType::Callout
            | BlockType::Unsupported(_) => TabPolicy::Ignore,
        }
    }

    /// Hint shown in an empty block
    pub fn placeholder(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "Type something...",
            BlockType::Heading1 => "Heading 1...",
            BlockType::Heading2 => "Heading 2...",
            BlockType::Heading3 => "Heading 3...",
            BlockType::BulletList | BlockType::NumberedList => "List item...",
            BlockType::CodeBlock => "Code...",
            BlockType::Quote => "Quote...",
            BlockType::Callout => "Callout content...",
            BlockType::Unsupported(_) => "",
        }
    }

    /// Human readable name used by the block-type picker
    pub fn label(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "Paragraph",
            BlockType::Heading1 => "Heading 1",
            BlockType::Heading2 => "Heading 2",
            BlockType::Heading3 => "Heading 3",
            BlockType::BulletList => "Bullet List",
            BlockType::NumberedList => "Numbered List",
            BlockType::CodeBlock => "Code Block",
            BlockType::Quote => "Quote",
            BlockType::Callout => "Callout",
            // The picker falls back to "Paragraph" for anything it cannot name
            BlockType::Unsupported(_) => "Paragraph",
        }
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "paragraph" => BlockType::Paragraph,
            "heading1" => BlockType::Heading1,
            "heading2" => BlockType::Heading2,
            "heading3" => BlockType::Heading3,
            "bulletList" => BlockType::BulletList,
            "numberedList" => BlockType::NumberedList,
            "codeBlock" => BlockType::CodeBlock,
            "quote" => BlockType::Quote,
            "callout" => BlockType::Callout,
            _ => BlockType::Unsupported(tag),
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.tag().to_string()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Visual variant of a callout block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalloutType {
    #[default]
    Info,
    Warning,
    Error,
}

/// One structural unit of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub format: FormatState,
    #[serde(default)]
    pub indent: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callout_type: Option<CalloutType>,
}

impl Block {
    /// Paragraph with the given content and no formatting
    pub fn paragraph(id: BlockId, content: impl Into<String>) -> Self {
        Self {
            id,
            block_type: BlockType::Paragraph,
            content: content.into(),
            format: FormatState::default(),
            indent: 0,
            callout_type: None,
        }
    }

    /// Depth used for display; indentation only means something for lists
    pub fn effective_indent(&self) -> usize {
        if self.block_type.is_list() {
            self.indent
        } else {
            0
        }
    }

    /// Keep `callout_type` consistent with `block_type`
    pub(crate) fn normalize(&mut self) {
        if self.block_type == BlockType::Callout {
            self.callout_type.get_or_insert(CalloutType::Info);
        } else {
            self.callout_type = None;
        }
    }
}

/// Block data without an id, as handed to `insert_block`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewBlock {
    pub block_type: BlockType,
    pub content: String,
    pub format: FormatState,
    pub indent: usize,
    pub callout_type: Option<CalloutType>,
}

impl NewBlock {
    pub fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_callout_type(mut self, callout_type: Option<CalloutType>) -> Self {
        self.callout_type = callout_type;
        self
    }

    pub fn with_format(mut self, format: FormatState) -> Self {
        self.format = format;
        self
    }

    pub(crate) fn into_block(self, id: BlockId) -> Block {
        let mut block = Block {
            id,
            block_type: self.block_type,
            content: self.content,
            format: self.format,
            indent: self.indent,
            callout_type: self.callout_type,
        };
        block.normalize();
        block
    }
}

/// Partial block fields merged by `update_block`; `None` leaves a field untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockUpdate {
    pub block_type: Option<BlockType>,
    pub content: Option<String>,
    pub format: Option<FormatState>,
    pub indent: Option<usize>,
    pub callout_type: Option<CalloutType>,
}

impl BlockUpdate {
    pub fn block_type(mut self, block_type: BlockType) -> Self {
        self.block_type = Some(block_type);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn format(mut self, format: FormatState) -> Self {
        self.format = Some(format);
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn callout_type(mut self, callout_type: CalloutType) -> Self {
        self.callout_type = Some(callout_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == BlockUpdate::default()
    }

    /// Merge into `block`, returning the updated copy
    pub(crate) fn apply_to(&self, block: &Block) -> Block {
        let mut updated = block.clone();
        if let Some(block_type) = &self.block_type {
            updated.block_type = block_type.clone();
        }
        if let Some(content) = &self.content {
            updated.content = content.clone();
        }
        if let Some(format) = &self.format {
            updated.format = format.clone();
        }
        if let Some(indent) = self.indent {
            updated.indent = indent;
        }
        if let Some(callout_type) = self.callout_type {
            updated.callout_type = Some(callout_type);
        }
        updated.normalize();
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(BlockType::Paragraph, "paragraph")]
    #[case(BlockType::Heading2, "heading2")]
    #[case(BlockType::BulletList, "bulletList")]
    #[case(BlockType::NumberedList, "numberedList")]
    #[case(BlockType::CodeBlock, "codeBlock")]
    #[case(BlockType::Callout, "callout")]
    fn test_block_type_tags(#[case] block_type: BlockType, #[case] tag: &str) {
        assert_eq!(block_type.tag(), tag);
        assert_eq!(BlockType::from(tag.to_string()), block_type);
    }

    #[test]
    fn test_unknown_tag_becomes_unsupported() {
        let block_type: BlockType = serde_json::from_str("\"table\"").unwrap();
        assert_eq!(block_type, BlockType::Unsupported("table".to_string()));
        assert!(!block_type.is_supported());
        assert_eq!(serde_json::to_string(&block_type).unwrap(), "\"table\"");
    }

    #[test]
    fn test_policy_table() {
        assert_eq!(BlockType::BulletList.tab_policy(), TabPolicy::Indent);
        assert_eq!(BlockType::CodeBlock.tab_policy(), TabPolicy::InsertTab);
        assert_eq!(BlockType::Quote.tab_policy(), TabPolicy::Ignore);
        assert!(!BlockType::CodeBlock.applies_formatting());
        assert!(BlockType::Callout.applies_formatting());
        assert_eq!(BlockType::Heading3.heading_level(), Some(3));
        assert_eq!(BlockType::Paragraph.heading_level(), None);
    }

    #[test]
    fn test_callout_type_follows_block_type() {
        let block = NewBlock::new(BlockType::Callout).into_block(BlockId::from("c"));
        assert_eq!(block.callout_type, Some(CalloutType::Info));

        let paragraph = BlockUpdate::default()
            .block_type(BlockType::Paragraph)
            .apply_to(&block);
        assert_eq!(paragraph.callout_type, None);
    }

    #[test]
    fn test_block_update_merges_only_given_fields() {
        let block = Block::paragraph(BlockId::from("1"), "Hello");
        let updated = BlockUpdate::default().indent(2).apply_to(&block);

        assert_eq!(updated.content, "Hello");
        assert_eq!(updated.indent, 2);
        assert_eq!(updated.id, block.id);
    }

    #[test]
    fn test_effective_indent_ignores_non_lists() {
        let mut block = Block::paragraph(BlockId::from("1"), "");
        block.indent = 3;
        assert_eq!(block.effective_indent(), 0);

        block.block_type = BlockType::BulletList;
        assert_eq!(block.effective_indent(), 3);
    }

    #[test]
    fn test_block_serializes_with_camel_case_keys() {
        let block = NewBlock::new(BlockType::Callout)
            .with_content("Careful")
            .into_block(BlockId::from("7"));
        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(json["type"], "callout");
        assert_eq!(json["calloutType"], "info");
        assert_eq!(json["indent"], 0);
    }
}
