use crate::formatting;
use crate::models::{Block, BlockId, BlockType, CalloutType, EditorState, InlineElement};

/// Content grouping for structured UI rendering.
///
/// Consecutive list blocks of the same kind are gathered so a frontend can emit
/// one list container per run, nested by indent.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentGroup {
    /// Single non-list block (paragraph, heading, code, quote, callout, unsupported)
    SingleBlock(RenderBlock),
    /// Consecutive bullet list blocks
    BulletListGroup { items: Vec<ListItem> },
    /// Consecutive numbered list blocks
    NumberedListGroup { items: Vec<ListItem> },
}

/// List block with the blocks indented beneath it
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub block: RenderBlock,
    pub children: Vec<ListItem>,
}

/// Immutable, display-ready view of the document.
///
/// The rendering collaborator works only from snapshots; it never sees or mutates
/// [`EditorState`] directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Document version the snapshot was taken at
    pub version: u64,
    /// Flat list of blocks in document order
    pub blocks: Vec<RenderBlock>,
    /// Blocks grouped for list-aware rendering
    pub content_groups: Vec<ContentGroup>,
}

impl Snapshot {
    pub fn block(&self, id: &BlockId) -> Option<&RenderBlock> {
        self.blocks.iter().find(|b| &b.id == id)
    }
}

/// How a block should be drawn
#[derive(Debug, Clone, PartialEq)]
pub enum RenderKind {
    Paragraph,
    Heading { level: u8 },
    ListItem { numbered: bool },
    CodeBlock,
    Quote,
    Callout { callout_type: CalloutType },
    /// Block with a type tag this build does not know; shown as a visible placeholder
    Unsupported { tag: String },
}

/// UI-ready block
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub id: BlockId,
    pub kind: RenderKind,
    /// List nesting depth; always 0 for non-list blocks
    pub depth: usize,
    /// Plain text shown in the editable region
    pub text: String,
    /// Marked-up content (formatting engine output)
    pub html: String,
    /// Hint for an empty block
    pub placeholder: &'static str,
    /// 1-based number of a numbered-list item among its consecutive siblings
    pub ordinal: Option<usize>,
    /// Inline elements anchored to this block
    pub links: Vec<InlineElement>,
}

/// Build a snapshot of `state`
pub(crate) fn create_snapshot(state: &EditorState, version: u64) -> Snapshot {
    let mut numbering = Numbering::default();
    let blocks: Vec<RenderBlock> = state
        .blocks
        .iter()
        .map(|block| {
            let mut render = render_block(block);
            render.ordinal = numbering.next(block);
            render.links = state.inline_elements_for(&block.id).cloned().collect();
            render
        })
        .collect();
    let content_groups = group_blocks_for_rendering(&blocks);

    Snapshot {
        version,
        blocks,
        content_groups,
    }
}

/// Dispatch table from block type to its rendering
pub fn render_block(block: &Block) -> RenderBlock {
    let kind = match &block.block_type {
        BlockType::Paragraph => RenderKind::Paragraph,
        BlockType::Heading1 | BlockType::Heading2 | BlockType::Heading3 => RenderKind::Heading {
            level: block.block_type.heading_level().unwrap_or(1),
        },
        BlockType::BulletList => RenderKind::ListItem { numbered: false },
        BlockType::NumberedList => RenderKind::ListItem { numbered: true },
        BlockType::CodeBlock => RenderKind::CodeBlock,
        BlockType::Quote => RenderKind::Quote,
        BlockType::Callout => RenderKind::Callout {
            callout_type: block.callout_type.unwrap_or_default(),
        },
        BlockType::Unsupported(tag) => RenderKind::Unsupported { tag: tag.clone() },
    };

    let (text, html) = match &kind {
        RenderKind::Unsupported { tag } => {
            let message = format!("Unsupported block type: {tag}");
            let html = formatting::render_verbatim(&message);
            (message, html)
        }
        RenderKind::CodeBlock => (
            block.content.clone(),
            formatting::render_verbatim(&block.content),
        ),
        _ => (
            formatting::plain_text(&block.content),
            formatting::render(&block.content, &block.format),
        ),
    };

    RenderBlock {
        id: block.id.clone(),
        kind,
        depth: block.effective_indent(),
        text,
        html,
        placeholder: block.block_type.placeholder(),
        ordinal: None,
        links: Vec::new(),
    }
}

/// Running counters for numbered lists.
///
/// A stack of `(depth, count)` with strictly increasing depths; only depths in
/// use get an entry, so arbitrary indents cost nothing.
#[derive(Default)]
struct Numbering {
    counters: Vec<(usize, usize)>,
}

impl Numbering {
    fn next(&mut self, block: &Block) -> Option<usize> {
        if block.block_type != BlockType::NumberedList {
            self.counters.clear();
            return None;
        }
        let depth = block.indent;
        while self.counters.last().is_some_and(|(d, _)| *d > depth) {
            self.counters.pop();
        }
        match self.counters.last_mut() {
            Some((d, count)) if *d == depth => {
                *count += 1;
                Some(*count)
            }
            _ => {
                self.counters.push((depth, 1));
                Some(1)
            }
        }
    }
}

/// Group consecutive list blocks into nested list structures
fn group_blocks_for_rendering(blocks: &[RenderBlock]) -> Vec<ContentGroup> {
    let mut groups = Vec::new();
    let mut i = 0;

    while i < blocks.len() {
        match blocks[i].kind {
            RenderKind::ListItem { numbered } => {
                let list_start = i;
                while i < blocks.len()
                    && blocks[i].kind == (RenderKind::ListItem { numbered })
                {
                    i += 1;
                }

                let items = build_nested_list_structure(&blocks[list_start..i]);
                groups.push(if numbered {
                    ContentGroup::NumberedListGroup { items }
                } else {
                    ContentGroup::BulletListGroup { items }
                });
            }
            _ => {
                groups.push(ContentGroup::SingleBlock(blocks[i].clone()));
                i += 1;
            }
        }
    }

    groups
}

fn build_nested_list_structure(blocks: &[RenderBlock]) -> Vec<ListItem> {
    let mut result = Vec::new();
    for block in blocks {
        let item = ListItem {
            block: block.clone(),
            children: Vec::new(),
        };
        insert_list_item_at_depth(&mut result, item, block.depth);
    }
    result
}

fn insert_list_item_at_depth(items: &mut Vec<ListItem>, new_item: ListItem, target_depth: usize) {
    if target_depth == 0 {
        items.push(new_item);
    } else if let Some(last_item) = items.last_mut() {
        insert_list_item_at_depth(&mut last_item.children, new_item, target_depth - 1);
    } else {
        // No parent at this depth; hang it at the root
        items.push(new_item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormatKind, NewInlineElement};
    use crate::tests::{block, document_with};
    use pretty_assertions::assert_eq;

    fn list(id: &str, numbered: bool, indent: usize) -> Block {
        let block_type = if numbered {
            BlockType::NumberedList
        } else {
            BlockType::BulletList
        };
        let mut b = block(id, block_type, id);
        b.indent = indent;
        b
    }

    #[test]
    fn test_snapshot_renders_formatted_html() {
        let mut doc = document_with(vec![block("1", BlockType::Paragraph, "Hello")]);
        doc.format_text(&BlockId::from("1"), FormatKind::Bold, true);

        let snapshot = doc.snapshot();

        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.blocks[0].html, "<strong>Hello</strong>");
        assert_eq!(snapshot.blocks[0].text, "Hello");
    }

    #[test]
    fn test_code_block_ignores_format() {
        let mut code = block("c", BlockType::CodeBlock, "a<b");
        code.format.set(FormatKind::Bold, true);

        let render = render_block(&code);

        assert_eq!(render.kind, RenderKind::CodeBlock);
        assert_eq!(render.html, "a&lt;b");
    }

    #[test]
    fn test_unsupported_block_renders_placeholder_message() {
        let render = render_block(&block("x", BlockType::Unsupported("table".into()), "data"));
        assert_eq!(render.text, "Unsupported block type: table");
        assert_eq!(
            render.kind,
            RenderKind::Unsupported {
                tag: "table".to_string()
            }
        );
    }

    #[test]
    fn test_non_list_depth_is_zero() {
        let mut quote = block("q", BlockType::Quote, "");
        quote.indent = 4;
        let render = render_block(&quote);
        assert_eq!(render.depth, 0);
        assert_eq!(render.placeholder, "Quote...");
    }

    #[test]
    fn test_callout_kind_carries_type() {
        let render = render_block(&block("c", BlockType::Callout, "hi"));
        assert_eq!(
            render.kind,
            RenderKind::Callout {
                callout_type: CalloutType::Info
            }
        );
    }

    #[test]
    fn test_numbered_ordinals_restart_per_run_and_depth() {
        let doc = document_with(vec![
            list("a", true, 0),
            list("b", true, 1),
            list("c", true, 1),
            list("d", true, 0),
            list("e", true, 1),
            block("p", BlockType::Paragraph, ""),
            list("f", true, 0),
        ]);

        let ordinals: Vec<Option<usize>> =
            doc.snapshot().blocks.iter().map(|b| b.ordinal).collect();

        assert_eq!(
            ordinals,
            vec![Some(1), Some(1), Some(2), Some(2), Some(1), None, Some(1)]
        );
    }

    #[test]
    fn test_huge_indents_number_without_dense_counters() {
        let doc = document_with(vec![
            list("a", true, usize::MAX),
            list("b", true, usize::MAX),
            list("c", true, 4_000_000_000_000),
            list("d", true, usize::MAX),
            list("e", true, 0),
        ]);

        let snapshot = doc.snapshot();

        let ordinals: Vec<Option<usize>> = snapshot.blocks.iter().map(|b| b.ordinal).collect();
        assert_eq!(
            ordinals,
            vec![Some(1), Some(2), Some(1), Some(1), Some(1)]
        );
        assert_eq!(snapshot.blocks[0].depth, usize::MAX);
        assert_eq!(snapshot.content_groups.len(), 1);
    }

    #[test]
    fn test_group_blocks_nested_list() {
        let doc = document_with(vec![
            block("h", BlockType::Heading1, "Title"),
            list("a", false, 0),
            list("b", false, 1),
            list("c", false, 0),
            list("n", true, 0),
        ]);

        let groups = doc.snapshot().content_groups;

        assert_eq!(groups.len(), 3);
        assert!(matches!(&groups[0], ContentGroup::SingleBlock(b) if b.id.as_str() == "h"));
        match &groups[1] {
            ContentGroup::BulletListGroup { items } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].children.len(), 1);
                assert_eq!(items[0].children[0].block.id.as_str(), "b");
            }
            other => panic!("expected bullet group, got {other:?}"),
        }
        assert!(matches!(&groups[2], ContentGroup::NumberedListGroup { items } if items.len() == 1));
    }

    #[test]
    fn test_snapshot_lists_block_links() {
        let mut doc = document_with(vec![
            block("1", BlockType::Paragraph, "one"),
            block("2", BlockType::Paragraph, "two"),
        ]);
        doc.add_inline_element(NewInlineElement::link(
            BlockId::from("2"),
            0..3,
            "https://example.com",
            "Link",
        ));

        let snapshot = doc.snapshot();

        assert!(snapshot.blocks[0].links.is_empty());
        assert_eq!(snapshot.blocks[1].links.len(), 1);
        assert_eq!(snapshot.block(&BlockId::from("2")).unwrap().links[0].url(), Some("https://example.com"));
    }
}
