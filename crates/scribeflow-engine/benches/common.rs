// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use scribeflow_engine::Document;
use scribeflow_engine::models::{BlockType, FormatKind, NewBlock};

/// Document cycling through every block type, `sections` times
#[allow(dead_code)]
pub fn generate_document(sections: usize) -> Document {
    let mut doc = Document::new();
    let mut last = doc.blocks().first().map(|b| b.id.clone());
    for section in 0..sections {
        for (i, block_type) in BlockType::ALL.iter().enumerate() {
            let data = NewBlock::new(block_type.clone())
                .with_content(format!("Section {section} block {i} with some <text> & more"))
                .with_indent(i % 3);
            let id = doc.insert_block(data, last.as_ref());
            if i % 2 == 0 {
                doc.format_text(&id, FormatKind::Bold, true);
            }
            if i % 3 == 0 {
                doc.format_text(&id, FormatKind::Color, "#336699");
            }
            last = Some(id);
        }
    }
    doc
}

#[allow(dead_code)]
pub fn generate_paragraph(words: usize) -> String {
    "lorem ipsum dolor sit amet ".repeat(words / 5 + 1)
}
