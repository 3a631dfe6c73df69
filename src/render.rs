//! Message layout
//!
//! Bot messages are plain text with line breaks. Lines shaped like `A. Something`
//! or `1. Something` are menu entries and are grouped into lists; blank lines
//! separate sections; anything else is a paragraph.

use regex::Regex;
use std::sync::LazyLock;

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]\.\s?.+").expect("list item pattern is valid"));

/// One layout block of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    /// Consecutive list-item lines
    List(Vec<String>),
    Separator,
}

pub fn format_message(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in text.split('\n').map(str::trim) {
        if line.is_empty() {
            blocks.push(Block::Separator);
        } else if LIST_ITEM.is_match(line) {
            match blocks.last_mut() {
                Some(Block::List(items)) => items.push(line.to_string()),
                _ => blocks.push(Block::List(vec![line.to_string()])),
            }
        } else {
            blocks.push(Block::Paragraph(line.to_string()));
        }
    }
    blocks
}

/// Plain-text rendering for a terminal
pub fn to_terminal(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Paragraph(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Block::List(items) => {
                for item in items {
                    out.push_str("  ");
                    out.push_str(item);
                    out.push('\n');
                }
            }
            Block::Separator => out.push('\n'),
        }
    }
    out
}
