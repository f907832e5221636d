//! Turn product description markup into plain text with bullet markers

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, ul").expect("static selector"));
static STRONG: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").expect("static selector"));
static LIST_ITEMS: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("static selector"));

const BULLET: char = '•';

/// Concatenate the element's text nodes, each trimmed, empty ones skipped
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Headed sections: a paragraph with bold lead-in text opens a block, the
/// following lists become indented bullet lines.
pub fn headed_sections_text(section: Option<ElementRef<'_>>) -> String {
    let Some(section) = section else {
        return String::new();
    };

    let mut text = String::new();
    for block in section.select(&BLOCKS) {
        match block.value().name() {
            "p" => {
                if let Some(strong) = block.select(&STRONG).next() {
                    text.push_str(&format!("\n{}:\n", stripped_text(strong)));
                }
            }
            "ul" => {
                for item in block.select(&LIST_ITEMS) {
                    text.push_str(&format!("  {BULLET} {}\n", stripped_text(item)));
                }
            }
            _ => {}
        }
    }

    text.trim().to_string()
}

/// Everything after a marker heading.
///
/// Paragraphs and lists before the heading whose text contains
/// `start_phrase` (case-insensitive) are dropped, as is the first list right
/// after it. The rest becomes one line per paragraph and one `•` line per
/// list item. Without the heading the result is empty.
pub fn section_after_heading_text(content: Option<ElementRef<'_>>, start_phrase: &str) -> String {
    let Some(content) = content else {
        return String::new();
    };

    let start_phrase = start_phrase.to_lowercase();
    let mut lines: Vec<String> = Vec::new();
    let mut found_heading = false;
    let mut skip_next_list = false;

    for block in content.select(&BLOCKS) {
        let text = stripped_text(block);
        let is_list = block.value().name() == "ul";

        if text.to_lowercase().contains(&start_phrase) {
            found_heading = true;
            skip_next_list = true;
            continue;
        }

        if skip_next_list && is_list {
            skip_next_list = false;
            continue;
        }

        if !found_heading {
            continue;
        }

        if is_list {
            lines.extend(
                block
                    .select(&LIST_ITEMS)
                    .map(|item| format!("{BULLET} {}", stripped_text(item))),
            );
        } else if !text.is_empty() {
            lines.push(text);
        }
    }

    lines.join("\n")
}
