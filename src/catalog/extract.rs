// src/catalog/extract.rs
// =============================================================================
// Turns the item listing page into a list of ItemRecords.
//
// The listing is a single <table>. The first row is the column header; every
// other row looks like this:
//
//   <tr>
//     <td><img src="/images/loading_50x50.svg"
//              data-src="/basic_recipes/images/oak_fence_gate.png"
//              alt="oak fence gate"></td>
//     <td><a href="/basic_recipes/make_oak_fence_gate.php">Oak Fence Gate</a>
//         <br>(<em>minecraft:<wbr>fence_<wbr>gate</em>)</td>
//     <td>107</td>
//     <td>0</td>
//   </tr>
//
// Rows whose id cell is not a number (flowing lava and friends) are not real
// items and are skipped quietly. Anything else that does not fit the shape
// above is an ExtractError and aborts the whole extraction.
// =============================================================================

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::record::ItemRecord;
use crate::error::ExtractError;

/// Image attribute holding the real icon path (`src` is a lazy-load placeholder).
const IMAGE_SOURCE_ATTR: &str = "data-src";
const IMAGE_ALT_ATTR: &str = "alt";

/// Markup fragments the page uses to let long ids wrap.
const WRAP_ARTIFACTS: [&str; 4] = ["<em>", "</em>", "<wbr>", "<wbr/>"];

/// Extracts every real item from the listing page, in page order.
pub fn extract(html: &str) -> Result<Vec<ItemRecord>, ExtractError> {
    let document = Html::parse_document(html);

    // Constant selectors, known to be valid
    let table_selector = Selector::parse("table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let selectors = RowSelectors {
        img: Selector::parse("img").unwrap(),
        anchor: Selector::parse("a").unwrap(),
    };

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ExtractError::MissingTable)?;

    let mut records = Vec::new();

    // Skip the column header
    for (index, row) in table.select(&row_selector).skip(1).enumerate() {
        if let Some(record) = extract_row(index + 1, row, &selectors)? {
            records.push(record);
        }
    }

    debug!(count = records.len(), "extracted catalog records");
    Ok(records)
}

// Selectors used inside every row, parsed once per page.
struct RowSelectors {
    img: Selector,
    anchor: Selector,
}

// Returns Ok(None) for rows that are not real items.
fn extract_row(
    row: usize,
    element: ElementRef<'_>,
    selectors: &RowSelectors,
) -> Result<Option<ItemRecord>, ExtractError> {
    let cells: Vec<ElementRef<'_>> = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "td")
        .collect();

    // image, name + qualified id, numeric id, variant
    let [image_cell, name_cell, id_cell, variant_cell] = cells[..] else {
        return Err(ExtractError::CellCount { row, found: cells.len() });
    };

    let img = image_cell
        .select(&selectors.img)
        .next()
        .ok_or(ExtractError::MissingImage { row })?;
    let image_src = img
        .value()
        .attr(IMAGE_SOURCE_ATTR)
        .ok_or(ExtractError::MissingAttribute { row, attr: IMAGE_SOURCE_ATTR })?;
    let alt_text = img
        .value()
        .attr(IMAGE_ALT_ATTR)
        .ok_or(ExtractError::MissingAttribute { row, attr: IMAGE_ALT_ATTR })?;

    let name = display_name(name_cell, &selectors.anchor).ok_or(ExtractError::MissingName { row })?;

    // The alt text is the lowercased name on every row; anything else means
    // we are reading the wrong node.
    if name.to_lowercase() != alt_text {
        return Err(ExtractError::AltMismatch {
            row,
            name,
            alt: alt_text.to_string(),
        });
    }

    let qualified_id = qualified_id(name_cell).unwrap_or_default();

    let id_text = cell_text(id_cell);
    let numeric_id = match id_text.parse::<i32>() {
        Ok(id) => id,
        Err(_) => {
            debug!(row, name = %name, id = %id_text, "skipping row without a numeric id");
            return Ok(None);
        }
    };

    let variant_text = cell_text(variant_cell);
    let variant = variant_text.parse::<i32>().map_err(|_| ExtractError::Variant {
        row,
        id: qualified_id.clone(),
        raw: variant_text.clone(),
    })?;

    let record = ItemRecord::new(name, qualified_id.clone(), numeric_id, variant, image_src)
        .ok_or(ExtractError::QualifiedId { row, raw: qualified_id })?;

    debug!(row, short_id = record.short_id(), file = record.local_image_filename(), "row extracted");
    Ok(Some(record))
}

// Prefers the link text; rows without a link carry the name as the cell's
// leading content (the first node that is not just whitespace).
fn display_name(cell: ElementRef<'_>, anchor_selector: &Selector) -> Option<String> {
    let name = match cell.select(anchor_selector).next() {
        Some(anchor) => anchor.text().collect::<String>(),
        None => {
            let first = cell.children().find(|node| !is_blank(node.value()))?;
            match first.value() {
                Node::Text(text) => text.trim().to_string(),
                Node::Element(_) => ElementRef::wrap(first)?.text().collect(),
                _ => return None,
            }
        }
    };

    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

// The qualified id sits in the second-to-last node of the name cell, the
// <em> wrapped between "(" and ")".
fn qualified_id(cell: ElementRef<'_>) -> Option<String> {
    let nodes: Vec<_> = cell
        .children()
        .filter(|node| !is_blank(node.value()))
        .collect();

    let node = *nodes.iter().rev().nth(1)?;
    let raw = match node.value() {
        Node::Text(text) => text.trim().to_string(),
        Node::Element(_) => ElementRef::wrap(node)?.html(),
        _ => return None,
    };

    Some(scrub(&raw))
}

fn is_blank(node: &Node) -> bool {
    matches!(node, Node::Text(text) if text.trim().is_empty())
}

// Textual scrub of the wrap markers, not a markup parse.
fn scrub(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for artifact in WRAP_ARTIFACTS {
        cleaned = cleaned.replace(artifact, "");
    }
    cleaned
        .trim()
        .trim_matches(|c| c == '(' || c == ')')
        .trim()
        .to_string()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `let [a, b, c, d] = cells[..] else { ... }`?
//    - A slice pattern with let-else: it only matches a slice of exactly four
//      elements, otherwise the else branch runs (and must return)
//
// 2. Why walk `children()` by hand instead of a CSS selector?
//    - Selectors only find elements; the name and the qualified id live in
//      text nodes and in the raw <em> markup next to them
// -----------------------------------------------------------------------------
