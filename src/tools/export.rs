//! Shopping list export
//!
//! Renders the merged, per-category view of a stored list as Markdown or as
//! a printable PDF.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::*;
use serde::Serialize;

use crate::db::Database;
use crate::models::ShoppingList;
use crate::shopping::units::round_to;
use crate::shopping::{GroupedShoppingList, ShoppingItem};
use crate::tools::shopping_lists::load_grouped_list;

// Letter, portrait
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 18.0;
const LINE_MM: f32 = 6.0;

const COLOR_TITLE: (u8, u8, u8) = (0, 112, 60);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

#[derive(Debug, Serialize)]
pub struct ExportMarkdownResponse {
    pub list_id: i64,
    pub markdown: String,
    pub category_count: usize,
    pub item_count: usize,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct ExportPdfResponse {
    pub success: bool,
    pub list_id: i64,
    pub file_path: String,
    pub page_count: usize,
    pub item_count: usize,
    pub message: String,
}

/// "5", "1.18", "0.5"
pub fn format_quantity(quantity: f64) -> String {
    let rounded = round_to(quantity, 2);
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}

fn item_line(item: &ShoppingItem) -> String {
    if item.measure.is_empty() {
        format!("{} {}", format_quantity(item.quantity), item.food)
    } else {
        format!("{} {} {}", format_quantity(item.quantity), item.measure, item.food)
    }
}

/// Markdown body for a list; categories and items in first-seen order
pub fn render_markdown(list: &ShoppingList, grouped: &GroupedShoppingList, generated_at: &str) -> String {
    let mut markdown = String::new();

    markdown.push_str(&format!("# Shopping List: {}\n\n", list.name));
    markdown.push_str(&format!("**Generated:** {}\n\n", generated_at));
    if let Some(ref notes) = list.notes {
        markdown.push_str(&format!("{}\n\n", notes));
    }
    markdown.push_str("---\n\n");

    if grouped.is_empty() {
        markdown.push_str("*This list is empty.*\n");
        return markdown;
    }

    for group in grouped.groups() {
        let heading = if group.category.is_empty() { "Uncategorized" } else { group.category.as_str() };
        markdown.push_str(&format!("## {}\n\n", heading));
        for item in &group.items {
            let mark = if item.checked { "x" } else { " " };
            markdown.push_str(&format!("- [{}] {}\n", mark, item_line(item)));
        }
        markdown.push('\n');
    }

    markdown
}

pub fn export_shopping_list_markdown(db: &Database, list_id: i64) -> Result<ExportMarkdownResponse, String> {
    let (list, grouped) = load_grouped_list(db, list_id)?;
    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    Ok(ExportMarkdownResponse {
        list_id,
        markdown: render_markdown(&list, &grouped, &generated_at),
        category_count: grouped.len(),
        item_count: grouped.item_count(),
        generated_at,
    })
}

// ============================================================================
// PDF
// ============================================================================

fn rgb(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb(color));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn add_rule(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_color(rgb(COLOR_GRAY));
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_MM), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Lay out the merged list; returns the document and its page count
pub fn render_pdf(
    list: &ShoppingList,
    grouped: &GroupedShoppingList,
    generated_at: &str,
) -> Result<(PdfDocumentReference, usize), String> {
    let title = format!("Shopping List: {}", list.name);
    let (doc, first_page, first_layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| e.to_string())?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut pages = 1;
    let mut y = PAGE_HEIGHT_MM - 20.0;

    add_text(&layer, &font_bold, &title, MARGIN_MM, y, 18.0, COLOR_TITLE);
    y -= 8.0;
    add_text(&layer, &font, &format!("Generated: {}", generated_at), MARGIN_MM, y, 10.0, COLOR_GRAY);
    y -= LINE_MM;
    if let Some(ref notes) = list.notes {
        add_text(&layer, &font, notes, MARGIN_MM, y, 10.0, COLOR_BLACK);
        y -= LINE_MM;
    }
    add_rule(&layer, y);
    y -= 10.0;

    if grouped.is_empty() {
        add_text(&layer, &font, "This list is empty.", MARGIN_MM, y, 11.0, COLOR_GRAY);
    }

    for group in grouped.groups() {
        let heading = if group.category.is_empty() { "Uncategorized" } else { group.category.as_str() };

        // Keep a heading together with at least its first line
        let mut rows: Vec<(String, bool, bool)> = vec![(heading.to_string(), true, false)];
        rows.extend(group.items.iter().map(|item| (item_line(item), false, item.checked)));

        for (i, (text, is_heading, checked)) in rows.into_iter().enumerate() {
            let needed = if is_heading { LINE_MM * 2.0 } else { LINE_MM };
            if y - needed < MARGIN_MM {
                let (page, page_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), format!("Layer {}", pages + 1));
                layer = doc.get_page(page).get_layer(page_layer);
                pages += 1;
                y = PAGE_HEIGHT_MM - 20.0;
                if i > 0 {
                    add_text(&layer, &font_bold, &format!("{} (cont.)", heading), MARGIN_MM, y, 12.0, COLOR_BLACK);
                    y -= LINE_MM + 1.0;
                }
            }

            if is_heading {
                add_text(&layer, &font_bold, &text, MARGIN_MM, y, 12.0, COLOR_BLACK);
                y -= LINE_MM + 1.0;
            } else {
                let (mark, color) = if checked { ("[x]", COLOR_GRAY) } else { ("[  ]", COLOR_BLACK) };
                add_text(&layer, &font, mark, MARGIN_MM + 2.0, y, 10.0, color);
                add_text(&layer, &font, &text, MARGIN_MM + 12.0, y, 10.0, color);
                y -= LINE_MM;
            }
        }
        y -= 3.0;
    }

    Ok((doc, pages))
}

pub fn export_shopping_list_pdf(
    db: &Database,
    list_id: i64,
    output_path: &str,
) -> Result<ExportPdfResponse, String> {
    let (list, grouped) = load_grouped_list(db, list_id)?;
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();

    let (doc, page_count) = render_pdf(&list, &grouped, &generated_at)?;

    let path = Path::new(output_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    let file = File::create(path).map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    tracing::info!(list_id, path = %path.display(), pages = page_count, "Exported shopping list PDF");

    Ok(ExportPdfResponse {
        success: true,
        list_id,
        file_path: path.display().to_string(),
        page_count,
        item_count: grouped.item_count(),
        message: format!("Wrote {} lines across {} page(s)", grouped.item_count(), page_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopping::aggregate;

    fn list(notes: Option<&str>) -> ShoppingList {
        ShoppingList {
            id: 1,
            name: "Week 12".to_string(),
            notes: notes.map(str::to_string),
            created_at: "2026-01-01 00:00:00".to_string(),
            updated_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    fn item(food: &str, quantity: f64, measure: &str, category: &str, checked: bool) -> ShoppingItem {
        ShoppingItem {
            food: food.to_string(),
            quantity,
            measure: measure.to_string(),
            category: category.to_string(),
            checked,
        }
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(5.0), "5");
        assert_eq!(format_quantity(1.18), "1.18");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(2.004), "2");
    }

    #[test]
    fn test_render_markdown_groups_in_first_seen_order() {
        let grouped = aggregate(&[
            item("Milk", 5.0, "cup", "Dairy", false),
            item("Garlic", 2.0, "cloves", "Produce", true),
            item("Salt", 1.0, "", "Pantry", false),
        ]);

        let md = render_markdown(&list(Some("Costco run")), &grouped, "2026-01-01 09:00:00 UTC");

        assert!(md.starts_with("# Shopping List: Week 12\n"));
        assert!(md.contains("Costco run"));
        assert!(md.contains("- [ ] 1.18 litre Milk\n"));
        assert!(md.contains("- [x] 2 pieces Garlic\n"));
        assert!(md.contains("- [ ] 1 Salt\n"));

        let dairy = md.find("## Dairy").unwrap();
        let produce = md.find("## Produce").unwrap();
        let pantry = md.find("## Pantry").unwrap();
        assert!(dairy < produce && produce < pantry);
    }

    #[test]
    fn test_render_markdown_empty() {
        let md = render_markdown(&list(None), &GroupedShoppingList::default(), "now");
        assert!(md.contains("*This list is empty.*"));
    }

    #[test]
    fn test_render_pdf_paginates() {
        let items: Vec<ShoppingItem> = (0..80)
            .map(|i| item(&format!("Item {}", i), 1.0, "piece", "Pantry", false))
            .collect();
        let grouped = aggregate(&items);

        let (doc, pages) = render_pdf(&list(None), &grouped, "now").unwrap();
        assert!(pages > 1);

        let bytes = doc.save_to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
