//! Cache inspection presentation.

use std::path::Path;

use crate::cli::ui;
use crate::store::CacheKeyStatus;

pub fn render_status(entries: &[CacheKeyStatus], cache_dir: &Path) -> String {
    if entries.is_empty() {
        return format!("No cache entries found.\nCache directory: {}\n", cache_dir.display());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Key"),
        ui::header_cell("Source"),
        ui::header_cell("Captured"),
        ui::header_cell("Size"),
    ]);
    for entry in entries {
        table.add_row(vec![
            comfy_table::Cell::new(&entry.key),
            comfy_table::Cell::new(&entry.source),
            comfy_table::Cell::new(entry.captured_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            ui::value_cell(&format!("{} B", entry.size_bytes)),
        ]);
    }

    format!(
        "{table}\n\n{}\n",
        ui::style_text(
            &format!("Cache directory: {}", cache_dir.display()),
            ui::StyleType::Subtle
        )
    )
}
