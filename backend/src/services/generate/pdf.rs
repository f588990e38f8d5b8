//! PDF assembly: turns final, fully substituted document text into a PDF
//! file via genpdf.
//!
//! Strictly a consumer of finished text; no placeholder handling happens
//! here. Line treatment: empty lines become breaks, lines starting with
//! `- ` become bulleted items, everything else is a paragraph.

use genpdf::elements::{Break, Paragraph};
use genpdf::style::{Style, StyledString};
use genpdf::Document;
use std::fs::{self, File};
use std::path::Path;

fn load_font() -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, String> {
    // Prefer Arial when its TTFs were dropped into ./fonts, otherwise fall
    // back to LiberationSans in the same directory.
    if let Ok(family) = genpdf::fonts::from_files("./fonts", "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files("./fonts", "LiberationSans", None).map_err(|e| e.to_string())
}

/// Configure and return a genpdf Document with font and decorator set.
fn configure_document(title: &str) -> Result<Document, String> {
    let font_family = load_font()?;
    let mut doc = Document::new(font_family);
    doc.set_title(title);
    doc.set_font_size(11);
    doc.set_line_spacing(1.0);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

fn push_text(doc: &mut Document, text: &str) {
    // No trimming: empty lines are intentional vertical space.
    for line in text.lines() {
        if line.is_empty() {
            doc.push(Break::new(1));
        } else if let Some(item) = line.strip_prefix("- ") {
            let mut p = Paragraph::new("");
            p.push(StyledString::new("• ", Style::new()));
            p.push(item);
            doc.push(p);
        } else {
            doc.push(Paragraph::new(line));
        }
    }
}

/// Renders `text` into a PDF at `output_path`, creating parent directories
/// as needed.
pub(crate) fn render_to_file(title: &str, text: &str, output_path: &Path) -> Result<(), String> {
    let mut doc = configure_document(title)?;
    push_text(&mut doc, text);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let mut out_file = File::create(output_path).map_err(|e| e.to_string())?;
    doc.render(&mut out_file).map_err(|e| e.to_string())
}
