//! Plain-text to PDF rendering.
//!
//! Pages are A4 and set in the built-in Courier face, which only covers
//! ASCII reliably, so every line is transliterated before layout.

use crate::error::{PrimerError, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const FONT_SIZE_PT: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 5.0;

/// Characters per line at 10pt Courier inside the margins.
pub const LINE_WIDTH: usize = 85;
/// Lines per page at the configured line height.
pub const LINES_PER_PAGE: usize = 52;

/// Text laid out into pages of wrapped ASCII lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub pages: Vec<Vec<String>>,
    pub transliterated_lines: usize,
}

/// Reduce one source line to printable ASCII.
///
/// Tabs become four spaces and other control characters are dropped. The
/// returned flag is set when any character had to be transliterated.
pub fn sanitize_line(line: &str) -> (String, bool) {
    let cleaned: String = line
        .replace('\t', "    ")
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.is_ascii() {
        (cleaned, false)
    } else {
        (deunicode::deunicode_with_tofu(&cleaned, "?"), true)
    }
}

/// Greedy word wrap. Words wider than `width` are split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }

    let indent: String = line.chars().take_while(|c| *c == ' ').collect();
    let indent = if indent.len() >= width { String::new() } else { indent };

    let mut out = Vec::new();
    let mut current = indent.clone();

    for word in line.split_whitespace() {
        let mut word = word.to_string();
        loop {
            let used = current.chars().count();
            let needed = word.chars().count() + usize::from(used > indent.len());
            if used + needed <= width {
                if used > indent.len() {
                    current.push(' ');
                }
                current.push_str(&word);
                break;
            }
            if used > indent.len() {
                out.push(std::mem::replace(&mut current, indent.clone()));
                continue;
            }
            // Word alone exceeds the remaining width.
            let room = width - used;
            let split = word
                .char_indices()
                .nth(room)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            current.push_str(&word[..split]);
            out.push(std::mem::replace(&mut current, indent.clone()));
            word = word[split..].to_string();
            if word.is_empty() {
                break;
            }
        }
    }

    if current.chars().count() > indent.len() {
        out.push(current);
    }
    out
}

/// Sanitize, wrap and paginate text. Always yields at least one page.
pub fn layout_pages(text: &str) -> PageLayout {
    let mut transliterated_lines = 0;
    let mut lines = Vec::new();

    for raw in text.lines() {
        let (clean, transliterated) = sanitize_line(raw);
        if transliterated {
            transliterated_lines += 1;
        }
        lines.extend(wrap(&clean, LINE_WIDTH));
    }

    let mut pages: Vec<Vec<String>> = lines
        .chunks(LINES_PER_PAGE)
        .map(|chunk| chunk.to_vec())
        .collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }

    PageLayout {
        pages,
        transliterated_lines,
    }
}

/// Render a laid-out document to PDF bytes.
pub fn render_pdf(title: &str, layout: &PageLayout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| PrimerError::Rendering(format!("Failed to load Courier: {}", e)))?;

    for (index, lines) in layout.pages.iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let canvas = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in lines {
            if !line.is_empty() {
                canvas.use_text(line.as_str(), FONT_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= LINE_HEIGHT_MM;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| PrimerError::Rendering(format!("Failed to write PDF: {}", e)))
}
