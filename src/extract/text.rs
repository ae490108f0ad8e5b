//! Text runs to text blocks.

use unicode_normalization::UnicodeNormalization;

use super::ExtractOptions;
use crate::backend::{StyleRecord, TextContentInput, TextRunInput};
use crate::color::normalize_hex;
use crate::geometry::{BaseTransform, Size, Viewport};
use crate::model::{Block, FontSlant, FontWeight, TextContent, TextStyle};

/// Family used when neither the style record nor the font name has one.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Color used when a run carries none.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Turn a page's text runs into text blocks, in run order.
///
/// Each block's base transform is `viewport * run.transform`. Its font size
/// is the length of the base Y axis, so rotated or sheared runs still get the
/// size they were typeset at.
pub fn extract_text(
    input: &TextContentInput,
    viewport: &Viewport,
    page_index: u32,
    options: &ExtractOptions,
) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(input.runs.len());
    for run in &input.runs {
        if options.skip_empty_runs && run.text.trim().is_empty() {
            continue;
        }
        let record = input.styles.get(&run.font_ref);
        blocks.push(text_block(run, record, viewport, page_index, options));
    }
    log::debug!(
        "Page {}: {} of {} runs became text blocks",
        page_index + 1,
        blocks.len(),
        input.runs.len()
    );
    blocks
}

fn text_block(
    run: &TextRunInput,
    record: Option<&StyleRecord>,
    viewport: &Viewport,
    page_index: u32,
    options: &ExtractOptions,
) -> Block {
    let base = BaseTransform::new(viewport.transform * run.transform);
    let font_size = base.font_height();
    let local_size = Size::new(run.width * viewport.scale, font_size);

    let text = if options.normalize_text {
        run.text.nfc().collect()
    } else {
        run.text.clone()
    };

    let content = TextContent {
        text,
        font_size,
        style: resolve_style(record, run.color.as_deref()),
    };
    Block::text(page_index, base, local_size, content)
}

/// Resolve a run's style: record fields, then font-name heuristics, then
/// defaults.
pub fn resolve_style(record: Option<&StyleRecord>, run_color: Option<&str>) -> TextStyle {
    let default_record = StyleRecord::default();
    let record = record.unwrap_or(&default_record);
    let name = record.font_name.as_deref().unwrap_or("");
    let hints = NameHints::from_font_name(name);

    let family = record
        .font_family
        .clone()
        .or(hints.family)
        .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string());

    let weight = match record.weight {
        Some(w) => FontWeight(w),
        None if hints.bold => FontWeight::BOLD,
        None => FontWeight::NORMAL,
    };

    let slant = match record.italic {
        Some(true) => FontSlant::Italic,
        Some(false) => FontSlant::Normal,
        None => hints.slant,
    };

    let color = run_color
        .or(record.color.as_deref())
        .and_then(normalize_hex)
        .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string());

    TextStyle::from_document(family, weight, slant, color)
}

/// What a PostScript font name says about its style.
struct NameHints {
    family: Option<String>,
    bold: bool,
    slant: FontSlant,
}

impl NameHints {
    fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let slant = if lower.contains("italic") {
            FontSlant::Italic
        } else if lower.contains("oblique") {
            FontSlant::Oblique
        } else {
            FontSlant::Normal
        };
        let family = name
            .split(['-', ','])
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { family, bold, slant }
    }
}
