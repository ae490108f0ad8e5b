//! Content stream interpretation for text runs.
//!
//! Tracks the graphics state (`q`/`Q`, `cm`, fill color) and the text state
//! (`Tf`, `Tc`, `Tw`, `Tz`, `TL`, `Ts`, `Tm`, `Td`, `TD`, `T*`) and emits one
//! [`TextRunInput`] per show operator. The placement matrix of a run is
//!
//! ```text
//! CTM * Tm * [size * Th, 0, 0, size, 0, rise]
//! ```
//!
//! so font size, horizontal scaling and any rotation or skew of the source
//! typography end up in the run's axis vectors.

use std::collections::HashMap;

use lopdf::content::Operation;
use lopdf::Object;

use super::TextRunInput;
use crate::color::rgb_to_hex;
use crate::geometry::{Affine, Vec2};

/// Glyph advance used when a font carries no width table.
const DEFAULT_GLYPH_WIDTH: f64 = 500.0;

/// `TJ` adjustment (thousandths of an em) treated as a word break.
const SPACE_THRESHOLD: f64 = 200.0;

/// Glyph widths of one font, in thousandths of an em.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct FontMetrics {
    first_char: u32,
    widths: Vec<f64>,
    missing_width: f64,
    two_byte: bool,
}

static FALLBACK_METRICS: FontMetrics = FontMetrics {
    first_char: 0,
    widths: Vec::new(),
    missing_width: DEFAULT_GLYPH_WIDTH,
    two_byte: false,
};

impl FontMetrics {
    /// Single-byte font with a `/Widths` table.
    pub(super) fn simple(first_char: u32, widths: Vec<f64>, missing_width: f64) -> Self {
        Self {
            first_char,
            widths,
            missing_width,
            two_byte: false,
        }
    }

    /// Two-byte composite font where every glyph uses the default width.
    pub(super) fn composite(default_width: f64) -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            missing_width: default_width,
            two_byte: true,
        }
    }

    fn glyph_width(&self, code: u32) -> f64 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        FALLBACK_METRICS.clone()
    }
}

/// Parameters saved and restored by `q`/`Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Affine,
    fill: Option<String>,
    font: Vec<u8>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    h_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            fill: None,
            font: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

struct RunCollector<'a, D> {
    metrics: &'a HashMap<Vec<u8>, FontMetrics>,
    decode: D,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    tm: Affine,
    tlm: Affine,
    in_text: bool,
    runs: Vec<TextRunInput>,
}

/// Interpret content stream operations and collect text runs.
///
/// `decode` turns the bytes of a show string into text for the named font.
pub(super) fn collect_runs<D>(
    operations: &[Operation],
    metrics: &HashMap<Vec<u8>, FontMetrics>,
    decode: D,
) -> Vec<TextRunInput>
where
    D: Fn(&[u8], &[u8]) -> String,
{
    let mut collector = RunCollector {
        metrics,
        decode,
        state: GraphicsState::default(),
        stack: Vec::new(),
        tm: Affine::IDENTITY,
        tlm: Affine::IDENTITY,
        in_text: false,
        runs: Vec::new(),
    };
    for op in operations {
        collector.apply(op);
    }
    collector.runs
}

impl<D> RunCollector<'_, D>
where
    D: Fn(&[u8], &[u8]) -> String,
{
    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
            "cm" => {
                if let Some(m) = matrix(operands) {
                    self.state.ctm = self.state.ctm * m;
                }
            }
            "BT" => {
                self.in_text = true;
                self.tm = Affine::IDENTITY;
                self.tlm = Affine::IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let [Object::Name(name), size, ..] = operands.as_slice() {
                    self.state.font = name.clone();
                    self.state.font_size = number(size).unwrap_or(12.0);
                }
            }
            "Tc" => set_number(&mut self.state.char_spacing, operands),
            "Tw" => set_number(&mut self.state.word_spacing, operands),
            "TL" => set_number(&mut self.state.leading, operands),
            "Ts" => set_number(&mut self.state.rise, operands),
            "Tz" => {
                if let Some(scale) = operands.first().and_then(number) {
                    self.state.h_scale = scale / 100.0;
                }
            }
            "Td" => {
                if let Some((tx, ty)) = pair(operands) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some((tx, ty)) = pair(operands) {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix(operands) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => self.show(operands.get(..1).unwrap_or(&[])),
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.next_line();
                self.show(operands.get(..1).unwrap_or(&[]));
            }
            "\"" => {
                if let [aw, ac, text, ..] = operands.as_slice() {
                    self.state.word_spacing = number(aw).unwrap_or(0.0);
                    self.state.char_spacing = number(ac).unwrap_or(0.0);
                    self.next_line();
                    self.show(std::slice::from_ref(text));
                }
            }
            "g" => self.set_fill(operands, 1),
            "rg" => self.set_fill(operands, 3),
            "k" => self.set_fill(operands, 4),
            "sc" | "scn" => self.set_fill(operands, operands.len()),
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = self.tlm * Affine::translate((tx, ty));
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.leading;
        self.move_line(0.0, -leading);
    }

    fn set_fill(&mut self, operands: &[Object], components: usize) {
        let values: Vec<f64> = operands.iter().filter_map(number).collect();
        if values.len() != components {
            return;
        }
        let rgb = match values.as_slice() {
            [gray] => (*gray, *gray, *gray),
            [r, g, b] => (*r, *g, *b),
            [c, m, y, k] => ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)),
            _ => return,
        };
        self.state.fill = Some(rgb_to_hex(rgb.0, rgb.1, rgb.2));
    }

    fn show(&mut self, items: &[Object]) {
        if !self.in_text {
            return;
        }
        let state = &self.state;
        let metrics = self.metrics.get(&state.font).unwrap_or(&FALLBACK_METRICS);
        let size = state.font_size;
        let h_scale = state.h_scale;

        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    for code in metrics.codes(bytes) {
                        let mut spacing = state.char_spacing;
                        if !metrics.two_byte && code == 32 {
                            spacing += state.word_spacing;
                        }
                        advance += (metrics.glyph_width(code) / 1000.0 * size + spacing) * h_scale;
                    }
                    text.push_str(&(self.decode)(&state.font, bytes));
                }
                other => {
                    let Some(adjustment) = number(other) else {
                        continue;
                    };
                    advance -= adjustment / 1000.0 * size * h_scale;
                    if -adjustment > SPACE_THRESHOLD && needs_space(&text) {
                        text.push(' ');
                    }
                }
            }
        }

        let text_to_doc = state.ctm * self.tm;
        self.tm = self.tm * Affine::translate((advance, 0.0));
        if text.is_empty() {
            return;
        }

        let [a, b, c, d, ..] = text_to_doc.as_coeffs();
        let transform = text_to_doc * Affine::new([size * h_scale, 0.0, 0.0, size, 0.0, state.rise]);
        self.runs.push(TextRunInput {
            text,
            width: advance * Vec2::new(a, b).hypot(),
            height: size * Vec2::new(c, d).hypot(),
            transform,
            font_ref: String::from_utf8_lossy(&state.font).to_string(),
            color: state.fill.clone(),
        });
    }
}

/// Whether a word-break adjustment should insert a space after `text`.
fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c),
        None => false,
    }
}

/// Scripts written without spaces between words.
///
/// Korean uses word spaces and is deliberately absent.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(super) fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

pub(super) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn set_number(target: &mut f64, operands: &[Object]) {
    if let Some(value) = operands.first().and_then(number) {
        *target = value;
    }
}

fn pair(operands: &[Object]) -> Option<(f64, f64)> {
    match operands {
        [x, y, ..] => Some((number(x)?, number(y)?)),
        _ => None,
    }
}

fn matrix(operands: &[Object]) -> Option<Affine> {
    if operands.len() < 6 {
        return None;
    }
    let mut coeffs = [0.0; 6];
    for (slot, obj) in coeffs.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(Affine::new(coeffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::approx_eq;
    use lopdf::StringFormat;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn literal(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn name(s: &str) -> Object {
        Object::Name(s.as_bytes().to_vec())
    }

    fn run(ops: Vec<Operation>) -> Vec<TextRunInput> {
        let mut metrics = HashMap::new();
        metrics.insert(b"F1".to_vec(), FontMetrics::simple(32, vec![250.0; 96], 500.0));
        collect_runs(&ops, &metrics, |_, bytes| decode_text_simple(bytes))
    }

    #[test]
    fn test_tm_and_font_size_form_placement() {
        let runs = run(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), Object::Integer(12)]),
            op("Tm", vec![Object::Integer(1), Object::Integer(0), Object::Integer(0), Object::Integer(1), Object::Integer(50), Object::Integer(700)]),
            op("Tj", vec![literal("Hi")]),
            op("ET", vec![]),
        ]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "Hi");
        assert_eq!(runs[0].font_ref, "F1");
        assert!(approx_eq(
            runs[0].transform,
            Affine::new([12.0, 0.0, 0.0, 12.0, 50.0, 700.0]),
            1e-9
        ));
        // Two glyphs of 250/1000 em at 12pt
        assert!((runs[0].width - 6.0).abs() < 1e-9);
        assert!((runs[0].height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_runs_advance_along_the_line() {
        let runs = run(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), Object::Integer(10)]),
            op("Td", vec![Object::Integer(100), Object::Integer(200)]),
            op("Tj", vec![literal("ab")]),
            op("Tj", vec![literal("c")]),
            op("ET", vec![]),
        ]);
        let [.., e, f] = runs[1].transform.as_coeffs();
        assert!((e - 105.0).abs() < 1e-9);
        assert!((f - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_ctm_is_applied_and_restored() {
        let runs = run(vec![
            op("q", vec![]),
            op("cm", vec![Object::Integer(2), Object::Integer(0), Object::Integer(0), Object::Integer(2), Object::Integer(10), Object::Integer(10)]),
            op("BT", vec![]),
            op("Tf", vec![name("F1"), Object::Integer(6)]),
            op("Tj", vec![literal("x")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tj", vec![literal("y")]),
            op("ET", vec![]),
        ]);
        assert!(approx_eq(
            runs[0].transform,
            Affine::new([12.0, 0.0, 0.0, 12.0, 10.0, 10.0]),
            1e-9
        ));
        // Tf inside q/Q is discarded, so the default size applies
        assert!(approx_eq(
            runs[1].transform,
            Affine::new([12.0, 0.0, 0.0, 12.0, 0.0, 0.0]),
            1e-9
        ));
    }

    #[test]
    fn test_tj_array_inserts_word_breaks() {
        let runs = run(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), Object::Integer(12)]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    literal("Hello"),
                    Object::Integer(-300),
                    literal("World"),
                    Object::Integer(-50),
                    literal("!"),
                ])],
            ),
            op("ET", vec![]),
        ]);
        assert_eq!(runs[0].text, "Hello World!");
    }

    #[test]
    fn test_leading_and_next_line() {
        let runs = run(vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), Object::Integer(12)]),
            op("TD", vec![Object::Integer(72), Object::Integer(-14)]),
            op("Tj", vec![literal("one")]),
            op("T*", vec![]),
            op("Tj", vec![literal("two")]),
            op("ET", vec![]),
        ]);
        let [.., e0, f0] = runs[0].transform.as_coeffs();
        let [.., e1, f1] = runs[1].transform.as_coeffs();
        assert_eq!((e0, f0), (72.0, -14.0));
        assert_eq!((e1, f1), (72.0, -28.0));
    }

    #[test]
    fn test_fill_color_tracking() {
        let runs = run(vec![
            op("rg", vec![Object::Real(1.0), Object::Integer(0), Object::Integer(0)]),
            op("BT", vec![]),
            op("Tj", vec![literal("red")]),
            op("ET", vec![]),
        ]);
        assert_eq!(runs[0].color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_text_outside_bt_is_ignored() {
        let runs = run(vec![op("Tj", vec![literal("stray")])]);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_composite_font_codes() {
        let metrics = FontMetrics::composite(1000.0);
        assert_eq!(metrics.codes(&[0x00, 0x41, 0x30]), vec![0x41, 0x30]);
        assert_eq!(metrics.glyph_width(0x41), 1000.0);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0xE9]), "H\u{e9}");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
