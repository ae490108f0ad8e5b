//! Text styling with document-seeded toggles.

use serde::{Deserialize, Serialize};

/// Numeric font weight (CSS scale, 100-900).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Semi-bold and heavier count as bold.
    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontSlant {
    /// Whether the slant renders slanted.
    pub fn is_slanted(self) -> bool {
        !matches!(self, FontSlant::Normal)
    }
}

/// Horizontal text alignment inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Which side of a [`Toggle`] is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    /// The value read from the source document
    #[default]
    Original,
    /// The alternate value
    Engaged,
}

/// A two-state style axis seeded from the source document.
///
/// `original` is the document's own value and is never replaced by a generic
/// default. `engaged` is chosen once when the toggle is seeded: the "active"
/// style (bold, italic, underline), or the plain variant if the document
/// already uses the active style. Toggling twice always lands back on
/// `original`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggle<T> {
    original: T,
    engaged: T,
    state: ToggleState,
}

impl<T: Clone + PartialEq> Toggle<T> {
    /// Seed a toggle from the document value and the alternate to flip to.
    pub fn seeded(original: T, engaged: T) -> Self {
        Self {
            original,
            engaged,
            state: ToggleState::Original,
        }
    }

    /// The value currently in effect.
    pub fn current(&self) -> &T {
        match self.state {
            ToggleState::Original => &self.original,
            ToggleState::Engaged => &self.engaged,
        }
    }

    /// The value read from the source document.
    pub fn original(&self) -> &T {
        &self.original
    }

    /// Current state.
    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Flip to the other value and return the new state.
    pub fn toggle(&mut self) -> ToggleState {
        self.state = match self.state {
            ToggleState::Original => ToggleState::Engaged,
            ToggleState::Engaged => ToggleState::Original,
        };
        self.state
    }

    /// Return to the document value.
    pub fn reset(&mut self) {
        self.state = ToggleState::Original;
    }
}

impl Toggle<FontWeight> {
    /// Bold toggle: flips to bold, or to normal when the document is bold.
    pub fn weight(original: FontWeight) -> Self {
        let engaged = if original.is_bold() {
            FontWeight::NORMAL
        } else {
            FontWeight::BOLD
        };
        Self::seeded(original, engaged)
    }
}

impl Toggle<FontSlant> {
    /// Italic toggle: flips to italic, or upright when the document is slanted.
    pub fn slant(original: FontSlant) -> Self {
        let engaged = if original.is_slanted() {
            FontSlant::Normal
        } else {
            FontSlant::Italic
        };
        Self::seeded(original, engaged)
    }
}

impl Toggle<bool> {
    /// Underline toggle.
    pub fn underline(original: bool) -> Self {
        Self::seeded(original, !original)
    }
}

/// Resolved style of a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family in effect
    pub font_family: String,

    /// Font family read from the document
    pub original_family: String,

    /// Bold axis
    pub weight: Toggle<FontWeight>,

    /// Italic axis
    pub slant: Toggle<FontSlant>,

    /// Underline axis
    pub underline: Toggle<bool>,

    /// Text color (hex, e.g. "#1a2b3c")
    pub color: String,

    /// Text color read from the document
    pub original_color: String,

    /// Block background color, if any
    pub background: Option<String>,

    /// Opacity in `0.0..=1.0`
    pub opacity: f64,

    /// Horizontal alignment
    pub alignment: TextAlign,

    /// Line height as a multiple of the font size
    pub line_height: f64,
}

impl TextStyle {
    /// Seed a style from document values.
    pub fn from_document(
        family: impl Into<String>,
        weight: FontWeight,
        slant: FontSlant,
        color: impl Into<String>,
    ) -> Self {
        let family = family.into();
        let color = color.into();
        Self {
            font_family: family.clone(),
            original_family: family,
            weight: Toggle::weight(weight),
            slant: Toggle::slant(slant),
            underline: Toggle::underline(false),
            color: color.clone(),
            original_color: color,
            background: None,
            opacity: 1.0,
            alignment: TextAlign::Left,
            line_height: 1.0,
        }
    }

    /// Effective weight.
    pub fn weight(&self) -> FontWeight {
        *self.weight.current()
    }

    /// Effective slant.
    pub fn slant(&self) -> FontSlant {
        *self.slant.current()
    }

    /// Whether the text is underlined.
    pub fn is_underlined(&self) -> bool {
        *self.underline.current()
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::from_document("sans-serif", FontWeight::NORMAL, FontSlant::Normal, "#000000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_toggle_returns_to_document_value() {
        let mut weight = Toggle::weight(FontWeight(300));
        assert_eq!(*weight.current(), FontWeight(300));
        weight.toggle();
        assert_eq!(*weight.current(), FontWeight::BOLD);
        weight.toggle();
        assert_eq!(*weight.current(), FontWeight(300));
    }

    #[test]
    fn test_bold_document_toggles_to_normal() {
        let mut weight = Toggle::weight(FontWeight(800));
        assert_eq!(weight.toggle(), ToggleState::Engaged);
        assert_eq!(*weight.current(), FontWeight::NORMAL);
        assert_eq!(weight.toggle(), ToggleState::Original);
        assert_eq!(*weight.current(), FontWeight(800));
    }

    #[test]
    fn test_slant_toggle() {
        let mut slant = Toggle::slant(FontSlant::Oblique);
        slant.toggle();
        assert_eq!(*slant.current(), FontSlant::Normal);
        slant.reset();
        assert_eq!(*slant.current(), FontSlant::Oblique);
    }

    #[test]
    fn test_underline_toggle() {
        let mut underline = Toggle::underline(false);
        underline.toggle();
        assert!(*underline.current());
        assert!(!*underline.original());
    }

    #[test]
    fn test_default_style() {
        let style = TextStyle::default();
        assert_eq!(style.font_family, "sans-serif");
        assert_eq!(style.weight(), FontWeight::NORMAL);
        assert!(!style.is_underlined());
        assert_eq!(style.opacity, 1.0);
    }
}
