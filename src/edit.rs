//! User intents applied to the scene.
//!
//! Every intent targets the current selection. With nothing selected the
//! result is [`EditOutcome::NoTarget`], which is an ordinary state and not an
//! error. Invalid input is reported as [`EditOutcome::Rejected`] and leaves the
//! block exactly as it was.

use serde::{Deserialize, Serialize};

use crate::color::normalize_hex;
use crate::model::{BlockId, TextAlign, TextStyle, ToggleState};
use crate::scene::{ReorderDirection, SceneModel};
use crate::transform::EditState;

/// Step sizes for keyboard nudges, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditConfig {
    /// Distance of a plain arrow-key nudge
    pub step: f64,

    /// Distance of a nudge with the modifier held
    pub coarse_step: f64,
}

impl EditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_coarse_step(mut self, step: f64) -> Self {
        self.coarse_step = step;
        self
    }
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            coarse_step: 5.0,
        }
    }
}

/// Style axes with a two-state toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleAxis {
    Bold,
    Italic,
    Underline,
}

/// A direct overwrite of one text property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "property", content = "value")]
pub enum PropertyEdit {
    FontFamily(String),
    FontSize(f64),
    LineHeight(f64),
    Color(String),
    Background(Option<String>),
    Opacity(f64),
    Alignment(TextAlign),
    Text(String),
}

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    /// Move by `dx`/`dy` steps; `coarse` selects the larger step.
    Nudge { dx: f64, dy: f64, coarse: bool },
    Delete,
    Duplicate,
    Reorder(ReorderDirection),
    SetProperty(PropertyEdit),
    Toggle(StyleAxis),
    /// Absolute rotation in degrees.
    Rotate(f64),
    /// Absolute scale factors.
    SetScale { x: f64, y: f64 },
}

/// Per-frame deltas from a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    DragMove { dx: f64, dy: f64 },
    ResizeMove { dw: f64, dh: f64 },
}

/// Result of applying an intent.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The scene changed.
    Applied,
    /// A new block was created (duplicate).
    Created(BlockId),
    /// The intent was valid but changed nothing.
    Unchanged,
    /// Nothing was selected or captured.
    NoTarget,
    /// The input was invalid; the scene is unchanged.
    Rejected(String),
}

impl EditOutcome {
    /// Whether the scene was modified.
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied | EditOutcome::Created(_))
    }

    fn rejected(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::debug!("Edit rejected: {}", reason);
        EditOutcome::Rejected(reason)
    }
}

/// Applies intents and gestures to a scene.
///
/// Holds the step configuration and the block captured by an in-flight
/// gesture. Only one block can be captured at a time.
#[derive(Debug, Clone, Default)]
pub struct EditController {
    config: EditConfig,
    captured: Option<BlockId>,
}

impl EditController {
    pub fn new(config: EditConfig) -> Self {
        Self {
            config,
            captured: None,
        }
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// The block held by the current gesture.
    pub fn captured(&self) -> Option<BlockId> {
        self.captured
    }

    /// Apply an intent to the selected block.
    pub fn apply(&mut self, scene: &mut SceneModel, intent: EditIntent) -> EditOutcome {
        let Some(id) = scene.selection() else {
            return EditOutcome::NoTarget;
        };
        if scene.block(id).is_none() {
            scene.deselect();
            return EditOutcome::NoTarget;
        }

        match intent {
            EditIntent::Nudge { dx, dy, coarse } => {
                let step = if coarse { self.config.coarse_step } else { self.config.step };
                translate(scene, id, dx * step, dy * step)
            }
            EditIntent::Delete => {
                scene.remove_block(id);
                scene.deselect();
                if self.captured == Some(id) {
                    self.captured = None;
                }
                EditOutcome::Applied
            }
            EditIntent::Duplicate => match scene.duplicate_block(id) {
                Ok(copy) => {
                    scene.select(copy);
                    EditOutcome::Created(copy)
                }
                Err(e) => EditOutcome::rejected(e.to_string()),
            },
            EditIntent::Reorder(direction) => {
                if scene.reorder(id, direction) {
                    EditOutcome::Applied
                } else {
                    EditOutcome::Unchanged
                }
            }
            EditIntent::SetProperty(edit) => set_property(scene, id, edit),
            EditIntent::Toggle(axis) => toggle_style(scene, id, axis),
            EditIntent::Rotate(degrees) => {
                if !degrees.is_finite() {
                    return EditOutcome::rejected(format!("rotation {degrees} is not finite"));
                }
                update_edit(scene, id, |edit| edit.rotation_degrees = degrees)
            }
            EditIntent::SetScale { x, y } => {
                if let Some(reason) = invalid_scale(x).or_else(|| invalid_scale(y)) {
                    return EditOutcome::rejected(reason);
                }
                update_edit(scene, id, |edit| {
                    edit.scale_x = x;
                    edit.scale_y = y;
                })
            }
        }
    }

    /// Capture a block for a pointer gesture and select it.
    ///
    /// Fails while another block is captured.
    pub fn begin_gesture(&mut self, scene: &mut SceneModel, id: BlockId) -> EditOutcome {
        match self.captured {
            Some(current) if current != id => {
                return EditOutcome::rejected(format!("block {current} is already captured"));
            }
            _ => {}
        }
        if !scene.select(id) {
            return EditOutcome::NoTarget;
        }
        self.captured = Some(id);
        EditOutcome::Applied
    }

    /// Feed one frame of the current gesture.
    pub fn gesture(&mut self, scene: &mut SceneModel, event: GestureEvent) -> EditOutcome {
        let Some(id) = self.captured else {
            return EditOutcome::NoTarget;
        };
        let Some(block) = scene.block(id) else {
            self.captured = None;
            return EditOutcome::NoTarget;
        };

        match event {
            GestureEvent::DragMove { dx, dy } => translate(scene, id, dx, dy),
            GestureEvent::ResizeMove { dw, dh } => {
                // At scale 1 the placed box is exactly the local box.
                let local = block.local_size();
                let edit = *block.edit();
                if local.width <= 0.0 || local.height <= 0.0 {
                    return EditOutcome::rejected("block has an empty box");
                }
                let scale_x = edit.scale_x + dw / local.width;
                let scale_y = edit.scale_y + dh / local.height;
                if !(scale_x > 0.0 && scale_y > 0.0) || !scale_x.is_finite() || !scale_y.is_finite() {
                    return EditOutcome::rejected(format!(
                        "resize to scale ({scale_x}, {scale_y}) collapses the block"
                    ));
                }
                update_edit(scene, id, |edit| {
                    edit.scale_x = scale_x;
                    edit.scale_y = scale_y;
                })
            }
        }
    }

    /// Release the captured block.
    pub fn end_gesture(&mut self) -> Option<BlockId> {
        self.captured.take()
    }
}

/// Apply an intent with the default step configuration.
pub fn apply(scene: &mut SceneModel, intent: EditIntent) -> EditOutcome {
    EditController::default().apply(scene, intent)
}

fn translate(scene: &mut SceneModel, id: BlockId, dx: f64, dy: f64) -> EditOutcome {
    if !dx.is_finite() || !dy.is_finite() {
        return EditOutcome::rejected(format!("offset ({dx}, {dy}) is not finite"));
    }
    update_edit(scene, id, |edit| {
        edit.translate_x += dx;
        edit.translate_y += dy;
    })
}

fn update_edit(
    scene: &mut SceneModel,
    id: BlockId,
    f: impl FnOnce(&mut EditState),
) -> EditOutcome {
    let Some(block) = scene.block(id) else {
        return EditOutcome::NoTarget;
    };
    let mut edit = *block.edit();
    f(&mut edit);
    scene.set_edit_state(id, edit);
    EditOutcome::Applied
}

fn invalid_scale(value: f64) -> Option<String> {
    if !value.is_finite() {
        Some(format!("scale {value} is not finite"))
    } else if value == 0.0 {
        Some("scale of 0 collapses the block".to_string())
    } else {
        None
    }
}

fn positive(name: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{name} {value} must be finite and positive"))
    }
}

fn color(value: &str) -> Result<String, String> {
    normalize_hex(value).ok_or_else(|| format!("'{value}' is not a #rgb or #rrggbb color"))
}

fn set_property(scene: &mut SceneModel, id: BlockId, edit: PropertyEdit) -> EditOutcome {
    let Some(block) = scene.block_mut(id) else {
        return EditOutcome::NoTarget;
    };
    let Some(text) = block.text_mut() else {
        return EditOutcome::rejected("property edits apply to text blocks only");
    };
    let previous_size = text.font_size;

    let result = match edit {
        PropertyEdit::FontFamily(family) => {
            let family = family.trim();
            if family.is_empty() {
                Err("font family is empty".to_string())
            } else {
                text.style.font_family = family.to_string();
                Ok(())
            }
        }
        PropertyEdit::FontSize(size) => positive("font size", size).map(|size| text.font_size = size),
        PropertyEdit::LineHeight(height) => {
            positive("line height", height).map(|height| text.style.line_height = height)
        }
        PropertyEdit::Color(value) => color(&value).map(|value| text.style.color = value),
        PropertyEdit::Background(None) => {
            text.style.background = None;
            Ok(())
        }
        PropertyEdit::Background(Some(value)) => {
            color(&value).map(|value| text.style.background = Some(value))
        }
        PropertyEdit::Opacity(opacity) => {
            if opacity.is_finite() {
                text.style.opacity = opacity.clamp(0.0, 1.0);
                Ok(())
            } else {
                Err(format!("opacity {opacity} is not finite"))
            }
        }
        PropertyEdit::Alignment(alignment) => {
            text.style.alignment = alignment;
            Ok(())
        }
        PropertyEdit::Text(value) => {
            text.text = value;
            Ok(())
        }
    };

    if text.font_size != previous_size {
        block.fit_box_to_font(previous_size);
    }

    match result {
        Ok(()) => EditOutcome::Applied,
        Err(reason) => EditOutcome::rejected(reason),
    }
}

fn toggle_style(scene: &mut SceneModel, id: BlockId, axis: StyleAxis) -> EditOutcome {
    let Some(text) = scene.block_mut(id).and_then(|block| block.text_mut()) else {
        return EditOutcome::rejected("style toggles apply to text blocks only");
    };
    let state = toggle_axis(&mut text.style, axis);
    log::trace!("{:?} toggled to {:?} on block {}", axis, state, id);
    EditOutcome::Applied
}

fn toggle_axis(style: &mut TextStyle, axis: StyleAxis) -> ToggleState {
    match axis {
        StyleAxis::Bold => style.weight.toggle(),
        StyleAxis::Italic => style.slant.toggle(),
        StyleAxis::Underline => style.underline.toggle(),
    }
}
