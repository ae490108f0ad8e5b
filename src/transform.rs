//! Composition of a block's base transform with its edit state.
//!
//! The composite is built by rotating the base axis vectors, then scaling
//! each rotated axis, then adding the drag translation to the base
//! translation:
//!
//! ```text
//! x' = scale_x * R(theta) * (a, b)
//! y' = scale_y * R(theta) * (c, d)
//! t' = (e, f) + (translate_x, translate_y)
//! ```
//!
//! Rotating the basis (rather than a bounding box) keeps sheared or
//! non-orthogonal source axes consistent with each other, and scaling after
//! rotation means resize handles act along the block's visible edges.

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine, BaseTransform, Point, Size, Vec2};

/// User-controlled deltas layered on top of a block's base transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditState {
    /// Horizontal drag offset in viewport pixels
    pub translate_x: f64,

    /// Vertical drag offset in viewport pixels
    pub translate_y: f64,

    /// Rotation applied to the block axes, in degrees
    pub rotation_degrees: f64,

    /// Scale along the rotated X axis
    pub scale_x: f64,

    /// Scale along the rotated Y axis
    pub scale_y: f64,
}

impl EditState {
    /// The no-op edit every block starts with.
    pub const IDENTITY: EditState = EditState {
        translate_x: 0.0,
        translate_y: 0.0,
        rotation_degrees: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Create an edit that only translates.
    pub fn translated(dx: f64, dy: f64) -> Self {
        Self {
            translate_x: dx,
            translate_y: dy,
            ..Self::IDENTITY
        }
    }

    /// Set rotation in degrees.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Set scale factors.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Whether this edit leaves the base transform untouched.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// The drag translation as a vector.
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }
}

impl Default for EditState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Frame in which scale factors are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFrame {
    /// Scale along the block's own rotated axes (resize handles follow the
    /// block's visible edges).
    #[default]
    Local,

    /// Scale along the fixed screen axes after rotation.
    Screen,
}

/// Compose a base transform with an edit state.
///
/// With [`EditState::IDENTITY`] this returns exactly the base transform.
pub fn compose(base: &BaseTransform, edit: &EditState) -> Affine {
    compose_with(base, edit, ScaleFrame::Local)
}

/// Compose using an explicit scale frame.
///
/// [`ScaleFrame::Screen`] exists to compare against: it agrees with
/// [`ScaleFrame::Local`] only when the rotation is a multiple of 180 degrees
/// or the scale is uniform.
pub fn compose_with(base: &BaseTransform, edit: &EditState, frame: ScaleFrame) -> Affine {
    let x_axis = rotate(base.x_axis(), edit.rotation_degrees);
    let y_axis = rotate(base.y_axis(), edit.rotation_degrees);

    let (x_axis, y_axis) = match frame {
        ScaleFrame::Local => (x_axis * edit.scale_x, y_axis * edit.scale_y),
        ScaleFrame::Screen => (
            Vec2::new(x_axis.x * edit.scale_x, x_axis.y * edit.scale_y),
            Vec2::new(y_axis.x * edit.scale_x, y_axis.y * edit.scale_y),
        ),
    };

    let translation = base.translation() + edit.translation();

    Affine::new([
        x_axis.x,
        x_axis.y,
        y_axis.x,
        y_axis.y,
        translation.x,
        translation.y,
    ])
}

/// Rotate a vector by `degrees` using the standard trigonometric rotation.
///
/// A rotation of exactly zero returns the input unchanged, so identity edits
/// never pick up floating point noise from `sin`/`cos`.
pub fn rotate(v: Vec2, degrees: f64) -> Vec2 {
    if degrees == 0.0 {
        return v;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Corners of a block's local box mapped through a composite transform.
///
/// Order: origin, +X, +X+Y, +Y.
pub fn block_outline(composite: Affine, local_size: Size) -> [Point; 4] {
    [
        composite * Point::new(0.0, 0.0),
        composite * Point::new(local_size.width, 0.0),
        composite * Point::new(local_size.width, local_size.height),
        composite * Point::new(0.0, local_size.height),
    ]
}

/// Whether `point` falls inside the transformed local box.
pub fn outline_contains(composite: Affine, local_size: Size, point: Point) -> bool {
    if composite.determinant() == 0.0 {
        return false;
    }
    let local = composite.inverse() * point;
    (0.0..=local_size.width).contains(&local.x) && (0.0..=local_size.height).contains(&local.y)
}
