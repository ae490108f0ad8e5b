//! Coordinate systems: document space, viewport space, and block-local space.
//!
//! All maps are `kurbo::Affine` values with coefficients `[a, b, c, d, e, f]`
//! mapping `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`. `A * B` applies `B`
//! first, which is the order used when a text run's placement matrix is
//! expressed in document space and then mapped through the viewport.

use serde::{Deserialize, Serialize};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// CSS pixels per PDF point at 100% zoom.
pub const DEFAULT_RENDER_SCALE: f64 = 96.0 / 72.0;

/// Points per CSS pixel.
pub const PX_TO_PT: f64 = 72.0 / 96.0;

/// The fixed placement of a block, derived once from the source document.
///
/// A block's base never changes after extraction; user edits live in
/// [`crate::transform::EditState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseTransform(Affine);

impl BaseTransform {
    /// Wrap an affine map as a base transform.
    pub fn new(affine: Affine) -> Self {
        Self(affine)
    }

    /// Identity axes with the given translation.
    pub fn from_translation(x: f64, y: f64) -> Self {
        Self(Affine::new([1.0, 0.0, 0.0, 1.0, x, y]))
    }

    /// The underlying affine map.
    pub fn affine(&self) -> Affine {
        self.0
    }

    /// Raw `[a, b, c, d, e, f]` coefficients.
    pub fn coeffs(&self) -> [f64; 6] {
        self.0.as_coeffs()
    }

    /// Image of the local X unit vector, `(a, b)`.
    pub fn x_axis(&self) -> Vec2 {
        let [a, b, ..] = self.coeffs();
        Vec2::new(a, b)
    }

    /// Image of the local Y unit vector, `(c, d)`.
    pub fn y_axis(&self) -> Vec2 {
        let [_, _, c, d, ..] = self.coeffs();
        Vec2::new(c, d)
    }

    /// Translation part, `(e, f)`.
    pub fn translation(&self) -> Vec2 {
        let [.., e, f] = self.coeffs();
        Vec2::new(e, f)
    }

    /// Length of the Y axis vector.
    ///
    /// For text this is the rendered font height in pixels, and it stays
    /// correct when the run is rotated or sheared.
    pub fn font_height(&self) -> f64 {
        self.y_axis().hypot()
    }

    /// Whether both axes are the unit vectors.
    pub fn has_identity_axes(&self) -> bool {
        let [a, b, c, d, ..] = self.coeffs();
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }
}

/// A page's coordinate-to-pixel mapping at a given rendering scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Rendering scale (pixels per point)
    pub scale: f64,

    /// Viewport width in pixels
    pub width: f64,

    /// Viewport height in pixels
    pub height: f64,

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Document space to viewport pixels
    pub transform: Affine,
}

impl Viewport {
    /// Build the standard viewport for a page box.
    ///
    /// Document space has Y pointing up; viewport space has Y pointing down,
    /// so the resulting map flips Y. `rotation` follows the page's `/Rotate`
    /// entry and is normalised to a multiple of 90.
    pub fn for_page(media_box: Rect, scale: f64, rotation: i32) -> Self {
        let rotation = rotation.rem_euclid(360) / 90 * 90;
        let (ra, rb, rc, rd) = match rotation {
            90 => (0.0, 1.0, 1.0, 0.0),
            180 => (-1.0, 0.0, 0.0, 1.0),
            270 => (0.0, -1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, -1.0),
        };

        let center_x = (media_box.x0 + media_box.x1) / 2.0;
        let center_y = (media_box.y0 + media_box.y1) / 2.0;
        let box_w = (media_box.x1 - media_box.x0).abs();
        let box_h = (media_box.y1 - media_box.y0).abs();

        let (offset_x, offset_y, width, height) = if ra == 0.0 {
            (
                (center_y - media_box.y0).abs() * scale,
                (center_x - media_box.x0).abs() * scale,
                box_h * scale,
                box_w * scale,
            )
        } else {
            (
                (center_x - media_box.x0).abs() * scale,
                (center_y - media_box.y0).abs() * scale,
                box_w * scale,
                box_h * scale,
            )
        };

        let transform = Affine::new([
            ra * scale,
            rb * scale,
            rc * scale,
            rd * scale,
            offset_x - ra * scale * center_x - rc * scale * center_y,
            offset_y - rb * scale * center_x - rd * scale * center_y,
        ]);

        Self {
            scale,
            width,
            height,
            rotation: rotation as u16,
            transform,
        }
    }

    /// An unflipped viewport that only scales.
    pub fn scaled(scale: f64, width: f64, height: f64) -> Self {
        Self {
            scale,
            width: width * scale,
            height: height * scale,
            rotation: 0,
            transform: Affine::scale(scale),
        }
    }

    /// Map a document-space point into viewport pixels.
    pub fn to_viewport(&self, point: Point) -> Point {
        self.transform * point
    }

    /// Map a viewport pixel back into document space.
    pub fn to_document(&self, point: Point) -> Point {
        self.transform.inverse() * point
    }

    /// Viewport size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Whether two affine maps agree within `eps` on every coefficient.
pub fn approx_eq(lhs: Affine, rhs: Affine, eps: f64) -> bool {
    lhs.as_coeffs()
        .iter()
        .zip(rhs.as_coeffs().iter())
        .all(|(l, r)| (l - r).abs() <= eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_base_transform_accessors() {
        let base = BaseTransform::new(Affine::new([2.0, 0.5, -0.25, 3.0, 10.0, 20.0]));
        assert_eq!(base.x_axis(), Vec2::new(2.0, 0.5));
        assert_eq!(base.y_axis(), Vec2::new(-0.25, 3.0));
        assert_eq!(base.translation(), Vec2::new(10.0, 20.0));
        assert!(!base.has_identity_axes());
        assert!(BaseTransform::from_translation(1.0, 2.0).has_identity_axes());
    }

    #[test]
    fn test_font_height_under_rotation() {
        // 12pt text rotated 30 degrees
        let (s, c) = 30f64.to_radians().sin_cos();
        let base = BaseTransform::new(Affine::new([12.0 * c, 12.0 * s, -12.0 * s, 12.0 * c, 0.0, 0.0]));
        assert!((base.font_height() - 12.0).abs() < EPS);
    }

    #[test]
    fn test_viewport_flips_y() {
        let vp = Viewport::for_page(Rect::new(0.0, 0.0, 612.0, 792.0), 1.0, 0);
        assert_eq!(vp.width, 612.0);
        assert_eq!(vp.height, 792.0);
        let p = vp.to_viewport(Point::new(0.0, 792.0));
        assert!((p.x - 0.0).abs() < EPS && (p.y - 0.0).abs() < EPS);
        let p = vp.to_viewport(Point::new(100.0, 0.0));
        assert!((p.x - 100.0).abs() < EPS && (p.y - 792.0).abs() < EPS);
    }

    #[test]
    fn test_viewport_rotated_swaps_dimensions() {
        let vp = Viewport::for_page(Rect::new(0.0, 0.0, 612.0, 792.0), 2.0, 90);
        assert_eq!(vp.rotation, 90);
        assert_eq!(vp.width, 792.0 * 2.0);
        assert_eq!(vp.height, 612.0 * 2.0);

        // The document origin lands on the top-left corner of a 90 degree page.
        let p = vp.to_viewport(Point::new(0.0, 0.0));
        assert!(p.x.abs() < EPS && p.y.abs() < EPS);
    }

    #[test]
    fn test_viewport_negative_rotation_normalised() {
        let vp = Viewport::for_page(Rect::new(0.0, 0.0, 100.0, 200.0), 1.0, -90);
        assert_eq!(vp.rotation, 270);
    }

    #[test]
    fn test_viewport_round_trip_point() {
        let vp = Viewport::for_page(Rect::new(0.0, 0.0, 595.0, 842.0), DEFAULT_RENDER_SCALE, 0);
        let p = Point::new(123.0, 456.0);
        let back = vp.to_document(vp.to_viewport(p));
        assert!((back.x - p.x).abs() < 1e-6 && (back.y - p.y).abs() < 1e-6);
    }
}
