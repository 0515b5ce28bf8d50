//! View-to-page coordinate transform
//!
//! The rendering surface places a page on screen at some zoom and pan offset.
//! Pointer events arrive in view coordinates, while every measurement is
//! taken in page space. [`PageTransform`] keeps the mapping between the two
//! current and notifies subscribers whenever it is recomputed.
//!
//! Page rotation is tracked alongside the mapping but is not folded into the
//! affine matrix; overlay rendering applies it the same way the page content
//! is rotated.

use crate::geometry::{Point2D, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page rotation, restricted to quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl PageRotation {
    /// Rotation from a degree value; any multiple of 90 is accepted
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Rotation in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Rotation in radians, as consumed by the rendering surface
    pub fn radians(self) -> f64 {
        f64::from(self.degrees()).to_radians()
    }

    /// Whether the page's width and height are swapped on screen
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Affine map from view coordinates to page space
///
/// `page = (view - translate) / scale` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    scale_x: f64,
    scale_y: f64,
    translate_x: f64,
    translate_y: f64,
}

impl ViewTransform {
    /// The identity mapping (view space is page space)
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Create a transform from explicit components
    ///
    /// Components that would make the map non-invertible collapse the
    /// transform to the identity.
    pub fn new(scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64) -> Self {
        let candidate = Self {
            scale_x,
            scale_y,
            translate_x,
            translate_y,
        };
        if candidate.is_valid() {
            candidate
        } else {
            tracing::debug!(?candidate, "degenerate view transform, using identity");
            Self::IDENTITY
        }
    }

    /// Derive the transform from the page's intrinsic bounds and the
    /// rectangle it currently occupies on screen
    ///
    /// A quarter-turned page occupies a rectangle with its extents swapped,
    /// so the view width is measured against the page height and vice versa.
    pub fn from_placement(intrinsic: &Rect, projected: &Rect, rotation: PageRotation) -> Self {
        if !intrinsic.has_area() || !projected.has_area() {
            return Self::IDENTITY;
        }
        let (page_width, page_height) = if rotation.is_quarter_turn() {
            (intrinsic.height, intrinsic.width)
        } else {
            (intrinsic.width, intrinsic.height)
        };
        let scale_x = projected.width / page_width;
        let scale_y = projected.height / page_height;
        let page_origin = intrinsic.origin();
        let view_origin = projected.origin();
        Self::new(
            scale_x,
            scale_y,
            view_origin.x - page_origin.x * scale_x,
            view_origin.y - page_origin.y * scale_y,
        )
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y
    }

    /// Scales are finite and positive, translations finite
    pub fn is_valid(&self) -> bool {
        self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.scale_x > 0.0
            && self.scale_y > 0.0
            && self.translate_x.is_finite()
            && self.translate_y.is_finite()
    }

    /// Map a view coordinate into page space
    pub fn to_page(&self, view: Point2D) -> Point2D {
        Point2D::new(
            (view.x - self.translate_x) / self.scale_x,
            (view.y - self.translate_y) / self.scale_y,
        )
    }

    /// Map a page-space coordinate back into view space
    pub fn to_view(&self, page: Point2D) -> Point2D {
        Point2D::new(
            page.x * self.scale_x + self.translate_x,
            page.y * self.scale_y + self.translate_y,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Immutable view of the transform at one recomputation
///
/// `version` increases monotonically with every recomputation so consumers
/// can discard stale notifications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub transform: ViewTransform,
    pub rotation: PageRotation,
    pub version: u64,
}

impl TransformSnapshot {
    /// Rotation in radians
    pub fn rotation_radians(&self) -> f64 {
        self.rotation.radians()
    }
}

/// Subscription handle returned by [`PageTransform::subscribe`]
pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&TransformSnapshot) + Send>;

/// Owner of the current view-to-page mapping for one page
pub struct PageTransform {
    /// Page bounds in page space (the crop box)
    intrinsic: Rect,
    /// Where the page currently sits in view space
    projected: Rect,
    rotation: PageRotation,
    snapshot: TransformSnapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl PageTransform {
    /// Create a transform for a page shown at its natural size
    pub fn new(intrinsic: Rect) -> Self {
        let mut page_transform = Self {
            intrinsic,
            projected: intrinsic,
            rotation: PageRotation::Deg0,
            snapshot: TransformSnapshot {
                transform: ViewTransform::IDENTITY,
                rotation: PageRotation::Deg0,
                version: 0,
            },
            listeners: Vec::new(),
            next_subscription: 1,
        };
        page_transform.recompute();
        page_transform
    }

    /// Current transform state
    pub fn snapshot(&self) -> TransformSnapshot {
        self.snapshot
    }

    /// Current view-to-page mapping
    pub fn transform(&self) -> ViewTransform {
        self.snapshot.transform
    }

    pub fn intrinsic_bounds(&self) -> Rect {
        self.intrinsic
    }

    pub fn projected_rect(&self) -> Rect {
        self.projected
    }

    pub fn rotation(&self) -> PageRotation {
        self.rotation
    }

    /// Replace the page bounds (a new page was loaded)
    pub fn set_intrinsic_bounds(&mut self, intrinsic: Rect) {
        self.intrinsic = intrinsic;
        self.recompute();
    }

    /// Replace the on-screen rectangle (zoom or pan changed)
    pub fn set_projected_rect(&mut self, projected: Rect) {
        self.projected = projected;
        self.recompute();
    }

    /// Change the page rotation
    pub fn set_rotation(&mut self, rotation: PageRotation) {
        self.rotation = rotation;
        self.recompute();
    }

    /// Apply a placement and rotation together, notifying once
    pub fn update(&mut self, projected: Rect, rotation: PageRotation) {
        self.projected = projected;
        self.rotation = rotation;
        self.recompute();
    }

    /// Move the page on screen by a view-space offset
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.projected.x += dx;
        self.projected.y += dy;
        self.recompute();
    }

    /// Zoom by `factor` keeping the view point `anchor` fixed on screen
    pub fn zoom_about(&mut self, factor: f64, anchor: Point2D) {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::warn!(factor, "ignoring non-positive zoom factor");
            return;
        }
        self.projected = Rect::new(
            anchor.x - (anchor.x - self.projected.x) * factor,
            anchor.y - (anchor.y - self.projected.y) * factor,
            self.projected.width * factor,
            self.projected.height * factor,
        );
        self.recompute();
    }

    /// Register a callback fired after every recomputation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TransformSnapshot) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn recompute(&mut self) {
        // The snapshot is replaced whole before anyone is told about it.
        self.snapshot = TransformSnapshot {
            transform: ViewTransform::from_placement(&self.intrinsic, &self.projected, self.rotation),
            rotation: self.rotation,
            version: self.snapshot.version + 1,
        };
        tracing::trace!(snapshot = ?self.snapshot, "page transform recomputed");

        let snapshot = self.snapshot;
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

impl fmt::Debug for PageTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTransform")
            .field("intrinsic", &self.intrinsic)
            .field("projected", &self.projected)
            .field("rotation", &self.rotation)
            .field("snapshot", &self.snapshot)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn letter() -> Rect {
        Rect::from_size(612.0, 792.0)
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(PageRotation::from_degrees(0), Some(PageRotation::Deg0));
        assert_eq!(PageRotation::from_degrees(90), Some(PageRotation::Deg90));
        assert_eq!(PageRotation::from_degrees(450), Some(PageRotation::Deg90));
        assert_eq!(PageRotation::from_degrees(-90), Some(PageRotation::Deg270));
        assert_eq!(PageRotation::from_degrees(45), None);
    }

    #[test]
    fn test_rotation_radians() {
        assert_eq!(PageRotation::Deg0.radians(), 0.0);
        assert!((PageRotation::Deg90.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((PageRotation::Deg180.radians() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_natural_size_is_identity() {
        let page_transform = PageTransform::new(letter());
        assert_eq!(page_transform.transform(), ViewTransform::IDENTITY);
        assert_eq!(page_transform.snapshot().version, 1);
    }

    #[test]
    fn test_zoomed_and_panned_placement() {
        let transform =
            ViewTransform::from_placement(
                &letter(),
                &Rect::new(100.0, 50.0, 1224.0, 1584.0),
                PageRotation::Deg0,
            );
        assert_eq!(transform.scale_x(), 2.0);
        assert_eq!(transform.scale_y(), 2.0);
        assert_eq!(transform.translate_x(), 100.0);
        assert_eq!(transform.translate_y(), 50.0);

        let page = transform.to_page(Point2D::new(300.0, 250.0));
        assert_eq!(page, Point2D::new(100.0, 100.0));
        assert_eq!(transform.to_view(page), Point2D::new(300.0, 250.0));
    }

    #[test]
    fn test_offset_crop_box() {
        // Crop box that does not start at the page origin
        let intrinsic = Rect::new(36.0, 36.0, 540.0, 720.0);
        let transform = ViewTransform::from_placement(
            &intrinsic,
            &Rect::new(0.0, 0.0, 270.0, 360.0),
            PageRotation::Deg0,
        );
        assert_eq!(transform.to_page(Point2D::new(0.0, 0.0)), Point2D::new(36.0, 36.0));
        assert_eq!(
            transform.to_page(Point2D::new(270.0, 360.0)),
            Point2D::new(576.0, 756.0)
        );
    }

    #[test]
    fn test_degenerate_placement_is_identity() {
        let empty = Rect::from_size(0.0, 0.0);
        assert_eq!(
            ViewTransform::from_placement(&empty, &letter(), PageRotation::Deg0),
            ViewTransform::IDENTITY
        );
        assert_eq!(
            ViewTransform::from_placement(&letter(), &empty, PageRotation::Deg90),
            ViewTransform::IDENTITY
        );
        assert_eq!(
            ViewTransform::new(0.0, 1.0, 0.0, 0.0),
            ViewTransform::IDENTITY
        );
        assert_eq!(
            ViewTransform::new(1.0, 1.0, f64::INFINITY, 0.0),
            ViewTransform::IDENTITY
        );
    }

    #[test]
    fn test_zoom_about_keeps_anchor_fixed() {
        let mut page_transform = PageTransform::new(letter());
        let anchor = Point2D::new(200.0, 300.0);
        let before = page_transform.transform().to_page(anchor);

        page_transform.zoom_about(2.5, anchor);
        let after = page_transform.transform().to_page(anchor);

        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((page_transform.transform().scale_x() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_zoom_is_ignored() {
        let mut page_transform = PageTransform::new(letter());
        let version = page_transform.snapshot().version;
        page_transform.zoom_about(0.0, Point2D::new(0.0, 0.0));
        page_transform.zoom_about(f64::NAN, Point2D::new(0.0, 0.0));
        assert_eq!(page_transform.snapshot().version, version);
    }

    #[test]
    fn test_pan_shifts_translation() {
        let mut page_transform = PageTransform::new(letter());
        page_transform.pan_by(-40.0, 25.0);
        let transform = page_transform.transform();
        assert_eq!(transform.translate_x(), -40.0);
        assert_eq!(transform.translate_y(), 25.0);
        assert_eq!(transform.to_page(Point2D::new(-40.0, 25.0)), Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_subscribers_notified_in_order() {
        let mut page_transform = PageTransform::new(letter());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = page_transform.subscribe(move |snapshot| {
            sink.lock().unwrap().push((snapshot.version, snapshot.rotation));
        });

        page_transform.set_projected_rect(Rect::from_size(1224.0, 1584.0));
        page_transform.set_rotation(PageRotation::Deg90);
        page_transform.update(Rect::from_size(306.0, 396.0), PageRotation::Deg180);

        assert!(page_transform.unsubscribe(id));
        assert!(!page_transform.unsubscribe(id));
        page_transform.pan_by(1.0, 1.0);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (2, PageRotation::Deg0),
                (3, PageRotation::Deg90),
                (4, PageRotation::Deg180),
            ]
        );
    }

    #[test]
    fn test_rotation_not_folded_into_matrix() {
        let mut page_transform = PageTransform::new(letter());
        page_transform.set_projected_rect(Rect::from_size(1224.0, 1584.0));
        let before = page_transform.transform();
        page_transform.set_rotation(PageRotation::Deg180);
        assert_eq!(page_transform.transform(), before);
        assert!((page_transform.snapshot().rotation_radians() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_quarter_turn_keeps_uniform_scale() {
        let mut page_transform = PageTransform::new(letter());
        page_transform.update(Rect::from_size(792.0, 612.0), PageRotation::Deg90);
        assert_eq!(page_transform.intrinsic_bounds(), letter());
        assert_eq!(page_transform.projected_rect(), Rect::from_size(792.0, 612.0));

        let transform = page_transform.transform();
        assert!((transform.scale_x() - 1.0).abs() < 1e-12);
        assert!((transform.scale_y() - 1.0).abs() < 1e-12);

        // A 100 pt drag at 100% zoom measures 100 pt along either axis
        let origin = transform.to_page(Point2D::new(0.0, 0.0));
        let across = transform.to_page(Point2D::new(100.0, 0.0));
        let down = transform.to_page(Point2D::new(0.0, 100.0));
        assert!((origin.distance_to(&across) - 100.0).abs() < 1e-9);
        assert!((origin.distance_to(&down) - 100.0).abs() < 1e-9);

        page_transform.update(Rect::from_size(1584.0, 1224.0), PageRotation::Deg270);
        let transform = page_transform.transform();
        assert!((transform.scale_x() - 2.0).abs() < 1e-12);
        assert!((transform.scale_y() - 2.0).abs() < 1e-12);
    }
}
