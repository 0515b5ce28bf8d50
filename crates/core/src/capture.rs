//! Point capture state machine
//!
//! Clicks are captured two at a time: the first click of a segment is held as
//! a pending start point, the second completes the segment and both endpoints
//! are appended. The completed endpoint immediately becomes the pending start
//! of the next segment, so the drawn path stays continuous even though the
//! stored sequence is a list of independent pairs.

use crate::geometry::Point2D;
use serde::{Deserialize, Serialize};

/// Capture mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureMode {
    #[default]
    Idle,
    Capturing,
}

/// Outcome of a click fed into the capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Not capturing, click dropped
    Ignored,
    /// Held as the start of the next segment
    SegmentStarted(Point2D),
    /// A segment was completed and both endpoints appended
    SegmentCompleted { start: Point2D, end: Point2D },
}

/// In-progress point buffer for the active takeoff
#[derive(Debug, Clone, Default)]
pub struct PointCapture {
    mode: CaptureMode,
    points: Vec<Point2D>,
    pending_first_click: Option<Point2D>,
    /// Last pointer position while a segment is open
    cursor: Option<Point2D>,
}

impl PointCapture {
    /// Create an idle capture
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn is_capturing(&self) -> bool {
        self.mode == CaptureMode::Capturing
    }

    /// Captured points in insertion order
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn pending_first_click(&self) -> Option<Point2D> {
        self.pending_first_click
    }

    /// Begin a fresh capture, discarding anything left over
    pub fn start(&mut self) {
        self.clear();
        self.mode = CaptureMode::Capturing;
        tracing::debug!("point capture started");
    }

    /// Feed a click in page space
    pub fn click(&mut self, point: Point2D) -> ClickOutcome {
        if !self.is_capturing() {
            return ClickOutcome::Ignored;
        }
        if !point.is_finite() {
            tracing::warn!(?point, "ignoring non-finite click");
            return ClickOutcome::Ignored;
        }

        match self.pending_first_click.replace(point) {
            None => ClickOutcome::SegmentStarted(point),
            Some(start) => {
                self.points.push(start);
                self.points.push(point);
                self.cursor = None;
                ClickOutcome::SegmentCompleted { start, end: point }
            }
        }
    }

    /// Track the pointer for the rubber-band preview
    ///
    /// Only tracked while a segment is open.
    pub fn pointer_moved(&mut self, point: Point2D) {
        if self.is_capturing() && self.pending_first_click.is_some() && point.is_finite() {
            self.cursor = Some(point);
        }
    }

    /// Ephemeral segment from the pending click to the pointer
    pub fn rubber_band(&self) -> Option<(Point2D, Point2D)> {
        Some((self.pending_first_click?, self.cursor?))
    }

    /// Completed segments; a trailing unmatched point is left out
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.points.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Clear points and pending state but keep capturing
    pub fn reset(&mut self) {
        self.clear();
        tracing::debug!(mode = ?self.mode, "point capture reset");
    }

    /// Stop capturing and drop uncommitted points
    pub fn cancel(&mut self) {
        self.clear();
        self.mode = CaptureMode::Idle;
        tracing::debug!("point capture cancelled");
    }

    /// Stop capturing and hand back the captured points
    ///
    /// A pending first click that never got its second click is not part of
    /// the result.
    pub fn finish(&mut self) -> Vec<Point2D> {
        let points = std::mem::take(&mut self.points);
        self.clear();
        self.mode = CaptureMode::Idle;
        points
    }

    fn clear(&mut self) {
        self.points.clear();
        self.pending_first_click = None;
        self.cursor = None;
    }
}
