//! Takeoff session orchestration
//!
//! A [`TakeoffSession`] is the single context object the UI drives: it owns
//! the takeoff items, the capture buffer of whichever item is being traced,
//! the current scale and the latest view transform pushed in by the renderer.
//! Every mutation recomputes the live preview so it can be read at any time.
//!
//! Pointer coordinates are projected into page space when the event is
//! handled, using the transform current at that moment. Captured geometry is
//! therefore unaffected by later zoom or pan changes.

use crate::capture::{ClickOutcome, PointCapture};
use crate::config::EngineConfig;
use crate::error::{SessionError, SessionResult};
use crate::geometry::Point2D;
use crate::quantity::{calculate, TakeoffResult, TakeoffType};
use crate::scale::ScaleSpec;
use crate::transform::{TransformSnapshot, ViewTransform};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a takeoff item
pub type TakeoffId = uuid::Uuid;

/// A measured item and its committed geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoffItem {
    id: TakeoffId,
    name: String,
    kind: TakeoffType,
    /// Page the geometry was traced on, once committed
    page_index: Option<u16>,
    /// Committed points in page space
    points: Vec<Point2D>,
    /// Scale the committed quantity was computed with
    scale: Option<ScaleSpec>,
    /// Committed quantity
    result: Option<TakeoffResult>,
}

impl TakeoffItem {
    /// Create an uncommitted takeoff item
    pub fn new(name: impl Into<String>, kind: TakeoffType) -> Self {
        Self::with_id(TakeoffId::new_v4(), name, kind)
    }

    /// Create an uncommitted item with a known identifier
    pub fn with_id(id: TakeoffId, name: impl Into<String>, kind: TakeoffType) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            page_index: None,
            points: Vec::new(),
            scale: None,
            result: None,
        }
    }

    pub fn id(&self) -> TakeoffId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TakeoffType {
        self.kind
    }

    pub fn page_index(&self) -> Option<u16> {
        self.page_index
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn scale(&self) -> Option<&ScaleSpec> {
        self.scale.as_ref()
    }

    pub fn result(&self) -> Option<&TakeoffResult> {
        self.result.as_ref()
    }

    /// Whether a quantity has been committed
    pub fn is_committed(&self) -> bool {
        self.result.is_some()
    }

    fn commit(&mut self, page_index: u16, points: Vec<Point2D>, scale: &ScaleSpec) {
        self.page_index = Some(page_index);
        self.points = points;
        self.scale = Some(scale.clone());
        self.recompute();
    }

    fn recompute(&mut self) {
        if let Some(scale) = &self.scale {
            self.result = Some(calculate(&self.points, self.kind, scale));
        }
    }
}

/// A single session operation, for scripted or remote drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    AddTakeoff {
        id: TakeoffId,
        name: String,
        kind: TakeoffType,
    },
    RemoveTakeoff {
        id: TakeoffId,
    },
    SetTakeoffKind {
        id: TakeoffId,
        kind: TakeoffType,
    },
    SetScale {
        #[serde(default)]
        label: Option<String>,
    },
    SetPage {
        page_index: u16,
    },
    StartCapture {
        id: TakeoffId,
    },
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    FinishCapture,
    ResetCapture,
    CancelCapture,
    ViewTransformChanged {
        #[serde(default)]
        transform: Option<ViewTransform>,
        #[serde(default)]
        rotation_radians: f64,
    },
}

/// The measurement engine's session state
#[derive(Debug)]
pub struct TakeoffSession {
    takeoffs: HashMap<TakeoffId, TakeoffItem>,
    /// Insertion order of takeoffs
    order: Vec<TakeoffId>,
    /// Takeoff whose geometry is being captured
    active: Option<TakeoffId>,
    capture: PointCapture,
    scale: ScaleSpec,
    /// Scale restored when no label is given
    default_scale: ScaleSpec,
    current_page: u16,
    transform: ViewTransform,
    rotation_radians: f64,
    /// Number of transform changes applied
    transform_version: u64,
    /// Latest `PageTransform` snapshot version applied
    snapshot_version: Option<u64>,
    preview: TakeoffResult,
}

impl Default for TakeoffSession {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl TakeoffSession {
    /// Create an empty session
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            takeoffs: HashMap::new(),
            order: Vec::new(),
            active: None,
            capture: PointCapture::new(),
            scale: config.scale(),
            default_scale: config.scale(),
            current_page: config.page_index,
            transform: ViewTransform::IDENTITY,
            rotation_radians: 0.0,
            transform_version: 0,
            snapshot_version: None,
            preview: TakeoffResult::default(),
        }
    }

    /// Add a takeoff item, returning its identifier
    pub fn add_takeoff(&mut self, name: impl Into<String>, kind: TakeoffType) -> TakeoffId {
        let item = TakeoffItem::new(name, kind);
        let id = item.id();
        self.order.push(id);
        self.takeoffs.insert(id, item);
        id
    }

    /// Insert an existing item, e.g. one restored from storage
    pub fn insert_takeoff(&mut self, item: TakeoffItem) -> SessionResult<TakeoffId> {
        let id = item.id();
        if self.takeoffs.contains_key(&id) {
            return Err(SessionError::DuplicateTakeoff(id));
        }
        self.order.push(id);
        self.takeoffs.insert(id, item);
        Ok(id)
    }

    /// Remove a takeoff item, cancelling its capture if active
    pub fn remove_takeoff(&mut self, id: TakeoffId) -> SessionResult<TakeoffItem> {
        let item = self
            .takeoffs
            .remove(&id)
            .ok_or(SessionError::UnknownTakeoff(id))?;
        self.order.retain(|existing| *existing != id);
        if self.active == Some(id) {
            self.cancel_capture();
        }
        Ok(item)
    }

    /// Get a takeoff item
    pub fn takeoff(&self, id: TakeoffId) -> Option<&TakeoffItem> {
        self.takeoffs.get(&id)
    }

    /// All takeoff items in insertion order
    pub fn takeoffs(&self) -> impl Iterator<Item = &TakeoffItem> + '_ {
        self.order.iter().filter_map(|id| self.takeoffs.get(id))
    }

    /// Committed takeoff items traced on a page
    pub fn takeoffs_for_page(&self, page_index: u16) -> Vec<&TakeoffItem> {
        self.takeoffs()
            .filter(|item| item.page_index() == Some(page_index))
            .collect()
    }

    /// Change what a takeoff measures, recomputing its committed quantity
    pub fn set_takeoff_kind(&mut self, id: TakeoffId, kind: TakeoffType) -> SessionResult<()> {
        let item = self
            .takeoffs
            .get_mut(&id)
            .ok_or(SessionError::UnknownTakeoff(id))?;
        item.kind = kind;
        item.recompute();
        self.refresh_preview();
        Ok(())
    }

    /// Set the drawing scale from a label
    pub fn set_scale(&mut self, label: &str) {
        self.scale = ScaleSpec::parse(label);
        tracing::debug!(
            label,
            feet_per_point = self.scale.feet_per_point(),
            "scale changed"
        );
        self.refresh_preview();
    }

    /// Return to the configured default scale
    pub fn reset_scale(&mut self) {
        self.scale = self.default_scale.clone();
        tracing::debug!(label = self.scale.label(), "scale reset to default");
        self.refresh_preview();
    }

    pub fn scale(&self) -> &ScaleSpec {
        &self.scale
    }

    /// Apply the current scale to every committed takeoff on a page
    pub fn recompute_page(&mut self, page_index: u16) {
        for item in self.takeoffs.values_mut() {
            if item.page_index == Some(page_index) {
                item.scale = Some(self.scale.clone());
                item.recompute();
            }
        }
    }

    pub fn current_page(&self) -> u16 {
        self.current_page
    }

    /// Switch the page being drawn on
    ///
    /// Page spaces are unrelated, so an in-progress capture is cancelled.
    pub fn set_current_page(&mut self, page_index: u16) {
        if page_index == self.current_page {
            return;
        }
        if self.capture.is_capturing() {
            tracing::debug!(page_index, "page changed during capture, cancelling");
            self.cancel_capture();
        }
        self.current_page = page_index;
    }

    /// Begin capturing geometry for a takeoff
    ///
    /// Switching from another takeoff drops its pending click and
    /// uncommitted points; its committed geometry is untouched.
    pub fn start_capture(&mut self, id: TakeoffId) -> SessionResult<()> {
        if !self.takeoffs.contains_key(&id) {
            return Err(SessionError::UnknownTakeoff(id));
        }
        if let Some(previous) = self.active.filter(|previous| *previous != id) {
            tracing::debug!(%previous, next = %id, "switching active takeoff");
        }
        self.capture.start();
        self.active = Some(id);
        self.refresh_preview();
        Ok(())
    }

    /// Takeoff currently being captured
    pub fn active_takeoff(&self) -> Option<&TakeoffItem> {
        self.active.and_then(|id| self.takeoffs.get(&id))
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    /// The capture buffer (page-space points)
    pub fn capture(&self) -> &PointCapture {
        &self.capture
    }

    /// Handle a click at a view coordinate
    pub fn on_pointer_down(&mut self, raw: Point2D) -> ClickOutcome {
        let outcome = self.capture.click(self.view_to_page(raw));
        if matches!(outcome, ClickOutcome::SegmentCompleted { .. }) {
            self.refresh_preview();
        }
        outcome
    }

    /// Handle pointer motion at a view coordinate
    pub fn on_pointer_move(&mut self, raw: Point2D) {
        let point = self.view_to_page(raw);
        self.capture.pointer_moved(point);
    }

    /// Rubber-band segment in page space
    pub fn rubber_band(&self) -> Option<(Point2D, Point2D)> {
        self.capture.rubber_band()
    }

    /// Commit the captured geometry to the active takeoff
    pub fn finish_capture(&mut self) -> SessionResult<TakeoffResult> {
        let id = match self.active {
            Some(id) if self.capture.is_capturing() => id,
            _ => return Err(SessionError::NotCapturing),
        };
        let points = self.capture.finish();
        self.active = None;

        let item = self
            .takeoffs
            .get_mut(&id)
            .ok_or(SessionError::UnknownTakeoff(id))?;
        item.commit(self.current_page, points, &self.scale);
        let result = item.result.clone().unwrap_or_default();
        tracing::info!(
            takeoff = %id,
            page = self.current_page,
            quantity = result.quantity,
            unit = %result.unit,
            "takeoff committed"
        );

        self.refresh_preview();
        Ok(result)
    }

    /// Clear the captured points, staying in capture mode
    ///
    /// The takeoff's previously committed result is kept.
    pub fn reset_capture(&mut self) {
        if !self.capture.is_capturing() {
            tracing::warn!("reset requested while not capturing");
            return;
        }
        self.capture.reset();
        self.refresh_preview();
    }

    /// Abandon the capture without committing
    pub fn cancel_capture(&mut self) {
        self.capture.cancel();
        self.active = None;
        self.refresh_preview();
    }

    /// Live quantity for the capture in progress
    ///
    /// Zero with an empty unit while nothing is being captured.
    pub fn current_preview(&self) -> &TakeoffResult {
        &self.preview
    }

    /// Accept a new view transform from the renderer
    ///
    /// `None` or a degenerate transform is treated as the identity.
    pub fn on_view_transform_changed(
        &mut self,
        transform: Option<ViewTransform>,
        rotation_radians: f64,
    ) {
        self.transform = transform
            .filter(ViewTransform::is_valid)
            .unwrap_or(ViewTransform::IDENTITY);
        self.rotation_radians = if rotation_radians.is_finite() {
            rotation_radians
        } else {
            0.0
        };
        self.transform_version += 1;
        self.refresh_preview();
    }

    /// Accept a snapshot from a `PageTransform`, ignoring stale ones
    ///
    /// Returns whether the snapshot was applied.
    pub fn apply_transform_snapshot(&mut self, snapshot: &TransformSnapshot) -> bool {
        if self
            .snapshot_version
            .is_some_and(|applied| snapshot.version <= applied)
        {
            tracing::debug!(version = snapshot.version, "stale transform snapshot");
            return false;
        }
        self.snapshot_version = Some(snapshot.version);
        self.on_view_transform_changed(Some(snapshot.transform), snapshot.rotation_radians());
        true
    }

    pub fn view_transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn rotation_radians(&self) -> f64 {
        self.rotation_radians
    }

    pub fn transform_version(&self) -> u64 {
        self.transform_version
    }

    /// Project a view coordinate into page space
    pub fn view_to_page(&self, raw: Point2D) -> Point2D {
        self.transform.to_page(raw)
    }

    /// Dispatch a command
    pub fn apply(&mut self, command: SessionCommand) -> SessionResult<()> {
        match command {
            SessionCommand::AddTakeoff { id, name, kind } => {
                self.insert_takeoff(TakeoffItem::with_id(id, name, kind))?;
            }
            SessionCommand::RemoveTakeoff { id } => {
                self.remove_takeoff(id)?;
            }
            SessionCommand::SetTakeoffKind { id, kind } => self.set_takeoff_kind(id, kind)?,
            SessionCommand::SetScale { label } => match label {
                Some(label) => self.set_scale(&label),
                None => self.reset_scale(),
            },
            SessionCommand::SetPage { page_index } => self.set_current_page(page_index),
            SessionCommand::StartCapture { id } => self.start_capture(id)?,
            SessionCommand::PointerDown { x, y } => {
                self.on_pointer_down(Point2D::new(x, y));
            }
            SessionCommand::PointerMove { x, y } => self.on_pointer_move(Point2D::new(x, y)),
            SessionCommand::FinishCapture => {
                self.finish_capture()?;
            }
            SessionCommand::ResetCapture => self.reset_capture(),
            SessionCommand::CancelCapture => self.cancel_capture(),
            SessionCommand::ViewTransformChanged {
                transform,
                rotation_radians,
            } => self.on_view_transform_changed(transform, rotation_radians),
        }
        Ok(())
    }

    fn refresh_preview(&mut self) {
        self.preview = match self.active_takeoff() {
            Some(item) if self.capture.is_capturing() => {
                calculate(self.capture.points(), item.kind(), &self.scale)
            }
            _ => TakeoffResult::default(),
        };
    }
}
