//! Plan Takeoff Core Library
//!
//! Measurement engine for quantity takeoff on scaled plan drawings: scale
//! parsing, view-to-page transforms, point capture and quantity calculation.

pub mod capture;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod geometry;
pub mod quantity;
pub mod scale;
pub mod session;
pub mod transform;

pub use capture::{CaptureMode, ClickOutcome, PointCapture};
pub use config::EngineConfig;
pub use csv_export::{
    export_takeoffs_csv, export_takeoffs_csv_string, CsvExportConfig, CsvExportError,
    CsvExportResult,
};
pub use error::{ConfigError, SessionError, SessionResult};
pub use geometry::{Point2D, Rect};
pub use quantity::{calculate, calculate_for_label, TakeoffResult, TakeoffType};
pub use scale::{feet_per_point, ScaleSpec, ARCHITECTURAL_SCALES, DEFAULT_SCALE_LABEL};
pub use session::{SessionCommand, TakeoffId, TakeoffItem, TakeoffSession};
pub use transform::{PageRotation, PageTransform, SubscriptionId, TransformSnapshot, ViewTransform};
