//! CSV export of takeoff items
//!
//! Hands committed quantities to estimating spreadsheets and other external
//! tools as one row per takeoff.

use crate::geometry::{bounding_box, Point2D};
use crate::session::TakeoffItem;
use std::io::Write;

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,

    /// Include takeoffs that have no committed quantity yet
    pub include_uncommitted: bool,

    /// Export only takeoffs from specific pages (None = all pages)
    pub page_filter: Option<Vec<u16>>,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
            include_uncommitted: false,
            page_filter: None,
        }
    }
}

/// Export takeoff items to CSV format
///
/// CSV columns:
/// - ID: Takeoff identifier
/// - Name: Takeoff name
/// - Page: Page index (0-based), empty if never committed
/// - Type: linear, area or count
/// - Quantity: Committed quantity (2 decimals), empty if uncommitted
/// - Unit: Quantity unit
/// - Scale: Scale label the quantity was computed with
/// - Points: Page-space points as `x y` pairs separated by `;`
/// - BBox Min X / Min Y / Max X / Max Y: Bounds of the points
pub fn export_takeoffs_csv<W: Write>(
    writer: W,
    takeoffs: &[&TakeoffItem],
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.include_headers)
        .from_writer(writer);

    if config.include_headers {
        csv_writer.write_record([
            "ID",
            "Name",
            "Page",
            "Type",
            "Quantity",
            "Unit",
            "Scale",
            "Points",
            "BBox Min X",
            "BBox Min Y",
            "BBox Max X",
            "BBox Max Y",
        ])?;
    }

    for item in takeoffs.iter().copied().filter(|item| included(item, config)) {
        let (quantity, unit) = match item.result() {
            Some(result) => (format!("{:.2}", result.quantity), result.unit.clone()),
            None => (String::new(), item.kind().unit().to_string()),
        };
        let bounds = bounding_box(item.points())
            .map(|(min_x, min_y, max_x, max_y)| {
                [min_x, min_y, max_x, max_y].map(|value| format!("{value:.2}"))
            })
            .unwrap_or_default();

        csv_writer.write_record([
            item.id().to_string(),
            item.name().to_string(),
            item.page_index().map(|page| page.to_string()).unwrap_or_default(),
            item.kind().label().to_string(),
            quantity,
            unit,
            item.scale().map(|scale| scale.label().to_string()).unwrap_or_default(),
            format_points(item.points()),
            bounds[0].clone(),
            bounds[1].clone(),
            bounds[2].clone(),
            bounds[3].clone(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export takeoff items to a CSV string
pub fn export_takeoffs_csv_string(
    takeoffs: &[&TakeoffItem],
    config: &CsvExportConfig,
) -> CsvExportResult<String> {
    let mut buffer = Vec::new();
    export_takeoffs_csv(&mut buffer, takeoffs, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn included(item: &TakeoffItem, config: &CsvExportConfig) -> bool {
    if !config.include_uncommitted && !item.is_committed() {
        return false;
    }
    match (&config.page_filter, item.page_index()) {
        (Some(pages), Some(page)) => pages.contains(&page),
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn format_points(points: &[Point2D]) -> String {
    points
        .iter()
        .map(|point| format!("{:.2} {:.2}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(";")
}
