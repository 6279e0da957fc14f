use bson::Document;
use serde::Serialize;

use shelter_common::types::{as_number, BREED_FIELD, LAT_FIELD, LNG_FIELD, NAME_FIELD};

pub const MAP_ZOOM: u8 = 10;

/// A single map marker for the selected animal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub lat: f64,
    pub lng: f64,
    /// Hover label.
    pub breed: String,
    /// Popup detail.
    pub name: String,
    pub zoom: u8,
}

impl LocationView {
    /// Fields are addressed by name, so column order never affects the marker.
    /// A row without numeric coordinates has no location.
    pub fn from_row(row: &Document) -> Option<Self> {
        let lat = row.get(LAT_FIELD).and_then(as_number)?;
        let lng = row.get(LNG_FIELD).and_then(as_number)?;
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }

        Some(Self {
            lat,
            lng,
            breed: row.get_str(BREED_FIELD).unwrap_or_default().to_string(),
            name: row.get_str(NAME_FIELD).unwrap_or_default().to_string(),
            zoom: MAP_ZOOM,
        })
    }

    /// Marker for the selected row of the visible set.
    pub fn for_selection(rows: &[Document], selected: Option<usize>) -> Option<Self> {
        selected
            .and_then(|i| rows.get(i))
            .and_then(Self::from_row)
    }
}
