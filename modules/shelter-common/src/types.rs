use bson::Document;
use serde::{Deserialize, Serialize};

// --- Field names ---

/// Store-internal identifier, stripped before rows reach the dashboard.
pub const ID_FIELD: &str = "_id";
pub const BREED_FIELD: &str = "breed";
pub const NAME_FIELD: &str = "name";
pub const SEX_FIELD: &str = "sex_upon_outcome";
pub const AGE_WEEKS_FIELD: &str = "age_upon_outcome_in_weeks";
pub const LAT_FIELD: &str = "location_lat";
pub const LNG_FIELD: &str = "location_long";

/// One shelter outcome document.
///
/// Field order follows the Austin Animal Center outcome export, which is also
/// the column order the dashboard table shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec_num: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_upon_outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthyear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex_upon_outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_long: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_upon_outcome_in_weeks: Option<f64>,
}

impl AnimalRecord {
    /// Render the record as a store document. Absent fields are omitted.
    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

/// Drop the store-internal identifier from a document in place.
pub fn strip_id(doc: &mut Document) {
    doc.remove(ID_FIELD);
}

/// Numeric view of a BSON value. Mongo compares int32, int64 and double
/// values against each other as numbers.
pub fn as_number(value: &bson::Bson) -> Option<f64> {
    match value {
        bson::Bson::Int32(v) => Some(*v as f64),
        bson::Bson::Int64(v) => Some(*v as f64),
        bson::Bson::Double(v) => Some(*v),
        _ => None,
    }
}
