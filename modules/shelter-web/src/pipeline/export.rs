use bson::Document;

use super::table::{cell_text, Column};

pub const EXPORT_FILENAME: &str = "shelter_data.csv";

/// Serialize rows as CSV. The header carries raw field identifiers so the
/// file can be loaded back into the store unchanged; missing cells are empty.
pub fn to_csv(columns: &[Column], rows: &[Document]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.id.as_str()))?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|c| row.get(&c.id).map(cell_text).unwrap_or_default()),
        )?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}
