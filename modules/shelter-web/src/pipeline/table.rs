//! Table view over a result set: display headers, client-style sorting,
//! fixed-size pagination and single-row selection.

use std::cmp::Ordering;
use std::collections::HashSet;

use bson::{Bson, Document};
use serde::Serialize;

use shelter_common::types::{as_number, strip_id};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Field identifier in the store document.
    pub id: String,
    /// Display header.
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Result rows with the store identifier removed, plus their columns.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<Document>,
    /// Result-set position of each row, parallel to `rows`.
    pub order: Vec<usize>,
}

impl TableView {
    /// Columns are every field seen across the rows, in encounter order.
    pub fn from_documents(docs: Vec<Document>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        let mut rows = Vec::with_capacity(docs.len());

        for mut doc in docs {
            strip_id(&mut doc);
            for key in doc.keys() {
                if seen.insert(key.clone()) {
                    columns.push(Column {
                        id: key.clone(),
                        name: column_label(key),
                    });
                }
            }
            rows.push(doc);
        }

        let order = (0..rows.len()).collect();
        Self {
            columns,
            rows,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.columns.iter().any(|c| c.id == id)
    }

    /// Stable sort on one column. Missing and null cells go last in both
    /// directions.
    pub fn sort(&mut self, spec: &SortSpec) {
        let column = spec.column.as_str();
        let mut keyed: Vec<(usize, Document)> =
            self.order.drain(..).zip(self.rows.drain(..)).collect();
        keyed.sort_by(|(_, a), (_, b)| {
            compare_for_sort(cell(a, column), cell(b, column), spec.direction)
        });
        (self.order, self.rows) = keyed.into_iter().unzip();
    }

    /// At least one page, even when empty.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(PAGE_SIZE).max(1)
    }

    pub fn clamp_page(&self, page: usize) -> usize {
        page.min(self.page_count() - 1)
    }

    pub fn page_rows(&self, page: usize) -> &[Document] {
        let start = (self.clamp_page(page) * PAGE_SIZE).min(self.rows.len());
        let end = (start + PAGE_SIZE).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Visible position of the requested result-set row. Defaults to the
    /// first visible row; an empty table has no selection.
    pub fn resolve_selection(&self, requested: Option<usize>) -> Option<usize> {
        if self.rows.is_empty() {
            return None;
        }
        requested
            .and_then(|source| self.order.iter().position(|&o| o == source))
            .or(Some(0))
    }

    /// Result-set position of the row shown at `visible`.
    pub fn source_index(&self, visible: usize) -> Option<usize> {
        self.order.get(visible).copied()
    }
}

/// NaN has no place in an ordering, so it sorts with the missing values.
fn cell<'a>(row: &'a Document, column: &str) -> Option<&'a Bson> {
    row.get(column)
        .filter(|v| !matches!(v, Bson::Null))
        .filter(|v| !matches!(v, Bson::Double(x) if x.is_nan()))
}

fn compare_for_sort(a: Option<&Bson>, b: Option<&Bson>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = compare_values(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Numbers before strings before everything else.
fn compare_values(a: &Bson, b: &Bson) -> Ordering {
    fn rank(v: &Bson) -> u8 {
        match v {
            _ if as_number(v).is_some() => 0,
            Bson::String(_) => 1,
            _ => 2,
        }
    }

    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| cell_text(a).cmp(&cell_text(b))),
    }
}

/// Display header for a field: underscores become spaces, then title case.
pub fn column_label(id: &str) -> String {
    let mut label = String::with_capacity(id.len());
    let mut in_word = false;

    for ch in id.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                label.extend(ch.to_lowercase());
            } else {
                label.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            label.push(ch);
            in_word = false;
        }
    }

    label
}

/// Plain-text rendering of a cell, shared by the HTML table and the export.
pub fn cell_text(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Double(v) => v.to_string(),
        Bson::Boolean(v) => v.to_string(),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}
