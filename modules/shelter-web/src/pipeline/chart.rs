//! Chart derivations over the visible rows.

use std::collections::HashMap;

use bson::Document;
use serde::Serialize;

use shelter_common::types::{as_number, AGE_WEEKS_FIELD, BREED_FIELD};

/// Breakdown keeps only the most frequent breeds.
pub const TOP_BREEDS: usize = 8;

pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Lower edges of the age bands in years. Each band runs up to, but not
/// including, the next edge; the last band is unbounded.
pub const AGE_BAND_EDGES: [f64; 8] = [0.0, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

const AGE_BAND_LABELS: [&str; 8] = [
    "< 6 months",
    "6-12 months",
    "1-2 years",
    "2-3 years",
    "3-4 years",
    "4-5 years",
    "5-6 years",
    "6+ years",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Breed,
    Age,
}

impl ChartMode {
    /// Anything other than `age` selects the breed breakdown.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("age") => ChartMode::Age,
            _ => ChartMode::Breed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMode::Breed => "breed",
            ChartMode::Age => "age",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    /// Share of the displayed slices, 0-100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub label: &'static str,
    pub min_years: f64,
    pub max_years: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartView {
    Empty,
    Breakdown { title: &'static str, slices: Vec<Slice> },
    Banded { title: &'static str, bands: Vec<Band> },
}

impl ChartView {
    pub fn build(mode: ChartMode, rows: &[Document]) -> Self {
        if rows.is_empty() {
            return ChartView::Empty;
        }

        match mode {
            ChartMode::Breed => {
                let slices = breed_breakdown(rows);
                if slices.is_empty() {
                    ChartView::Empty
                } else {
                    ChartView::Breakdown {
                        title: "Breed Distribution",
                        slices,
                    }
                }
            }
            ChartMode::Age => {
                let bands = age_bands(rows);
                if bands.iter().all(|b| b.count == 0) {
                    ChartView::Empty
                } else {
                    ChartView::Banded {
                        title: "Age Distribution",
                        bands,
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartView::Empty)
    }
}

/// Count rows per breed, keep the most frequent, ties in encounter order.
pub fn breed_breakdown(rows: &[Document]) -> Vec<Slice> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for breed in rows.iter().filter_map(|r| r.get_str(BREED_FIELD).ok()) {
        match index.get(breed) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(breed.to_string(), order.len());
                order.push((breed.to_string(), 1));
            }
        }
    }

    // sort_by is stable, so equal counts keep encounter order.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(TOP_BREEDS);

    let total: usize = order.iter().map(|(_, c)| c).sum();
    order
        .into_iter()
        .map(|(label, count)| Slice {
            label,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// Band index for an age in years. Boundaries belong to the upper band;
/// negative ages land in the first band.
pub fn band_index(years: f64) -> usize {
    AGE_BAND_EDGES[1..]
        .iter()
        .take_while(|&&edge| years >= edge)
        .count()
}

/// Counts per age band in band order. Rows without a numeric age are skipped.
pub fn age_bands(rows: &[Document]) -> Vec<Band> {
    let mut counts = [0usize; AGE_BAND_EDGES.len()];

    for weeks in rows
        .iter()
        .filter_map(|r| r.get(AGE_WEEKS_FIELD).and_then(as_number))
        .filter(|w| !w.is_nan())
    {
        counts[band_index(weeks / WEEKS_PER_YEAR)] += 1;
    }

    AGE_BAND_EDGES
        .iter()
        .enumerate()
        .map(|(i, &min_years)| Band {
            label: AGE_BAND_LABELS[i],
            min_years,
            max_years: AGE_BAND_EDGES.get(i + 1).copied(),
            count: counts[i],
        })
        .collect()
}
