//! Filter-to-render pipeline.
//!
//! A dropdown selection maps to a [`RecordQuery`](shelter_common::RecordQuery),
//! the gateway returns the result set, and every view is derived from it in one
//! synchronous pass: table first, then chart and location from the visible rows.
//!
//! The whole view state travels with each request as [`DashboardParams`], so a
//! session's table, sort and selection belong to that client alone.

pub mod chart;
pub mod export;
pub mod location;
pub mod table;

use bson::Document;
use serde::{Deserialize, Serialize};

use shelter_common::FilterSelection;
use shelter_store::AnimalShelter;

use chart::{ChartMode, ChartView};
use location::LocationView;
use table::{SortDirection, SortSpec, TableView};

/// View state as carried in the query string. Every field is optional and
/// every value is accepted; unknown or malformed values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardParams {
    pub profile: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    /// Position of the selected row in the unsorted result set, so the same
    /// record stays selected when the sort changes.
    pub selected: Option<String>,
    pub chart: Option<String>,
}

impl DashboardParams {
    /// Zero-based page; anything unparseable is the first page.
    pub fn page_number(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Requested result-set row, if the value is a valid index.
    pub fn selected_row(&self) -> Option<usize> {
        self.selected.as_deref().and_then(|v| v.trim().parse().ok())
    }

    /// Query string for a link, skipping defaults. Leading `?` included unless empty.
    pub fn query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(v) = &self.profile {
            pairs.push(("profile", v.clone()));
        }
        if let Some(v) = &self.sort {
            pairs.push(("sort", v.clone()));
        }
        if let Some(v) = &self.dir {
            pairs.push(("dir", v.clone()));
        }
        let page = self.page_number();
        if page > 0 {
            pairs.push(("page", page.to_string()));
        }
        if let Some(v) = self.selected_row() {
            pairs.push(("selected", v.to_string()));
        }
        if let Some(v) = &self.chart {
            pairs.push(("chart", v.clone()));
        }

        if pairs.is_empty() {
            return String::new();
        }

        let encoded: Vec<String> = pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(&v)))
            .collect();
        format!("?{}", encoded.join("&"))
    }
}

/// Every derived view for one dashboard state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub selection: FilterSelection,
    /// Visible set: the filtered rows after sorting, across all pages.
    pub table: TableView,
    pub sort: Option<SortSpec>,
    pub page: usize,
    /// Position of the selected row in the visible set.
    pub selected: Option<usize>,
    pub chart_mode: ChartMode,
    pub chart: ChartView,
    pub location: Option<LocationView>,
}

impl Dashboard {
    /// Run the selection's query through the gateway and derive every view.
    pub async fn load(shelter: &AnimalShelter, params: &DashboardParams) -> Self {
        let selection = FilterSelection::from_param(params.profile.as_deref());
        let docs = shelter.read(&selection.query()).await;
        Self::derive(selection, docs, params)
    }

    pub fn derive(selection: FilterSelection, docs: Vec<Document>, params: &DashboardParams) -> Self {
        let mut table = TableView::from_documents(docs);

        let sort = params
            .sort
            .as_deref()
            .filter(|column| table.has_column(column))
            .map(|column| SortSpec {
                column: column.to_string(),
                direction: SortDirection::parse(params.dir.as_deref()),
            });
        if let Some(spec) = &sort {
            table.sort(spec);
        }

        let page = table.clamp_page(params.page_number());
        let selected = table.resolve_selection(params.selected_row());
        let chart_mode = ChartMode::parse(params.chart.as_deref());
        let chart = ChartView::build(chart_mode, &table.rows);
        let location = LocationView::for_selection(&table.rows, selected);

        Self {
            selection,
            table,
            sort,
            page,
            selected,
            chart_mode,
            chart,
            location,
        }
    }

    pub fn page_rows(&self) -> &[Document] {
        self.table.page_rows(self.page)
    }

    /// Normalized parameters reproducing this exact state.
    pub fn params(&self) -> DashboardParams {
        DashboardParams {
            profile: self.selection.profile().map(|p| p.label().to_string()),
            sort: self.sort.as_ref().map(|s| s.column.clone()),
            dir: self.sort.as_ref().map(|s| s.direction.as_str().to_string()),
            page: Some(self.page.to_string()),
            selected: self
                .selected
                .and_then(|i| self.table.source_index(i))
                .map(|i| i.to_string()),
            chart: Some(self.chart_mode)
                .filter(|m| *m != ChartMode::default())
                .map(|m| m.as_str().to_string()),
        }
    }

    pub fn summary(&self) -> DashboardSummary<'_> {
        DashboardSummary {
            filter: self.selection.label(),
            filtered: self.selection.is_filtered(),
            columns: &self.table.columns,
            total_rows: self.table.len(),
            page: self.page,
            page_count: self.table.page_count(),
            rows: self.page_rows(),
            selected: self.selected,
            chart: &self.chart,
            location: self.location.as_ref(),
        }
    }
}

/// JSON shape of a dashboard state.
#[derive(Debug, Serialize)]
pub struct DashboardSummary<'a> {
    pub filter: &'static str,
    pub filtered: bool,
    pub columns: &'a [table::Column],
    pub total_rows: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows: &'a [Document],
    pub selected: Option<usize>,
    pub chart: &'a ChartView,
    pub location: Option<&'a LocationView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use shelter_common::RescueProfile;

    fn dog(rec_num: i32, breed: &str, name: &str, lat: f64) -> Document {
        doc! {
            "_id": rec_num,
            "rec_num": rec_num,
            "breed": breed,
            "name": name,
            "location_lat": lat,
            "location_long": -97.5,
            "age_upon_outcome_in_weeks": 30.0 * rec_num as f64,
        }
    }

    fn docs(n: i32) -> Vec<Document> {
        (1..=n).map(|i| dog(i, "Pug", &format!("Dog {i}"), 30.0 + i as f64)).collect()
    }

    #[test]
    fn defaults_select_first_row_and_breed_chart() {
        let d = Dashboard::derive(FilterSelection::Reset, docs(3), &DashboardParams::default());
        assert_eq!(d.selected, Some(0));
        assert_eq!(d.page, 0);
        assert_eq!(d.chart_mode, ChartMode::Breed);
        assert_eq!(d.location.as_ref().unwrap().name, "Dog 1");
        assert!(matches!(d.chart, ChartView::Breakdown { .. }));
    }

    #[test]
    fn selection_follows_the_record_across_sorts() {
        let params = DashboardParams {
            sort: Some("rec_num".into()),
            dir: Some("desc".into()),
            selected: Some("0".into()),
            ..Default::default()
        };
        let d = Dashboard::derive(FilterSelection::Reset, docs(3), &params);
        assert_eq!(d.table.rows[0].get_i32("rec_num").unwrap(), 3);
        assert_eq!(d.selected, Some(2));
        assert_eq!(d.location.as_ref().unwrap().name, "Dog 1");
        assert_eq!(d.params().selected.as_deref(), Some("0"));
    }

    #[test]
    fn malformed_page_and_selection_fall_back_to_defaults() {
        for (page, selected) in [("abc", "-1"), ("", ""), ("-3", "x"), ("1.5", "99")] {
            let params = DashboardParams {
                page: Some(page.into()),
                selected: Some(selected.into()),
                ..Default::default()
            };
            let d = Dashboard::derive(FilterSelection::Reset, docs(12), &params);
            assert_eq!(d.page, 0, "page={page:?}");
            assert_eq!(d.selected, Some(0), "selected={selected:?}");
        }
    }

    #[test]
    fn unknown_sort_column_is_ignored() {
        let params = DashboardParams {
            sort: Some("_id".into()),
            ..Default::default()
        };
        let d = Dashboard::derive(FilterSelection::Reset, docs(2), &params);
        assert!(d.sort.is_none());
    }

    #[test]
    fn empty_result_clears_selection_chart_and_location() {
        let params = DashboardParams {
            selected: Some("4".into()),
            ..Default::default()
        };
        let d = Dashboard::derive(
            FilterSelection::Profile(RescueProfile::Water),
            vec![],
            &params,
        );
        assert_eq!(d.selected, None);
        assert!(d.chart.is_empty());
        assert!(d.location.is_none());
        assert!(d.page_rows().is_empty());
    }

    #[test]
    fn charts_use_all_visible_rows_not_just_the_page() {
        let d = Dashboard::derive(FilterSelection::Reset, docs(25), &DashboardParams::default());
        assert_eq!(d.page_rows().len(), table::PAGE_SIZE);
        match &d.chart {
            ChartView::Breakdown { slices, .. } => assert_eq!(slices[0].count, 25),
            other => panic!("unexpected chart {other:?}"),
        }
    }

    #[test]
    fn params_round_trip_through_query_string() {
        let params = DashboardParams {
            profile: Some("Water Rescue".into()),
            sort: Some("breed".into()),
            dir: Some("desc".into()),
            page: Some("0".into()),
            selected: Some("2".into()),
            chart: Some("age".into()),
        };
        assert_eq!(
            params.query_string(),
            "?profile=Water%20Rescue&sort=breed&dir=desc&selected=2&chart=age"
        );
        assert_eq!(DashboardParams::default().query_string(), "");

        let malformed = DashboardParams {
            page: Some("abc".into()),
            selected: Some("-1".into()),
            ..Default::default()
        };
        assert_eq!(malformed.query_string(), "");
    }

    #[test]
    fn normalized_params_reproduce_state() {
        let d = Dashboard::derive(
            FilterSelection::Profile(RescueProfile::Mountain),
            docs(12),
            &DashboardParams {
                page: Some("7".into()),
                chart: Some("bogus".into()),
                ..Default::default()
            },
        );
        let params = d.params();
        assert_eq!(params.profile.as_deref(), Some("Mountain Rescue"));
        assert_eq!(params.page.as_deref(), Some("1"));
        assert_eq!(params.chart, None);
        assert_eq!(params.selected.as_deref(), Some("0"));
    }
}
