use std::f64::consts::PI;

use shelter_common::{FilterSelection, RescueProfile};

use crate::pipeline::{
    chart::{Band, ChartMode, ChartView, Slice},
    location::LocationView,
    table::{cell_text, SortDirection},
    Dashboard, DashboardParams,
};
use crate::state::Logo;

/// First eight stops of the RdBu sequential palette.
const PALETTE: [&str; 8] = [
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#d1e5f0", "#92c5de", "#4393c3",
];

/// Render the full dashboard page for one state.
pub fn render_dashboard(d: &Dashboard, logo: Option<&Logo>) -> String {
    let content = format!(
        r#"{intro}
<div class="container">
    <h3>Shelter Data</h3>
    {filter}
    {table}
</div>
<div class="container grid">
    <div class="card">{chart}</div>
    <div class="card"><h5>Selected Animal Location</h5>{map}</div>
</div>"#,
        intro = render_intro(logo),
        filter = render_filter(d),
        table = render_table(d),
        chart = render_chart_card(d),
        map = render_map(d.location.as_ref()),
    );

    build_page("Dashboard", &content)
}

fn render_intro(logo: Option<&Logo>) -> String {
    let logo_html = logo
        .map(|l| {
            format!(
                r#"<img class="logo" src="{}" alt="Grazioso Salvare logo">"#,
                l.data_uri()
            )
        })
        .unwrap_or_default();

    let profiles: String = RescueProfile::ALL
        .iter()
        .map(|p| {
            let (min, max) = p.age_weeks();
            format!(
                "<li><strong>{}</strong>: {}, {}, {min}-{max} weeks</li>",
                html_escape(p.label()),
                html_escape(&p.breeds().join(", ")),
                html_escape(p.sex_label()),
            )
        })
        .collect();

    format!(
        r#"<div class="container card intro">
    {logo_html}
    <div>
        <h2>Welcome to the Grazioso Salvare Dashboard</h2>
        <p>This dashboard helps identify rescue dog candidates from Austin-area animal shelters.
        Use the filter below to show dogs matching a rescue profile:</p>
        <ul>{profiles}</ul>
    </div>
</div>"#
    )
}

fn render_filter(d: &Dashboard) -> String {
    let options: String = FilterSelection::options()
        .map(|s| {
            let selected = if s == d.selection && s.is_filtered() {
                " selected"
            } else {
                ""
            };
            let label = html_escape(s.label());
            format!(r#"<option value="{label}"{selected}>{label}</option>"#)
        })
        .collect();

    // A new filter keeps the sort and chart mode; page and selection reset.
    let mut kept = Vec::new();
    if let Some(sort) = &d.sort {
        kept.push(("sort", sort.column.clone()));
        kept.push(("dir", sort.direction.as_str().to_string()));
    }
    if d.chart_mode != ChartMode::default() {
        kept.push(("chart", d.chart_mode.as_str().to_string()));
    }
    let hidden_inputs: String = kept
        .iter()
        .map(|(name, value)| {
            format!(
                r#"<input type="hidden" name="{name}" value="{}">"#,
                html_escape(value)
            )
        })
        .collect();

    let status = match d.selection.profile() {
        Some(p) => format!("Showing {} candidates", html_escape(p.label())),
        None => "Showing all animals".to_string(),
    };

    format!(
        r#"<div class="filter">
    <form method="get" action="/">
        <label for="profile">Filter by Rescue Type</label>
        <select id="profile" name="profile" onchange="this.form.submit()">
            <option value="" disabled{placeholder}>Select Rescue Type</option>
            {options}
        </select>
        {hidden_inputs}
        <noscript><button type="submit">Apply</button></noscript>
    </form>
    <span class="status">{status} ({count})</span>
</div>"#,
        placeholder = if d.selection.is_filtered() { "" } else { " selected" },
        count = d.table.len(),
    )
}

fn render_table(d: &Dashboard) -> String {
    let base = d.params();

    if d.table.is_empty() {
        return r#"<p class="muted">No animals match this filter.</p>"#.to_string();
    }

    let headers: String = d
        .table
        .columns
        .iter()
        .map(|c| {
            let (direction, marker) = match &d.sort {
                Some(s) if s.column == c.id => (
                    s.direction.flipped(),
                    match s.direction {
                        SortDirection::Asc => " &#9650;",
                        SortDirection::Desc => " &#9660;",
                    },
                ),
                _ => (SortDirection::Asc, ""),
            };
            let link = DashboardParams {
                sort: Some(c.id.clone()),
                dir: Some(direction.as_str().to_string()),
                page: None,
                ..base.clone()
            };
            format!(
                r#"<th><a href="/{q}">{name}{marker}</a></th>"#,
                q = html_escape(&link.query_string()),
                name = html_escape(&c.name),
            )
        })
        .collect();

    let offset = d.page * crate::pipeline::table::PAGE_SIZE;
    let rows: String = d
        .page_rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let index = offset + i;
            let is_selected = d.selected == Some(index);
            let link = DashboardParams {
                selected: d.table.source_index(index).map(|i| i.to_string()),
                ..base.clone()
            };
            let cells: String = d
                .table
                .columns
                .iter()
                .map(|c| {
                    let text = row.get(&c.id).map(cell_text).unwrap_or_default();
                    format!("<td>{}</td>", html_escape(&text))
                })
                .collect();
            format!(
                r#"<tr{class}><td><a class="select" href="/{q}" title="Select row">{mark}</a></td>{cells}</tr>"#,
                class = if is_selected { r#" class="selected""# } else { "" },
                q = html_escape(&link.query_string()),
                mark = if is_selected { "&#9673;" } else { "&#9675;" },
            )
        })
        .collect();

    let pager = render_pager(d, &base);
    let export = DashboardParams {
        page: None,
        selected: None,
        chart: None,
        ..base
    };

    format!(
        r#"<div class="table-wrap">
<table>
    <thead><tr><th></th>{headers}</tr></thead>
    <tbody>{rows}</tbody>
</table>
</div>
<div class="pager">{pager}<a class="export" href="/export.csv{q}">Export CSV</a></div>"#,
        q = html_escape(&export.query_string()),
    )
}

fn render_pager(d: &Dashboard, base: &DashboardParams) -> String {
    let last = d.table.page_count() - 1;
    let link = |page: usize, label: &str| {
        let params = DashboardParams {
            page: Some(page.to_string()),
            ..base.clone()
        };
        format!(
            r#"<a href="/{}">{label}</a>"#,
            html_escape(&params.query_string())
        )
    };

    let prev = if d.page > 0 {
        link(d.page - 1, "&larr; Prev")
    } else {
        r#"<span class="muted">&larr; Prev</span>"#.to_string()
    };
    let next = if d.page < last {
        link(d.page + 1, "Next &rarr;")
    } else {
        r#"<span class="muted">Next &rarr;</span>"#.to_string()
    };

    format!(
        "{prev}<span>Page {} of {}</span>{next}",
        d.page + 1,
        last + 1
    )
}

fn render_chart_card(d: &Dashboard) -> String {
    let base = d.params();
    let toggle: String = [ChartMode::Breed, ChartMode::Age]
        .into_iter()
        .map(|mode| {
            let label = match mode {
                ChartMode::Breed => "By breed",
                ChartMode::Age => "By age",
            };
            if mode == d.chart_mode {
                format!(r#"<span class="active">{label}</span>"#)
            } else {
                let params = DashboardParams {
                    chart: Some(mode.as_str().to_string()),
                    ..base.clone()
                };
                format!(
                    r#"<a href="/{}">{label}</a>"#,
                    html_escape(&params.query_string())
                )
            }
        })
        .collect();

    format!(
        r#"<div class="chart-toggle">{toggle}</div>{}"#,
        render_chart(&d.chart)
    )
}

/// Render a chart view as inline SVG.
pub fn render_chart(chart: &ChartView) -> String {
    match chart {
        ChartView::Empty => r#"<p class="muted">No data to chart.</p>"#.to_string(),
        ChartView::Breakdown { title, slices } => render_pie(title, slices),
        ChartView::Banded { title, bands } => render_bars(title, bands),
    }
}

fn render_pie(title: &str, slices: &[Slice]) -> String {
    const R: f64 = 100.0;
    const C: f64 = 120.0;

    let mut shapes = String::new();
    let mut labels = String::new();
    let mut angle = -PI / 2.0;

    for (i, slice) in slices.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let sweep = slice.percent / 100.0 * 2.0 * PI;

        if slices.len() == 1 {
            shapes.push_str(&format!(
                r#"<circle cx="{C}" cy="{C}" r="{R}" fill="{color}" stroke="white" stroke-width="2"/>"#
            ));
        } else {
            let (x1, y1) = (C + R * angle.cos(), C + R * angle.sin());
            let end = angle + sweep;
            let (x2, y2) = (C + R * end.cos(), C + R * end.sin());
            let large = if sweep > PI { 1 } else { 0 };
            shapes.push_str(&format!(
                r#"<path d="M {C} {C} L {x1:.2} {y1:.2} A {R} {R} 0 {large} 1 {x2:.2} {y2:.2} Z" fill="{color}" stroke="white" stroke-width="2"><title>{label}: {count}</title></path>"#,
                label = html_escape(&slice.label),
                count = slice.count,
            ));
        }

        let mid = angle + sweep / 2.0;
        labels.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" class="pie-label">{:.1}%</text>"#,
            C + R * 0.65 * mid.cos(),
            C + R * 0.65 * mid.sin(),
            slice.percent,
        ));
        angle += sweep;
    }

    let legend: String = slices
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                r#"<li><span class="swatch" style="background:{}"></span>{} <span class="muted">{} ({:.1}%)</span></li>"#,
                PALETTE[i % PALETTE.len()],
                html_escape(&s.label),
                s.count,
                s.percent,
            )
        })
        .collect();

    format!(
        r#"<h5>{}</h5>
<div class="pie">
<svg viewBox="0 0 240 240" width="240" height="240" role="img">{shapes}{labels}</svg>
<ul class="legend">{legend}</ul>
</div>"#,
        html_escape(title)
    )
}

fn render_bars(title: &str, bands: &[Band]) -> String {
    const W: f64 = 480.0;
    const H: f64 = 200.0;
    const TOP: f64 = 20.0;

    let max = bands.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let slot = W / bands.len().max(1) as f64;

    let bars: String = bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let height = band.count as f64 / max * (H - TOP);
            let x = i as f64 * slot + slot * 0.15;
            let y = H - height;
            format!(
                r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{height:.1}" fill="{color}"><title>{label}: {count}</title></rect><text x="{cx:.1}" y="{ty:.1}" text-anchor="middle" class="bar-count">{count}</text><text x="{cx:.1}" y="{ly:.1}" text-anchor="middle" class="bar-label">{label}</text>"#,
                w = slot * 0.7,
                color = PALETTE[1],
                label = html_escape(band.label),
                count = band.count,
                cx = i as f64 * slot + slot / 2.0,
                ty = y - 4.0,
                ly = H + 16.0,
            )
        })
        .collect();

    format!(
        r#"<h5>{}</h5>
<svg viewBox="0 0 {W} {vh}" width="100%" role="img">{bars}</svg>"#,
        html_escape(title),
        vh = H + 24.0,
    )
}

/// Render the single-marker map, or a placeholder when nothing is selected.
pub fn render_map(location: Option<&LocationView>) -> String {
    let Some(loc) = location else {
        return r#"<p class="muted">No animal selected.</p>"#.to_string();
    };

    format!(
        r#"<div id="map"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script>
const map = L.map('map').setView([{lat}, {lng}], {zoom});
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
    attribution: '&copy; OpenStreetMap contributors',
    maxZoom: 18,
}}).addTo(map);

const tip = document.createElement('span');
tip.textContent = {breed};
const popup = document.createElement('div');
const heading = document.createElement('h1');
heading.textContent = 'Animal Name';
const detail = document.createElement('p');
detail.textContent = {name};
popup.append(heading, detail);

L.marker([{lat}, {lng}]).addTo(map).bindTooltip(tip).bindPopup(popup);
</script>"#,
        lat = loc.lat,
        lng = loc.lng,
        zoom = loc.zoom,
        breed = js_string(&loc.breed),
        name = js_string(&loc.name),
    )
}

// --- Helpers ---

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Grazioso Salvare</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:"Ubuntu",-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#f2e6e3;}}
.header{{background:#2c3e50;color:#fff;padding:12px 24px;}}
.header h1{{font-size:20px;font-weight:700;text-align:center;}}
.container{{max-width:1200px;margin:0 auto;padding:16px 24px;}}
.card{{background:#faf8f5;border-radius:8px;padding:16px;box-shadow:0 1px 3px rgba(0,0,0,.08);}}
.intro{{display:flex;gap:24px;align-items:center;margin-top:24px;}}
.intro h2{{margin-bottom:8px;}}
.intro ul{{margin:8px 0 0 20px;font-size:14px;}}
.logo{{height:160px;width:auto;object-fit:contain;}}
.filter{{background:#2c3e50;color:#fff;border-radius:8px;padding:12px 16px;margin:12px 0;display:flex;gap:16px;align-items:center;justify-content:space-between;}}
.filter select{{margin-left:8px;padding:4px 8px;color:#2c3e50;}}
.status{{font-size:13px;color:#ddd;}}
.table-wrap{{overflow-x:auto;border-radius:8px;}}
table{{border-collapse:collapse;width:100%;font-size:13px;background:#faf8f5;}}
th{{background:#2c3e50;color:#fff;text-align:left;padding:6px 8px;white-space:nowrap;}}
th a{{color:#fff;text-decoration:none;}}
td{{padding:6px 8px;border-bottom:1px solid #e6dcd8;max-width:180px;overflow:hidden;text-overflow:ellipsis;white-space:nowrap;}}
tr.selected td{{background:#f6d9d2;}}
a.select{{color:#c9341b;text-decoration:none;font-size:16px;}}
.pager{{display:flex;gap:16px;align-items:center;margin-top:8px;font-size:13px;}}
.pager a{{color:#2c3e50;}}
.export{{margin-left:auto;}}
.grid{{display:grid;grid-template-columns:1fr 1fr;gap:16px;}}
.chart-toggle{{display:flex;gap:12px;font-size:13px;margin-bottom:8px;}}
.chart-toggle .active{{font-weight:700;color:#c9341b;}}
.pie{{display:flex;gap:16px;align-items:center;}}
.pie-label{{font-size:11px;fill:#fff;}}
.legend{{list-style:none;font-size:13px;}}
.swatch{{display:inline-block;width:10px;height:10px;margin-right:6px;border-radius:2px;}}
.bar-count{{font-size:11px;fill:#333;}}
.bar-label{{font-size:10px;fill:#555;}}
#map{{height:400px;border-radius:8px;}}
h5{{font-size:15px;margin-bottom:8px;}}
.muted{{color:#888;}}
</style>
</head>
<body>
<div class="header"><h1>Grazioso Salvare Rescue Dashboard</h1></div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON string literal that is also safe inside a `<script>` element.
fn js_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(params: &DashboardParams) -> Dashboard {
        let docs = vec![
            bson::doc! { "name": "Bear", "breed": "Newfoundland", "location_lat": 30.1, "location_long": -97.5 },
            bson::doc! { "name": "Tank", "breed": "Rottweiler", "location_lat": 30.6, "location_long": -97.5 },
        ];
        Dashboard::derive(FilterSelection::Reset, docs, params)
    }

    #[test]
    fn filter_form_keeps_sort_and_chart_mode() {
        let d = dashboard(&DashboardParams {
            sort: Some("name".into()),
            dir: Some("desc".into()),
            chart: Some("age".into()),
            page: Some("0".into()),
            ..Default::default()
        });
        let html = render_filter(&d);
        assert!(html.contains(r#"<input type="hidden" name="sort" value="name">"#));
        assert!(html.contains(r#"<input type="hidden" name="dir" value="desc">"#));
        assert!(html.contains(r#"<input type="hidden" name="chart" value="age">"#));
        assert!(!html.contains(r#"name="page""#));
        assert!(!html.contains(r#"name="selected""#));
    }

    #[test]
    fn row_links_select_by_result_position() {
        let d = dashboard(&DashboardParams {
            sort: Some("name".into()),
            dir: Some("desc".into()),
            ..Default::default()
        });
        let html = render_table(&d);
        let body = &html[html.find("<tbody>").unwrap()..];
        let first_row = &body[..body.find("</tr>").unwrap()];
        // Tank is shown first but is the second result row.
        assert!(first_row.contains("Tank"));
        assert!(first_row.contains("selected=1"));
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        assert!(render_chart(&ChartView::Empty).contains("No data to chart"));
    }

    #[test]
    fn pie_shows_percentage_labels() {
        let chart = ChartView::Breakdown {
            title: "Breed Distribution",
            slices: vec![
                Slice { label: "Pug".into(), count: 3, percent: 75.0 },
                Slice { label: "Boxer".into(), count: 1, percent: 25.0 },
            ],
        };
        let html = render_chart(&chart);
        assert!(html.contains("75.0%"));
        assert!(html.contains("25.0%"));
        assert_eq!(html.matches("<path").count(), 2);
    }

    #[test]
    fn single_slice_pie_is_a_full_circle() {
        let chart = ChartView::Breakdown {
            title: "Breed Distribution",
            slices: vec![Slice { label: "Pug".into(), count: 2, percent: 100.0 }],
        };
        let html = render_chart(&chart);
        assert!(html.contains("<circle"));
        assert!(html.contains("100.0%"));
    }

    #[test]
    fn no_location_renders_no_map() {
        let html = render_map(None);
        assert!(!html.contains("L.map"));
    }

    #[test]
    fn marker_text_cannot_break_out_of_script() {
        let loc = LocationView {
            lat: 30.75,
            lng: -97.48,
            breed: "</script><script>alert(1)</script>".into(),
            name: "O'Malley".into(),
            zoom: 10,
        };
        let html = render_map(Some(&loc));
        assert!(html.contains("setView([30.75, -97.48], 10)"));
        assert!(!html.contains("</script><script>alert"));
        assert!(html.contains("O'Malley"));
    }
}
