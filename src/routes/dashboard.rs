// src/routes/dashboard.rs
//! `GET /` dashboard page.
//!
//! Renders the annotated readings as a plain HTML table. The page is built
//! with string formatting; every value that came from a device is escaped.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::{
    readings::{self, TimeRange},
    Config, ReadingView,
};

// ---

pub fn router() -> Router<(SqlitePool, Config)> {
    Router::new().route("/", get(handler))
}

async fn handler(
    Query(params): Query<Vec<(String, String)>>,
    State((pool, config)): State<(SqlitePool, Config)>,
) -> impl IntoResponse {
    // ---
    let range = TimeRange::from_query(&params);
    info!("GET / - time_range={:?}", range);

    match readings::list_readings(&pool, range, Utc::now()).await {
        Ok(rows) => {
            let views: Vec<ReadingView> = rows
                .into_iter()
                .map(|r| r.annotate(&config.thresholds))
                .collect();
            (StatusCode::OK, Html(render_dashboard(&views, range))).into_response()
        }
        Err(e) => {
            error!("Failed to load dashboard readings: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load readings").into_response()
        }
    }
}

const RANGE_CHOICES: [(TimeRange, &str); 4] = [
    (TimeRange::All, "All"),
    (TimeRange::Days(1), "Last 24 hours"),
    (TimeRange::Days(7), "Last 7 days"),
    (TimeRange::Days(30), "Last 30 days"),
];

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }
nav a { margin-right: 1rem; }
nav a.active { font-weight: bold; }
.dry { background: #f8d7a8; }
.not-so-wet { background: #fdf1b8; }
.wet { background: #cfe8fc; }
.very-wet { background: #9cc9f5; }";

fn render_dashboard(rows: &[ReadingView], range: TimeRange) -> String {
    // ---
    let mut html = String::with_capacity(1024 + rows.len() * 256);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>RootRouter Dashboard</title>\n");
    html.push_str(&format!("<style>\n{STYLE}\n</style>\n"));
    html.push_str("</head>\n<body>\n<h1>Plant Moisture Monitor</h1>\n<nav>\n");

    for (choice, label) in RANGE_CHOICES {
        let class = if choice == range { " class=\"active\"" } else { "" };
        html.push_str(&format!(
            "<a href=\"/?time_range={}\"{}>{}</a>\n",
            choice.as_param(),
            class,
            label
        ));
    }
    html.push_str("</nav>\n");

    if rows.is_empty() {
        html.push_str("<p>No readings yet.</p>\n");
    } else {
        html.push_str(
            "<table>\n<thead><tr><th>Plant</th><th>Location</th><th>Moisture</th>\
             <th>Status</th><th>Time (UTC)</th></tr></thead>\n<tbody>\n",
        );
        for view in rows {
            let r = &view.reading;
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
                escape_html(&r.plant_name),
                escape_html(&r.location),
                r.moisture_value,
                view.moisture_status.css_class(),
                view.moisture_status.label(),
                r.timestamp.format("%Y-%m-%d %H:%M:%S"),
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    // ---
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::{MoistureThresholds, Reading};
    use chrono::TimeZone;

    fn view(plant_name: &str, moisture_value: i64) -> ReadingView {
        Reading {
            id: 1,
            plant_name: plant_name.to_string(),
            location: "Balcony".to_string(),
            moisture_value,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap(),
        }
        .annotate(&MoistureThresholds::default())
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>Tom & \"Jerry's\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&#x27;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Fern"), "Fern");
    }

    #[test]
    fn test_render_rows() {
        // ---
        let html = render_dashboard(&[view("Fern", 3100), view("<script>", 2000)], TimeRange::All);

        assert!(html.contains("<title>RootRouter Dashboard</title>"));
        assert!(html.contains("Plant Moisture Monitor"));
        assert!(html.contains("<td class=\"dry\">Dry</td>"));
        assert!(html.contains("<td class=\"very-wet\">Very Wet</td>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("2025-03-26 18:45:00"));
    }

    #[test]
    fn test_render_empty_and_active_range() {
        // ---
        let html = render_dashboard(&[], TimeRange::Days(7));

        assert!(html.contains("No readings yet."));
        assert!(html.contains("<a href=\"/?time_range=7\" class=\"active\">Last 7 days</a>"));
        assert!(html.contains("<a href=\"/?time_range=all\">All</a>"));
    }
}
