use base64::{engine::general_purpose, Engine as _};
use traffic_forecast::{chart, ChartError, Coordinate, DashboardView, ForecastDuration};

/// Half-width of the map view around the selected point, in degrees.
const MAP_SPAN_DEG: f64 = 0.05;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// OpenStreetMap embed centered on `coordinate` with a marker on it.
pub fn map_embed_url(coordinate: Coordinate) -> String {
    let (lat, lon) = (coordinate.latitude, coordinate.longitude);
    format!(
        "https://www.openstreetmap.org/export/embed.html?bbox={:.4},{:.4},{:.4},{:.4}&layer=mapnik&marker={:.4},{:.4}",
        lon - MAP_SPAN_DEG,
        lat - MAP_SPAN_DEG,
        lon + MAP_SPAN_DEG,
        lat + MAP_SPAN_DEG,
        lat,
        lon
    )
}

/// Chart SVG as a base64 data URI for an `<img>` tag.
pub fn chart_data_uri(view: &DashboardView) -> Result<String, ChartError> {
    let svg = chart::render_svg(&view.series, chart::CHART_WIDTH, chart::CHART_HEIGHT)?;
    let encoded = general_purpose::STANDARD.encode(svg.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{}", encoded))
}

fn duration_options(selected: ForecastDuration) -> String {
    let mut html = String::new();
    for choice in ForecastDuration::choices() {
        let attr = if choice == selected { " selected" } else { "" };
        html.push_str(&format!(
            r#"<option value="{0}"{1}>{0} hours</option>"#,
            choice.hours(),
            attr
        ));
    }
    html
}

/// Full dashboard page for one render pass.
pub fn render_page(view: &DashboardView, refresh_interval_secs: u64) -> Result<String, ChartError> {
    let chart_uri = chart_data_uri(view)?;
    let duration = view.duration.hours();
    let lat = view.coordinate.latitude;
    let lon = view.coordinate.longitude;

    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "  <meta http-equiv=\"refresh\" content=\"{};url=/?duration={}\">\n",
        refresh_interval_secs, duration
    ));
    html.push_str("  <title>Traffic + Weather Forecast</title>\n");
    html.push_str(
        "  <style>\
         body{font-family:Arial,sans-serif;margin:0;display:flex}\
         aside{width:240px;padding:20px;background:#f0f2f6;min-height:100vh}\
         main{flex:1;padding:20px 40px}\
         label{display:block;margin-top:12px}\
         input,select,button{width:100%;margin-top:4px;padding:4px}\
         .notice{background:#fde8e8;color:#9b1c1c;padding:10px;border-radius:4px;margin:12px 0}\
         iframe{width:100%;height:320px;border:0}\
         img.chart{width:100%;max-width:1300px}\
         </style>\n",
    );
    html.push_str("</head>\n<body>\n");

    // Sidebar: coordinate selector
    html.push_str("<aside>\n  <h2>Location Selector</h2>\n");
    html.push_str("  <form method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "    <label>Latitude<input type=\"number\" name=\"lat\" step=\"0.0001\" value=\"{:.4}\"></label>\n",
        lat
    ));
    html.push_str(&format!(
        "    <label>Longitude<input type=\"number\" name=\"lon\" step=\"0.0001\" value=\"{:.4}\"></label>\n",
        lon
    ));
    html.push_str(&format!(
        "    <input type=\"hidden\" name=\"duration\" value=\"{}\">\n",
        duration
    ));
    html.push_str("    <button type=\"submit\">Get Forecast</button>\n  </form>\n</aside>\n");

    html.push_str("<main>\n  <h1>Custom Location Traffic + Weather Forecast</h1>\n");
    html.push_str(&format!(
        "  <h3>Location: {}</h3>\n",
        escape_html(&view.location)
    ));
    html.push_str(&format!(
        "  <iframe title=\"map\" src=\"{}\"></iframe>\n",
        escape_html(&map_embed_url(view.coordinate))
    ));
    html.push_str(&format!(
        "  <p><strong>Last updated: {} minute(s) ago</strong></p>\n",
        view.minutes_since_refresh
    ));

    if let Some(notice) = &view.notice {
        html.push_str(&format!(
            "  <div class=\"notice\">{}</div>\n",
            escape_html(notice)
        ));
    }

    html.push_str("  <form method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "    <label>Forecast Duration (Hours)<select name=\"duration\" onchange=\"this.form.submit()\">{}</select></label>\n",
        duration_options(view.duration)
    ));
    html.push_str("  </form>\n");

    html.push_str(&format!(
        "  <img class=\"chart\" alt=\"Traffic and temperature forecast\" src=\"{}\">\n",
        chart_uri
    ));
    html.push_str(
        "  <p><a href=\"/forecast.csv\">CSV</a> · <a href=\"/api/forecast\">JSON</a> · <a href=\"/chart.png\">PNG</a></p>\n",
    );
    html.push_str("</main>\n</body>\n</html>\n");

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use traffic_forecast::{ForecastSeries, SeriesPoint};

    fn view(notice: Option<&str>) -> DashboardView {
        DashboardView {
            location: "Café <Central> & Co".to_string(),
            coordinate: Coordinate::new(28.6139, 77.209),
            duration: ForecastDuration::try_from(6).unwrap(),
            minutes_since_refresh: 5,
            generated_at: Local::now(),
            notice: notice.map(str::to_string),
            series: ForecastSeries {
                points: vec![SeriesPoint {
                    hour: "09:00".to_string(),
                    traffic: 89,
                    temperature: Some(21.0),
                    description: "clear sky".to_string(),
                }],
            },
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn map_url_centers_on_coordinate() {
        let url = map_embed_url(Coordinate::new(28.6139, 77.209));
        assert!(url.contains("bbox=77.1590,28.5639,77.2590,28.6639"));
        assert!(url.ends_with("marker=28.6139,77.2090"));
    }

    #[test]
    fn page_contains_dashboard_sections() {
        let html = render_page(&view(None), 300).unwrap();

        assert!(html.contains(r#"content="300;url=/?duration=6""#));
        assert!(html.contains("Location: Café &lt;Central&gt; &amp; Co"));
        assert!(html.contains("Last updated: 5 minute(s) ago"));
        assert!(html.contains(r#"name="lat" step="0.0001" value="28.6139""#));
        assert!(html.contains(r#"name="lon" step="0.0001" value="77.2090""#));
        assert!(html.contains(r#"<option value="6" selected>6 hours</option>"#));
        assert!(html.contains(r#"<option value="24">24 hours</option>"#));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn page_shows_notice() {
        let html = render_page(&view(Some("Could not fetch weather data.")), 300).unwrap();
        assert!(html.contains(r#"<div class="notice">Could not fetch weather data.</div>"#));
    }
}
