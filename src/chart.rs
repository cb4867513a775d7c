//! Dual-axis traffic / temperature line chart.

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::error::ChartError;
use crate::model::ForecastSeries;

pub const CHART_WIDTH: u32 = 1300;
pub const CHART_HEIGHT: u32 = 550;

const TRAFFIC_COLOR: RGBColor = RED;
const TEMPERATURE_COLOR: RGBColor = BLUE;
const TRAFFIC_LABEL: &str = "Traffic Level";
const TEMPERATURE_LABEL: &str = "Temperature (°C)";

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Lower and upper bound of the temperature axis, padded so a flat or
/// missing series still gets a usable range.
fn temperature_range(series: &ForecastSeries) -> (f64, f64) {
    let temps = series.points.iter().filter_map(|p| p.temperature);
    let (lo, hi) = temps.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
        (lo.min(t), hi.max(t))
    });

    if lo.is_finite() && hi.is_finite() {
        (lo.floor() - 2.0, hi.ceil() + 2.0)
    } else {
        (0.0, 1.0)
    }
}

/// Consecutive runs of known temperatures. A missing value ends a run so the
/// line shows a gap there.
fn temperature_runs(series: &ForecastSeries) -> Vec<Vec<(i32, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (i, point) in series.points.iter().enumerate() {
        match point.temperature {
            Some(t) => current.push((i as i32, t)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &ForecastSeries,
) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(draw_err)?;

    let labels = series.hours();
    let x_max = (series.len() as i32 - 1).max(1);
    let traffic_max = series.points.iter().map(|p| p.traffic).max().unwrap_or(0) + 10;
    let (temp_lo, temp_hi) = temperature_range(series);

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Traffic & Temperature Forecast",
            ("sans-serif", 24.0).into_font(),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(0..x_max, 0u32..traffic_max)
        .map_err(draw_err)?
        .set_secondary_coord(0..x_max, temp_lo..temp_hi);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| labels.get(i))
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .y_desc(TRAFFIC_LABEL)
        .axis_desc_style(("sans-serif", 16.0).into_font().color(&TRAFFIC_COLOR))
        .y_label_style(("sans-serif", 14.0).into_font().color(&TRAFFIC_COLOR))
        .draw()
        .map_err(draw_err)?;

    chart
        .configure_secondary_axes()
        .y_desc(TEMPERATURE_LABEL)
        .axis_desc_style(("sans-serif", 16.0).into_font().color(&TEMPERATURE_COLOR))
        .label_style(("sans-serif", 14.0).into_font().color(&TEMPERATURE_COLOR))
        .draw()
        .map_err(draw_err)?;

    let traffic: Vec<(i32, u32)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as i32, p.traffic))
        .collect();

    chart
        .draw_series(LineSeries::new(
            traffic.iter().copied(),
            TRAFFIC_COLOR.stroke_width(3),
        ))
        .map_err(draw_err)?
        .label(TRAFFIC_LABEL)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRAFFIC_COLOR.stroke_width(3)));

    chart
        .draw_series(
            traffic
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, TRAFFIC_COLOR.filled())),
        )
        .map_err(draw_err)?;

    // Legend entry only; the runs below carry the data.
    chart
        .draw_secondary_series(LineSeries::new(
            std::iter::empty::<(i32, f64)>(),
            TEMPERATURE_COLOR.stroke_width(3),
        ))
        .map_err(draw_err)?
        .label(TEMPERATURE_LABEL)
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], TEMPERATURE_COLOR.stroke_width(3))
        });

    for run in temperature_runs(series) {
        chart
            .draw_secondary_series(
                run.iter()
                    .map(|&(x, t)| Circle::new((x, t), 4, TEMPERATURE_COLOR.filled())),
            )
            .map_err(draw_err)?;
        chart
            .draw_secondary_series(LineSeries::new(run, TEMPERATURE_COLOR.stroke_width(3)))
            .map_err(draw_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Renders the chart as an SVG document.
pub fn render_svg(series: &ForecastSeries, width: u32, height: u32) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw(&root, series)?;
    }
    Ok(svg)
}

/// Renders the chart as a PNG by rasterizing the SVG output.
pub fn render_png(series: &ForecastSeries, width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let svg = render_svg(series, width, height)?;

    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();
    opts.fontdb_mut().set_sans_serif_family("DejaVu Sans");
    tracing::debug!("Loaded {} fonts from system", opts.fontdb_mut().len());

    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| ChartError::Raster(format!("Failed to parse SVG: {}", e)))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ChartError::Raster("Failed to create pixmap".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let svg_size = tree.size();
    let scale = (width as f32 / svg_size.width()).min(height as f32 / svg_size.height());
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| ChartError::Raster(format!("Failed to encode PNG: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeriesPoint;

    fn series(temps: &[Option<f64>]) -> ForecastSeries {
        ForecastSeries {
            points: temps
                .iter()
                .enumerate()
                .map(|(i, t)| SeriesPoint {
                    hour: format!("{:02}:00", 9 + i),
                    traffic: 80 + i as u32,
                    temperature: *t,
                    description: "clear".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn runs_split_on_missing_temperatures() {
        let s = series(&[Some(1.0), Some(2.0), None, Some(4.0), None, None]);
        assert_eq!(
            temperature_runs(&s),
            vec![vec![(0, 1.0), (1, 2.0)], vec![(3, 4.0)]]
        );
        assert!(temperature_runs(&series(&[None, None])).is_empty());
    }

    #[test]
    fn temperature_range_is_padded() {
        assert_eq!(temperature_range(&series(&[Some(20.4), Some(25.6)])), (18.0, 28.0));
        assert_eq!(temperature_range(&series(&[Some(10.0)])), (8.0, 12.0));
        assert_eq!(temperature_range(&series(&[None])), (0.0, 1.0));
    }

    #[test]
    fn svg_contains_axes_and_legend() {
        let s = series(&[Some(20.0), None, Some(22.5)]);
        let svg = render_svg(&s, CHART_WIDTH, CHART_HEIGHT).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Traffic Level"));
        assert!(svg.contains("Temperature (°C)"));
        assert!(svg.contains("09:00"));
        assert!(svg.contains("11:00"));
    }

    #[test]
    fn svg_renders_without_any_temperature() {
        let s = series(&[None, None, None]);
        assert!(render_svg(&s, 640, 320).is_ok());
    }

    #[test]
    fn png_has_signature() {
        let s = series(&[Some(20.0), Some(21.0), Some(19.5)]);
        let png = render_png(&s, 640, 320).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
