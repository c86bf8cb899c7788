//! Bar chart export to PNG (plotters bitmap).

use color_eyre::Result;
use plotters::prelude::*;
use std::path::Path;

use crate::chart_data::{ChartOrientation, ChartProjection};

/// Default image size in pixels.
pub const DEFAULT_CHART_SIZE: (u32, u32) = (960, 640);

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Value axis range padded so the longest bar does not touch the frame.
fn value_range(points: &[(String, f64)]) -> (f64, f64) {
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let min = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
    let span = if max > min { max - min } else { 1.0 };
    (min, max + span * 0.05)
}

fn label_at(points: &[(String, f64)], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| points.get(i))
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Write the projection as a bar chart PNG at `path`.
///
/// Points are drawn in the order given: bottom to top for horizontal charts,
/// left to right for vertical ones.
pub fn write_bar_chart_png(path: &Path, projection: &ChartProjection, size: (u32, u32)) -> Result<()> {
    if projection.is_empty() {
        return Err(color_eyre::eyre::eyre!("No data to chart"));
    }
    let points = projection.points.as_slice();
    let n = points.len() as i32;
    let (v_min, v_max) = value_range(points);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    match projection.orientation {
        ChartOrientation::Horizontal => {
            let mut chart = ChartBuilder::on(&root)
                .caption(projection.title.as_str(), ("sans-serif", 20))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(220)
                .build_cartesian_2d(v_min..v_max, (0..n).into_segmented())?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(points.len())
                .y_label_formatter(&|v| label_at(points, v))
                .x_desc(projection.value_label.as_str())
                .draw()?;

            chart.draw_series(points.iter().enumerate().map(|(i, (_, v))| {
                let i = i as i32;
                let mut bar = Rectangle::new(
                    [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
                    BAR_COLOR.filled(),
                );
                bar.set_margin(2, 2, 0, 0);
                bar
            }))?;
        }
        ChartOrientation::Vertical => {
            let mut chart = ChartBuilder::on(&root)
                .caption(projection.title.as_str(), ("sans-serif", 20))
                .margin(20)
                .x_label_area_size(120)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), v_min..v_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(points.len())
                .x_label_formatter(&|v| label_at(points, v))
                .x_label_style(
                    ("sans-serif", 12)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .y_desc(projection.value_label.as_str())
                .draw()?;

            chart.draw_series(points.iter().enumerate().map(|(i, (_, v))| {
                let i = i as i32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                    BAR_COLOR.filled(),
                );
                bar.set_margin(0, 0, 2, 2);
                bar
            }))?;
        }
    }

    root.present()?;
    Ok(())
}
