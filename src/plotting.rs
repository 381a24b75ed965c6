//! SVG diagnostics for generated tables
//!
//! Everything is coerced to `f64` for plotting purposes. The top panel shows `f` and the
//! table, the bottom panel their absolute difference.
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{Error, Result};

const SIZE: (u32, u32) = (800, 600);

fn plot_err(e: impl std::fmt::Display) -> Error {
    Error::Plotting(e.to_string())
}

/// Range covering every finite value, padded by 5% so lines stay off the frame
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return 0.0..1.0;
    }

    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad)..(hi + pad)
}

/// Draws `(x, f(x), L(x))` samples to an SVG file at `path`
pub(crate) fn render(path: &Path, title: &str, samples: &[(f64, f64, f64)]) -> Result<()> {
    let x_range = padded_range(samples.iter().map(|s| s.0));
    let y_range = padded_range(samples.iter().flat_map(|s| [s.1, s.2]));
    let e_range = padded_range(samples.iter().map(|s| (s.1 - s.2).abs()).chain([0.0]));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let (upper, lower) = root.split_vertically(400);

    let mut values = ChartBuilder::on(&upper)
        .caption(title, ("sans-serif", 16))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(plot_err)?;
    values.configure_mesh().draw().map_err(plot_err)?;

    for (label, color, pick) in [
        ("func", BLUE, (|s: &(f64, f64, f64)| s.1) as fn(&(f64, f64, f64)) -> f64),
        ("impl", RED, |s| s.2),
    ] {
        let style = ShapeStyle::from(color).stroke_width(1);
        values
            .draw_series(LineSeries::new(samples.iter().map(|s| (s.0, pick(s))), style))
            .map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    values
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    let mut errors = ChartBuilder::on(&lower)
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, e_range)
        .map_err(plot_err)?;
    errors
        .configure_mesh()
        .y_desc("|func - impl|")
        .draw()
        .map_err(plot_err)?;
    errors
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (s.0, (s.1 - s.2).abs())),
            &BLACK,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)
}
