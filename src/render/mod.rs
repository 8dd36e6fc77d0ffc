//! Band-structure figure model.
//!
//! `render` turns loaded samples and a `RenderConfig` into a `BandFigure`: every
//! coordinate, tick and style the drawing needs, already resolved. The figure is
//! drawn only when it is exported (see `BandFigure::to_bytes` and friends), so the
//! model itself can be inspected and compared in tests.
use std::ops::Range;

use itertools::Itertools;
use log::{
    debug,
    warn,
};

use crate::{
    bandfile::BandData,
    bandgap::{
        estimate_gap,
        GapEstimate,
    },
    config::{
        HexColor,
        RenderConfig,
    },
    error::BandError,
    types::Point,
};

pub mod ticks;
mod export;

pub use export::{
    ExportFormat,
    output_file_name,
};
use ticks::{
    auto_ticks,
    bracketing_ticks,
    format_tick,
    nice_increment,
};


/// Relative padding added above and below the plotted energies.
const Y_MARGIN: f64 = 0.05;
/// Rough number of intervals wanted when ticks are chosen automatically.
const AUTO_TICK_TARGET: usize = 6;


/// Cosmetic settings resolved from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureStyle {
    pub line_color:     HexColor,
    pub line_thickness: f64,
    pub marker_color:   HexColor,
    pub marker_size:    f64,
    pub dash_color:     HexColor,
    pub dash_thickness: f64,
    pub grid:           bool,
}


/// A fully resolved band-structure plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BandFigure {
    /// One polyline per band segment, `(k, shifted energy)`.
    pub segments:       Vec<Vec<Point>>,
    /// Samples sitting on a gap boundary.
    pub markers:        Vec<Point>,
    /// Row indices of `markers` in the input data.
    pub marked_indices: Vec<usize>,
    pub gap:            GapEstimate,

    pub title:          Vec<String>,
    pub x_label:        String,
    pub y_label:        String,

    pub x_range:        (f64, f64),
    pub y_range:        (f64, f64),
    pub x_ticks:        Vec<(f64, String)>,
    pub y_ticks:        Vec<f64>,

    pub style:          FigureStyle,
}


impl BandFigure {
    /// Text shown under the x tick at `k`.
    pub fn x_tick_label(&self, k: f64) -> String {
        self.x_ticks.iter()
            .find(|(t, _)| *t == k)
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| format_tick(k))
    }

    /// The title as a single string, one line per entry.
    pub fn title_text(&self) -> String {
        self.title.join("\n")
    }
}


/// Index ranges of the band segments.
///
/// A new segment starts at every row whose k coordinate is exactly zero. Rows
/// before the first zero form a leading segment of their own, and the last segment
/// runs to the end of the data.
pub fn segment_ranges(kpoints: &[f64]) -> Vec<Range<usize>> {
    if kpoints.is_empty() {
        return vec![];
    }

    std::iter::once(0)
        .chain(kpoints.iter().positions(|&k| k == 0.0).filter(|&i| i != 0))
        .chain(std::iter::once(kpoints.len()))
        .tuple_windows()
        .map(|(start, end)| start .. end)
        .collect()
}


/// Build the figure for `data` with energies shifted by `reference_energy`.
///
/// Fails with `InvalidInputData` on an empty or ragged sample set and with
/// `DegenerateGap` when the shifted energies do not straddle zero.
pub fn render(data: &BandData, reference_energy: f64, config: &RenderConfig) -> Result<BandFigure, BandError> {
    if data.nrows() == 0 || data.kpoints.len() != data.energies.len() {
        return Err(BandError::InvalidInputData(
                format!("expected matching non-empty k and E columns, found {} and {} rows",
                        data.kpoints.len(), data.energies.len())));
    }
    if !reference_energy.is_finite() {
        return Err(BandError::InvalidInputData(
                format!("reference energy {} is not a finite number", reference_energy)));
    }

    let kpoints  = data.kpoints.to_vec();
    let energies = data.shifted_energies(reference_energy).to_vec();
    let gap = estimate_gap(&energies)?;

    let segments = segment_ranges(&kpoints)
        .into_iter()
        .map(|r| r.map(|i| (kpoints[i], energies[i])).collect::<Vec<Point>>())
        .collect::<Vec<_>>();
    debug!("Band data split into {} segments", segments.len());

    let marked_indices = gap.boundary_indices(&energies);
    let markers = marked_indices.iter()
        .map(|&i| (kpoints[i], energies[i]))
        .collect::<Vec<Point>>();

    let mut title = config.title.lines()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if config.show_gap {
        title.push(format!("Band Gap = {:.2} eV", gap.gap));
    }

    let kmax = data.kmax();
    let x_range = if kmax > 0.0 {
        (0.0, kmax)
    } else {
        warn!("Largest k coordinate is {}, using a unit x range", kmax);
        (0.0, 1.0)
    };
    let x_ticks = x_ticks(x_range, config);

    let (y_range, y_ticks) = y_axis(&energies, config.y_increment);

    Ok(BandFigure {
        segments,
        markers,
        marked_indices,
        gap,
        title,
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
        x_range,
        y_range,
        x_ticks,
        y_ticks,
        style: FigureStyle {
            line_color:     config.color,
            line_thickness: config.line_thickness,
            marker_color:   config.marker_color,
            marker_size:    config.marker_size,
            dash_color:     config.dash_color,
            dash_thickness: config.dash_thickness,
            grid:           config.grid,
        },
    })
}


fn x_ticks((x0, x1): (f64, f64), config: &RenderConfig) -> Vec<(f64, String)> {
    if config.kpoint_labels.is_empty() {
        return auto_ticks(x0, x1, AUTO_TICK_TARGET)
            .into_iter()
            .map(|k| (k, format_tick(k)))
            .collect();
    }

    config.kpoint_labels.iter()
        .filter(|&(k, label)| {
            let inside = k >= x0 && k <= x1;
            if !inside {
                warn!("High-symmetry point {} at k = {} lies outside [{}, {}] and is dropped",
                      label, k, x0, x1);
            }
            inside
        })
        .map(|(k, label)| (k, label.to_owned()))
        .collect()
}


/// Padded plotted range and its ticks; the axis spans the outermost ticks.
fn y_axis(energies: &[f64], increment: f64) -> ((f64, f64), Vec<f64>) {
    let (emin, emax) = energies.iter()
        .filter(|e| e.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), &e| (lo.min(e), hi.max(e)));

    let pad = match emax - emin {
        span if span > 0.0 => span * Y_MARGIN,
        _ => 1.0,
    };
    let (lo, hi) = (emin - pad, emax + pad);

    let mut ticks = bracketing_ticks(lo, hi, increment);
    if ticks.is_empty() {
        warn!("Energy increment {} is unusable for the range [{:.3}, {:.3}], choosing ticks automatically",
              increment, lo, hi);
        ticks = bracketing_ticks(lo, hi, nice_increment(hi - lo, AUTO_TICK_TARGET));
    }

    match (ticks.first(), ticks.last()) {
        (Some(&first), Some(&last)) => ((first, last), ticks),
        _ => ((lo, hi), ticks),
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn example_data() -> BandData {
        BandData::from_rows(&[(0.0, -1.0), (1.0, 0.0), (2.0, 1.0),
                              (0.0,  2.0), (1.0, 3.0), (2.0, 4.0)]).unwrap()
    }

    #[test]
    fn test_segment_ranges() {
        assert_eq!(segment_ranges(&[0.0, 1.0, 2.0, 0.0, 1.0, 2.0]), vec![0 .. 3, 3 .. 6]);
        assert_eq!(segment_ranges(&[0.5, 1.0, 0.0, 1.0]), vec![0 .. 2, 2 .. 4]);
        assert_eq!(segment_ranges(&[0.0, 0.0]), vec![0 .. 1, 1 .. 2]);
        assert_eq!(segment_ranges(&[0.3, 0.6]), vec![0 .. 2]);
        assert!(segment_ranges(&[]).is_empty());
    }

    #[test]
    fn test_render_example() {
        let fig = render(&example_data(), 0.0, &RenderConfig::default()).unwrap();

        assert_eq!(fig.segments.len(), 2);
        assert!(fig.segments.iter().all(|s| s.len() == 3));
        assert_eq!(fig.segments[1], vec![(0.0, 2.0), (1.0, 3.0), (2.0, 4.0)]);

        assert_eq!(fig.gap.gap, 2.0);
        assert_eq!(fig.gap.highest_negative, -1.0);
        assert_eq!(fig.gap.lowest_positive, 1.0);
        assert_eq!(fig.marked_indices, vec![0, 2]);
        assert_eq!(fig.markers, vec![(0.0, -1.0), (2.0, 1.0)]);

        assert_eq!(fig.title, vec!["Band Structure"]);
        assert_eq!(fig.x_range, (0.0, 2.0));
        // data spans [-1, 4], padded by 0.25 on each side
        assert_eq!(fig.y_ticks, vec![-2.0, 0.0, 2.0, 4.0, 6.0]);
        assert_eq!(fig.y_range, (-2.0, 6.0));
    }

    #[test]
    fn test_render_shift_and_annotation() {
        let config = RenderConfig {
            show_gap: true,
            title:    "Si".to_owned(),
            ..Default::default()
        };
        let fig = render(&example_data(), 1.5, &config).unwrap();

        assert_eq!(fig.gap.highest_negative, -0.5);
        assert_eq!(fig.gap.lowest_positive, 0.5);
        assert_eq!(fig.marked_indices, vec![2, 3]);
        assert_eq!(fig.title, vec!["Si", "Band Gap = 1.00 eV"]);
        assert_eq!(fig.title_text(), "Si\nBand Gap = 1.00 eV");
    }

    #[test]
    fn test_render_kpoint_labels() {
        let mut config = RenderConfig::default();
        config.kpoint_labels.insert(2.0, "X");
        config.kpoint_labels.insert(0.0, "Γ");
        config.kpoint_labels.insert(5.0, "M");

        let fig = render(&example_data(), 0.0, &config).unwrap();
        assert_eq!(fig.x_ticks, vec![(2.0, "X".to_owned()), (0.0, "Γ".to_owned())]);
        assert_eq!(fig.x_tick_label(0.0), "Γ");
        assert_eq!(fig.x_tick_label(1.0), "1");
    }

    #[test]
    fn test_render_auto_ticks() {
        let config = RenderConfig {
            y_increment: 0.0,
            ..Default::default()
        };
        let fig = render(&example_data(), 0.0, &config).unwrap();
        assert_eq!(fig.x_ticks.iter().map(|t| t.1.as_str()).collect::<Vec<_>>(),
                   vec!["0", "0.5", "1", "1.5", "2"]);
        assert_eq!(fig.y_ticks.first().copied(), Some(fig.y_range.0));
        assert_eq!(fig.y_ticks.last().copied(), Some(fig.y_range.1));
        assert!(fig.y_range.0 <= -1.0 && fig.y_range.1 >= 4.0);
        for w in fig.y_ticks.windows(2) {
            assert_abs_diff_eq!(w[1] - w[0], 1.0, epsilon = 1E-12);
        }
    }

    #[test]
    fn test_render_tiny_increment() {
        for y_increment in [1E-19, 1E-310, 0.01] {
            let config = RenderConfig { y_increment, ..Default::default() };
            let fig = render(&example_data(), 0.0, &config).unwrap();
            assert_eq!(fig.y_ticks, vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
            assert_eq!(fig.y_range, (-2.0, 5.0));
        }
    }

    #[test]
    fn test_render_errors() {
        let above = BandData::from_rows(&[(0.0, 0.5), (1.0, 1.0)]).unwrap();
        assert!(matches!(render(&above, 0.0, &RenderConfig::default()),
                         Err(BandError::DegenerateGap(_))));

        let ragged = BandData {
            kpoints:  ndarray::arr1(&[0.0, 1.0]),
            energies: ndarray::arr1(&[-1.0]),
        };
        assert!(matches!(render(&ragged, 0.0, &RenderConfig::default()),
                         Err(BandError::InvalidInputData(_))));

        assert!(matches!(render(&example_data(), f64::NAN, &RenderConfig::default()),
                         Err(BandError::InvalidInputData(_))));
    }
}
