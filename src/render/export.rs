use std::{
    fmt,
    io::Cursor,
    ops::Range,
    str::FromStr,
};

use image::{
    DynamicImage,
    ImageFormat,
    RgbImage,
};
use log::debug;
use plotters::{
    coord::{
        Shift,
        ranged1d::{
            DefaultFormatting,
            KeyPointHint,
            Ranged,
        },
        types::RangedCoordf64,
    },
    prelude::*,
    style::text_anchor::{
        HPos,
        Pos,
        VPos,
    },
};
use serde::{
    Serialize,
    Deserialize,
};

use crate::{
    config::HexColor,
    error::BandError,
    types::Point,
};
use super::{
    BandFigure,
    ticks::format_tick,
};


/// Figure size in inches.
pub const FIGURE_SIZE: (f64, f64) = (8.0, 6.0);
/// SVG output is laid out at one pixel per point.
const POINTS_PER_INCH: f64 = 72.0;
/// Refuse raster surfaces larger than this many pixels.
const MAX_PIXELS: u64 = 120_000_000;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[serde(alias = "jpeg")]
    Jpg,
    Png,
    #[serde(alias = "tif")]
    Tiff,
    Svg,
}


impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg  => "jpg",
            Self::Png  => "png",
            Self::Tiff => "tiff",
            Self::Svg  => "svg",
        }
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Jpg  => Some(ImageFormat::Jpeg),
            Self::Png  => Some(ImageFormat::Png),
            Self::Tiff => Some(ImageFormat::Tiff),
            Self::Svg  => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = BandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png"          => Ok(Self::Png),
            "tiff" | "tif" => Ok(Self::Tiff),
            "svg"          => Ok(Self::Svg),
            _ => Err(BandError::ExportFailure(
                    format!("unsupported format {:?}, expected one of jpg, png, tiff, svg", s))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}


/// Export file name: the trimmed custom name if it is non-empty, otherwise the title.
/// Path separators are replaced so the name always stays in the output directory.
pub fn output_file_name(custom: Option<&str>, title: &str, format: ExportFormat) -> String {
    let stem = match custom.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => {
            let title = title.trim();
            if title.is_empty() { "band_structure".to_owned() } else { title.to_owned() }
        },
    };
    let stem = stem.replace(['/', '\\', '\n'], "_");
    format!("{}.{}", stem, format.extension())
}


fn figure_pixels(dpi: f64) -> (u32, u32) {
    ((FIGURE_SIZE.0 * dpi).round() as u32, (FIGURE_SIZE.1 * dpi).round() as u32)
}

fn rgb(c: HexColor) -> RGBColor {
    let [r, g, b] = c.0;
    RGBColor(r, g, b)
}

fn export_failure(e: impl fmt::Display) -> BandError {
    BandError::ExportFailure(e.to_string())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}


impl BandFigure {
    /// Serialize the figure; `dpi` is ignored for SVG.
    pub fn to_bytes(&self, format: ExportFormat, dpi: u32) -> Result<Vec<u8>, BandError> {
        match format.image_format() {
            Some(image_format) => self.to_raster(image_format, dpi),
            None => Ok(self.to_svg()?.into_bytes()),
        }
    }

    pub fn to_svg(&self) -> Result<String, BandError> {
        let (w, h) = figure_pixels(POINTS_PER_INCH);
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (w, h)).into_drawing_area();
            draw_figure(&root, self, 1.0).map_err(export_failure)?;
        }
        Ok(buf)
    }

    /// The SVG rendition wrapped in a `<div>`, for embedding into other pages.
    pub fn to_inline_html(&self) -> Result<String, BandError> {
        Ok(format!("<div class=\"bandplot\">\n{}\n</div>", self.to_svg()?))
    }

    /// A standalone HTML page showing the figure.
    pub fn to_html(&self) -> Result<String, BandError> {
        let title = escape_html(&self.title.join(" | "));
        Ok(format!(r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{}</title>
<style>
body {{ margin: 0; display: flex; justify-content: center; background: #fafafa; }}
.bandplot svg {{ max-width: 100vw; height: auto; }}
</style>
</head>
<body>
{}
</body>
</html>
"#, title, self.to_inline_html()?))
    }

    fn to_raster(&self, image_format: ImageFormat, dpi: u32) -> Result<Vec<u8>, BandError> {
        if dpi == 0 {
            return Err(BandError::ExportFailure("DPI must be positive".to_owned()));
        }

        let (w, h) = figure_pixels(dpi as f64);
        if w as u64 * h as u64 > MAX_PIXELS {
            return Err(BandError::ExportFailure(
                    format!("{}x{} pixels at {} DPI is too large", w, h, dpi)));
        }
        debug!("Drawing {}x{} bitmap at {} DPI", w, h, dpi);

        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            draw_figure(&root, self, dpi as f64 / POINTS_PER_INCH).map_err(export_failure)?;
        }

        let img = RgbImage::from_raw(w, h, buf)
            .ok_or_else(|| BandError::ExportFailure("bitmap buffer has the wrong size".to_owned()))?;
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image_format)
            .map_err(export_failure)?;
        Ok(out.into_inner())
    }
}


/// Linear f64 axis whose grid lines and labels sit exactly on `ticks`.
struct TickedAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        Self { inner: range.into(), ticks }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}


/// Draw `fig` on `root`; lengths given in points are multiplied by `scale`.
fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, fig: &BandFigure, scale: f64) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let px = |pt: f64| (pt * scale).round().max(1.0) as u32;

    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();

    const TITLE_PT: f64 = 14.0;
    let line_height = TITLE_PT * 1.3;
    let (title_area, plot_area) = root.split_vertically(px(line_height * fig.title.len() as f64 + 12.0));

    let title_style = TextStyle::from(FontDesc::new(FontFamily::SansSerif, TITLE_PT * scale, FontStyle::Normal))
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in fig.title.iter().enumerate() {
        let y = ((8.0 + line_height * i as f64) * scale).round() as i32;
        title_area.draw_text(line, &title_style, (width as i32 / 2, y))?;
    }

    let (x0, x1) = fig.x_range;
    let (y0, y1) = fig.y_range;
    let x_keys = fig.x_ticks.iter().map(|t| t.0).collect::<Vec<_>>();

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(px(12.0))
        .x_label_area_size(px(36.0))
        .y_label_area_size(px(48.0))
        .build_cartesian_2d(TickedAxis::new(x0 .. x1, x_keys),
                            TickedAxis::new(y0 .. y1, fig.y_ticks.clone()))?;

    let x_fmt = |k: &f64| fig.x_tick_label(*k);
    let y_fmt = |v: &f64| format_tick(*v);
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(fig.x_ticks.len().max(2))
            .y_labels(fig.y_ticks.len().max(2))
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_desc(fig.x_label.as_str())
            .y_desc(fig.y_label.as_str())
            .label_style(FontDesc::new(FontFamily::SansSerif, 10.0 * scale, FontStyle::Normal))
            .axis_desc_style(FontDesc::new(FontFamily::SansSerif, 12.0 * scale, FontStyle::Normal))
            .bold_line_style(BLACK.mix(0.2).stroke_width(px(0.8)))
            .light_line_style(TRANSPARENT)
            .axis_style(BLACK.stroke_width(px(0.8)))
            .set_all_tick_mark_size(px(3.5));
        if !fig.style.grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;
    }

    let in_x_range = |p: &Point| p.0 >= x0 && p.0 <= x1;

    let dash_px = fig.style.dash_thickness * scale;
    let dash_style = rgb(fig.style.dash_color).stroke_width(px(fig.style.dash_thickness));
    chart.draw_series(DashedLineSeries::new(
            vec![(x0, 0.0), (x1, 0.0)],
            (3.7 * dash_px).round().max(1.0) as u32,
            (1.6 * dash_px).round().max(1.0) as u32,
            dash_style))?;

    let line_style = rgb(fig.style.line_color).stroke_width(px(fig.style.line_thickness));
    for segment in fig.segments.iter() {
        chart.draw_series(LineSeries::new(segment.iter().copied().filter(in_x_range), line_style))?;
    }

    if fig.style.marker_size > 0.0 {
        let radius = (fig.style.marker_size.sqrt() / 2.0 * scale).round().max(1.0) as u32;
        let marker_style = rgb(fig.style.marker_color).filled();
        chart.draw_series(fig.markers.iter()
                          .copied()
                          .filter(in_x_range)
                          .map(|p| Circle::new(p, radius, marker_style)))?;
    }

    root.present()?;
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        bandfile::BandData,
        config::RenderConfig,
        render::render,
    };

    fn example_figure() -> BandFigure {
        let data = BandData::from_rows(&[(0.0, -1.0), (1.0, 0.0), (2.0, 1.0),
                                         (0.0,  2.0), (1.0, 3.0), (2.0, 4.0)]).unwrap();
        render(&data, 0.0, &RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpg);
        assert_eq!("tif".parse::<ExportFormat>().unwrap(), ExportFormat::Tiff);
        assert_eq!(ExportFormat::Tiff.to_string(), "tiff");
        assert!(matches!("bmp".parse::<ExportFormat>(), Err(BandError::ExportFailure(_))));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Some("  si_bands "), "Band Structure", ExportFormat::Png),
                   "si_bands.png");
        assert_eq!(output_file_name(Some("   "), "Band Structure", ExportFormat::Svg),
                   "Band Structure.svg");
        assert_eq!(output_file_name(None, "GaAs/PBE", ExportFormat::Jpg), "GaAs_PBE.jpg");
        assert_eq!(output_file_name(None, "", ExportFormat::Tiff), "band_structure.tiff");
    }

    #[test]
    fn test_svg_shows_kpoint_labels() {
        let data = BandData::from_rows(&[(0.0, -1.0), (1.0, 0.0), (2.0, 1.0),
                                         (0.0,  2.0), (1.0, 3.0), (2.0, 4.0)]).unwrap();
        let mut config = RenderConfig::default();
        config.kpoint_labels.insert(0.0, "Γ");
        config.kpoint_labels.insert(2.0, "X");
        let fig = render(&data, 0.0, &config).unwrap();

        let svg = fig.to_svg().unwrap();
        assert!(svg.contains("Γ"));
        assert!(svg.contains("X"));
        assert!(svg.contains("Energy (eV)"));
    }

    #[test]
    fn test_rejects_bad_resolution() {
        let fig = example_figure();
        assert!(matches!(fig.to_bytes(ExportFormat::Png, 0), Err(BandError::ExportFailure(_))));
        assert!(matches!(fig.to_bytes(ExportFormat::Png, 100_000), Err(BandError::ExportFailure(_))));
    }

    #[test]
    fn test_svg_is_deterministic() {
        let fig = example_figure();
        let a = fig.to_bytes(ExportFormat::Svg, 300).unwrap();
        let b = fig.to_bytes(ExportFormat::Svg, 150).unwrap();
        assert_eq!(a, b);

        let svg = String::from_utf8(a).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Band Structure"));

        let html = fig.to_html().unwrap();
        assert!(html.contains("<title>Band Structure</title>"));
        assert!(html.contains("<div class=\"bandplot\">"));
    }
}
