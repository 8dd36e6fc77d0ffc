//! Render configuration, layered from built-in defaults, an optional TOML file,
//! `BANDPLOT_*` environment variables and command-line overrides.
use std::{
    fmt,
    path::Path,
    str::FromStr,
};

use anyhow::{
    anyhow,
    bail,
    Context,
};
use figment::{
    Figment,
    providers::{
        Env,
        Format,
        Serialized,
        Toml,
    },
};
use log::{
    info,
    warn,
};
use serde::{
    Serialize,
    Deserialize,
};

use crate::{
    types::Result,
    kpath::HighSymmetryPoints,
    render::ExportFormat,
};


const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black",   [0x00, 0x00, 0x00]),
    ("white",   [0xff, 0xff, 0xff]),
    ("gray",    [0x80, 0x80, 0x80]),
    ("grey",    [0x80, 0x80, 0x80]),
    ("silver",  [0xc0, 0xc0, 0xc0]),
    ("red",     [0xff, 0x00, 0x00]),
    ("maroon",  [0x80, 0x00, 0x00]),
    ("orange",  [0xff, 0xa5, 0x00]),
    ("yellow",  [0xff, 0xff, 0x00]),
    ("olive",   [0x80, 0x80, 0x00]),
    ("lime",    [0x00, 0xff, 0x00]),
    ("green",   [0x00, 0x80, 0x00]),
    ("teal",    [0x00, 0x80, 0x80]),
    ("cyan",    [0x00, 0xff, 0xff]),
    ("aqua",    [0x00, 0xff, 0xff]),
    ("blue",    [0x00, 0x00, 0xff]),
    ("navy",    [0x00, 0x00, 0x80]),
    ("purple",  [0x80, 0x00, 0x80]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("fuchsia", [0xff, 0x00, 0xff]),
];


/// An opaque RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);


/// Accepts `#RGB`, `#RRGGBB` and a handful of CSS color names.
impl FromStr for HexColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(&(_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| name.eq_ignore_ascii_case(s)) {
            return Ok(Self(rgb));
        }

        let hex = s.strip_prefix('#')
            .ok_or_else(|| anyhow!("The input color {:?} is neither a named color nor a hex code like `#FF0003`", s))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Invalid hex color {:?}", s);
        }

        let digits = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_owned(),
            _ => bail!("Hex color {:?} must have 3 or 6 digits", s),
        };

        let mut rgb = [0u8; 3];
        for (i, c) in rgb.iter_mut().enumerate() {
            *c = u8::from_str_radix(&digits[2*i .. 2*i + 2], 16)?;
        }
        Ok(Self(rgb))
    }
}

impl TryFrom<String> for HexColor {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}


/// Every display option of a band-structure figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title:          String,
    pub x_label:        String,
    pub y_label:        String,

    /// Band line color.
    pub color:          HexColor,
    /// Band line width in points.
    pub line_thickness: f64,

    pub marker_color:   HexColor,
    /// Marker area in points squared, 0 hides the gap markers.
    pub marker_size:    f64,

    /// Color of the dashed reference-energy line.
    pub dash_color:     HexColor,
    pub dash_thickness: f64,

    /// Spacing of the energy ticks, in eV.
    pub y_increment:    f64,

    /// Append the gap size to the title.
    pub show_gap:       bool,
    pub grid:           bool,

    pub dpi:            u32,
    pub format:         ExportFormat,

    pub kpoint_labels:  HighSymmetryPoints,
}


impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title:          "Band Structure".to_owned(),
            x_label:        "k-points".to_owned(),
            y_label:        "Energy (eV)".to_owned(),
            color:          HexColor([0xff, 0x00, 0x03]),
            line_thickness: 1.0,
            marker_color:   HexColor([0xff, 0x00, 0x03]),
            marker_size:    50.0,
            dash_color:     HexColor([0x00, 0x00, 0x00]),
            dash_thickness: 1.0,
            y_increment:    2.0,
            show_gap:       false,
            grid:           true,
            dpi:            300,
            format:         ExportFormat::Png,
            kpoint_labels:  HighSymmetryPoints::new(),
        }
    }
}


/// Values given explicitly on the command line; `None` leaves the layered value alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title:          Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color:          Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_color:   Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_size:    Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_color:     Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_increment:    Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_gap:       Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid:           Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi:            Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpoint_labels:  Option<HighSymmetryPoints>,
}


impl RenderConfig {
    /// Merge defaults, the optional config file, `BANDPLOT_*` variables and `overrides`,
    /// later layers winning.
    pub fn load(path: Option<&Path>, overrides: &RenderOverrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                bail!("Configuration file {:?} is not accessible", path);
            }
            info!("Reading render configuration from {:?}", path);
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed("BANDPLOT_").ignore(&["log"]))
            .merge(Serialized::defaults(overrides))
            .extract()
            .context("Invalid render configuration")
    }

    /// The full default configuration as TOML, with two example labels.
    pub fn template() -> Result<String> {
        let mut config = Self::default();
        config.kpoint_labels.insert(0.0, "Γ");
        config.kpoint_labels.insert(1.0, "X");
        Ok(toml::to_string_pretty(&config)?)
    }

    /// Warn about values outside the ranges the tool is tuned for; they are still honoured.
    pub fn check_ranges(&self) {
        if !(150 ..= 1200).contains(&self.dpi) {
            warn!("DPI {} is outside the suggested range 150 ..= 1200", self.dpi);
        }
        for (name, v) in [("line_thickness", self.line_thickness), ("dash_thickness", self.dash_thickness)] {
            if !(0.25 ..= 5.0).contains(&v) {
                warn!("{} = {} is outside the suggested range 0.25 ..= 5.0", name, v);
            }
        }
        if !(0.0 ..= 150.0).contains(&self.marker_size) {
            warn!("marker_size = {} is outside the suggested range 0 ..= 150", self.marker_size);
        }
        if !(self.y_increment > 0.0 && self.y_increment.is_finite()) {
            warn!("y_increment = {} is not a positive number, energy ticks are chosen automatically",
                  self.y_increment);
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn test_parse_color() {
        assert_eq!("#FF0003".parse::<HexColor>().unwrap(), HexColor([255, 0, 3]));
        assert_eq!("#ff0003".parse::<HexColor>().unwrap(), HexColor([255, 0, 3]));
        assert_eq!("#0f0".parse::<HexColor>().unwrap(), HexColor([0, 255, 0]));
        assert_eq!("Navy".parse::<HexColor>().unwrap(), HexColor([0, 0, 128]));
        assert!("FF0003".parse::<HexColor>().is_err());
        assert!("#FF00".parse::<HexColor>().is_err());
        assert!("#GG0000".parse::<HexColor>().is_err());
        assert!("notacolor".parse::<HexColor>().is_err());
        assert_eq!(HexColor([255, 0, 3]).to_string(), "#FF0003");
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::load(None, &RenderOverrides::default()).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_layers() {
        let dir = TempDir::new("bandplot_test").unwrap();
        let path = dir.path().join("band.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, r##"
title = "Si"
color = "#0000FF"
y_increment = 1.0
grid = false

[[kpoint_labels]]
k = 0.0
label = "L"

[[kpoint_labels]]
k = 1.2
label = "Γ"
"##).unwrap();

        let overrides = RenderOverrides {
            title: Some("Si (PBE)".to_owned()),
            dpi:   Some(600),
            ..Default::default()
        };
        let config = RenderConfig::load(Some(&path), &overrides).unwrap();
        assert_eq!(config.title, "Si (PBE)");
        assert_eq!(config.color, HexColor([0, 0, 255]));
        assert_eq!(config.y_increment, 1.0);
        assert!(!config.grid);
        assert_eq!(config.dpi, 600);
        assert_eq!(config.x_label, "k-points");
        assert_eq!(config.kpoint_labels.iter().collect::<Vec<_>>(),
                   vec![(0.0, "L"), (1.2, "Γ")]);

        assert!(RenderConfig::load(Some(&dir.path().join("missing.toml")), &overrides).is_err());
    }

    #[test]
    fn test_template_roundtrip() {
        let dir = TempDir::new("bandplot_test").unwrap();
        let path = dir.path().join("template.toml");
        std::fs::write(&path, RenderConfig::template().unwrap()).unwrap();
        let config = RenderConfig::load(Some(&path), &RenderOverrides::default()).unwrap();
        assert_eq!(config.kpoint_labels.len(), 2);
        assert_eq!(config.format, ExportFormat::Png);
        assert_eq!(config.title, "Band Structure");
    }
}
