use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    OptProcess,
    bandfile::BandData,
    config::{
        HexColor,
        RenderConfig,
        RenderOverrides,
    },
    kpath::KPointLabel,
    render::{
        render,
        output_file_name,
        ExportFormat,
    },
    commands::common::{
        load_band_data,
        write_to_file,
    },
};


#[derive(Debug, Args)]
/// Plot the band structure and export it as an image.
///
/// Energies are shifted by the reference energy so it sits at zero, where a dashed line is
/// drawn. Every row with k = 0 starts a new band segment. The samples bounding the gap are
/// marked.
///
/// Options are layered: built-in defaults, then the TOML file given by '--config', then
/// BANDPLOT_* environment variables (e.g. BANDPLOT_TITLE), then the flags below.
pub struct Plot {
    #[arg(default_value = "./band.dat")]
    /// Band data file, k in the first column and the raw energy in the second.
    input: PathBuf,

    #[arg(short = 'e', long, default_value_t = 0.0, allow_negative_numbers = true)]
    /// Reference (Fermi) energy in eV, subtracted from every energy.
    efermi: f64,

    #[arg(short, long)]
    /// Render configuration in TOML format. Use '--gen-template' to get a full template.
    config: Option<PathBuf>,

    #[arg(long)]
    /// Write the configuration template to './bandplot.toml' and exit.
    gen_template: bool,

    #[arg(long)]
    /// Figure title, also the default output file name.
    title: Option<String>,

    #[arg(long)]
    x_label: Option<String>,

    #[arg(long)]
    y_label: Option<String>,

    #[arg(long)]
    /// Band line color, '#RRGGBB', '#RGB' or a basic CSS color name.
    color: Option<HexColor>,

    #[arg(long)]
    /// Band line width in points.
    line_thickness: Option<f64>,

    #[arg(long)]
    marker_color: Option<HexColor>,

    #[arg(long)]
    /// Gap marker area in points squared, 0 hides the markers.
    marker_size: Option<f64>,

    #[arg(long)]
    /// Color of the dashed line at the reference energy.
    dash_color: Option<HexColor>,

    #[arg(long)]
    dash_thickness: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    /// Spacing of the energy ticks in eV. Non-positive values select the ticks automatically.
    y_increment: Option<f64>,

    #[arg(long = "kpoint-labels", visible_alias = "kpoint-label", value_delimiter = ',')]
    /// High-symmetry points as '<k>:<label>', comma separated or repeated, e.g. "0:G,1.2:X".
    ///
    /// 'G' and 'Gamma' are written as 'Γ'.
    kpoint_labels: Vec<KPointLabel>,

    #[arg(long)]
    /// Append the gap size to the title.
    show_gap: bool,

    #[arg(long)]
    /// Hide the background grid.
    no_grid: bool,

    #[arg(long)]
    /// Resolution of raster output.
    dpi: Option<u32>,

    #[arg(short, long)]
    /// Output format: jpg, jpeg, png, tiff, tif or svg.
    format: Option<String>,

    #[arg(short, long)]
    /// Output file name without extension, defaults to the title.
    output: Option<String>,

    #[arg(long)]
    /// Also write the figure into a standalone html page.
    htmlout: Option<PathBuf>,

    #[arg(long)]
    /// Print the figure as inline html (an <svg> inside a <div>) to stdout.
    to_inline_html: bool,

    #[arg(long)]
    /// Write the shifted data as text in order to replot it with other tools.
    txtout: Option<PathBuf>,
}


impl Plot {
    fn overrides(&self) -> RenderOverrides {
        RenderOverrides {
            title:          self.title.clone(),
            x_label:        self.x_label.clone(),
            y_label:        self.y_label.clone(),
            color:          self.color,
            line_thickness: self.line_thickness,
            marker_color:   self.marker_color,
            marker_size:    self.marker_size,
            dash_color:     self.dash_color,
            dash_thickness: self.dash_thickness,
            y_increment:    self.y_increment,
            show_gap:       self.show_gap.then_some(true),
            grid:           self.no_grid.then_some(false),
            dpi:            self.dpi,
            kpoint_labels:  (!self.kpoint_labels.is_empty())
                .then(|| self.kpoint_labels.iter().cloned().collect()),
        }
    }

    fn load_config(&self) -> Result<RenderConfig> {
        let mut config = RenderConfig::load(self.config.as_deref(), &self.overrides())?;
        if let Some(format) = self.format.as_deref() {
            config.format = format.parse::<ExportFormat>()?;
        }
        config.check_ranges();
        Ok(config)
    }
}


impl OptProcess for Plot {
    fn process(&self) -> Result<()> {
        if self.gen_template {
            let fname = PathBuf::from("./bandplot.toml");
            info!("Generating render configuration template ...");
            write_to_file(&fname, RenderConfig::template()?.as_bytes())?;
            info!("Template file written to {:?}. Exiting ...", fname);
            return Ok(());
        }

        let config = self.load_config()?;
        let data = load_band_data(&self.input, Some(self.efermi))?;

        let figure = render(&data, self.efermi, &config)?;
        info!("Band gap = {:.3} eV, between {:.3} eV and {:.3} eV relative to the reference",
              figure.gap.gap, figure.gap.highest_negative, figure.gap.lowest_positive);

        let fname = output_file_name(self.output.as_deref(), &config.title, config.format);
        write_to_file(&fname, &figure.to_bytes(config.format, config.dpi)?)?;

        if let Some(txtout) = self.txtout.as_ref() {
            let shifted = BandData {
                kpoints:  data.kpoints.clone(),
                energies: data.shifted_energies(self.efermi),
            };
            write_to_file(txtout, shifted.to_text("k  E-Eref(eV)").as_bytes())?;
        }

        if let Some(htmlout) = self.htmlout.as_ref() {
            write_to_file(htmlout, figure.to_html()?.as_bytes())?;
        }

        if self.to_inline_html {
            info!("Printing inline html to stdout ...");
            println!("{}", figure.to_inline_html()?);
        }

        Ok(())
    }
}
