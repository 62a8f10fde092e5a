// main.rs
//
// Slice an STL file into layer images.

use clap::Parser;
use layerstack::{
    GuideParams, Mesh, SliceParams, float_types::Real, raster::CropMode, slice_to_layers,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// STL file to slice
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory the layer images are written to (created if missing)
    #[arg(value_name = "OUT_DIR")]
    out_dir: PathBuf,

    /// Distance between slicing planes
    #[arg(long, default_value_t = 0.05)]
    layer_height: Real,

    /// Width and height of each image in pixels
    #[arg(long, default_value_t = 1024)]
    canvas_size: u32,

    /// Border around the reference circle in pixels
    #[arg(long, default_value_t = 50)]
    margin: u32,

    /// Contour stroke width in pixels
    #[arg(long, default_value_t = 2.0)]
    stroke_width: Real,

    /// Slice the bare mesh without alignment guide rods
    #[arg(long)]
    no_guides: bool,

    /// Outward offset of the guide rods from the bounding box
    #[arg(long, default_value_t = 0.01)]
    guide_padding: Real,

    /// Guide rod radius
    #[arg(long, default_value_t = 0.1)]
    guide_radius: Real,

    /// Side faces per guide rod
    #[arg(long, default_value_t = 12)]
    guide_segments: usize,

    /// Crop every image to its drawn content instead of the full canvas
    #[arg(long)]
    tight_crop: bool,
}

impl Args {
    fn slice_params(&self) -> SliceParams {
        let params = SliceParams::default()
            .with_layer_height(self.layer_height)
            .with_canvas_size(self.canvas_size)
            .with_margin(self.margin)
            .with_stroke_width(self.stroke_width)
            .with_crop(if self.tight_crop {
                CropMode::Tight
            } else {
                CropMode::FullCanvas
            });

        if self.no_guides {
            params.without_guides()
        } else {
            params.with_guides(GuideParams {
                padding: self.guide_padding,
                radius: self.guide_radius,
                segments: self.guide_segments,
            })
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    let mesh = Mesh::<()>::from_stl_file(&args.input, None)?;
    let report = slice_to_layers(&mesh, &args.out_dir, &args.slice_params())?;

    println!(
        "{}: {} of {} layers written to {} (z {:.4} .. {:.4})",
        args.input.display(),
        report.written.len(),
        report.candidate_layers,
        args.out_dir.display(),
        report.z_min,
        report.z_max,
    );
    if !report.skipped.is_empty() {
        println!("empty layers skipped: {:?}", report.skipped);
    }

    Ok(())
}
