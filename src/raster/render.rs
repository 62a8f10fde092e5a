//! Layer image rasterizer
//!
//! Draws a dashed reference circle and the contours of a
//! [`NormalizedSection`] into an RGB canvas:
//! - white background
//! - light gray dashed circle of radius `base_radius` around the canvas centre
//! - each contour stroked in `palette[index % palette.len()]`
//!
//! Colours are picked by contour position only; the palette names are labels,
//! not a classification of the geometry.

use crate::float_types::{Real, TAU};
use crate::raster::canvas::NormalizedSection;
use image::{ImageBuffer, Rgb, RgbImage, imageops};
use std::path::Path;

/// A named palette colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub color: Rgb<u8>,
}

/// Cyclic contour palette.
pub const DEFAULT_PALETTE: [PaletteEntry; 6] = [
    PaletteEntry { name: "upskin", color: Rgb([220, 20, 60]) },
    PaletteEntry { name: "downskin", color: Rgb([30, 144, 255]) },
    PaletteEntry { name: "inskin", color: Rgb([34, 139, 34]) },
    PaletteEntry { name: "contour", color: Rgb([0, 0, 0]) },
    PaletteEntry { name: "support", color: Rgb([255, 140, 0]) },
    PaletteEntry { name: "infill", color: Rgb([148, 0, 211]) },
];

/// How much of the canvas ends up in the written image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    /// The whole `canvas_size`² canvas; every layer has the same dimensions
    #[default]
    FullCanvas,
    /// Cropped to the drawn pixels with no padding
    Tight,
}

/// Sampling step along strokes, in pixels.
const STROKE_STEP: Real = 0.5;

/// Rasterizes normalized sections into square RGB images.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    canvas_size: u32,
    background: Rgb<u8>,
    guide_color: Rgb<u8>,
    stroke_width: Real,
    dash: (Real, Real),
    palette: Vec<PaletteEntry>,
    crop: CropMode,
}

impl Rasterizer {
    /// Create a rasterizer for a `canvas_size`² canvas
    pub fn new(canvas_size: u32) -> Self {
        Self {
            canvas_size,
            background: Rgb([255, 255, 255]),
            guide_color: Rgb([211, 211, 211]),
            stroke_width: 2.0,
            dash: (6.0, 4.0),
            palette: DEFAULT_PALETTE.to_vec(),
            crop: CropMode::FullCanvas,
        }
    }

    /// Set the contour stroke width in pixels
    pub fn with_stroke_width(mut self, width: Real) -> Self {
        self.stroke_width = width;
        self
    }

    /// Replace the contour palette; an empty palette is ignored
    pub fn with_palette(mut self, palette: Vec<PaletteEntry>) -> Self {
        if !palette.is_empty() {
            self.palette = palette;
        }
        self
    }

    pub fn with_crop(mut self, crop: CropMode) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_background(mut self, color: Rgb<u8>) -> Self {
        self.background = color;
        self
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    /// Palette entry for the contour at `index`.
    pub fn entry_for(&self, index: usize) -> &PaletteEntry {
        &self.palette[index % self.palette.len()]
    }

    /// Draw the reference circle and every contour with at least two points.
    pub fn render(&self, section: &NormalizedSection) -> RgbImage {
        let mut image = ImageBuffer::from_pixel(self.canvas_size, self.canvas_size, self.background);

        let half = self.canvas_size as Real / 2.0;
        self.draw_dashed_circle(&mut image, [half, half], section.base_radius);

        for contour in &section.contours {
            if contour.len() < 2 {
                continue;
            }
            let color = self.entry_for(contour.index).color;
            let points: Vec<[Real; 2]> = contour.points().collect();
            for pair in points.windows(2) {
                self.draw_segment(&mut image, pair[0], pair[1], self.stroke_width, color);
            }
        }

        match self.crop {
            CropMode::FullCanvas => image,
            CropMode::Tight => crop_to_content(&image, self.background),
        }
    }

    /// Save the image as PNG
    pub fn save_png(&self, image: &RgbImage, path: &Path) -> Result<(), image::ImageError> {
        image.save_with_format(path, image::ImageFormat::Png)
    }

    fn draw_dashed_circle(&self, image: &mut RgbImage, center: [Real; 2], radius: Real) {
        if radius <= 0.0 {
            return;
        }
        let (on, off) = self.dash;
        let period = on + off;
        let circumference = TAU * radius;
        let steps = (circumference / STROKE_STEP).ceil() as usize;

        for k in 0..steps {
            let arc = k as Real * STROKE_STEP;
            if arc % period >= on {
                continue;
            }
            let angle = arc / radius;
            let p = [
                center[0] + radius * angle.cos(),
                center[1] + radius * angle.sin(),
            ];
            self.stamp(image, p, 1.0, self.guide_color);
        }
    }

    fn draw_segment(&self, image: &mut RgbImage, a: [Real; 2], b: [Real; 2], width: Real, color: Rgb<u8>) {
        let length = (b[0] - a[0]).hypot(b[1] - a[1]);
        let steps = ((length / STROKE_STEP).ceil() as usize).max(1);
        for k in 0..=steps {
            let t = k as Real / steps as Real;
            let p = [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t];
            self.stamp(image, p, width, color);
        }
    }

    /// Paint the pixels whose centres lie within a `width`-wide square around
    /// canvas point `p`. Canvas Y points up, image rows point down.
    fn stamp(&self, image: &mut RgbImage, p: [Real; 2], width: Real, color: Rgb<u8>) {
        let half = (width / 2.0).max(0.5);
        let x = p[0];
        let y = self.canvas_size as Real - p[1];

        let x0 = (x - half - 0.5).ceil() as i64;
        let x1 = (x + half - 0.5).floor() as i64;
        let y0 = (y - half - 0.5).ceil() as i64;
        let y1 = (y + half - 0.5).floor() as i64;
        let size = i64::from(self.canvas_size);

        for py in y0.max(0)..=y1.min(size - 1) {
            for px in x0.max(0)..=x1.min(size - 1) {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Crop to the bounding box of non-background pixels. An image without
/// drawn pixels is returned unchanged.
pub fn crop_to_content(image: &RgbImage, background: Rgb<u8>) -> RgbImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == background {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    match bounds {
        Some((x0, y0, x1, y1)) => imageops::crop_imm(image, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image(),
        None => image.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::canvas::normalize;
    use crate::section::Section;

    fn square_section() -> NormalizedSection {
        let section = Section::from_polylines(vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
            vec![[0.4, 0.5], [0.6, 0.5]],
        ]);
        normalize(&section, 200, 20).unwrap()
    }

    #[test]
    fn palette_cycles_by_index() {
        let r = Rasterizer::new(64);
        assert_eq!(r.entry_for(0).name, "upskin");
        assert_eq!(r.entry_for(6), r.entry_for(0));
        assert_eq!(r.entry_for(9).name, "contour");
    }

    #[test]
    fn empty_palette_is_ignored() {
        let r = Rasterizer::new(64).with_palette(Vec::new());
        assert_eq!(r.palette().len(), 6);
    }

    #[test]
    fn renders_full_canvas_with_contour_colours() {
        let r = Rasterizer::new(200);
        let n = square_section();
        let image = r.render(&n);
        assert_eq!(image.dimensions(), (200, 200));

        // Corner stays background
        assert_eq!(*image.get_pixel(0, 0), Rgb([255, 255, 255]));

        // Bottom-left corner of the square, in image rows
        let [x, y] = n.contours[0].points().next().unwrap();
        let px = x.floor() as u32;
        let py = (200.0 - y).floor() as u32;
        assert_eq!(*image.get_pixel(px, py), DEFAULT_PALETTE[0].color);

        // Centre segment uses the second colour
        assert_eq!(*image.get_pixel(100, 100), DEFAULT_PALETTE[1].color);

        // The guide circle starts with a dash at angle 0
        assert_eq!(*image.get_pixel(100 + 80, 100), Rgb([211, 211, 211]));
    }

    #[test]
    fn seventh_contour_wraps_to_first_colour() {
        // Seven stacked horizontal strokes, indices 0..=6
        let section = Section::from_polylines((0..7).map(|i| vec![[0.0, i as Real], [1.0, i as Real]]));
        let n = normalize(&section, 200, 20).unwrap();
        let image = Rasterizer::new(200).render(&n);

        let pixel_at_middle = |index: usize| {
            let pts: Vec<[Real; 2]> = n.contours[index].points().collect();
            let x = (pts[0][0] + pts[1][0]) / 2.0;
            let y = (pts[0][1] + pts[1][1]) / 2.0;
            *image.get_pixel(x.floor() as u32, (200.0 - y).floor() as u32)
        };

        assert_eq!(pixel_at_middle(6), DEFAULT_PALETTE[0].color);
        assert_eq!(pixel_at_middle(5), DEFAULT_PALETTE[5].color);
        assert_eq!(pixel_at_middle(1), DEFAULT_PALETTE[1].color);
        assert_ne!(pixel_at_middle(6), pixel_at_middle(5));
    }

    #[test]
    fn tight_crop_trims_background() {
        let r = Rasterizer::new(200).with_crop(CropMode::Tight);
        let image = r.render(&square_section());
        let (w, h) = image.dimensions();
        assert!(w < 200 && h < 200);
        assert!(w >= 160 && h >= 160);
    }

    #[test]
    fn blank_image_is_not_cropped() {
        let blank = ImageBuffer::from_pixel(10, 10, Rgb([255, 255, 255]));
        let cropped = crop_to_content(&blank, Rgb([255, 255, 255]));
        assert_eq!(cropped.dimensions(), (10, 10));
    }
}
