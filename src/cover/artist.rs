//! PNG cover drawing with ab_glyph rasterization onto an image buffer.

use super::{CoverError, TextMetrics, fit_text_box};
use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

const CANVAS_WIDTH: u32 = 940;
const CANVAS_HEIGHT: u32 = 529;

const BACKGROUND: Rgb<u8> = Rgb([0xaa, 0xaa, 0xaa]);
const BLUE: Rgb<u8> = Rgb([0x00, 0x00, 0xff]);
const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const ORANGE: Rgb<u8> = Rgb([0xff, 0xa5, 0x00]);

const TITLE_SIZE: f32 = 100.0;
const TITLE_ORIGIN: (f32, f32) = (40.0, 142.0);

const CAPTION_START_SIZE: f32 = 50.0;
const CAPTION_ORIGIN: (f32, f32) = (40.0, 240.0);
const CAPTION_BOX: (f64, f64) = (880.0, 300.0);

/// The three decorative dots along the lower band.
const DOTS: [(i32, Rgb<u8>); 3] = [(68, BLUE), (133, WHITE), (198, ORANGE)];
const DOT_CENTER_Y: i32 = 450;
const DOT_RADIUS: i32 = 26;

/// Renders cover PNGs from a single loaded font.
pub struct CoverArtist {
    font: FontVec,
}

impl TextMetrics for CoverArtist {
    fn measure(&self, text: &str, font_size: f32) -> (f64, f64) {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        let line_height = scaled.height() + scaled.line_gap();
        let mut max_width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let width: f32 = line
                .chars()
                .map(|c| scaled.h_advance(scaled.glyph_id(c)))
                .sum();
            max_width = max_width.max(width);
        }
        (max_width as f64, lines as f64 * line_height as f64)
    }
}

impl CoverArtist {
    pub fn load(path: &Path) -> Result<Self, CoverError> {
        let data = fs::read(path)?;
        let font =
            FontVec::try_from_vec(data).map_err(|_| CoverError::Font(path.to_path_buf()))?;
        Ok(CoverArtist { font })
    }

    /// Draw one cover and save it as PNG at `out_path`.
    ///
    /// The title is drawn at a fixed size and may overflow to the right;
    /// the caption is fitted into its box and gets a closing period.
    pub fn render(&self, title: &str, caption: &str, out_path: &Path) -> Result<(), CoverError> {
        let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);

        self.draw_text(&mut canvas, title, TITLE_ORIGIN, TITLE_SIZE, BLUE);

        let layout = fit_text_box(
            self,
            caption,
            CAPTION_BOX.0,
            CAPTION_BOX.1,
            CAPTION_START_SIZE,
        )?;
        let caption = format!("{}.", layout.text);
        self.draw_text(&mut canvas, &caption, CAPTION_ORIGIN, layout.font_size, WHITE);

        for (x, color) in DOTS {
            draw_disc(&mut canvas, x, DOT_CENTER_Y, DOT_RADIUS, color);
        }

        canvas.save(out_path)?;
        Ok(())
    }

    /// Draw multi-line text with `origin` as the first baseline.
    fn draw_text(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        origin: (f32, f32),
        font_size: f32,
        color: Rgb<u8>,
    ) {
        let scale = PxScale::from(font_size);
        let scaled = self.font.as_scaled(scale);
        let line_height = scaled.height() + scaled.line_gap();

        let mut baseline = origin.1;
        for line in text.split('\n') {
            let mut caret = origin.0;
            let mut previous = None;
            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                let glyph: Glyph = id.with_scale_and_position(scale, point(caret, baseline));
                if let Some(outlined) = self.font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        let px = bounds.min.x as i32 + gx as i32;
                        let py = bounds.min.y as i32 + gy as i32;
                        if px >= 0
                            && py >= 0
                            && (px as u32) < canvas.width()
                            && (py as u32) < canvas.height()
                        {
                            blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
                        }
                    });
                }
                caret += scaled.h_advance(id);
                previous = Some(id);
            }
            baseline += line_height;
        }
    }
}

/// Alpha-blend `color` over `pixel` at the given coverage.
fn blend(pixel: &mut Rgb<u8>, color: Rgb<u8>, coverage: f32) {
    let coverage = coverage.clamp(0.0, 1.0);
    for i in 0..3 {
        let base = pixel.0[i] as f32;
        let ink = color.0[i] as f32;
        pixel.0[i] = (base + (ink - base) * coverage) as u8;
    }
}

/// Draw a filled circle, clipped to the canvas.
fn draw_disc(canvas: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_rejects_non_font_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bogus.ttf");
        std::fs::write(&path, b"not a font at all").unwrap();
        assert!(matches!(
            CoverArtist::load(&path),
            Err(CoverError::Font(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            CoverArtist::load(Path::new("nope/missing.ttf")),
            Err(CoverError::Io(_))
        ));
    }

    #[test]
    fn disc_fills_center_and_respects_radius() {
        let mut canvas = RgbImage::from_pixel(100, 100, BACKGROUND);
        draw_disc(&mut canvas, 50, 50, 10, BLUE);
        assert_eq!(*canvas.get_pixel(50, 50), BLUE);
        assert_eq!(*canvas.get_pixel(50, 60), BLUE);
        assert_eq!(*canvas.get_pixel(50, 61), BACKGROUND);
    }

    #[test]
    fn disc_clips_at_canvas_edge() {
        let mut canvas = RgbImage::from_pixel(20, 20, BACKGROUND);
        draw_disc(&mut canvas, 0, 0, 10, ORANGE);
        assert_eq!(*canvas.get_pixel(0, 0), ORANGE);
        assert_eq!(*canvas.get_pixel(19, 19), BACKGROUND);
    }

    #[test]
    fn blend_endpoints() {
        let mut pixel = Rgb([0u8, 0, 0]);
        blend(&mut pixel, WHITE, 0.0);
        assert_eq!(pixel, Rgb([0, 0, 0]));
        blend(&mut pixel, WHITE, 1.0);
        assert_eq!(pixel, Rgb([255, 255, 255]));
    }
}
