//! Draw detected segments onto a copy of the source image.
//!
//! Each surviving segment is stroked with an anti-aliased line via
//! `tiny-skia`, cycling through a configurable color palette so
//! adjacent-in-order segments are visually distinguishable.

use serde::{Deserialize, Serialize};
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::types::{RgbaImage, Segment};

/// Options for segment annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateOptions {
    /// Stroke width in pixels.
    pub line_width: f32,

    /// Ordered list of RGB colors. Segment `i` is drawn with
    /// `palette[i % palette.len()]`.
    pub palette: Vec<[u8; 3]>,
}

impl AnnotateOptions {
    /// Default stroke width in pixels.
    pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

    /// Default six-color palette: red, green, blue, cyan, magenta, yellow.
    pub const DEFAULT_PALETTE: [[u8; 3]; 6] = [
        [255, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [0, 255, 255],
        [255, 0, 255],
        [255, 255, 0],
    ];
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            line_width: Self::DEFAULT_LINE_WIDTH,
            palette: Self::DEFAULT_PALETTE.to_vec(),
        }
    }
}

/// Stroke each segment onto a copy of `source`.
///
/// The source image is never modified. Colors cycle through
/// `options.palette` by segment index. Degenerate inputs (no segments, an
/// empty palette, a non-positive stroke width, or a zero-sized image)
/// return an unannotated copy.
#[must_use = "returns the annotated image"]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn annotate(source: &RgbaImage, segments: &[Segment], options: &AnnotateOptions) -> RgbaImage {
    if segments.is_empty() || options.palette.is_empty() || options.line_width <= 0.0 {
        return source.clone();
    }

    let (width, height) = source.dimensions();
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return source.clone();
    };

    // Seed the pixmap with the source pixels. tiny-skia stores
    // premultiplied RGBA.
    {
        let data = pixmap.data_mut();
        for (i, pixel) in source.pixels().enumerate() {
            let [r, g, b, a] = pixel.0;
            let off = i * 4;
            data[off] = premultiply(r, a);
            data[off + 1] = premultiply(g, a);
            data[off + 2] = premultiply(b, a);
            data[off + 3] = a;
        }
    }

    let stroke = Stroke {
        width: options.line_width,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };

    for (i, segment) in segments.iter().enumerate() {
        let [r, g, b] = options.palette[i % options.palette.len()];
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;

        let mut pb = PathBuilder::new();
        pb.move_to(segment.start.x as f32, segment.start.y as f32);
        pb.line_to(segment.end.x as f32, segment.end.y as f32);
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    // Convert back from premultiplied to straight RGBA.
    let pixmap_data = pixmap.data();
    let mut out = RgbaImage::new(width, height);
    for (i, pixel) in out.pixels_mut().enumerate() {
        let off = i * 4;
        let a = pixmap_data[off + 3];
        if a == 0 {
            *pixel = image::Rgba([0, 0, 0, 0]);
        } else {
            let r = u16::from(pixmap_data[off]) * 255 / u16::from(a);
            let g = u16::from(pixmap_data[off + 1]) * 255 / u16::from(a);
            let b = u16::from(pixmap_data[off + 2]) * 255 / u16::from(a);
            *pixel = image::Rgba([r as u8, g as u8, b as u8, a]);
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
fn premultiply(channel: u8, alpha: u8) -> u8 {
    (u16::from(channel) * u16::from(alpha) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]))
    }

    /// Assert the pixel is dominated by the expected RGB channel pattern.
    fn assert_color_close(pixel: &image::Rgba<u8>, expected: [u8; 3]) {
        for (c, (&got, &want)) in pixel.0.iter().zip(expected.iter()).enumerate() {
            let diff = i16::from(got) - i16::from(want);
            assert!(
                diff.abs() <= 50,
                "channel {c}: expected ~{want}, got {got} (pixel {pixel:?})",
            );
        }
    }

    #[test]
    fn no_segments_returns_identical_image() {
        let img = black_image(10, 10);
        let out = annotate(&img, &[], &AnnotateOptions::default());
        assert_eq!(img, out);
    }

    #[test]
    fn empty_palette_returns_identical_image() {
        let img = black_image(10, 10);
        let options = AnnotateOptions {
            palette: vec![],
            ..AnnotateOptions::default()
        };
        let out = annotate(&img, &[Segment::from_coords(1, 5, 8, 5)], &options);
        assert_eq!(img, out);
    }

    #[test]
    fn source_image_is_not_modified() {
        let img = black_image(20, 20);
        let before = img.clone();
        let _annotated = annotate(
            &img,
            &[Segment::from_coords(2, 10, 18, 10)],
            &AnnotateOptions::default(),
        );
        assert_eq!(img, before);
    }

    #[test]
    fn output_dimensions_match_source() {
        let img = black_image(17, 31);
        let out = annotate(
            &img,
            &[Segment::from_coords(1, 1, 15, 29)],
            &AnnotateOptions::default(),
        );
        assert_eq!(out.dimensions(), (17, 31));
    }

    #[test]
    fn first_segment_uses_first_palette_color() {
        let img = black_image(20, 20);
        let out = annotate(
            &img,
            &[Segment::from_coords(5, 10, 15, 10)],
            &AnnotateOptions::default(),
        );
        // Midpoint of a width-2 stroke is fully covered.
        assert_color_close(out.get_pixel(10, 10), AnnotateOptions::DEFAULT_PALETTE[0]);
    }

    #[test]
    fn pixels_away_from_segments_are_unchanged() {
        let img = black_image(20, 20);
        let out = annotate(
            &img,
            &[Segment::from_coords(5, 10, 15, 10)],
            &AnnotateOptions::default(),
        );
        assert_eq!(out.get_pixel(10, 2), &image::Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(2, 18), &image::Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn palette_cycles_by_segment_index() {
        // Seven parallel segments; the seventh wraps back to the first
        // palette color.
        let img = black_image(30, 30);
        let segments: Vec<Segment> = (0..7)
            .map(|i| Segment::from_coords(4, 2 + i * 4, 26, 2 + i * 4))
            .collect();
        let out = annotate(&img, &segments, &AnnotateOptions::default());

        let palette = AnnotateOptions::DEFAULT_PALETTE;
        for (i, segment) in segments.iter().enumerate() {
            let mid_x = (segment.start.x + segment.end.x) / 2;
            #[allow(clippy::cast_sign_loss)]
            let pixel = out.get_pixel(mid_x as u32, segment.start.y as u32);
            assert_color_close(pixel, palette[i % palette.len()]);
        }
    }

    #[test]
    fn custom_palette_is_respected() {
        let img = black_image(20, 20);
        let options = AnnotateOptions {
            line_width: 2.0,
            palette: vec![[7, 200, 9]],
        };
        let out = annotate(&img, &[Segment::from_coords(4, 10, 16, 10)], &options);
        assert_color_close(out.get_pixel(10, 10), [7, 200, 9]);
    }
}
