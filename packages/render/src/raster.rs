//! Raster output.
//!
//! Rasterizes a [`Scene`] to PNG by point-in-polygon sampling: every pixel
//! center is looked up in an R-tree fill index, which sidesteps polygon
//! scan conversion. State lines and legend geometry are stamped on top.
//! Text is left to the vector output.

use std::path::Path;
use std::sync::Arc;

use fuel_map_classify::progress::ProgressCallback;
use fuel_map_fuel_models::SimpleFuel;
use fuel_map_spatial::FillIndex;
use image::{Rgb, RgbImage};

use crate::layout::Rect;
use crate::scene::Scene;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Rasterizes the scene at `dpi` and writes it to `path` as a PNG.
///
/// # Errors
///
/// * If encoding fails or the file cannot be written.
pub fn write_png(
    scene: &Scene,
    path: &Path,
    dpi: u32,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), image::ImageError> {
    rasterize(scene, dpi, progress).save(path)
}

/// Renders the scene into an image buffer. Canvas units are hundredths of
/// an inch, so the pixel scale is `dpi / 100`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize(scene: &Scene, dpi: u32, progress: &Arc<dyn ProgressCallback>) -> RgbImage {
    let scale = f64::from(dpi) / 100.0;
    let width = (scene.width * scale).round() as u32;
    let height = (scene.height * scale).round() as u32;
    let mut image = RgbImage::from_pixel(width, height, WHITE);

    let index = FillIndex::new(scene.fills.clone());

    progress.set_total(u64::from(height));
    for py in 0..height {
        let y = (f64::from(py) + 0.5) / scale;
        for px in 0..width {
            let x = (f64::from(px) + 0.5) / scale;
            if let Some(bucket) = index.bucket_at(x, y) {
                image.put_pixel(px, py, rgb(bucket));
            }
        }
        progress.inc(1);
    }

    for stroke in &scene.strokes {
        let radius = (stroke.width * scale / 2.0).max(0.5);
        for segment in stroke.path.lines() {
            stamp_segment(&mut image, &segment, radius, scale);
        }
    }

    for frame in &scene.frames {
        fill_rect(&mut image, frame, scale, WHITE);
        frame_rect(&mut image, frame, scale);
    }
    for swatch in &scene.swatches {
        fill_rect(&mut image, &swatch.rect, scale, rgb(swatch.bucket));
    }

    progress.finish(format!("rasterized {width}x{height} px"));
    image
}

fn rgb(bucket: SimpleFuel) -> Rgb<u8> {
    let (r, g, b) = bucket.rgb();
    Rgb([r, g, b])
}

/// Stamps a square of the stroke radius every half pixel along the segment.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stamp_segment(image: &mut RgbImage, segment: &geo::Line<f64>, radius: f64, scale: f64) {
    let start_x = segment.start.x * scale;
    let start_y = segment.start.y * scale;
    let dx = segment.end.x * scale - start_x;
    let dy = segment.end.y * scale - start_y;
    let steps = (dx.hypot(dy) / 0.5).ceil().max(1.0) as u32;

    for step in 0..=steps {
        let t = f64::from(step) / f64::from(steps);
        stamp(image, start_x + dx * t, start_y + dy * t, radius);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stamp(image: &mut RgbImage, x: f64, y: f64, radius: f64) {
    let min_x = (x - radius).floor().max(0.0) as u32;
    let min_y = (y - radius).floor().max(0.0) as u32;
    let max_x = ((x + radius).ceil().max(0.0) as u32).min(image.width().saturating_sub(1));
    let max_y = ((y + radius).ceil().max(0.0) as u32).min(image.height().saturating_sub(1));

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            image.put_pixel(px, py, BLACK);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_rect(image: &mut RgbImage, rect: &Rect, scale: f64, color: Rgb<u8>) {
    let min_x = (rect.x * scale).round().max(0.0) as u32;
    let min_y = (rect.y * scale).round().max(0.0) as u32;
    let max_x = (((rect.x + rect.width) * scale).round().max(0.0) as u32).min(image.width());
    let max_y = (((rect.y + rect.height) * scale).round().max(0.0) as u32).min(image.height());

    for py in min_y..max_y {
        for px in min_x..max_x {
            image.put_pixel(px, py, color);
        }
    }
}

/// One-canvas-unit black border around the rect.
fn frame_rect(image: &mut RgbImage, rect: &Rect, scale: f64) {
    let edge = 1.0;
    let sides = [
        Rect { x: rect.x, y: rect.y, width: rect.width, height: edge },
        Rect { x: rect.x, y: rect.y + rect.height - edge, width: rect.width, height: edge },
        Rect { x: rect.x, y: rect.y, width: edge, height: rect.height },
        Rect { x: rect.x + rect.width - edge, y: rect.y, width: edge, height: rect.height },
    ];
    for side in &sides {
        fill_rect(image, side, scale, BLACK);
    }
}
