//! Vector output.
//!
//! Serializes a [`Scene`] to a standalone SVG document. Coordinates are
//! already in canvas units with a top-left origin, which matches SVG user
//! space, so no transform is needed.

use std::fmt::Write as _;
use std::path::Path;

use geo::{LineString, MultiPolygon};

use crate::layout::Rect;
use crate::scene::{Anchor, Scene};

/// Writes the scene to `path` as an SVG document.
///
/// # Errors
///
/// * If the file cannot be written.
pub fn write_svg(scene: &Scene, path: &Path) -> Result<(), std::io::Error> {
    std::fs::write(path, document(scene))
}

/// Renders the scene as SVG markup.
#[must_use]
pub fn document(scene: &Scene) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" \
         viewBox=\"0 0 {w:.0} {h:.0}\">",
        w = scene.width,
        h = scene.height,
    );
    let _ = writeln!(
        out,
        "<rect width=\"{:.0}\" height=\"{:.0}\" fill=\"#ffffff\"/>",
        scene.width, scene.height,
    );

    for (polygon, bucket) in &scene.fills {
        let _ = writeln!(
            out,
            "<path d=\"{}\" fill=\"{}\" fill-rule=\"evenodd\"/>",
            fill_path(polygon),
            bucket.color(),
        );
    }

    for stroke in &scene.strokes {
        let _ = writeln!(
            out,
            "<path d=\"{}\" fill=\"none\" stroke=\"#000000\" stroke-width=\"{:.2}\"/>",
            line_path(&stroke.path),
            stroke.width,
        );
    }

    for frame in &scene.frames {
        let _ = writeln!(
            out,
            "{}",
            rect_markup(frame, "#ffffff", Some(("#000000", 1.0))),
        );
    }
    for swatch in &scene.swatches {
        let _ = writeln!(out, "{}", rect_markup(&swatch.rect, swatch.bucket.color(), None));
    }

    for label in &scene.labels {
        let anchor = match label.anchor {
            Anchor::Middle => "middle",
            Anchor::Start => "start",
        };
        let weight = if label.bold { " font-weight=\"bold\"" } else { "" };
        let _ = writeln!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"Helvetica, Arial, sans-serif\" \
             font-size=\"{:.1}\" text-anchor=\"{anchor}\"{weight}>{}</text>",
            label.x,
            label.y,
            label.size,
            escape(&label.text),
        );
    }

    out.push_str("</svg>\n");
    out
}

fn rect_markup(rect: &Rect, fill: &str, stroke: Option<(&str, f64)>) -> String {
    let mut markup = format!(
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{fill}\"",
        rect.x, rect.y, rect.width, rect.height,
    );
    if let Some((color, width)) = stroke {
        let _ = write!(markup, " stroke=\"{color}\" stroke-width=\"{width:.1}\"");
    }
    markup.push_str("/>");
    markup
}

/// One `d` attribute covering every ring of the multipolygon. Interior
/// rings cut holes via the evenodd fill rule.
fn fill_path(polygon: &MultiPolygon<f64>) -> String {
    let mut data = String::new();
    for part in &polygon.0 {
        ring_data(&mut data, part.exterior(), true);
        for ring in part.interiors() {
            ring_data(&mut data, ring, true);
        }
    }
    data
}

fn line_path(path: &LineString<f64>) -> String {
    let mut data = String::new();
    ring_data(&mut data, path, false);
    data
}

fn ring_data(data: &mut String, ring: &LineString<f64>, close: bool) {
    for (index, coord) in ring.coords().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        let _ = write!(data, "{command}{:.2} {:.2} ", coord.x, coord.y);
    }
    if close {
        data.push_str("Z ");
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use fuel_map_classify::SurveyYear;
    use fuel_map_fuel_models::SimpleFuel;
    use geo::Polygon;

    use super::*;
    use crate::boundaries::StateLayer;
    use crate::prepare::PreparedYear;
    use crate::scene::single_map;

    fn tiny_scene() -> Scene {
        let polygon = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(-100.0, 30.0), (-98.0, 30.0), (-98.0, 32.0), (-100.0, 30.0)]),
            vec![],
        )]);
        let prepared = PreparedYear {
            year: SurveyYear::Y2023,
            conus: vec![(polygon, SimpleFuel::Propane)],
            alaska: Vec::new(),
            matched: 1,
            unmatched: 0,
            excluded: 0,
            error_rows: 0,
        };
        let states = StateLayer {
            crs: "EPSG:4326".to_string(),
            shapes: Vec::new(),
        };
        single_map(&prepared, &states)
    }

    #[test]
    fn document_is_a_complete_svg() {
        let markup = document(&tiny_scene());
        assert!(markup.starts_with("<?xml"));
        assert!(markup.contains("viewBox=\"0 0 2000 1100\""));
        assert!(markup.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn fills_carry_their_bucket_color() {
        let markup = document(&tiny_scene());
        assert!(markup.contains(&format!("fill=\"{}\"", SimpleFuel::Propane.color())));
        assert!(markup.contains("fill-rule=\"evenodd\""));
    }

    #[test]
    fn every_legend_label_is_present() {
        let markup = document(&tiny_scene());
        for bucket in SimpleFuel::all() {
            assert!(markup.contains(bucket.legend_label()));
        }
        assert!(markup.contains("Primary Heating Fuel by Census Tract, 2023"));
    }

    #[test]
    fn text_is_escaped() {
        let mut scene = tiny_scene();
        scene.labels.clear();
        scene.labels.push(crate::scene::Label {
            text: "Fuel <oil> & gas".to_string(),
            x: 10.0,
            y: 10.0,
            size: 20.0,
            bold: false,
            anchor: Anchor::Start,
        });
        let markup = document(&scene);
        assert!(markup.contains("Fuel &lt;oil&gt; &amp; gas"));
    }

    #[test]
    fn holes_stay_in_the_same_path() {
        let donut = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (4.0, 4.0),
                (6.0, 4.0),
                (6.0, 6.0),
                (4.0, 6.0),
                (4.0, 4.0),
            ])],
        )]);
        let data = fill_path(&donut);
        assert_eq!(data.matches('M').count(), 2);
        assert_eq!(data.matches('Z').count(), 2);
    }
}
