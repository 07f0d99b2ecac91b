//! Scene assembly.
//!
//! A scene is the resolution-independent draw list both output backends
//! consume: projected tract fills, state boundary strokes, legend frames
//! and swatches, and text labels. The vector backend draws everything; the
//! raster backend draws everything except text.

use fuel_map_fuel_models::SimpleFuel;
use fuel_map_geography_models::{ALASKA, NON_CONUS_STATES};
use geo::{LineString, MapCoords, MultiPolygon};

use crate::boundaries::{self, StateLayer};
use crate::layout::{
    self, Canvas, Extent, GRID_INSET_FRACTION, Projection, Rect, SINGLE_ALASKA, SINGLE_MAIN,
};
use crate::prepare::PreparedYear;

const TITLE_PT: f64 = 24.0;
const ALASKA_LABEL_PT: f64 = 20.0;
const LEGEND_ENTRY_PT: f64 = 16.0;
const LEGEND_TITLE_PT: f64 = 17.0;
const GRID_LEGEND_ENTRY_PT: f64 = 20.0;
const GRID_LEGEND_TITLE_PT: f64 = 22.0;
const STATE_LINE_PT: f64 = 0.6;
const INSET_LINE_PT: f64 = 0.8;

/// Single-map legend anchor (figure fractions, bottom-left origin). The
/// legend frame's right-center point pins here.
const SINGLE_LEGEND_ANCHOR: (f64, f64) = (0.78, 0.30);

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Middle,
    Start,
}

/// A text label. Coordinates give the baseline point.
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub bold: bool,
    pub anchor: Anchor,
}

/// A stroked polyline (state boundary ring or legend rule).
pub struct Stroke {
    pub path: LineString<f64>,
    pub width: f64,
}

/// A legend color swatch.
pub struct Swatch {
    pub rect: Rect,
    pub bucket: SimpleFuel,
}

/// The draw list, in canvas units with a top-left origin.
///
/// Draw order: fills, then strokes, then frames, swatches, and labels, so
/// the legend overlays the map.
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub fills: Vec<(MultiPolygon<f64>, SimpleFuel)>,
    pub strokes: Vec<Stroke>,
    /// White-filled, black-edged boxes under the legends.
    pub frames: Vec<Rect>,
    pub swatches: Vec<Swatch>,
    pub labels: Vec<Label>,
}

impl Scene {
    fn new(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            fills: Vec::new(),
            strokes: Vec::new(),
            frames: Vec::new(),
            swatches: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Projects one panel's fills and state boundaries into the scene.
    /// Panels with no geometry at all are left blank.
    fn add_panel(
        &mut self,
        fills: &[(MultiPolygon<f64>, SimpleFuel)],
        state_shapes: &[&MultiPolygon<f64>],
        panel: Rect,
        stroke_pt: f64,
        geographic: bool,
    ) {
        let mut extent = Extent::empty();
        for (polygon, _) in fills {
            extent.include(polygon);
        }
        for polygon in state_shapes {
            extent.include(polygon);
        }
        let aspect = if geographic {
            extent.geographic_aspect()
        } else {
            1.0
        };
        let Some(projection) = Projection::fit(&extent, &panel, aspect) else {
            return;
        };

        for (polygon, bucket) in fills {
            self.fills.push((project(polygon, &projection), *bucket));
        }

        let width = layout::pt_units(stroke_pt);
        for polygon in state_shapes {
            for part in &polygon.0 {
                self.push_ring(part.exterior(), &projection, width);
                for ring in part.interiors() {
                    self.push_ring(ring, &projection, width);
                }
            }
        }
    }

    fn push_ring(&mut self, ring: &LineString<f64>, projection: &Projection, width: f64) {
        let path = ring.map_coords(|coord| {
            let (x, y) = projection.apply(coord.x, coord.y);
            geo::Coord { x, y }
        });
        self.strokes.push(Stroke { path, width });
    }

    fn label(&mut self, text: String, x: f64, y: f64, size_pt: f64, bold: bool, anchor: Anchor) {
        self.labels.push(Label {
            text,
            x,
            y,
            size: layout::pt_units(size_pt),
            bold,
            anchor,
        });
    }

    /// Boxed vertical legend pinned right of the main panel.
    fn add_single_legend(&mut self, canvas: Canvas) {
        let entry_size = layout::pt_units(LEGEND_ENTRY_PT);
        let title_size = layout::pt_units(LEGEND_TITLE_PT);
        let pad = 14.0;
        let row_height = entry_size * 1.6;
        let title_height = title_size * 1.4;
        let swatch_width = 34.0;
        let title_lines = ["Primary Heating Fuel", "(by census tract)"];

        let widest_title = title_lines
            .iter()
            .map(|line| text_width(line, title_size))
            .fold(0.0, f64::max);
        let widest_entry = SimpleFuel::all()
            .iter()
            .map(|bucket| swatch_width + 10.0 + text_width(bucket.legend_label(), entry_size))
            .fold(0.0, f64::max);
        let box_width = widest_title.max(widest_entry) + 2.0 * pad;

        #[allow(clippy::cast_precision_loss)]
        let rows = SimpleFuel::all().len() as f64;
        let box_height = 2.0 * pad + 2.0 * title_height + 8.0 + rows * row_height;

        let anchor_x = SINGLE_LEGEND_ANCHOR.0 * canvas.width;
        let anchor_y = (1.0 - SINGLE_LEGEND_ANCHOR.1) * canvas.height;
        let frame = Rect {
            x: anchor_x - box_width,
            y: anchor_y - box_height / 2.0,
            width: box_width,
            height: box_height,
        };
        self.frames.push(frame);

        let mut cursor = frame.y + pad + title_size;
        for line in title_lines {
            self.label(
                line.to_string(),
                frame.center_x(),
                cursor,
                LEGEND_TITLE_PT,
                false,
                Anchor::Middle,
            );
            cursor += title_height;
        }
        cursor += 8.0;

        for bucket in SimpleFuel::all() {
            self.swatches.push(Swatch {
                rect: Rect {
                    x: frame.x + pad,
                    y: cursor - entry_size,
                    width: swatch_width,
                    height: entry_size,
                },
                bucket: *bucket,
            });
            self.label(
                bucket.legend_label().to_string(),
                frame.x + pad + swatch_width + 10.0,
                cursor - entry_size * 0.15,
                LEGEND_ENTRY_PT,
                false,
                Anchor::Start,
            );
            cursor += row_height;
        }
    }

    /// Boxed horizontal legend centered along the bottom edge.
    fn add_grid_legend(&mut self, canvas: Canvas) {
        let entry_size = layout::pt_units(GRID_LEGEND_ENTRY_PT);
        let title_size = layout::pt_units(GRID_LEGEND_TITLE_PT);
        let pad = 16.0;
        let swatch_width = 40.0;
        let entry_gap = 36.0;
        let title = "Primary Heating Fuel (by census tract)";

        let entry_widths: Vec<f64> = SimpleFuel::all()
            .iter()
            .map(|bucket| swatch_width + 10.0 + text_width(bucket.legend_label(), entry_size))
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let gaps = (entry_widths.len() - 1) as f64 * entry_gap;
        let row_width: f64 = entry_widths.iter().sum::<f64>() + gaps;
        let box_width = row_width.max(text_width(title, title_size)) + 2.0 * pad;
        let box_height = 2.0 * pad + title_size * 1.4 + entry_size * 1.3;

        let frame = Rect {
            x: (canvas.width - box_width) / 2.0,
            y: canvas.height - box_height - 6.0,
            width: box_width,
            height: box_height,
        };
        self.frames.push(frame);

        self.label(
            title.to_string(),
            frame.center_x(),
            frame.y + pad + title_size,
            GRID_LEGEND_TITLE_PT,
            false,
            Anchor::Middle,
        );

        let row_y = frame.y + pad + title_size * 1.4 + entry_size;
        let mut cursor = frame.center_x() - row_width / 2.0;
        for (bucket, width) in SimpleFuel::all().iter().zip(&entry_widths) {
            self.swatches.push(Swatch {
                rect: Rect {
                    x: cursor,
                    y: row_y - entry_size,
                    width: swatch_width,
                    height: entry_size,
                },
                bucket: *bucket,
            });
            self.label(
                bucket.legend_label().to_string(),
                cursor + swatch_width + 10.0,
                row_y - entry_size * 0.15,
                GRID_LEGEND_ENTRY_PT,
                false,
                Anchor::Start,
            );
            cursor += width + entry_gap;
        }
    }
}

/// Rough width of a text run; used only to size legend frames.
fn text_width(text: &str, size: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let chars = text.chars().count() as f64;
    chars * size * 0.55
}

fn project(polygon: &MultiPolygon<f64>, projection: &Projection) -> MultiPolygon<f64> {
    polygon.map_coords(|coord| {
        let (x, y) = projection.apply(coord.x, coord.y);
        geo::Coord { x, y }
    })
}

fn split_states<'a>(
    states: &'a StateLayer,
) -> (Vec<&'a MultiPolygon<f64>>, Vec<&'a MultiPolygon<f64>>) {
    let conus = states
        .shapes
        .iter()
        .filter(|shape| !NON_CONUS_STATES.contains(&shape.abbr.as_str()))
        .map(|shape| &shape.polygon)
        .collect();
    let alaska = states
        .shapes
        .iter()
        .filter(|shape| shape.abbr == ALASKA)
        .map(|shape| &shape.polygon)
        .collect();
    (conus, alaska)
}

/// Builds the single-year map scene: CONUS panel, Alaska inset, title, and
/// the boxed right-hand legend.
#[must_use]
pub fn single_map(prepared: &PreparedYear, states: &StateLayer) -> Scene {
    let canvas = Canvas::single();
    let mut scene = Scene::new(canvas);
    let (conus_states, alaska_states) = split_states(states);
    let geographic = boundaries::is_geographic_crs(&states.crs);

    scene.add_panel(
        &prepared.conus,
        &conus_states,
        SINGLE_MAIN.to_canvas(canvas),
        STATE_LINE_PT,
        geographic,
    );
    scene.add_panel(
        &prepared.alaska,
        &alaska_states,
        SINGLE_ALASKA.to_canvas(canvas),
        INSET_LINE_PT,
        geographic,
    );

    let (title_x, title_y) = SINGLE_MAIN.point(0.5, 0.97, canvas);
    scene.label(
        format!("Primary Heating Fuel by Census Tract, {}", prepared.year),
        title_x,
        title_y,
        TITLE_PT,
        true,
        Anchor::Middle,
    );

    let (label_x, label_y) = SINGLE_ALASKA.point(0.5, -0.05, canvas);
    scene.label(
        "Alaska".to_string(),
        label_x,
        label_y,
        ALASKA_LABEL_PT,
        true,
        Anchor::Middle,
    );

    scene.add_single_legend(canvas);
    scene
}

/// Builds the multi-year grid scene: one column per year with its own
/// title and Alaska inset, plus the shared bottom legend.
#[must_use]
pub fn grid_map(prepared: &[PreparedYear], states: &StateLayer) -> Scene {
    let canvas = Canvas::grid();
    let mut scene = Scene::new(canvas);
    let (conus_states, alaska_states) = split_states(states);
    let geographic = boundaries::is_geographic_crs(&states.crs);

    for (year_data, panel) in prepared.iter().zip(layout::grid_panels(prepared.len())) {
        scene.add_panel(
            &year_data.conus,
            &conus_states,
            panel.to_canvas(canvas),
            STATE_LINE_PT,
            geographic,
        );

        let inset = panel.inset(GRID_INSET_FRACTION, GRID_INSET_FRACTION);
        scene.add_panel(
            &year_data.alaska,
            &alaska_states,
            inset.to_canvas(canvas),
            INSET_LINE_PT,
            geographic,
        );

        let (title_x, title_y) = panel.point(0.5, 0.97, canvas);
        scene.label(
            format!("Primary Heating Fuel by Census Tract, {}", year_data.year),
            title_x,
            title_y,
            TITLE_PT,
            true,
            Anchor::Middle,
        );

        let (label_x, label_y) = inset.point(0.5, -0.05, canvas);
        scene.label(
            "Alaska".to_string(),
            label_x,
            label_y,
            ALASKA_LABEL_PT,
            true,
            Anchor::Middle,
        );
    }

    scene.add_grid_legend(canvas);
    scene
}

#[cfg(test)]
mod tests {
    use fuel_map_classify::SurveyYear;
    use geo::{BoundingRect, Polygon};

    use super::*;
    use crate::boundaries::StateShape;

    fn square(min_x: f64, min_y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (min_x + size, min_y),
                (min_x + size, min_y + size),
                (min_x, min_y + size),
                (min_x, min_y),
            ]),
            vec![],
        )])
    }

    fn prepared(year: SurveyYear) -> PreparedYear {
        PreparedYear {
            year,
            conus: vec![
                (square(-100.0, 30.0, 2.0), SimpleFuel::NaturalGas),
                (square(-90.0, 40.0, 2.0), SimpleFuel::Electricity),
            ],
            alaska: vec![(square(-150.0, 62.0, 3.0), SimpleFuel::Wood)],
            matched: 3,
            unmatched: 0,
            excluded: 0,
            error_rows: 0,
        }
    }

    fn states() -> StateLayer {
        StateLayer {
            crs: "EPSG:4326".to_string(),
            shapes: vec![
                StateShape {
                    abbr: "TX".to_string(),
                    polygon: square(-104.0, 26.0, 8.0),
                },
                StateShape {
                    abbr: "AK".to_string(),
                    polygon: square(-155.0, 58.0, 10.0),
                },
                StateShape {
                    abbr: "HI".to_string(),
                    polygon: square(-157.0, 19.0, 2.0),
                },
            ],
        }
    }

    #[test]
    fn single_scene_has_title_legend_and_panels() {
        let scene = single_map(&prepared(SurveyYear::Y2020), &states());

        assert!((scene.width - 2000.0).abs() < 1e-9);
        assert!((scene.height - 1100.0).abs() < 1e-9);
        assert_eq!(scene.fills.len(), 3);
        assert_eq!(scene.swatches.len(), 7);
        assert_eq!(scene.frames.len(), 1);
        assert!(
            scene
                .labels
                .iter()
                .any(|label| label.text == "Primary Heating Fuel by Census Tract, 2020")
        );
        assert!(scene.labels.iter().any(|label| label.text == "Alaska"));
        // TX in the main panel, AK in the inset, HI nowhere.
        assert_eq!(scene.strokes.len(), 2);
    }

    #[test]
    fn fills_project_inside_their_panel() {
        let scene = single_map(&prepared(SurveyYear::Y2015), &states());
        let canvas = Canvas::single();
        let main = SINGLE_MAIN.to_canvas(canvas);

        // CONUS fills land within the main panel.
        for (polygon, bucket) in &scene.fills {
            if *bucket == SimpleFuel::Wood {
                continue;
            }
            let rect = polygon.bounding_rect().unwrap();
            assert!(rect.min().x >= main.x);
            assert!(rect.max().x <= main.x + main.width);
            assert!(rect.min().y >= main.y);
            assert!(rect.max().y <= main.y + main.height);
        }
    }

    #[test]
    fn grid_scene_titles_every_year() {
        let years = [
            prepared(SurveyYear::Y2015),
            prepared(SurveyYear::Y2020),
            prepared(SurveyYear::Y2023),
        ];
        let scene = grid_map(&years, &states());

        assert!((scene.width - 3000.0).abs() < 1e-9);
        for year in ["2015", "2020", "2023"] {
            let title = format!("Primary Heating Fuel by Census Tract, {year}");
            assert!(scene.labels.iter().any(|label| label.text == title));
        }
        assert_eq!(
            scene
                .labels
                .iter()
                .filter(|label| label.text == "Alaska")
                .count(),
            3
        );
        assert_eq!(scene.swatches.len(), 7);
        assert_eq!(scene.fills.len(), 9);
    }

    #[test]
    fn empty_panels_draw_nothing() {
        let empty = PreparedYear {
            year: SurveyYear::Y2015,
            conus: Vec::new(),
            alaska: Vec::new(),
            matched: 0,
            unmatched: 0,
            excluded: 0,
            error_rows: 0,
        };
        let no_states = StateLayer {
            crs: "EPSG:4326".to_string(),
            shapes: Vec::new(),
        };
        let scene = single_map(&empty, &no_states);
        assert!(scene.fills.is_empty());
        assert!(scene.strokes.is_empty());
        // Legend and labels still render.
        assert_eq!(scene.swatches.len(), 7);
    }
}
