//! Panel layout math.
//!
//! The figure geometry is specified the way plotting toolkits do it: axes
//! rectangles as `[left, bottom, width, height]` figure fractions with a
//! bottom-left origin, font and stroke sizes in points. This module converts
//! those into canvas units (hundredths of an inch, top-left origin) and fits
//! world extents into panels with a fixed data margin.

use geo::{BoundingRect, MultiPolygon};

/// Canvas units per inch. One unit is 1/100 inch.
pub const CANVAS_UNITS_PER_INCH: f64 = 100.0;

/// Data margin applied when fitting an extent into a panel (fraction of the
/// data span added on each side).
pub const DATA_MARGIN: f64 = 0.05;

/// Single-map figure size in inches.
pub const SINGLE_FIG_INCHES: (f64, f64) = (20.0, 11.0);

/// Grid figure size in inches.
pub const GRID_FIG_INCHES: (f64, f64) = (30.0, 10.0);

/// Main panel of the single-year map: 2% left margin, 75% width, 80% height.
pub const SINGLE_MAIN: AxesRect = AxesRect {
    left: 0.02,
    bottom: 0.15,
    width: 0.75,
    height: 0.80,
};

/// Alaska inset of the single-year map, anchored at the same corner.
pub const SINGLE_ALASKA: AxesRect = AxesRect {
    left: 0.02,
    bottom: 0.15,
    width: 0.22,
    height: 0.25,
};

/// Alaska inset fraction of a grid panel (both axes).
pub const GRID_INSET_FRACTION: f64 = 0.35;

const GRID_MARGIN_LEFT: f64 = 0.01;
const GRID_MARGIN_RIGHT: f64 = 0.99;
const GRID_MARGIN_TOP: f64 = 0.98;
const GRID_MARGIN_BOTTOM: f64 = 0.08;
/// Horizontal space between grid panels, as a fraction of panel width.
const GRID_WSPACE: f64 = 0.05;

/// Converts a size in points to canvas units.
#[must_use]
pub fn pt_units(points: f64) -> f64 {
    points * CANVAS_UNITS_PER_INCH / 72.0
}

/// The output canvas, in canvas units.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// Canvas for the single-year layout.
    #[must_use]
    pub const fn single() -> Self {
        Self::from_inches(SINGLE_FIG_INCHES)
    }

    /// Canvas for the multi-year grid layout.
    #[must_use]
    pub const fn grid() -> Self {
        Self::from_inches(GRID_FIG_INCHES)
    }

    const fn from_inches(inches: (f64, f64)) -> Self {
        Self {
            width: inches.0 * CANVAS_UNITS_PER_INCH,
            height: inches.1 * CANVAS_UNITS_PER_INCH,
        }
    }
}

/// An axes rectangle in figure fractions, bottom-left origin.
#[derive(Debug, Clone, Copy)]
pub struct AxesRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesRect {
    /// Converts to a canvas rectangle (top-left origin, canvas units).
    #[must_use]
    pub fn to_canvas(self, canvas: Canvas) -> Rect {
        Rect {
            x: self.left * canvas.width,
            y: (1.0 - (self.bottom + self.height)) * canvas.height,
            width: self.width * canvas.width,
            height: self.height * canvas.height,
        }
    }

    /// An inset anchored at this rectangle's bottom-left corner, sized as
    /// fractions of it.
    #[must_use]
    pub fn inset(self, width_fraction: f64, height_fraction: f64) -> Self {
        Self {
            left: self.left,
            bottom: self.bottom,
            width: self.width * width_fraction,
            height: self.height * height_fraction,
        }
    }

    /// Converts an axes-fraction point (bottom-left origin, may lie outside
    /// the axes) to canvas coordinates.
    #[must_use]
    pub fn point(self, fx: f64, fy: f64, canvas: Canvas) -> (f64, f64) {
        let x = (self.left + fx * self.width) * canvas.width;
        let y = (1.0 - (self.bottom + fy * self.height)) * canvas.height;
        (x, y)
    }
}

/// Computes the main panel of each grid column, left to right.
#[must_use]
pub fn grid_panels(count: usize) -> Vec<AxesRect> {
    if count == 0 {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    let total_width = GRID_MARGIN_RIGHT - GRID_MARGIN_LEFT;
    let panel_width = total_width / (n + (n - 1.0) * GRID_WSPACE);
    let gap = panel_width * GRID_WSPACE;
    let height = GRID_MARGIN_TOP - GRID_MARGIN_BOTTOM;

    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let offset = i as f64 * (panel_width + gap);
            AxesRect {
                left: GRID_MARGIN_LEFT + offset,
                bottom: GRID_MARGIN_BOTTOM,
                width: panel_width,
                height,
            }
        })
        .collect()
}

/// A canvas rectangle, top-left origin.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// A world-coordinate bounding box accumulated over layer geometry.
#[derive(Debug, Clone, Copy)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// An empty extent that any real geometry will expand.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Expands the extent to cover a polygon.
    pub fn include(&mut self, polygon: &MultiPolygon<f64>) {
        if let Some(rect) = polygon.bounding_rect() {
            self.min_x = self.min_x.min(rect.min().x);
            self.min_y = self.min_y.min(rect.min().y);
            self.max_x = self.max_x.max(rect.max().x);
            self.max_y = self.max_y.max(rect.max().y);
        }
    }

    /// Whether any geometry was included.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Vertical display stretch for degree coordinates at this extent's
    /// mid-latitude. One longitude degree spans cos(latitude) of a latitude
    /// degree on the ground, so the y axis is stretched by the reciprocal,
    /// the way plotting toolkits treat geographic layers.
    #[must_use]
    pub fn geographic_aspect(&self) -> f64 {
        let (_, mid_lat) = self.center();
        let cos = mid_lat.to_radians().cos();
        if cos <= f64::EPSILON { 1.0 } else { cos.recip() }
    }

    const fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// A world-to-canvas transform, fitted to one panel.
///
/// The vertical axis flips: world north maps to smaller canvas `y`.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    scale_x: f64,
    scale_y: f64,
    world_cx: f64,
    world_cy: f64,
    panel_cx: f64,
    panel_cy: f64,
}

impl Projection {
    /// Fits `extent` into `panel`, adding the [`DATA_MARGIN`] on every side.
    ///
    /// `aspect` is the display size of one world `y` unit relative to one
    /// world `x` unit. `1.0` preserves the aspect ratio as-is; degree
    /// coordinates pass [`Extent::geographic_aspect`]. Returns `None` for an
    /// empty extent.
    #[must_use]
    pub fn fit(extent: &Extent, panel: &Rect, aspect: f64) -> Option<Self> {
        if !extent.is_valid() {
            return None;
        }
        let pad = 1.0 + 2.0 * DATA_MARGIN;
        let span_x = (extent.max_x - extent.min_x).max(f64::EPSILON) * pad;
        let span_y = (extent.max_y - extent.min_y).max(f64::EPSILON) * pad;
        let scale_x = (panel.width / span_x).min(panel.height / (span_y * aspect));
        let scale_y = scale_x * aspect;
        let (world_cx, world_cy) = extent.center();

        Some(Self {
            scale_x,
            scale_y,
            world_cx,
            world_cy,
            panel_cx: panel.center_x(),
            panel_cy: panel.center_y(),
        })
    }

    /// Projects a world coordinate to canvas coordinates.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.panel_cx + (x - self.world_cx) * self.scale_x,
            self.panel_cy - (y - self.world_cy) * self.scale_y,
        )
    }
}
