#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for raster sampling.
//!
//! Builds an R-tree over tract polygons, each tagged with its display
//! bucket, and answers point-in-polygon lookups. The raster renderer asks
//! for the bucket under every output pixel, so the lookup path is the hot
//! loop of PNG export.

use fuel_map_fuel_models::SimpleFuel;
use geo::{Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};

/// A tract polygon stored in the R-tree with its display bucket.
struct FillEntry {
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
    bucket: SimpleFuel,
}

impl RTreeObject for FillEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over filled tract polygons.
///
/// Constructed once per map panel and queried per pixel.
pub struct FillIndex {
    tree: RTree<FillEntry>,
}

impl FillIndex {
    /// Builds the index from polygons tagged with their display bucket.
    #[must_use]
    pub fn new(shapes: Vec<(MultiPolygon<f64>, SimpleFuel)>) -> Self {
        let entries = shapes
            .into_iter()
            .map(|(polygon, bucket)| FillEntry {
                envelope: envelope_of(&polygon),
                polygon,
                bucket,
            })
            .collect();
        let tree = RTree::bulk_load(entries);
        log::debug!("built fill index over {} polygons", tree.size());
        Self { tree }
    }

    /// Looks up the display bucket under a point.
    ///
    /// Tracts tile their state without overlap, so first match wins.
    #[must_use]
    pub fn bucket_at(&self, x: f64, y: f64) -> Option<SimpleFuel> {
        let point = geo::Point::new(x, y);
        let query_env = AABB::from_point([x, y]);

        for entry in self.tree.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.contains(&point) {
                return Some(entry.bucket);
            }
        }
        None
    }

    /// Number of indexed polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Normalizes a geometry into a [`MultiPolygon`].
/// Single polygons are promoted; non-areal geometries are rejected.
#[must_use]
pub fn to_multipolygon(geometry: geo::Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Computes the bounding box envelope for a [`MultiPolygon`].
#[must_use]
pub fn envelope_of(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use super::*;

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

    #[test]
    fn finds_the_bucket_under_a_point() {
        let index = FillIndex::new(vec![
            (square(0.0, 0.0, 1.0), SimpleFuel::NaturalGas),
            (square(2.0, 0.0, 1.0), SimpleFuel::Electricity),
        ]);

        assert_eq!(index.bucket_at(0.5, 0.5), Some(SimpleFuel::NaturalGas));
        assert_eq!(index.bucket_at(2.5, 0.5), Some(SimpleFuel::Electricity));
        assert_eq!(index.bucket_at(1.5, 0.5), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn holes_are_outside() {
        let shell = LineString::from(vec![
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
            (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (1.0, 1.0),
            (3.0, 1.0),
            (3.0, 3.0),
            (1.0, 3.0),
            (1.0, 1.0),
        ]);
        let donut = MultiPolygon(vec![Polygon::new(shell, vec![hole])]);

        let index = FillIndex::new(vec![(donut, SimpleFuel::Wood)]);

        assert_eq!(index.bucket_at(0.5, 0.5), Some(SimpleFuel::Wood));
        assert_eq!(index.bucket_at(2.0, 2.0), None);
    }

    #[test]
    fn promotes_single_polygons() {
        let polygon = geo::Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (1.0, 0.0),
                (1.0, 1.0),
                (0.0, 1.0),
                (0.0, 0.0),
            ]),
            vec![],
        ));
        let promoted = to_multipolygon(polygon).unwrap();
        assert_eq!(promoted.0.len(), 1);

        let point = geo::Geometry::Point(geo::Point::new(0.0, 0.0));
        assert!(to_multipolygon(point).is_none());
    }

    #[test]
    fn empty_index_answers_nothing() {
        let index = FillIndex::new(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.bucket_at(0.0, 0.0), None);
    }
}
