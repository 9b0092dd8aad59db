//! Convex hulls of islands.

use geo::{ConvexHull, MultiPoint, Point};
use rebase_math::{Bounds2, Point2};

use crate::bottom::BottomFace;
use crate::islands::Island;

/// The 2D convex hull of one island, as a closed polygon.
///
/// Points run counter-clockwise and the first point is repeated at the
/// end. Degenerate islands (collinear or coincident points) still yield
/// a hull; it just has little or no area.
#[derive(Debug, Clone, PartialEq)]
pub struct HullShape {
    /// Boundary points, closed.
    pub points: Vec<Point2>,
}

impl HullShape {
    /// Wrap an already-computed boundary.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Convex hull of an arbitrary point set.
    pub fn from_points(points: &[Point2]) -> Self {
        let multi: MultiPoint<f64> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
        let polygon = multi.convex_hull();
        Self {
            points: polygon
                .exterior()
                .coords()
                .map(|c| Point2::new(c.x, c.y))
                .collect(),
        }
    }

    /// Check if the hull has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of boundary points, including the closing repeat.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Axis-aligned bounding box, `None` for an empty hull.
    pub fn bounding_box(&self) -> Option<Bounds2> {
        Bounds2::from_points(&self.points)
    }

    /// Bounding-box width, 0 for an empty hull.
    pub fn width(&self) -> f64 {
        self.bounding_box().map_or(0.0, |b| b.width())
    }

    /// Bounding-box height, 0 for an empty hull.
    pub fn height(&self) -> f64 {
        self.bounding_box().map_or(0.0, |b| b.height())
    }

    /// Midpoint of the bounding box.
    ///
    /// This is what cutouts are aligned to, not the area centroid.
    pub fn centroid(&self) -> Point2 {
        self.bounding_box()
            .map_or_else(Point2::origin, |b| b.center())
    }

    /// Signed area. Positive for counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }
}

/// Hull of all corners of the island's faces.
pub fn island_hull(faces: &[BottomFace], island: &Island) -> HullShape {
    let points: Vec<Point2> = island
        .faces
        .iter()
        .flat_map(|&i| faces[i].points)
        .collect();
    HullShape::from_points(&points)
}

/// One hull per island, in island order.
pub fn build_hulls(faces: &[BottomFace], islands: &[Island]) -> Vec<HullShape> {
    islands
        .iter()
        .map(|island| island_hull(faces, island))
        .collect()
}
