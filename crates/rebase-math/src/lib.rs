#![warn(missing_docs)]

//! Math types for the rebase pipeline.
//!
//! Point aliases over nalgebra, the rotations that turn a mesh into each
//! candidate orientation, and axis-aligned bounds.

use nalgebra::{Matrix4, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in the XY plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A homogeneous 4x4 transform. Only rigid motions are built here.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// No-op transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Right-handed rotation about X, in radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self {
            matrix: Matrix4::from_axis_angle(&Vector3::x_axis(), angle),
        }
    }

    /// Right-handed rotation about Y, in radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self {
            matrix: Matrix4::from_axis_angle(&Vector3::y_axis(), angle),
        }
    }

    /// Map a point through the transform.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let h = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(h.x, h.y, h.z)
    }

    /// Undo a rotation-plus-translation.
    ///
    /// The rotation block is transposed rather than inverted, so the
    /// result is always defined. Assumes the upper-left 3x3 block is
    /// orthonormal.
    pub fn rigid_inverse(&self) -> Self {
        let rot_t = self.matrix.fixed_view::<3, 3>(0, 0).transpose();
        let t = self.matrix.fixed_view::<3, 1>(0, 3).into_owned();
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&rot_t);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&(-(rot_t * t)));
        Self { matrix: m }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounds in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Bounds2 {
    /// Bounds of a point set, or `None` when it is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

/// Axis-aligned bounds in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Bounds3 {
    /// Bounds of a point set, or `None` when it is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.inf(p);
            bounds.max = bounds.max.sup(p);
        }
        Some(bounds)
    }

    /// Size along each axis.
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity_keeps_points() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::identity().apply_point(&p), p);
        assert_eq!(Transform::default(), Transform::identity());
    }

    #[test]
    fn test_rotation_x_90_moves_z_onto_minus_y() {
        let result = Transform::rotation_x(FRAC_PI_2).apply_point(&Point3::new(0.0, 0.0, 1.0));
        assert!(result.x.abs() < 1e-12);
        assert_relative_eq!(result.y, -1.0, epsilon = 1e-12);
        assert!(result.z.abs() < 1e-12);
    }

    #[test]
    fn test_rotation_y_90_moves_z_onto_x() {
        let result = Transform::rotation_y(FRAC_PI_2).apply_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(result.x, 1.0, epsilon = 1e-12);
        assert!(result.z.abs() < 1e-12);
    }

    #[test]
    fn test_rigid_inverse_undoes_rotation() {
        let p = Point3::new(5.0, -6.0, 7.0);
        for t in [
            Transform::rotation_x(FRAC_PI_2),
            Transform::rotation_x(-FRAC_PI_2),
            Transform::rotation_y(PI),
            Transform::rotation_y(0.3),
        ] {
            let back = t.rigid_inverse().apply_point(&t.apply_point(&p));
            assert!((back - p).norm() < 1e-9);
        }
    }

    #[test]
    fn test_rigid_inverse_handles_translation() {
        let mut t = Transform::rotation_y(PI / 3.0);
        t.matrix[(0, 3)] = 1.0;
        t.matrix[(2, 3)] = -4.0;
        let p = Point3::new(2.0, 0.5, 9.0);
        let back = t.rigid_inverse().apply_point(&t.apply_point(&p));
        assert!((back - p).norm() < 1e-9);
    }

    #[test]
    fn test_bounds2() {
        let pts = [
            Point2::new(1.0, 5.0),
            Point2::new(-3.0, 2.0),
            Point2::new(4.0, -1.0),
        ];
        let b = Bounds2::from_points(&pts).unwrap();
        assert_eq!(b.width(), 7.0);
        assert_eq!(b.height(), 6.0);
        assert_eq!(b.center(), Point2::new(0.5, 2.0));
        assert!(Bounds2::from_points(&Vec::<Point2>::new()).is_none());
    }

    #[test]
    fn test_bounds3() {
        let pts = [Point3::new(0.0, 1.0, 2.0), Point3::new(3.0, -1.0, 5.0)];
        let b = Bounds3::from_points(&pts).unwrap();
        assert_eq!(b.min, Point3::new(0.0, -1.0, 2.0));
        assert_eq!(b.dimensions(), Vec3::new(3.0, 2.0, 3.0));
    }
}
