//! Point/vector arithmetic and bounding boxes on `[f64; 3]`.
//!
//! Points and vectors are plain arrays so they can be passed across the
//! mesh adapter boundary without conversion.

/// A point in physical space.
pub type Point3 = [f64; 3];
/// A displacement or direction in physical space.
pub type Vector3 = [f64; 3];

const EPS: f64 = 1e-300;

#[inline]
pub fn add(a: Point3, b: Vector3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Point3, b: Point3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// `a + s * v`
#[inline]
pub fn axpy(a: Point3, s: f64, v: Vector3) -> Point3 {
    [a[0] + s * v[0], a[1] + s * v[1], a[2] + s * v[2]]
}

#[inline]
pub fn dot(a: Vector3, b: Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn norm(a: Vector3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance(a: Point3, b: Point3) -> f64 {
    norm(sub(a, b))
}

/// Unit vector along `a`, or `None` for a (numerically) zero vector.
pub fn normalize(a: Vector3) -> Option<Vector3> {
    let len = norm(a);
    if len <= EPS || !len.is_finite() {
        None
    } else {
        Some([a[0] / len, a[1] / len, a[2] / len])
    }
}

/// Component-wise arithmetic mean of two vectors.
#[inline]
pub fn midpoint(a: Vector3, b: Vector3) -> Vector3 {
    [
        0.5 * (a[0] + b[0]),
        0.5 * (a[1] + b[1]),
        0.5 * (a[2] + b[2]),
    ]
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Degenerate box holding a single point.
    pub fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the box to include `p`.
    pub fn include(&mut self, p: Point3) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    /// Edge lengths along x, y and z.
    pub fn extents(&self) -> Vector3 {
        sub(self.max, self.min)
    }

    pub fn center(&self) -> Point3 {
        midpoint(self.min, self.max)
    }

    /// Length of the box diagonal.
    pub fn diameter(&self) -> f64 {
        norm(self.extents())
    }

    /// Closed containment test.
    pub fn contains(&self, p: Point3) -> bool {
        (0..3).all(|axis| self.min[axis] <= p[axis] && p[axis] <= self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_none() {
        assert!(normalize([0.0; 3]).is_none());
        let n = normalize([3.0, 0.0, 4.0]).unwrap();
        assert!((norm(n) - 1.0).abs() < 1e-15);
        assert_eq!(n, [0.6, 0.0, 0.8]);
    }

    #[test]
    fn aabb_grows_and_measures() {
        let mut b = Aabb::from_point([1.0, 1.0, 1.0]);
        b.include([0.0, 3.0, 1.0]);
        b.include([2.0, 2.0, -1.0]);
        assert_eq!(b.extents(), [2.0, 2.0, 2.0]);
        assert_eq!(b.center(), [1.0, 2.0, 0.0]);
        assert!(b.contains([0.0, 1.0, -1.0]));
        assert!(!b.contains([2.5, 2.0, 0.0]));
    }

    #[test]
    fn axpy_moves_along_direction() {
        assert_eq!(axpy([1.0, 0.0, 0.0], 2.0, [0.0, 1.0, 0.5]), [1.0, 2.0, 1.0]);
        assert_eq!(distance([0.0; 3], [0.0, 3.0, 4.0]), 5.0);
    }
}
