//! Well trajectories: an immutable polyline with a wellbore radius and skin.

use crate::geometry::metrics::{Point3, Vector3, distance, sub};
use crate::well_error::WellError;
use itertools::Itertools;

/// One straight piece of a trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point3,
    pub end: Point3,
    /// Unit tangent from `start` to `end`.
    pub tangent: Vector3,
    pub length: f64,
}

impl Segment {
    fn between(start: Point3, end: Point3) -> Self {
        let length = distance(start, end);
        let d = sub(end, start);
        Self {
            start,
            end,
            tangent: [d[0] / length, d[1] / length, d[2] / length],
            length,
        }
    }
}

/// Ordered control points of a well plus its radius and skin factor.
///
/// Construction validates the trajectory: at least one finite point, a
/// positive radius and no two consecutive coincident points. A single
/// point denotes a vertical point well.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawTrajectory")]
pub struct WellTrajectory {
    points: Vec<Point3>,
    radius: f64,
    skin: f64,
}

#[derive(serde::Deserialize)]
struct RawTrajectory {
    points: Vec<Point3>,
    radius: f64,
    #[serde(default)]
    skin: f64,
}

impl TryFrom<RawTrajectory> for WellTrajectory {
    type Error = WellError;

    fn try_from(raw: RawTrajectory) -> Result<Self, Self::Error> {
        Self::new(raw.points, raw.radius, raw.skin)
    }
}

impl WellTrajectory {
    pub fn new(points: Vec<Point3>, radius: f64, skin: f64) -> Result<Self, WellError> {
        if points.is_empty() {
            return Err(WellError::EmptyTrajectory);
        }
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(WellError::NonPositiveRadius(radius));
        }
        if let Some(index) = points
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(WellError::NonFiniteCoordinate { index });
        }
        if let Some(index) = points
            .iter()
            .tuple_windows()
            .position(|(a, b)| distance(*a, *b) <= 0.0)
        {
            return Err(WellError::DuplicateTrajectoryPoint { index });
        }
        Ok(Self {
            points,
            radius,
            skin,
        })
    }

    /// A vertical well represented by one point.
    pub fn point(location: Point3, radius: f64, skin: f64) -> Result<Self, WellError> {
        Self::new(vec![location], radius, skin)
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn skin(&self) -> f64 {
        self.skin
    }

    pub fn is_point_well(&self) -> bool {
        self.points.len() == 1
    }

    /// Segments between consecutive control points (empty for a point well).
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points
            .iter()
            .tuple_windows()
            .map(|(a, b)| Segment::between(*a, *b))
    }

    /// Sum of all segment lengths.
    pub fn length(&self) -> f64 {
        self.segments().map(|s| s.length).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_configuration() {
        assert_eq!(
            WellTrajectory::new(vec![], 0.1, 0.0),
            Err(WellError::EmptyTrajectory)
        );
        assert_eq!(
            WellTrajectory::point([0.0; 3], 0.0, 0.0),
            Err(WellError::NonPositiveRadius(0.0))
        );
        assert_eq!(
            WellTrajectory::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]], 0.1, 0.0),
            Err(WellError::DuplicateTrajectoryPoint { index: 1 })
        );
        assert_eq!(
            WellTrajectory::new(vec![[0.0; 3], [f64::NAN, 0.0, 0.0]], 0.1, 0.0),
            Err(WellError::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn segments_have_unit_tangents() {
        let t = WellTrajectory::new(
            vec![[0.0; 3], [3.0, 4.0, 0.0], [3.0, 4.0, 2.0]],
            0.1,
            -1.0,
        )
        .unwrap();
        let segs: Vec<_> = t.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].length, 5.0);
        assert_eq!(segs[0].tangent, [0.6, 0.8, 0.0]);
        assert_eq!(segs[1].tangent, [0.0, 0.0, 1.0]);
        assert_eq!(t.length(), 7.0);
        assert_eq!(t.skin(), -1.0);
        assert!(!t.is_point_well());
    }

    #[test]
    fn deserialize_runs_validation() {
        let ok: WellTrajectory =
            serde_json::from_str(r#"{"points":[[0,0,0],[0,0,1]],"radius":0.1}"#).unwrap();
        assert_eq!(ok.skin(), 0.0);
        let bad = serde_json::from_str::<WellTrajectory>(
            r#"{"points":[[0,0,0],[0,0,0]],"radius":0.1}"#,
        );
        assert!(bad.is_err());
    }
}
