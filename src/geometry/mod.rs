//! Geometry utilities for mesh-wellbore.
//!
//! Small fixed-size vector helpers and axis-aligned boxes used by the
//! binder and the productivity model.

pub mod metrics;

pub use metrics::{Aabb, Point3, Vector3};
