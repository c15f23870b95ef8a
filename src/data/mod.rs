//! Spatial fields sampled by the productivity model.

pub mod permeability;

pub use permeability::{PermeabilityField, UniformPermeability};
