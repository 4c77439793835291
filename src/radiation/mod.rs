//! The grey M1 radiation moment system: closure, Riemann solver, and the
//! implicit matter-radiation exchange, with the physics hooks they consume.

pub mod closure;
pub mod coupling;
pub mod error;
pub mod geometry;
pub mod physics;
pub mod riemann;
pub mod state;

pub use error::{ConvergenceError, Error};
pub use physics::{GreyGas, PhysicalConstants, RadiationPhysics};
