//! Radgrid is the hyperbolic core of a grey two-moment (M1) radiation
//! hydrodynamics solver on structured, rectilinear grid patches. It advances
//! the radiation energy density and flux with an HLL Riemann solver and a
//! second-order strong-stability-preserving Runge-Kutta scheme, corrected
//! for the optically thick (diffusive) limit, and couples the radiation to
//! the gas through a per-cell implicit exchange of energy and momentum.
//!
//! The crate works on `Patch` arrays of conserved variables owned by the
//! caller. Per-problem physics (opacity, equation of state) is supplied
//! through the `RadiationPhysics` trait, and boundary data through the
//! `BoundaryFill` trait. Kernels run in parallel on the Rayon global thread
//! pool.

pub mod boundary;
pub mod index_space;
pub mod num_vec;
pub mod patch;
pub mod radiation;
pub mod reconstruct;
pub mod solvers;
