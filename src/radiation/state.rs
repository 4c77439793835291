//! Layout of the conserved and primitive state vectors, and per-cell
//! conversions and admissibility checks.

use super::geometry::Direction;




pub const GAS_DENSITY: usize = 0;
pub const X1_GAS_MOMENTUM: usize = 1;
pub const X2_GAS_MOMENTUM: usize = 2;
pub const X3_GAS_MOMENTUM: usize = 3;
pub const GAS_ENERGY: usize = 4;
pub const RAD_ENERGY: usize = 5;
pub const X1_RAD_FLUX: usize = 6;
pub const X2_RAD_FLUX: usize = 7;
pub const X3_RAD_FLUX: usize = 8;

/// Number of conserved variables per cell
pub const NUM_CONSERVED: usize = 9;

/// Number of radiation (hyperbolic) variables advanced by the transport step
pub const NUM_HYPERBOLIC: usize = 4;

/// Offset of the first radiation variable in the conserved vector
pub const HYPERBOLIC_START: usize = RAD_ENERGY;

pub const PRIM_RAD_ENERGY: usize = 0;
pub const X1_REDUCED_FLUX: usize = 1;
pub const X2_REDUCED_FLUX: usize = 2;
pub const X3_REDUCED_FLUX: usize = 3;

/// Number of primitive radiation variables
pub const NUM_PRIMITIVE: usize = 4;




/**
 * Return the conserved index of the radiation flux along a direction.
 */
pub fn rad_flux_index(direction: Direction) -> usize {
    X1_RAD_FLUX + direction.component()
}

/**
 * Return the conserved index of the gas momentum along a direction.
 */
pub fn gas_momentum_index(direction: Direction) -> usize {
    X1_GAS_MOMENTUM + direction.component()
}




/**
 * Convert a cell's conserved state to primitive radiation variables: the
 * radiation energy density and the flux normalized by `c E`.
 */
pub fn conserved_to_primitive(cons: &[f64], prim: &mut [f64], c_light: f64) {
    let erad = cons[RAD_ENERGY];
    prim[PRIM_RAD_ENERGY] = erad;
    prim[X1_REDUCED_FLUX] = cons[X1_RAD_FLUX] / (c_light * erad);
    prim[X2_REDUCED_FLUX] = cons[X2_RAD_FLUX] / (c_light * erad);
    prim[X3_REDUCED_FLUX] = cons[X3_RAD_FLUX] / (c_light * erad);
}

/**
 * Magnitude of a flux 3-vector.
 */
pub fn magnitude(fx: f64, fy: f64, fz: f64) -> f64 {
    (fx * fx + fy * fy + fz * fz).sqrt()
}

/**
 * Return the reduced flux `|F| / (c E)` of a conserved state.
 */
pub fn reduced_flux(cons: &[f64], c_light: f64) -> f64 {
    magnitude(cons[X1_RAD_FLUX], cons[X2_RAD_FLUX], cons[X3_RAD_FLUX]) / (c_light * cons[RAD_ENERGY])
}

/**
 * Determine whether the radiation part of a conserved state is physically
 * admissible: positive energy density and a causal flux.
 */
pub fn is_state_valid(cons: &[f64], c_light: f64) -> bool {
    let erad = cons[RAD_ENERGY];
    erad > 0.0 && reduced_flux(cons, c_light) <= 1.0
}

/**
 * Gas internal energy density: total gas energy minus the kinetic energy.
 */
pub fn internal_energy(cons: &[f64]) -> f64 {
    let rho = cons[GAS_DENSITY];
    let px = cons[X1_GAS_MOMENTUM];
    let py = cons[X2_GAS_MOMENTUM];
    let pz = cons[X3_GAS_MOMENTUM];
    cons[GAS_ENERGY] - 0.5 * (px * px + py * py + pz * pz) / rho
}

/**
 * Total gas energy density for the given internal energy and the momentum
 * already stored in the state.
 */
pub fn total_gas_energy(cons: &[f64], eint: f64) -> f64 {
    let rho = cons[GAS_DENSITY];
    let px = cons[X1_GAS_MOMENTUM];
    let py = cons[X2_GAS_MOMENTUM];
    let pz = cons[X3_GAS_MOMENTUM];
    eint + 0.5 * (px * px + py * py + pz * pz) / rho
}
