use serde::{Deserialize, Serialize};
use crate::index_space::{Axis, IndexSpace};
use crate::patch::Patch;
use crate::radiation::error::Error;
use crate::radiation::geometry::Direction;
use crate::radiation::physics::PhysicalConstants;
use crate::radiation::state::*;




/**
 * Per-simulation parameters read by boundary conditions. The driver owns
 * this and passes it to every guard-zone fill.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryContext {
    /// Simulation time of the state being filled
    pub time: f64,
    /// Velocity of the computational frame along the I axis; inflow states
    /// are given in the rest frame and shifted by this amount
    pub delta_vx: f64,
}




/**
 * A gas and radiation state given in the rest frame, imposed in the guard
 * zones of an inflow boundary.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InflowState {
    pub density: f64,
    pub velocity: [f64; 3],
    pub internal_energy: f64,
    pub rad_energy: f64,
    pub rad_flux: [f64; 3],
}

impl InflowState {

    /**
     * Write the conserved state seen in a frame moving with velocity
     * `delta_vx` along the I axis.
     */
    pub fn to_conserved(&self, delta_vx: f64, cons: &mut [f64]) {
        let rho = self.density;
        let vx = self.velocity[0] - delta_vx;
        let [_, vy, vz] = self.velocity;

        cons[GAS_DENSITY] = rho;
        cons[X1_GAS_MOMENTUM] = rho * vx;
        cons[X2_GAS_MOMENTUM] = rho * vy;
        cons[X3_GAS_MOMENTUM] = rho * vz;
        cons[GAS_ENERGY] = total_gas_energy(cons, self.internal_energy);
        cons[RAD_ENERGY] = self.rad_energy;
        cons[X1_RAD_FLUX] = self.rad_flux[0];
        cons[X2_RAD_FLUX] = self.rad_flux[1];
        cons[X3_RAD_FLUX] = self.rad_flux[2];
    }
}




/**
 * The condition imposed on one side of the domain.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Zero-gradient: guard zones copy the nearest valid zone
    Extrapolate,
    /// Guard zones copy the valid zones on the opposite side
    Periodic,
    /// Mirror image, with the normal gas momentum and radiation flux negated
    Reflecting,
    /// Incident radiation energy density `E_inc` entering through the side;
    /// the gas is extrapolated
    Marshak { incident_energy: f64 },
    /// Fixed inflow state
    Inflow(InflowState),
}




/**
 * Boundary conditions on the four sides of a 2D domain. One-dimensional
 * problems carry no guard zones on the J axis, so the J sides are never
 * visited.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boundaries {
    pub lower_i: BoundaryKind,
    pub upper_i: BoundaryKind,
    pub lower_j: BoundaryKind,
    pub upper_j: BoundaryKind,
}

impl Boundaries {

    pub fn uniform(kind: BoundaryKind) -> Self {
        Self {
            lower_i: kind.clone(),
            upper_i: kind.clone(),
            lower_j: kind.clone(),
            upper_j: kind,
        }
    }
}




/**
 * The boundary-condition hook: fills the guard zones of a conserved-state
 * patch around its valid region. Implemented by `Boundaries`; problems with
 * boundary data that depend on position or time implement it directly.
 */
pub trait BoundaryFill: Sync {
    fn fill(&self, cons: &mut Patch, valid: &IndexSpace, constants: &PhysicalConstants, context: &BoundaryContext);

    /**
     * Check the boundary data before a solver is built on it.
     */
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Lower,
    Upper,
}

fn along(index: (i64, i64), axis: Axis) -> i64 {
    match axis {
        Axis::I => index.0,
        Axis::J => index.1,
    }
}

/**
 * Return the guard region on one side of `valid` along `axis`. Guard zones
 * along J span the full I extent of the patch, so corners are filled from
 * the already-filled I guard zones.
 */
fn guard_region(patch_space: &IndexSpace, valid: &IndexSpace, axis: Axis, side: Side) -> IndexSpace {
    let (i0, j0) = valid.start();
    let (i1, j1) = valid.end();
    let (x0, y0) = patch_space.start();
    let (x1, y1) = patch_space.end();

    match (axis, side) {
        (Axis::I, Side::Lower) => IndexSpace::new(x0..i0, j0..j1),
        (Axis::I, Side::Upper) => IndexSpace::new(i1..x1, j0..j1),
        (Axis::J, Side::Lower) => IndexSpace::new(x0..x1, y0..j0),
        (Axis::J, Side::Upper) => IndexSpace::new(x0..x1, j1..y1),
    }
}

fn fill_side(
    kind: &BoundaryKind,
    cons: &mut Patch,
    valid: &IndexSpace,
    axis: Axis,
    side: Side,
    constants: &PhysicalConstants,
    context: &BoundaryContext)
{
    let lo = along(valid.start(), axis);
    let hi = along(valid.end(), axis);
    let n = hi - lo;
    let c = constants.c_light;
    let momentum = gas_momentum_index(Direction::from(axis));
    let flux = rad_flux_index(Direction::from(axis));

    for index in guard_region(&cons.index_space(), valid, axis, side).iter() {
        let k = along(index, axis);
        let depth = match side {
            Side::Lower => lo - k,
            Side::Upper => k - hi + 1,
        };
        let nearest = match side {
            Side::Lower => axis.shift(index, lo - k),
            Side::Upper => axis.shift(index, hi - 1 - k),
        };
        let mut u = cons.get_slice(nearest).to_vec();

        match kind {
            BoundaryKind::Extrapolate => {}
            BoundaryKind::Periodic => {
                let source = match side {
                    Side::Lower => axis.shift(index, n),
                    Side::Upper => axis.shift(index, -n),
                };
                u.copy_from_slice(cons.get_slice(source));
            }
            BoundaryKind::Reflecting => {
                let mirror = match side {
                    Side::Lower => axis.shift(index, 2 * depth - 1),
                    Side::Upper => axis.shift(index, 1 - 2 * depth),
                };
                u.copy_from_slice(cons.get_slice(mirror));
                u[momentum] = -u[momentum];
                u[flux] = -u[flux];
            }
            BoundaryKind::Marshak { incident_energy } => {
                let e0 = u[RAD_ENERGY];
                let f0 = u[flux];
                let e_inc = *incident_energy;
                u[RAD_ENERGY] = e_inc;
                u[flux] = match side {
                    Side::Lower =>  0.5 * c * e_inc - 0.5 * (c * e0 + 2.0 * f0),
                    Side::Upper => -0.5 * c * e_inc + 0.5 * (c * e0 - 2.0 * f0),
                };
                debug_assert!((u[flux] / (c * e_inc)).abs() <= 1.0, "Marshak flux is not causal");
            }
            BoundaryKind::Inflow(state) => {
                state.to_conserved(context.delta_vx, &mut u);
            }
        }
        cons.get_slice_mut(index).copy_from_slice(&u);
    }
}

impl BoundaryFill for Boundaries {
    fn fill(&self, cons: &mut Patch, valid: &IndexSpace, constants: &PhysicalConstants, context: &BoundaryContext) {
        fill_side(&self.lower_i, cons, valid, Axis::I, Side::Lower, constants, context);
        fill_side(&self.upper_i, cons, valid, Axis::I, Side::Upper, constants, context);
        fill_side(&self.lower_j, cons, valid, Axis::J, Side::Lower, constants, context);
        fill_side(&self.upper_j, cons, valid, Axis::J, Side::Upper, constants, context);
    }

    fn validate(&self) -> Result<(), Error> {
        let periodic_i = (self.lower_i == BoundaryKind::Periodic, self.upper_i == BoundaryKind::Periodic);
        let periodic_j = (self.lower_j == BoundaryKind::Periodic, self.upper_j == BoundaryKind::Periodic);

        if periodic_i.0 != periodic_i.1 || periodic_j.0 != periodic_j.1 {
            return Err(Error::Config("periodic boundaries must be set on both sides of an axis".into()))
        }
        for kind in [&self.lower_i, &self.upper_i, &self.lower_j, &self.upper_j] {
            if let BoundaryKind::Marshak { incident_energy } = kind {
                if !(*incident_energy > 0.0) {
                    return Err(Error::Config(format!("Marshak incident energy must be positive (got {})", incident_energy)))
                }
            }
        }
        Ok(())
    }
}
