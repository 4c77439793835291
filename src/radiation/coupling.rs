use log::debug;
use crate::index_space::IndexSpace;
use crate::patch::Patch;
use super::error::{ConvergenceError, Error};
use super::physics::RadiationPhysics;
use super::state::*;




/// Maximum number of Newton-Raphson iterations per cell
pub const MAX_ITERATIONS: usize = 200;

/// Residual tolerance, relative to the initial total energy of the cell
pub const RESIDUAL_TOLERANCE: f64 = 1e-10;




/**
 * Externally supplied source fields for the coupling step, each covering at
 * least the updated cells. `radiation` has one field (a volumetric emission
 * rate, multiplied by `ĉ`); `advection` has `NUM_HYPERBOLIC` fields (rates
 * of change of the radiation energy and the three flux components). Absent
 * fields are zero.
 */
#[derive(Clone, Copy, Default)]
pub struct SourceFields<'a> {
    pub radiation: Option<&'a Patch>,
    pub advection: Option<&'a Patch>,
}

impl<'a> SourceFields<'a> {
    fn radiation_at(&self, index: (i64, i64)) -> f64 {
        self.radiation.map_or(0.0, |p| p.get(index, 0))
    }

    fn advection_at(&self, index: (i64, i64)) -> [f64; NUM_HYPERBOLIC] {
        let mut adv = [0.0; NUM_HYPERBOLIC];

        if let Some(p) = self.advection {
            adv.copy_from_slice(p.get_slice(index))
        }
        adv
    }
}




/**
 * Explicitly evaluated exchange terms over a time step, for one cell.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplicitSources {
    /// Radiation energy gained, `dt ρ κ (B - ĉ E)`; the gas loses `c/ĉ` times this
    pub energy: f64,
    /// Change of the radiation flux from drag, `-dt ĉ ρ κ F`
    pub flux: [f64; 3],
}




/**
 * Evaluate the matter-radiation exchange terms explicitly, at the current
 * state of a cell.
 */
pub fn explicit_source_terms<P: RadiationPhysics>(physics: &P, cons: &[f64], dt: f64) -> ExplicitSources {
    let constants = physics.constants();
    let c_hat = constants.c_hat;
    let rho = cons[GAS_DENSITY];
    let temperature = physics.gas_temperature(rho, internal_energy(cons));
    let kappa = physics.opacity(rho, temperature);
    let b = c_hat * constants.radiation_constant * temperature.powi(4);
    let drag = -dt * c_hat * rho * kappa;

    ExplicitSources {
        energy: dt * rho * kappa * (b - c_hat * cons[RAD_ENERGY]),
        flux: [
            drag * cons[X1_RAD_FLUX],
            drag * cons[X2_RAD_FLUX],
            drag * cons[X3_RAD_FLUX],
        ],
    }
}




/**
 * Advance the stiff matter-radiation exchange of one cell over `dt`,
 * implicitly in the gas and radiation energies (Newton-Raphson on the 2x2
 * system) and then in the radiation flux. The gas momentum receives the
 * momentum lost by the radiation, and the gas kinetic energy changes by the
 * work done on the initial velocity.
 *
 * `rad_source` is the external emission rate and `advection` the explicit
 * radiation advection rates (energy, then flux). Returns the number of
 * Newton iterations taken. On error the state is left unmodified.
 */
pub fn couple_cell<P: RadiationPhysics>(
    physics: &P,
    cons: &mut [f64],
    rad_source: f64,
    advection: [f64; NUM_HYPERBOLIC],
    dt: f64,
    index: (i64, i64)) -> Result<usize, Error>
{
    let constants = physics.constants();
    let c = constants.c_light;
    let c_hat = constants.c_hat;
    let a_rad = constants.radiation_constant;
    let ratio = c / c_hat;

    let rho = cons[GAS_DENSITY];
    let egas0 = internal_energy(cons);
    let erad0 = cons[RAD_ENERGY];
    let etot0 = egas0 + ratio * erad0;
    let src = dt * (c_hat * rad_source + advection[0]);

    let mut egas = egas0;
    let mut erad = erad0;
    let mut iterations = None;
    let mut residual = f64::INFINITY;

    for n in 0..MAX_ITERATIONS {
        let t = physics.gas_temperature(rho, egas);
        let kappa = physics.opacity(rho, t);
        let b = c_hat * a_rad * t.powi(4);
        let rhs = dt * rho * kappa * (b - c_hat * erad);

        let f_g = (egas - egas0) + ratio * rhs;
        let f_r = (erad - erad0) - (rhs + src);

        residual = f64::max((f_g / etot0).abs(), (f_r / etot0).abs());

        if residual < RESIDUAL_TOLERANCE {
            iterations = Some(n);
            break;
        }

        let c_v = physics.heat_capacity(rho, t);
        let dkappa_dt = physics.opacity_derivative(rho, t);
        let drhs_degas = (rho * dt / c_v) * (kappa * 4.0 * b / t + dkappa_dt * (b - c_hat * erad));

        let dfg_degas = 1.0 + ratio * drhs_degas;
        let dfg_derad = -dt * rho * kappa * c;
        let dfr_degas = -drhs_degas;
        let dfr_derad = 1.0 + dt * rho * kappa * c_hat;

        // Schur complement: eliminate the gas energy from the radiation row
        let eta = -dfr_degas / dfg_degas;
        let derad = -(f_r + eta * f_g) / (dfr_derad + eta * dfg_derad);
        let degas = -(f_g + dfg_derad * derad) / dfg_degas;

        egas += degas;
        erad += derad;
    }

    let iterations = iterations.ok_or(ConvergenceError {
        index,
        iterations: MAX_ITERATIONS,
        residual,
        egas,
        erad,
    })?;

    if !(egas > 0.0 && erad > 0.0) {
        return Err(Error::NonPositiveEnergy { index, egas, erad })
    }

    let t = physics.gas_temperature(rho, egas);
    let kappa = physics.opacity(rho, t);
    let drag = 1.0 + rho * kappa * c_hat * dt;

    let mut work = 0.0;
    let mut kinetic = 0.0;

    for n in 0..3 {
        let f0 = cons[X1_RAD_FLUX + n];
        let f1 = (f0 + dt * advection[1 + n]) / drag;
        let p0 = cons[X1_GAS_MOMENTUM + n];
        let dp = -(f1 - f0) / (c * c_hat);

        kinetic += 0.5 * p0 * p0 / rho;
        work += (p0 / rho) * dp;

        cons[X1_RAD_FLUX + n] = f1;
        cons[X1_GAS_MOMENTUM + n] = p0 + dp;
    }
    cons[RAD_ENERGY] = erad;
    cons[GAS_ENERGY] = egas + kinetic + work;

    Ok(iterations)
}




/**
 * Apply the matter-radiation coupling to every cell of `cells`, in parallel.
 * Returns the largest number of Newton iterations taken in any cell. If any
 * cell fails, one of the failures is returned.
 */
pub fn add_source_terms<P: RadiationPhysics>(
    physics: &P,
    cons: &mut Patch,
    cells: &IndexSpace,
    sources: SourceFields,
    dt: f64) -> Result<usize, Error>
{
    let iterations = cons.par_try_map_in(cells, |index, u| {
        couple_cell(physics, u, sources.radiation_at(index), sources.advection_at(index), dt, index)
    })?;

    let max_iterations = iterations.into_iter().max().unwrap_or(0);
    debug!("matter-radiation coupling: at most {} Newton iterations per cell", max_iterations);
    Ok(max_iterations)
}
