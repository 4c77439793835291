use serde::{Deserialize, Serialize};
use crate::index_space::{Axis, IndexSpace};
use crate::num_vec::Vector;
use crate::patch::Patch;
use crate::reconstruct::{reconstruct, Reconstruction};
use super::closure::eddington_tensor;
use super::geometry::Direction;
use super::physics::RadiationPhysics;
use super::state::*;




/**
 * Radiation energy and flux `[E, Fx, Fy, Fz]` at one face or cell.
 */
pub type RadVector = Vector<f64, NUM_HYPERBOLIC>;




/**
 * Exponents applied to the asymptotic-preserving correction factor `S` in the
 * energy and flux components of the HLL dissipation term. These are tunable;
 * the defaults are `S^2` on the energy and `S` on the flux.
 */
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionExponents {
    pub energy: f64,
    pub flux: f64,
}

impl Default for CorrectionExponents {
    fn default() -> Self {
        Self { energy: 2.0, flux: 1.0 }
    }
}




/**
 * The two flux variants computed at each face: the corrected HLL flux, and
 * the plain HLL flux used as a fallback where the corrected one yields an
 * inadmissible state.
 */
#[derive(Clone, Copy, Debug)]
pub struct FaceFlux {
    pub physical: RadVector,
    pub diffusive: RadVector,
}




/**
 * Flux patches for one sweep direction. Both patches cover the faces
 * `cells.extend_upper(1, axis)` and hold `NUM_HYPERBOLIC` fields.
 */
pub struct DirectionalFluxes {
    pub axis: Axis,
    pub physical: Patch,
    pub diffusive: Patch,
}




// ============================================================================
fn primitive_to_conserved(prim: &[f64], c_light: f64) -> RadVector {
    let erad = prim[PRIM_RAD_ENERGY];
    RadVector::new([
        erad,
        c_light * erad * prim[X1_REDUCED_FLUX],
        c_light * erad * prim[X2_REDUCED_FLUX],
        c_light * erad * prim[X3_REDUCED_FLUX],
    ])
}

fn is_primitive_valid(prim: &[f64]) -> bool {
    let f = magnitude(prim[X1_REDUCED_FLUX], prim[X2_REDUCED_FLUX], prim[X3_REDUCED_FLUX]);
    prim[PRIM_RAD_ENERGY] > 0.0 && f < 1.0
}

/**
 * Return the normal-normal Eddington tensor component and the row of the
 * pressure tensor along the given direction.
 */
fn normal_pressure(u: RadVector, direction: Direction, c_light: f64) -> (f64, [f64; 3]) {
    let erad = u[0];
    let reduced = [
        u[1] / (c_light * erad),
        u[2] / (c_light * erad),
        u[3] / (c_light * erad),
    ];
    let t = eddington_tensor(reduced);
    let n = direction.component();
    (t[n][n], [t[n][0] * erad, t[n][1] * erad, t[n][2] * erad])
}




/**
 * Asymptotic-preserving correction factor `S = min(1, 1 / tau)` for a face
 * between cells of optical depth `tau_l` and `tau_r`, where `tau` is their
 * harmonic mean. Faces between transparent cells are uncorrected.
 */
pub fn correction_factor(tau_l: f64, tau_r: f64) -> f64 {
    let tau = if tau_l + tau_r > 0.0 {
        2.0 * tau_l * tau_r / (tau_l + tau_r)
    } else {
        0.0
    };
    if tau > 1.0 {
        1.0 / tau
    } else {
        1.0
    }
}

/**
 * Optical depth `dx ρ κ(ρ, T)` of a cell, with the temperature inferred from
 * the gas internal energy.
 */
pub fn cell_optical_depth<P: RadiationPhysics>(physics: &P, cons: &[f64], dx: f64) -> f64 {
    let rho = cons[GAS_DENSITY];
    let temperature = physics.gas_temperature(rho, internal_energy(cons));
    dx * rho * physics.opacity(rho, temperature)
}




/**
 * HLL flux of the reduced-speed-of-light M1 system along `direction`, for
 * admissible left and right states `ul` and `ur`, given the correction
 * factor `s_corr` of the face.
 */
pub fn hll_flux<P: RadiationPhysics>(
    physics: &P,
    ul: RadVector,
    ur: RadVector,
    direction: Direction,
    s_corr: f64,
    exponents: CorrectionExponents) -> FaceFlux
{
    let c = physics.constants().c_light;
    let c_hat = physics.constants().c_hat;
    let n = direction.component();

    let (tnn_l, pn_l) = normal_pressure(ul, direction, c);
    let (tnn_r, pn_r) = normal_pressure(ur, direction, c);

    let sl = f64::min(-0.1 * c_hat, -c_hat * tnn_l.sqrt());
    let sr = f64::max( 0.1 * c_hat,  c_hat * tnn_r.sqrt());

    debug_assert!(sl >= -c_hat * (1.0 + 1e-12) && sr <= c_hat * (1.0 + 1e-12), "non-causal signal speeds");

    let fl = RadVector::new([
        (c_hat / c) * ul[1 + n],
        c_hat * c * pn_l[0],
        c_hat * c * pn_l[1],
        c_hat * c * pn_l[2],
    ]);
    let fr = RadVector::new([
        (c_hat / c) * ur[1 + n],
        c_hat * c * pn_r[0],
        c_hat * c * pn_r[1],
        c_hat * c * pn_r[2],
    ]);

    let eps = RadVector::new([
        s_corr.powf(exponents.energy),
        s_corr.powf(exponents.flux),
        s_corr.powf(exponents.flux),
        s_corr.powf(exponents.flux),
    ]);
    let central = fl * (sr / (sr - sl)) - fr * (sl / (sr - sl));
    let dissipation = (ur - ul) * (sr * sl / (sr - sl));

    let physical = central + dissipation.component_mul(eps);
    let diffusive = central + dissipation;

    debug_assert!(physical.is_finite() && diffusive.is_finite(), "non-finite radiation flux");

    FaceFlux { physical, diffusive }
}




/**
 * Compute the physical and diffusive fluxes at every face of `cells` along
 * `axis`, from the conserved state `cons`. The state must carry enough guard
 * zones along `axis` for the reconstruction (see `crate::reconstruct`).
 *
 * Faces where either reconstructed state is inadmissible use the
 * unreconstructed conserved values of the two adjacent cells instead.
 */
pub fn compute_fluxes<P: RadiationPhysics>(
    physics: &P,
    cons: &Patch,
    cells: &IndexSpace,
    axis: Axis,
    dx: f64,
    method: Reconstruction,
    exponents: CorrectionExponents) -> DirectionalFluxes
{
    let c = physics.constants().c_light;
    let direction = Direction::from(axis);
    let faces = cells.extend_upper(1, axis);

    let prim = cons.map(NUM_PRIMITIVE, |u, p| conserved_to_primitive(u, p, c));
    let states = reconstruct(method, &prim, cells, axis);

    let tau = Patch::from_slice_function_par(cells.extend(1, axis), 1, |index, t| {
        t[0] = cell_optical_depth(physics, cons.get_slice(index), dx)
    });

    let both = Patch::from_slice_function_par(faces, 2 * NUM_HYPERBOLIC, |face, f| {
        let lower = axis.shift(face, -1);
        let pl = states.left.get_slice(face);
        let pr = states.right.get_slice(face);

        let (ul, ur) = if is_primitive_valid(pl) && is_primitive_valid(pr) {
            (primitive_to_conserved(pl, c), primitive_to_conserved(pr, c))
        } else {
            (RadVector::from_slice(&cons.get_slice(lower)[HYPERBOLIC_START..]),
             RadVector::from_slice(&cons.get_slice(face)[HYPERBOLIC_START..]))
        };
        let s_corr = correction_factor(tau.get(lower, 0), tau.get(face, 0));
        let flux = hll_flux(physics, ul, ur, direction, s_corr, exponents);

        f[..NUM_HYPERBOLIC].copy_from_slice(flux.physical.as_array());
        f[NUM_HYPERBOLIC..].copy_from_slice(flux.diffusive.as_array());
    });

    DirectionalFluxes {
        axis,
        physical: both.map(NUM_HYPERBOLIC, |a, b| b.copy_from_slice(&a[..NUM_HYPERBOLIC])),
        diffusive: both.map(NUM_HYPERBOLIC, |a, b| b.copy_from_slice(&a[NUM_HYPERBOLIC..])),
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::index_space::range2d;
    use crate::radiation::physics::{GreyGas, PhysicalConstants};

    fn unit_gas(kappa: f64) -> GreyGas {
        let constants = PhysicalConstants {
            c_light: 1.0,
            c_hat: 1.0,
            radiation_constant: 1.0,
            mean_molecular_mass: 1.0,
            boltzmann_constant: 1.0,
            gamma: 5.0 / 3.0,
            erad_floor: 0.0,
        };
        GreyGas { constants, kappa }
    }

    /**
     * A deterministic sequence in [0, 1), so the tests need no random
     * number generator.
     */
    fn sequence(n: usize) -> impl Iterator<Item = f64> {
        (0..n).map(|k| ((k as f64 * 0.618_033_988_749_895) % 1.0))
    }

    #[test]
    fn uniform_state_flux_is_bounded_by_reduced_light_speed() {
        let gas = unit_gas(0.0);

        for f in sequence(50) {
            let u = RadVector::new([2.0, 2.0 * f, 0.0, 0.0]);
            let flux = hll_flux(&gas, u, u, Direction::I, 1.0, CorrectionExponents::default());
            assert!(flux.physical[0].abs() <= gas.constants.c_hat * u[0] * (1.0 + 1e-14));
            assert!((flux.physical[0] - u[1]).abs() < 1e-14);
        }
    }

    #[test]
    fn fluxes_are_finite_for_admissible_states() {
        let gas = unit_gas(1.0);
        let angles: Vec<_> = sequence(40).collect();

        for (k, f) in sequence(40).enumerate() {
            let theta = 6.283 * angles[(k * 7) % 40];
            let ul = RadVector::new([1.0 + f, 0.99 * f * (1.0 + f) * theta.cos(), 0.99 * f * (1.0 + f) * theta.sin(), 0.0]);
            let ur = RadVector::new([2.0 - f, -0.5 * f * (2.0 - f), 0.0, 0.3 * f * (2.0 - f)]);

            for direction in [Direction::I, Direction::J, Direction::K] {
                let flux = hll_flux(&gas, ul, ur, direction, f, CorrectionExponents::default());
                assert!(flux.physical.is_finite());
                assert!(flux.diffusive.is_finite());
            }
        }
    }

    #[test]
    fn correction_only_changes_the_dissipation() {
        let gas = unit_gas(1.0);
        let ul = RadVector::new([1.0, 0.2, 0.0, 0.0]);
        let ur = RadVector::new([3.0, -0.1, 0.0, 0.0]);
        let thin = hll_flux(&gas, ul, ur, Direction::I, 1.0, CorrectionExponents::default());
        let thick = hll_flux(&gas, ul, ur, Direction::I, 1e-3, CorrectionExponents::default());

        assert_eq!(thin.physical, thin.diffusive);
        assert_eq!(thick.diffusive, thin.diffusive);
        assert!((thick.physical[0] - thin.physical[0]).abs() > 0.0);
    }

    #[test]
    fn correction_factor_follows_the_harmonic_mean() {
        assert_eq!(correction_factor(0.0, 0.0), 1.0);
        assert_eq!(correction_factor(0.5, 0.5), 1.0);
        assert!((correction_factor(10.0, 10.0) - 0.1).abs() < 1e-15);
        assert!((correction_factor(5.0, 20.0) - 0.125).abs() < 1e-15);
        assert_eq!(correction_factor(0.0, 100.0), 1.0);
    }

    #[test]
    fn uniform_patch_fluxes_have_no_divergence() {
        let gas = unit_gas(1.0);
        let cons = Patch::from_slice_function(range2d(-4..14, 0..1), NUM_CONSERVED, |_, u| {
            u[GAS_DENSITY] = 1.0;
            u[GAS_ENERGY] = 1.0;
            u[RAD_ENERGY] = 1.0;
            u[X1_RAD_FLUX] = 0.3;
        });
        let cells = range2d(0..10, 0..1);

        for method in [Reconstruction::Constant, Reconstruction::Plm, Reconstruction::Ppm] {
            let fluxes = compute_fluxes(&gas, &cons, &cells, Axis::I, 0.1, method, CorrectionExponents::default());
            let first = fluxes.physical.get_slice((0, 0)).to_vec();

            for s in fluxes.physical.iter_data() {
                assert_eq!(s, first.as_slice());
            }
            assert!((first[0] - 0.3).abs() < 1e-14);
        }
    }

    #[test]
    fn inadmissible_reconstruction_falls_back_to_cell_values() {
        // The flux rotates from x to y across cell 5. Each cell is causal,
        // but the limited slopes of the two components combine into a
        // super-luminal right state at face 5.
        let gas = unit_gas(1.0);
        let reduced = |i: i64| match i {
            i if i < 5 => (0.99, 0.0),
            5 => (0.7, 0.7),
            _ => (0.0, 0.99),
        };
        let cons = Patch::from_slice_function(range2d(-4..14, 0..1), NUM_CONSERVED, |(i, _), u| {
            let (fx, fy) = reduced(i);
            u[GAS_DENSITY] = 1.0;
            u[GAS_ENERGY] = 1.0;
            u[RAD_ENERGY] = 1.0;
            u[X1_RAD_FLUX] = fx;
            u[X2_RAD_FLUX] = fy;
        });
        let cells = range2d(0..10, 0..1);

        let prim = cons.map(NUM_PRIMITIVE, |u, p| conserved_to_primitive(u, p, 1.0));
        let states = reconstruct(Reconstruction::Plm, &prim, &cells, Axis::I);
        assert!(!is_primitive_valid(states.right.get_slice((5, 0))));
        assert!(is_primitive_valid(states.left.get_slice((5, 0))));

        let fluxes = compute_fluxes(&gas, &cons, &cells, Axis::I, 0.1, Reconstruction::Plm, CorrectionExponents::default());

        let ul = RadVector::from_slice(&cons.get_slice((4, 0))[HYPERBOLIC_START..]);
        let ur = RadVector::from_slice(&cons.get_slice((5, 0))[HYPERBOLIC_START..]);
        let tau = |i| cell_optical_depth(&gas, cons.get_slice((i, 0)), 0.1);
        let s_corr = correction_factor(tau(4), tau(5));
        let expected = hll_flux(&gas, ul, ur, Direction::I, s_corr, CorrectionExponents::default());

        assert_eq!(fluxes.physical.get_slice((5, 0)), expected.physical.as_array());
        assert_eq!(fluxes.diffusive.get_slice((5, 0)), expected.diffusive.as_array());
    }
}
