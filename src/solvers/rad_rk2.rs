use core::ops::Range;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use crate::boundary::{BoundaryContext, BoundaryFill};
use crate::index_space::{range2d, Axis, IndexSpace};
use crate::patch::Patch;
use crate::radiation::coupling::{add_source_terms, SourceFields};
use crate::radiation::error::Error;
use crate::radiation::physics::{PhysicalConstants, RadiationPhysics};
use crate::radiation::riemann::{compute_fluxes, CorrectionExponents, DirectionalFluxes};
use crate::radiation::state::*;
use crate::reconstruct::{Reconstruction, NUM_GUARD};




/// A simple rectilinear structured mesh
///
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mesh {
    pub area: (Range<f64>, Range<f64>),
    pub size: (i64, i64),
}

impl Mesh {
    pub fn cell_spacing(&self) -> (f64, f64) {
        let d0 = (self.area.0.end - self.area.0.start) / self.size.0 as f64;
        let d1 = (self.area.1.end - self.area.1.start) / self.size.1 as f64;
        (d0, d1)
    }

    pub fn cell_center(&self, index: (i64, i64)) -> (f64, f64) {
        let (d0, d1) = self.cell_spacing();
        let x0 = self.area.0.start + d0 * (index.0 as f64 + 0.5);
        let x1 = self.area.1.start + d1 * (index.1 as f64 + 0.5);
        (x0, x1)
    }

    pub fn cell_volume(&self) -> f64 {
        let (d0, d1) = self.cell_spacing();
        d0 * d1
    }

    pub fn total_zones(&self) -> i64 {
        self.size.0 * self.size.1
    }

    /// A mesh one zone wide on the J axis is swept along I only, and carries
    /// no guard zones on J.
    ///
    pub fn is_one_dimensional(&self) -> bool {
        self.size.1 == 1
    }

    pub fn active_axes(&self) -> Vec<Axis> {
        if self.is_one_dimensional() {
            vec![Axis::I]
        } else {
            vec![Axis::I, Axis::J]
        }
    }

    /// The index space of the valid (non-guard) zones
    ///
    pub fn valid_space(&self) -> IndexSpace {
        range2d(0..self.size.0, 0..self.size.1)
    }

    /// The index space of the valid zones plus guard zones on active axes
    ///
    pub fn extended_space(&self) -> IndexSpace {
        self.active_axes()
            .into_iter()
            .fold(self.valid_space(), |space, axis| space.extend(NUM_GUARD, axis))
    }

    fn spacing_along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::I => self.cell_spacing().0,
            Axis::J => self.cell_spacing().1,
        }
    }
}




/// Numerical parameters of the radiation update
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub reconstruction: Reconstruction,
    pub cfl_number: f64,
    pub correction: CorrectionExponents,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            reconstruction: Reconstruction::Ppm,
            cfl_number: 0.3,
            correction: CorrectionExponents::default(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.cfl_number > 0.0 && self.cfl_number <= 1.0) {
            return Err(Error::Config(format!("CFL number must be in (0, 1] (got {})", self.cfl_number)))
        }
        if !(self.correction.energy >= 0.0 && self.correction.flux >= 0.0) {
            return Err(Error::Config(format!("correction exponents must be non-negative (got {:?})", self.correction)))
        }
        Ok(())
    }
}




/// Counters describing one completed time step
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub stage1_fallbacks: usize,
    pub stage2_fallbacks: usize,
    pub newton_iterations: usize,
}




/// The fastest signal speed of the reduced-speed-of-light M1 system.
///
pub fn max_signal_speed(constants: &PhysicalConstants) -> f64 {
    constants.c_hat
}




/// Write the radiation variables `base + step * Σ (F(i) - F(i + 1)) / dx`
/// into each cell of `valid` in `u_new`, using the physical fluxes, or the
/// diffusive fluxes in cells where the physical ones give an inadmissible
/// state. Returns the number of cells which needed the diffusive fluxes.
///
pub fn conservative_update<F>(
    u_new: &mut Patch,
    valid: &IndexSpace,
    base: F,
    fluxes: &[(DirectionalFluxes, f64)],
    step: f64,
    c_light: f64,
    stage: &'static str) -> Result<usize, Error>
where
    F: Fn((i64, i64)) -> [f64; NUM_HYPERBOLIC] + Sync
{
    let radiation = HYPERBOLIC_START..HYPERBOLIC_START + NUM_HYPERBOLIC;

    let used = u_new.par_try_map_in(valid, |index, u| {
        let predict = |diffusive: bool| {
            let mut r = base(index);

            for (flux, dx) in fluxes {
                let patch = if diffusive { &flux.diffusive } else { &flux.physical };
                let fm = patch.get_slice(index);
                let fp = patch.get_slice(flux.axis.shift(index, 1));

                for n in 0..NUM_HYPERBOLIC {
                    r[n] += step / dx * (fm[n] - fp[n]);
                }
            }
            r
        };

        u[radiation.clone()].copy_from_slice(&predict(false));

        if is_state_valid(u, c_light) {
            return Ok(0)
        }
        u[radiation.clone()].copy_from_slice(&predict(true));

        if is_state_valid(u, c_light) {
            Ok(1)
        } else {
            Err(Error::InadmissibleState {
                stage,
                index,
                erad: u[RAD_ENERGY],
                reduced_flux: reduced_flux(u, c_light),
            })
        }
    })?;
    Ok(used.into_iter().sum())
}

fn radiation_part(u: &[f64]) -> [f64; NUM_HYPERBOLIC] {
    let mut r = [0.0; NUM_HYPERBOLIC];
    r.copy_from_slice(&u[HYPERBOLIC_START..HYPERBOLIC_START + NUM_HYPERBOLIC]);
    r
}




/// Second-order Runge-Kutta (SSP) update of the radiation moment equations,
/// operator-split with the implicit matter-radiation exchange.
///
/// The conserved state is a `Patch` over `mesh.extended_space()`. Guard zones
/// are filled by the boundary hook before each stage; only the valid zones
/// are updated.
///
pub struct RadiationUpdate<P, B> {
    pub physics: P,
    pub boundaries: B,
    pub mesh: Mesh,
    pub config: SolverConfig,
}

impl<P: RadiationPhysics, B: BoundaryFill> RadiationUpdate<P, B> {

    pub fn new(physics: P, boundaries: B, mesh: Mesh, config: SolverConfig) -> Result<Self, Error> {
        physics.constants().validate()?;
        boundaries.validate()?;
        config.validate()?;

        if mesh.size.0 < NUM_GUARD || (!mesh.is_one_dimensional() && mesh.size.1 < NUM_GUARD) {
            return Err(Error::Config(format!("mesh {:?} is smaller than the guard zone depth {}", mesh.size, NUM_GUARD)))
        }
        Ok(Self { physics, boundaries, mesh, config })
    }

    /// Generate a conserved state from a function of the cell center, and
    /// fill its guard zones.
    ///
    pub fn initial_state<F>(&self, f: F, context: &BoundaryContext) -> Patch
    where
        F: Fn((f64, f64), &mut [f64]) + Sync
    {
        let valid = self.mesh.valid_space();
        let mut u = Patch::from_slice_function_par(self.mesh.extended_space(), NUM_CONSERVED, |index, s| {
            if valid.contains(index) {
                f(self.mesh.cell_center(index), s)
            }
        });
        self.fill_guard_zones(&mut u, context);
        u
    }

    pub fn fill_guard_zones(&self, u: &mut Patch, context: &BoundaryContext) {
        self.boundaries.fill(u, &self.mesh.valid_space(), self.physics.constants(), context)
    }

    /// The largest stable time step, `cfl min(dx) / ĉ`.
    ///
    pub fn compute_timestep(&self) -> f64 {
        let dx = self.mesh
            .active_axes()
            .into_iter()
            .map(|axis| self.mesh.spacing_along(axis))
            .fold(f64::INFINITY, f64::min);
        self.config.cfl_number * dx / max_signal_speed(self.physics.constants())
    }

    fn fluxes(&self, u: &Patch) -> Vec<(DirectionalFluxes, f64)> {
        let valid = self.mesh.valid_space();

        self.mesh.active_axes().into_iter().map(|axis| {
            let dx = self.mesh.spacing_along(axis);
            let flux = compute_fluxes(
                &self.physics,
                u,
                &valid,
                axis,
                dx,
                self.config.reconstruction,
                self.config.correction);
            (flux, dx)
        }).collect()
    }

    /// Forward-Euler predictor: `U1 = U0 + dt L(U0)`. The guard zones of `u0`
    /// must be filled. Returns the predicted state and the number of cells
    /// that fell back to the diffusive fluxes.
    ///
    pub fn stage1(&self, u0: &Patch, dt: f64) -> Result<(Patch, usize), Error> {
        let c = self.physics.constants().c_light;
        let fluxes = self.fluxes(u0);
        let mut u1 = u0.clone();
        let base = |index| radiation_part(u0.get_slice(index));
        let fallbacks = conservative_update(&mut u1, &self.mesh.valid_space(), base, &fluxes, dt, c, "stage 1")?;
        Ok((u1, fallbacks))
    }

    /// RK2-SSP corrector: `U2 = U0 / 2 + U1 / 2 + dt L(U1) / 2`. The guard
    /// zones of `u1` must be filled.
    ///
    pub fn stage2(&self, u0: &Patch, u1: &Patch, dt: f64) -> Result<(Patch, usize), Error> {
        let c = self.physics.constants().c_light;
        let fluxes = self.fluxes(u1);
        let mut u2 = u0.clone();
        let base = |index| {
            let a = radiation_part(u0.get_slice(index));
            let b = radiation_part(u1.get_slice(index));
            [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1]), 0.5 * (a[2] + b[2]), 0.5 * (a[3] + b[3])]
        };
        let fallbacks = conservative_update(&mut u2, &self.mesh.valid_space(), base, &fluxes, 0.5 * dt, c, "stage 2")?;
        Ok((u2, fallbacks))
    }

    /// Advance the radiation transport over `dt`, leaving the gas variables
    /// alone. Returns the fallback counts of the two stages.
    ///
    pub fn advance_transport(&self, u: &mut Patch, dt: f64, context: &BoundaryContext) -> Result<(usize, usize), Error> {
        self.fill_guard_zones(u, context);
        let (mut u1, n1) = self.stage1(u, dt)?;

        let context1 = BoundaryContext { time: context.time + dt, ..*context };
        self.fill_guard_zones(&mut u1, &context1);
        let (u2, n2) = self.stage2(u, &u1, dt)?;

        if n1 > 0 || n2 > 0 {
            warn!("diffusive flux fallback in {} (stage 1) and {} (stage 2) cells at t = {:.6e}", n1, n2, context.time);
        }
        *u = u2;
        Ok((n1, n2))
    }

    /// Advance a full time step: radiation transport, then the implicit
    /// matter-radiation exchange in every valid zone.
    ///
    pub fn advance_timestep(&self, u: &mut Patch, dt: f64, sources: SourceFields, context: &BoundaryContext) -> Result<StepReport, Error> {
        let (stage1_fallbacks, stage2_fallbacks) = self.advance_transport(u, dt, context)?;
        let newton_iterations = add_source_terms(&self.physics, u, &self.mesh.valid_space(), sources, dt)?;

        debug!("step at t = {:.6e} with dt = {:.6e}: {} Newton iterations at most", context.time, dt, newton_iterations);

        Ok(StepReport {
            stage1_fallbacks,
            stage2_fallbacks,
            newton_iterations,
        })
    }

    pub fn total_radiation_energy(&self, u: &Patch) -> f64 {
        u.sum_field(self.mesh.valid_space(), RAD_ENERGY) * self.mesh.cell_volume()
    }

    pub fn total_gas_energy(&self, u: &Patch) -> f64 {
        u.sum_field(self.mesh.valid_space(), GAS_ENERGY) * self.mesh.cell_volume()
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::boundary::{Boundaries, BoundaryKind};
    use crate::radiation::physics::GreyGas;

    fn unit_constants(boltzmann_constant: f64) -> PhysicalConstants {
        PhysicalConstants {
            c_light: 1.0,
            c_hat: 1.0,
            radiation_constant: 1.0,
            mean_molecular_mass: 1.0,
            boltzmann_constant,
            gamma: 5.0 / 3.0,
            erad_floor: 0.0,
        }
    }

    fn solver_with(boltzmann_constant: f64, kappa: f64, size: (i64, i64), kind: BoundaryKind) -> RadiationUpdate<GreyGas, Boundaries> {
        let physics = GreyGas { constants: unit_constants(boltzmann_constant), kappa };
        let mesh = Mesh { area: (0.0..1.0, 0.0..1.0), size };
        RadiationUpdate::new(physics, Boundaries::uniform(kind), mesh, SolverConfig::default()).unwrap()
    }

    fn solver(kappa: f64, size: (i64, i64), kind: BoundaryKind) -> RadiationUpdate<GreyGas, Boundaries> {
        solver_with(1e-6, kappa, size, kind)
    }

    #[test]
    fn gaussian_pulse_diffuses_at_the_analytic_rate() {
        let kappa = 1000.0;
        let rho = 1.0;
        let sigma = 0.025;
        let diffusion = 1.0 / (3.0 * kappa * rho);
        let background = 1e-4;

        let exact = |x: f64, t: f64| {
            let width_sq = sigma * sigma + diffusion * t;
            let normfac = 1.0 / (2.0 * (std::f64::consts::PI * width_sq).sqrt());
            normfac * (-(x * x) / (4.0 * width_sq)).exp() + background
        };
        let exact_flux = |x: f64, t: f64| {
            let width_sq = sigma * sigma + diffusion * t;
            diffusion * x / (2.0 * width_sq) * (exact(x, t) - background)
        };

        // The gas heat capacity must be large enough that the implicit
        // exchange stays on the positive-temperature root.
        let update = solver_with(1e-3, kappa, (100, 1), BoundaryKind::Reflecting);
        let t0 = 0.01;
        let t1 = 0.5;
        let dt = 1e-3;
        let context = BoundaryContext { time: t0, delta_vx: 0.0 };

        let mut u = update.initial_state(|(x, _), s| {
            let erad = exact(x - 0.5, t0);
            let temperature = erad.powf(0.25);
            s[GAS_DENSITY] = rho;
            s[GAS_ENERGY] = update.physics.gas_energy(rho, temperature);
            s[RAD_ENERGY] = erad;
            s[X1_RAD_FLUX] = exact_flux(x - 0.5, t0);
        }, &context);

        let mut t = t0;

        while t < t1 - 1e-12 {
            let context = BoundaryContext { time: t, delta_vx: 0.0 };
            update.advance_timestep(&mut u, dt, SourceFields::default(), &context).unwrap();
            t += dt;
        }

        let mut l1_error = 0.0;
        let mut l1_norm = 0.0;

        for index in update.mesh.valid_space().iter() {
            let (x, _) = update.mesh.cell_center(index);
            let trad_exact = exact(x - 0.5, t).powf(0.25);
            let trad = u.get(index, RAD_ENERGY).powf(0.25);
            l1_error += (trad - trad_exact).abs();
            l1_norm += trad_exact;
        }
        assert!(l1_error / l1_norm < 4e-2, "relative L1 error in radiation temperature {:e}", l1_error / l1_norm);
    }

    #[test]
    fn free_streaming_beam_stays_causal() {
        let update = solver(0.0, (64, 1), BoundaryKind::Extrapolate);
        let context = BoundaryContext::default();
        let c = update.physics.constants.c_light;

        let mut u = update.initial_state(|(x, _), s| {
            let erad = 1e-2 + (-((x - 0.3) / 0.05).powi(2)).exp();
            s[GAS_DENSITY] = 1.0;
            s[GAS_ENERGY] = 1.0;
            s[RAD_ENERGY] = erad;
            s[X1_RAD_FLUX] = 0.99 * c * erad;
        }, &context);

        let peak = |u: &Patch| {
            update.mesh.valid_space().iter()
                .max_by(|a, b| u.get(*a, RAD_ENERGY).total_cmp(&u.get(*b, RAD_ENERGY)))
                .map(|(i, _)| i)
        };
        let start = peak(&u);
        let dt = update.compute_timestep();

        for _ in 0..40 {
            update.advance_transport(&mut u, dt, &context).unwrap();

            for index in update.mesh.valid_space().iter() {
                let s = u.get_slice(index);
                assert!(s[RAD_ENERGY] > 0.0);
                assert!(reduced_flux(s, c) <= 1.0 + 1e-12, "reduced flux {} at {:?}", reduced_flux(s, c), index);
            }
        }
        assert!(peak(&u) >= start.map(|i| i + 6));
    }

    #[test]
    fn periodic_transport_conserves_energy_and_flux() {
        let update = solver(0.0, (16, 16), BoundaryKind::Periodic);
        let context = BoundaryContext::default();

        let mut u = update.initial_state(|(x, y), s| {
            let r2 = (x - 0.5).powi(2) + (y - 0.4).powi(2);
            s[GAS_DENSITY] = 1.0;
            s[GAS_ENERGY] = 1.0;
            s[RAD_ENERGY] = 1.0 + (-r2 / 0.01).exp();
            s[X1_RAD_FLUX] = 0.2;
        }, &context);

        let e0 = update.total_radiation_energy(&u);
        let f0 = u.sum_field(update.mesh.valid_space(), X1_RAD_FLUX);
        let dt = update.compute_timestep();

        for _ in 0..10 {
            update.advance_transport(&mut u, dt, &context).unwrap();
        }
        let e1 = update.total_radiation_energy(&u);
        let f1 = u.sum_field(update.mesh.valid_space(), X1_RAD_FLUX);

        assert!(((e1 - e0) / e0).abs() < 1e-12);
        assert!(((f1 - f0) / f0).abs() < 1e-12);
        assert!(u.get((3, 3), RAD_ENERGY) > 0.0);
    }

    #[test]
    fn full_step_conserves_gas_plus_radiation_energy() {
        let update = solver(50.0, (32, 1), BoundaryKind::Periodic);
        let context = BoundaryContext::default();

        let mut u = update.initial_state(|(x, _), s| {
            s[GAS_DENSITY] = 1.0;
            s[GAS_ENERGY] = update.physics.gas_energy(1.0, 1.0 + 0.5 * (6.283 * x).sin());
            s[RAD_ENERGY] = 1.0;
        }, &context);

        let total = |u: &Patch| update.total_gas_energy(u) + update.total_radiation_energy(u);
        let before = total(&u);
        let dt = update.compute_timestep();

        for _ in 0..20 {
            let report = update.advance_timestep(&mut u, dt, SourceFields::default(), &context).unwrap();
            assert!(report.newton_iterations <= 200);
        }
        assert!(((total(&u) - before) / before).abs() < 1e-10);
    }

    #[test]
    fn fallback_uses_diffusive_fluxes_where_needed() {
        let valid = range2d(0..4, 0..1);
        let mut u = Patch::from_slice_function(valid.clone(), NUM_CONSERVED, |_, s| {
            s[GAS_DENSITY] = 1.0;
            s[RAD_ENERGY] = 1.0;
        });
        let faces = valid.extend_upper(1, Axis::I);
        let physical = Patch::from_slice_function(faces.clone(), NUM_HYPERBOLIC, |(i, _), f| {
            f[0] = if i == 3 { 10.0 } else { 0.0 };
        });
        let diffusive = Patch::zeros(NUM_HYPERBOLIC, faces);
        let fluxes = vec![(DirectionalFluxes { axis: Axis::I, physical, diffusive }, 1.0)];
        let base = |_: (i64, i64)| [1.0, 0.0, 0.0, 0.0];

        let count = conservative_update(&mut u, &valid, base, &fluxes, 1.0, 1.0, "stage 1").unwrap();
        assert_eq!(count, 1);
        assert_eq!(u.get((2, 0), RAD_ENERGY), 1.0);
        assert_eq!(u.get((3, 0), RAD_ENERGY), 11.0);
    }

    #[test]
    fn inadmissible_state_after_fallback_is_an_error() {
        let valid = range2d(0..4, 0..1);
        let mut u = Patch::from_slice_function(valid.clone(), NUM_CONSERVED, |_, s| {
            s[GAS_DENSITY] = 1.0;
            s[RAD_ENERGY] = 1.0;
        });
        let faces = valid.extend_upper(1, Axis::I);
        let physical = Patch::from_slice_function(faces, NUM_HYPERBOLIC, |(i, _), f| {
            f[0] = if i == 2 { 10.0 } else { 0.0 };
        });
        let diffusive = physical.clone();
        let fluxes = vec![(DirectionalFluxes { axis: Axis::I, physical, diffusive }, 1.0)];
        let base = |_: (i64, i64)| [1.0, 0.0, 0.0, 0.0];

        match conservative_update(&mut u, &valid, base, &fluxes, 1.0, 1.0, "stage 2") {
            Err(Error::InadmissibleState { stage, index, .. }) => {
                assert_eq!(stage, "stage 2");
                assert_eq!(index, (1, 0));
            }
            other => panic!("expected an inadmissible state, got {:?}", other),
        }
    }

    #[test]
    fn timestep_is_limited_by_the_reduced_light_speed() {
        let mut update = solver(1.0, (100, 1), BoundaryKind::Extrapolate);
        assert!((update.compute_timestep() - 0.3 * 0.01).abs() < 1e-15);

        update.physics.constants.c_hat = 0.1;
        assert!((update.compute_timestep() - 0.03).abs() < 1e-15);
    }

    #[test]
    fn tiny_meshes_and_bad_cfl_numbers_are_rejected() {
        let physics = GreyGas { constants: unit_constants(1.0), kappa: 1.0 };
        let mesh = Mesh { area: (0.0..1.0, 0.0..1.0), size: (2, 1) };
        assert!(RadiationUpdate::new(physics.clone(), Boundaries::uniform(BoundaryKind::Periodic), mesh, SolverConfig::default()).is_err());

        let mesh = Mesh { area: (0.0..1.0, 0.0..1.0), size: (10, 1) };
        let config = SolverConfig { cfl_number: 1.5, ..SolverConfig::default() };
        assert!(RadiationUpdate::new(physics, Boundaries::uniform(BoundaryKind::Periodic), mesh, config).is_err());
    }

    #[test]
    fn inconsistent_boundaries_are_rejected_before_the_first_fill() {
        let physics = GreyGas { constants: unit_constants(1.0), kappa: 1.0 };
        let mesh = Mesh { area: (0.0..1.0, 0.0..1.0), size: (10, 1) };

        let mut boundaries = Boundaries::uniform(BoundaryKind::Periodic);
        boundaries.upper_i = BoundaryKind::Reflecting;
        assert!(matches!(
            RadiationUpdate::new(physics.clone(), boundaries, mesh.clone(), SolverConfig::default()),
            Err(Error::Config(_))));

        let boundaries = Boundaries::uniform(BoundaryKind::Marshak { incident_energy: 0.0 });
        assert!(matches!(
            RadiationUpdate::new(physics, boundaries, mesh, SolverConfig::default()),
            Err(Error::Config(_))));
    }
}
