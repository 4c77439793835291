use clap::Parser;
use log::{info, LevelFilter};
use radgrid::boundary::{Boundaries, BoundaryContext, BoundaryKind};
use radgrid::patch::Patch;
use radgrid::radiation::coupling::SourceFields;
use radgrid::radiation::state::*;
use radgrid::radiation::{GreyGas, PhysicalConstants, RadiationPhysics};
use radgrid::reconstruct::Reconstruction;
use radgrid::solvers::rad_rk2::{Mesh, RadiationUpdate, SolverConfig};




/**
 * Gaussian radiation pulse spreading in an optically thick, static medium
 */
#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(short = 'n', long, default_value = "100")]
    resolution: i64,

    #[clap(short = 'k', long, default_value = "1000.0")]
    kappa: f64,

    #[clap(short = 'e', long, default_value = "0.5")]
    end_time: f64,

    #[clap(short = 'r', long, default_value = "ppm")]
    reconstruction: Reconstruction,

    #[clap(short = 't', long, default_value = "0")]
    num_threads: usize,

    #[clap(short = 'o', long, default_value = "pulse.cbor")]
    output: String,

    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}




#[derive(serde::Serialize)]


/**
 * The simulation solution state
 */
struct State {
    iteration: u64,
    time: f64,
    mesh: Mesh,
    config: SolverConfig,
    conserved: Patch,
    exact_rad_energy: Vec<f64>,
}




const SIGMA: f64 = 0.025;
const BACKGROUND: f64 = 1e-4;
const START_TIME: f64 = 0.01;




fn exact_rad_energy(x: f64, t: f64, diffusion: f64) -> f64 {
    let width_sq = SIGMA * SIGMA + diffusion * t;
    let normfac = 1.0 / (2.0 * (std::f64::consts::PI * width_sq).sqrt());
    normfac * (-(x * x) / (4.0 * width_sq)).exp() + BACKGROUND
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    simple_logger::SimpleLogger::new().with_level(opts.log_level).init()?;
    info!("{:?}", opts);

    if opts.num_threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(opts.num_threads).build_global()?;
    }

    let constants = PhysicalConstants {
        c_light: 1.0,
        c_hat: 1.0,
        radiation_constant: 1.0,
        mean_molecular_mass: 1.0,
        boltzmann_constant: 1e-3,
        gamma: 5.0 / 3.0,
        erad_floor: BACKGROUND,
    };
    let rho = 1.0;
    let diffusion = constants.c_light / (3.0 * opts.kappa * rho);
    let physics = GreyGas { constants, kappa: opts.kappa };
    let mesh = Mesh { area: (0.0..1.0, 0.0..1.0), size: (opts.resolution, 1) };
    let config = SolverConfig { reconstruction: opts.reconstruction, ..SolverConfig::default() };
    let update = RadiationUpdate::new(physics, Boundaries::uniform(BoundaryKind::Reflecting), mesh, config)?;

    let mut context = BoundaryContext { time: START_TIME, delta_vx: 0.0 };
    let mut conserved = update.initial_state(|(x, _), s| {
        let erad = exact_rad_energy(x - 0.5, START_TIME, diffusion);
        let width_sq = SIGMA * SIGMA + diffusion * START_TIME;
        s[GAS_DENSITY] = rho;
        s[GAS_ENERGY] = update.physics.gas_energy(rho, erad.powf(0.25));
        s[RAD_ENERGY] = erad;
        s[X1_RAD_FLUX] = diffusion * (x - 0.5) / (2.0 * width_sq) * (erad - BACKGROUND);
    }, &context);

    let dt = update.compute_timestep().min(1e-3);
    let e0 = update.total_radiation_energy(&conserved) + update.total_gas_energy(&conserved);
    let mut iteration = 0;

    while context.time < opts.end_time {
        let start = std::time::Instant::now();
        let report = update.advance_timestep(&mut conserved, dt, SourceFields::default(), &context)?;
        context.time += dt;
        iteration += 1;

        if iteration % 50 == 0 {
            info!("[{:05}] t={:.4} fallbacks={}/{} newton={} Mzps={:.3}",
                iteration,
                context.time,
                report.stage1_fallbacks,
                report.stage2_fallbacks,
                report.newton_iterations,
                update.mesh.total_zones() as f64 / start.elapsed().as_secs_f64() * 1e-6);
        }
    }

    let e1 = update.total_radiation_energy(&conserved) + update.total_gas_energy(&conserved);
    info!("relative change in total energy: {:.3e}", (e1 - e0) / e0);

    let exact: Vec<_> = update.mesh.valid_space().iter()
        .map(|index| exact_rad_energy(update.mesh.cell_center(index).0 - 0.5, context.time, diffusion))
        .collect();
    let a_rad = update.physics.constants.radiation_constant;
    let rad_temperature = |erad: f64| (erad / a_rad).powf(0.25);
    let l1_error: f64 = update.mesh.valid_space().iter().zip(&exact)
        .map(|(index, e)| (rad_temperature(conserved.get(index, RAD_ENERGY)) - rad_temperature(*e)).abs())
        .sum();
    let l1_norm: f64 = exact.iter().map(|e| rad_temperature(*e)).sum();
    info!("relative L1 error in radiation temperature: {:.3e}", l1_error / l1_norm);

    let state = State {
        iteration,
        time: context.time,
        mesh: update.mesh.clone(),
        config: update.config.clone(),
        conserved,
        exact_rad_energy: exact,
    };
    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&state, &mut buffer).map_err(|e| format!("{:?}", e))?;
    info!("wrote {}", opts.output);

    Ok(())
}
