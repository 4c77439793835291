use clap::Parser;
use log::{info, LevelFilter};
use radgrid::index_space::range2d;
use radgrid::patch::Patch;
use radgrid::radiation::coupling::{add_source_terms, explicit_source_terms, SourceFields};
use radgrid::radiation::state::*;
use radgrid::radiation::{GreyGas, PhysicalConstants, RadiationPhysics};




/**
 * Relaxation of gas and radiation to thermal equilibrium in a uniform,
 * static medium
 */
#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(long, default_value = "1e-7")]
    density: f64,

    #[clap(long, default_value = "1.0")]
    kappa: f64,

    #[clap(long, default_value = "1e3")]
    gas_temperature: f64,

    #[clap(long, default_value = "1e12")]
    rad_energy: f64,

    #[clap(long, default_value = "1e-8")]
    dt: f64,

    #[clap(short = 'e', long, default_value = "1e-4")]
    end_time: f64,

    #[clap(short = 'o', long, default_value = "coupling.cbor")]
    output: String,

    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}




#[derive(serde::Serialize)]
struct Sample {
    time: f64,
    gas_temperature: f64,
    rad_temperature: f64,
    total_energy: f64,
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    simple_logger::SimpleLogger::new().with_level(opts.log_level).init()?;
    info!("{:?}", opts);

    let gas = GreyGas { constants: PhysicalConstants::default(), kappa: opts.kappa };
    gas.constants.validate()?;

    let a_rad = gas.constants.radiation_constant;
    let rho = opts.density;
    let egas = gas.gas_energy(rho, opts.gas_temperature);
    let cells = range2d(0..1, 0..1);
    let mut cons = Patch::from_slice_function(cells.clone(), NUM_CONSERVED, |_, u| {
        u[GAS_DENSITY] = rho;
        u[GAS_ENERGY] = egas;
        u[RAD_ENERGY] = opts.rad_energy;
    });

    let initial = explicit_source_terms(&gas, cons.get_slice((0, 0)), opts.dt);
    info!("explicit radiation energy change over one step: {:.4e} (of {:.4e})", initial.energy, opts.rad_energy);

    let sample = |time: f64, u: &[f64]| Sample {
        time,
        gas_temperature: gas.gas_temperature(rho, internal_energy(u)),
        rad_temperature: (u[RAD_ENERGY] / a_rad).powf(0.25),
        total_energy: u[GAS_ENERGY] + gas.constants.light_speed_ratio() * u[RAD_ENERGY],
    };
    let mut samples = vec![sample(0.0, cons.get_slice((0, 0)))];
    let mut time = 0.0;

    while time < opts.end_time {
        let iterations = add_source_terms(&gas, &mut cons, &cells, SourceFields::default(), opts.dt)?;
        time += opts.dt;

        let s = sample(time, cons.get_slice((0, 0)));
        info!("t={:.4e} Tgas={:.4e} Trad={:.4e} Etot={:.6e} newton={}",
            s.time,
            s.gas_temperature,
            s.rad_temperature,
            s.total_energy,
            iterations);
        samples.push(s);
    }

    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&samples, &mut buffer).map_err(|e| format!("{:?}", e))?;
    info!("wrote {}", opts.output);

    Ok(())
}
