use serde::{Deserialize, Serialize};
use super::error::Error;




/**
 * Physical constants fixed for one problem instance. Defaults are CGS values
 * for an atomic-hydrogen gas with no reduction of the speed of light.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Speed of light `c`
    pub c_light: f64,
    /// Reduced speed of light `ĉ <= c` used for radiation transport
    pub c_hat: f64,
    /// Radiation constant `a_rad`
    pub radiation_constant: f64,
    /// Mean molecular mass `μ`
    pub mean_molecular_mass: f64,
    /// Boltzmann constant `k_B`
    pub boltzmann_constant: f64,
    /// Adiabatic index `γ`
    pub gamma: f64,
    /// Floor on the radiation energy density, for initial and boundary data
    pub erad_floor: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            c_light: 2.99792458e10,
            c_hat: 2.99792458e10,
            radiation_constant: 7.5657e-15,
            mean_molecular_mass: 1.67262192e-24,
            boltzmann_constant: 1.380649e-16,
            gamma: 5.0 / 3.0,
            erad_floor: 0.0,
        }
    }
}




// ============================================================================
impl PhysicalConstants {

    /**
     * Check that the constants describe an admissible problem.
     */
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("c_light", self.c_light),
            ("c_hat", self.c_hat),
            ("radiation_constant", self.radiation_constant),
            ("mean_molecular_mass", self.mean_molecular_mass),
            ("boltzmann_constant", self.boltzmann_constant),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::Config(format!("{} must be positive and finite (got {})", name, value)))
            }
        }
        if self.c_hat > self.c_light {
            return Err(Error::Config(format!(
                "reduced speed of light {} exceeds the speed of light {}", self.c_hat, self.c_light)))
        }
        if !(self.gamma > 1.0) {
            return Err(Error::Config(format!("adiabatic index must exceed 1 (got {})", self.gamma)))
        }
        if !(self.erad_floor >= 0.0) {
            return Err(Error::Config(format!("erad_floor must be non-negative (got {})", self.erad_floor)))
        }
        Ok(())
    }

    /**
     * Specific heat at constant volume (per unit mass) of the ideal gas,
     * `k_B / (μ (γ - 1))`.
     */
    pub fn specific_heat(&self) -> f64 {
        self.boltzmann_constant / (self.mean_molecular_mass * (self.gamma - 1.0))
    }

    /**
     * Ratio `c / ĉ` by which gas energy changes are amplified relative to
     * radiation energy changes in the reduced-speed-of-light system.
     */
    pub fn light_speed_ratio(&self) -> f64 {
        self.c_light / self.c_hat
    }
}




/**
 * The per-problem physics consumed by the radiation kernels: the constants,
 * the opacity and its temperature derivative, and the equation of state.
 * Implementors override the opacity (and optionally the EOS) for their
 * problem; the EOS methods default to an ideal gas with the specific heat
 * given by the constants.
 *
 * Kernels are generic over this trait so the opacity and EOS calls are
 * monomorphized into the per-cell loops.
 */
pub trait RadiationPhysics: Sync {

    fn constants(&self) -> &PhysicalConstants;

    /**
     * Opacity `κ(ρ, T)` per unit mass. Must be non-negative.
     */
    fn opacity(&self, rho: f64, temperature: f64) -> f64;

    /**
     * Temperature derivative of the opacity, `∂κ/∂T`.
     */
    fn opacity_derivative(&self, _rho: f64, _temperature: f64) -> f64 {
        0.0
    }

    /**
     * Gas temperature from the gas internal energy density.
     */
    fn gas_temperature(&self, rho: f64, egas: f64) -> f64 {
        egas / (rho * self.constants().specific_heat())
    }

    /**
     * Gas internal energy density from the gas temperature.
     */
    fn gas_energy(&self, rho: f64, temperature: f64) -> f64 {
        rho * self.constants().specific_heat() * temperature
    }

    /**
     * Volumetric heat capacity `∂Egas/∂T` at fixed density.
     */
    fn heat_capacity(&self, rho: f64, _temperature: f64) -> f64 {
        rho * self.constants().specific_heat()
    }
}




/**
 * An ideal gas with a constant grey opacity.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GreyGas {
    pub constants: PhysicalConstants,
    pub kappa: f64,
}

impl RadiationPhysics for GreyGas {
    fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    fn opacity(&self, _rho: f64, _temperature: f64) -> f64 {
        self.kappa
    }
}
