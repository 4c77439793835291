/**
 * The per-cell Newton-Raphson matter-radiation exchange failed to reach its
 * residual tolerance within the iteration cap.
 */
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("matter-radiation coupling did not converge in cell ({}, {}) after {iterations} iterations: \
    residual {residual:.4e} (Egas = {egas:.4e}, Erad = {erad:.4e})", .index.0, .index.1)]
pub struct ConvergenceError {
    pub index: (i64, i64),
    pub iterations: usize,
    pub residual: f64,
    pub egas: f64,
    pub erad: f64,
}




/**
 * Errors surfaced by the radiation kernels. Recoverable local failures (an
 * inadmissible reconstructed state, an inadmissible prediction that the
 * diffusive flux repairs) never reach this type.
 */
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),

    #[error("inadmissible radiation state in cell ({}, {}) after {stage}: Erad = {erad:.4e}, |F|/cE = {reduced_flux:.4}",
        .index.0, .index.1)]
    InadmissibleState {
        stage: &'static str,
        index: (i64, i64),
        erad: f64,
        reduced_flux: f64,
    },

    #[error("non-positive energy in cell ({}, {}) after coupling: Egas = {egas:.4e}, Erad = {erad:.4e}",
        .index.0, .index.1)]
    NonPositiveEnergy {
        index: (i64, i64),
        egas: f64,
        erad: f64,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
