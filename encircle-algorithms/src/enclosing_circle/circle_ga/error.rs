use rand::distributions::WeightedError;

/// Errors raised while configuring or running the circle optimizer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("InvalidConfiguration: {0}")]
    InvalidConfiguration(String),
    #[error("SelectionError: {0}")]
    Selection(#[from] WeightedError),
    #[error("FitnessMismatch: {fitness} fitness scores for {population} candidates")]
    FitnessMismatch { population: usize, fitness: usize },
}
