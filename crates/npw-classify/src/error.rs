use thiserror::Error;

use npw_core::{InfraType, PlanError};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("couldn't parse LoS table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("LoS table has no rule for {0}")]
    MissingRule(InfraType),

    #[error("LoS table has more than one rule for {0}")]
    DuplicateRule(InfraType),

    #[error("LoS rule for {0} has no speed bands")]
    NoBands(InfraType),

    #[error("LoS speed bands for {0} must be strictly ascending")]
    UnorderedBands(InfraType),
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;

impl From<ClassifyError> for PlanError {
    fn from(err: ClassifyError) -> Self {
        PlanError::Config(err.to_string())
    }
}
