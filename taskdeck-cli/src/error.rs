use taskdeck_core::error::TodoError;
use taskdeck_core::validation::ValidationError;
use taskdeck_store::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("Invalid identifier '{id}': {source}")]
    InvalidId {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("Nothing to change: pass --text and/or --category")]
    NothingToEdit,
}
