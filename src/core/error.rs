use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("job sleep interrupted")]
    Interrupted,
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal setup failed: {message}")]
    Terminal { message: String },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}
