use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Session mutex poisoned: {0}")]
    SessionPoisoned(String),
    #[error("Failed to build tensor: {0}")]
    Tensor(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Failed to extract tensor: {0}")]
    Extract(String),
    #[error("Model returned an empty output")]
    EmptyOutput,
}

/// A loaded classifier. Implementations are shared read-only across requests.
pub trait ModelService: Send + Sync + 'static {
    /// Runs one forward pass on a `[1, H, W, 3]` batch and returns the class
    /// probabilities of its single element.
    fn forward(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, ModelError>;
}
