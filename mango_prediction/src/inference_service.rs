use crate::{
    classification::{classify, ClassificationError, Prediction},
    labels::LabelSet,
    model_service::{ModelError, ModelService},
    preprocess::{image_to_tensor, PreprocessError},
};
use std::{sync::Arc, time::Instant};
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Image transformation error: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),
    #[error("Inference task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Immutable per-process context: the loaded model and its label manifest.
pub struct InferenceService<M: ModelService> {
    model_service: Arc<M>,
    labels: Arc<LabelSet>,
    image_size: u32,
}

impl<M: ModelService> Clone for InferenceService<M> {
    fn clone(&self) -> Self {
        Self {
            model_service: self.model_service.clone(),
            labels: self.labels.clone(),
            image_size: self.image_size,
        }
    }
}

impl<M: ModelService> InferenceService<M> {
    pub fn new(model_service: M, labels: LabelSet, image_size: u32) -> Self {
        Self {
            model_service: Arc::new(model_service),
            labels: Arc::new(labels),
            image_size,
        }
    }

    #[instrument(skip(self, image_data), fields(bytes = image_data.len()))]
    pub async fn predict(&self, image_data: Vec<u8>) -> Result<Prediction, InferenceError> {
        let model_service = self.model_service.clone();
        let labels = self.labels.clone();
        let image_size = self.image_size;

        let prediction = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let input = image_to_tensor(&image_data, image_size)?;
            let probabilities = model_service.forward(&input)?;
            let prediction = classify(&probabilities, &labels)?;
            tracing::debug!(
                "Predicted {} ({}%) in {} ms",
                prediction.class,
                prediction.confidence,
                started.elapsed().as_millis()
            );
            Ok::<_, InferenceError>(prediction)
        })
        .await??;

        Ok(prediction)
    }
}
