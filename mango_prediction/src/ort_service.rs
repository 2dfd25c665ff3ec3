use crate::{
    config::{ModelConfig, Validatable},
    model_service::{ModelError, ModelService},
};
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

#[derive(Clone)]
pub struct OrtModelService {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
    output_name: String,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> Result<Self, Box<dyn std::error::Error>> {
        ort::init().with_name("mango_prediction").commit()?;

        let num_instances = model_config.num_instances.max(1);
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(model_config.get_path())?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        let output_name = {
            let session = sessions[0]
                .lock()
                .map_err(|e| ModelError::SessionPoisoned(e.to_string()))?;
            session
                .outputs
                .first()
                .map(|output| output.name.clone())
                .ok_or(ModelError::EmptyOutput)?
        };

        tracing::info!(
            "Created {} ONNX sessions from {:?}, reading output `{}`",
            num_instances,
            model_config.get_path(),
            output_name
        );

        Ok(Self {
            sessions: Arc::new(sessions),
            counter: Arc::new(AtomicUsize::new(0)),
            output_name,
        })
    }
}

impl ModelService for OrtModelService {
    fn forward(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, ModelError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| ModelError::SessionPoisoned(e.to_string()))?;

        tracing::debug!("Handling request with session {}", index);
        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| ModelError::Tensor(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Extract(e.to_string()))?;

        tracing::debug!("Model output shape {:?}", shape);
        if data.is_empty() {
            return Err(ModelError::EmptyOutput);
        }

        Ok(data.to_vec())
    }
}
