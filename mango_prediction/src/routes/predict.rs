use crate::{
    classification::Prediction,
    inference_service::{InferenceError, InferenceService},
    model_service::ModelService,
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::instrument;

const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("No file uploaded.")]
    MissingFile,
    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Unexpected extra `file` upload")]
    UnexpectedFile,
    #[error("{0}")]
    Inference(#[from] InferenceError),
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        match self {
            PredictError::MissingFile => {
                (StatusCode::BAD_REQUEST, "No file uploaded.").into_response()
            }
            err => {
                tracing::error!("Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[instrument(skip(inference_service, multipart))]
pub async fn predict<M: ModelService>(
    State(inference_service): State<InferenceService<M>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, PredictError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Request is not a multipart upload: {}", rejection);
        PredictError::MissingFile
    })?;

    let image_data = read_file_field(&mut multipart)
        .await?
        .ok_or(PredictError::MissingFile)?;

    let prediction = inference_service.predict(image_data).await?;

    Ok(Json(prediction))
}

/// Returns the `file` upload. Parts without a filename are form fields, not
/// uploads, and are skipped like any other field. A second upload is an error.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, PredictError> {
    let mut image_data = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) || field.file_name().is_none() {
            continue;
        }
        if image_data.is_some() {
            return Err(PredictError::UnexpectedFile);
        }

        tracing::debug!(
            "Received upload {:?} ({:?})",
            field.file_name(),
            field.content_type()
        );
        image_data = Some(field.bytes().await?.to_vec());
    }

    Ok(image_data)
}
