use crate::{
    config::{Config, ServerConfig, Validatable},
    inference_service::InferenceService,
    labels::LabelSet,
    model_service::ModelService,
    ort_service::OrtModelService,
    routes::api_routes,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::InvalidHeaderValue, HeaderValue, Method},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<M: ModelService>(
        inference_service: InferenceService<M>,
        config: &ServerConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let router = build_router(inference_service, config)?;
        let listener = TcpListener::bind(config.get_address()).await?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            "Server running on http://{}",
            self.listener.local_addr()?
        );

        let shutdown = async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown")
        };

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

pub fn build_router<M: ModelService>(
    inference_service: InferenceService<M>,
    config: &ServerConfig,
) -> Result<Router, InvalidHeaderValue> {
    Ok(api_routes()
        .with_state(inference_service)
        .layer(DefaultBodyLimit::max(config.get_body_limit_bytes()))
        .layer(cors_layer(&config.allowed_origins)?)
        .layer(TraceLayer::new_for_http()))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    if allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let labels = LabelSet::load(&config.labels.get_path())?;
    let ort_model_service = OrtModelService::new(&config.model)?;
    let inference_service =
        InferenceService::new(ort_model_service, labels, config.model.image_size);

    let http_server = HttpServer::new(inference_service, &config.server).await?;
    http_server.run().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
