mod classification;
mod inference_service;
mod labels;
mod model_service;
mod ort_service;
mod preprocess;
mod routes;
mod server;

pub mod config;

pub use server::start_server;
