use axum::http::{Method, Uri};
use service_core::error::AppError;

pub async fn unknown_endpoint(method: Method, uri: Uri) -> AppError {
    AppError::UnknownEndpoint(format!("{} {}", method, uri.path()))
}
