//! Data transfer objects for HTTP message serialization.
//!
//! The request and success bodies of `/recommend` are the domain types
//! [`rujuk_core::PatientRecord`] and [`rujuk_core::RecommendationResult`].

use serde::Serialize;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
