//! HTTP route handlers for the triage server.

pub mod recommend;

use axum::Json;

use crate::dto::RootResponse;

const WELCOME_MESSAGE: &str = "Welcome to the RujukCerdas API. POST patient data (gender, age, symptoms) to /recommend to get a department suggestion.";

/// Health check endpoint. Succeeds whether or not the LLM client is up.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}
