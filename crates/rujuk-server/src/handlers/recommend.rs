//! Department recommendation handler.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use rujuk_core::{PatientRecord, RecommendationResult, TriageError};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Validates the patient record and asks the pipeline for a department.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<RecommendationResult>, AppError> {
    let Json(record) = payload.inspect_err(|rejection| {
        warn!("Rejected recommendation request: {}", rejection.body_text());
    })?;

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        age = record.age,
        symptoms = record.symptoms.len(),
        "Recommendation requested"
    );

    match state.recommender.recommend(&record).await {
        Ok(result) => Ok(Json(result)),
        Err(e @ TriageError::InvalidInput(_)) => {
            warn!(%request_id, "Rejected recommendation request: {}", e);
            Err(e.into())
        }
        Err(e) => {
            error!(%request_id, "An error occurred while processing the request: {}", e);
            Err(e.into())
        }
    }
}
