use axum::extract::State;
use serde::Serialize;

use crate::api::response::ApiResponse;
use crate::api::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub ocr: OcrStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OcrStatus {
    pub status: String,
    pub languages: String,
    pub dpi: u16,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let ocr = OcrStatus {
        status: if state.ocr_available {
            "available".to_string()
        } else {
            "unavailable".to_string()
        },
        languages: state.config.ocr.languages.clone(),
        dpi: state.config.processing.dpi,
    };

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr,
    })
}
