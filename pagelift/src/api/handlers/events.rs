use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::info;

use crate::api::response::ApiResponse;
use crate::api::state::AppState;
use crate::error::Result;
use crate::models::{ProcessingOutcome, StorageObjectData};

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `POST /`
///
/// Accepts a storage CloudEvent in binary or structured mode and processes the
/// referenced document before answering. Processing failures are reported in
/// the body with status 200 so the event source does not redeliver.
pub async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<ProcessingOutcome>> {
    info!(
        event_id = header(&headers, "ce-id").unwrap_or("-"),
        event_type = header(&headers, "ce-type").unwrap_or("-"),
        "Received storage event"
    );

    let document = StorageObjectData::from_event_body(&body)?.into_document()?;
    let outcome = state.pipeline.process_document(&document).await;

    Ok(ApiResponse::success(outcome))
}
