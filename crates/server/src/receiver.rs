//! Inbound event entry point.
//!
//! One route, `POST /`, receives an enrollment event and replies with the
//! `enroll-response` event. Stages, in order: parse the envelope, parse
//! the enroll request from the payload bytes, dispatch the face work,
//! publish the derived insert event, build the reply. Any failure aborts
//! the chain -- the reply event is only built after the insert succeeded,
//! so a partial failure can never report `OK`.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use enrolld_core::{EnrollRequest, EnrollResponse, InsertRequest};
use enrolld_events::{Envelope, Event, TYPE_ENROLL_RESPONSE};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(receive))
}

/// POST / -- handle one enrollment event.
async fn receive(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Event>> {
    let envelope = Envelope::parse(&body)?;
    let request: EnrollRequest = envelope.open()?;

    tracing::info!(
        id = %request.id,
        image_bytes = request.face.len(),
        has_coordinates = request.face_coordinates.is_some(),
        "Enrollment request received"
    );

    let embedding = state
        .dispatcher
        .dispatch(request.id.clone(), request.face, request.face_coordinates)
        .await?;

    let insert = InsertRequest {
        id: request.id.clone(),
        embeddings: embedding.encode_base64(),
    };
    state.publisher.publish(&insert).await?;

    let response = EnrollResponse::enrolled(&request.id);
    let reply = Event::new(TYPE_ENROLL_RESPONSE).with_data(&Envelope::wrap(&response)?)?;

    tracing::info!(id = %request.id, "Enrollment completed");
    Ok(Json(reply))
}
