use actix_web::{web, HttpResponse};
use endpoint_relay_dispatch::run_action;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize, Serialize)]
pub struct DispatchRequest {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub status: String,
    pub endpoint_status: u16,
    pub body: String,
}

pub async fn dispatch_handler(
    state: web::Data<AppState>,
    payload: web::Json<DispatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = run_action(state.collaborators(), state.config_name(), &payload.id)
        .await
        .inspect_err(|_| {
            counter!("api_dispatch_requests_total", "status" => "error").increment(1);
        })?;

    counter!("api_dispatch_requests_total", "status" => "success").increment(1);
    Ok(HttpResponse::Ok().json(DispatchResponse {
        status: "success".to_string(),
        endpoint_status: response.status,
        body: response.body,
    }))
}
