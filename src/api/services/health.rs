use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, trace};

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: i64,
    pub data: DataHealth,
    pub response_time_ms: u32,
}

#[derive(Debug, Serialize)]
pub struct DataHealth {
    pub file: String,
    pub rows: usize,
    pub newest_term: Option<String>,
    pub loaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct HealthService;

impl HealthService {
    /// The server stays up without a data file but reports itself degraded.
    pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        // 可能触发重新加载，放到阻塞线程池
        let data_state = state.clone();
        let snapshot = match web::block(move || data_state.data.snapshot()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Health check could not read the course table: {}", e);
                return HttpResponse::InternalServerError().finish();
            }
        };
        let healthy = snapshot.error.is_none();
        let now = chrono::Utc::now();

        let body = HealthResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime: (now - state.started).num_seconds().max(0),
            data: DataHealth {
                file: state.data.path().display().to_string(),
                rows: snapshot.rows.len(),
                newest_term: snapshot.newest_term().map(|s| s.term.clone()),
                loaded_at: snapshot.loaded_at.to_rfc3339(),
                error: snapshot.error.clone(),
            },
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        info!(
            "Health check completed in {:?}, status: {}, rows: {}",
            start_time.elapsed(),
            body.status,
            body.data.rows
        );

        let status = if healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        HttpResponse::build(status).json(body)
    }
}
