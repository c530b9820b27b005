use std::sync::Arc;

use axum::{Json, extract::State};
use mergington::data::{HealthResponse, HealthStatus, RegistryInfo, UptimeInfo};
use mergington::log;

fn uptime_seconds(started_at: chrono::DateTime<chrono::Utc>) -> i64 {
    (chrono::Utc::now() - started_at).num_seconds()
}

fn human_readable_uptime(uptime_seconds: i64) -> String {
    let days = uptime_seconds / 86400;
    let hours = (uptime_seconds % 86400) / 3600;
    let minutes = (uptime_seconds % 3600) / 60;
    let secs = uptime_seconds % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {secs}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

pub async fn get(State(state): State<Arc<crate::AppState>>) -> Json<HealthResponse> {
    let seconds = uptime_seconds(state.started_at);

    let health_response = HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: chrono::Utc::now().to_rfc3339(),
        started_at: state.started_at.to_rfc3339(),
        uptime: UptimeInfo {
            seconds,
            human: human_readable_uptime(seconds),
        },
        registry: RegistryInfo {
            activities: state.activities.activity_count(),
            participants: state.activities.participant_count(),
        },
    };

    log::debug!("Health check: {:?}", health_response);

    Json(health_response)
}
