use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use mergington::data::{ActivityMap, Message, ParticipantQuery};

use crate::services::{ActivityError, ActivityService};

/// Handler to list every activity with its participants
pub async fn list(
    State(state): State<Arc<crate::AppState>>,
) -> Result<Json<ActivityMap>, ActivityError> {
    Ok(Json(state.activities.list().await?))
}

/// Handler to sign a student up for an activity
pub async fn signup(
    State(state): State<Arc<crate::AppState>>,
    Path(activity_name): Path<String>,
    Query(query): Query<ParticipantQuery>,
) -> Result<Json<Message>, ActivityError> {
    let message = state.activities.signup(&activity_name, &query.email).await?;
    Ok(Json(message))
}

/// Handler to remove a student from an activity
pub async fn unregister(
    State(state): State<Arc<crate::AppState>>,
    Path(activity_name): Path<String>,
    Query(query): Query<ParticipantQuery>,
) -> Result<Json<Message>, ActivityError> {
    let message = state
        .activities
        .unregister(&activity_name, &query.email)
        .await?;
    Ok(Json(message))
}
