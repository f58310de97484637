use chrono::{DateTime, Utc};
use storage::{
    ContestStore,
    dto::{
        common::{PageWindow, PaginatedResponse},
        participant::{ParticipantFilter, ParticipantResponse, SubmitApplicationRequest},
    },
    models::{Participant, ParticipantStatus, StatusChange},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::middleware::auth::AuthUser;

/// Submit a new `pending` application for the caller
pub async fn submit_application(
    store: &dyn ContestStore,
    user: &AuthUser,
    request: &SubmitApplicationRequest,
) -> WebResult<Participant> {
    let participant = store
        .create_participant(user.id, &request.application_data())
        .await?;

    tracing::info!(
        participant_id = %participant.participant_id,
        user_id = %user.id,
        "Application submitted"
    );

    Ok(participant)
}

/// List live participants, optionally filtered by status
pub async fn list_participants(
    store: &dyn ContestStore,
    filter: &ParticipantFilter,
) -> WebResult<PaginatedResponse<ParticipantResponse>> {
    let status = filter
        .status
        .as_deref()
        .map(|s| s.parse::<ParticipantStatus>())
        .transpose()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let window = PageWindow::new(filter.page, filter.page_size).map_err(WebError::BadRequest)?;

    let participants = store
        .list_participants(status, window.limit(), window.offset())
        .await?;
    let total = store.count_participants(status).await?;

    let data = participants
        .into_iter()
        .map(ParticipantResponse::from)
        .collect();

    Ok(PaginatedResponse::new(data, window, total))
}

pub async fn get_participant(store: &dyn ContestStore, id: Uuid) -> WebResult<Participant> {
    Ok(store.find_participant(id).await?)
}

/// Apply an admin moderation decision (`approve` or `reject`)
pub async fn moderate(
    store: &dyn ContestStore,
    admin: &AuthUser,
    id: Uuid,
    target: ParticipantStatus,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> WebResult<Participant> {
    admin.require_admin()?;

    let participant = store.find_participant(id).await?;
    let current = participant.status()?;

    if !current.admin_can_move_to(target) {
        return Err(WebError::Conflict(format!(
            "Cannot move participant from '{}' to '{}'",
            current, target
        )));
    }

    let mut change = StatusChange::new(current, target, now).by(admin.id);
    if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
        change = change.reason(reason);
    }

    let updated = store.change_status(id, current, target, &change).await?;

    tracing::info!(
        participant_id = %id,
        admin_id = %admin.id,
        from = %current,
        to = %target,
        "Participant moderated"
    );

    Ok(updated)
}

pub async fn delete_participant(
    store: &dyn ContestStore,
    admin: &AuthUser,
    id: Uuid,
) -> WebResult<()> {
    admin.require_admin()?;
    store.soft_delete_participant(id).await?;

    tracing::info!(participant_id = %id, admin_id = %admin.id, "Participant soft-deleted");

    Ok(())
}
