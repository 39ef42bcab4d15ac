//! Camera event ingestion: vehicle entry and exit.
//!
//! These endpoints are called by the gate cameras with the vendor's JSON
//! payload. The recognized plate arrives in `EventComment` and the zone is
//! the channel name prefix before '-'.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        cameras::CameraDirection,
        sessions::{
            CameraEvent, EntryResponse, ExitResponse, REASON_AWAITING_PAYMENT, REASON_ENTRY,
            SessionResponse,
        },
    },
    db::{
        handlers::{Cameras, Sessions},
        models::sessions::{SessionCreateDBRequest, SessionExitDBRequest},
    },
    errors::Error,
    fees,
    notifications::ParkEvent,
    types::zone_from_channel,
};

/// Pull the plate and zone out of a camera payload, rejecting junk events.
fn validate_event(event: &CameraEvent) -> Result<(String, String), Error> {
    let plate = event.event_comment.trim();
    if plate.is_empty() {
        return Err(Error::BadRequest {
            message: "Camera event carries no plate".to_string(),
        });
    }

    let zone = zone_from_channel(&event.channel_name).ok_or_else(|| Error::BadRequest {
        message: format!("Invalid camera channel name: {:?}", event.channel_name),
    })?;

    Ok((plate.to_string(), zone.to_string()))
}

/// Check the event against the camera registry. Unknown channels, token
/// mismatches and events from a camera facing the wrong way are rejected.
async fn authorize_camera(
    conn: &mut sqlx::PgConnection,
    event: &CameraEvent,
    direction: CameraDirection,
) -> Result<(), Error> {
    let mut cameras = Cameras::new(conn);
    let camera = cameras
        .get_by_channel_name(&event.channel_name)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some(format!("Unknown camera channel: {}", event.channel_name)),
        })?;

    if let Some(token) = &event.channel_id {
        if token != &camera.channel_token {
            return Err(Error::Unauthenticated {
                message: Some("Camera token mismatch".to_string()),
            });
        }
    }

    if camera.direction != direction {
        return Err(Error::Unauthenticated {
            message: Some(format!(
                "Camera {} is not registered for {direction} events",
                event.channel_name
            )),
        });
    }

    Ok(())
}

/// Record a vehicle entering the lot
#[utoipa::path(
    post,
    path = "/camera/events/entry",
    request_body = CameraEvent,
    tag = "camera",
    responses(
        (status = 201, description = "Entry recorded", body = EntryResponse),
        (status = 400, description = "Vehicle is already inside or pending exit"),
        (status = 401, description = "Unknown camera"),
    )
)]
#[tracing::instrument(skip_all, fields(channel = %event.channel_name))]
pub async fn vehicle_entry(
    State(state): State<AppState>,
    Json(event): Json<CameraEvent>,
) -> Result<(axum::http::StatusCode, Json<EntryResponse>), Error> {
    let (plate, zone) = validate_event(&event)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    authorize_camera(&mut tx, &event, CameraDirection::Entry).await?;

    let mut sessions = Sessions::new(&mut tx);
    if sessions.find_open_by_plate(&plate).await?.is_some() {
        return Err(Error::BadRequest {
            message: "Vehicle is already inside or pending exit".to_string(),
        });
    }

    let session = sessions
        .create_entry(&SessionCreateDBRequest {
            plate: plate.clone(),
            park_zone: zone,
            image_ref: state.config.default_image_ref.clone(),
            reason: REASON_ENTRY.to_string(),
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    state.notifier.publish(ParkEvent::Refresh);

    tracing::info!(%plate, session_id = session.id, "vehicle entered");

    Ok((
        axum::http::StatusCode::CREATED,
        Json(EntryResponse {
            message: "Vehicle entry recorded".to_string(),
            session: SessionResponse::from(session),
        }),
    ))
}

/// Record a vehicle reaching an exit gate.
///
/// Computes the parking duration and fee, moves the session to `pending`,
/// and echoes the camera payload back as the gate-open command.
#[utoipa::path(
    put,
    path = "/camera/events/exit",
    request_body = CameraEvent,
    tag = "camera",
    responses(
        (status = 200, description = "Exit recorded, awaiting payment", body = ExitResponse),
        (status = 400, description = "Vehicle already exited or wrong zone"),
        (status = 401, description = "Unknown camera"),
        (status = 404, description = "No session for this plate"),
    )
)]
#[tracing::instrument(skip_all, fields(channel = %event.channel_name))]
pub async fn vehicle_exit(
    State(state): State<AppState>,
    Json(event): Json<CameraEvent>,
) -> Result<Json<ExitResponse>, Error> {
    let (plate, zone) = validate_event(&event)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    authorize_camera(&mut tx, &event, CameraDirection::Exit).await?;

    let mut sessions = Sessions::new(&mut tx);
    let current = sessions
        .lock_latest_by_plate(&plate)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "vehicle session".to_string(),
            id: plate.clone(),
        })?;

    if !current.status.can_exit() {
        return Err(Error::BadRequest {
            message: "Vehicle already exited".to_string(),
        });
    }

    if current.park_zone != zone {
        return Err(Error::BadRequest {
            message: format!(
                "Vehicle entered zone {} but is exiting through zone {zone}",
                current.park_zone
            ),
        });
    }

    let now = Utc::now();
    let duration_minutes = (now - current.entered_at).num_minutes();
    let fee = fees::fee_for_exit(duration_minutes, state.vip.is_vip(&plate));

    let session = sessions
        .apply_exit(
            current.id,
            current.version,
            &SessionExitDBRequest {
                exited_at: now,
                duration_minutes,
                fee,
                reason: REASON_AWAITING_PAYMENT.to_string(),
                camera_channel: event.channel_name.clone(),
                camera_token: event.channel_id.clone(),
            },
        )
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let session = SessionResponse::from(session);
    state.notifier.publish(ParkEvent::VehiclePending {
        session: session.clone(),
    });

    tracing::info!(%plate, session_id = session.id, %fee, duration_minutes, "vehicle at exit gate");

    Ok(Json(ExitResponse {
        message: "Vehicle exit recorded, awaiting payment".to_string(),
        session,
        open_gate: event,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Repository, models::cameras::CameraCreateDBRequest};
    use axum::http::StatusCode;
    use sqlx::PgPool;

    fn event(channel: &str, token: Option<&str>) -> CameraEvent {
        CameraEvent {
            event_id: Some("32".to_string()),
            event_description: Some("Vehicle detection".to_string()),
            event_comment: "BE5084AG".to_string(),
            channel_name: channel.to_string(),
            channel_id: token.map(str::to_string),
            captured_time: None,
        }
    }

    async fn register_camera(pool: &PgPool, channel: &str, direction: CameraDirection) {
        let mut conn = pool.acquire().await.unwrap();
        Cameras::new(&mut conn)
            .create(&CameraCreateDBRequest {
                channel_name: channel.to_string(),
                channel_token: "tok".to_string(),
                direction,
            })
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn test_unknown_channel_is_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let err = authorize_camera(&mut conn, &event("P9-1", None), CameraDirection::Entry)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_entry_camera_cannot_post_exit_events(pool: PgPool) {
        register_camera(&pool, "P4-1", CameraDirection::Entry).await;
        let mut conn = pool.acquire().await.unwrap();

        let ev = event("P4-1", None);
        assert!(
            authorize_camera(&mut conn, &ev, CameraDirection::Entry)
                .await
                .is_ok()
        );

        let err = authorize_camera(&mut conn, &ev, CameraDirection::Exit)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_token_mismatch_is_rejected(pool: PgPool) {
        register_camera(&pool, "P4-2", CameraDirection::Exit).await;
        let mut conn = pool.acquire().await.unwrap();

        let err = authorize_camera(&mut conn, &event("P4-2", Some("wrong")), CameraDirection::Exit)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        assert!(
            authorize_camera(&mut conn, &event("P4-2", Some("tok")), CameraDirection::Exit)
                .await
                .is_ok()
        );
    }
}
