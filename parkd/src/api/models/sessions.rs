//! API types for vehicle sessions and camera events.

use crate::db::models::sessions::SessionDBResponse;
use crate::types::{SessionId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Reason recorded when a session is created by an entry event.
pub const REASON_ENTRY: &str = "entry";
/// Reason recorded when an exit event parks the session at the gate.
pub const REASON_AWAITING_PAYMENT: &str = "waiting";
/// Default settlement reason. Any other reason is treated as an
/// operator-authorized waiver and zeroes the fee.
pub const REASON_PAID: &str = "paid";

/// Lifecycle state of a vehicle session.
///
/// `inside` and `pending` are open states; a plate can have at most one
/// open session at a time (enforced by a partial unique index). `exited`
/// is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Vehicle entered, no exit event seen yet
    #[default]
    Inside,
    /// Exit event seen, fee computed, waiting for cashier confirmation
    Pending,
    /// Settled and gone
    Exited,
}

impl SessionStatus {
    /// Whether the session still occupies a spot (blocks a new entry for
    /// the same plate).
    pub fn is_open(&self) -> bool {
        matches!(self, SessionStatus::Inside | SessionStatus::Pending)
    }

    /// Whether an exit event may move this session to `pending`.
    pub fn can_exit(&self) -> bool {
        self.is_open()
    }

    /// Whether a cashier confirmation may move this session to `exited`.
    pub fn can_settle(&self) -> bool {
        !matches!(self, SessionStatus::Exited)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Inside => "inside",
            SessionStatus::Pending => "pending",
            SessionStatus::Exited => "exited",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inside" => Ok(SessionStatus::Inside),
            "pending" => Ok(SessionStatus::Pending),
            "exited" => Ok(SessionStatus::Exited),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// Resolve the fee recorded at settlement time.
///
/// The default "paid" reason keeps the computed fee; any other reason is
/// an explicit waiver and forces the fee to zero.
pub fn settlement_fee(reason: &str, computed_fee: Option<Decimal>) -> Decimal {
    if reason == REASON_PAID {
        computed_fee.unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Event payload pushed by the gate cameras.
///
/// Field names follow the camera vendor's JSON (`EventId`, `EventComment`
/// for the recognized plate, and so on) rather than our own conventions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CameraEvent {
    #[serde(rename = "EventId", default)]
    pub event_id: Option<String>,
    #[serde(rename = "EventDescription", default)]
    pub event_description: Option<String>,
    /// Recognized plate text
    #[serde(rename = "EventComment")]
    pub event_comment: String,
    /// Camera channel, e.g. "P4-6"; the prefix before '-' is the zone
    #[serde(rename = "ChannelName")]
    pub channel_name: String,
    /// Camera token, echoed back so the caller can open the right gate
    #[serde(rename = "ChannelId", default)]
    pub channel_id: Option<String>,
    #[serde(rename = "captured_time", default)]
    pub captured_time: Option<DateTime<Utc>>,
}

/// A vehicle session as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: SessionId,
    pub plate: String,
    pub park_zone: String,
    pub entered_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub duration_minutes: Option<i64>,
    #[schema(value_type = Option<f64>)]
    pub fee: Option<Decimal>,
    pub settled: bool,
    #[schema(value_type = Option<Uuid>)]
    pub cashier_id: Option<UserId>,
    pub reason: String,
    pub image_ref: String,
    pub camera_channel: Option<String>,
}

impl From<SessionDBResponse> for SessionResponse {
    fn from(db: SessionDBResponse) -> Self {
        Self {
            id: db.id,
            plate: db.plate,
            park_zone: db.park_zone,
            entered_at: db.entered_at,
            exited_at: db.exited_at,
            status: db.status,
            duration_minutes: db.duration_minutes,
            fee: db.fee,
            settled: db.settled,
            cashier_id: db.cashier_id,
            reason: db.reason,
            image_ref: db.image_ref,
            camera_channel: db.camera_channel,
        }
    }
}

/// Response to an entry event
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryResponse {
    pub message: String,
    pub session: SessionResponse,
}

/// Response to an exit event.
///
/// `open_gate` echoes the camera payload back so the gate controller can
/// be commanded to open once payment clears.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExitResponse {
    pub message: String,
    pub session: SessionResponse,
    pub open_gate: CameraEvent,
}

/// Cashier confirmation of a pending session
#[derive(Debug, Deserialize, ToSchema)]
pub struct SettlementRequest {
    /// Settlement reason; empty or omitted means regular payment, anything
    /// else waives the fee
    #[serde(default)]
    pub reason: Option<String>,
}

impl SettlementRequest {
    /// Normalize the reason: missing or blank means the default payment.
    pub fn reason(&self) -> &str {
        match self.reason.as_deref() {
            Some(r) if !r.trim().is_empty() => r,
            _ => REASON_PAID,
        }
    }
}

/// Query parameters for listing and searching sessions
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListSessionsQuery {
    /// Substring match on the plate
    pub plate: Option<String>,
    /// Sessions entered on this calendar day (YYYY-MM-DD)
    pub entered_on: Option<NaiveDate>,
    /// Sessions exited on this calendar day (YYYY-MM-DD)
    pub exited_on: Option<NaiveDate>,
    pub status: Option<SessionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Pending).unwrap(),
            "\"pending\""
        );
        let s: SessionStatus = serde_json::from_str("\"inside\"").unwrap();
        assert_eq!(s, SessionStatus::Inside);
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!(serde_json::from_str::<SessionStatus>("\"\"").is_err());
        assert!(serde_json::from_str::<SessionStatus>("\"gone\"").is_err());
    }

    #[test]
    fn test_open_states_block_new_entries() {
        assert!(SessionStatus::Inside.is_open());
        assert!(SessionStatus::Pending.is_open());
        assert!(!SessionStatus::Exited.is_open());
    }

    #[test]
    fn test_exited_is_terminal() {
        assert!(!SessionStatus::Exited.can_exit());
        assert!(!SessionStatus::Exited.can_settle());
    }

    #[test]
    fn test_pending_can_be_settled_but_also_re_exited() {
        // A second exit event for a pending session recomputes the fee
        // rather than failing.
        assert!(SessionStatus::Pending.can_exit());
        assert!(SessionStatus::Pending.can_settle());
    }

    #[test]
    fn test_settlement_fee_paid_keeps_computed() {
        let fee = Some(Decimal::from(3));
        assert_eq!(settlement_fee(REASON_PAID, fee), Decimal::from(3));
    }

    #[test]
    fn test_settlement_fee_other_reason_waives() {
        let fee = Some(Decimal::from(3));
        assert_eq!(settlement_fee("customer dispute", fee), Decimal::ZERO);
    }

    #[test]
    fn test_settlement_request_reason_defaults() {
        let req = SettlementRequest { reason: None };
        assert_eq!(req.reason(), REASON_PAID);

        let req = SettlementRequest {
            reason: Some("  ".into()),
        };
        assert_eq!(req.reason(), REASON_PAID);

        let req = SettlementRequest {
            reason: Some("waived".into()),
        };
        assert_eq!(req.reason(), "waived");
    }

    #[test]
    fn test_camera_event_uses_vendor_field_names() {
        let raw = r#"{
            "EventId": "evt-1",
            "EventComment": "BE5084AG",
            "ChannelName": "P4-6",
            "ChannelId": "8dc9685f-a80b-4d95-ae19-da340efe89ab"
        }"#;
        let event: CameraEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_comment, "BE5084AG");
        assert_eq!(event.channel_name, "P4-6");
        assert_eq!(
            event.channel_id.as_deref(),
            Some("8dc9685f-a80b-4d95-ae19-da340efe89ab")
        );
        assert!(event.captured_time.is_none());
    }
}
