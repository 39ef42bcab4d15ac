//! Common type definitions shared across the crate.
//!
//! This module defines:
//! - Type aliases for entity IDs ([`UserId`], [`SessionId`], etc.)
//! - Park-zone parsing helpers for camera channel names
//!
//! # ID Types
//!
//! User accounts are identified by UUIDs; the high-churn operational tables
//! (vehicle sessions, shifts, tariffs, cameras) use bigserial IDs.

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type SessionId = i64;
pub type ShiftId = i64;
pub type TariffId = i64;
pub type CameraId = i64;

/// Extract the park zone from a camera channel name.
///
/// Channel names encode the zone as the prefix before the dash, e.g.
/// `"P4-6"` is camera 6 in zone `"P4"`. Returns `None` for names with an
/// empty zone prefix so misconfigured cameras fail validation instead of
/// matching every session.
pub fn zone_from_channel(channel: &str) -> Option<&str> {
    let zone = match channel.split_once('-') {
        Some((zone, _)) => zone,
        None => channel,
    };
    if zone.is_empty() { None } else { Some(zone) }
}

/// Abbreviate a UUID to its first 8 characters for more readable logs
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_from_channel() {
        assert_eq!(zone_from_channel("P4-6"), Some("P4"));
        assert_eq!(zone_from_channel("P12-3"), Some("P12"));
        // No dash: the whole name is the zone
        assert_eq!(zone_from_channel("P4"), Some("P4"));
        assert_eq!(zone_from_channel("-6"), None);
        assert_eq!(zone_from_channel(""), None);
    }

    #[test]
    fn test_abbrev_uuid() {
        let id: Uuid = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }
}
