//! Flight history records and their JSON encoding.
//!
//! History is stored under a single key as a JSON array, newest first. The
//! field names match what the mobile app writes so existing data loads as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PersistenceError;
use crate::session::FlightClass;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    #[serde(rename = "departure")]
    pub departure_label: String,
    #[serde(rename = "arrival")]
    pub arrival_label: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(rename = "class")]
    pub flight_class: FlightClass,
    pub seat: String,
    pub completed_at: DateTime<Utc>,
}

/// # Errors
/// Returns [`PersistenceError::Encode`] if serialization fails.
pub fn encode_history(history: &[HistoryRecord]) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(history)?)
}

/// Strict decode.
///
/// # Errors
/// Returns [`PersistenceError::Corrupt`] if `raw` is not a valid history array.
pub fn try_decode_history(raw: &str) -> Result<Vec<HistoryRecord>, PersistenceError> {
    serde_json::from_str(raw).map_err(|e| PersistenceError::Corrupt {
        key: super::keys::FLIGHT_HISTORY.to_string(),
        message: e.to_string(),
    })
}

/// Lenient decode: anything unreadable is treated as an empty history.
pub fn decode_history(raw: &str) -> Vec<HistoryRecord> {
    try_decode_history(raw).unwrap_or_else(|e| {
        warn!(error = %e, "discarding unreadable flight history");
        Vec::new()
    })
}

/// Insert `record` at the front and drop whatever falls past `capacity`.
pub fn prepend(history: &mut Vec<HistoryRecord>, record: HistoryRecord, capacity: usize) {
    history.insert(0, record);
    history.truncate(capacity);
}

/// Millisecond timestamp id, bumped past the newest existing id if needed so
/// ids stay unique and sort by creation.
pub fn next_record_id(history: &[HistoryRecord], at: DateTime<Utc>) -> String {
    let candidate = at.timestamp_millis().max(0) as u64;
    let newest = history
        .first()
        .and_then(|r| r.id.parse::<u64>().ok())
        .unwrap_or(0);
    let id = if newest >= candidate { newest.saturating_add(1) } else { candidate };
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, minutes: u32) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            departure_label: "London".into(),
            arrival_label: "Paris".into(),
            duration_minutes: minutes,
            flight_class: FlightClass::Economy,
            seat: "A1".into(),
            completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn reads_records_written_by_the_mobile_app() {
        let raw = r#"[{"id":"1714557600000","departure":"New York","arrival":"Tokyo","duration":90,"class":"business","seat":"2A","completedAt":"2024-05-01T10:00:00.000Z"}]"#;
        let history = try_decode_history(raw).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].arrival_label, "Tokyo");
        assert_eq!(history[0].duration_minutes, 90);
        assert_eq!(history[0].flight_class, FlightClass::Business);
    }

    #[test]
    fn encodes_with_mobile_field_names() {
        let json = encode_history(&[record("1", 25)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value[0].as_object().unwrap();
        for key in ["id", "departure", "arrival", "duration", "class", "seat", "completedAt"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(value[0]["class"], "economy");
    }

    #[test]
    fn corrupt_history_decodes_as_empty() {
        assert!(decode_history("not json").is_empty());
        assert!(decode_history(r#"{"id": 1}"#).is_empty());
        assert!(matches!(
            try_decode_history("[{"),
            Err(PersistenceError::Corrupt { .. })
        ));
    }

    #[test]
    fn prepend_caps_and_drops_oldest() {
        let mut history: Vec<HistoryRecord> = (0..DEFAULT_CAPACITY).map(|i| record(&i.to_string(), 25)).collect();
        prepend(&mut history, record("new", 30), DEFAULT_CAPACITY);
        assert_eq!(history.len(), DEFAULT_CAPACITY);
        assert_eq!(history[0].id, "new");
        assert_eq!(history.last().unwrap().id, "48");
    }

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let first = next_record_id(&[], at);
        assert_eq!(first, at.timestamp_millis().to_string());
        let history = vec![record(&first, 1)];
        let second = next_record_id(&history, at);
        assert_eq!(second.parse::<u64>().unwrap(), first.parse::<u64>().unwrap() + 1);
    }

    #[test]
    fn id_bump_saturates_at_the_largest_stored_id() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let history = vec![record(&u64::MAX.to_string(), 1)];
        assert_eq!(next_record_id(&history, at), u64::MAX.to_string());
    }
}
