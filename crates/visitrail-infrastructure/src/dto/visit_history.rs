//! Visit history DTOs
//!
//! The persisted layout is a single JSON object keyed by domain. It has been
//! written by two generations of the tracker and both must stay readable:
//!
//! - **Legacy**: each `visits` element is a bare ISO-8601 timestamp string.
//! - **Current**: each `visits` element is `{ "timestamp": ..., "url": ... }`.
//!
//! Both shapes can appear in the same list. Nothing is migrated on disk;
//! legacy elements are written back unchanged.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use visitrail_core::error::{Result, VisitrailError};
use visitrail_core::visit::{DomainRecord, VisitEntry, VisitStore};

/// One element of a domain's `visits` list, in either stored shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisitEntryDTO {
    /// Legacy shape: bare timestamp.
    Legacy(String),
    /// Current shape: timestamp with the observed URL.
    Full {
        timestamp: String,
        #[serde(default)]
        url: Option<String>,
    },
    /// Anything else; dropped on read.
    Unknown(JsonValue),
}

/// One domain's record as stored.
///
/// Fields are read leniently: a `null` or wrongly typed `lastVisit`, `visits`
/// or `urls` reads as absent, so one damaged field never costs the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecordDTO {
    #[serde(default, deserialize_with = "count_or_zero")]
    pub count: u64,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_none"
    )]
    pub last_visit: Option<String>,

    #[serde(default, deserialize_with = "readable_items")]
    pub visits: Vec<VisitEntryDTO>,

    #[serde(default, deserialize_with = "readable_items")]
    pub urls: Vec<String>,
}

// ============================================================================
// Lenient field readers
// ============================================================================

/// Non-negative integer, integral float or numeric string. `null` reads as 0;
/// anything else fails the record.
fn count_or_zero<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    let count = match &value {
        JsonValue::Null => Some(0),
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        JsonValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    count.ok_or_else(|| D::Error::custom(format!("count is not a visit total: {}", value)))
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Some(s),
        _ => None,
    })
}

/// Items of an array that decode as `T`; anything that is not an array is empty.
fn readable_items<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match JsonValue::deserialize(deserializer)? {
        JsonValue::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Formats an instant the way the store writes it (`2025-01-01T00:00:00.000Z`).
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored ISO-8601 / RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl VisitEntryDTO {
    /// Converts to the domain model; `None` for unreadable entries.
    fn into_domain(self) -> Option<VisitEntry> {
        match self {
            VisitEntryDTO::Legacy(timestamp) => parse_timestamp(&timestamp).map(VisitEntry::legacy),
            VisitEntryDTO::Full { timestamp, url } => parse_timestamp(&timestamp)
                .map(|timestamp| VisitEntry::full(timestamp, url.unwrap_or_default())),
            VisitEntryDTO::Unknown(_) => None,
        }
    }
}

impl DomainRecordDTO {
    /// Converts to the domain model, dropping visit entries that cannot be read.
    pub fn into_domain(self, domain: &str) -> DomainRecord {
        let stored = self.visits.len();
        let visits: Vec<VisitEntry> = self
            .visits
            .into_iter()
            .filter_map(VisitEntryDTO::into_domain)
            .collect();

        if visits.len() < stored {
            tracing::warn!(
                "Dropped {} unreadable visit entries for {}",
                stored - visits.len(),
                domain
            );
        }

        DomainRecord {
            domain: domain.to_string(),
            count: self.count.max(visits.len() as u64),
            last_visit: self.last_visit.as_deref().and_then(parse_timestamp),
            visits,
            urls: self.urls,
        }
    }
}

/// Convert domain model to DTO for persistence.
impl From<&VisitEntry> for VisitEntryDTO {
    fn from(entry: &VisitEntry) -> Self {
        match entry {
            VisitEntry::Legacy { timestamp } => VisitEntryDTO::Legacy(format_timestamp(*timestamp)),
            VisitEntry::Full { timestamp, url } => VisitEntryDTO::Full {
                timestamp: format_timestamp(*timestamp),
                url: Some(url.clone()),
            },
        }
    }
}

/// Convert domain model to DTO for persistence.
impl From<&DomainRecord> for DomainRecordDTO {
    fn from(record: &DomainRecord) -> Self {
        DomainRecordDTO {
            count: record.count,
            last_visit: record.last_visit.map(format_timestamp),
            visits: record.visits.iter().map(VisitEntryDTO::from).collect(),
            urls: record.urls.clone(),
        }
    }
}

// ============================================================================
// Whole-store encoding
// ============================================================================

/// Decodes the stored VisitStore value.
///
/// `null` is an empty store. A domain entry that cannot be read as a record
/// is logged and carried verbatim so that the next save writes it back; only
/// a non-object root is an error.
pub fn decode_visit_store(value: JsonValue) -> Result<VisitStore> {
    let entries = match value {
        JsonValue::Null => return Ok(VisitStore::new()),
        JsonValue::Object(entries) => entries,
        other => {
            return Err(VisitrailError::Serialization {
                format: "JSON".to_string(),
                message: format!("visit history must be an object, found {}", type_name(&other)),
            });
        }
    };

    let mut store = VisitStore::new();
    for (domain, raw) in entries {
        if !raw.is_object() {
            tracing::warn!("Keeping unreadable visit record for {} as is: {}", domain, type_name(&raw));
            store.preserve_unreadable(domain, raw);
            continue;
        }
        match DomainRecordDTO::deserialize(&raw) {
            Ok(dto) => {
                store.insert(dto.into_domain(&domain));
            }
            Err(e) => {
                tracing::warn!("Keeping unreadable visit record for {} as is: {}", domain, e);
                store.preserve_unreadable(domain, raw);
            }
        }
    }

    Ok(store)
}

/// Encodes the whole VisitStore in the persisted layout, unreadable entries
/// included.
pub fn encode_visit_store(store: &VisitStore) -> Result<JsonValue> {
    let mut entries = Map::new();
    for (domain, raw) in store.unreadable() {
        entries.insert(domain.to_string(), raw.clone());
    }
    for record in store.records() {
        entries.insert(
            record.domain.clone(),
            serde_json::to_value(DomainRecordDTO::from(record))?,
        );
    }
    Ok(JsonValue::Object(entries))
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
