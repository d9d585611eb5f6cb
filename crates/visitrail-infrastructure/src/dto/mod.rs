//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs describe the stored JSON layout. They are private to the
//! infrastructure layer; the core only ever sees domain models.

mod visit_history;

pub use visit_history::{
    DomainRecordDTO, VisitEntryDTO, decode_visit_store, encode_visit_store, format_timestamp,
    parse_timestamp,
};
