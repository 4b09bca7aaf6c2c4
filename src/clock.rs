//! Wall-clock helpers shared by every service that stamps rows.

use chrono::DateTime;
use sea_orm::prelude::DateTimeWithTimeZone;
use time::OffsetDateTime;

/// Current UTC time in the column representation Sea-ORM expects.
pub(crate) fn now() -> DateTimeWithTimeZone {
    to_db_time(OffsetDateTime::now_utc())
}

/// Converts a `time::OffsetDateTime` into Sea-ORM's chrono-based
/// `DateTimeWithTimeZone`, keeping nanosecond precision.
///
/// Instants outside chrono's representable range collapse to the Unix
/// epoch; nothing in the storefront produces such values.
pub(crate) fn to_db_time(time: OffsetDateTime) -> DateTimeWithTimeZone {
    DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .unwrap_or_default()
        .into()
}
