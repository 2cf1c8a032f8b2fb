use chrono::{DateTime, TimeZone, Utc};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Low bits reserved for worker, process and sequence.
const TIMESTAMP_SHIFT: u32 = 22;

/// Smallest id a message created at or after `instant` can carry.
///
/// Instants before the epoch clamp to 0 so the mapping stays monotonic.
pub fn to_cursor(instant: DateTime<Utc>) -> u64 {
    let since_epoch = instant.timestamp_millis() - DISCORD_EPOCH_MS;
    if since_epoch <= 0 {
        return 0;
    }
    (since_epoch as u64) << TIMESTAMP_SHIFT
}

/// Creation time encoded in `id`, truncated to the millisecond.
pub fn instant_of(id: u64) -> DateTime<Utc> {
    let millis = (id >> TIMESTAMP_SHIFT) as i64 + DISCORD_EPOCH_MS;
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
