use crate::schema::ChannelMessage;

/// Collapse a raw export into a strictly ascending, duplicate-free sequence.
///
/// The sort is stable, so when an id repeats the first occurrence survives.
pub fn sequence(mut messages: Vec<ChannelMessage>) -> Vec<ChannelMessage> {
    messages.sort_by_key(|m| m.id);
    messages.dedup_by_key(|m| m.id);
    messages
}
