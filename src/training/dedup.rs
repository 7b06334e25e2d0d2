use super::messages::RawMessage;

/// Reduce a time-ordered burst of messages to its distinct tuples, first
/// occurrence order preserved, plus a flag telling whether any message
/// repeated. A linear scan is fine here; a training burst is a few dozen
/// messages at most.
pub fn deduplicate(messages: &[RawMessage]) -> (Vec<RawMessage>, bool) {
    let mut distinct: Vec<RawMessage> = Vec::with_capacity(messages.len());
    for msg in messages {
        if !distinct.contains(msg) {
            distinct.push(*msg);
        }
    }
    let has_duplicates = messages.len() > distinct.len();
    (distinct, has_duplicates)
}
