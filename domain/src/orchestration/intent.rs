//! Intent heuristics over the raw user message.
//!
//! These are keyword heuristics, not semantically guaranteed
//! classifiers: they carry known false-positive/negative risk and are
//! used only for soft routing decisions (retry nudges, format hints),
//! never for anything that must be correct. Keep them isolated here so
//! a cleaner classifier can replace them without touching the engine.

/// Words that mark a request as calendar/scheduling-flavoured.
const SCHEDULING_TERMS: &[&str] = &[
    "calendar",
    "event",
    "events",
    "meeting",
    "meetings",
    "schedule",
    "scheduled",
    "appointment",
    "agenda",
    "reminder",
    "availability",
    "available",
    "busy",
    "free time",
];

/// Verbs that mark a request as asking for a state change.
const ACTION_TERMS: &[&str] = &[
    "create",
    "add",
    "book",
    "set up",
    "update",
    "move",
    "reschedule",
    "rename",
    "cancel",
    "delete",
    "remove",
];

/// Phrases suggesting the user wants an itemized breakdown rather than
/// a holistic summary.
const ITEMIZED_TERMS: &[&str] = &[
    "list",
    "each",
    "every",
    "one by one",
    "itemize",
    "itemized",
    "break down",
    "breakdown",
    "individually",
    "bullet",
];

/// Whether the request pertains to the scheduling/calendar domain.
///
/// Drives the domain retry policy: a scheduling request that evaluates
/// "complete" without any calendar tool having been attempted gets one
/// more decision cycle.
pub fn is_scheduling_request(message: &str) -> bool {
    contains_any(message, SCHEDULING_TERMS)
}

/// Whether the request asks for a state-changing action
/// (create/update/delete) rather than a lookup.
pub fn is_action_request(message: &str) -> bool {
    contains_any(message, ACTION_TERMS)
}

/// Whether the request phrasing suggests an itemized breakdown is the
/// expected answer shape (vs. a holistic summary).
pub fn wants_itemized_breakdown(message: &str) -> bool {
    contains_any(message, ITEMIZED_TERMS)
}

fn contains_any(message: &str, terms: &[&str]) -> bool {
    let lower = message.to_lowercase();
    terms.iter().any(|t| lower.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduling_detection() {
        assert!(is_scheduling_request("show me my events for next week"));
        assert!(is_scheduling_request("Am I busy on Friday?"));
        assert!(is_scheduling_request("What's on my Calendar?"));
        assert!(!is_scheduling_request("what's the weather like"));
    }

    #[test]
    fn test_action_detection() {
        assert!(is_action_request("create a meeting with Dana tomorrow"));
        assert!(is_action_request("please cancel the standup"));
        assert!(is_action_request("reschedule my 1:1 to Thursday"));
        assert!(!is_action_request("what do I have today?"));
    }

    #[test]
    fn test_itemized_detection() {
        assert!(wants_itemized_breakdown("list each meeting separately"));
        assert!(wants_itemized_breakdown("give me a breakdown of my week"));
        assert!(!wants_itemized_breakdown("roughly how packed is my week?"));
    }
}
