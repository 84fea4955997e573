//! In-process calendar tool provider.
//!
//! Backs the calendar tool set with a thread-safe in-memory event
//! store. Times are opaque strings: callers are expected to pass
//! ISO-8601 timestamps, which also makes the range filter a plain
//! lexicographic comparison. Natural-language dates are resolved
//! upstream, never here.

use async_trait::async_trait;
use kalendo_domain::{ToolCategory, ToolDescriptor, ToolInvocation, ToolOutcome, ToolParameter};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stored calendar event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Calendar tools over an in-memory event store
pub struct CalendarProvider {
    events: RwLock<Vec<CalendarEvent>>,
    next_id: AtomicU64,
}

impl CalendarProvider {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Seed the store with events (for wiring demos and tests)
    pub fn with_events(self, events: Vec<CalendarEvent>) -> Self {
        let max_id = events
            .iter()
            .filter_map(|e| e.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next_id.store(max_id + 1, Ordering::SeqCst);
        *self.events.write().unwrap() = events;
        self
    }

    fn list_events(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let from = invocation.get_string("from");
        let to = invocation.get_string("to");

        let mut events: Vec<CalendarEvent> = self
            .events
            .read()
            .unwrap()
            .iter()
            .filter(|e| from.is_none_or(|f| e.start.as_str() >= f))
            .filter(|e| to.is_none_or(|t| e.start.as_str() <= t))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start));

        ToolOutcome::success(serde_json::json!(events))
    }

    fn create_event(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let summary = match invocation.require_string("summary") {
            Ok(s) => s.to_string(),
            Err(e) => return ToolOutcome::failure(e),
        };
        let start = match invocation.require_string("start") {
            Ok(s) => s.to_string(),
            Err(e) => return ToolOutcome::failure(e),
        };

        let event = CalendarEvent {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            summary,
            start,
            end: invocation.get_string("end").map(String::from),
            location: invocation.get_string("location").map(String::from),
            description: invocation.get_string("description").map(String::from),
        };

        self.events.write().unwrap().push(event.clone());
        ToolOutcome::success(serde_json::json!(event)).with_message("Event created")
    }

    fn update_event(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let id = match invocation.require_string("id") {
            Ok(s) => s,
            Err(e) => return ToolOutcome::failure(e),
        };

        let mut events = self.events.write().unwrap();
        let Some(event) = events.iter_mut().find(|e| e.id == id) else {
            return ToolOutcome::failure(format!("No event with id {}", id));
        };

        if let Some(summary) = invocation.get_string("summary") {
            event.summary = summary.to_string();
        }
        if let Some(start) = invocation.get_string("start") {
            event.start = start.to_string();
        }
        if let Some(end) = invocation.get_string("end") {
            event.end = Some(end.to_string());
        }
        if let Some(location) = invocation.get_string("location") {
            event.location = Some(location.to_string());
        }
        if let Some(description) = invocation.get_string("description") {
            event.description = Some(description.to_string());
        }

        ToolOutcome::success(serde_json::json!(event.clone())).with_message("Event updated")
    }

    fn delete_event(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let id = match invocation.require_string("id") {
            Ok(s) => s,
            Err(e) => return ToolOutcome::failure(e),
        };

        let mut events = self.events.write().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);

        if events.len() == before {
            ToolOutcome::failure(format!("No event with id {}", id))
        } else {
            ToolOutcome::success_message("Event deleted")
        }
    }

    fn search_events(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let query = match invocation.require_string("query") {
            Ok(s) => s.to_lowercase(),
            Err(e) => return ToolOutcome::failure(e),
        };

        let matches: Vec<CalendarEvent> = self
            .events
            .read()
            .unwrap()
            .iter()
            .filter(|e| {
                e.summary.to_lowercase().contains(&query)
                    || e.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&query))
                    || e.location
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&query))
            })
            .cloned()
            .collect();

        ToolOutcome::success(serde_json::json!(matches))
    }
}

impl Default for CalendarProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolProvider for CalendarProvider {
    fn id(&self) -> &str {
        "calendar"
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("get_events", "List calendar events, optionally within a time range", ToolCategory::Calendar)
                .with_parameter(ToolParameter::new("from", "Earliest start time (ISO-8601)", false))
                .with_parameter(ToolParameter::new("to", "Latest start time (ISO-8601)", false)),
            ToolDescriptor::new("create_event", "Create a calendar event", ToolCategory::Calendar)
                .with_parameter(ToolParameter::new("summary", "Event title", true))
                .with_parameter(ToolParameter::new("start", "Start time (ISO-8601)", true))
                .with_parameter(ToolParameter::new("end", "End time (ISO-8601)", false))
                .with_parameter(ToolParameter::new("location", "Where the event takes place", false))
                .with_parameter(ToolParameter::new("description", "Free-text details", false)),
            ToolDescriptor::new("update_event", "Update fields of an existing event", ToolCategory::Calendar)
                .with_parameter(ToolParameter::new("id", "Event id", true))
                .with_parameter(ToolParameter::new("summary", "New title", false))
                .with_parameter(ToolParameter::new("start", "New start time", false))
                .with_parameter(ToolParameter::new("end", "New end time", false))
                .with_parameter(ToolParameter::new("location", "New location", false))
                .with_parameter(ToolParameter::new("description", "New details", false)),
            ToolDescriptor::new("delete_event", "Delete an event by id", ToolCategory::Calendar)
                .with_parameter(ToolParameter::new("id", "Event id", true)),
            ToolDescriptor::new("search_events", "Search events by keyword", ToolCategory::Calendar)
                .with_parameter(ToolParameter::new("query", "Search terms", true)),
        ]
    }

    async fn execute(&self, invocation: &ToolInvocation) -> ToolOutcome {
        match invocation.tool_name.as_str() {
            "get_events" => self.list_events(invocation),
            "create_event" => self.create_event(invocation),
            "update_event" => self.update_event(invocation),
            "delete_event" => self.delete_event(invocation),
            "search_events" => self.search_events(invocation),
            other => ToolOutcome::failure(format!("Unknown calendar tool: {}", other)),
        }
    }
}
