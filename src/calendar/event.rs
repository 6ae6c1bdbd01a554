use serde::Deserialize;
use serde_json::{json, Map, Value};

static DEFAULT_SUMMARY: &str = "Meeting";
static DEFAULT_TIMEZONE: &str = "UTC";

/// `create_event` tool input.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EventRequest {
    #[serde(default)]
    pub summary: Option<String>,
    /// RFC 3339 datetime
    pub start: String,
    /// RFC 3339 datetime
    pub end: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<Value>>,
}

impl EventRequest {
    pub fn from_value(input: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(input)
    }

    /// Google Calendar event resource for this request.
    pub fn to_event_payload(&self) -> Value {
        let timezone = self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
        json!({
            "summary": self.summary.as_deref().unwrap_or(DEFAULT_SUMMARY),
            "start": { "dateTime": self.start, "timeZone": timezone },
            "end": { "dateTime": self.end, "timeZone": timezone },
            "attendees": normalize_attendees(self.attendees.as_deref().unwrap_or_default()),
        })
    }
}

/// Bare strings become `{"email": ..}`; objects with an `email` key pass as is;
/// anything else is dropped.
pub fn normalize_attendees(entries: &[Value]) -> Vec<Value> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(email) => {
                let mut attendee = Map::new();
                attendee.insert("email".to_owned(), Value::String(email.to_owned()));
                Some(Value::Object(attendee))
            }
            Value::Object(obj) if obj.contains_key("email") => Some(entry.clone()),
            _ => None,
        })
        .collect()
}
