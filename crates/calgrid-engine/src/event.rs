//! Provider-neutral calendar event types.
//!
//! Provider adapters convert their payloads into [`CalendarEvent`]; the layout
//! engine only reads `id`, `start`, `end` and `all_day`. Ownership tags
//! (`calendar_id`, `account_id`, `provider_id`) and presentation fields are
//! carried through untouched for the rendering layer.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::temporal::EventDate;

/// A calendar event as supplied by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: EventDate,
    pub end: EventDate,
    #[serde(default)]
    pub all_day: bool,

    // Ownership / source tags, opaque to layout
    #[serde(default)]
    pub calendar_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub provider_id: String,

    /// Display color (e.g. `"#1a73e8"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<Conference>,
    /// Events the user cannot edit (e.g. invitations from other organizers).
    #[serde(default)]
    pub read_only: bool,
}

/// An event attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: AttendeeStatus,
    #[serde(default)]
    pub organizer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendeeStatus {
    Accepted,
    Declined,
    Tentative,
    #[default]
    NeedsAction,
}

/// Conferencing details attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    /// Conferencing backend, e.g. `"google-meet"` or `"zoom"`.
    pub provider: String,
    pub join_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_id: Option<String>,
}

impl CalendarEvent {
    /// A minimal event; ownership tags and presentation fields are left empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: EventDate,
        end: EventDate,
    ) -> Self {
        let all_day = start.is_date_only() && end.is_date_only();
        CalendarEvent {
            id: id.into(),
            title: title.into(),
            start,
            end,
            all_day,
            calendar_id: String::new(),
            account_id: String::new(),
            provider_id: String::new(),
            color: None,
            description: None,
            location: None,
            attendees: Vec::new(),
            conference: None,
            read_only: false,
        }
    }

    /// Whether layout treats this event as all-day.
    ///
    /// Providers do not always set the flag on date-only events, so two
    /// date-only boundaries count as all-day too.
    pub fn is_all_day(&self) -> bool {
        self.all_day || (self.start.is_date_only() && self.end.is_date_only())
    }

    /// Parse a JSON array of events.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidEvent`] when the payload does not match the
    /// event shape, including a boundary in an unknown date representation.
    pub fn list_from_json(json: &str) -> Result<Vec<CalendarEvent>> {
        serde_json::from_str(json).map_err(|e| LayoutError::InvalidEvent(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_infers_all_day_from_dates() {
        let all_day = CalendarEvent::new(
            "a",
            "Offsite",
            EventDate::parse("2026-03-16").unwrap(),
            EventDate::parse("2026-03-18").unwrap(),
        );
        assert!(all_day.all_day);

        let timed = CalendarEvent::new(
            "b",
            "Standup",
            EventDate::parse("2026-03-16T09:00:00Z").unwrap(),
            EventDate::parse("2026-03-16T09:15:00Z").unwrap(),
        );
        assert!(!timed.all_day);
    }

    #[test]
    fn test_list_from_json_camel_case() {
        let json = r##"[{
            "id": "evt-1",
            "title": "Design review",
            "start": {"zoned": {"dateTime": "2026-03-16T10:00:00", "timeZone": "Europe/Berlin"}},
            "end": {"zoned": {"dateTime": "2026-03-16T11:00:00", "timeZone": "Europe/Berlin"}},
            "calendarId": "work",
            "accountId": "acc-1",
            "providerId": "google",
            "color": "#1a73e8",
            "readOnly": true,
            "attendees": [{"email": "ana@example.com", "status": "accepted"}],
            "conference": {"provider": "google-meet", "joinUrl": "https://meet.example.com/abc"}
        }]"##;
        let events = CalendarEvent::list_from_json(json).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.calendar_id, "work");
        assert!(event.read_only);
        assert!(!event.all_day);
        assert_eq!(event.attendees[0].status, AttendeeStatus::Accepted);
        assert_eq!(event.start.authored_zone(), Some("Europe/Berlin"));
    }

    #[test]
    fn test_list_from_json_rejects_unknown_date_variant() {
        let json = r#"[{
            "id": "evt-1",
            "title": "Mystery",
            "start": {"lunar": "2026-03-16"},
            "end": {"date": "2026-03-17"}
        }]"#;
        let err = CalendarEvent::list_from_json(json).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidEvent(_)), "got: {err:?}");
    }
}
