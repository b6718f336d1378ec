//! Online meeting and transcript fetching.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{GraphClient, Meeting, MeetingSource, Participant, Transcript};

#[async_trait]
impl MeetingSource for GraphClient {
    async fn fetch_transcript(
        &self,
        meeting_id: &str,
        transcript_id: &str,
    ) -> anyhow::Result<Transcript> {
        let base = format!(
            "/me/onlineMeetings/{}/transcripts/{}",
            meeting_id, transcript_id
        );
        let metadata = self.get(&base).await?;
        let content = self.get_text(&format!("{}/content", base)).await?;

        Ok(Transcript {
            id: str_field(&metadata, "/id"),
            meeting_id: str_field(&metadata, "/meetingId"),
            content,
            created: datetime_field(&metadata, "/createdDateTime"),
        })
    }

    async fn fetch_meeting(&self, meeting_id: &str) -> anyhow::Result<Meeting> {
        let value = self
            .get(&format!(
                "/me/onlineMeetings/{}?$select=id,subject,startDateTime,endDateTime,participants",
                meeting_id
            ))
            .await?;
        Ok(parse_meeting(&value))
    }

    async fn fetch_participants(&self, meeting_id: &str) -> anyhow::Result<Vec<Participant>> {
        let meeting = self.fetch_meeting(meeting_id).await?;
        let mut roster = vec![meeting.organizer];
        roster.extend(meeting.participants);
        Ok(roster)
    }
}

/// Parse a Graph onlineMeeting payload. Graph omits fields liberally, so
/// every lookup degrades to an empty string rather than failing.
fn parse_meeting(value: &Value) -> Meeting {
    let subject = value
        .pointer("/subject")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("Untitled Meeting")
        .to_string();

    let organizer = Participant {
        id: str_field(value, "/participants/organizer/identity/user/id"),
        display_name: str_field(value, "/participants/organizer/identity/user/displayName"),
        email: str_field(value, "/participants/organizer/upn"),
    };

    let participants = value
        .pointer("/participants/attendees")
        .and_then(Value::as_array)
        .map(|attendees| {
            attendees
                .iter()
                .map(|a| Participant {
                    id: str_field(a, "/identity/user/id"),
                    display_name: str_field(a, "/identity/user/displayName"),
                    email: str_field(a, "/upn"),
                })
                .collect()
        })
        .unwrap_or_default();

    Meeting {
        id: str_field(value, "/id"),
        subject,
        organizer,
        participants,
        start: datetime_field(value, "/startDateTime"),
        end: datetime_field(value, "/endDateTime"),
    }
}

fn str_field(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn datetime_field(value: &Value, pointer: &str) -> Option<DateTime<Utc>> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_meeting_payload() {
        let payload = json!({
            "id": "meeting-1",
            "subject": "Sprint Planning",
            "startDateTime": "2026-08-28T10:00:00Z",
            "endDateTime": "2026-08-28T11:00:00Z",
            "participants": {
                "organizer": {
                    "upn": "alice@example.com",
                    "identity": { "user": { "id": "u1", "displayName": "Alice Adams" } }
                },
                "attendees": [
                    {
                        "upn": "bob@example.com",
                        "identity": { "user": { "id": "u2", "displayName": "Bob Brown" } }
                    }
                ]
            }
        });

        let meeting = parse_meeting(&payload);
        assert_eq!(meeting.subject, "Sprint Planning");
        assert_eq!(meeting.organizer.id, "u1");
        assert_eq!(meeting.organizer.email, "alice@example.com");
        assert_eq!(meeting.participants.len(), 1);
        assert_eq!(meeting.participants[0].display_name, "Bob Brown");
        assert!(meeting.start.is_some());
    }

    #[test]
    fn missing_subject_falls_back() {
        let meeting = parse_meeting(&json!({ "id": "m" }));
        assert_eq!(meeting.subject, "Untitled Meeting");
        assert!(meeting.participants.is_empty());
        assert_eq!(meeting.organizer.id, "");
    }
}
