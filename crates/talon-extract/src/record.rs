use chrono::{DateTime, Utc};
use serde_json::Value;
use talon_core::{NormalizedEvent, TalonError, TalonResult};

/// Flatten one raw archive record into a [`NormalizedEvent`].
///
/// Reads `id`, `type`, `actor.login`, `created_at`, `repo.name`. Absent
/// string fields map to `None`. A missing or unparseable `created_at` makes
/// the record malformed; the caller drops it and continues the batch.
pub fn extract_event(raw: &Value) -> TalonResult<NormalizedEvent> {
    let created_at = parse_created_at(raw)?;

    Ok(NormalizedEvent {
        id: string_field(raw, "id"),
        event_type: string_field(raw, "type"),
        username: nested_string_field(raw, "actor", "login"),
        created_at,
        repo_name: nested_string_field(raw, "repo", "name"),
    })
}

fn parse_created_at(raw: &Value) -> TalonResult<DateTime<Utc>> {
    let ts = raw
        .get("created_at")
        .and_then(Value::as_str)
        .ok_or_else(|| TalonError::Extract("missing created_at".to_string()))?;

    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TalonError::Extract(format!("bad created_at {:?}: {}", ts, e)))
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn nested_string_field(raw: &Value, outer: &str, inner: &str) -> Option<String> {
    raw.get(outer)
        .and_then(|v| v.get(inner))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_all_fields() {
        let raw = json!({
            "id": "1001",
            "type": "PushEvent",
            "actor": { "id": 7, "login": "alice" },
            "repo": { "id": 9, "name": "alice/widgets" },
            "created_at": "2026-02-01T08:30:00Z",
        });

        let ev = extract_event(&raw).expect("valid record");
        assert_eq!(ev.id.as_deref(), Some("1001"));
        assert_eq!(ev.event_type.as_deref(), Some("PushEvent"));
        assert_eq!(ev.username.as_deref(), Some("alice"));
        assert_eq!(ev.repo_name.as_deref(), Some("alice/widgets"));
        assert_eq!(ev.created_at.to_rfc3339(), "2026-02-01T08:30:00+00:00");
    }

    #[test]
    fn missing_actor_is_not_an_error() {
        let raw = json!({
            "id": "1002",
            "type": "GollumEvent",
            "repo": { "name": "someorg/wiki" },
            "created_at": "2026-02-01T09:00:00Z",
        });

        let ev = extract_event(&raw).expect("valid record");
        assert!(ev.username.is_none());
        assert_eq!(ev.repo_name.as_deref(), Some("someorg/wiki"));
    }

    #[test]
    fn missing_repo_is_not_an_error() {
        let raw = json!({
            "id": "1003",
            "actor": { "login": "bob" },
            "created_at": "2026-02-01T09:05:00Z",
        });

        let ev = extract_event(&raw).expect("valid record");
        assert!(ev.repo_name.is_none());
        assert!(ev.event_type.is_none());
    }

    #[test]
    fn unparseable_timestamp_is_malformed() {
        let raw = json!({
            "id": "1004",
            "actor": { "login": "carol" },
            "created_at": "yesterday-ish",
        });

        let err = extract_event(&raw).expect_err("should be malformed");
        assert!(matches!(err, TalonError::Extract(_)));
    }

    #[test]
    fn missing_timestamp_is_malformed() {
        let raw = json!({ "id": "1005", "actor": { "login": "dave" } });
        let err = extract_event(&raw).expect_err("should be malformed");
        assert!(matches!(err, TalonError::Extract(_)));
    }
}
