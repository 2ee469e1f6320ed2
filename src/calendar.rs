use serde_json::Value;

use crate::models::{CalendarEvent, Session};
use crate::store::{RemoteError, RowStore, SelectQuery};

pub const EVENTS_TABLE: &str = "events";

/// Events scheduled on a single day, earliest first.
pub async fn events_on<S: RowStore>(
    store: &S,
    session: &Session,
    date: &str,
) -> Result<Vec<CalendarEvent>, RemoteError> {
    let query = SelectQuery::new()
        .gte("event_date", date)
        .lte("event_date", date)
        .order_by("event_date", true);
    let rows = store.select(session, EVENTS_TABLE, query).await?;
    rows.into_iter()
        .map(|row| Ok(serde_json::from_value(Value::Object(row))?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{session_for, MemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn only_the_requested_day_is_returned() {
        let store = MemoryStore::new();
        store.seed(
            EVENTS_TABLE,
            json!({"title": "Standup", "event_date": "2026-02-03", "type": "meeting"}),
        );
        store.seed(
            EVENTS_TABLE,
            json!({"title": "Retro", "event_date": "2026-02-04"}),
        );

        let events = events_on(&store, &session_for("u1"), "2026-02-03")
            .await
            .expect("events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[0].event_type, "meeting");
    }

    #[tokio::test]
    async fn an_empty_day_is_not_an_error() {
        let store = MemoryStore::new();
        let events = events_on(&store, &session_for("u1"), "2026-02-03")
            .await
            .expect("events");
        assert!(events.is_empty());
    }
}
