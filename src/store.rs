use serde_json::Value;

use crate::models::Session;

/// A table row as carried by the remote store's JSON API.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug)]
pub enum RemoteError {
    /// Transport-level failure: the request never completed.
    Http(reqwest::Error),
    /// The remote store rejected the request.
    Api { status: u16, message: String },
    /// The response body was not the JSON shape we expect.
    Decode(serde_json::Error),
    /// An insert reported success but returned no stored row.
    MissingRow,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Http(err) => write!(f, "http error: {err}"),
            RemoteError::Api { status, message } => {
                write!(f, "remote store rejected request ({status}): {message}")
            }
            RemoteError::Decode(err) => write!(f, "invalid response: {err}"),
            RemoteError::MissingRow => write!(f, "insert returned no row"),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(value: reqwest::Error) -> Self {
        RemoteError::Http(value)
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(value: serde_json::Error) -> Self {
        RemoteError::Decode(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    Gte(String, String),
    Lte(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Filters, ordering, and limit for a table select.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn gte(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push(Filter::Gte(column.to_string(), value.to_string()));
        self
    }

    pub fn lte(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push(Filter::Lte(column.to_string(), value.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// URL query pairs in the remote store's dialect
    /// (`column=eq.value`, `order=column.desc`, `limit=n`).
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        for filter in &self.filters {
            let (column, op, value) = match filter {
                Filter::Eq(column, value) => (column, "eq", value),
                Filter::Gte(column, value) => (column, "gte", value),
                Filter::Lte(column, value) => (column, "lte", value),
            };
            pairs.push((column.clone(), format!("{op}.{value}")));
        }
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Row capability of the remote store. The repository and calendar view
/// talk to the store only through this trait, so tests can substitute an
/// in-memory fake.
#[allow(async_fn_in_trait)]
pub trait RowStore {
    async fn select(
        &self,
        session: &Session,
        table: &str,
        query: SelectQuery,
    ) -> Result<Vec<Row>, RemoteError>;

    /// Inserts one record and returns the stored row, id included.
    async fn insert(
        &self,
        session: &Session,
        table: &str,
        record: &Value,
    ) -> Result<Row, RemoteError>;

    async fn update(
        &self,
        session: &Session,
        table: &str,
        id: &str,
        patch: &Value,
    ) -> Result<(), RemoteError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use serde_json::Value;

    use super::{Filter, RemoteError, Row, RowStore, SelectQuery};
    use crate::models::{AuthUser, Session};

    pub(crate) fn session_for(user_id: &str) -> Session {
        Session {
            access_token: format!("token-{user_id}"),
            user: AuthUser {
                id: user_id.to_string(),
                email: format!("{user_id}@example.com"),
                email_confirmed_at: Some("2026-01-01T00:00:00Z".to_string()),
                confirmed_at: None,
            },
        }
    }

    /// In-memory stand-in for the hosted store. Emulates the parts of
    /// the row API the crate relies on: equality/range filters, string
    /// ordering, limit, id assignment on insert, and per-record
    /// rejection of rows whose `title` is not a string.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        tables: RefCell<HashMap<String, Vec<Row>>>,
        next_id: Cell<u64>,
        pub(crate) insert_calls: Cell<usize>,
        pub(crate) fail_all: Cell<bool>,
    }

    impl MemoryStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn seed(&self, table: &str, record: Value) {
            let mut tables = self.tables.borrow_mut();
            let rows = tables.entry(table.to_string()).or_default();
            let mut row = match record {
                Value::Object(map) => map,
                other => panic!("seed expects an object, got {other}"),
            };
            if !row.contains_key("id") {
                let id = self.next_id.get() + 1;
                self.next_id.set(id);
                row.insert("id".to_string(), Value::String(format!("seed-{id}")));
            }
            rows.push(row);
        }

        pub(crate) fn rows(&self, table: &str) -> Vec<Row> {
            self.tables
                .borrow()
                .get(table)
                .cloned()
                .unwrap_or_default()
        }

        fn outage() -> RemoteError {
            RemoteError::Api {
                status: 503,
                message: "store unavailable".to_string(),
            }
        }
    }

    fn column_str<'a>(row: &'a Row, column: &str) -> &'a str {
        row.get(column).and_then(Value::as_str).unwrap_or("")
    }

    impl RowStore for MemoryStore {
        async fn select(
            &self,
            _session: &Session,
            table: &str,
            query: SelectQuery,
        ) -> Result<Vec<Row>, RemoteError> {
            if self.fail_all.get() {
                return Err(Self::outage());
            }
            let mut rows = self.rows(table);
            rows.retain(|row| {
                query.filters.iter().all(|filter| match filter {
                    Filter::Eq(column, value) => column_str(row, column) == value.as_str(),
                    Filter::Gte(column, value) => column_str(row, column) >= value.as_str(),
                    Filter::Lte(column, value) => column_str(row, column) <= value.as_str(),
                })
            });
            if let Some(order) = &query.order {
                rows.sort_by(|a, b| {
                    let ordering = column_str(a, &order.column).cmp(column_str(b, &order.column));
                    if order.ascending {
                        ordering
                    } else {
                        ordering.reverse()
                    }
                });
            }
            if let Some(limit) = query.limit {
                rows.truncate(limit);
            }
            Ok(rows)
        }

        async fn insert(
            &self,
            _session: &Session,
            table: &str,
            record: &Value,
        ) -> Result<Row, RemoteError> {
            self.insert_calls.set(self.insert_calls.get() + 1);
            if self.fail_all.get() {
                return Err(Self::outage());
            }
            let Value::Object(map) = record else {
                return Err(RemoteError::Api {
                    status: 400,
                    message: "record must be an object".to_string(),
                });
            };
            if !matches!(map.get("title"), Some(Value::String(_))) {
                return Err(RemoteError::Api {
                    status: 400,
                    message: "column \"title\" must be a string".to_string(),
                });
            }
            let mut row = map.clone();
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            row.insert("id".to_string(), Value::String(format!("t{id}")));
            let mut tables = self.tables.borrow_mut();
            tables.entry(table.to_string()).or_default().push(row.clone());
            Ok(row)
        }

        async fn update(
            &self,
            _session: &Session,
            table: &str,
            id: &str,
            patch: &Value,
        ) -> Result<(), RemoteError> {
            if self.fail_all.get() {
                return Err(Self::outage());
            }
            let Value::Object(patch) = patch else {
                return Err(RemoteError::Api {
                    status: 400,
                    message: "patch must be an object".to_string(),
                });
            };
            let mut tables = self.tables.borrow_mut();
            let rows = tables.entry(table.to_string()).or_default();
            let Some(row) = rows
                .iter_mut()
                .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            else {
                return Err(RemoteError::Api {
                    status: 404,
                    message: format!("no row with id {id}"),
                });
            };
            for (key, value) in patch {
                row.insert(key.clone(), value.clone());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_cover_filters_order_and_limit() {
        let query = SelectQuery::new()
            .eq("user_id", "u1")
            .gte("event_date", "2026-02-03")
            .lte("event_date", "2026-02-03")
            .order_by("created_at", false)
            .limit(5);
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.u1".to_string()),
                ("event_date".to_string(), "gte.2026-02-03".to_string()),
                ("event_date".to_string(), "lte.2026-02-03".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn empty_query_selects_everything() {
        assert_eq!(
            SelectQuery::new().to_query_pairs(),
            vec![("select".to_string(), "*".to_string())]
        );
    }

    #[test]
    fn remote_error_display_includes_status_and_body() {
        let err = RemoteError::Api {
            status: 409,
            message: "duplicate key".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("409"));
        assert!(text.contains("duplicate key"));
    }
}
