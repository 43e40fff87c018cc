//! Query options carried by a query operation

use serde::{Deserialize, Serialize};

use super::orderby::OrderBy;

/// `{ fields?, orderBy?, filter?, limit? }` after reference expansion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Option name and raw value for every clause that is set
    ///
    /// Clauses appear in `$select`, `$orderby`, `$filter` order. Empty field
    /// lists and empty filters are omitted.
    fn clauses(&self) -> Vec<(&'static str, String)> {
        let mut clauses = Vec::new();

        if let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) {
            clauses.push(("$select", fields.join(",")));
        }

        if let Some(order_by) = &self.order_by {
            clauses.push(("$orderby", order_by.to_odata_string()));
        }

        if let Some(filter) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            clauses.push(("$filter", filter.to_string()));
        }

        clauses
    }

    fn join_clauses<F>(&self, encode_value: F) -> Option<String>
    where
        F: Fn(&str) -> String,
    {
        let clauses = self.clauses();
        if clauses.is_empty() {
            return None;
        }

        Some(
            clauses
                .iter()
                .map(|(name, value)| format!("{}={}", name, encode_value(value)))
                .collect::<Vec<_>>()
                .join("&"),
        )
    }

    /// Readable query string without the leading `?`, or `None` when no option is set
    pub fn to_query_string(&self) -> Option<String> {
        self.join_clauses(|value| value.to_string())
    }

    /// Query string as sent on the wire, each value percent-encoded
    ///
    /// `&`, `#` and `+` inside a filter literal stay part of the value instead of
    /// splitting the query, starting a fragment, or turning into a space.
    pub fn to_encoded_query_string(&self) -> Option<String> {
        self.join_clauses(|value| urlencoding::encode(value).into_owned())
    }

    /// Value for `Prefer: odata.maxpagesize=`; 0 when no limit is set
    pub fn max_page_size(&self) -> u32 {
        self.limit.unwrap_or(0)
    }
}
