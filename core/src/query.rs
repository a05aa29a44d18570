//! Query parameters with nested-key support.
//!
//! The upstream API reads bracketed keys such as `page[size]=1`. A `Query`
//! keeps insertion order and flattens nested maps into that form when it is
//! attached to a URL.

use url::Url;

/// A single query value: either a scalar or a nested map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    Nested(Query),
}

/// Ordered query parameter map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entries: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder-style variant of [`Query::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// True when flattening would produce no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, v)| match v {
            QueryValue::Scalar(_) => false,
            QueryValue::Nested(inner) => inner.is_empty(),
        })
    }

    /// Flatten into `(key, value)` pairs, e.g. `page[size]`, `1`.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (key, value) in &self.entries {
            flatten(key.clone(), value, &mut out);
        }
        out
    }

    /// Append the flattened pairs to `url`. Leaves `url` untouched when there
    /// is nothing to add, so no dangling `?` appears.
    pub fn append_to(&self, url: &mut Url) {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(pairs);
    }
}

fn flatten(prefix: String, value: &QueryValue, out: &mut Vec<(String, String)>) {
    match value {
        QueryValue::Scalar(s) => out.push((prefix, s.clone())),
        QueryValue::Nested(inner) => {
            for (key, value) in &inner.entries {
                flatten(format!("{prefix}[{key}]"), value, out);
            }
        }
    }
}

impl From<Query> for QueryValue {
    fn from(q: Query) -> Self {
        QueryValue::Nested(q)
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Scalar(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Scalar(s)
    }
}

macro_rules! scalar_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(v: $t) -> Self {
                    QueryValue::Scalar(v.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(u32, u64, i32, i64, usize, bool);
