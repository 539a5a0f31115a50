//! Query-string encoding for list options.
//!
//! Unset values are never written, boolean flags only appear when `true`, and
//! multi-valued filters use the bracket-suffixed form the API expects
//! (`statuses[]=triggered&statuses[]=acknowledged`).
use url::form_urlencoded;

/// Ordered set of query parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value` if `value` is set.
    pub fn opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.pairs.push((key.to_owned(), value.to_string()));
        }
        self
    }

    /// Append `key=true` if `value` is `true`.
    pub fn flag(&mut self, key: &str, value: bool) -> &mut Self {
        if value {
            self.pairs.push((key.to_owned(), "true".to_owned()));
        }
        self
    }

    /// Append one `key[]=value` pair per element.
    pub fn list<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let name = format!("{key}[]");
        self.pairs.extend(values.into_iter().map(|v| (name.clone(), v.to_string())));
        self
    }

    /// Returns `true` if no parameter has been set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Raw (unencoded) parameter pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Percent-encode the parameters as `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.pairs).finish()
    }
}

/// Types that can be written into a [`Query`].
pub trait ToQuery {
    /// Append this value's set fields to `query`.
    fn append_to(&self, query: &mut Query);

    /// Encode into a fresh [`Query`].
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        self.append_to(&mut query);
        query
    }
}
