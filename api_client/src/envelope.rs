use serde::Deserialize;

/// List responses come in two shapes: DRF-paginated envelopes and bare
/// arrays. Decoded once here so endpoint methods only ever see `Vec<T>`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Paginated {
        results: Vec<T>,
        next: Option<String>,
        previous: Option<String>,
    },
    Plain(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Paginated { results, .. } => results,
            ListEnvelope::Plain(items) => items,
        }
    }

    /// Cursor to the next page, when the server paginated the response.
    pub fn next(&self) -> Option<&str> {
        match self {
            ListEnvelope::Paginated { next, .. } => next.as_deref(),
            ListEnvelope::Plain(_) => None,
        }
    }
}
