/// A named group of passages sharing one embedding dimensionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub dimensions: usize,
}

/// A stored passage as returned by a similarity search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub content: String,
    /// Cosine distance to the query, in `[0, 2]`.
    pub distance: f64,
}
