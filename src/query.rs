/// A case-insensitive search term.
///
/// The raw term is kept for extensions, which receive it verbatim through
/// [`SearchContext`](crate::traits::SearchContext). All comparisons use the
/// folded (lower-cased) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw:    String,
    folded: String,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        let raw = term.into();
        let folded = fold(&raw);
        Self { raw, folded }
    }

    /// The term as the caller supplied it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if `value` contains the term.
    ///
    /// The direction matters: the value is searched for the term, so an
    /// empty term is found in every value.
    pub fn found_in(&self, value: &str) -> bool {
        fold(value).contains(&self.folded)
    }

    /// True if the term selects the vocabulary phrase, i.e. the phrase
    /// contains the term. `"run"` selects `"running"`.
    pub fn selects(&self, phrase: &str) -> bool {
        fold(phrase).contains(&self.folded)
    }
}

/// Lower-case each character on its own. `str::to_lowercase` applies
/// word-final rules (`Σ` becomes `ς` at the end of a word), which would make
/// a term stop matching inside a longer value.
fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

impl From<&str> for SearchQuery {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

impl From<String> for SearchQuery {
    fn from(term: String) -> Self {
        Self::new(term)
    }
}
