/// Identifies the current feed view. Any change invalidates the feed.
///
/// Keywords are trimmed and an empty keyword is stored as `None`, so the two
/// spellings of "no keyword" compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterKey {
    category: Option<i64>,
    keyword: Option<String>,
}

impl FilterKey {
    pub fn new(category: Option<i64>, keyword: Option<&str>) -> Self {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToOwned::to_owned);
        Self { category, keyword }
    }

    /// All streams, no keyword.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: i64) -> Self {
        Self::new(Some(category), None)
    }

    pub fn with_keyword(self, keyword: &str) -> Self {
        Self::new(self.category, Some(keyword))
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}
