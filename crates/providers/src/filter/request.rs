use url::Url;

/// Outbound listing request produced by the filter engine.
///
/// Parameters keep insertion order and may repeat a key, which is how sites
/// encode multi-select facets (`type[]=4&type[]=7`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    url: String,
    params: Vec<(String, String)>,
}

impl FilterRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Replaces every value of `key` with `values`, keeping the key's first
    /// position when it was already present.
    pub fn set<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let position = self.params.iter().position(|(k, _)| k == key);
        self.params.retain(|(k, _)| k != key);
        let at = position.unwrap_or(self.params.len());
        let new: Vec<(String, String)> = values
            .into_iter()
            .map(|v| (key.to_owned(), v.into()))
            .collect();
        self.params.splice(at..at, new);
    }

    pub fn set_one(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, [value.into()]);
    }

    pub fn values(&self, key: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Full URL with the encoded query string, mostly for logging.
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(&self.url, &self.params)
    }
}
