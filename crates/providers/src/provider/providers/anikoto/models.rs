use serde::Deserialize;

/// AJAX endpoints wrap an HTML fragment in `{"result": "..."}`.
#[derive(Debug, Deserialize)]
pub struct HtmlFragmentResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerResponse {
    pub result: ServerResult,
}

#[derive(Debug, Deserialize)]
pub struct ServerResult {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSourcesResponse {
    pub sources: PlayerSource,
    #[serde(default)]
    pub tracks: Vec<PlayerTrack>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSource {
    pub file: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerTrack {
    pub file: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Alternate quality table: `{"<name>-1080p": {"sub": {"url": ".."}, "dub": ..}}`.
/// Key order is the table order and must be preserved.
pub type QualityTable = serde_json::Map<String, serde_json::Value>;
