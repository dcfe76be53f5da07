//! Anikoto provider against a mocked site, player and quality mapper.
//!
//! All three hosts are served by one `MockServer`; the provider is pointed at
//! it through its JSON extras.

use anime_providers::filter::{Filters, MediaType, Season, Status};
use anime_providers::media::{EpisodeNumber, LanguageType};
use anime_providers::provider::providers::anikoto::Anikoto;
use anime_providers::provider::{Provider, ProviderError, Stage, default_client};
use base64::Engine as _;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("anime_providers=debug")
        .with_test_writer()
        .try_init();
}

fn provider(server: &MockServer) -> Anikoto {
    init_tracing();
    Anikoto::from_extras(
        default_client(None).unwrap(),
        Some(json!({
            "base_url": server.uri(),
            "player_url": server.uri(),
            "mapper_url": server.uri(),
        })),
    )
    .unwrap()
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body.into())
}

fn search_page(ids: &[&str], has_next: bool) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="item"><div class="ani poster tip" data-tip="{id}"><a><img alt="Title {id}"></a></div><a href="/watch/{id}"></a></div>"#
            )
        })
        .collect();
    let next = if has_next {
        r#"<a class="page-link" rel="next" href="?page=next">›</a>"#
    } else {
        ""
    };
    format!("<html><body>{items}{next}</body></html>")
}

const EPISODE_LIST: &str = r#"<ul class="ep-range">
<li><a data-num="1" data-ids="ep-1" data-slug="frieren" data-mal="52991" data-timestamp="1700000001" data-sub="1" data-dub="1">1</a></li>
<li><a data-num="2" data-ids="ep-2" data-slug="frieren" data-mal="52991" data-timestamp="1700000002" data-sub="1" data-dub="1">2</a></li>
<li><a data-num="3" data-ids="ep-3" data-slug="frieren" data-mal="52991" data-timestamp="1700000003" data-sub="1" data-dub="0">3</a></li>
</ul>"#;

const SERVER_LIST_SUB_ONLY: &str = r#"<div class="servers">
<div class="type" data-type="sub"><ul><li data-link-id="sub-ref">HD-1</li></ul></div>
</div>"#;

const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360
360/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2000000,RESOLUTION=1280x720
720/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080
1080/index.m3u8
";

const MEDIA: &str = "#EXTM3U
#EXT-X-TARGETDURATION:10
#EXTINF:10.0,
seg0.ts
#EXT-X-ENDLIST
";

/// Mounts stages 1-6 of a successful sub resolution for episode 2.
async fn mount_primary_chain(server: &MockServer, tracks: serde_json::Value) {
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/ajax/episode/list/frieren-xyz"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": EPISODE_LIST})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ajax/server/list"))
        .and(query_param("servers", "ep-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": SERVER_LIST_SUB_ONLY})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ajax/server"))
        .and(query_param("get", "sub-ref"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": {"url": format!("{uri}/embed/e-1/ep-2")}})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/embed/e-1/ep-2"))
        .and(header("referer", uri.as_str()))
        .respond_with(html(
            r#"<html><body><div class="fix-area" data-id="777"></div></body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stream/getSources"))
        .and(query_param("id", "777"))
        .and(header("referer", uri.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sources": {"file": format!("{uri}/hls/ep2/master.m3u8")},
            "tracks": tracks,
        })))
        .mount(server)
        .await;
}

async fn mount_manifest(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/hls/ep2/master.m3u8"))
        .and(header("referer", format!("{}/", server.uri()).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_mapper(server: &MockServer, table: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/mal/52991/frieren/1700000002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table))
        .mount(server)
        .await;
}

async fn mount_alternate_redirect(server: &MockServer, reference: &str, stream_url: &str) {
    let encoded = base64::engine::general_purpose::STANDARD.encode(stream_url);
    Mock::given(method("GET"))
        .and(path("/ajax/server"))
        .and(query_param("get", reference))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"result": {"url": format!("https://mapper.example/embed/x#{encoded}")}}),
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_sends_filters_and_stops_without_next_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/filter"))
        .and(query_param("keyword", "frieren"))
        .and(query_param("year[]", "2023"))
        .and(query_param("season[]", "fall"))
        .and(query_param("status[]", "completed"))
        .and(query_param("type[]", "4"))
        .and(query_param("type[]", "7"))
        .and(query_param("page", "1"))
        .respond_with(html(search_page(&["a", "b"], true)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/filter"))
        .and(query_param("page", "2"))
        .respond_with(html(search_page(&["c"], false)))
        .expect(1)
        .mount(&server)
        .await;

    let filters = Filters::new()
        .with_year(2023)
        .with_season(Season::Fall)
        .with_status(Status::Completed)
        .with_media_type(MediaType::Special);
    let results = provider(&server).search("frieren", &filters).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(results[0].name.as_deref(), Some("Title a"));
}

#[tokio::test]
async fn test_search_stops_after_ten_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/filter"))
        .respond_with(html(search_page(&["again"], true)))
        .expect(10)
        .mount(&server)
        .await;

    let results = provider(&server)
        .search("loop", &Filters::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 10);
}

#[tokio::test]
async fn test_get_episodes_filters_by_language() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax/episode/list/frieren-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": EPISODE_LIST})))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let sub = provider
        .get_episodes("frieren-xyz", LanguageType::Sub)
        .await
        .unwrap();
    let dub = provider
        .get_episodes("frieren-xyz", LanguageType::Dub)
        .await
        .unwrap();

    assert_eq!(
        sub,
        vec![
            EpisodeNumber::Whole(1),
            EpisodeNumber::Whole(2),
            EpisodeNumber::Whole(3)
        ]
    );
    assert_eq!(dub, vec![EpisodeNumber::Whole(1), EpisodeNumber::Whole(2)]);
}

#[tokio::test]
async fn test_get_info_tolerates_missing_genres() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch/frieren-xyz"))
        .respond_with(html(
            r#"<html><body>
            <div class="poster"><img src="https://img.example/f.jpg"></div>
            <div class="title">Frieren</div>
            <div class="desc text-expand">After the party's journey.</div>
            <div class="detail">
              <div>Premiered: <a>Fall 2023</a></div>
              <div>Status: <span>Releasing</span></div>
            </div>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let info = provider(&server).get_info("frieren-xyz").await.unwrap();
    assert!(info.genres.is_empty());
    assert_eq!(info.name.as_deref(), Some("Frieren"));
    assert_eq!(info.image.as_deref(), Some("https://img.example/f.jpg"));
    assert_eq!(info.synopsis.as_deref(), Some("After the party's journey."));
    assert_eq!(info.release_year, Some(2023));
    assert_eq!(info.status, Some(Status::Ongoing));
    assert!(info.alternative_names.is_empty());
}

#[tokio::test]
async fn test_get_video_alternate_then_manifest_renditions() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_primary_chain(
        &server,
        json!([{"file": "https://subs.example/en.vtt", "label": "English", "kind": "captions"}]),
    )
    .await;
    mount_manifest(&server, MASTER).await;
    mount_mapper(
        &server,
        json!({
            "frieren-1080p": {"sub": {"url": "alt-1080"}},
            "frieren-480p": {"dub": {"url": "alt-480-dub"}},
            "frieren-720p": {"sub": {"url": "alt-720"}},
        }),
    )
    .await;
    mount_alternate_redirect(&server, "alt-1080", "https://alt.example/1080.m3u8").await;
    mount_alternate_redirect(&server, "alt-720", "https://alt.example/720.m3u8").await;

    let streams = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap();

    let summary: Vec<(String, u32)> = streams
        .iter()
        .map(|s| (s.url.clone(), s.resolution.get()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("https://alt.example/1080.m3u8".to_string(), 1080),
            ("https://alt.example/720.m3u8".to_string(), 720),
            (format!("{uri}/hls/ep2/360/index.m3u8"), 360),
            (format!("{uri}/hls/ep2/720/index.m3u8"), 720),
            (format!("{uri}/hls/ep2/1080/index.m3u8"), 1080),
        ]
    );

    assert!(streams.iter().all(|s| s.episode == EpisodeNumber::Whole(2)));
    assert!(streams.iter().all(|s| s.language == LanguageType::Sub));

    let (alternate, primary) = streams.split_at(2);
    assert!(alternate.iter().all(|s| s.subtitles.is_none() && s.referrer.is_none()));
    let referrer = format!("{uri}/");
    assert!(primary.iter().all(|s| s.referrer.as_deref() == Some(referrer.as_str())));
    assert!(primary.iter().all(|s| s.subtitle_count() == 1));
}

#[tokio::test]
async fn test_get_video_single_stream_fallback() {
    let server = MockServer::start().await;

    mount_primary_chain(
        &server,
        json!([
            {"file": "https://subs.example/en.vtt", "label": "English", "kind": "captions"},
            {"file": "https://subs.example/es.vtt", "label": "Spanish - Latin", "kind": "captions"},
            {"file": "https://subs.example/thumbs.vtt", "kind": "thumbnails"},
        ]),
    )
    .await;
    mount_manifest(&server, MEDIA).await;
    mount_mapper(&server, json!({})).await;

    let streams = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap();

    assert_eq!(streams.len(), 1);
    let stream = &streams[0];
    assert_eq!(stream.url, format!("{}/hls/ep2/master.m3u8", server.uri()));
    assert_eq!(stream.resolution.get(), 1080);
    assert_eq!(stream.referrer, Some(format!("{}/", server.uri())));

    let subtitles = stream.subtitles.as_ref().unwrap();
    assert_eq!(subtitles.len(), 2);
    assert_eq!(subtitles["Spanish - Latin"].shortcode, "es");
    assert_eq!(subtitles["Spanish - Latin"].lang, "Spanish");
}

#[tokio::test]
async fn test_get_video_duplicate_subtitle_label_keeps_last() {
    let server = MockServer::start().await;

    mount_primary_chain(
        &server,
        json!([
            {"file": "https://subs.example/en-first.vtt", "label": "English"},
            {"file": "https://subs.example/en-second.vtt", "label": "English"},
        ]),
    )
    .await;
    mount_manifest(&server, MASTER).await;
    mount_mapper(&server, json!({})).await;

    let streams = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap();

    assert_eq!(streams.len(), 3);
    for stream in &streams {
        let subtitles = stream.subtitles.as_ref().unwrap();
        assert_eq!(subtitles.len(), 1);
        assert_eq!(subtitles["English"].url, "https://subs.example/en-second.vtt");
    }
}

#[tokio::test]
async fn test_get_video_language_unavailable_stops_resolution() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax/episode/list/frieren-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": EPISODE_LIST})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ajax/server/list"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": SERVER_LIST_SUB_ONLY})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ajax/server"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mal/52991/frieren/1700000002"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Dub)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::LanguageUnavailable {
            ref identifier,
            language: LanguageType::Dub,
        } if identifier == "frieren-xyz"
    ));
}

#[tokio::test]
async fn test_get_video_episode_only_in_other_language() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ajax/episode/list/frieren-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": EPISODE_LIST})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ajax/server/list"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(3), LanguageType::Dub)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::LanguageUnavailable { .. }));
}

#[tokio::test]
async fn test_transport_and_layout_errors_are_distinct() {
    // Nothing listens on port 1.
    let unreachable = Anikoto::from_extras(
        default_client(None).unwrap(),
        Some(json!({"base_url": "http://127.0.0.1:1"})),
    )
    .unwrap();
    let err = unreachable.get_info("x").await.unwrap_err();
    assert!(err.is_transport());
    assert!(!err.is_layout_mismatch());
    assert_eq!(err.stage(), Some(Stage::Info));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ajax/episode/list/gone"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let err = provider(&server)
        .get_episodes("gone", LanguageType::Sub)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Status {
            stage: Stage::EpisodeList,
            ..
        }
    ));
    assert!(err.is_transport());

    // Player page no longer carries the player id.
    let server = MockServer::start().await;
    mount_primary_chain(&server, json!([])).await;
    mount_mapper(&server, json!({})).await;
    Mock::given(method("GET"))
        .and(path("/embed/e-1/ep-2"))
        .respond_with(html("<html><body><div class=\"player\"></div></body></html>"))
        .with_priority(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap_err();
    assert!(err.is_layout_mismatch());
    assert!(!err.is_transport());
    assert_eq!(err.stage(), Some(Stage::PlayerPage));
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ajax/episode/list/frieren-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_episodes("frieren-xyz", LanguageType::Sub)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Decode {
            stage: Stage::EpisodeList,
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_video_manifest_failure_discards_alternate_renditions() {
    let server = MockServer::start().await;

    mount_primary_chain(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/hls/ep2/master.m3u8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_mapper(
        &server,
        json!({
            "frieren-1080p": {"sub": {"url": "alt-1080"}},
            "frieren-720p": {"sub": {"url": "alt-720"}},
        }),
    )
    .await;
    mount_alternate_redirect(&server, "alt-1080", "https://alt.example/1080.m3u8").await;
    mount_alternate_redirect(&server, "alt-720", "https://alt.example/720.m3u8").await;

    let err = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Status {
            stage: Stage::Manifest,
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_video_broken_alternate_redirect_discards_manifest_renditions() {
    let server = MockServer::start().await;

    mount_primary_chain(&server, json!([])).await;
    mount_manifest(&server, MASTER).await;
    mount_mapper(
        &server,
        json!({
            "frieren-1080p": {"sub": {"url": "alt-1080"}},
            "frieren-720p": {"sub": {"url": "alt-broken"}},
        }),
    )
    .await;
    mount_alternate_redirect(&server, "alt-1080", "https://alt.example/1080.m3u8").await;
    Mock::given(method("GET"))
        .and(path("/ajax/server"))
        .and(query_param("get", "alt-broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": {"url": "https://mapper.example/embed/x"}})),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Decode {
            stage: Stage::AlternateQuality,
            ..
        }
    ));
}

#[tokio::test]
async fn test_get_video_skips_empty_alternate_reference() {
    let server = MockServer::start().await;

    mount_primary_chain(&server, json!([])).await;
    mount_manifest(&server, MEDIA).await;
    mount_mapper(&server, json!({"frieren-1080p": {"sub": {"url": ""}}})).await;
    Mock::given(method("GET"))
        .and(path("/ajax/server"))
        .and(query_param("get", ""))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let streams = provider(&server)
        .get_video("frieren-xyz", EpisodeNumber::Whole(2), LanguageType::Sub)
        .await
        .unwrap();

    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].url, format!("{}/hls/ep2/master.m3u8", server.uri()));
}
