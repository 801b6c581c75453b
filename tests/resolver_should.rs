// full pipeline against a mock of the site: listing page, channel pages,
// server lookup, plus the retry wrapper on its own
use daddyhd_resolver::resolver::error::ResolveError;
use daddyhd_resolver::resolver::http::get_text_with_retry;
use daddyhd_resolver::resolver::model::ChannelDescriptor;
use daddyhd_resolver::{ChannelResolver, DaddyHdService, SiteAdapter};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> SiteAdapter {
    let mut adapter = SiteAdapter::current();
    adapter.index_url = format!("{}/24-7-channels.php", server.uri());
    adapter
}

fn descriptor(server: &MockServer, slug: &str, name: &str) -> ChannelDescriptor {
    ChannelDescriptor {
        name: name.to_string(),
        page_url: format!("{}/stream/{}", server.uri(), slug),
    }
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_channel_key_and_lookup_compose_the_stream_url() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/stream/stream-1.php",
        r#"<script>var channelKey = "abc123";</script>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/server_lookup.php"))
        .and(query_param("channel_id", "abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"server_key":"s1"}"#),
        )
        .mount(&server)
        .await;

    let resolver = DaddyHdService::new(adapter_for(&server));
    let channel = resolver
        .resolve_channel(&descriptor(&server, "stream-1.php", "Alpha TV"))
        .await
        .unwrap();

    assert_eq!(channel.stream_url, "https://s1new.iosplayer.ru/s1/abc123/mono.m3u8");
    assert_eq!(channel.name, "Alpha TV");
    assert_eq!(channel.group, "DaddyHD");
    assert_eq!(channel.logo, "");
    assert_eq!(channel.headers.referer, format!("{}/", server.uri()));
}

#[tokio::test]
async fn test_embedded_frame_hop_with_reserved_token() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/stream/stream-5.php",
        r#"<html><body><iframe id="thatframe" src="/player/embed-5.php"></iframe></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/player/embed-5.php",
        r#"<script>var channelKey = "xyz";</script>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/server_lookup.php"))
        .and(query_param("channel_id", "xyz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"server_key":"top1/cdn"}"#),
        )
        .mount(&server)
        .await;

    let resolver = DaddyHdService::new(adapter_for(&server));
    let channel = resolver
        .resolve_channel(&descriptor(&server, "stream-5.php", "Frame TV"))
        .await
        .unwrap();

    assert_eq!(
        channel.stream_url,
        "https://top1.iosplayer.ru/top1/cdn/xyz/mono.m3u8"
    );
}

#[tokio::test]
async fn test_invalid_lookup_json_only_drops_that_channel() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/24-7-channels.php",
        r#"<html><body>
            <div class="grid-item"><a href="/stream/stream-1.php">Alpha TV</a></div>
            <div class="grid-item"><a href="/stream/stream-3.php">Gamma Sports</a></div>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/stream/stream-1.php",
        r#"<script>var channelKey = "abc123";</script>"#,
    )
    .await;
    mount_page(
        &server,
        "/stream/stream-3.php",
        r#"<script>var channelKey = "broken";</script>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/server_lookup.php"))
        .and(query_param("channel_id", "abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"server_key":"s1"}"#),
        )
        .mount(&server)
        .await;
    // the lookup for the second key answers 200 with garbage
    Mock::given(method("GET"))
        .and(path("/server_lookup.php"))
        .and(query_param("channel_id", "broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
        .mount(&server)
        .await;

    let resolver = DaddyHdService::new(adapter_for(&server));
    let channels = resolver.resolve_all().await.unwrap();

    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].name, "Alpha TV");
    assert_eq!(
        channels[0].stream_url,
        "https://s1new.iosplayer.ru/s1/abc123/mono.m3u8"
    );
}

#[tokio::test]
async fn test_direct_media_url_skips_the_lookup_entirely() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/stream/stream-7.php",
        r#"<script>player.setup({ source:'https://cdn.example.com/ch7/mono.m3u8' });</script>"#,
    )
    .await;

    let resolver = DaddyHdService::new(adapter_for(&server));
    let channel = resolver
        .resolve_channel(&descriptor(&server, "stream-7.php", "Direct TV"))
        .await
        .unwrap();

    assert_eq!(channel.stream_url, "https://cdn.example.com/ch7/mono.m3u8");
}

#[tokio::test]
async fn test_unmatchable_page_is_a_parse_error() {
    let server = MockServer::start().await;

    mount_page(&server, "/stream/stream-9.php", "<html><body>moved</body></html>").await;

    let resolver = DaddyHdService::new(adapter_for(&server));
    let result = resolver
        .resolve_channel(&descriptor(&server, "stream-9.php", "Gone TV"))
        .await;

    assert!(matches!(result, Err(ResolveError::Parse(_))));
}

#[tokio::test]
async fn test_retry_wrapper_recovers_after_two_failures() {
    let server = MockServer::start().await;

    // two 500s, then the real answer
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let body = get_text_with_retry(&client, &format!("{}/flaky", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_persistent_failure_surfaces_the_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let result = get_text_with_retry(&client, &format!("{}/dead", server.uri()), None).await;

    match result {
        Err(ResolveError::HttpStatus { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected an http status error, got {:?}", other.map(|_| ())),
    }
}
