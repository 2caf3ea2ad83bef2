use harvester_core::{Attachment, CategoryRef, ChannelRef, FetchedMessage};
use harvester_engine::{ChannelClient, ClientFailure, DiscordRestClient, RestSettings};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DiscordRestClient {
    DiscordRestClient::new(RestSettings {
        api_base: format!("{}/api/v9", server.uri()),
        token: Some("secret-token".into()),
        ..RestSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn resolves_channel_with_cached_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "100", "name": "memes", "type": 0, "parent_id": "900"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "101", "name": "art", "type": 0, "parent_id": "900"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/900"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "900", "name": "Media", "type": 4
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let memes = client.resolve_channel("100").await.unwrap().unwrap();
    let art = client.resolve_channel("101").await.unwrap().unwrap();

    assert_eq!(memes, ChannelRef::new("100", "memes").with_category("900", "Media"));
    assert_eq!(
        art.category,
        Some(CategoryRef {
            id: "900".into(),
            name: "Media".into()
        })
    );
}

#[tokio::test]
async fn missing_channel_resolves_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).resolve_channel("404").await.unwrap(), None);
}

#[tokio::test]
async fn first_page_has_no_cursor_and_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/100/messages"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("before"))
        .and(header("authorization", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1200", "attachments": [
                { "filename": "cat.png", "url": "https://cdn.example/cat.png" },
                { "filename": "notes.txt", "url": "https://cdn.example/notes.txt" }
            ]},
            { "id": "1100", "content": "no attachments here" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .fetch_messages_before("100", None, 100)
        .await
        .unwrap();

    assert_eq!(
        page,
        vec![
            FetchedMessage::new(
                1200,
                vec![
                    Attachment {
                        name: "cat.png".into(),
                        url: "https://cdn.example/cat.png".into()
                    },
                    Attachment {
                        name: "notes.txt".into(),
                        url: "https://cdn.example/notes.txt".into()
                    },
                ]
            ),
            FetchedMessage::new(1100, Vec::new()),
        ]
    );
}

#[tokio::test]
async fn later_pages_pass_the_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/100/messages"))
        .and(query_param("before", "1100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .fetch_messages_before("100", Some(1100), 100)
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn service_errors_and_bad_bodies_are_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v9/channels/2/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "abc" }])))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let err = client.fetch_messages_before("1", None, 100).await.unwrap_err();
    assert_eq!(err.kind, ClientFailure::Http(500));
    let err = client.fetch_messages_before("2", None, 100).await.unwrap_err();
    assert_eq!(err.kind, ClientFailure::Decode);
}

#[tokio::test]
async fn guild_listing_keeps_text_channels_with_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v9/guilds/77/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "3", "name": "art", "type": 0, "parent_id": "9", "position": 2 },
            { "id": "9", "name": "Media", "type": 4, "position": 0 },
            { "id": "4", "name": "voice", "type": 2, "parent_id": "9", "position": 3 },
            { "id": "2", "name": "news", "type": 5, "position": 1 },
            { "id": "1", "name": "memes", "type": 0, "parent_id": "9", "position": 0 }
        ])))
        .mount(&server)
        .await;

    let channels = client_for(&server).guild_channels("77").await.unwrap();

    assert_eq!(
        channels,
        vec![
            ChannelRef::new("1", "memes").with_category("9", "Media"),
            ChannelRef::new("2", "news"),
            ChannelRef::new("3", "art").with_category("9", "Media"),
        ]
    );
}

#[test]
fn rejects_unusable_api_base() {
    let err = DiscordRestClient::new(RestSettings {
        api_base: "not a url".into(),
        ..RestSettings::default()
    })
    .err()
    .unwrap();
    assert_eq!(err.kind, ClientFailure::InvalidUrl);
}
