//! End-to-end tests for the Plex.tv account client.
//!
//! These tests run the reqwest transport against mock servers, so the
//! full request path (headers, query strings, bodies) is exercised.

use plex_account::{Account, AccountError, ClientConfig, FetchOptions, Method, ReqwestClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestClient {
    let config = ClientConfig::new(server.uri())
        .with_client_identifier("test-client")
        .with_product("Plex Account Tests", "1.0");
    ReqwestClient::new(config).unwrap()
}

/// Fails verification if any request carries a session token.
async fn forbid_token(server: &MockServer) {
    Mock::given(header_exists("X-Plex-Token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// =============================================================================
// Header Tests
// =============================================================================

mod headers {
    use super::*;
    use plex_account::HttpClient;

    #[tokio::test]
    async fn test_anonymous_headers_match_client() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let account = Account::new(&client);

        assert!(account.auth_token().is_none());
        assert_eq!(account.headers(), client.headers());
        assert!(!account.headers().contains_key("X-Plex-Token"));
    }

    #[tokio::test]
    async fn test_token_header_added() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let mut expected = client.headers();
        expected.insert("X-Plex-Token".to_string(), "AUTH_TOKEN".to_string());

        assert_eq!(account.headers(), expected);
        // Idempotent
        assert_eq!(account.headers(), account.headers());
    }

    #[tokio::test]
    async fn test_client_headers_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/user"))
            .and(header("X-Plex-Client-Identifier", "test-client"))
            .and(header("X-Plex-Product", "Plex Account Tests"))
            .and(header("X-Plex-Token", "AUTH_TOKEN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        assert_eq!(account.info().await.unwrap(), json!({"id": 1}));
    }
}

// =============================================================================
// Fetch Tests
// =============================================================================

mod fetch {
    use super::*;

    #[tokio::test]
    async fn test_fetch_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/path"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "value"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        let value = account.fetch("/path", FetchOptions::default()).await.unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[tokio::test]
    async fn test_fetch_with_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/path"))
            .and(query_param("name", "plex"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        let options = FetchOptions::new().param("name", "plex");
        let value = account.fetch("/path", options).await.unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_fetch_with_method_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/v2/user"))
            .and(body_json(json!({"locale": "en"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"locale": "en"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let options = FetchOptions::new()
            .method(Method::PUT)
            .json(json!({"locale": "en"}));
        let value = account.fetch("/api/v2/user", options).await.unwrap();
        assert_eq!(value["locale"], "en");
    }

    #[tokio::test]
    async fn test_fetch_error_carries_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/path"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        match account.fetch("/path", FetchOptions::default()).await {
            Err(AccountError::Http { status, response }) => {
                assert_eq!(status, 404);
                assert_eq!(response, json!({"error": "Not found"}));
            }
            other => panic!("Expected Http error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/path"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        let result = account.fetch("/path", FetchOptions::default()).await;
        assert!(matches!(result, Err(AccountError::Json(_))));
    }

    #[tokio::test]
    async fn test_fetch_xml() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/path"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<container size="20"><name>Plex</name></container>"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        let doc = account
            .fetch_xml("/path", FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(
            doc.to_json(),
            json!({"container": {"$": {"size": "20"}, "name": ["Plex"]}})
        );
    }

    #[tokio::test]
    async fn test_fetch_invalid_xml() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/path"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<open><close></open>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        let result = account.fetch_xml("/path", FetchOptions::default()).await;
        assert!(matches!(result, Err(AccountError::Xml(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = ReqwestClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();
        let account = Account::new(&client);

        match account.info().await {
            Err(AccountError::Unreachable(_)) | Err(AccountError::Request(_)) => {}
            other => panic!("Expected transport error, got: {:?}", other),
        }
    }
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_authenticate_success() {
        let server = MockServer::start().await;
        forbid_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/users/sign_in.json"))
            .and(body_json(json!({"username": "user", "password": "pass"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "user": {"authToken": "AUTH_TOKEN", "username": "user"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut account = Account::new(&client);

        let user = account.authenticate("user", "pass").await.unwrap();

        assert_eq!(user, json!({"authToken": "AUTH_TOKEN", "username": "user"}));
        assert_eq!(account.auth_token(), Some("AUTH_TOKEN"));
        assert_eq!(account.headers()["X-Plex-Token"], "AUTH_TOKEN");
    }

    #[tokio::test]
    async fn test_authenticate_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/sign_in.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Invalid email, username, or password."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut account = Account::new(&client);

        let err = account.authenticate("user", "wrong").await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(
            err.response(),
            Some(&json!({"error": "Invalid email, username, or password."}))
        );
        assert!(account.auth_token().is_none());
    }

    #[tokio::test]
    async fn test_token_used_after_authenticate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/sign_in.json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "user": {"authToken": "AUTH_TOKEN"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/user"))
            .and(header("X-Plex-Token", "AUTH_TOKEN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "user"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut account = Account::new(&client);

        account.authenticate("user", "pass").await.unwrap();
        let info = account.info().await.unwrap();
        assert_eq!(info["username"], "user");
    }

    #[tokio::test]
    async fn test_info_without_token_omits_header() {
        let server = MockServer::start().await;
        forbid_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/v2/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{"code": 1001, "message": "User could not be authenticated"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::new(&client);

        let err = account.info().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}

// =============================================================================
// Resource Tests
// =============================================================================

mod resources {
    use super::*;

    async fn mount_resources(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/api/resources"))
            .and(query_param("includeHttps", "1"))
            .and(query_param("includeRelay", "1"))
            .and(header("X-Plex-Token", "AUTH_TOKEN"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_empty_resources() {
        let server = MockServer::start().await;
        mount_resources(&server, r#"<MediaContainer size="0"></MediaContainer>"#).await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let devices = account.resources().await.unwrap();
        assert_eq!(devices.len(), 0);
    }

    #[tokio::test]
    async fn test_resources_in_document_order() {
        let server = MockServer::start().await;
        mount_resources(
            &server,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<MediaContainer size="2">
  <Device name="Office" clientIdentifier="one" provides="server" owned="1">
    <Connection protocol="http" address="10.0.0.2" port="32400" uri="http://10.0.0.2:32400" local="1"/>
  </Device>
  <Device name="Laptop" clientIdentifier="two" provides="client,player"/>
</MediaContainer>"#,
        )
        .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let devices = account.resources().await.unwrap();
        let ids: Vec<_> = devices.iter().map(|d| d.client_identifier.as_str()).collect();
        assert_eq!(ids, vec!["one", "two"]);
        assert_eq!(
            devices.get(0).unwrap().connections[0].uri.as_deref(),
            Some("http://10.0.0.2:32400")
        );
    }

    #[tokio::test]
    async fn test_servers_filter() {
        let server = MockServer::start().await;
        mount_resources(
            &server,
            r#"<MediaContainer size="3">
  <Device clientIdentifier="1" provides="server"/>
  <Device clientIdentifier="2" provides="client"/>
  <Device clientIdentifier="3" provides="client,server"/>
</MediaContainer>"#,
        )
        .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let servers = account.servers().await.unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers.get(0).unwrap().client_identifier, "1");
        assert_eq!(servers.get(1).unwrap().client_identifier, "3");
    }

    #[tokio::test]
    async fn test_resources_with_extra_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/resources"))
            .and(query_param("includeHttps", "1"))
            .and(query_param("includeIPv6", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"<MediaContainer size="0"/>"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let options = FetchOptions::new().param("includeIPv6", 1);
        assert!(account.resources_with(options).await.unwrap().is_empty());
    }
}

// =============================================================================
// Device Tests
// =============================================================================

mod devices {
    use super::*;

    #[tokio::test]
    async fn test_devices_pass_through() {
        let server = MockServer::start().await;

        let payload = json!([
            {"id": 123, "name": "Phone", "product": "Plex for iOS"},
            {"id": 456, "name": "TV", "product": "Plex for LG"}
        ]);

        Mock::given(method("GET"))
            .and(path("/devices.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        assert_eq!(account.devices().await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_remove_device() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/devices/123.json"))
            .and(header("X-Plex-Token", "AUTH_TOKEN"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        account.remove_device(123).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_device_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/devices/999.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account = Account::with_token(&client, "AUTH_TOKEN");

        let err = account.remove_device("999").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.response(), Some(&json!("Not Found")));
    }
}
