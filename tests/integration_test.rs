//! Integration tests for egress-client against a local mock server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use httpmock::prelude::*;
use serde::{Deserialize, Serialize};

use egress_client::{
    Endpoint, EndpointRegistry, Error, ProviderClient, Transport, TransportConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UserAccount {
    full_name: String,
    email: String,
    status: String,
}

fn provider(endpoint: Endpoint) -> ProviderClient {
    let registry = Arc::new(EndpointRegistry::from_iter([("users", endpoint)]));
    let transport = Arc::new(Transport::new(TransportConfig::default()).unwrap());
    ProviderClient::new("users", registry, transport)
}

#[test]
fn injects_auth_header_from_endpoint() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/accounts")
            .header("X-Api-Key", "tok-123");
        then.status(200).json_body(serde_json::json!({"ok": true}));
    });

    let client = provider(
        Endpoint::new(server.base_url())
            .with_authorization("tok-123")
            .with_authorization_header("X-Api-Key"),
    );

    let body: serde_json::Value = client.get("/v1/accounts").unwrap().fetch().unwrap();
    assert_eq!(body["ok"], true);
    mock.assert();
}

#[test]
fn default_auth_header_is_authorization() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/ping")
            .header("Authorization", "Bearer abc");
        then.status(200).json_body(serde_json::json!({}));
    });

    let client = provider(Endpoint::new(server.base_url()).with_authorization("Bearer abc"));

    client.get("/ping").unwrap().send().unwrap();
    mock.assert();
}

#[test]
fn get_sends_default_json_content_type() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/ping")
            .header("content-type", "application/json");
        then.status(200).json_body(serde_json::json!({}));
    });

    let client = provider(Endpoint::new(server.base_url()));
    client.get("/ping").unwrap().send().unwrap();
    mock.assert();
}

#[test]
fn query_parameters_reach_the_wire() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("q", "rust http")
            .query_param("tag", "a")
            .query_param("tag", "b");
        then.status(200).json_body(serde_json::json!([]));
    });

    let client = provider(Endpoint::new(server.base_url()));
    client
        .get("/search")
        .unwrap()
        .query("q", "rust http")
        .query_all("tag", ["a", "b"])
        .send()
        .unwrap();
    mock.assert();
}

#[test]
fn post_encodes_typed_body_and_decodes_response() {
    let account = UserAccount {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        status: "ACTIVE".to_string(),
    };

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts")
            .json_body_obj(&account);
        then.status(200).json_body_obj(&account);
    });

    let client = provider(Endpoint::new(server.base_url()));
    let created: UserAccount = client
        .post("/v1/accounts", &account)
        .unwrap()
        .fetch()
        .unwrap();

    assert_eq!(created, account);
    mock.assert();
}

#[test]
fn put_and_delete_use_their_verbs() {
    let account = UserAccount {
        full_name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        status: "ACTIVE".to_string(),
    };

    let server = MockServer::start();
    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/v1/accounts/7").json_body_obj(&account);
        then.status(200).json_body_obj(&account);
    });
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/v1/accounts/7");
        then.status(200).json_body(serde_json::json!({"deleted": true}));
    });

    let client = provider(Endpoint::new(server.base_url()));
    client.put("/v1/accounts/7", &account).unwrap().send().unwrap();
    client.delete("/v1/accounts/7").unwrap().send().unwrap();

    put_mock.assert();
    delete_mock.assert();
}

#[test]
fn gateway_prefix_routes_through_gateway_path() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/partner-api/v1/ping");
        then.status(200).json_body(serde_json::json!({}));
    });

    let client = provider(Endpoint::new(server.base_url()).with_gateway_prefix("partner-api"));
    client.get("/v1/ping").unwrap().send().unwrap();
    mock.assert();
}

#[test]
fn http_404_surfaces_as_client_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/accounts/404");
        then.status(404).body("no such account");
    });

    let client = provider(Endpoint::new(server.base_url()));
    let err = client
        .get("/v1/accounts/404")
        .unwrap()
        .fetch::<UserAccount>()
        .unwrap_err();

    match err {
        Error::Client { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such account");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[test]
fn http_500_surfaces_as_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/boom");
        then.status(503).body("maintenance");
    });

    let client = provider(Endpoint::new(server.base_url()));
    let err = client.get("/boom").unwrap().send().unwrap_err();

    match err {
        Error::Server { status, .. } => assert_eq!(status, 503),
        other => panic!("expected server error, got {other:?}"),
    }
}

#[test]
fn malformed_body_surfaces_as_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1/accounts/1");
        then.status(200).body("not json at all");
    });

    let client = provider(Endpoint::new(server.base_url()));
    let err = client
        .get("/v1/accounts/1")
        .unwrap()
        .fetch::<UserAccount>()
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[test]
fn unknown_provider_key_is_a_configuration_error() {
    let registry = Arc::new(EndpointRegistry::default());
    let transport = Arc::new(Transport::new(TransportConfig::default()).unwrap());
    let client = ProviderClient::new("nowhere", registry, transport);

    let err = client.get("/ping").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn unreachable_host_fails_within_the_connect_timeout_bound() {
    let registry = Arc::new(EndpointRegistry::from_iter([(
        "dead",
        Endpoint::new("http://10.255.255.1:81"),
    )]));
    let config = TransportConfig::builder()
        .read_timeout(Duration::from_secs(2))
        .connect_timeout(Duration::from_millis(250))
        .build();
    let transport = Arc::new(Transport::new(config).unwrap());
    let client = ProviderClient::new("dead", registry, transport);

    let start = Instant::now();
    let err = client.get("/ping").unwrap().send().unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_transport(), "expected transport error, got {err:?}");
    assert!(
        elapsed < Duration::from_secs(5),
        "took too long to fail: {elapsed:?}"
    );
}

#[test]
fn saturated_pool_serializes_requests_instead_of_failing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .delay(Duration::from_millis(300))
            .json_body(serde_json::json!({}));
    });

    let registry = Arc::new(EndpointRegistry::from_iter([(
        "users",
        Endpoint::new(server.base_url()),
    )]));
    let config = TransportConfig::builder().max_total(1).max_per_route(1).build();
    let transport = Arc::new(Transport::new(config).unwrap());

    let start = Instant::now();
    std::thread::scope(|scope| {
        for _ in 0..2 {
            let registry = Arc::clone(&registry);
            let transport = Arc::clone(&transport);
            scope.spawn(move || {
                let client = ProviderClient::new("users", registry, transport);
                client.get("/slow").unwrap().send().unwrap();
            });
        }
    });

    // With a single slot the two 300ms calls cannot overlap.
    assert!(start.elapsed() >= Duration::from_millis(550));
}

#[test]
fn json_body_round_trips() {
    let account = UserAccount {
        full_name: "Alan Turing".to_string(),
        email: "alan@example.com".to_string(),
        status: "PENDING".to_string(),
    };

    let encoded = serde_json::to_vec(&account).unwrap();
    let decoded: UserAccount = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(decoded, account);
}
