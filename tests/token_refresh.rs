use miette::Result;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use invoice_export::Error;


fn token_endpoint_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "fresh-token",
        "token_type": "bearer",
        "expires_in": 1800,
        "refresh_token": "rotated-refresh"
    }))
}

/// A 401 triggers exactly one refresh, and the retry carries the new token.
#[tokio::test]
async fn refreshes_once_and_retries_with_new_token() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(token_endpoint_response())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = test_utils::token_store("stale-token", Some("initial-refresh"));
    let mut client = test_utils::mock_client(&server, tokens);

    let body: serde_json::Value = client
        .get("/invoices/", &Vec::<(String, String)>::new())
        .await
        .map_err(miette::Report::from)?;
    assert_eq!(body, json!({ "results": [] }));

    // The rotated refresh token replaced the initial one.
    assert!(client.tokens().has_refresh_token());
    assert_eq!(client.tokens().access_token().secret(), "fresh-token");

    Ok(())
}

/// A second consecutive 401 is returned to the caller, not retried again:
/// at most two requests per logical call.
#[tokio::test]
async fn second_unauthorized_is_surfaced_not_retried() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(token_endpoint_response())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let tokens = test_utils::token_store("stale-token", Some("initial-refresh"));
    let mut client = test_utils::mock_client(&server, tokens);

    let result: invoice_export::Result<serde_json::Value> = client
        .get("/invoices/", &Vec::<(String, String)>::new())
        .await;

    assert!(
        matches!(result, Err(Error::AuthExpired { .. })),
        "expected AuthExpired, got: {result:?}"
    );
}

/// A refresh without a held refresh token is fatal and never reaches the
/// token endpoint.
#[tokio::test]
async fn missing_refresh_token_is_fatal() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(token_endpoint_response())
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = test_utils::token_store("stale-token", None);
    let mut client = test_utils::mock_client(&server, tokens);

    let result: invoice_export::Result<serde_json::Value> = client
        .get("/invoices/", &Vec::<(String, String)>::new())
        .await;

    assert!(
        matches!(result, Err(Error::NoRefreshToken)),
        "expected NoRefreshToken, got: {result:?}"
    );
}

/// A successful refresh persists the new credential pair to the cache file.
#[tokio::test]
async fn refresh_persists_credential_pair() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(token_endpoint_response())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices/"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let cache_path = dir.path().join("tokens.json");
    let tokens = test_utils::token_store("stale-token", Some("initial-refresh"))
        .with_cache_path(&cache_path);
    let mut client = test_utils::mock_client(&server, tokens);

    let _: serde_json::Value = client
        .get("/invoices/", &Vec::<(String, String)>::new())
        .await
        .map_err(miette::Report::from)?;

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cache_path).expect("cache file"))
            .expect("cache json");
    assert_eq!(persisted["access_token"], "fresh-token");
    assert_eq!(persisted["refresh_token"], "rotated-refresh");

    // A later run recovers the rotated pair from the cache.
    let reloaded = invoice_export::TokenStore::load(&cache_path).map_err(miette::Report::from)?;
    assert_eq!(reloaded.access_token().secret(), "fresh-token");

    Ok(())
}

/// The refresh token is replaced only when the endpoint rotates it.
#[test]
fn apply_refresh_keeps_unrotated_refresh_token() -> Result<()> {
    use oauth2::AccessToken;

    let mut store = test_utils::token_store("old-access", Some("keep-me"));
    store
        .apply_refresh(AccessToken::new("new-access".to_string()), None)
        .map_err(miette::Report::from)?;

    assert_eq!(store.access_token().secret(), "new-access");
    assert_eq!(store.refresh_token().map_err(miette::Report::from)?.secret(), "keep-me");
    Ok(())
}
