use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use invoice_export::ContactResolver;
use invoice_export::resolver::NO_CONTACT;


/// Absent and empty ids resolve to the placeholder with zero network calls.
#[tokio::test]
async fn placeholder_for_missing_id_without_network() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let mut resolver = ContactResolver::new();

    assert_eq!(resolver.resolve(&mut client, None).await, NO_CONTACT);
    assert_eq!(resolver.resolve(&mut client, Some("")).await, NO_CONTACT);
    assert_eq!(resolver.cached_len(), 0);
}

/// A resolved name is memoized: the second call performs no additional
/// network request.
#[tokio::test]
async fn memoizes_resolved_names() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Acme Ltd" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let mut resolver = ContactResolver::new();

    assert_eq!(resolver.resolve(&mut client, Some("c-1")).await, "Acme Ltd");
    assert_eq!(resolver.resolve(&mut client, Some("c-1")).await, "Acme Ltd");
    assert_eq!(resolver.cached_len(), 1);
}

/// `display_name` backs up `name`.
#[tokio::test]
async fn falls_back_to_display_name() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-2/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "display_name": "Initech" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let mut resolver = ContactResolver::new();

    assert_eq!(resolver.resolve(&mut client, Some("c-2")).await, "Initech");
}

/// A contact without either display field resolves to the id marker.
#[tokio::test]
async fn falls_back_to_id_marker_when_names_absent() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let mut resolver = ContactResolver::new();

    assert_eq!(resolver.resolve(&mut client, Some("c-3")).await, "id:c-3");
}

/// The contacts API surface returns the raw record for callers that want it.
#[tokio::test]
async fn contacts_api_returns_raw_record() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Globex" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let record = client.contacts().get("c-5").await.expect("contact record");
    assert_eq!(record.display(), Some("Globex"));
}

/// A failed lookup does not fail the run; the fallback is memoized too.
#[tokio::test]
async fn lookup_failure_resolves_and_caches_id_marker() {
    test_utils::do_setup();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/c-9/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_utils::mock_client(&server, test_utils::token_store("token", None));
    let mut resolver = ContactResolver::new();

    assert_eq!(resolver.resolve(&mut client, Some("c-9")).await, "id:c-9");
    assert_eq!(resolver.resolve(&mut client, Some("c-9")).await, "id:c-9");
    assert_eq!(resolver.cached_len(), 1);
}
