#![cfg(feature = "reqwest")]

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use httpmock::prelude::*;
// self
use bookrec_client::{
	_preludet::*,
	error::SessionError,
	gateway::Gateway,
	http::RequestDescriptor,
	session::SessionTokens,
	store::{MemoryStore, SessionStore},
};

async fn seed_session(store: &MemoryStore, access: &str, refresh: &str) {
	store
		.save(SessionTokens::new(access, refresh))
		.await
		.expect("Failed to seed session fixture into the store.");
}

fn refresh_url(server: &MockServer) -> Url {
	Url::parse(&server.url("/auth/refresh/")).expect("Mock refresh endpoint should parse.")
}

fn resource_url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path)).expect("Mock resource endpoint should parse.")
}

#[tokio::test]
async fn non_unauthorized_responses_pass_through_without_refresh() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/books").header("authorization", "Bearer A1");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let response = gateway
		.send(&RequestDescriptor::get(resource_url(&server, "/books")))
		.await
		.expect("A 200 response should pass straight through the gateway.");

	assert_eq!(response.status().as_u16(), 200);

	resource_mock.assert_async().await;
	refresh_mock.assert_calls_async(0).await;

	assert_eq!(gateway.metrics.requests(), 1);
	assert_eq!(gateway.metrics.retries(), 0);
}

#[tokio::test]
async fn other_error_statuses_are_returned_as_is() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/books");
			then.status(503);
		})
		.await;
	let response = gateway
		.send(&RequestDescriptor::get(resource_url(&server, "/books")))
		.await
		.expect("Non-401 errors should be returned to the caller, not retried.");

	assert_eq!(response.status().as_u16(), 503);

	resource_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unauthorized_response_refreshes_and_retries_with_the_new_token() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

	let stale_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/protected").header("authorization", "Bearer A1");
			then.status(401);
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/protected").header("authorization", "Bearer A2");
			then.status(200).header("content-type", "application/json").body("\"ok\"");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/").json_body(serde_json::json!({
				"refresh": "R1"
			}));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let response = gateway
		.send(&RequestDescriptor::get(resource_url(&server, "/protected")))
		.await
		.expect("The retried request should succeed with the rotated token.");

	assert_eq!(response.status().as_u16(), 200);
	assert_eq!(response.body().as_slice(), b"\"ok\"".as_slice());

	stale_mock.assert_async().await;
	fresh_mock.assert_async().await;
	refresh_mock.assert_async().await;

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert_eq!(snapshot.access_token.as_ref().map(|t| t.expose()), Some("A2"));
	assert_eq!(snapshot.refresh_token.as_ref().map(|t| t.expose()), Some("R1"));
	assert_eq!(gateway.metrics.retries(), 1);
	assert_eq!(gateway.metrics.refresh_attempts(), 1);
}

#[tokio::test]
async fn a_second_unauthorized_is_returned_without_another_refresh() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/protected");
			then.status(401);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let response = gateway
		.send(&RequestDescriptor::get(resource_url(&server, "/protected")))
		.await
		.expect("A 401 on the retry is a result, not an error.");

	assert_eq!(response.status().as_u16(), 401);

	resource_mock.assert_calls_async(2).await;
	refresh_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_refresh_fails_unauthorized_without_a_retry() {
	let server = MockServer::start_async().await;
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn SessionStore> = store_backend.clone();
	let expired = Arc::new(AtomicBool::new(false));
	let expired_flag = expired.clone();
	let gateway =
		Gateway::with_http_client(store, refresh_url(&server), test_reqwest_http_client())
			.with_expiry_hook(move || {
				expired_flag.store(true, Ordering::SeqCst);
			});

	seed_session(&store_backend, "A1", "R1").await;

	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/protected");
			then.status(401);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(403)
				.header("content-type", "application/json")
				.body("{\"error\":\"session expired\"}");
		})
		.await;
	let err = gateway
		.send(&RequestDescriptor::get(resource_url(&server, "/protected")))
		.await
		.expect_err("A rejected refresh should surface as an unauthorized request.");

	assert!(err.is_unauthorized());

	resource_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(1).await;

	let snapshot = store_backend.snapshot().await.expect("Store snapshot should succeed.");

	assert!(snapshot.is_empty(), "Both tokens must be destroyed after a rejected refresh.");
	assert!(expired.load(Ordering::SeqCst), "The expiry hook should have fired.");
}

#[tokio::test]
async fn anonymous_unauthorized_requests_fail_without_touching_the_refresh_endpoint() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/protected");
			then.status(401);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let err = gateway
		.send(&RequestDescriptor::get(resource_url(&server, "/protected")))
		.await
		.expect_err("An empty session cannot recover from a 401.");

	assert!(err.is_unauthorized());
	assert!(
		err.to_string().contains("Unauthorized"),
		"The gateway error should read as an unauthorized request.",
	);

	resource_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(0).await;

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert!(snapshot.is_empty());

	match err {
		Error::Unauthorized { source } =>
			assert!(matches!(*source, Error::Session(SessionError::MissingRefreshToken))),
		other => panic!("Expected an unauthorized error, got: {other:?}."),
	}
}
