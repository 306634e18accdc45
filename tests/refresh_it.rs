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
	session::{SessionTokens, TokenSecret},
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

#[tokio::test]
async fn refresh_rotates_the_access_token_and_updates_the_store() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

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
	let token = gateway
		.refresh_access_token()
		.await
		.expect("Refresh against a healthy endpoint should succeed.");

	assert_eq!(token.expose(), "A2");

	refresh_mock.assert_async().await;

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert_eq!(snapshot.access_token.as_ref().map(|t| t.expose()), Some("A2"));
	assert_eq!(snapshot.refresh_token.as_ref().map(|t| t.expose()), Some("R1"));
	assert_eq!(gateway.metrics.refresh_successes(), 1);
}

#[tokio::test]
async fn missing_refresh_token_fails_before_any_network_call() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;

	// Access-only sessions can exist (a swap on an empty store); they still cannot refresh.
	store
		.swap_access(TokenSecret::from("A1"))
		.await
		.expect("Swapping into an empty store should succeed.");

	let err = gateway
		.refresh_access_token()
		.await
		.expect_err("Refreshing without a refresh token should fail fast.");

	assert!(matches!(err, Error::Session(SessionError::MissingRefreshToken)));

	refresh_mock.assert_calls_async(0).await;

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert_eq!(snapshot.access_token.as_ref().map(|t| t.expose()), Some("A1"));
}

#[tokio::test]
async fn rejected_refresh_clears_the_session_and_fires_the_hook() {
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

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"token is blacklisted\"}");
		})
		.await;
	let err = gateway
		.refresh_access_token()
		.await
		.expect_err("A rejected refresh should fail closed.");

	assert!(matches!(err, Error::Session(SessionError::RefreshRejected { status: 401 })));

	refresh_mock.assert_async().await;

	let snapshot = store_backend.snapshot().await.expect("Store snapshot should succeed.");

	assert!(snapshot.is_empty(), "Fail-closed teardown must destroy both tokens.");
	assert!(expired.load(Ordering::SeqCst));
	assert_eq!(gateway.metrics.refresh_failures(), 1);
}

#[tokio::test]
async fn duplicate_refreshes_leave_the_last_written_token() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

	let first_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let first = gateway
		.refresh_access_token()
		.await
		.expect("First refresh should succeed.");

	assert_eq!(first.expose(), "A2");

	first_mock.delete_async().await;

	let second_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A3\"}");
		})
		.await;
	let second = gateway
		.refresh_access_token()
		.await
		.expect("Second refresh should succeed.");

	assert_eq!(second.expose(), "A3");

	second_mock.assert_async().await;

	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert_eq!(snapshot.access_token.as_ref().map(|t| t.expose()), Some("A3"));
	assert_eq!(snapshot.refresh_token.as_ref().map(|t| t.expose()), Some("R1"));
	assert_eq!(gateway.metrics.refresh_attempts(), 2);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_a_single_refresh() {
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
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"A2\"}");
		})
		.await;
	let request = RequestDescriptor::get(
		Url::parse(&server.url("/protected")).expect("Mock resource endpoint should parse."),
	);
	let (first, second) = tokio::join!(gateway.send(&request), gateway.send(&request));
	let first = first.expect("First concurrent request should succeed after the refresh.");
	let second = second.expect("Second concurrent request should reuse the rotated token.");

	assert_eq!(first.status().as_u16(), 200);
	assert_eq!(second.status().as_u16(), 200);

	refresh_mock.assert_calls_async(1).await;
	stale_mock.assert_calls_async(2).await;
	fresh_mock.assert_calls_async(2).await;

	assert_eq!(gateway.metrics.refresh_attempts(), 1);
	assert_eq!(gateway.metrics.refresh_coalesced(), 1);
}

#[tokio::test]
async fn malformed_refresh_body_fails_without_teardown() {
	let server = MockServer::start_async().await;
	let (gateway, store) = build_reqwest_test_gateway(refresh_url(&server));

	seed_session(&store, "A1", "R1").await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"A2\"}");
		})
		.await;
	let err = gateway
		.refresh_access_token()
		.await
		.expect_err("A success status with an unreadable body cannot mint a token.");

	assert!(matches!(err, Error::Session(SessionError::RefreshResponseParse { .. })));

	refresh_mock.assert_async().await;

	// Only a rejected status tears the session down; a parse failure leaves it intact.
	let snapshot = store.snapshot().await.expect("Store snapshot should succeed.");

	assert_eq!(snapshot.access_token.as_ref().map(|t| t.expose()), Some("A1"));
	assert_eq!(snapshot.refresh_token.as_ref().map(|t| t.expose()), Some("R1"));
}
