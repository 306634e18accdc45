//! Demonstrates the full session flow against a mock service: login mints the token pair,
//! an expired access token triggers the transparent refresh, and the retried
//! recommendation call succeeds.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use bookrec_client::{
	api::{ApiClient, LoginRequest, RecommendationRequest},
	endpoints::ServiceEndpoints,
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"expired-access\",\"refresh\":\"demo-refresh\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"fresh-access\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/recommendations/ai/")
				.header("authorization", "Bearer expired-access");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/recommendations/ai/")
				.header("authorization", "Bearer fresh-access");
			then.status(200).header("content-type", "application/json").body(
				"{\"recommendations\":[{\"title\":\"A Wizard of Earthsea\",\
				\"authors\":[\"Ursula K. Le Guin\"]}]}",
			);
		})
		.await;

	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let endpoints = ServiceEndpoints::from_base(Url::parse(&server.url("/"))?)?;
	let client = ApiClient::new(store, endpoints)
		.with_expiry_hook(|| println!("Session expired; a real app would route to login."));

	client.login(&LoginRequest::new("demo-reader", "demo-password")).await?;

	let mut preferences = RecommendationRequest::new(2);

	preferences.genres = "Fantasy".into();
	preferences.mood = "relaxing".into();
	preferences.favorite_books = vec!["The Tombs of Atuan".into()];

	for book in client.recommendations(&preferences).await? {
		println!("{} by {}", book.title, book.authors.join(", "));
	}

	println!("Refreshes performed: {}.", client.gateway().metrics.refresh_attempts());

	Ok(())
}
