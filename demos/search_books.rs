//! Demonstrates the public catalog search endpoint, which needs no session at all.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use bookrec_client::{
	api::ApiClient,
	endpoints::ServiceEndpoints,
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let query = env::args().nth(1).unwrap_or_else(|| "earthsea".into());
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/recommendations/search/");
			then.status(200).header("content-type", "application/json").body(
				"{\"results\":[{\"title\":\"The Farthest Shore\",\
				\"authors\":[\"Ursula K. Le Guin\"]}]}",
			);
		})
		.await;

	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let endpoints = ServiceEndpoints::from_base(Url::parse(&server.url("/"))?)?;
	let client = ApiClient::new(store, endpoints);
	let results = client.search(&query).await?;

	println!("{} result(s) for {query:?}:", results.len());

	for book in results {
		println!("- {} by {}", book.title, book.authors.join(", "));
	}

	Ok(())
}
