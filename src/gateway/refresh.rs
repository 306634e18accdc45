//! Token refresh procedure with single-flight coalescing and fail-closed teardown.
//!
//! The gateway exposes [`Gateway::refresh_access_token`] so callers can rotate the access
//! token explicitly; [`Gateway::send`] reaches the same exchange through its 401 path. Every
//! rotation runs under the gateway's refresh guard, and a caller whose 401 raced a rotation
//! that already completed reuses the rotated token instead of issuing a redundant exchange.
//! A rejected exchange clears the whole store and fires the expiry hook: any refresh failure
//! is session termination, not a transient error.

// self
use crate::{
	_prelude::*,
	error::SessionError,
	gateway::Gateway,
	http::{GatewayHttpClient, RequestDescriptor},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::TokenSecret,
};

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshGrant {
	access: String,
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Exchanges the stored refresh token for a new access token.
	///
	/// Fails with [`SessionError::MissingRefreshToken`] before any network call when the
	/// store holds no refresh token. A non-success endpoint response clears the entire store,
	/// fires the expiry hook, and fails with [`SessionError::RefreshRejected`]. On success
	/// the new access token is written to the store before it is returned, so a retried
	/// request can never read a stale value.
	pub async fn refresh_access_token(&self) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;

				self.refresh_locked().await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Refresh path taken by [`Gateway::send`] after a 401.
	///
	/// `stale` is the access token the failed attempt carried. If the store already holds a
	/// different token by the time the guard is acquired, another flight rotated it while
	/// this caller was waiting; the rotated token is reused without a second exchange.
	pub(crate) async fn refresh_after_unauthorized(
		&self,
		stale: Option<&TokenSecret>,
	) -> Result<TokenSecret> {
		let _singleflight = self.refresh_guard.lock().await;

		if let Some(current) = self.store.access_token().await? {
			if stale.is_none_or(|stale| stale.expose() != current.expose()) {
				self.metrics.record_refresh_coalesced();

				return Ok(current);
			}
		}

		self.refresh_locked().await
	}

	async fn refresh_locked(&self) -> Result<TokenSecret> {
		self.metrics.record_refresh_attempt();

		let result = self.refresh_exchange().await;

		match &result {
			Ok(_) => self.metrics.record_refresh_success(),
			Err(_) => self.metrics.record_refresh_failure(),
		}

		result
	}

	async fn refresh_exchange(&self) -> Result<TokenSecret> {
		let refresh =
			self.store.refresh_token().await?.ok_or(SessionError::MissingRefreshToken)?;
		let request = RequestDescriptor::post(self.refresh_endpoint.clone())
			.json(&RefreshRequest { refresh: refresh.expose() })?;
		let response = self.execute(&request, None).await?;
		let status = response.status();

		if !status.is_success() {
			self.store.clear().await?;
			self.notify_session_expired();

			return Err(SessionError::RefreshRejected { status: status.as_u16() }.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let grant: RefreshGrant = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| SessionError::RefreshResponseParse {
				source,
				status: status.as_u16(),
			})?;
		let access = TokenSecret::new(grant.access);

		self.store.swap_access(access.clone()).await?;

		Ok(access)
	}
}
