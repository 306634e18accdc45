// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gateway requests and refresh attempts.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
	requests: AtomicU64,
	retries: AtomicU64,
	refresh_attempts: AtomicU64,
	refresh_successes: AtomicU64,
	refresh_failures: AtomicU64,
	refresh_coalesced: AtomicU64,
}
impl GatewayMetrics {
	/// Returns the total number of gateway requests.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that were retried after a refresh.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh procedures started.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges that replaced the access token.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_successes.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges that failed.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failures.load(Ordering::Relaxed)
	}

	/// Returns the number of callers that reused a rotation performed by another flight.
	pub fn refresh_coalesced(&self) -> u64 {
		self.refresh_coalesced.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_coalesced(&self) {
		self.refresh_coalesced.fetch_add(1, Ordering::Relaxed);
	}
}
