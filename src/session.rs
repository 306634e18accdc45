//! Session token material: redacted secrets and the persisted token pair.

pub mod record;
pub mod secret;

pub use record::{SessionSnapshot, SessionTokens};
pub use secret::TokenSecret;
