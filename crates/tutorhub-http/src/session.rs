//! Seam between the request layer and whoever owns the tokens

use async_trait::async_trait;

/// Source of bearer tokens for authenticated requests
///
/// The client holds one provider for its whole lifetime; swapping auth
/// behaviour means constructing a new client.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current access token, `None` when signed out
    fn access_token(&self) -> Option<String>;

    /// Obtain a fresh token after a 401; `true` when a new token is available
    async fn refresh_session(&self) -> bool;

    /// Called once a 401 could not be recovered
    fn on_unauthorized(&self);
}

/// Provider with a fixed token and no refresh capability
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl SessionProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }

    async fn refresh_session(&self) -> bool {
        false
    }

    fn on_unauthorized(&self) {}
}
