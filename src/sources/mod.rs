/// Sources module
///
/// Token-issuing collaborators of the cache. The cache only needs the raw
/// token endpoint body; parsing stays with the cache so every source is held
/// to the same success rule.
use crate::cache::error::TokenRefreshError;

pub mod oauth2;

pub trait RefreshTokenExchange: Send + Sync {
    /// Run one refresh-token grant and return the response body as received.
    fn exchange_refresh_token(
        &self,
    ) -> impl std::future::Future<Output = Result<String, TokenRefreshError>> + Send;
}
