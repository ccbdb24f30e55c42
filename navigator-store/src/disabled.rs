//! Stand-ins used when no data store is configured. Reads come back empty,
//! writes and account calls fail with a clear error.

use async_trait::async_trait;
use navigator_core::gateway::{Collection, Filter, Query, Relation, RemoteGateway, Row};
use navigator_core::identity::{AuthProvider, AuthSession, Registration};
use navigator_core::{AuthError, AuthResult, GatewayError, GatewayResult};
use navigator_shared::Masked;

pub struct DisabledGateway;

#[async_trait]
impl RemoteGateway for DisabledGateway {
    async fn fetch_many(&self, _collection: Collection, _query: &Query) -> GatewayResult<Vec<Row>> {
        Ok(Vec::new())
    }

    async fn fetch_related(
        &self,
        _collection: Collection,
        _relation: &Relation,
        _query: &Query,
    ) -> GatewayResult<Vec<Row>> {
        Ok(Vec::new())
    }

    async fn insert(&self, _collection: Collection, _record: Row) -> GatewayResult<()> {
        Err(GatewayError::NotConfigured)
    }

    async fn delete_where(&self, _collection: Collection, _filters: &[Filter]) -> GatewayResult<()> {
        Err(GatewayError::NotConfigured)
    }
}

pub struct DisabledAuth;

#[async_trait]
impl AuthProvider for DisabledAuth {
    async fn sign_in(&self, _email: &str, _password: &Masked<String>) -> AuthResult<AuthSession> {
        Err(AuthError::Unavailable)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &Masked<String>,
        _display_name: &str,
    ) -> AuthResult<Registration> {
        Err(AuthError::Unavailable)
    }

    async fn sign_out(&self, _session: &AuthSession) -> AuthResult<()> {
        Ok(())
    }

    async fn recover(&self, _email: &str) -> AuthResult<()> {
        Err(AuthError::Unavailable)
    }

    async fn resolve(&self, _access_token: &Masked<String>) -> AuthResult<AuthSession> {
        Err(AuthError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_empty_writes_refused() {
        let gateway = DisabledGateway;
        assert!(gateway.fetch_many(Collection::Airports, &Query::new()).await.unwrap().is_empty());
        assert_eq!(
            gateway.insert(Collection::TrackedFlights, Row::Null).await.unwrap_err(),
            GatewayError::NotConfigured
        );
        assert_eq!(
            DisabledAuth.sign_in("a@b.c", &Masked::from("secret1")).await.unwrap_err(),
            AuthError::Unavailable
        );
    }
}
