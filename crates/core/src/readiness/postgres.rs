use super::{StoreProbe, strip_driver_suffix};
use crate::error::ProbeError;
use async_trait::async_trait;
use sqlx::{Connection, PgConnection};

/// Opens a single connection and runs `SELECT 1`.
pub struct PostgresProbe;

#[async_trait]
impl StoreProbe for PostgresProbe {
    async fn ping(&self, target: &str) -> Result<(), ProbeError> {
        let url = strip_driver_suffix(target);
        let mut conn = PgConnection::connect(&url).await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_an_error() {
        // Port 1 on loopback is never a postgres server.
        let err = PostgresProbe
            .ping("postgresql://user:pw@127.0.0.1:1/app")
            .await
            .unwrap_err();
        assert_eq!(err.category(), "ConnectionError");
    }
}
