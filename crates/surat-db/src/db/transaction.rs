//! Database transaction utilities.

use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;
use surat_core::AppError;

/// Execute a closure within a database transaction.
///
/// Begins a transaction, runs the closure, commits on success and rolls
/// back on error.
///
/// # Example
///
/// ```ignore
/// with_transaction(&pool, |tx| {
///     Box::pin(async move {
///         sqlx::query("INSERT INTO ...").execute(&mut **tx).await?;
///         sqlx::query("UPDATE ...").execute(&mut **tx).await?;
///         Ok(())
///     })
/// })
/// .await
/// ```
pub async fn with_transaction<F, R>(pool: &PgPool, f: F) -> Result<R, AppError>
where
    F: for<'a> FnOnce(
        &'a mut Transaction<'_, Postgres>,
    ) -> Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'a>>,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            // Rollback errors are secondary to the original failure.
            tx.rollback().await.ok();
            Err(e)
        }
    }
}
