// src/common/db_utils.rs

use std::future::Future;
use std::time::Duration;

use crate::common::error::AppError;

// ---
// Helper de prazo: toda ida ao banco respeita o deadline configurado
// ---
/// Executa uma operação do store com prazo. Estourado o prazo, a operação é
/// abandonada e vira `StoreTimeout` (transitório); a tabela de staging fica no
/// estado em que o comando cancelado a deixou.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StoreTimeout(deadline)),
    }
}
