//! Request primitives shared by the feed aggregator and the query controller.

use crate::api::ApiError;
use futures::stream::{self, StreamExt};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Races `fut` against `token`.
///
/// When the token fires first, `fut` is dropped in place, which tears down any
/// connection it holds, and `ApiError::Cancelled` is returned. An already
/// cancelled token never polls `fut` at all.
pub async fn with_cancellation<F, T>(token: &CancellationToken, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    if token.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

/// Runs every operation to completion with at most `limit` in flight.
///
/// Each outcome is captured on its own, so a failing operation neither cancels
/// nor delays its siblings. Results come back in input order regardless of
/// completion order, once all of them have settled.
pub async fn settle_all<I, Fut, T, E>(operations: I, limit: usize) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    // Unordered so a slow head never holds a slot past its own completion
    let mut settled: Vec<(usize, Result<T, E>)> = stream::iter(
        operations
            .into_iter()
            .enumerate()
            .map(|(index, op)| async move { (index, op.await) }),
    )
    .buffer_unordered(limit.max(1))
    .collect()
    .await;

    settled.sort_unstable_by_key(|(index, _)| *index);
    settled.into_iter().map(|(_, outcome)| outcome).collect()
}
