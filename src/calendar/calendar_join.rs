//! The two ways concurrent import work is joined.
//
// Both policies let every task run to completion; neither cancels siblings when one fails.
// Keep them separate: batch creation must surface a failure, exception cleanup must not.

use futures::future::join_all;
use std::future::Future;

/// Wait for every task, then return all results or the first failure in task order.
pub async fn join_all_or_first_error<I, T, E>(tasks: I) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T, E>>,
{
    join_all(tasks).await.into_iter().collect()
}

/// Wait for every task and keep only the successes. Each failure is handed to `on_failure`
/// and otherwise dropped.
pub async fn join_all_suppressing<I, T, E, F>(tasks: I, mut on_failure: F) -> Vec<T>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T, E>>,
    F: FnMut(E),
{
    join_all(tasks)
        .await
        .into_iter()
        .filter_map(|result| result.map_err(&mut on_failure).ok())
        .collect()
}
