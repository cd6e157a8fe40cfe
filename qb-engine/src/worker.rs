use std::future::Future;

use futures::stream::{
    self,
    StreamExt,
};
use qb_core::errors::*;

// Bounded fan-out over a list of items.  Items are dispatched in input order;
// an error does not cancel work already in flight or not yet started, because
// callers (diff in particular) need every item processed to report accurate
// stats.  All errors come back joined into one.
pub async fn run_parallel<T, F, Fut>(items: Vec<T>, parallelism: usize, f: F) -> EmptyResult
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = EmptyResult>,
{
    let errors: Vec<_> = stream::iter(items.into_iter().map(f))
        .buffered(parallelism.max(1))
        .filter_map(|res| async move { res.err() })
        .collect()
        .await;

    join_errors(errors)
}
