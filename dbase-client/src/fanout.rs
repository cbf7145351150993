//! Concurrent fan-out with position-preserving joins
//!
//! Every future of a phase is started together (up to an optional in-flight
//! cap) and the call suspends until all of them settle. Outputs come back in
//! submission order regardless of completion order.

use crate::error::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

fn in_flight(limit: Option<usize>, len: usize) -> usize {
    limit.unwrap_or(len).clamp(1, len.max(1))
}

/// Await every future and collect each outcome, failures included.
///
/// A failing future does not affect its siblings; the caller decides what a
/// failure means.
pub async fn join_ordered<I, F, T>(futures: I, limit: Option<usize>) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    let futures: Vec<F> = futures.into_iter().collect();
    let width = in_flight(limit, futures.len());
    stream::iter(futures).buffered(width).collect().await
}

/// Await every future, failing fast on the first error in submission order.
///
/// Requests still in flight when an error surfaces are dropped and their
/// results discarded.
pub async fn try_join_ordered<I, F, T>(futures: I, limit: Option<usize>) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    let futures: Vec<F> = futures.into_iter().collect();
    let width = in_flight(limit, futures.len());
    stream::iter(futures).buffered(width).try_collect().await
}
