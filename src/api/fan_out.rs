// src/api/fan_out.rs
//! Contiguous chunking and index-ordered fan-out across tokio tasks.

use crate::error::AppError;
use std::future::Future;
use std::ops::RangeInclusive;
use tokio::task::JoinSet;

/// Items per chunk when `len` items are spread over `num_workers`.
pub(crate) fn chunk_len(len: usize, num_workers: usize) -> usize {
    len.div_ceil(num_workers.max(1)).max(1)
}

/// Splits `items` into at most `num_workers` contiguous chunks of
/// `chunk_len` items each; the last chunk may be short.
pub(crate) fn partition<T>(items: Vec<T>, num_workers: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }

    let size = chunk_len(items.len(), num_workers);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut rest = items.into_iter().peekable();
    while rest.peek().is_some() {
        chunks.push(rest.by_ref().take(size).collect());
    }
    chunks
}

/// Splits `pages` into at most `num_workers` contiguous sub-ranges, the way
/// `partition` splits a vector, without materializing the pages.
pub(crate) fn partition_pages(
    pages: RangeInclusive<u32>,
    num_workers: usize,
) -> Vec<RangeInclusive<u32>> {
    if pages.is_empty() {
        return Vec::new();
    }

    let (first, last) = (u64::from(*pages.start()), u64::from(*pages.end()));
    let workers = u64::try_from(num_workers.max(1)).unwrap_or(u64::MAX);
    let size = (last - first + 1).div_ceil(workers).max(1);

    let mut chunks = Vec::new();
    let mut start = first;
    while start <= last {
        let end = (start + size - 1).min(last);
        // both bounds lie within the original u32 range
        chunks.push(start as u32..=end as u32);
        start = end + 1;
    }
    chunks
}

/// Runs `work` on every chunk in its own task and returns the outputs in
/// chunk order, whatever order the tasks finish in.
pub(crate) async fn run_chunks<I, O, F, Fut>(chunks: Vec<I>, work: F) -> Result<Vec<O>, AppError>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(usize, I) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    let total = chunks.len();
    let mut join_set = JoinSet::new();

    for (index, chunk) in chunks.into_iter().enumerate() {
        let task = work(index, chunk);
        join_set.spawn(async move { (index, task.await) });
    }

    let mut slots: Vec<Option<O>> = (0..total).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        let (index, output) = joined?;
        slots[index] = Some(output);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| AppError::InternalError {
                message: format!("Chunk {} finished without reporting a result", index),
                source: None,
            })
        })
        .collect()
}
