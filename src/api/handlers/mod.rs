//! One module per REST resource. Each handler validates its input, fans
//! out to the indexer, reshapes the result and hands it to the envelope
//! builder.

pub mod account;
pub mod block;
pub mod contract;
pub mod stats;
pub mod token;
pub mod tx;
pub mod validators;

use std::future::Future;

use crate::indexer::types::Connection;
use crate::indexer::IndexerError;

/// Upper bound on rows pulled when a list must be filtered in full before
/// it can be paginated.
pub(crate) const FULL_LIST_CAP: u64 = 1000;

/// Rows fetched per requested item when a filter runs after the fetch.
pub(crate) const OVERFETCH_FACTOR: u64 = 2;

/// Upstream windows read before giving up on filling a page.
pub(crate) const MAX_FILL_ROUNDS: usize = 5;

pub(crate) struct FilledPage<T> {
    pub items: Vec<T>,
    pub upstream_total: u64,
}

/// Reads upstream windows of `batch` rows starting at `start`, keeping the
/// rows `select` accepts, until `want` items are collected, the upstream
/// is exhausted, or [`MAX_FILL_ROUNDS`] windows have been read.
pub(crate) async fn fill_page<Row, Item, F, Fut, S>(
    mut fetch: F,
    mut select: S,
    start: u64,
    batch: u64,
    want: usize,
) -> Result<FilledPage<Item>, IndexerError>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = Result<Connection<Row>, IndexerError>>,
    S: FnMut(Row) -> Option<Item>,
{
    let batch = batch.max(1);
    let mut offset = start;
    let mut items = Vec::with_capacity(want);
    let mut upstream_total = 0;

    for _ in 0..MAX_FILL_ROUNDS {
        let window = fetch(offset, batch).await?;
        upstream_total = window.total_count;
        let fetched = window.nodes.len() as u64;
        items.extend(window.nodes.into_iter().filter_map(&mut select));

        offset += fetched;
        let exhausted = fetched < batch || offset >= upstream_total;
        if items.len() >= want || exhausted {
            break;
        }
    }

    items.truncate(want);
    Ok(FilledPage {
        items,
        upstream_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn window(rows: &[u64], offset: u64, size: u64) -> Connection<u64> {
        Connection {
            nodes: rows
                .iter()
                .copied()
                .skip(offset as usize)
                .take(size as usize)
                .collect(),
            total_count: rows.len() as u64,
        }
    }

    #[tokio::test]
    async fn keeps_fetching_until_page_is_full() {
        let rows: Vec<u64> = (0..40).collect();
        let calls = AtomicUsize::new(0);
        let page = fill_page(
            |offset, size| {
                calls.fetch_add(1, Ordering::SeqCst);
                let w = window(&rows, offset, size);
                async move { Ok::<_, IndexerError>(w) }
            },
            |n| (n % 4 == 0).then_some(n),
            0,
            4,
            3,
        )
        .await
        .unwrap();

        assert_eq!(page.items, vec![0, 4, 8]);
        assert_eq!(page.upstream_total, 40);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_when_upstream_is_exhausted() {
        let rows: Vec<u64> = (0..5).collect();
        let page = fill_page(
            |offset, size| {
                let w = window(&rows, offset, size);
                async move { Ok::<_, IndexerError>(w) }
            },
            |n| (n % 2 == 1).then_some(n),
            0,
            4,
            10,
        )
        .await
        .unwrap();
        assert_eq!(page.items, vec![1, 3]);
    }

    #[tokio::test]
    async fn round_cap_bounds_upstream_calls() {
        let rows: Vec<u64> = (0..1000).collect();
        let calls = AtomicUsize::new(0);
        let page = fill_page(
            |offset, size| {
                calls.fetch_add(1, Ordering::SeqCst);
                let w = window(&rows, offset, size);
                async move { Ok::<_, IndexerError>(w) }
            },
            |_| None::<u64>,
            0,
            10,
            5,
        )
        .await
        .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_FILL_ROUNDS);
    }
}
