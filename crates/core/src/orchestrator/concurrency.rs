//! Bounded-concurrency execution of window tasks.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run all futures with at most `limit` in flight, returning outputs in
/// input order.
///
/// A limit of zero is treated as one; the effective limit never exceeds
/// the number of futures.
pub async fn run_bounded<F, T>(futures: Vec<F>, limit: usize) -> Vec<T>
where
    F: Future<Output = T>,
{
    if futures.is_empty() {
        return Vec::new();
    }

    let effective = limit.clamp(1, futures.len());

    // Tag with the input index so completion order does not matter.
    let mut indexed: Vec<(usize, T)> = stream::iter(futures.into_iter().enumerate())
        .map(|(idx, fut)| async move { (idx, fut.await) })
        .buffer_unordered(effective)
        .collect()
        .await;

    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_input() {
        let results: Vec<u32> = run_bounded(Vec::<std::future::Ready<u32>>::new(), 3).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        // Earlier futures sleep longer, so completion order is reversed.
        let futures: Vec<_> = (0..4u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(40 - i * 10)).await;
                i
            })
            .collect();

        let results = run_bounded(futures, 4).await;
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_limit_bounds_in_flight_tasks() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..5)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let high_water = Arc::clone(&high_water);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    i
                }
            })
            .collect();

        let results = run_bounded(futures, 2).await;
        assert_eq!(results.len(), 5);
        assert!(high_water.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_limit_is_treated_as_one() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let futures: Vec<_> = (0..3)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let high_water = Arc::clone(&high_water);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    i
                }
            })
            .collect();

        let results = run_bounded(futures, 0).await;
        assert_eq!(results, vec![0, 1, 2]);
        assert_eq!(high_water.load(Ordering::SeqCst), 1);
    }
}
