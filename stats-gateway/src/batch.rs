use crate::metrics_defs::MATCH_DETAILS_DROPPED;
use shared::counter;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSettings {
    pub size: usize,
    pub delay: Duration,
}

/// Runs all futures concurrently and waits for every one of them.
///
/// Successful values are returned in input order, whatever order they
/// completed in. Errors and panicked tasks are logged and left out.
pub async fn settle_all<T, E, Fut>(label: &'static str, futures: Vec<Fut>) -> Vec<T>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let total = futures.len();
    let mut join_set = JoinSet::new();
    for (index, future) in futures.into_iter().enumerate() {
        join_set.spawn(async move { (index, future.await) });
    }

    let mut settled: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(value))) => settled[index] = Some(value),
            Ok((index, Err(e))) => {
                tracing::warn!(label, index, error = %e, "dropping failed fetch");
            }
            Err(e) => tracing::error!(label, "Task panicked: {}", e),
        }
    }

    let values: Vec<T> = settled.into_iter().flatten().collect();
    let dropped = total - values.len();
    if dropped > 0 {
        counter!(MATCH_DETAILS_DROPPED, "label" => label).increment(dropped as u64);
    }
    values
}

/// Fetches `items` in sequential batches of `settings.size`.
///
/// Each batch is settled with [`settle_all`] before the next one starts, with
/// `settings.delay` between batches. Results keep the order of `items`.
pub async fn fetch_in_batches<I, T, E, F, Fut>(
    label: &'static str,
    items: Vec<I>,
    settings: &BatchSettings,
    fetch: F,
) -> Vec<T>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let size = settings.size.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter().peekable();

    while remaining.peek().is_some() {
        let batch: Vec<Fut> = remaining.by_ref().take(size).map(&fetch).collect();
        results.extend(settle_all(label, batch).await);

        if remaining.peek().is_some() && !settings.delay.is_zero() {
            sleep(settings.delay).await;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_settle_all_keeps_order_and_drops_failures() {
        let futures: Vec<_> = (0..6u64)
            .map(|i| async move {
                // Later items finish first
                sleep(Duration::from_millis(60 - i * 10)).await;
                if i == 2 { Err(format!("match {i} failed")) } else { Ok(i) }
            })
            .collect();

        let values = settle_all("test", futures).await;
        assert_eq!(values, vec![0, 1, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_settle_all_survives_panics() {
        let futures: Vec<_> = (0..3u32)
            .map(|i| async move {
                if i == 1 {
                    panic!("boom");
                }
                Ok::<_, String>(i)
            })
            .collect();

        assert_eq!(settle_all("test", futures).await, vec![0, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_run_sequentially() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();
        let settings = BatchSettings {
            size: 5,
            delay: Duration::from_millis(100),
        };

        let items: Vec<u32> = (0..12).collect();
        let results = fetch_in_batches("test", items, &settings, |i| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push((i, Instant::now()));
                Ok::<_, String>(i * 10)
            }
        })
        .await;

        assert_eq!(results, (0..12).map(|i| i * 10).collect::<Vec<_>>());

        // Three batches, two pauses between them and none after the last
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));

        // Batch N starts only after N pauses
        let log = log.lock().unwrap();
        for (i, at) in log.iter() {
            let offset = *at - started;
            let batch = (*i / 5) as u64;
            assert!(offset >= Duration::from_millis(batch * 100));
            assert!(offset < Duration::from_millis(batch * 100 + 100));
        }
    }

    #[tokio::test]
    async fn test_empty_input() {
        let settings = BatchSettings {
            size: 0,
            delay: Duration::from_millis(100),
        };
        let results: Vec<u32> =
            fetch_in_batches("test", Vec::<u32>::new(), &settings, |i| async move {
                Ok::<_, String>(i)
            })
            .await;
        assert!(results.is_empty());
    }
}
