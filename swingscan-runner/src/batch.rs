//! Paced batch execution.
//!
//! Items run in groups of `group_size` on a rayon pool of the same width,
//! with a pause between groups to stay under an upstream rate limit. The
//! task closure owns failure handling: it returns a value for every item,
//! so one item can never stall or abort the rest.

use rayon::prelude::*;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BatchSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub group_size: usize,
    pub pause: Duration,
}

impl Pacing {
    pub fn new(group_size: usize, pause: Duration) -> Self {
        Self {
            group_size: group_size.max(1),
            pause,
        }
    }

    /// No pause, for in-memory providers and tests.
    pub fn unpaced(group_size: usize) -> Self {
        Self::new(group_size, Duration::ZERO)
    }
}

impl From<&BatchSection> for Pacing {
    fn from(section: &BatchSection) -> Self {
        Self::new(section.group_size, Duration::from_millis(section.pause_ms))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from(&BatchSection::default())
    }
}

/// Run `task` over `items` in paced groups. Output order matches input order.
pub fn run_paced<T, R, F>(items: &[T], pacing: Pacing, task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(pacing.group_size)
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(error = %e, "thread pool unavailable, running batch sequentially");
            None
        }
    };

    let groups = items.chunks(pacing.group_size).count();
    let mut out = Vec::with_capacity(items.len());
    for (g, group) in items.chunks(pacing.group_size).enumerate() {
        let results: Vec<R> = match &pool {
            Some(pool) => pool.install(|| group.par_iter().map(&task).collect()),
            None => group.iter().map(&task).collect(),
        };
        out.extend(results);
        debug!(group = g + 1, groups, done = out.len(), "batch group finished");

        if g + 1 < groups && !pacing.pause.is_zero() {
            std::thread::sleep(pacing.pause);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn preserves_input_order() {
        let items: Vec<u32> = (0..23).collect();
        let out = run_paced(&items, Pacing::unpaced(4), |x| x * 10);
        assert_eq!(out, items.iter().map(|x| x * 10).collect::<Vec<_>>());
    }

    #[test]
    fn failures_stay_isolated() {
        let items: Vec<i32> = vec![1, -2, 3, -4, 5];
        let out = run_paced(&items, Pacing::unpaced(2), |x| {
            if *x < 0 {
                Err(format!("bad {x}"))
            } else {
                Ok(*x)
            }
        });
        assert_eq!(out.len(), 5);
        assert_eq!(out.iter().filter(|r| r.is_ok()).count(), 3);
        assert_eq!(out[1], Err("bad -2".to_string()));
    }

    #[test]
    fn concurrency_bounded_by_group_size() {
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<usize> = (0..12).collect();
        run_paced(&items, Pacing::unpaced(3), |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            active.fetch_sub(1, Ordering::SeqCst);
        });
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn pauses_between_groups_only() {
        let items = [1, 2, 3, 4];
        let start = Instant::now();
        run_paced(&items, Pacing::new(2, Duration::from_millis(30)), |x| *x);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_millis(1_000));
    }

    #[test]
    fn empty_input() {
        let out: Vec<u8> = run_paced(&[] as &[u8], Pacing::default(), |x| *x);
        assert!(out.is_empty());
    }

    #[test]
    fn zero_group_size_is_clamped() {
        assert_eq!(Pacing::unpaced(0).group_size, 1);
    }
}
