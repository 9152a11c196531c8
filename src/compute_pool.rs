use std::env;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use rayon::ThreadPool;

const DEFAULT_PARALLELISM: usize = 6;

static POOL: OnceCell<ThreadPool> = OnceCell::new();

pub fn compute_pool() -> Result<&'static ThreadPool> {
    POOL.get_or_try_init(|| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(compute_parallelism())
            .thread_name(|idx| format!("fdr-compute-{idx}"))
            .build()
            .context("failed to build fdr compute pool")
    })
}

/// Run `action` inside the dedicated pool, or on the global rayon pool if it
/// could not be built.
pub fn with_compute_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match compute_pool() {
        Ok(pool) => pool.install(action),
        Err(err) => {
            log::warn!("{err:#}; using global rayon pool");
            action()
        }
    }
}

pub fn compute_parallelism() -> usize {
    env::var("FDR_PARALLELISM")
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_PARALLELISM)
        .clamp(2, 32)
}
