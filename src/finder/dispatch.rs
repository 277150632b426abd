//! Parallel dispatch context.
//!
//! Every phase of the finder is a data-parallel fan-out: one independent unit of
//! work per doublet or per chain. [`DispatchContext::parallel_for`] runs such a
//! phase and returns only once every unit has finished, which is the barrier
//! between phases. Workers only interact through atomic bounded appends.
//!
//! The context is built once per run and passed to each phase. Dropping it
//! shuts down the worker pool.

use rayon::prelude::*;
use tracing::debug;

use crate::error::FinderError;

enum Backend {
    /// Run every unit of work on the calling thread, in index order.
    Inline,
    /// Fan work out over a dedicated rayon pool.
    Pool(rayon::ThreadPool),
}

pub struct DispatchContext {
    backend: Backend,
}

impl DispatchContext {
    /// Build a context backed by a rayon pool with `num_threads` workers
    /// (`None` lets rayon pick one per available core).
    pub fn new(num_threads: Option<usize>) -> Result<Self, FinderError> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("tuplets-worker-{i}"));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build()?;
        debug!("Dispatch pool started with {} threads", pool.current_num_threads());
        Ok(Self {
            backend: Backend::Pool(pool),
        })
    }

    /// A context that runs everything on the calling thread.
    ///
    /// Units are executed in ascending index order, so bounded appends keep
    /// the first writers by index when a list overflows.
    pub fn sequential() -> Self {
        Self {
            backend: Backend::Inline,
        }
    }

    /// Number of workers units are spread over.
    pub fn num_threads(&self) -> usize {
        match &self.backend {
            Backend::Inline => 1,
            Backend::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Run `f(i)` for every `i` in `0..n` and wait for all of them.
    pub fn parallel_for<F>(&self, n: usize, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match &self.backend {
            Backend::Inline => (0..n).for_each(f),
            Backend::Pool(pool) => pool.install(|| (0..n).into_par_iter().for_each(f)),
        }
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("num_threads", &self.num_threads())
            .finish()
    }
}
