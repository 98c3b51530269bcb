use std::sync::Arc;

use bevy::prelude::*;
use rayon::prelude::*;

/// Number of completed cycles.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCounter(pub u64);

#[derive(Debug, Clone)]
enum PoolMode {
    Sequential,
    Global,
    Dedicated(Arc<rayon::ThreadPool>),
}

/// Where the per-record work of a cycle runs.
#[derive(Resource, Debug, Clone)]
pub struct WorkerPool {
    mode: PoolMode,
}

impl WorkerPool {
    pub fn sequential() -> Self {
        Self {
            mode: PoolMode::Sequential,
        }
    }

    pub fn global() -> Self {
        Self {
            mode: PoolMode::Global,
        }
    }

    /// `0` shares the global rayon pool, `1` stays on the calling thread,
    /// anything larger builds a dedicated pool.
    pub fn with_threads(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        match threads {
            0 => Ok(Self::global()),
            1 => Ok(Self::sequential()),
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|index| format!("rating-worker-{index}"))
                    .build()?;
                Ok(Self {
                    mode: PoolMode::Dedicated(Arc::new(pool)),
                })
            }
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self.mode, PoolMode::Sequential)
    }

    /// Map every item, preserving input order in the output.
    pub fn map<I, T, F>(&self, items: &[I], f: F) -> Vec<T>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send,
    {
        match &self.mode {
            PoolMode::Sequential => items.iter().map(f).collect(),
            PoolMode::Global => items.par_iter().map(f).collect(),
            PoolMode::Dedicated(pool) => pool.install(|| items.par_iter().map(f).collect()),
        }
    }

    /// Run two independent computations, potentially in parallel.
    pub fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        match &self.mode {
            PoolMode::Sequential => (a(), b()),
            PoolMode::Global => rayon::join(a, b),
            PoolMode::Dedicated(pool) => pool.install(|| rayon::join(a, b)),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::global()
    }
}
