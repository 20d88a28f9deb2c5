//! Parallel batch execution with aggregate reporting.
//!
//! Each unit (one container or one directory) runs on its own worker. A
//! failing unit is logged and counted; its siblings keep going.

use crate::error::CommandError;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A unit that failed during a batch
#[derive(Debug)]
pub struct BatchFailure {
    /// Input that failed
    pub item: PathBuf,
    /// Rendered error chain
    pub error: String,
}

/// Outcome of [`run_batch`]
#[derive(Debug)]
pub struct BatchReport {
    /// Operation name used in log output
    pub label: &'static str,
    /// Number of units attempted
    pub total: usize,
    /// Number of units that completed
    pub succeeded: usize,
    /// Units that failed, in input order
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether every unit completed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn any failure into an error
    ///
    /// # Errors
    ///
    /// Returns `CommandError::BatchFailed` if at least one unit failed.
    pub fn into_result(self) -> Result<Self, CommandError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CommandError::BatchFailed {
                label: self.label,
                failed: self.failures.len(),
                total: self.total,
            })
        }
    }
}

/// Run `op` for every item on `pool` and tally the results
pub fn run_batch<F>(pool: &ThreadPool, label: &'static str, items: &[PathBuf], op: F) -> BatchReport
where
    F: Fn(&Path) -> anyhow::Result<()> + Sync + Send,
{
    info!(
        "Starting {} of {} items on {} workers",
        label,
        items.len(),
        pool.current_num_threads()
    );

    let results: Vec<anyhow::Result<()>> =
        pool.install(|| items.par_iter().map(|item| op(item)).collect());

    let mut report = BatchReport {
        label,
        total: items.len(),
        succeeded: 0,
        failures: Vec::new(),
    };

    for (item, result) in items.iter().zip(results) {
        match result {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                error!("{} failed for {}: {:#}", label, item.display(), e);
                report.failures.push(BatchFailure {
                    item: item.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    info!(
        "{} finished: {} total, {} succeeded, {} failed",
        label,
        report.total,
        report.succeeded,
        report.failures.len()
    );
    report
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_failures_do_not_stop_siblings() {
        let items: Vec<PathBuf> = ["a", "bad", "c", "worse"].iter().map(PathBuf::from).collect();
        let report = run_batch(&pool(), "test", &items, |p| {
            if p.to_string_lossy().len() > 1 {
                anyhow::bail!("cannot handle {}", p.display());
            }
            Ok(())
        });

        assert_eq!(report.total, 4);
        assert_eq!(report.succeeded, 2);
        let failed: Vec<_> = report.failures.iter().map(|f| f.item.clone()).collect();
        assert_eq!(failed, vec![PathBuf::from("bad"), PathBuf::from("worse")]);
        assert!(report.failures[0].error.contains("cannot handle bad"));

        assert!(matches!(
            report.into_result(),
            Err(CommandError::BatchFailed { failed: 2, total: 4, .. })
        ));
    }

    #[test]
    fn test_empty_batch_succeeds() {
        let report = run_batch(&pool(), "test", &[], |_| Ok(()));
        assert_eq!(report.total, 0);
        assert!(report.into_result().is_ok());
    }
}
