use crate::error::ClientError;
use std::future::Future;
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of a bulk operation, item by item.
///
/// There is no rollback: whatever succeeded before a failure stays done.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<K> {
    pub id: Uuid,
    pub succeeded: Vec<K>,
    pub failed: Vec<(K, String)>,
}

impl<K> BatchReport<K> {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// Runs `operation` for each item, one at a time, awaiting every call
/// before starting the next.
pub async fn run_sequential<T, K, KF, F, Fut>(
    label: &str,
    items: &[T],
    key: KF,
    mut operation: F,
) -> BatchReport<K>
where
    KF: Fn(&T) -> K,
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<(), ClientError>>,
    K: std::fmt::Debug,
{
    let mut report = BatchReport::new();
    info!(batch = %report.id, label, items = items.len(), "Starting batch");

    for item in items {
        let item_key = key(item);
        match operation(item).await {
            Ok(()) => report.succeeded.push(item_key),
            Err(err) => {
                error!(batch = %report.id, label, key = ?item_key, ?err, "Batch item failed");
                report.failed.push((item_key, err.to_string()));
            }
        }
    }

    info!(
        batch = %report.id,
        label,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Batch finished"
    );
    report
}
