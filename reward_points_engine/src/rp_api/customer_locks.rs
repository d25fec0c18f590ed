use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::db_types::CustomerId;

/// Single-flight locks keyed by customer.
///
/// Point balances live on the storefront as a plain value with no compare-and-swap, so two reconciliations for the
/// same customer must never interleave their read and write. Reconciliations for different customers do not block
/// each other.
#[derive(Debug, Default)]
pub struct CustomerLocks {
    locks: Mutex<HashMap<CustomerId, Arc<AsyncMutex<()>>>>,
}

pub type CustomerGuard = OwnedMutexGuard<()>;

impl CustomerLocks {
    /// Waits until no other task holds the lock for `customer_id`. The lock is released when the guard is dropped.
    pub async fn lock(&self, customer_id: &CustomerId) -> CustomerGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // An entry nobody else holds or waits on can go.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(customer_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// The number of customers with a reconciliation in flight (or recently finished and not yet pruned).
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
