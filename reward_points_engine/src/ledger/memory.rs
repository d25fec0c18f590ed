use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    db_types::{AwardRecord, OrderId},
    traits::{LedgerError, ProcessedOrderStore},
};

/// A process-local [`ProcessedOrderStore`].
///
/// It grows for the life of the process and is lost on restart, which reopens the dedup window for orders that are
/// redelivered after a restart. Use the Sqlite ledger when that matters.
#[derive(Debug, Default)]
pub struct MemoryOrderLedger {
    records: Mutex<HashMap<OrderId, AwardRecord>>,
}

impl MemoryOrderLedger {
    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // No invariant spans more than one map operation, so a poisoned lock is still usable.
    fn records(&self) -> MutexGuard<'_, HashMap<OrderId, AwardRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProcessedOrderStore for MemoryOrderLedger {
    async fn contains(&self, order_id: &OrderId) -> Result<bool, LedgerError> {
        Ok(self.records().contains_key(order_id))
    }

    async fn add(&self, record: AwardRecord) -> Result<(), LedgerError> {
        let mut records = self.records();
        if records.contains_key(&record.order_id) {
            return Err(LedgerError::AlreadyRecorded(record.order_id));
        }
        records.insert(record.order_id.clone(), record);
        Ok(())
    }

    async fn fetch(&self, order_id: &OrderId) -> Result<Option<AwardRecord>, LedgerError> {
        Ok(self.records().get(order_id).cloned())
    }
}
