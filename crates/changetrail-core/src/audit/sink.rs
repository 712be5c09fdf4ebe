//! Audit record persistence seam.

use crate::audit::record::AuditRecord;
use crate::errors::{AuditError, ExError};
use std::sync::{Mutex, PoisonError};

/// Destination for audit records.
///
/// Injected into [`crate::audit::AuditTrail`]; a failing sink never blocks
/// the underlying document write.
pub trait AuditSink: Send + Sync {
    /// Store one record.
    ///
    /// # Errors
    ///
    /// Implementations report storage failures as `Persistence` errors.
    fn persist(&self, record: &AuditRecord) -> Result<(), ExError>;
}

/// Sink keeping records in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything persisted so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn persist(&self, record: &AuditRecord) -> Result<(), ExError> {
        let mut records = self.records.lock().map_err(|_| AuditError::SinkFailure {
            collection: record.collection.clone(),
            document_id: record.document_id.clone(),
            message: "record buffer lock poisoned".to_string(),
        })?;
        records.push(record.clone());
        Ok(())
    }
}

impl<S: AuditSink + ?Sized> AuditSink for std::sync::Arc<S> {
    fn persist(&self, record: &AuditRecord) -> Result<(), ExError> {
        (**self).persist(record)
    }
}
