//! Nullable settlement: records transfer instructions instead of sending them.

use lumeos_fees::{Settlement, SettlementError, TransferInstruction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A settlement sink that remembers every instruction it accepted.
///
/// When set to reject, hand-offs fail the way an unreachable or refusing
/// settlement ledger would.
#[derive(Default)]
pub struct NullSettlement {
    submitted: Mutex<Vec<TransferInstruction>>,
    rejected: Mutex<Vec<TransferInstruction>>,
    reject: AtomicBool,
}

impl NullSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every instruction.
    pub fn rejecting() -> Self {
        let sink = Self::default();
        sink.set_rejecting(true);
        sink
    }

    pub fn set_rejecting(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Instructions accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<TransferInstruction> {
        self.submitted.lock().unwrap().clone()
    }

    /// Instructions refused so far.
    pub fn rejected(&self) -> Vec<TransferInstruction> {
        self.rejected.lock().unwrap().clone()
    }
}

impl Settlement for NullSettlement {
    fn submit(&self, instruction: TransferInstruction) -> Result<(), SettlementError> {
        if self.reject.load(Ordering::SeqCst) {
            let memo = instruction.memo.clone();
            self.rejected.lock().unwrap().push(instruction);
            return Err(SettlementError::Rejected(memo));
        }
        self.submitted.lock().unwrap().push(instruction);
        Ok(())
    }
}
