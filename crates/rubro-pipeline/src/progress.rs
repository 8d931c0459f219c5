//! Best-effort progress events
//!
//! Events go to an unbounded channel; a closed or absent receiver never
//! affects the run.

use crate::types::{EntityOutcome, EntityStatus};
use rubro_domain::Rut;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Progress of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The run began
    RunStarted {
        /// Entities in the run
        entities: usize,
        /// Number of batches
        batches: usize,
    },
    /// A batch began (`index` is 1-based)
    BatchStarted {
        /// Batch number
        index: usize,
        /// Number of batches
        total: usize,
        /// Entities in this batch
        size: usize,
    },
    /// An entity reached a terminal state
    EntityFinished {
        /// Entity identifier
        rut: Rut,
        /// Terminal status
        status: EntityStatus,
    },
    /// The results of a batch were written
    BatchPersisted {
        /// Batch number
        index: usize,
        /// Files written
        written: usize,
    },
    /// The run ended
    RunFinished,
}

/// Sender side of the progress channel
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl Progress {
    /// Report to `tx`
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Report nowhere
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A connected progress sender and its receiver
    pub fn channel() -> (Self, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Send an event, ignoring a closed receiver
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    /// Report a terminal entity
    pub fn entity_finished(&self, outcome: &EntityOutcome) {
        self.emit(ProgressEvent::EntityFinished {
            rut: outcome.rut().clone(),
            status: outcome.status(),
        });
    }
}
