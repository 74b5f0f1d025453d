//! Append-only event log.
//!
//! Engines record an event only after the mutation it describes has been
//! applied, so a failed call never leaves a trace here. Mint and burn show
//! up as `Transfer` from / to the zero address, as ERC-20 indexers expect.

use etw_protocol::{Address, Amount};
use serde::{Deserialize, Serialize};

/// Something observable that happened to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    /// `encumbrances[owner][taker]` went from `previous` to `current`.
    EncumbranceChanged {
        owner: Address,
        taker: Address,
        previous: Amount,
        current: Amount,
    },
    /// Underlying deposited by `depositor`; `minted` wrapped tokens credited
    /// to `recipient`. `minted` is what custody actually received.
    Wrapped {
        depositor: Address,
        recipient: Address,
        requested: Amount,
        minted: Amount,
    },
    Unwrapped {
        holder: Address,
        recipient: Address,
        amount: Amount,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Events recorded at or after position `index`.
    pub fn since(&self, index: usize) -> &[Event] {
        self.events.get(index..).unwrap_or(&[])
    }
}
