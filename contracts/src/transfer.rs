//! # Transfer Engine
//!
//! Two ways to move wrapped tokens:
//!
//! - **free transfer** — the owner moves their own tokens. Only the
//!   available (unencumbered) part of the balance may move. Encumbrances the
//!   owner granted are respected but never consumed.
//!
//! - **pull transfer** — a taker moves tokens out of someone else's account.
//!   The taker's encumbrance is spent first; only the excess beyond it is
//!   charged to the standard allowance, and that excess must fit inside the
//!   source's *available* balance. Other takers' encumbrances therefore stay
//!   untouchable: an encumbrance can only ever be spent by the taker it was
//!   granted to.
//!
//! ## Worked example
//!
//! ```text
//! src balance 100, encumbered to T: 60, allowance to T: 30
//!
//! T pulls 40  -> 40 <= 60:  encumbrance 60 -> 20, allowance stays 30
//! T pulls 40  -> 20 from encumbrance (-> 0), excess 20:
//!                available = 60 - 20 = 40 >= 20, allowance 30 -> 10
//! ```

use etw_protocol::{Address, Amount};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TokenError, TokenResult};
use crate::events::{Event, EventLog};
use crate::ledger::Ledger;

/// How a pull transfer was funded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullBreakdown {
    /// Portion spent from the caller's encumbrance on the source.
    pub from_encumbrance: Amount,
    /// Portion charged to the caller's allowance.
    pub from_allowance: Amount,
}

/// `caller` sends `amount` of their available balance to `dst`.
pub fn transfer(
    ledger: &mut Ledger,
    events: &mut EventLog,
    caller: Address,
    dst: Address,
    amount: Amount,
) -> TokenResult<()> {
    if dst.is_zero() {
        return Err(TokenError::InvalidReceiver(dst));
    }
    ledger.require_available(&caller, amount)?;
    ledger.move_balance(&caller, &dst, amount)?;

    debug!(from = ?caller, to = ?dst, %amount, "transfer");
    events.record(Event::Transfer {
        from: caller,
        to: dst,
        amount,
    });
    Ok(())
}

/// `caller` pulls `amount` out of `src` into `dst`: encumbrance first,
/// allowance for the excess.
pub fn transfer_from(
    ledger: &mut Ledger,
    events: &mut EventLog,
    caller: Address,
    src: Address,
    dst: Address,
    amount: Amount,
) -> TokenResult<PullBreakdown> {
    if dst.is_zero() {
        return Err(TokenError::InvalidReceiver(dst));
    }

    let encumbered = ledger.encumbrance(&src, &caller);
    let breakdown = if amount <= encumbered {
        PullBreakdown {
            from_encumbrance: amount,
            from_allowance: Amount::zero(),
        }
    } else {
        let excess = amount - encumbered;
        // Availability is measured before the encumbrance is spent: the
        // excess must come out of tokens nobody else holds a claim on.
        let available = ledger.available_balance_of(&src)?;
        if available < excess {
            return Err(TokenError::InsufficientBalance {
                account: src,
                available,
                requested: excess,
            });
        }
        ledger.require_allowance(&src, &caller, excess)?;
        PullBreakdown {
            from_encumbrance: encumbered,
            from_allowance: excess,
        }
    };

    let spent = if breakdown.from_encumbrance.is_zero() {
        None
    } else {
        Some(ledger.spend_encumbrance(&src, &caller, breakdown.from_encumbrance)?)
    };
    if !breakdown.from_allowance.is_zero() {
        ledger.spend_allowance(&src, &caller, breakdown.from_allowance)?;
    }
    ledger.move_balance(&src, &dst, amount)?;

    debug!(
        taker = ?caller,
        from = ?src,
        to = ?dst,
        %amount,
        from_encumbrance = %breakdown.from_encumbrance,
        from_allowance = %breakdown.from_allowance,
        "transfer_from"
    );
    if let Some(delta) = spent {
        events.record(Event::EncumbranceChanged {
            owner: src,
            taker: caller,
            previous: delta.previous,
            current: delta.current,
        });
    }
    events.record(Event::Transfer {
        from: src,
        to: dst,
        amount,
    });
    Ok(breakdown)
}
