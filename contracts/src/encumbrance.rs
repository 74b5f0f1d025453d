//! # Encumbrance Engine
//!
//! Creates and releases encumbrances. An encumbrance is a claim a taker
//! holds on part of an owner's balance: the owner keeps custody, but cannot
//! move, unwrap, or re-encumber those tokens until the taker spends or
//! releases them.
//!
//! Every check runs before the first write, so a failed call leaves the
//! ledger exactly as it found it.

use etw_protocol::{Address, Amount};
use tracing::debug;

use crate::error::TokenResult;
use crate::events::{Event, EventLog};
use crate::ledger::{EncumbranceDelta, Ledger};

/// `owner` commits `amount` of their available balance to `taker`.
pub fn encumber(
    ledger: &mut Ledger,
    events: &mut EventLog,
    owner: Address,
    taker: Address,
    amount: Amount,
) -> TokenResult<EncumbranceDelta> {
    let delta = ledger.add_encumbrance(&owner, &taker, amount)?;
    debug!(?owner, ?taker, %amount, current = %delta.current, "encumber");
    record_change(events, owner, taker, delta);
    Ok(delta)
}

/// `spender` uses its allowance over `owner` to encumber `amount` of
/// `owner`'s balance to `taker`.
pub fn encumber_from(
    ledger: &mut Ledger,
    events: &mut EventLog,
    spender: Address,
    owner: Address,
    taker: Address,
    amount: Amount,
) -> TokenResult<EncumbranceDelta> {
    ledger.require_allowance(&owner, &spender, amount)?;
    ledger.require_available(&owner, amount)?;

    ledger.spend_allowance(&owner, &spender, amount)?;
    let delta = ledger.add_encumbrance(&owner, &taker, amount)?;
    debug!(?spender, ?owner, ?taker, %amount, "encumber_from");
    record_change(events, owner, taker, delta);
    Ok(delta)
}

/// `taker` gives back up to `amount` of its encumbrance on `owner`.
/// Over-release clamps at zero. Returns how much was actually released.
pub fn release(
    ledger: &mut Ledger,
    events: &mut EventLog,
    taker: Address,
    owner: Address,
    amount: Amount,
) -> TokenResult<Amount> {
    let delta = ledger.release_encumbrance(&owner, &taker, amount)?;
    let released = delta.previous - delta.current;
    debug!(?owner, ?taker, requested = %amount, %released, "release");
    record_change(events, owner, taker, delta);
    Ok(released)
}

fn record_change(events: &mut EventLog, owner: Address, taker: Address, delta: EncumbranceDelta) {
    events.record(Event::EncumbranceChanged {
        owner,
        taker,
        previous: delta.previous,
        current: delta.current,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn amt(n: u64) -> Amount {
        Amount::from(n)
    }

    fn funded(balance: u64) -> (Ledger, EventLog) {
        let mut ledger = Ledger::new();
        ledger.mint(&addr(1), amt(balance)).unwrap();
        (ledger, EventLog::new())
    }

    #[test]
    fn encumber_reduces_available_balance() {
        let (mut ledger, mut events) = funded(100);
        let delta = encumber(&mut ledger, &mut events, addr(1), addr(2), amt(60)).unwrap();
        assert_eq!(delta.previous, Amount::zero());
        assert_eq!(delta.current, amt(60));
        assert_eq!(ledger.available_balance_of(&addr(1)).unwrap(), amt(40));
        assert_eq!(ledger.balance_of(&addr(1)), amt(100));
        assert_eq!(
            events.last(),
            Some(&Event::EncumbranceChanged {
                owner: addr(1),
                taker: addr(2),
                previous: Amount::zero(),
                current: amt(60),
            })
        );
    }

    #[test]
    fn encumbrances_to_the_same_taker_accumulate() {
        let (mut ledger, mut events) = funded(100);
        encumber(&mut ledger, &mut events, addr(1), addr(2), amt(30)).unwrap();
        let delta = encumber(&mut ledger, &mut events, addr(1), addr(2), amt(20)).unwrap();
        assert_eq!(delta.previous, amt(30));
        assert_eq!(delta.current, amt(50));
        assert_eq!(ledger.encumbered_balance_of(&addr(1)), amt(50));
    }

    #[test]
    fn encumber_beyond_available_fails() {
        let (mut ledger, mut events) = funded(100);
        encumber(&mut ledger, &mut events, addr(1), addr(2), amt(70)).unwrap();
        let err = encumber(&mut ledger, &mut events, addr(1), addr(3), amt(31)).unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientAvailableBalance {
                account: addr(1),
                available: amt(30),
                requested: amt(31),
            }
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn encumber_from_spends_allowance() {
        let (mut ledger, mut events) = funded(100);
        ledger.set_allowance(&addr(1), &addr(9), amt(50));
        encumber_from(&mut ledger, &mut events, addr(9), addr(1), addr(2), amt(20)).unwrap();
        assert_eq!(ledger.allowance(&addr(1), &addr(9)), amt(30));
        assert_eq!(ledger.encumbrance(&addr(1), &addr(2)), amt(20));
    }

    #[test]
    fn encumber_from_without_allowance_changes_nothing() {
        let (mut ledger, mut events) = funded(100);
        ledger.set_allowance(&addr(1), &addr(9), amt(10));
        let before = ledger.clone();
        let err =
            encumber_from(&mut ledger, &mut events, addr(9), addr(1), addr(2), amt(20)).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn encumber_from_beyond_available_keeps_allowance() {
        let (mut ledger, mut events) = funded(10);
        ledger.set_allowance(&addr(1), &addr(9), amt(50));
        let before = ledger.clone();
        let err =
            encumber_from(&mut ledger, &mut events, addr(9), addr(1), addr(2), amt(20)).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAvailableBalance { .. }));
        assert_eq!(ledger, before);
        assert!(events.is_empty());
    }

    #[test]
    fn over_release_clamps_to_zero() {
        let (mut ledger, mut events) = funded(100);
        encumber(&mut ledger, &mut events, addr(1), addr(2), amt(100)).unwrap();
        let released = release(&mut ledger, &mut events, addr(2), addr(1), amt(200)).unwrap();
        assert_eq!(released, amt(100));
        assert_eq!(ledger.encumbrance(&addr(1), &addr(2)), Amount::zero());
        assert_eq!(ledger.available_balance_of(&addr(1)).unwrap(), amt(100));
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn only_the_taker_releases_its_own_claim() {
        let (mut ledger, mut events) = funded(100);
        encumber(&mut ledger, &mut events, addr(1), addr(2), amt(40)).unwrap();
        // addr(3) holds nothing on addr(1): releasing is a clamped no-op.
        let released = release(&mut ledger, &mut events, addr(3), addr(1), amt(40)).unwrap();
        assert_eq!(released, Amount::zero());
        assert_eq!(ledger.encumbrance(&addr(1), &addr(2)), amt(40));
    }
}
