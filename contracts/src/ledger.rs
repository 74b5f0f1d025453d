//! # Ledger
//!
//! The single authoritative store behind the wrapper: balances, the
//! encumbrance sub-ledger, allowances and authorization nonces.
//!
//! ```text
//! balances            owner -> amount
//! encumbered_totals   owner -> Σ encumbrances[owner][*]
//! encumbrances        owner -> taker -> amount
//! allowances          owner -> spender -> amount
//! nonces              owner -> next authorization nonce
//! ```
//!
//! Accounts are implicit: every map reads as zero for an address it has
//! never seen. Zeroed encumbrance entries are kept, not pruned: a zero
//! entry and a missing one mean the same thing.
//!
//! ## Invariants
//!
//! After every successful mutation, for every account:
//!
//! 1. `encumbered_totals[a] == Σ_t encumbrances[a][t]`
//! 2. `encumbered_totals[a] <= balances[a]`
//! 3. `Σ_a balances[a] == total_supply`
//!
//! Reads are public. Mutation primitives are crate-private: everything goes
//! through the transfer, encumbrance and authorization engines, which
//! validate every precondition before touching state. The primitives
//! re-check what they depend on and report a broken invariant as
//! [`TokenError::InvariantViolated`] rather than wrapping.

use std::collections::{BTreeMap, BTreeSet};

use etw_protocol::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::error::{TokenError, TokenResult};

/// Per-address balance and encumbrance state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Address, Amount>,
    encumbered_totals: BTreeMap<Address, Amount>,
    encumbrances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    nonces: BTreeMap<Address, Amount>,
    total_supply: Amount,
}

/// Before/after pair for an encumbrance mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncumbranceDelta {
    pub previous: Amount,
    pub current: Amount,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    /// Sum of all outstanding encumbrances `owner` has granted.
    pub fn encumbered_balance_of(&self, owner: &Address) -> Amount {
        self.encumbered_totals.get(owner).copied().unwrap_or_default()
    }

    pub fn encumbrance(&self, owner: &Address, taker: &Address) -> Amount {
        self.encumbrances
            .get(owner)
            .and_then(|takers| takers.get(taker))
            .copied()
            .unwrap_or_default()
    }

    /// All `(taker, amount)` pairs recorded for `owner`, zeros included.
    pub fn encumbrances_of(&self, owner: &Address) -> impl Iterator<Item = (&Address, &Amount)> {
        self.encumbrances.get(owner).into_iter().flat_map(|m| m.iter())
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn nonce(&self, owner: &Address) -> Amount {
        self.nonces.get(owner).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// `balance - encumbered`.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvariantViolated`] if the encumbered total exceeds the
    /// balance. That is a corrupted ledger, not an insufficient-funds case.
    pub fn available_balance_of(&self, owner: &Address) -> TokenResult<Amount> {
        let balance = self.balance_of(owner);
        let encumbered = self.encumbered_balance_of(owner);
        balance.checked_sub(encumbered).ok_or_else(|| {
            TokenError::InvariantViolated(format!(
                "{owner:?} has {encumbered} encumbered against a balance of {balance}"
            ))
        })
    }

    /// Every address that appears anywhere in the ledger.
    pub fn accounts(&self) -> BTreeSet<Address> {
        let mut seen: BTreeSet<Address> = self.balances.keys().copied().collect();
        seen.extend(self.encumbered_totals.keys().copied());
        seen.extend(self.nonces.keys().copied());
        for (owner, takers) in &self.encumbrances {
            seen.insert(*owner);
            seen.extend(takers.keys().copied());
        }
        for (owner, spenders) in &self.allowances {
            seen.insert(*owner);
            seen.extend(spenders.keys().copied());
        }
        seen
    }

    /// Verify the ledger invariants across every account.
    pub fn check_invariants(&self) -> TokenResult<()> {
        let mut supply = Amount::zero();
        for balance in self.balances.values() {
            supply = supply
                .checked_add(*balance)
                .ok_or_else(|| TokenError::InvariantViolated("balance sum overflows".into()))?;
        }
        if supply != self.total_supply {
            return Err(TokenError::InvariantViolated(format!(
                "balances sum to {supply} but total supply is {}",
                self.total_supply
            )));
        }

        for owner in self.accounts() {
            let mut sum = Amount::zero();
            for (_, amount) in self.encumbrances_of(&owner) {
                sum = sum.checked_add(*amount).ok_or_else(|| {
                    TokenError::InvariantViolated(format!("encumbrance sum overflows for {owner:?}"))
                })?;
            }
            let total = self.encumbered_balance_of(&owner);
            if sum != total {
                return Err(TokenError::InvariantViolated(format!(
                    "{owner:?} encumbered total {total} != sum of encumbrances {sum}"
                )));
            }
            self.available_balance_of(&owner)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pre-checks (no mutation)
    // -----------------------------------------------------------------------

    /// Fail with [`TokenError::InsufficientAvailableBalance`] unless
    /// `owner` has at least `amount` unencumbered.
    pub(crate) fn require_available(&self, owner: &Address, amount: Amount) -> TokenResult<()> {
        let available = self.available_balance_of(owner)?;
        if available < amount {
            return Err(TokenError::InsufficientAvailableBalance {
                account: *owner,
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Fail with [`TokenError::InsufficientAllowance`] unless `spender`
    /// may spend `amount` of `owner`'s tokens.
    pub(crate) fn require_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                allowance,
                requested: amount,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutation primitives
    // -----------------------------------------------------------------------

    /// Move `amount` from `from` to `to`. Does not look at encumbrances;
    /// callers decide what portion of the balance may move.
    pub(crate) fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        let from_balance = self.balance_of(from);
        let new_from = from_balance.checked_sub(amount).ok_or_else(|| {
            TokenError::InvariantViolated(format!(
                "moving {amount} out of {from:?} which holds {from_balance}"
            ))
        })?;
        if from == to {
            return Ok(());
        }
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "recipient balance" })?;

        self.balances.insert(*from, new_from);
        self.balances.insert(*to, new_to);
        Ok(())
    }

    pub(crate) fn mint(&mut self, to: &Address, amount: Amount) -> TokenResult<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "total supply" })?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "recipient balance" })?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Burn `amount` of `from`'s available balance.
    pub(crate) fn burn(&mut self, from: &Address, amount: Amount) -> TokenResult<()> {
        self.require_available(from, amount)?;
        let balance = self.balance_of(from).checked_sub(amount).ok_or_else(|| {
            TokenError::InvariantViolated(format!("burning {amount} from {from:?}"))
        })?;
        let supply = self.total_supply.checked_sub(amount).ok_or_else(|| {
            TokenError::InvariantViolated(format!("burning {amount} exceeds total supply"))
        })?;
        self.balances.insert(*from, balance);
        self.total_supply = supply;
        Ok(())
    }

    /// Grow `encumbrances[owner][taker]` by `amount`, provided `owner` has
    /// that much available.
    pub(crate) fn add_encumbrance(
        &mut self,
        owner: &Address,
        taker: &Address,
        amount: Amount,
    ) -> TokenResult<EncumbranceDelta> {
        self.require_available(owner, amount)?;

        let previous = self.encumbrance(owner, taker);
        let current = previous
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "encumbrance" })?;
        let total = self
            .encumbered_balance_of(owner)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "encumbered total" })?;

        self.encumbrances
            .entry(*owner)
            .or_default()
            .insert(*taker, current);
        self.encumbered_totals.insert(*owner, total);
        Ok(EncumbranceDelta { previous, current })
    }

    /// Consume exactly `amount` of `taker`'s encumbrance on `owner`.
    pub(crate) fn spend_encumbrance(
        &mut self,
        owner: &Address,
        taker: &Address,
        amount: Amount,
    ) -> TokenResult<EncumbranceDelta> {
        let previous = self.encumbrance(owner, taker);
        let current = previous
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientEncumbrance {
                owner: *owner,
                taker: *taker,
                encumbered: previous,
                requested: amount,
            })?;
        self.shrink_encumbrance(owner, taker, previous, current, amount)
    }

    /// Reduce `taker`'s encumbrance on `owner` by up to `amount`. Clamps at
    /// zero instead of failing.
    pub(crate) fn release_encumbrance(
        &mut self,
        owner: &Address,
        taker: &Address,
        amount: Amount,
    ) -> TokenResult<EncumbranceDelta> {
        let previous = self.encumbrance(owner, taker);
        let released = amount.min(previous);
        let current = previous - released;
        self.shrink_encumbrance(owner, taker, previous, current, released)
    }

    fn shrink_encumbrance(
        &mut self,
        owner: &Address,
        taker: &Address,
        previous: Amount,
        current: Amount,
        by: Amount,
    ) -> TokenResult<EncumbranceDelta> {
        if by.is_zero() {
            return Ok(EncumbranceDelta { previous, current });
        }
        let total = self
            .encumbered_balance_of(owner)
            .checked_sub(by)
            .ok_or_else(|| {
                TokenError::InvariantViolated(format!(
                    "encumbered total of {owner:?} is below a single encumbrance of {previous}"
                ))
            })?;

        self.encumbrances
            .entry(*owner)
            .or_default()
            .insert(*taker, current);
        self.encumbered_totals.insert(*owner, total);
        Ok(EncumbranceDelta { previous, current })
    }

    /// Absolute set; used by `approve` and `permit`.
    pub(crate) fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    /// Deduct `amount` from `spender`'s allowance over `owner`. An allowance
    /// of `Amount::MAX` is an unlimited approval and is left untouched.
    pub(crate) fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        self.require_allowance(owner, spender, amount)?;
        let allowance = self.allowance(owner, spender);
        if allowance == Amount::MAX {
            return Ok(());
        }
        self.set_allowance(owner, spender, allowance - amount);
        Ok(())
    }

    /// The nonce `owner`'s next authorization must be signed over, after
    /// checking the counter can still advance.
    pub(crate) fn next_nonce(&self, owner: &Address) -> TokenResult<Amount> {
        self.nonce(owner)
            .checked_add(Amount::one())
            .ok_or(TokenError::Overflow { context: "nonce" })
    }

    /// Advance `owner`'s nonce by exactly one; returns the consumed value.
    pub(crate) fn increment_nonce(&mut self, owner: &Address) -> TokenResult<Amount> {
        let consumed = self.nonce(owner);
        let next = self.next_nonce(owner)?;
        self.nonces.insert(*owner, next);
        Ok(consumed)
    }
}
