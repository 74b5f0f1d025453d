//! # Underlying Asset
//!
//! The wrapper consumes exactly two capabilities from the token it wraps:
//! pull into custody (`debit`) and pay out of custody (`credit`). Real ERC-20
//! tokens disagree about how to report success, so the raw answer comes
//! back as a [`CallOutcome`] and [`interpret_call`] decides what it means:
//!
//! | Answer                         | Meaning                     |
//! |--------------------------------|-----------------------------|
//! | reverted                       | failure                     |
//! | no return data                 | success (non-standard token)|
//! | 32-byte ABI bool `true`        | success                     |
//! | 32-byte ABI bool `false`       | failure                     |
//! | anything else                  | protocol error, failure     |

use std::collections::{BTreeMap, BTreeSet};

use etw_protocol::crypto::hash::encode_bool;
use etw_protocol::{Address, Amount};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TokenError, TokenResult};

/// Raw result of a call into the underlying token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call completed and returned these bytes (possibly none).
    Returned(Vec<u8>),
    /// The call reverted.
    Reverted(String),
}

impl CallOutcome {
    /// ABI encoding of a `bool` return value.
    pub fn bool_word(value: bool) -> Self {
        CallOutcome::Returned(encode_bool(value).to_vec())
    }
}

/// The wrapped token, as seen from the wrapper.
pub trait UnderlyingAsset {
    fn name(&self) -> String;
    fn symbol(&self) -> String;
    fn decimals(&self) -> u8;
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Move `amount` from `from` into `custody`.
    fn debit(&mut self, from: &Address, custody: &Address, amount: Amount) -> CallOutcome;

    /// Move `amount` from `custody` to `to`.
    fn credit(&mut self, custody: &Address, to: &Address, amount: Amount) -> CallOutcome;
}

/// Map a raw call result onto success or [`TokenError::UnderlyingTransferFailed`].
pub fn interpret_call(outcome: CallOutcome) -> TokenResult<()> {
    match outcome {
        CallOutcome::Reverted(reason) => Err(TokenError::underlying(format!("reverted: {reason}"))),
        CallOutcome::Returned(data) if data.is_empty() => Ok(()),
        CallOutcome::Returned(data) if data.len() == 32 => {
            let (high, last) = data.split_at(31);
            if high.iter().any(|b| *b != 0) {
                return Err(TokenError::underlying(format!(
                    "return word is not an ABI bool: 0x{}",
                    hex::encode(&data)
                )));
            }
            match last[0] {
                1 => Ok(()),
                0 => Err(TokenError::underlying("transfer returned false")),
                other => Err(TokenError::underlying(format!(
                    "return word is not an ABI bool: last byte {other:#04x}"
                ))),
            }
        }
        CallOutcome::Returned(data) => Err(TokenError::underlying(format!(
            "unexpected {}-byte return value",
            data.len()
        ))),
    }
}

/// Debit through [`interpret_call`].
pub fn safe_debit<A: UnderlyingAsset + ?Sized>(
    asset: &mut A,
    from: &Address,
    custody: &Address,
    amount: Amount,
) -> TokenResult<()> {
    interpret_call(asset.debit(from, custody, amount))
}

/// Credit through [`interpret_call`].
pub fn safe_credit<A: UnderlyingAsset + ?Sized>(
    asset: &mut A,
    custody: &Address,
    to: &Address,
    amount: Amount,
) -> TokenResult<()> {
    interpret_call(asset.credit(custody, to, amount))
}

// ---------------------------------------------------------------------------
// In-memory reference asset
// ---------------------------------------------------------------------------

/// How [`InMemoryAsset`] reports the result of a transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStyle {
    /// Standard ERC-20: returns `true`/`false`.
    #[default]
    Bool,
    /// Returns nothing on success and reverts on failure.
    NoData,
    /// Returns a payload that is not an ABI bool. The transfer is not
    /// applied, as a calling contract would revert the whole call.
    Malformed,
}

const BASIS_POINTS: u64 = 10_000;

/// A plain fungible-token ledger used as the wrapped asset in tests and in
/// the scenario runner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InMemoryAsset {
    name: String,
    symbol: String,
    decimals: u8,
    style: ReturnStyle,
    /// Fee charged on every transfer, burned, in basis points.
    fee_bps: u16,
    balances: BTreeMap<Address, Amount>,
    frozen: BTreeSet<Address>,
    total_supply: Amount,
}

impl InMemoryAsset {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            style: ReturnStyle::Bool,
            fee_bps: 0,
            balances: BTreeMap::new(),
            frozen: BTreeSet::new(),
            total_supply: Amount::zero(),
        }
    }

    pub fn with_return_style(mut self, style: ReturnStyle) -> Self {
        self.style = style;
        self
    }

    /// Charge `fee_bps` basis points on every transfer. Capped at 100%.
    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = fee_bps.min(BASIS_POINTS as u16);
        self
    }

    pub fn return_style(&self) -> ReturnStyle {
        self.style
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn mint(&mut self, to: &Address, amount: Amount) -> TokenResult<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "underlying supply" })?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { context: "underlying balance" })?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Block every transfer into or out of `holder`.
    pub fn freeze(&mut self, holder: Address) {
        self.frozen.insert(holder);
    }

    pub fn unfreeze(&mut self, holder: &Address) {
        self.frozen.remove(holder);
    }

    fn fee_for(&self, amount: Amount) -> Amount {
        let bps = Amount::from(self.fee_bps);
        let scale = Amount::from(BASIS_POINTS);
        match amount.checked_mul(bps) {
            Some(product) => product / scale,
            None => amount / scale * bps,
        }
    }

    fn move_tokens(&mut self, from: &Address, to: &Address, amount: Amount) -> CallOutcome {
        let refusal = if self.frozen.contains(from) || self.frozen.contains(to) {
            Some(format!("account frozen ({from:?} -> {to:?})"))
        } else if self.balance_of(from) < amount {
            Some(format!(
                "{from:?} holds {}, needs {amount}",
                self.balance_of(from)
            ))
        } else {
            None
        };

        if let Some(reason) = refusal {
            debug!(%reason, "underlying transfer refused");
            return match self.style {
                ReturnStyle::Bool => CallOutcome::bool_word(false),
                ReturnStyle::NoData | ReturnStyle::Malformed => CallOutcome::Reverted(reason),
            };
        }
        if self.style == ReturnStyle::Malformed {
            return CallOutcome::Returned(vec![0x01]);
        }

        let fee = self.fee_for(amount);
        let received = amount - fee;
        let from_balance = self.balance_of(from) - amount;
        self.balances.insert(*from, from_balance);
        let to_balance = self.balance_of(to).saturating_add(received);
        self.balances.insert(*to, to_balance);
        self.total_supply = self.total_supply.saturating_sub(fee);

        match self.style {
            ReturnStyle::NoData => CallOutcome::Returned(Vec::new()),
            _ => CallOutcome::bool_word(true),
        }
    }
}

impl UnderlyingAsset for InMemoryAsset {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn symbol(&self) -> String {
        self.symbol.clone()
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    fn debit(&mut self, from: &Address, custody: &Address, amount: Amount) -> CallOutcome {
        self.move_tokens(from, custody, amount)
    }

    fn credit(&mut self, custody: &Address, to: &Address, amount: Amount) -> CallOutcome {
        self.move_tokens(custody, to, amount)
    }
}
