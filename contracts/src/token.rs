//! # Encumbered Token
//!
//! The deployed wrapper. [`EncumberedToken`] owns the one authoritative
//! [`Ledger`] and routes every public operation through the engine that
//! owns its rules. Nothing here writes ledger fields directly.
//!
//! Custody of the underlying asset sits at the deployment's own address,
//! so `underlying.balance_of(deployment.address)` is always equal to
//! `total_supply()`: `wrap` mints exactly what custody received, and
//! `unwrap` burns exactly what it paid out.

use etw_protocol::config::{
    DeploymentConfig, DOMAIN_VERSION, WRAPPED_NAME_PREFIX, WRAPPED_SYMBOL_PREFIX,
};
use etw_protocol::crypto::{ContractSigner, DomainSeparator, SignerRegistry};
use etw_protocol::{Address, Amount, Signature};
use tracing::{debug, info};

use crate::authorization::{self, AuthorizationContext};
use crate::clock::{Clock, SystemClock};
use crate::encumbrance;
use crate::error::{TokenError, TokenResult};
use crate::events::{Event, EventLog};
use crate::ledger::{EncumbranceDelta, Ledger};
use crate::transfer::{self, PullBreakdown};
use crate::underlying::{safe_credit, safe_debit, UnderlyingAsset};

/// Result of a successful `wrap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapReceipt {
    pub requested: Amount,
    /// What custody actually received, and therefore what was minted.
    pub minted: Amount,
}

/// An encumbrance-capable wrapper around an underlying fungible token.
pub struct EncumberedToken<A: UnderlyingAsset> {
    name: String,
    symbol: String,
    decimals: u8,
    deployment: DeploymentConfig,
    domain: DomainSeparator,
    ledger: Ledger,
    events: EventLog,
    underlying: A,
    signers: SignerRegistry,
    clock: Box<dyn Clock>,
}

impl<A: UnderlyingAsset> EncumberedToken<A> {
    /// Deploy a wrapper around `underlying` at `deployment`, reading time
    /// from the system clock.
    pub fn new(underlying: A, deployment: DeploymentConfig) -> Self {
        Self::with_clock(underlying, deployment, Box::new(SystemClock))
    }

    pub fn with_clock(underlying: A, deployment: DeploymentConfig, clock: Box<dyn Clock>) -> Self {
        let name = format!("{WRAPPED_NAME_PREFIX}{}", underlying.name());
        let symbol = format!("{WRAPPED_SYMBOL_PREFIX}{}", underlying.symbol());
        let decimals = underlying.decimals();
        let domain = DomainSeparator::for_deployment(&name, DOMAIN_VERSION, &deployment);
        info!(
            %name,
            %symbol,
            chain_id = deployment.chain_id,
            address = ?deployment.address,
            domain = ?domain.digest(),
            "wrapper deployed"
        );
        Self {
            name,
            symbol,
            decimals,
            deployment,
            domain,
            ledger: Ledger::new(),
            events: EventLog::new(),
            underlying,
            signers: SignerRegistry::new(),
            clock,
        }
    }

    /// Resume from a ledger snapshot. The snapshot is checked before it is
    /// accepted.
    pub fn with_ledger(mut self, ledger: Ledger) -> TokenResult<Self> {
        ledger.check_invariants()?;
        self.ledger = ledger;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn deployment(&self) -> &DeploymentConfig {
        &self.deployment
    }

    pub fn domain_separator(&self) -> &DomainSeparator {
        &self.domain
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.ledger.balance_of(owner)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn available_balance_of(&self, owner: &Address) -> TokenResult<Amount> {
        self.ledger.available_balance_of(owner)
    }

    pub fn encumbered_balance_of(&self, owner: &Address) -> Amount {
        self.ledger.encumbered_balance_of(owner)
    }

    pub fn encumbrances(&self, owner: &Address, taker: &Address) -> Amount {
        self.ledger.encumbrance(owner, taker)
    }

    pub fn nonces(&self, owner: &Address) -> Amount {
        self.ledger.nonce(owner)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn underlying(&self) -> &A {
        &self.underlying
    }

    /// Direct access to the wrapped asset, for seeding balances and
    /// toggling its behaviour. The wrapper's own ledger is not reachable
    /// through this.
    pub fn underlying_mut(&mut self) -> &mut A {
        &mut self.underlying
    }

    /// Underlying held in custody.
    pub fn custody_balance(&self) -> Amount {
        self.underlying.balance_of(&self.deployment.address)
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Mark `address` as a contract signer validated through `signer`.
    pub fn register_contract_signer(&mut self, address: Address, signer: Box<dyn ContractSigner>) {
        debug!(?address, "contract signer registered");
        self.signers.register(address, signer);
    }

    // -----------------------------------------------------------------------
    // Base token operations
    // -----------------------------------------------------------------------

    pub fn approve(&mut self, caller: Address, spender: Address, amount: Amount) -> TokenResult<()> {
        self.ledger.set_allowance(&caller, &spender, amount);
        debug!(owner = ?caller, ?spender, %amount, "approve");
        self.events.record(Event::Approval {
            owner: caller,
            spender,
            amount,
        });
        Ok(())
    }

    pub fn transfer(&mut self, caller: Address, dst: Address, amount: Amount) -> TokenResult<()> {
        transfer::transfer(&mut self.ledger, &mut self.events, caller, dst, amount)
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        src: Address,
        dst: Address,
        amount: Amount,
    ) -> TokenResult<PullBreakdown> {
        transfer::transfer_from(&mut self.ledger, &mut self.events, caller, src, dst, amount)
    }

    // -----------------------------------------------------------------------
    // Encumbrances
    // -----------------------------------------------------------------------

    pub fn encumber(
        &mut self,
        caller: Address,
        taker: Address,
        amount: Amount,
    ) -> TokenResult<EncumbranceDelta> {
        encumbrance::encumber(&mut self.ledger, &mut self.events, caller, taker, amount)
    }

    pub fn encumber_from(
        &mut self,
        caller: Address,
        owner: Address,
        taker: Address,
        amount: Amount,
    ) -> TokenResult<EncumbranceDelta> {
        encumbrance::encumber_from(&mut self.ledger, &mut self.events, caller, owner, taker, amount)
    }

    /// `caller` is the taker giving back its claim on `owner`.
    pub fn release(&mut self, caller: Address, owner: Address, amount: Amount) -> TokenResult<Amount> {
        encumbrance::release(&mut self.ledger, &mut self.events, caller, owner, amount)
    }

    // -----------------------------------------------------------------------
    // Signed authorizations
    // -----------------------------------------------------------------------

    pub fn permit(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
        expiry: Amount,
        signature: &Signature,
    ) -> TokenResult<Amount> {
        let ctx = AuthorizationContext {
            domain: &self.domain,
            signers: &self.signers,
            now: self.clock.now(),
        };
        authorization::permit(
            &mut self.ledger,
            &mut self.events,
            &ctx,
            owner,
            spender,
            amount,
            expiry,
            signature,
        )
    }

    pub fn encumber_by_sig(
        &mut self,
        owner: Address,
        taker: Address,
        amount: Amount,
        expiry: Amount,
        signature: &Signature,
    ) -> TokenResult<Amount> {
        let ctx = AuthorizationContext {
            domain: &self.domain,
            signers: &self.signers,
            now: self.clock.now(),
        };
        authorization::encumber_by_sig(
            &mut self.ledger,
            &mut self.events,
            &ctx,
            owner,
            taker,
            amount,
            expiry,
            signature,
        )
    }

    // -----------------------------------------------------------------------
    // Wrap / unwrap
    // -----------------------------------------------------------------------

    /// Pull `amount` of underlying from `caller` into custody and mint the
    /// amount actually received to `recipient`.
    pub fn wrap(
        &mut self,
        caller: Address,
        recipient: Address,
        amount: Amount,
    ) -> TokenResult<WrapReceipt> {
        if recipient.is_zero() {
            return Err(TokenError::InvalidReceiver(recipient));
        }
        let custody = self.deployment.address;
        if caller == custody {
            return Err(TokenError::InvalidDepositor(caller));
        }
        let before = self.underlying.balance_of(&custody);
        safe_debit(&mut self.underlying, &caller, &custody, amount)?;
        let after = self.underlying.balance_of(&custody);
        let minted = after.checked_sub(before).ok_or_else(|| {
            TokenError::underlying(format!(
                "custody balance fell from {before} to {after} during a deposit"
            ))
        })?;

        self.ledger.mint(&recipient, minted)?;
        if minted != amount {
            debug!(requested = %amount, %minted, "underlying delivered less than requested");
        }
        debug!(depositor = ?caller, ?recipient, %minted, "wrap");
        self.events.record(Event::Wrapped {
            depositor: caller,
            recipient,
            requested: amount,
            minted,
        });
        self.events.record(Event::Transfer {
            from: Address::zero(),
            to: recipient,
            amount: minted,
        });
        Ok(WrapReceipt {
            requested: amount,
            minted,
        })
    }

    /// Burn `amount` of `caller`'s available balance and pay the same
    /// amount of underlying out of custody to `recipient`.
    pub fn unwrap(&mut self, caller: Address, recipient: Address, amount: Amount) -> TokenResult<()> {
        let custody = self.deployment.address;
        if recipient == custody {
            return Err(TokenError::InvalidReceiver(recipient));
        }
        self.ledger.require_available(&caller, amount)?;
        safe_credit(&mut self.underlying, &custody, &recipient, amount)?;
        self.ledger.burn(&caller, amount)?;

        debug!(holder = ?caller, ?recipient, %amount, "unwrap");
        self.events.record(Event::Unwrapped {
            holder: caller,
            recipient,
            amount,
        });
        self.events.record(Event::Transfer {
            from: caller,
            to: Address::zero(),
            amount,
        });
        Ok(())
    }
}

impl<A: UnderlyingAsset + std::fmt::Debug> std::fmt::Debug for EncumberedToken<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncumberedToken")
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("deployment", &self.deployment)
            .field("total_supply", &self.ledger.total_supply())
            .field("underlying", &self.underlying)
            .field("signers", &self.signers)
            .finish_non_exhaustive()
    }
}
