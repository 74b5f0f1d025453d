//! # Authorization Engine
//!
//! Off-chain signed instructions: an allowance grant (`permit`) or an
//! encumbrance grant (`encumber_by_sig`). Both go through the same
//! sequence, and the order matters because it decides which failure the
//! submitter sees:
//!
//! 1. expired? (`now >= expiry`)
//! 2. rebuild the EIP-712 digest over the owner's *stored* nonce
//! 3. verify the signature, by ECDSA recovery or the owner's EIP-1271
//!    callback depending on what the owner is
//! 4. apply the effect, then advance the nonce by one
//!
//! Replaying a consumed authorization fails at step 3 with `BadSignatory`:
//! the digest is rebuilt over the advanced nonce and no longer matches what
//! was signed. If the effect in step 4 fails the nonce stays where it was.

use etw_protocol::crypto::{
    encumber_struct_hash, permit_struct_hash, typed_digest, DomainSeparator, SignatureVerifier,
    SignerRegistry,
};
use etw_protocol::{Address, Amount, Digest, Signature};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::encumbrance;
use crate::error::{TokenError, TokenResult};
use crate::events::{Event, EventLog};
use crate::ledger::Ledger;

/// The payload an owner signs. The nonce is not part of it: the engine
/// always supplies the owner's current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Authorization {
    /// Set `allowance[owner][spender] = amount`.
    Permit {
        owner: Address,
        spender: Address,
        amount: Amount,
        expiry: Amount,
    },
    /// Add `amount` to `encumbrances[owner][taker]`.
    Encumber {
        owner: Address,
        taker: Address,
        amount: Amount,
        expiry: Amount,
    },
}

impl Authorization {
    pub fn owner(&self) -> Address {
        match self {
            Authorization::Permit { owner, .. } | Authorization::Encumber { owner, .. } => *owner,
        }
    }

    pub fn expiry(&self) -> Amount {
        match self {
            Authorization::Permit { expiry, .. } | Authorization::Encumber { expiry, .. } => {
                *expiry
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Authorization::Permit { .. } => "permit",
            Authorization::Encumber { .. } => "encumber",
        }
    }

    /// The digest the owner signs when their nonce is `nonce`.
    pub fn digest(&self, domain: &DomainSeparator, nonce: &Amount) -> Digest {
        let struct_hash = match self {
            Authorization::Permit {
                owner,
                spender,
                amount,
                expiry,
            } => permit_struct_hash(owner, spender, amount, nonce, expiry),
            Authorization::Encumber {
                owner,
                taker,
                amount,
                expiry,
            } => encumber_struct_hash(owner, taker, amount, nonce, expiry),
        };
        typed_digest(domain, &struct_hash)
    }
}

/// Deployment-wide inputs to verification.
#[derive(Clone, Copy)]
pub struct AuthorizationContext<'a> {
    pub domain: &'a DomainSeparator,
    pub signers: &'a SignerRegistry,
    /// Current time in seconds.
    pub now: u64,
}

/// Validate and consume a signed allowance grant.
#[allow(clippy::too_many_arguments)]
pub fn permit(
    ledger: &mut Ledger,
    events: &mut EventLog,
    ctx: &AuthorizationContext<'_>,
    owner: Address,
    spender: Address,
    amount: Amount,
    expiry: Amount,
    signature: &Signature,
) -> TokenResult<Amount> {
    let authorization = Authorization::Permit {
        owner,
        spender,
        amount,
        expiry,
    };
    consume(ledger, events, ctx, &authorization, signature)
}

/// Validate and consume a signed encumbrance grant.
#[allow(clippy::too_many_arguments)]
pub fn encumber_by_sig(
    ledger: &mut Ledger,
    events: &mut EventLog,
    ctx: &AuthorizationContext<'_>,
    owner: Address,
    taker: Address,
    amount: Amount,
    expiry: Amount,
    signature: &Signature,
) -> TokenResult<Amount> {
    let authorization = Authorization::Encumber {
        owner,
        taker,
        amount,
        expiry,
    };
    consume(ledger, events, ctx, &authorization, signature)
}

/// Run the full validation sequence for `authorization` and apply it.
/// Returns the nonce that was consumed.
pub fn consume(
    ledger: &mut Ledger,
    events: &mut EventLog,
    ctx: &AuthorizationContext<'_>,
    authorization: &Authorization,
    signature: &Signature,
) -> TokenResult<Amount> {
    let owner = authorization.owner();
    let expiry = authorization.expiry();
    if Amount::from(ctx.now) >= expiry {
        warn!(kind = authorization.kind(), ?owner, %expiry, now = ctx.now, "authorization expired");
        return Err(TokenError::SignatureExpired {
            expiry,
            now: ctx.now,
        });
    }

    let nonce = ledger.nonce(&owner);
    let digest = authorization.digest(ctx.domain, &nonce);
    let verifier = SignatureVerifier::for_signer(ctx.signers, &owner);
    if let Err(err) = verifier.verify(&owner, &digest, signature) {
        warn!(kind = authorization.kind(), ?owner, %nonce, error = %err, "authorization rejected");
        return Err(err.into());
    }

    // The nonce must be able to advance before anything is written.
    ledger.next_nonce(&owner)?;
    match *authorization {
        Authorization::Permit {
            owner,
            spender,
            amount,
            ..
        } => {
            ledger.set_allowance(&owner, &spender, amount);
            events.record(Event::Approval {
                owner,
                spender,
                amount,
            });
        }
        Authorization::Encumber {
            owner,
            taker,
            amount,
            ..
        } => {
            encumbrance::encumber(ledger, events, owner, taker, amount)?;
        }
    }
    let consumed = ledger.increment_nonce(&owner)?;

    debug!(kind = authorization.kind(), ?owner, nonce = %consumed, "authorization consumed");
    Ok(consumed)
}
