//! Integration tests for signed authorizations.
//!
//! Signatures are produced with real secp256k1 keys over the wrapper's own
//! domain separator, so these cover the whole path from signing to the
//! ledger mutation.

use etw_contracts::{Authorization, EncumberedToken, InMemoryAsset, ManualClock, TokenError};
use etw_protocol::config::{DeploymentConfig, SECP256K1_HALF_ORDER};
use etw_protocol::crypto::{DelegatingWallet, EcdsaKeypair, SignatureError};
use etw_protocol::{Address, Amount, Signature};
use primitive_types::{H256, U256};

const START: u64 = 1_700_000_000;
const EXPIRY: u64 = START + 3_600;

fn expiry() -> Amount {
    Amount::from(EXPIRY)
}

struct Deployment {
    token: EncumberedToken<InMemoryAsset>,
    clock: ManualClock,
    alice: EcdsaKeypair,
    bob: Address,
}

fn deploy() -> Deployment {
    let alice = EcdsaKeypair::from_name("alice");
    let mut asset = InMemoryAsset::new("USD Coin", "USDC", 6);
    asset.mint(&alice.address(), Amount::from(1_000)).unwrap();
    let clock = ManualClock::new(START);
    let mut token = EncumberedToken::with_clock(
        asset,
        DeploymentConfig::devnet(),
        Box::new(clock.clone()),
    );
    token
        .wrap(alice.address(), alice.address(), Amount::from(1_000))
        .unwrap();
    Deployment {
        token,
        clock,
        alice,
        bob: EcdsaKeypair::from_name("bob").address(),
    }
}

fn sign(
    token: &EncumberedToken<InMemoryAsset>,
    signer: &EcdsaKeypair,
    authorization: &Authorization,
) -> Signature {
    let nonce = token.nonces(&authorization.owner());
    signer
        .sign_digest(&authorization.digest(token.domain_separator(), &nonce))
        .unwrap()
}

fn encumber_auth(owner: Address, taker: Address, amount: u64) -> Authorization {
    Authorization::Encumber {
        owner,
        taker,
        amount: Amount::from(amount),
        expiry: expiry(),
    }
}

#[test]
fn signed_encumbrance_lets_taker_pull() {
    let mut d = deploy();
    let auth = encumber_auth(d.alice.address(), d.bob, 400);
    let sig = sign(&d.token, &d.alice, &auth);

    d.token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(400), expiry(), &sig)
        .unwrap();
    assert_eq!(d.token.encumbrances(&d.alice.address(), &d.bob), Amount::from(400));
    assert_eq!(d.token.nonces(&d.alice.address()), Amount::one());

    d.token
        .transfer_from(d.bob, d.alice.address(), d.bob, Amount::from(400))
        .unwrap();
    assert_eq!(d.token.balance_of(&d.bob), Amount::from(400));
    d.token.ledger().check_invariants().unwrap();
}

#[test]
fn replayed_permit_fails_with_bad_signatory() {
    let mut d = deploy();
    let auth = Authorization::Permit {
        owner: d.alice.address(),
        spender: d.bob,
        amount: Amount::from(5),
        expiry: expiry(),
    };
    let sig = sign(&d.token, &d.alice, &auth);

    d.token
        .permit(d.alice.address(), d.bob, Amount::from(5), expiry(), &sig)
        .unwrap();
    let err = d
        .token
        .permit(d.alice.address(), d.bob, Amount::from(5), expiry(), &sig)
        .unwrap_err();
    assert_eq!(err, TokenError::Signature(SignatureError::BadSignatory));
    assert_eq!(d.token.nonces(&d.alice.address()), Amount::one());
}

#[test]
fn malleated_signature_changes_nothing() {
    let mut d = deploy();
    let auth = encumber_auth(d.alice.address(), d.bob, 10);
    let mut sig = sign(&d.token, &d.alice, &auth);
    let mut s = [0u8; 32];
    (U256::from_big_endian(SECP256K1_HALF_ORDER.as_bytes()) + U256::one()).to_big_endian(&mut s);
    sig.s = H256(s);

    let events_before = d.token.events().len();
    let ledger_before = d.token.ledger().clone();
    let err = d
        .token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(10), expiry(), &sig)
        .unwrap_err();
    assert_eq!(err, TokenError::Signature(SignatureError::InvalidSignatureS));
    assert_eq!(*d.token.ledger(), ledger_before);
    assert_eq!(d.token.events().len(), events_before);
}

#[test]
fn expired_authorization_rejected_at_expiry() {
    let mut d = deploy();
    let auth = encumber_auth(d.alice.address(), d.bob, 10);
    let sig = sign(&d.token, &d.alice, &auth);
    d.clock.set(EXPIRY);
    let err = d
        .token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(10), expiry(), &sig)
        .unwrap_err();
    assert_eq!(
        err,
        TokenError::SignatureExpired {
            expiry: expiry(),
            now: EXPIRY,
        }
    );
}

#[test]
fn signature_bound_to_other_amount_rejected() {
    let mut d = deploy();
    let auth = encumber_auth(d.alice.address(), d.bob, 10);
    let sig = sign(&d.token, &d.alice, &auth);
    let err = d
        .token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(11), expiry(), &sig)
        .unwrap_err();
    assert_eq!(err, TokenError::Signature(SignatureError::BadSignatory));
}

#[test]
fn signature_from_another_deployment_rejected() {
    let mut d = deploy();
    let other = EncumberedToken::new(
        InMemoryAsset::new("USD Coin", "USDC", 6),
        DeploymentConfig::new(1, Address::repeat_byte(0x42)),
    );
    let auth = encumber_auth(d.alice.address(), d.bob, 10);
    let sig = sign(&other, &d.alice, &auth);
    let err = d
        .token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(10), expiry(), &sig)
        .unwrap_err();
    assert_eq!(err, TokenError::Signature(SignatureError::BadSignatory));
}

#[test]
fn oversized_signed_encumbrance_keeps_nonce() {
    let mut d = deploy();
    let auth = encumber_auth(d.alice.address(), d.bob, 1_001);
    let sig = sign(&d.token, &d.alice, &auth);
    let err = d
        .token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(1_001), expiry(), &sig)
        .unwrap_err();
    assert!(matches!(err, TokenError::InsufficientAvailableBalance { .. }));
    assert_eq!(d.token.nonces(&d.alice.address()), Amount::zero());

    // The same nonce is still usable for a grant that fits.
    let auth = encumber_auth(d.alice.address(), d.bob, 1_000);
    let sig = sign(&d.token, &d.alice, &auth);
    d.token
        .encumber_by_sig(d.alice.address(), d.bob, Amount::from(1_000), expiry(), &sig)
        .unwrap();
}

#[test]
fn smart_wallet_authorizes_through_its_controller() {
    let mut d = deploy();
    let wallet = Address::repeat_byte(0x5a);
    let controller = EcdsaKeypair::from_name("wallet-controller");
    d.token
        .register_contract_signer(wallet, Box::new(DelegatingWallet::new(controller.address())));
    d.token.transfer(d.alice.address(), wallet, Amount::from(100)).unwrap();

    let auth = encumber_auth(wallet, d.bob, 60);
    // The wallet's own key does not exist; only the controller can sign.
    let sig = sign(&d.token, &controller, &auth);
    d.token
        .encumber_by_sig(wallet, d.bob, Amount::from(60), expiry(), &sig)
        .unwrap();
    assert_eq!(d.token.encumbrances(&wallet, &d.bob), Amount::from(60));
    assert_eq!(d.token.nonces(&wallet), Amount::one());

    let stranger = EcdsaKeypair::from_name("stranger");
    let auth = encumber_auth(wallet, d.bob, 1);
    let sig = sign(&d.token, &stranger, &auth);
    let err = d
        .token
        .encumber_by_sig(wallet, d.bob, Amount::from(1), expiry(), &sig)
        .unwrap_err();
    assert_eq!(err, TokenError::Signature(SignatureError::BadSignatory));
}
