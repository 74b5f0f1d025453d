//! # Scenario Runner
//!
//! Replays a JSON scenario against a fresh in-memory deployment and
//! produces a report of the final state.
//!
//! Actors are referred to by name. Each name maps deterministically to a
//! secp256k1 key ([`EcdsaKeypair::from_name`]), so `"alice"` has the same
//! address in every run and signed steps can be produced on the fly. A
//! literal `0x…` address is accepted wherever an actor is expected, but such
//! an actor cannot sign.
//!
//! ```json
//! {
//!   "name": "encumber then pull",
//!   "underlying": { "name": "Dai", "symbol": "DAI", "decimals": 18 },
//!   "balances": { "alice": "100e18" },
//!   "steps": [
//!     { "op": "wrap", "caller": "alice", "amount": "100e18" },
//!     { "op": "encumber", "caller": "alice", "taker": "bob", "amount": "60e18" },
//!     { "op": "transfer_from", "caller": "bob", "src": "alice", "dst": "carol", "amount": "40e18" }
//!   ]
//! }
//! ```
//!
//! A failing step aborts the run. Wrap it in `expect_error` to assert the
//! failure kind instead.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use etw_contracts::{
    Authorization, Clock, EncumberedToken, InMemoryAsset, ManualClock, ReturnStyle, TokenError,
    UnderlyingAsset,
};
use etw_protocol::config::DeploymentConfig;
use etw_protocol::crypto::{DelegatingWallet, EcdsaKeypair};
use etw_protocol::{parse_address, parse_amount, Address, Amount};

/// Default scenario start: 2023-11-14T22:13:20Z.
const DEFAULT_START_TIME: u64 = 1_700_000_000;

/// Default lifetime of a signed authorization, in seconds.
const DEFAULT_EXPIRY_IN: u64 = 3_600;

// ---------------------------------------------------------------------------
// Scenario format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_start_time")]
    pub start_time: u64,
    pub underlying: UnderlyingSpec,
    /// Underlying balances to mint before the first step.
    #[serde(default)]
    pub balances: BTreeMap<String, String>,
    /// Smart-wallet actors, mapped to the actor whose key controls them.
    #[serde(default)]
    pub contract_signers: BTreeMap<String, String>,
    pub steps: Vec<Step>,
}

fn default_start_time() -> u64 {
    DEFAULT_START_TIME
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnderlyingSpec {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default)]
    pub return_style: ReturnStyle,
    #[serde(default)]
    pub fee_bps: u16,
}

fn default_decimals() -> u8 {
    18
}

/// Validity window and signer overrides of a signed step.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningSpec {
    /// Absolute expiry, as an amount literal so `uint256` max deadlines
    /// can be written. Takes precedence over `expiry_in`.
    pub expiry: Option<String>,
    /// Expiry relative to the scenario clock at signing time.
    pub expiry_in: Option<u64>,
    /// Sign with this actor's key instead of the owner's.
    pub signer: Option<String>,
    /// Sign over this nonce instead of the owner's current one.
    pub nonce: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Wrap {
        caller: String,
        recipient: Option<String>,
        amount: String,
    },
    Unwrap {
        caller: String,
        recipient: Option<String>,
        amount: String,
    },
    Transfer {
        caller: String,
        dst: String,
        amount: String,
    },
    TransferFrom {
        caller: String,
        src: String,
        dst: String,
        amount: String,
    },
    Approve {
        caller: String,
        spender: String,
        amount: String,
    },
    Encumber {
        caller: String,
        taker: String,
        amount: String,
    },
    EncumberFrom {
        caller: String,
        owner: String,
        taker: String,
        amount: String,
    },
    Release {
        caller: String,
        owner: String,
        amount: String,
    },
    Permit {
        owner: String,
        spender: String,
        amount: String,
        #[serde(default)]
        signing: SigningSpec,
    },
    EncumberBySig {
        owner: String,
        taker: String,
        amount: String,
        #[serde(default)]
        signing: SigningSpec,
    },
    AdvanceTime {
        seconds: u64,
    },
    /// Block the holder on the underlying asset.
    Freeze {
        holder: String,
    },
    Unfreeze {
        holder: String,
    },
    /// Run `step` and require it to fail with `error` (a snake_case
    /// failure kind such as `"insufficient_allowance"`).
    ExpectError {
        error: String,
        step: Box<Step>,
    },
}

impl Step {
    fn label(&self) -> &'static str {
        match self {
            Step::Wrap { .. } => "wrap",
            Step::Unwrap { .. } => "unwrap",
            Step::Transfer { .. } => "transfer",
            Step::TransferFrom { .. } => "transfer_from",
            Step::Approve { .. } => "approve",
            Step::Encumber { .. } => "encumber",
            Step::EncumberFrom { .. } => "encumber_from",
            Step::Release { .. } => "release",
            Step::Permit { .. } => "permit",
            Step::EncumberBySig { .. } => "encumber_by_sig",
            Step::AdvanceTime { .. } => "advance_time",
            Step::Freeze { .. } => "freeze",
            Step::Unfreeze { .. } => "unfreeze",
            Step::ExpectError { .. } => "expect_error",
        }
    }
}

/// Read and parse a scenario file.
pub fn load(path: &Path) -> Result<Scenario> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse scenario {}", path.display()))
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub scenario: String,
    pub token: TokenReport,
    pub steps_executed: usize,
    pub event_count: usize,
    pub accounts: BTreeMap<String, AccountReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub chain_id: u64,
    pub address: Address,
    pub domain_separator: String,
    pub total_supply: String,
    pub custody_balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    pub address: Address,
    pub balance: String,
    pub available: String,
    pub encumbered: String,
    pub nonce: String,
    pub underlying: String,
    /// Outstanding encumbrances this account granted, by taker name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub encumbrances: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// Name → address book, with lazily derived keys.
#[derive(Default)]
struct Actors {
    keys: BTreeMap<String, EcdsaKeypair>,
    /// Wallet name → controller name.
    wallets: BTreeMap<String, String>,
    /// Every name resolved so far.
    seen: BTreeMap<String, Address>,
}

impl Actors {
    fn address(&mut self, name: &str) -> Result<Address> {
        if let Some(address) = self.seen.get(name) {
            return Ok(*address);
        }
        let address = if name.starts_with("0x") {
            parse_address(name).with_context(|| format!("bad actor address {name:?}"))?
        } else {
            self.key(name).address()
        };
        self.seen.insert(name.to_string(), address);
        Ok(address)
    }

    fn key(&mut self, name: &str) -> &EcdsaKeypair {
        self.keys
            .entry(name.to_string())
            .or_insert_with(|| EcdsaKeypair::from_name(name))
    }

    /// The key that signs on behalf of `owner`: a wallet's controller, or
    /// the owner itself.
    fn signing_key(&mut self, owner: &str) -> Result<EcdsaKeypair> {
        if owner.starts_with("0x") {
            bail!("actor {owner} is a raw address and has no key to sign with");
        }
        let name = self
            .wallets
            .get(owner)
            .cloned()
            .unwrap_or_else(|| owner.to_string());
        Ok(self.key(&name).clone())
    }

    fn name_of(&self, address: &Address) -> String {
        self.seen
            .iter()
            .find(|(_, a)| *a == address)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| format!("{address:?}"))
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct ScenarioRunner {
    name: String,
    token: EncumberedToken<InMemoryAsset>,
    clock: ManualClock,
    actors: Actors,
    steps_executed: usize,
}

impl ScenarioRunner {
    /// Deploy the scenario's underlying and wrapper and seed balances.
    pub fn deploy(scenario: &Scenario, deployment: DeploymentConfig) -> Result<Self> {
        let underlying = &scenario.underlying;
        let asset = InMemoryAsset::new(
            underlying.name.clone(),
            underlying.symbol.clone(),
            underlying.decimals,
        )
        .with_return_style(underlying.return_style)
        .with_fee_bps(underlying.fee_bps);
        let clock = ManualClock::new(scenario.start_time);
        let mut runner = Self {
            name: scenario.name.clone(),
            token: EncumberedToken::with_clock(asset, deployment, Box::new(clock.clone())),
            clock,
            actors: Actors::default(),
            steps_executed: 0,
        };

        for (holder, amount) in &scenario.balances {
            let address = runner.actors.address(holder)?;
            let amount = amount_of(amount)?;
            runner
                .token
                .underlying_mut()
                .mint(&address, amount)
                .with_context(|| format!("seeding {holder}"))?;
        }

        for (wallet, controller) in &scenario.contract_signers {
            let wallet_address = runner.actors.address(wallet)?;
            let controller_address = runner.actors.address(controller)?;
            runner.actors.wallets.insert(wallet.clone(), controller.clone());
            runner.token.register_contract_signer(
                wallet_address,
                Box::new(DelegatingWallet::new(controller_address)),
            );
        }
        Ok(runner)
    }

    /// Execute every step in order, stopping at the first unexpected failure.
    pub fn run_all(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.execute(step)
                .with_context(|| format!("step {} ({}) failed", index + 1, step.label()))?;
            self.steps_executed += 1;
        }
        info!(
            scenario = %self.name,
            steps = self.steps_executed,
            events = self.token.events().len(),
            "scenario complete"
        );
        Ok(())
    }

    pub fn token(&self) -> &EncumberedToken<InMemoryAsset> {
        &self.token
    }

    fn execute(&mut self, step: &Step) -> Result<()> {
        debug!(op = step.label(), now = self.clock.now(), "executing step");
        match step {
            Step::Wrap {
                caller,
                recipient,
                amount,
            } => {
                let caller_address = self.actors.address(caller)?;
                let recipient = self.actors.address(recipient.as_deref().unwrap_or(caller))?;
                self.token
                    .wrap(caller_address, recipient, amount_of(amount)?)?;
            }
            Step::Unwrap {
                caller,
                recipient,
                amount,
            } => {
                let caller_address = self.actors.address(caller)?;
                let recipient = self.actors.address(recipient.as_deref().unwrap_or(caller))?;
                self.token
                    .unwrap(caller_address, recipient, amount_of(amount)?)?;
            }
            Step::Transfer {
                caller,
                dst,
                amount,
            } => {
                let (caller, dst) = (self.actors.address(caller)?, self.actors.address(dst)?);
                self.token.transfer(caller, dst, amount_of(amount)?)?;
            }
            Step::TransferFrom {
                caller,
                src,
                dst,
                amount,
            } => {
                let caller = self.actors.address(caller)?;
                let src = self.actors.address(src)?;
                let dst = self.actors.address(dst)?;
                self.token
                    .transfer_from(caller, src, dst, amount_of(amount)?)?;
            }
            Step::Approve {
                caller,
                spender,
                amount,
            } => {
                let caller = self.actors.address(caller)?;
                let spender = self.actors.address(spender)?;
                self.token.approve(caller, spender, amount_of(amount)?)?;
            }
            Step::Encumber {
                caller,
                taker,
                amount,
            } => {
                let caller = self.actors.address(caller)?;
                let taker = self.actors.address(taker)?;
                self.token.encumber(caller, taker, amount_of(amount)?)?;
            }
            Step::EncumberFrom {
                caller,
                owner,
                taker,
                amount,
            } => {
                let caller = self.actors.address(caller)?;
                let owner = self.actors.address(owner)?;
                let taker = self.actors.address(taker)?;
                self.token
                    .encumber_from(caller, owner, taker, amount_of(amount)?)?;
            }
            Step::Release {
                caller,
                owner,
                amount,
            } => {
                let caller = self.actors.address(caller)?;
                let owner = self.actors.address(owner)?;
                self.token.release(caller, owner, amount_of(amount)?)?;
            }
            Step::Permit {
                owner,
                spender,
                amount,
                signing,
            } => {
                let owner_address = self.actors.address(owner)?;
                let spender = self.actors.address(spender)?;
                let amount = amount_of(amount)?;
                let expiry = self.expiry(signing)?;
                let authorization = Authorization::Permit {
                    owner: owner_address,
                    spender,
                    amount,
                    expiry,
                };
                let signature = self.sign(owner, &authorization, signing)?;
                self.token
                    .permit(owner_address, spender, amount, expiry, &signature)?;
            }
            Step::EncumberBySig {
                owner,
                taker,
                amount,
                signing,
            } => {
                let owner_address = self.actors.address(owner)?;
                let taker = self.actors.address(taker)?;
                let amount = amount_of(amount)?;
                let expiry = self.expiry(signing)?;
                let authorization = Authorization::Encumber {
                    owner: owner_address,
                    taker,
                    amount,
                    expiry,
                };
                let signature = self.sign(owner, &authorization, signing)?;
                self.token
                    .encumber_by_sig(owner_address, taker, amount, expiry, &signature)?;
            }
            Step::AdvanceTime { seconds } => {
                let now = self.clock.advance(*seconds);
                debug!(now, "clock advanced");
            }
            Step::Freeze { holder } => {
                let holder = self.actors.address(holder)?;
                self.token.underlying_mut().freeze(holder);
            }
            Step::Unfreeze { holder } => {
                let holder = self.actors.address(holder)?;
                self.token.underlying_mut().unfreeze(&holder);
            }
            Step::ExpectError { error, step } => {
                let outcome = self.execute(step);
                match outcome {
                    Ok(()) => {
                        bail!("expected {} to fail with {error}, but it succeeded", step.label())
                    }
                    Err(err) => match err.downcast_ref::<TokenError>() {
                        Some(token_error) if token_error.kind() == error => {
                            debug!(expected = %error, "step failed as expected");
                        }
                        Some(token_error) => bail!(
                            "expected {} to fail with {error}, got {}: {token_error}",
                            step.label(),
                            token_error.kind()
                        ),
                        // Not a contract failure: the scenario itself is broken.
                        None => return Err(err),
                    },
                }
            }
        }
        Ok(())
    }

    fn expiry(&self, signing: &SigningSpec) -> Result<Amount> {
        match &signing.expiry {
            Some(literal) => amount_of(literal),
            None => Ok(Amount::from(
                self.clock
                    .now()
                    .saturating_add(signing.expiry_in.unwrap_or(DEFAULT_EXPIRY_IN)),
            )),
        }
    }

    fn sign(
        &mut self,
        owner: &str,
        authorization: &Authorization,
        signing: &SigningSpec,
    ) -> Result<etw_protocol::Signature> {
        let key = self
            .actors
            .signing_key(signing.signer.as_deref().unwrap_or(owner))?;
        let nonce = match &signing.nonce {
            Some(literal) => amount_of(literal)?,
            None => self.token.nonces(&authorization.owner()),
        };
        let digest = authorization.digest(self.token.domain_separator(), &nonce);
        key.sign_digest(&digest)
            .map_err(|e| anyhow!("signing for {owner} failed: {e}"))
    }

    /// Snapshot the deployment into a report.
    pub fn report(&self) -> Result<Report> {
        let token = &self.token;
        let ledger = token.ledger();
        let mut accounts = BTreeMap::new();

        for (name, address) in &self.actors.seen {
            let encumbrances = ledger
                .encumbrances_of(address)
                .filter(|(_, amount)| !amount.is_zero())
                .map(|(taker, amount)| (self.actors.name_of(taker), amount.to_string()))
                .collect();
            accounts.insert(
                name.clone(),
                AccountReport {
                    address: *address,
                    balance: token.balance_of(address).to_string(),
                    available: token.available_balance_of(address)?.to_string(),
                    encumbered: token.encumbered_balance_of(address).to_string(),
                    nonce: token.nonces(address).to_string(),
                    underlying: token.underlying().balance_of(address).to_string(),
                    encumbrances,
                },
            );
        }

        let deployment = token.deployment();
        Ok(Report {
            scenario: self.name.clone(),
            token: TokenReport {
                name: token.name().to_string(),
                symbol: token.symbol().to_string(),
                decimals: token.decimals(),
                chain_id: deployment.chain_id,
                address: deployment.address,
                domain_separator: format!("0x{}", hex::encode(token.domain_separator().digest())),
                total_supply: token.total_supply().to_string(),
                custody_balance: token.custody_balance().to_string(),
            },
            steps_executed: self.steps_executed,
            event_count: token.events().len(),
            accounts,
        })
    }
}

fn amount_of(literal: &str) -> Result<Amount> {
    parse_amount(literal).with_context(|| format!("bad amount {literal:?}"))
}

/// Load, deploy, run, report.
pub fn run(scenario: &Scenario, deployment: DeploymentConfig) -> Result<Report> {
    info!(
        scenario = %scenario.name,
        steps = scenario.steps.len(),
        chain_id = deployment.chain_id,
        "running scenario"
    );
    let mut runner = ScenarioRunner::deploy(scenario, deployment)?;
    runner.run_all(&scenario.steps)?;
    runner.token().ledger().check_invariants()?;
    runner.report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(json: &str) -> Scenario {
        serde_json::from_str(json).unwrap()
    }

    const PULL: &str = r#"{
        "name": "pull",
        "underlying": { "name": "Dai", "symbol": "DAI" },
        "balances": { "alice": "100e18" },
        "steps": [
            { "op": "wrap", "caller": "alice", "amount": "100e18" },
            { "op": "encumber", "caller": "alice", "taker": "bob", "amount": "60e18" },
            { "op": "transfer_from", "caller": "bob", "src": "alice", "dst": "carol", "amount": "40e18" }
        ]
    }"#;

    #[test]
    fn pull_scenario_reports_final_state() {
        let report = run(&parse(PULL), DeploymentConfig::devnet()).unwrap();
        assert_eq!(report.steps_executed, 3);
        assert_eq!(report.token.symbol, "eDAI");

        let alice = &report.accounts["alice"];
        assert_eq!(alice.balance, "60000000000000000000");
        assert_eq!(alice.available, "40000000000000000000");
        assert_eq!(alice.encumbrances["bob"], "20000000000000000000");
        assert_eq!(report.accounts["carol"].balance, "40000000000000000000");
        assert_eq!(report.token.total_supply, report.token.custody_balance);
    }

    #[test]
    fn failing_step_aborts_with_context() {
        let scenario = parse(
            r#"{
            "underlying": { "name": "Dai", "symbol": "DAI" },
            "steps": [ { "op": "transfer", "caller": "alice", "dst": "bob", "amount": "1" } ]
        }"#,
        );
        let err = run(&scenario, DeploymentConfig::devnet()).unwrap_err();
        assert!(format!("{err:#}").contains("step 1 (transfer) failed"));
    }

    #[test]
    fn expected_errors_are_matched_by_kind() {
        let scenario = parse(
            r#"{
            "underlying": { "name": "Dai", "symbol": "DAI" },
            "balances": { "alice": "100" },
            "steps": [
                { "op": "wrap", "caller": "alice", "amount": "100" },
                { "op": "expect_error", "error": "insufficient_allowance",
                  "step": { "op": "transfer_from", "caller": "bob", "src": "alice", "dst": "bob", "amount": "1" } },
                { "op": "permit", "owner": "alice", "spender": "bob", "amount": "5" },
                { "op": "expect_error", "error": "bad_signatory",
                  "step": { "op": "permit", "owner": "alice", "spender": "bob", "amount": "5", "signing": { "nonce": "0" } } },
                { "op": "expect_error", "error": "signature_expired",
                  "step": { "op": "encumber_by_sig", "owner": "alice", "taker": "bob", "amount": "5", "signing": { "expiry_in": 0 } } }
            ]
        }"#,
        );
        let report = run(&scenario, DeploymentConfig::devnet()).unwrap();
        assert_eq!(report.accounts["alice"].nonce, "1");
    }

    #[test]
    fn max_uint_expiry_outlives_any_clock() {
        let max = format!("0x{}", "f".repeat(64));
        let json = r#"{
            "underlying": { "name": "Dai", "symbol": "DAI" },
            "balances": { "alice": "10" },
            "steps": [
                { "op": "wrap", "caller": "alice", "amount": "10" },
                { "op": "advance_time", "seconds": 1000000000 },
                { "op": "encumber_by_sig", "owner": "alice", "taker": "bob", "amount": "4",
                  "signing": { "expiry": "MAX" } }
            ]
        }"#
        .replace("MAX", &max);
        let report = run(&parse(&json), DeploymentConfig::devnet()).unwrap();
        assert_eq!(report.accounts["alice"].encumbered, "4");
        assert_eq!(report.accounts["alice"].nonce, "1");
    }

    #[test]
    fn mismatched_expectation_fails() {
        let scenario = parse(
            r#"{
            "underlying": { "name": "Dai", "symbol": "DAI" },
            "steps": [
                { "op": "expect_error", "error": "insufficient_allowance",
                  "step": { "op": "transfer", "caller": "alice", "dst": "bob", "amount": "1" } }
            ]
        }"#,
        );
        let err = run(&scenario, DeploymentConfig::devnet()).unwrap_err();
        assert!(format!("{err:#}").contains("insufficient_available_balance"));
    }

    #[test]
    fn contract_signer_authorizes_via_controller() {
        let scenario = parse(
            r#"{
            "underlying": { "name": "Dai", "symbol": "DAI" },
            "balances": { "vault": "50" },
            "contract_signers": { "vault": "treasurer" },
            "steps": [
                { "op": "wrap", "caller": "vault", "amount": "50" },
                { "op": "encumber_by_sig", "owner": "vault", "taker": "bob", "amount": "20" },
                { "op": "expect_error", "error": "bad_signatory",
                  "step": { "op": "encumber_by_sig", "owner": "vault", "taker": "bob", "amount": "1", "signing": { "signer": "mallory" } } }
            ]
        }"#,
        );
        let report = run(&scenario, DeploymentConfig::devnet()).unwrap();
        assert_eq!(report.accounts["vault"].encumbered, "20");
    }

    #[test]
    fn fee_on_transfer_underlying_keeps_custody_matched() {
        let scenario = parse(
            r#"{
            "underlying": { "name": "Tax", "symbol": "TAX", "fee_bps": 100 },
            "balances": { "alice": "1000" },
            "steps": [ { "op": "wrap", "caller": "alice", "amount": "1000" } ]
        }"#,
        );
        let report = run(&scenario, DeploymentConfig::devnet()).unwrap();
        assert_eq!(report.accounts["alice"].balance, "990");
        assert_eq!(report.token.total_supply, "990");
        assert_eq!(report.token.custody_balance, "990");
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = serde_json::from_str::<Scenario>(
            r#"{ "underlying": { "name": "x", "symbol": "x" }, "steps": [], "stpes": [] }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn loads_scenario_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PULL.as_bytes()).unwrap();
        let scenario = load(file.path()).unwrap();
        assert_eq!(scenario.steps.len(), 3);
        assert!(load(Path::new("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn bundled_demo_runs() {
        let scenario: Scenario =
            serde_json::from_str(include_str!("../../demos/encumber_and_pull.json")).unwrap();
        run(&scenario, DeploymentConfig::devnet()).unwrap();
    }
}
