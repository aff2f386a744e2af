//! The service facade: the one public entry point callers hold.
//!
//! `LedgerService` wires the registry, ledger, journal, conservation
//! tracker, both engines, and reporting behind a single object, and owns the
//! policy checks that sit above the engines: username/password validation,
//! role gates, and the direct-child gate on password changes. Identity is
//! trusted as supplied — whoever hands us an `AccountId` has already
//! authenticated it.

use std::sync::Arc;

use rust_decimal::Decimal;
use uptree_reporting::{
    AdminSummary, CommissionReport, DashboardSummary, DownlineReport, Reporting, StatementEntry,
};
use uptree_store::{AccountRegistry, ConservationTracker, Journal, Ledger};
use uptree_types::{
    validate_username, Account, AccountId, EngineConfig, Result, Role, UptreeError,
};

use crate::auth::CredentialHasher;
use crate::credit::{CreditEngine, CreditReceipt};
use crate::transfer::{TransferEngine, TransferReceipt};

/// The referral ledger, fully assembled.
pub struct LedgerService {
    config: EngineConfig,
    registry: Arc<AccountRegistry>,
    ledger: Arc<Ledger>,
    tracker: Arc<ConservationTracker>,
    transfers: TransferEngine,
    credits: CreditEngine,
    reporting: Reporting,
    hasher: Box<dyn CredentialHasher>,
}

impl LedgerService {
    /// Assemble a fresh, empty service.
    ///
    /// # Errors
    /// `Configuration` when the config fails validation.
    pub fn new(config: EngineConfig, hasher: Box<dyn CredentialHasher>) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(AccountRegistry::new());
        let ledger = Arc::new(Ledger::new(config.lock_timeout_ms));
        let journal = Arc::new(Journal::new());
        let tracker = Arc::new(ConservationTracker::new());

        let transfers = TransferEngine::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&journal),
            Arc::clone(&tracker),
            config.commission_rate,
        );
        let credits = CreditEngine::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&journal),
            Arc::clone(&tracker),
        );
        let reporting = Reporting::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&journal),
        );

        Ok(Self {
            config,
            registry,
            ledger,
            tracker,
            transfers,
            credits,
            reporting,
            hasher,
        })
    }

    // ------------------------------------------------------------------
    // Registration & authentication
    // ------------------------------------------------------------------

    /// Register a new root account with the default `User` role.
    pub fn register(&self, username: &str, password: &str) -> Result<Account> {
        self.register_with_role(username, password, Role::User)
    }

    /// Register a new root account with the `Admin` role (the network
    /// owner). Typically called once during seeding.
    pub fn register_owner(&self, username: &str, password: &str) -> Result<Account> {
        self.register_with_role(username, password, Role::Admin)
    }

    fn register_with_role(&self, username: &str, password: &str, role: Role) -> Result<Account> {
        validate_username(username)?;
        self.check_password_policy(password)?;
        let hash = self.hasher.hash(password);
        let account = self.registry.insert_root(username, role, hash)?;
        self.ledger.open_account(account.id)?;
        tracing::info!(account = %account.id, username, %role, "Account registered");
        Ok(account)
    }

    /// Verify a username/password pair.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown username or a wrong password —
    /// deliberately the same error, so callers cannot probe for usernames.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AccountId> {
        let account = self.registry.get_by_username(username)?;
        let hash = self.registry.password_hash(account.id)?;
        if !self.hasher.verify(password, &hash) {
            return Err(UptreeError::InvalidCredentials);
        }
        Ok(account.id)
    }

    /// Create a child account directly under `actor`.
    pub fn create_child_account(
        &self,
        actor: AccountId,
        username: &str,
        password: &str,
    ) -> Result<Account> {
        self.registry.get(actor)?;
        validate_username(username)?;
        self.check_password_policy(password)?;
        let hash = self.hasher.hash(password);
        let account = self.registry.insert_child(actor, username, hash)?;
        self.ledger.open_account(account.id)?;
        tracing::info!(
            account = %account.id,
            parent = %actor,
            username,
            "Child account created"
        );
        Ok(account)
    }

    /// Reset a direct child's password.
    ///
    /// # Errors
    /// `UnauthorizedAction` unless `target` is a direct child of `actor`;
    /// `WeakPassword` when the new password fails the policy.
    pub fn change_child_password(
        &self,
        actor: AccountId,
        target: AccountId,
        new_password: &str,
    ) -> Result<()> {
        self.registry.get(actor)?;
        if !self.registry.is_direct_child(actor, target)? {
            return Err(UptreeError::UnauthorizedAction {
                reason: "password changes are limited to direct children".into(),
            });
        }
        self.check_password_policy(new_password)?;
        let hash = self.hasher.hash(new_password);
        self.registry.set_password_hash(target, hash)?;
        tracing::info!(actor = %actor, target = %target, "Child password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Money movement
    // ------------------------------------------------------------------

    /// Transfer `amount` from `actor` to a direct child.
    pub fn transfer(
        &self,
        actor: AccountId,
        receiver: AccountId,
        amount: Decimal,
    ) -> Result<TransferReceipt> {
        self.transfers.transfer(actor, receiver, amount)
    }

    /// Admin-only: credit `amount` to `target`.
    ///
    /// # Errors
    /// `UnauthorizedAction` unless `actor` holds the `Admin` role.
    pub fn issue_credit(
        &self,
        actor: AccountId,
        target: AccountId,
        amount: Decimal,
    ) -> Result<CreditReceipt> {
        let acting = self.registry.get(actor)?;
        if acting.role != Role::Admin {
            tracing::warn!(actor = %actor, "Credit rejected: actor is not an admin");
            return Err(UptreeError::UnauthorizedAction {
                reason: "issuing credit requires the admin role".into(),
            });
        }
        self.credits.issue_credit(actor, target, amount)
    }

    /// Root-only: top up one's own balance.
    pub fn self_recharge(&self, actor: AccountId, amount: Decimal) -> Result<CreditReceipt> {
        self.credits.self_recharge(actor, amount)
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    pub fn get_dashboard_summary(&self, account: AccountId) -> Result<DashboardSummary> {
        self.reporting.dashboard(account)
    }

    pub fn get_downline(&self, account: AccountId) -> Result<DownlineReport> {
        self.reporting.downline(account)
    }

    pub fn get_statement(&self, account: AccountId) -> Result<Vec<StatementEntry>> {
        self.reporting.statement(account)
    }

    pub fn get_commission_history(&self, account: AccountId) -> Result<CommissionReport> {
        self.reporting.commission_history(account)
    }

    /// Admin-only network rollup.
    pub fn get_admin_summary(&self, actor: AccountId) -> Result<AdminSummary> {
        let acting = self.registry.get(actor)?;
        if acting.role != Role::Admin {
            return Err(UptreeError::UnauthorizedAction {
                reason: "the network summary requires the admin role".into(),
            });
        }
        self.reporting.admin_summary()
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Check the supply-conservation invariant: Σ balances must equal
    /// issuance minus leakage.
    ///
    /// # Errors
    /// `ConsistencyViolation` when value was created or destroyed outside
    /// the sanctioned paths.
    pub fn verify_conservation(&self) -> Result<()> {
        self.tracker.verify(self.ledger.total()?)
    }

    /// Total commission leaked by rootless senders since genesis.
    pub fn total_leaked(&self) -> Result<Decimal> {
        self.tracker.total_leaked()
    }

    fn check_password_policy(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.config.min_password_len {
            return Err(UptreeError::WeakPassword {
                min_len: self.config.min_password_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uptree_types::Money;

    use crate::auth::SaltedSha256Hasher;

    use super::*;

    fn service() -> LedgerService {
        LedgerService::new(EngineConfig::default(), Box::new(SaltedSha256Hasher::new())).unwrap()
    }

    #[test]
    fn register_then_authenticate() {
        let svc = service();
        let acct = svc.register("alice", "secret1").unwrap();
        assert_eq!(acct.role, Role::User);
        assert!(acct.is_root());

        let id = svc.authenticate("alice", "secret1").unwrap();
        assert_eq!(id, acct.id);

        let err = svc.authenticate("alice", "wrong-pass").unwrap_err();
        assert!(matches!(err, UptreeError::InvalidCredentials));
        let err = svc.authenticate("nobody", "secret1").unwrap_err();
        assert!(matches!(err, UptreeError::InvalidCredentials));
    }

    #[test]
    fn registration_enforces_policies() {
        let svc = service();
        assert!(matches!(
            svc.register("ab", "secret1").unwrap_err(),
            UptreeError::InvalidUsername { .. }
        ));
        assert!(matches!(
            svc.register("alice", "short").unwrap_err(),
            UptreeError::WeakPassword { .. }
        ));
        svc.register("alice", "secret1").unwrap();
        assert!(matches!(
            svc.register("alice", "secret1").unwrap_err(),
            UptreeError::DuplicateUsername { .. }
        ));
    }

    #[test]
    fn issuing_credit_requires_admin_role() {
        let svc = service();
        let user = svc.register("alice", "secret1").unwrap();
        let admin = svc.register_owner("owner", "secret1").unwrap();

        let err = svc
            .issue_credit(user.id, user.id, Decimal::from(10))
            .unwrap_err();
        assert!(matches!(err, UptreeError::UnauthorizedAction { .. }));

        svc.issue_credit(admin.id, user.id, Decimal::from(10))
            .unwrap();
        let dash = svc.get_dashboard_summary(user.id).unwrap();
        assert_eq!(dash.balance, Money::from_minor(1_000));
    }

    #[test]
    fn change_child_password_is_gated_to_direct_children() {
        let svc = service();
        let root = svc.register("rootacct", "secret1").unwrap();
        let kid = svc
            .create_child_account(root.id, "kiddo", "secret1")
            .unwrap();
        let grandkid = svc
            .create_child_account(kid.id, "grandkid", "secret1")
            .unwrap();

        let err = svc
            .change_child_password(root.id, grandkid.id, "newsecret")
            .unwrap_err();
        assert!(matches!(err, UptreeError::UnauthorizedAction { .. }));

        svc.change_child_password(root.id, kid.id, "newsecret")
            .unwrap();
        assert!(svc.authenticate("kiddo", "newsecret").is_ok());
        assert!(svc.authenticate("kiddo", "secret1").is_err());

        let err = svc
            .change_child_password(root.id, kid.id, "tiny")
            .unwrap_err();
        assert!(matches!(err, UptreeError::WeakPassword { .. }));
    }

    #[test]
    fn admin_summary_is_admin_gated() {
        let svc = service();
        let user = svc.register("alice", "secret1").unwrap();
        let admin = svc.register_owner("owner", "secret1").unwrap();

        assert!(matches!(
            svc.get_admin_summary(user.id).unwrap_err(),
            UptreeError::UnauthorizedAction { .. }
        ));
        let summary = svc.get_admin_summary(admin.id).unwrap();
        assert_eq!(summary.total_accounts, 2);
        assert_eq!(summary.root_accounts, 2);
    }

    #[test]
    fn invalid_config_is_rejected_at_assembly() {
        let config = EngineConfig {
            lock_timeout_ms: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            LedgerService::new(config, Box::new(SaltedSha256Hasher::new())),
            Err(UptreeError::Configuration(_))
        ));
    }
}
