//! Discovery pipeline
//!
//! Runs the three phases in strict order over one shared cancellation token:
//!
//! 1. Seed: page through `ListAccounts`
//! 2. Tags: one worker per account, capped at `tag_concurrency`
//! 3. Aliases: one paced worker per account, capped at `alias_concurrency`
//!
//! Each worker owns its Account for the duration of the phase and hands it
//! back when done, so no record is ever shared between tasks.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use aliased_client::{
    AliasLookup, AwsCredentialBroker, AwsProviderClient, CredentialBroker, MasterSession, MfaPrompt,
    ProviderClient, RoleArn, RoleName,
};
use aliased_core::{Account, AccountId, AccountStore, Tag};

use crate::cancel::CancelToken;
use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::progress::{Phase, Progress, TerminalProgress};
use crate::retry::{RetryPolicy, with_backoff};
use crate::scheduler::FanOut;

/// End-to-end discovery over one organization
pub struct Pipeline {
    client: Arc<dyn ProviderClient>,
    broker: Arc<dyn CredentialBroker>,
    config: FetchConfig,
    progress: Arc<dyn Progress>,
}

impl Pipeline {
    /// Creates a pipeline reporting progress on the terminal
    pub fn new(
        client: Arc<dyn ProviderClient>,
        broker: Arc<dyn CredentialBroker>,
        config: FetchConfig,
    ) -> Self {
        Self {
            client,
            broker,
            config,
            progress: Arc::new(TerminalProgress::new()),
        }
    }

    /// Builds a pipeline against the provider using the named master profile
    pub async fn for_profile(
        profile: &str,
        config: FetchConfig,
        prompt: &dyn MfaPrompt,
    ) -> Result<Self> {
        let session = MasterSession::load(profile, prompt).await?;
        info!(
            "Using master profile {} in partition {}",
            session.profile(),
            session.partition()
        );

        Ok(Self::new(
            Arc::new(AwsProviderClient::new(&session)),
            Arc::new(AwsCredentialBroker::new(&session)),
            config,
        ))
    }

    /// Replaces the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Discovers every account with its tags and alias, in listing order
    pub async fn run(&self, cancel: &CancelToken, role: &RoleName) -> Result<Vec<Account>> {
        self.config.validate()?;

        let accounts = self.seed(cancel).await?;
        let accounts = self.enrich_tags(cancel, accounts).await?;
        let accounts = self.enrich_aliases(cancel, role, accounts).await?;

        info!("Discovery finished with {} account(s)", accounts.len());
        Ok(accounts)
    }

    /// Runs discovery and writes the result to `store`
    ///
    /// Nothing is written unless the whole run succeeded.
    pub async fn run_and_persist(
        &self,
        cancel: &CancelToken,
        role: &RoleName,
        store: &AccountStore,
    ) -> Result<Vec<Account>> {
        let accounts = self.run(cancel, role).await?;
        cancel.check()?;

        store.write(&accounts)?;
        info!("Wrote {} account(s) to {}", accounts.len(), store.path().display());

        Ok(accounts)
    }

    async fn seed(&self, cancel: &CancelToken) -> Result<Vec<Account>> {
        self.progress.update(Phase::Accounts, 0);
        let result = self.list_all_accounts(cancel).await;
        self.progress.finish(Phase::Accounts);
        result
    }

    async fn list_all_accounts(&self, cancel: &CancelToken) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = Vec::new();
        let mut seen: HashSet<AccountId> = HashSet::new();
        let mut token: Option<String> = None;
        let mut pages = 0;

        loop {
            cancel.check()?;

            let page = with_backoff(&self.config.retry, cancel, "ListAccounts", || {
                self.client.list_accounts(token.clone())
            })
            .await?;
            pages += 1;

            for account in page.items {
                if !seen.insert(account.id.clone()) {
                    return Err(FetchError::DuplicateAccount(account.id.to_string()));
                }
                accounts.push(account);
            }
            self.progress.update(Phase::Accounts, accounts.len());

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        info!("Listed {} account(s) in {} page(s)", accounts.len(), pages);
        Ok(accounts)
    }

    async fn enrich_tags(&self, cancel: &CancelToken, accounts: Vec<Account>) -> Result<Vec<Account>> {
        let fan_out = FanOut::new(
            Phase::Tags,
            self.config.tag_concurrency,
            cancel.clone(),
            Arc::clone(&self.progress),
        );

        let result = fan_out
            .run(accounts, |mut account| {
                let client = Arc::clone(&self.client);
                let cancel = cancel.clone();
                let retry = self.config.retry;

                async move {
                    account.tags = fetch_tags(client.as_ref(), &cancel, &retry, &account.id).await?;
                    debug!("Account {} has {} tag(s)", account.id, account.tags.len());
                    Ok::<_, FetchError>(account)
                }
            })
            .await;

        self.progress.finish(Phase::Tags);
        result
    }

    async fn enrich_aliases(
        &self,
        cancel: &CancelToken,
        role: &RoleName,
        accounts: Vec<Account>,
    ) -> Result<Vec<Account>> {
        let fan_out = FanOut::new(
            Phase::Aliases,
            self.config.alias_concurrency,
            cancel.clone(),
            Arc::clone(&self.progress),
        );
        let partition = self.broker.partition();

        let result = fan_out
            .run(accounts, |mut account| {
                let client = Arc::clone(&self.client);
                let broker = Arc::clone(&self.broker);
                let cancel = cancel.clone();
                let retry = self.config.retry;
                let pacing = self.config.alias_pacing;
                let arn = RoleArn::new(partition, account.id.clone(), role.clone());

                async move {
                    tokio::select! {
                        _ = tokio::time::sleep(pacing) => {}
                        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    }

                    if let Some(alias) =
                        fetch_alias(client.as_ref(), broker.as_ref(), &cancel, &retry, arn).await?
                    {
                        account.alias = alias;
                    }
                    Ok::<_, FetchError>(account)
                }
            })
            .await;

        self.progress.finish(Phase::Aliases);
        result
    }
}

/// Collects every tag page of one account, checking for cancellation
/// between pages
async fn fetch_tags(
    client: &dyn ProviderClient,
    cancel: &CancelToken,
    retry: &RetryPolicy,
    account_id: &AccountId,
) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    let mut token: Option<String> = None;

    loop {
        cancel.check()?;

        let page = with_backoff(retry, cancel, "ListTagsForResource", || {
            client.list_tags(account_id, token.clone())
        })
        .await?;
        tags.extend(page.items);

        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(tags),
        }
    }
}

/// Looks up the alias under the per-account role
///
/// Returns `None` when the role is unusable or the account does not have
/// exactly one alias.
async fn fetch_alias(
    client: &dyn ProviderClient,
    broker: &dyn CredentialBroker,
    cancel: &CancelToken,
    retry: &RetryPolicy,
    arn: RoleArn,
) -> Result<Option<String>> {
    cancel.check()?;

    let account_id = arn.account_id.clone();
    let assumed = broker.assume(arn).await?;

    let lookup = with_backoff(retry, cancel, "ListAccountAliases", || {
        client.list_aliases(&assumed)
    })
    .await;

    match lookup {
        Ok(found @ AliasLookup::Found(_)) => {
            let alias = found.single().map(str::to_string);
            if alias.is_none() {
                debug!("Account {} has no single alias, leaving it empty", account_id);
            }
            Ok(alias)
        }
        Ok(AliasLookup::Skipped) => {
            debug!("Skipping alias of account {}: role {} not usable", account_id, assumed.arn);
            Ok(None)
        }
        Err(FetchError::Provider(e)) if e.is_authorization_denied() => {
            debug!("Skipping alias of account {}: {}", account_id, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
