//! Aliased Client
//!
//! A thin, testable facade over the three provider endpoints the discovery
//! pipeline needs:
//! - Organizations `ListAccounts` (paginated, 20 per page)
//! - Organizations `ListTagsForResource` (paginated)
//! - IAM `ListAccountAliases` (single shot, under an assumed role)
//!
//! The pipeline only sees the [`ProviderClient`] and [`CredentialBroker`]
//! traits; [`AwsProviderClient`] and [`AwsCredentialBroker`] are the real
//! implementations built from a [`MasterSession`].
//!
//! # Example
//!
//! ```no_run
//! use aliased_client::{AwsProviderClient, MasterSession, StdinMfaPrompt};
//! use aliased_client::ProviderClient;
//!
//! # async fn example() -> aliased_client::Result<()> {
//! let session = MasterSession::load("org-master", &StdinMfaPrompt).await?;
//! let client = AwsProviderClient::new(&session);
//!
//! let first = client.list_accounts(None).await?;
//! println!("{} accounts on the first page", first.items.len());
//! # Ok(())
//! # }
//! ```

pub mod arn;
mod aws;
mod broker;
pub mod error;
pub mod mfa;
pub mod profile;
mod session;

// Re-export commonly used types
pub use arn::{Partition, RoleArn, RoleName};
pub use aws::AwsProviderClient;
pub use broker::AwsCredentialBroker;
pub use error::{ErrorKind, ProviderError, Result};
pub use mfa::{MfaPrompt, StdinMfaPrompt};
pub use session::MasterSession;

use aliased_core::{Account, AccountId, Tag};
use async_trait::async_trait;
use aws_credential_types::provider::SharedCredentialsProvider;

/// Page size of `ListAccounts`; the provider maximum
pub const ACCOUNTS_PAGE_SIZE: i32 = 20;

/// Session name used for every role the tool assumes
pub const SESSION_NAME: &str = "aws-aliased-profiles";

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in provider order
    pub items: Vec<T>,
    /// Token for the next page, absent on the last page
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }
}

/// Outcome of an alias lookup in a member account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasLookup {
    /// The call succeeded; usually zero or one alias
    Found(Vec<String>),
    /// The role is missing or does not trust the master; not an error
    Skipped,
}

impl AliasLookup {
    /// The alias to record: set only when exactly one was returned
    pub fn single(&self) -> Option<&str> {
        match self {
            AliasLookup::Found(aliases) if aliases.len() == 1 => Some(&aliases[0]),
            _ => None,
        }
    }
}

/// Credentials for one member account, acquired lazily on first use
#[derive(Debug, Clone)]
pub struct AssumedRole {
    pub arn: RoleArn,
    pub credentials: SharedCredentialsProvider,
}

/// Read-only view of the provider used by discovery
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Lists one page of organization accounts in their seeded state
    async fn list_accounts(&self, page_token: Option<String>) -> Result<Page<Account>>;

    /// Lists one page of tags attached to an account
    async fn list_tags(&self, account_id: &AccountId, page_token: Option<String>)
    -> Result<Page<Tag>>;

    /// Lists the aliases of the account the role lives in
    ///
    /// An `authorization-denied` failure is reported as [`AliasLookup::Skipped`].
    async fn list_aliases(&self, role: &AssumedRole) -> Result<AliasLookup>;
}

/// Derives per-account credentials from the master session
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Partition the broker builds role ARNs in
    fn partition(&self) -> Partition;

    /// Prepares credentials for the role; no provider call is made until
    /// the returned credentials are first used
    async fn assume(&self, arn: RoleArn) -> Result<AssumedRole>;
}
