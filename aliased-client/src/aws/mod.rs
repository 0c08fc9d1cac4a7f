//! Provider client backed by the AWS SDK

mod classify;

pub(crate) use classify::classify;

use aliased_core::{Account, AccountId, Tag};
use async_trait::async_trait;
use aws_config::SdkConfig;
use chrono::{TimeZone, Utc};
use tracing::debug;

use crate::error::{ErrorKind, ProviderError, Result};
use crate::session::MasterSession;
use crate::{ACCOUNTS_PAGE_SIZE, AliasLookup, AssumedRole, Page, ProviderClient};

/// Organizations and IAM calls made on behalf of the master session
///
/// Stateless apart from the SDK clients; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AwsProviderClient {
    config: SdkConfig,
    organizations: aws_sdk_organizations::Client,
}

impl AwsProviderClient {
    pub fn new(session: &MasterSession) -> Self {
        Self {
            config: session.config().clone(),
            organizations: aws_sdk_organizations::Client::new(session.config()),
        }
    }
}

#[async_trait]
impl ProviderClient for AwsProviderClient {
    async fn list_accounts(&self, page_token: Option<String>) -> Result<Page<Account>> {
        let output = self
            .organizations
            .list_accounts()
            .max_results(ACCOUNTS_PAGE_SIZE)
            .set_next_token(page_token)
            .send()
            .await
            .map_err(classify)?;

        let accounts = output
            .accounts()
            .iter()
            .map(seed_account)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(accounts, output.next_token().map(str::to_string)))
    }

    async fn list_tags(
        &self,
        account_id: &AccountId,
        page_token: Option<String>,
    ) -> Result<Page<Tag>> {
        let output = self
            .organizations
            .list_tags_for_resource()
            .resource_id(account_id.as_str())
            .set_next_token(page_token)
            .send()
            .await
            .map_err(classify)?;

        let tags = output
            .tags()
            .iter()
            .map(|tag| Tag::new(tag.key(), tag.value()))
            .collect();

        Ok(Page::new(tags, output.next_token().map(str::to_string)))
    }

    async fn list_aliases(&self, role: &AssumedRole) -> Result<AliasLookup> {
        let config = aws_sdk_iam::config::Builder::from(&self.config)
            .credentials_provider(role.credentials.clone())
            .build();
        let iam = aws_sdk_iam::Client::from_conf(config);

        match iam.list_account_aliases().send().await {
            Ok(output) => Ok(AliasLookup::Found(output.account_aliases().to_vec())),
            Err(err) => {
                let err = classify(err);
                if err.is_authorization_denied() {
                    debug!("Skipping aliases for {}: {}", role.arn, err);
                    Ok(AliasLookup::Skipped)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Converts an Organizations account into a seeded [`Account`]
fn seed_account(account: &aws_sdk_organizations::types::Account) -> Result<Account> {
    let id = account
        .id()
        .ok_or_else(|| malformed("account without an id"))
        .and_then(|raw| AccountId::parse(raw).map_err(|e| malformed(e.to_string())))?;

    let joined = account
        .joined_timestamp()
        .ok_or_else(|| malformed(format!("account {} has no joined timestamp", id)))?;
    let joined_at = Utc
        .timestamp_opt(joined.secs(), joined.subsec_nanos())
        .single()
        .ok_or_else(|| malformed(format!("account {} has an out of range joined timestamp", id)))?;

    #[allow(deprecated)]
    let status = account.status().map(|s| s.as_str()).unwrap_or_default();

    Ok(Account::seed(id, joined_at, status))
}

fn malformed(message: impl Into<String>) -> ProviderError {
    ProviderError::new(ErrorKind::Service, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_organizations::primitives::DateTime;
    use aws_sdk_organizations::types::{Account as OrgAccount, AccountStatus};

    #[allow(deprecated)]
    fn org_account(id: &str) -> OrgAccount {
        OrgAccount::builder()
            .id(id)
            .joined_timestamp(DateTime::from_millis(1_600_000_000_123))
            .status(AccountStatus::Suspended)
            .build()
    }

    #[test]
    fn test_seed_account() {
        let account = seed_account(&org_account("000000000007")).unwrap();

        assert_eq!(account.id.as_str(), "000000000007");
        assert_eq!(account.status, "SUSPENDED");
        assert_eq!(account.joined_at.timestamp_millis(), 1_600_000_000_123);
        assert!(account.alias.is_empty());
        assert!(account.tags.is_empty());
    }

    #[test]
    fn test_seed_account_rejects_bad_id() {
        let err = seed_account(&org_account("7")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
    }
}
