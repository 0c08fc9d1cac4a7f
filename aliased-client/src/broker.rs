//! Credential broker backed by STS

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use tracing::debug;

use crate::arn::{Partition, RoleArn};
use crate::error::Result;
use crate::session::MasterSession;
use crate::{AssumedRole, CredentialBroker, SESSION_NAME};

/// Assumes the per-account role with the master session's credentials
///
/// The returned provider calls STS on first use and caches the result for
/// as long as the per-account client holding it lives.
#[derive(Debug, Clone)]
pub struct AwsCredentialBroker {
    config: SdkConfig,
    partition: Partition,
}

impl AwsCredentialBroker {
    pub fn new(session: &MasterSession) -> Self {
        Self {
            config: session.config().clone(),
            partition: session.partition(),
        }
    }
}

#[async_trait]
impl CredentialBroker for AwsCredentialBroker {
    fn partition(&self) -> Partition {
        self.partition
    }

    async fn assume(&self, arn: RoleArn) -> Result<AssumedRole> {
        debug!("Preparing credentials for {}", arn);

        let provider = AssumeRoleProvider::builder(arn.to_string())
            .session_name(SESSION_NAME)
            .configure(&self.config)
            .build()
            .await;

        Ok(AssumedRole {
            arn,
            credentials: SharedCredentialsProvider::new(provider),
        })
    }
}
