//! Master session
//!
//! Resolves the SDK configuration of the master profile: the credentials
//! allowed to list the organization and to assume the per-account role.

use aws_config::{BehaviorVersion, ConfigLoader, SdkConfig};
use aws_credential_types::Credentials;
use std::time::SystemTime;
use tracing::{debug, info};

use crate::SESSION_NAME;
use crate::arn::Partition;
use crate::aws::classify;
use crate::error::{ProviderError, Result};
use crate::mfa::MfaPrompt;
use crate::profile::{Profile, ProfileCatalog};

/// SDK configuration for the master profile, shared read-only by all workers
#[derive(Debug, Clone)]
pub struct MasterSession {
    profile: String,
    config: SdkConfig,
}

impl MasterSession {
    /// Loads the named profile from the user's shared profile files
    pub async fn load(profile: &str, prompt: &dyn MfaPrompt) -> Result<Self> {
        let catalog = ProfileCatalog::load().await?;

        Self::load_from(profile, &catalog, prompt).await
    }

    /// Loads the named profile, checking it against an already parsed catalog
    ///
    /// Fails with `configuration` before any provider call when the profile
    /// does not exist. Profiles with `mfa_serial` are exchanged for session
    /// credentials up front.
    pub async fn load_from(
        profile: &str,
        catalog: &ProfileCatalog,
        prompt: &dyn MfaPrompt,
    ) -> Result<Self> {
        let entry = catalog.require(profile)?;

        let config = match entry.mfa_serial() {
            None => loader(profile).load().await,
            Some(serial) => {
                debug!("Profile {} requires MFA device {}", profile, serial);
                let code = prompt.token_code(serial).await?;
                let credentials = exchange_mfa(profile, &entry, serial, &code).await?;
                loader(profile).credentials_provider(credentials).load().await
            }
        };

        info!(
            "Loaded master profile {} (region: {})",
            profile,
            config.region().map(|r| r.as_ref()).unwrap_or("unset")
        );

        Ok(Self {
            profile: profile.to_string(),
            config,
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Partition of the session's region
    pub fn partition(&self) -> Partition {
        Partition::for_region(self.config.region().map(|r| r.as_ref()))
    }
}

fn loader(profile: &str) -> ConfigLoader {
    aws_config::defaults(BehaviorVersion::latest()).profile_name(profile)
}

/// Trades an MFA code for temporary credentials
///
/// Profiles that assume a role do so with the code attached; profiles with
/// long-lived keys get a session token instead.
async fn exchange_mfa(profile: &str, entry: &Profile, serial: &str, code: &str) -> Result<Credentials> {
    let credentials = match entry.role_arn() {
        Some(role_arn) => {
            let source = entry.source_profile().unwrap_or("default");
            let sts = aws_sdk_sts::Client::new(&loader(source).load().await);
            let output = sts
                .assume_role()
                .role_arn(role_arn)
                .role_session_name(SESSION_NAME)
                .serial_number(serial)
                .token_code(code)
                .send()
                .await
                .map_err(classify)?;
            output.credentials
        }
        None => {
            let sts = aws_sdk_sts::Client::new(&loader(profile).load().await);
            let output = sts
                .get_session_token()
                .serial_number(serial)
                .token_code(code)
                .send()
                .await
                .map_err(classify)?;
            output.credentials
        }
    };

    let credentials = credentials
        .ok_or_else(|| ProviderError::authentication("STS returned no credentials for the MFA session"))?;

    Ok(Credentials::new(
        credentials.access_key_id(),
        credentials.secret_access_key(),
        Some(credentials.session_token().to_string()),
        SystemTime::try_from(*credentials.expiration()).ok(),
        "aws-aliased-profiles-mfa",
    ))
}
