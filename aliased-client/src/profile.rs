//! Shared profile files
//!
//! Only a lookup is needed here: does the master profile exist, and does it
//! ask for MFA. Parsing is the SDK's own, so the tool accepts exactly the
//! files the SDK later resolves credentials from.

use aws_config::profile::ProfileSet;
use aws_config::profile::profile_file::ProfileFiles;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_types::os_shim_internal::{Env, Fs};

use crate::error::{ProviderError, Result};

/// Properties of the master profile the session needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    mfa_serial: Option<String>,
    role_arn: Option<String>,
    source_profile: Option<String>,
}

impl Profile {
    pub fn mfa_serial(&self) -> Option<&str> {
        self.mfa_serial.as_deref()
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    /// Profile holding the credentials used to assume `role_arn`
    pub fn source_profile(&self) -> Option<&str> {
        self.source_profile.as_deref()
    }
}

/// All profiles found in the shared config and credentials files
#[derive(Debug)]
pub struct ProfileCatalog {
    profiles: ProfileSet,
}

impl ProfileCatalog {
    /// Reads both files from the real environment
    ///
    /// `AWS_CONFIG_FILE` and `AWS_SHARED_CREDENTIALS_FILE` are honored, and
    /// missing files are treated as empty.
    pub async fn load() -> Result<Self> {
        Self::load_with(&Fs::real(), &Env::real()).await
    }

    /// Reads both files through the given filesystem and environment
    pub async fn load_with(fs: &Fs, env: &Env) -> Result<Self> {
        let profiles = aws_config::profile::load(fs, env, &ProfileFiles::default(), None)
            .await
            .map_err(|e| {
                ProviderError::configuration(format!(
                    "failed to read the shared config files: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(Self { profiles })
    }

    /// Looks up a profile, failing with `configuration` when it is absent
    ///
    /// `default` is always accepted since the SDK can satisfy it from the
    /// environment alone.
    pub fn require(&self, name: &str) -> Result<Profile> {
        match self.profiles.get_profile(name) {
            Some(profile) => Ok(Profile {
                mfa_serial: profile.get("mfa_serial").map(str::to_string),
                role_arn: profile.get("role_arn").map(str::to_string),
                source_profile: profile.get("source_profile").map(str::to_string),
            }),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ProviderError::configuration(format!(
                "profile `{}` not found in the shared config or credentials file",
                name
            ))),
        }
    }
}
