//! Role ARNs for member accounts

use aliased_core::AccountId;
use std::fmt;

use crate::error::{ProviderError, Result};

/// Longest role name IAM accepts
pub const MAX_ROLE_NAME_LEN: usize = 64;

/// ARN partition of the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
    #[default]
    Aws,
    AwsCn,
    AwsUsGov,
}

impl Partition {
    /// Partition a region belongs to; unknown or missing regions map to `aws`
    pub fn for_region(region: Option<&str>) -> Self {
        match region {
            Some(r) if r.starts_with("cn-") => Partition::AwsCn,
            Some(r) if r.starts_with("us-gov-") => Partition::AwsUsGov,
            _ => Partition::Aws,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Aws => "aws",
            Partition::AwsCn => "aws-cn",
            Partition::AwsUsGov => "aws-us-gov",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the role assumed in every member account
///
/// Follows the IAM grammar: 1 to 64 characters from `[A-Za-z0-9+=,.@_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleName(String);

impl RoleName {
    pub fn parse(raw: &str) -> Result<Self> {
        let valid_char = |c: char| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c);

        if raw.is_empty() || raw.len() > MAX_ROLE_NAME_LEN || !raw.chars().all(valid_char) {
            return Err(ProviderError::configuration(format!(
                "malformed role name `{}`: expected 1-{} characters of [A-Za-z0-9+=,.@_-]",
                raw, MAX_ROLE_NAME_LEN
            )));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `arn:<partition>:iam::<account-id>:role/<role-name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleArn {
    pub partition: Partition,
    pub account_id: AccountId,
    pub role_name: RoleName,
}

impl RoleArn {
    pub fn new(partition: Partition, account_id: AccountId, role_name: RoleName) -> Self {
        Self {
            partition,
            account_id,
            role_name,
        }
    }
}

impl fmt::Display for RoleArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:iam::{}:role/{}",
            self.partition, self.account_id, self.role_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_arn_format() {
        let arn = RoleArn::new(
            Partition::Aws,
            AccountId::parse("000000000001").unwrap(),
            RoleName::parse("OrganizationAccountAccessRole").unwrap(),
        );
        assert_eq!(
            arn.to_string(),
            "arn:aws:iam::000000000001:role/OrganizationAccountAccessRole"
        );
    }

    #[test]
    fn test_partition_for_region() {
        assert_eq!(Partition::for_region(Some("us-east-1")), Partition::Aws);
        assert_eq!(Partition::for_region(Some("cn-north-1")), Partition::AwsCn);
        assert_eq!(Partition::for_region(Some("us-gov-west-1")), Partition::AwsUsGov);
        assert_eq!(Partition::for_region(None), Partition::Aws);
    }

    #[test]
    fn test_role_name_validation() {
        assert!(RoleName::parse("ReadOnly").is_ok());
        assert!(RoleName::parse("ops+audit=,.@_-1").is_ok());
        assert!(RoleName::parse(&"a".repeat(64)).is_ok());

        for bad in ["", "has space", "path/role", "ünicode", &"a".repeat(65)] {
            let err = RoleName::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "{bad:?}");
        }
    }
}
