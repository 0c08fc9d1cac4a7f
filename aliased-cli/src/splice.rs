//! Config splicing
//!
//! The tool owns the region of `~/.aws/config` between two sentinel lines.
//! Everything before the first and after the second sentinel belongs to the
//! user and is kept, modulo surrounding blank lines.

use anyhow::{Result, bail};

/// Marks the start and end of the managed region
pub const SENTINEL: &str = "### ----- AWS Aliased Profiles -----";

/// Replaces the managed region of `config` with `profiles`
///
/// A config without sentinels gets an empty region appended first. The
/// region is padded by exactly one blank line on each side.
pub fn insert_profiles(config: &str, profiles: &str) -> Result<String> {
    let config = if config.contains(SENTINEL) {
        config.to_string()
    } else {
        format!("{}\n{}\n{}", config, SENTINEL, SENTINEL)
    };

    let parts: Vec<&str> = config.split(SENTINEL).collect();
    if parts.len() != 3 {
        bail!(
            "Expected exactly two `{}` lines in the AWS config, found {}",
            SENTINEL,
            parts.len() - 1
        );
    }

    Ok(format!(
        "{}\n\n{}\n{}\n{}\n\n{}",
        trim_padding(parts[0]),
        SENTINEL,
        trim_padding(profiles),
        SENTINEL,
        trim_padding(parts[2])
    ))
}

/// Strips leading and trailing spaces and newlines, nothing else
fn trim_padding(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: &str = "[profile acme]\nsource_profile = default\n";

    #[test]
    fn test_first_insert_appends_region() {
        let config = "[default]\nregion = us-east-1\n";
        let out = insert_profiles(config, PROFILES).unwrap();

        assert_eq!(
            out,
            format!(
                "[default]\nregion = us-east-1\n\n{S}\n[profile acme]\nsource_profile = default\n{S}\n\n",
                S = SENTINEL
            )
        );
    }

    #[test]
    fn test_replaces_existing_region_and_keeps_user_content() {
        let config = format!(
            "[default]\nregion = us-east-1\n\n{S}\n[profile stale]\n{S}\n\n[profile mine]\nregion = eu-west-1\n",
            S = SENTINEL
        );
        let out = insert_profiles(&config, PROFILES).unwrap();

        assert!(!out.contains("stale"));
        assert!(out.contains("[profile acme]"));
        assert!(out.ends_with("\n\n[profile mine]\nregion = eu-west-1"));
        assert!(out.starts_with("[default]\nregion = us-east-1\n\n"));
    }

    #[test]
    fn test_reinsert_is_stable() {
        let once = insert_profiles("[default]\n", PROFILES).unwrap();
        let twice = insert_profiles(&once, PROFILES).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_single_sentinel_is_rejected() {
        let config = format!("[default]\n{}\n", SENTINEL);
        assert!(insert_profiles(&config, PROFILES).is_err());
    }

    #[test]
    fn test_extra_sentinel_is_rejected() {
        let config = format!("{S}\n{S}\n{S}\n", S = SENTINEL);
        assert!(insert_profiles(&config, PROFILES).is_err());
    }

    #[test]
    fn test_tabs_are_not_trimmed() {
        let out = insert_profiles("", "\t[profile tabbed]\n").unwrap();
        assert!(out.contains("\t[profile tabbed]"));
    }
}
