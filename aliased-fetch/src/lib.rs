//! Aliased Fetch
//!
//! The discovery engine of aws-aliased-profiles. Given a master profile and
//! the name of a role present in every member account, it lists the
//! organization, enriches each account with its tags and alias, and writes
//! the result to the account store.
//!
//! Architecture:
//! - Configuration: concurrency caps, pacing and retry, from env or defaults
//! - Cancellation: one token shared by the runner and every worker
//! - Scheduler: bounded fan-out that keeps results in seed order
//! - Pipeline: the seed, tag and alias phases

pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod retry;
pub mod scheduler;

pub use cancel::CancelToken;
pub use config::FetchConfig;
pub use error::{FetchError, Result};
pub use pipeline::Pipeline;
pub use progress::{NoProgress, Phase, Progress, TerminalProgress};
pub use retry::RetryPolicy;

use aliased_client::{MfaPrompt, RoleName};
use aliased_core::{Account, AccountStore};
use tracing::info;

/// Discovers the organization of `master_profile` and persists it to `store`
///
/// The role name and configuration are validated, and the master profile
/// resolved, before any provider call is made.
pub async fn discover(
    cancel: &CancelToken,
    master_profile: &str,
    account_role: &str,
    config: FetchConfig,
    prompt: &dyn MfaPrompt,
    store: &AccountStore,
) -> Result<Vec<Account>> {
    let role = RoleName::parse(account_role)?;
    config.validate()?;

    info!(
        "Discovering accounts with profile {} and role {}",
        master_profile, role
    );

    let pipeline = Pipeline::for_profile(master_profile, config, prompt).await?;
    pipeline.run_and_persist(cancel, &role, store).await
}
