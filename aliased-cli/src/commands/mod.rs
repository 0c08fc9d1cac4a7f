//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod fetch;
mod init;
mod upsert;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Place the default profile template in ~/.aws/aliased-profiles/config.tmpl
    Init,
    /// Fetch accounts, tags and aliases from the organization
    ///
    /// Uses <PROFILE> to list every account in the organization and to
    /// assume <ACCOUNT_ROLE> in each of them to read its alias.
    Fetch {
        /// Master profile allowed to list accounts and assume roles
        profile: String,

        /// Role name present in every member account
        account_role: String,
    },
    /// Upsert ~/.aws/config with a profile for every fetched account
    Upsert,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Init => init::handle_init_command(config),
        Commands::Fetch {
            profile,
            account_role,
        } => fetch::handle_fetch_command(&profile, &account_role, config).await,
        Commands::Upsert => upsert::handle_upsert_command(config),
    }
}
