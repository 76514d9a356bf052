//! CLI entry point for graphctl — a Microsoft Graph command-line client.
//!
//! Authenticates via OAuth2 client credentials, builds one command context
//! per invocation, and dispatches to the entity command families.
//!
//! Exit codes:
//! - 0: success, including a user-declined confirmation (clean no-op)
//! - 1: runtime error (validation, resolution, API, auth, network)
//! - 2: argument parse error (clap handles this automatically)

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use graphctl::auth::{GRAPH_SCOPE, TokenProvider};
use graphctl::client::GraphClient;
use graphctl::error::Result;
use graphctl::logger::ConsoleLogger;
use graphctl::options::ValidationPolicy;
use graphctl::pipeline::{CommandContext, Outcome};
use graphctl::prompt::StdinPrompter;
use graphctl::{admin_units, groups, users};

#[derive(Parser)]
#[command(name = "graphctl", version, about, long_about = None)]
struct Cli {
    /// Azure AD tenant ID for OAuth2 authentication.
    #[arg(long, env = "GRAPHCTL_TENANT_ID", global = true, default_value = "")]
    tenant_id: String,

    /// Azure AD application (client) ID.
    #[arg(long, env = "GRAPHCTL_CLIENT_ID", global = true, default_value = "")]
    client_id: String,

    /// Azure AD client secret. Prefer setting via the GRAPHCTL_CLIENT_SECRET
    /// environment variable to avoid exposing the secret in process listings
    /// and shell history.
    #[arg(long, env = "GRAPHCTL_CLIENT_SECRET", global = true, default_value = "")]
    secret: String,

    /// Never prompt. Ambiguous name matches become errors and destructive
    /// commands require --force.
    #[arg(long, global = true)]
    non_interactive: bool,

    /// When no id/name selector is supplied, list candidates and prompt
    /// for a pick instead of failing validation. Ignored with
    /// --non-interactive.
    #[arg(long, global = true)]
    prompt_for_selection: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage Microsoft 365 and security groups.
    #[command(subcommand)]
    Group(GroupCommands),
    /// Manage Entra administrative units.
    #[command(subcommand)]
    Adminunit(AdminUnitCommands),
    /// Manage Entra users.
    #[command(subcommand)]
    User(UserCommands),
}

/// Selector shared by commands that address one entity by id or name.
/// Exactly-one-of is enforced by schema validation, not by clap, so the
/// deferred interactive selection policy can relax it.
#[derive(Args)]
struct SelectorArgs {
    /// Target id (GUID).
    #[arg(long)]
    id: Option<String>,

    /// Target display name, resolved to an id via a filtered lookup.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Show one group.
    Get {
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// List groups.
    List {
        /// OData $filter expression, e.g. "securityEnabled eq true".
        #[arg(long)]
        filter: Option<String>,
    },
    /// Update group properties.
    Set {
        #[command(flatten)]
        selector: SelectorArgs,
        /// New display name.
        #[arg(long)]
        display_name: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
        /// New mail nickname.
        #[arg(long)]
        mail_nickname: Option<String>,
    },
    /// Delete a group.
    Remove {
        #[command(flatten)]
        selector: SelectorArgs,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AdminUnitCommands {
    /// Show one administrative unit.
    Get {
        #[command(flatten)]
        selector: SelectorArgs,
    },
    /// List administrative units.
    List {
        /// OData $filter expression.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Delete an administrative unit.
    Remove {
        #[command(flatten)]
        selector: SelectorArgs,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Show one user.
    Get {
        #[command(flatten)]
        selector: SelectorArgs,
        /// Target user principal name (email-shaped sign-in id).
        #[arg(long)]
        upn: Option<String>,
    },
    /// List users.
    List {
        /// OData $filter expression, e.g. "accountEnabled eq false".
        #[arg(long)]
        filter: Option<String>,
    },
    /// Delete a user.
    Remove {
        #[command(flatten)]
        selector: SelectorArgs,
        /// Target user principal name.
        #[arg(long)]
        upn: Option<String>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

async fn dispatch(ctx: &CommandContext<'_>, command: Commands) -> Result<Outcome> {
    match command {
        Commands::Group(cmd) => match cmd {
            GroupCommands::Get { selector } => {
                groups::get_command(ctx, selector.id, selector.name).await
            }
            GroupCommands::List { filter } => groups::list_command(ctx, filter).await,
            GroupCommands::Set {
                selector,
                display_name,
                description,
                mail_nickname,
            } => {
                let update = groups::UpdateGroupRequest {
                    display_name,
                    description,
                    mail_nickname,
                };
                groups::set_command(ctx, selector.id, selector.name, update).await
            }
            GroupCommands::Remove { selector, force } => {
                groups::remove_command(ctx, selector.id, selector.name, force).await
            }
        },
        Commands::Adminunit(cmd) => match cmd {
            AdminUnitCommands::Get { selector } => {
                admin_units::get_command(ctx, selector.id, selector.name).await
            }
            AdminUnitCommands::List { filter } => admin_units::list_command(ctx, filter).await,
            AdminUnitCommands::Remove { selector, force } => {
                admin_units::remove_command(ctx, selector.id, selector.name, force).await
            }
        },
        Commands::User(cmd) => match cmd {
            UserCommands::Get { selector, upn } => {
                users::get_command(ctx, selector.id, upn, selector.name).await
            }
            UserCommands::List { filter } => users::list_command(ctx, filter).await,
            UserCommands::Remove {
                selector,
                upn,
                force,
            } => users::remove_command(ctx, selector.id, upn, selector.name, force).await,
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let tp = TokenProvider::new(&args.tenant_id, &args.client_id, &args.secret, GRAPH_SCOPE);
    let client = GraphClient::new(tp);
    let logger = ConsoleLogger;
    let prompter = StdinPrompter;

    let interactive = !args.non_interactive;
    let ctx = CommandContext {
        client: &client,
        logger: &logger,
        prompter: &prompter,
        interactive,
        policy: ValidationPolicy {
            // Deferral only makes sense when prompting is possible at all.
            defer_missing_selection: args.prompt_for_selection && interactive,
        },
    };

    match dispatch(&ctx, args.command).await {
        // A declined confirmation is a clean user-initiated no-op.
        Ok(Outcome::Done) | Ok(Outcome::Aborted) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
