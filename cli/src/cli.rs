use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use pharmacy_core::storage::{clear_token, resolve_token, save_token};
use pharmacy_core::{
    AdvertiseStore, ApiError, ChangePasswordRequest, ClientConfig, ContactRequest, FileStorage, PharmacyApi,
    PharmacyClient, SubscriptionStore,
};

use crate::error::CliError;
use crate::render;
use crate::transport::UreqTransport;

#[derive(Parser, Debug)]
#[command(name = "pharmacy", about = "Pharmacy marketplace client", version)]
struct Cli {
    /// API base URL (defaults to PHARMACY_API_URL, then http://localhost:3000)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// File holding persisted client state (token, advertise draft)
    #[arg(long, global = true, default_value = ".pharmacy-storage.json")]
    storage: PathBuf,
    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Persist the bearer token used by authenticated commands
    Login { token: String },
    /// Forget the persisted bearer token
    Logout,
    /// Send a contact-us request
    Contact(ContactArgs),
    /// Subscribe to a plan
    Subscribe(SubscribeArgs),
    /// Show the current subscription
    Current(TokenArgs),
    /// List past and present subscriptions
    History(TokenArgs),
    /// Check whether the profile has an active subscription
    Status(TokenArgs),
    /// Change the account password
    ChangePassword(ChangePasswordArgs),
    /// Manage the advertisement draft
    Advertise {
        #[command(subcommand)]
        command: AdvertiseCommand,
    },
}

#[derive(Args, Debug)]
struct TokenArgs {
    /// Bearer token; the persisted one is used when omitted
    #[arg(long)]
    token: Option<String>,
}

#[derive(Args, Debug)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    message: String,
}

#[derive(Args, Debug)]
struct SubscribeArgs {
    plan_name: String,
    plan_type: String,
    #[command(flatten)]
    auth: TokenArgs,
}

#[derive(Args, Debug)]
struct ChangePasswordArgs {
    #[arg(long)]
    current: String,
    #[arg(long)]
    new: String,
    #[command(flatten)]
    auth: TokenArgs,
}

#[derive(Subcommand, Debug)]
enum AdvertiseCommand {
    /// Replace the draft with a JSON value
    Set { json: String },
    /// Print the draft
    Show,
    /// Delete the draft
    Clear,
}

pub(crate) fn run() -> Result<(), CliError> {
    execute(Cli::parse())
}

fn execute(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.base_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };
    let storage = FileStorage::open(&cli.storage)?;
    let api = PharmacyApi::new(
        PharmacyClient::with_config(config),
        UreqTransport::new(Duration::from_secs(cli.timeout)),
    );

    match cli.command {
        Command::Login { token } => {
            save_token(&storage, &token)?;
            println!("Token saved to {}", storage.path().display());
        }
        Command::Logout => {
            clear_token(&storage)?;
            println!("Token removed");
        }
        Command::Contact(args) => {
            let payload = api.send_contact_request(&ContactRequest {
                name: args.name,
                email: args.email,
                message: args.message,
            })?;
            println!("{}", render::value(&payload));
        }
        Command::Subscribe(args) => {
            let store = SubscriptionStore::new(api, &storage);
            let result = store.subscribe(&args.plan_name, &args.plan_type, args.auth.token.as_deref());
            println!("{}", render::subscribe_outcome(&store.state()));
            result?;
        }
        Command::Current(args) => {
            let store = SubscriptionStore::new(api, &storage);
            if let Some(current) = store.fetch_current_subscription(args.token.as_deref())? {
                println!("{}", render::current_subscription(&current));
            }
        }
        Command::History(args) => {
            let store = SubscriptionStore::new(api, &storage);
            let subscriptions = store.fetch_user_subscriptions(args.token.as_deref())?;
            println!("{}", render::history(&subscriptions));
        }
        Command::Status(args) => {
            let store = SubscriptionStore::new(api, &storage);
            let active = store.check_subscription_status(args.token.as_deref())?;
            println!("{}", if active { "subscribed" } else { "not subscribed" });
        }
        Command::ChangePassword(args) => {
            let token = resolve_token(&storage, args.auth.token.as_deref()).ok_or(ApiError::MissingToken)?;
            let payload = api.change_password(
                &ChangePasswordRequest {
                    current_password: args.current,
                    new_password: args.new,
                },
                &token,
            )?;
            println!("{}", render::value(&payload));
        }
        Command::Advertise { command } => {
            let mut store = AdvertiseStore::load(&storage);
            match command {
                AdvertiseCommand::Set { json } => store.set_advertise(serde_json::from_str(&json)?)?,
                AdvertiseCommand::Show => println!("{}", render::value(store.advertise())),
                AdvertiseCommand::Clear => store.clear()?,
            }
        }
    }
    Ok(())
}
