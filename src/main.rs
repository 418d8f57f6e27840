use clap::{Parser, Subcommand};
use league_billing::application::identity::CustomerBridge;
use league_billing::application::ledger::DiscountLedger;
use league_billing::application::onboarding::OnboardingGuard;
use league_billing::config::{SiteConfig, SquareConfig};
use league_billing::domain::discount::apply_discount_str;
use league_billing::domain::ports::{DiscountStoreBox, UserStoreBox};
use league_billing::domain::user::Session;
use league_billing::infrastructure::in_memory::{InMemoryDiscountStore, InMemoryUserStore};
use league_billing::infrastructure::square::SquareClient;
use league_billing::interfaces::csv::discount_reader::{DiscountReader, UserReader};
use league_billing::interfaces::csv::discount_writer::DiscountWriter;
use league_billing::interfaces::csv::seed::{seed_discounts, seed_users};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Discounts CSV; rows whose id is already stored are left untouched
    #[arg(long, global = true)]
    discounts: Option<PathBuf>,

    /// Users CSV; rows whose id is already stored are left untouched
    #[arg(long, global = true)]
    users: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the user's active discount as CSV
    ActiveDiscount { user: String },
    /// Mark a discount as used
    Redeem { id: u64 },
    /// Print BASE reduced by PERCENTAGE percent, to two decimals
    ApplyDiscount { base: String, percentage: String },
    /// Print the user's Square customer id, creating the customer if needed
    EnsureCustomer {
        user: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        given_name: Option<String>,
        #[arg(long)]
        family_name: Option<String>,
    },
    /// Print a Square customer as JSON
    GetCustomer { id: String },
    /// Print where a request from USER would be redirected (no USER = signed out)
    Onboarding { user: Option<String> },
    /// Print the resolved site configuration as JSON
    Site,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<(DiscountStoreBox, UserStoreBox)> {
    use league_billing::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        return Ok((Box::new(store.clone()), Box::new(store)));
    }
    Ok((
        Box::new(InMemoryDiscountStore::new()),
        Box::new(InMemoryUserStore::new()),
    ))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<(DiscountStoreBox, UserStoreBox)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok((
        Box::new(InMemoryDiscountStore::new()),
        Box::new(InMemoryUserStore::new()),
    ))
}

/// Square settings are only resolved by the commands that call Square.
fn square_client() -> Result<SquareClient> {
    let config = SquareConfig::from_env().into_diagnostic()?;
    SquareClient::new(&config).into_diagnostic()
}

async fn seed(
    cli: &Cli,
    discount_store: &DiscountStoreBox,
    user_store: &UserStoreBox,
) -> Result<()> {
    if let Some(path) = &cli.discounts {
        let reader = DiscountReader::new(File::open(path).into_diagnostic()?);
        seed_discounts(reader, discount_store.as_ref())
            .await
            .into_diagnostic()?;
    }

    if let Some(path) = &cli.users {
        let reader = UserReader::new(File::open(path).into_diagnostic()?);
        seed_users(reader, user_store.as_ref())
            .await
            .into_diagnostic()?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("league_billing=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (discount_store, user_store) = open_stores(cli.db_path.as_deref())?;
    seed(&cli, &discount_store, &user_store).await?;

    match cli.command {
        Command::ActiveDiscount { user } => {
            let ledger = DiscountLedger::new(discount_store);
            let active = ledger.active_discount(&user).await.into_diagnostic()?;
            let stdout = io::stdout();
            DiscountWriter::new(stdout.lock())
                .write_discounts(active)
                .into_diagnostic()?;
        }
        Command::Redeem { id } => {
            let ledger = DiscountLedger::new(discount_store);
            ledger.redeem(id).await.into_diagnostic()?;
            println!("redeemed {}", id);
        }
        Command::ApplyDiscount { base, percentage } => {
            println!("{}", apply_discount_str(&base, &percentage).into_diagnostic()?);
        }
        Command::EnsureCustomer {
            user,
            email,
            given_name,
            family_name,
        } => {
            let client = square_client()?;
            let bridge = CustomerBridge::new(user_store, Box::new(client));
            let customer_id = bridge
                .get_or_create_customer(
                    &user,
                    &email,
                    given_name.as_deref(),
                    family_name.as_deref(),
                )
                .await
                .into_diagnostic()?;
            println!("{}", customer_id);
        }
        Command::GetCustomer { id } => {
            let client = square_client()?;
            let bridge = CustomerBridge::new(user_store, Box::new(client));
            let customer = bridge.get_customer(&id).await.into_diagnostic()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&customer).into_diagnostic()?
            );
        }
        Command::Onboarding { user } => {
            let guard = OnboardingGuard::new(user_store);
            let session = user.map(Session::new);
            let redirect = guard.check(session.as_ref()).await.into_diagnostic()?;
            let site = SiteConfig::from_env();
            println!("{}", redirect.path(&site).unwrap_or("proceed"));
        }
        Command::Site => {
            println!(
                "{}",
                serde_json::to_string_pretty(&SiteConfig::from_env()).into_diagnostic()?
            );
        }
    }

    Ok(())
}
