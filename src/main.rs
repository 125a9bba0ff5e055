use std::path::PathBuf;
use std::process::ExitCode;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use kitty_escrow::commands::init::InitOptions;
use kitty_escrow::commands::{self, CommandContext};
use kitty_escrow::config::{store, wallet};
use kitty_escrow::output::formatter;

#[derive(Parser)]
#[command(name = "kitty-escrow")]
#[command(about = "Mint NFTs, open sale escrows and buy them")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (else $KITTY_CONFIG, else ./kitty.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every escrow created by the NFT contract
    AllEscrows {
        /// The target NFT contract address
        #[arg(short, long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Mint the given URI in the NFT contract
    Mint {
        /// Token metadata URI
        uri: String,
        /// The target NFT contract address
        #[arg(short, long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Create an escrow selling a token for a price in wei
    CreateEscrow {
        /// Token to sell
        #[arg(value_parser = parse_u256)]
        token_id: U256,
        /// Asking price in wei
        #[arg(value_parser = parse_u256)]
        price: U256,
        /// The target NFT contract address
        #[arg(short, long, value_parser = parse_address)]
        address: Option<Address>,
    },
    /// Write a starter kitty.toml (offline, no wallet needed)
    Init {
        /// Node endpoint to record
        #[arg(long)]
        rpc_url: Option<String>,
        /// Default NFT contract address
        #[arg(short, long, value_parser = parse_address)]
        address: Option<Address>,
        /// Block the NFT contract was deployed in
        #[arg(long)]
        from_block: Option<u64>,
    },
    /// Buy an escrow, paying its asking price unless an amount is given
    BuyEscrow {
        /// Escrow contract address
        #[arg(value_parser = parse_address)]
        escrow_address: Address,
        /// Amount to pay in wei
        #[arg(value_parser = parse_u256)]
        wei_amount: Option<U256>,
    },
}

fn parse_address(s: &str) -> Result<Address, String> {
    s.parse()
        .map_err(|err| format!("invalid address `{s}`: {err}"))
}

fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str_radix(s, 10).map_err(|err| format!("invalid amount `{s}`: {err}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_env("KITTY_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .with_timer(fmt::time::SystemTime)
        .init();

    let cli = Cli::parse();
    formatter::set_json_mode(cli.json);

    if let Commands::Init {
        rpc_url,
        address,
        from_block,
    } = cli.command
    {
        let path = store::target_path(cli.config.as_deref());
        let opts = InitOptions {
            rpc_url,
            nft_address: address,
            from_block,
        };
        return match commands::init::run(&path, opts) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                formatter::print_error(&err);
                ExitCode::FAILURE
            }
        };
    }

    let cfg = match store::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            formatter::print_error(&err);
            return ExitCode::FAILURE;
        }
    };

    // Checked before anything touches the network.
    let private_key = match wallet::read_private_key(&cfg.wallet.path) {
        Ok(key) => key,
        Err(err @ wallet::WalletError::Missing { .. }) if !formatter::is_json_mode() => {
            println!("{err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            formatter::print_error(&anyhow::Error::from(err));
            return ExitCode::FAILURE;
        }
    };

    let ctx = match CommandContext::connect(cfg, &private_key).await {
        Ok(ctx) => ctx,
        Err(err) => {
            formatter::print_error(&err);
            return ExitCode::FAILURE;
        }
    };
    drop(private_key);

    tracing::debug!(account = %ctx.market.account(), "command dispatched");

    let result = dispatch(&ctx, cli.command).await;
    ctx.disconnect();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(ctx: &CommandContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::AllEscrows { address } => {
            commands::all_escrows::run(&ctx.market, ctx.nft_address(address)?).await
        }
        Commands::Mint { uri, address } => {
            commands::mint::run(&ctx.market, ctx.nft_address(address)?, &uri).await
        }
        Commands::CreateEscrow {
            token_id,
            price,
            address,
        } => {
            commands::create_escrow::run(&ctx.market, ctx.nft_address(address)?, token_id, price)
                .await
        }
        Commands::BuyEscrow {
            escrow_address,
            wei_amount,
        } => commands::buy_escrow::run(&ctx.market, escrow_address, wei_amount).await,
        Commands::Init { .. } => anyhow::bail!("init does not take a node connection"),
    }
}
