//! Ocean CLI
//!
//! Resolves network configurations and manages data NFTs from the command line.

mod config;

use alloy_primitives::{Address, U256};
use anyhow::Context;
use clap::{Parser, Subcommand};
use config::CliConfig;
use ocean_config::{
    ConfigHelper, NetworkConfig, NetworkSelector, ADDRESS_FILE_ENV, AQUARIUS_URI_ENV,
};
use ocean_contracts::{
    EthClient, Erc20Params, HttpTransport, NftDatatoken, NftFactory, PermissionRole, TxReceipt,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ocean")]
#[command(version)]
#[command(about = "Ocean data NFT client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "~/.ocean/ocean.toml")]
    config: PathBuf,

    /// Network name or chain id
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Node JSON-RPC URL, replaces the network's node URI
    #[arg(long, global = true)]
    rpc: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration of a network
    Config {
        /// Network name or chain id (defaults to --network)
        network: Option<String>,

        /// Infura project id appended to the node URI
        #[arg(long)]
        infura_project_id: Option<String>,
    },

    /// List the built-in networks
    Networks,

    /// List the accounts the node can send from
    Accounts,

    /// Data NFT operations
    Nft {
        #[command(subcommand)]
        nft: NftCommands,
    },
}

#[derive(Subcommand)]
enum NftCommands {
    /// Create a data NFT through the network's factory
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        /// ERC721 template index
        #[arg(long, default_value = "1")]
        template: u64,
        /// Sender (defaults to the node's first account)
        #[arg(long)]
        from: Option<Address>,
    },

    /// Show the owner of a data NFT
    Owner { nft: Address },

    /// Show the permissions an account holds
    Permissions { nft: Address, account: Address },

    /// Grant a role: manager, erc20-deployer, metadata-updater, store-updater
    Grant {
        nft: Address,
        role: PermissionRole,
        target: Address,
        #[arg(long)]
        from: Option<Address>,
    },

    /// Revoke a role
    Revoke {
        nft: Address,
        role: PermissionRole,
        target: Address,
        #[arg(long)]
        from: Option<Address>,
    },

    /// Clear every permission on a data NFT
    CleanPermissions {
        nft: Address,
        #[arg(long)]
        from: Option<Address>,
    },

    /// Transfer a data NFT; permissions are reset on chain
    Transfer {
        nft: Address,
        to: Address,
        #[arg(long)]
        from: Option<Address>,
        #[arg(long, default_value = "1")]
        token_id: u64,
        /// Use safeTransferFrom
        #[arg(long)]
        safe: bool,
    },

    /// Create an ERC20 datatoken from a data NFT
    CreateErc20 {
        nft: Address,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        /// Cap in the token's smallest unit
        #[arg(long)]
        cap: U256,
        #[arg(long, default_value = "1")]
        template: u64,
        /// Fee token (none by default)
        #[arg(long)]
        fee_token: Option<Address>,
        #[arg(long)]
        from: Option<Address>,
    },

    /// Show the token URI
    TokenUri {
        nft: Address,
        #[arg(long, default_value = "1")]
        token_id: u64,
    },
}

fn init_logging(verbose: bool, level: &str) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false))
        .init();
}

fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Config helper honouring the file's overrides before the environment
fn config_helper(config: &CliConfig) -> ConfigHelper {
    let address_file = config
        .network
        .address_file
        .as_deref()
        .map(expand_path)
        .or_else(|| std::env::var_os(ADDRESS_FILE_ENV).map(PathBuf::from));
    let aquarius_uri = config
        .network
        .aquarius_uri
        .clone()
        .or_else(|| std::env::var(AQUARIUS_URI_ENV).ok());

    ConfigHelper::new(address_file, aquarius_uri)
}

/// Resolved network plus a client connected to it
struct Session {
    network: NetworkConfig,
    client: EthClient,
}

impl Session {
    fn connect(network: Option<&str>, rpc: Option<&str>, config: &CliConfig) -> anyhow::Result<Self> {
        let name = network.unwrap_or(&config.network.name);
        let network = config_helper(config)
            .try_get_config(
                NetworkSelector::parse(name),
                config.network.infura_project_id.as_deref(),
            )?;

        let url = rpc
            .map(str::to_string)
            .or_else(|| config.rpc.url.clone())
            .unwrap_or_else(|| network.node_uri.clone());
        tracing::debug!("Connecting to {} ({})", url, network.network);

        let transport = HttpTransport::with_timeout(&url, config.rpc.request_timeout())?;
        let client = EthClient::new(Arc::new(transport))
            .with_receipt_polling(config.rpc.poll_interval(), config.rpc.receipt_timeout());

        Ok(Self { network, client })
    }

    /// `from`, or the node's first account
    async fn sender(&self, from: Option<Address>) -> anyhow::Result<Address> {
        if let Some(from) = from {
            return Ok(from);
        }
        let accounts = self.client.accounts().await?;
        accounts
            .first()
            .copied()
            .context("node manages no accounts, pass --from")
    }
}

fn print_receipt(receipt: &TxReceipt) {
    println!("Transaction: {}", receipt.transaction_hash);
    if let Some(block) = receipt.block_number {
        println!("Block: {}", block);
    }
}

async fn run_nft(session: &Session, command: NftCommands) -> anyhow::Result<()> {
    let nft_datatoken = NftDatatoken::new(session.client.clone());

    match command {
        NftCommands::Create { name, symbol, template, from } => {
            let owner = session.sender(from).await?;
            let factory = NftFactory::from_config(session.client.clone(), &session.network)?;
            let nft = factory.create_nft(owner, &name, &symbol, template).await?;
            println!("Data NFT created: {}", nft);
            println!("Owner: {}", owner);
        }

        NftCommands::Owner { nft } => {
            println!("{}", nft_datatoken.get_nft_owner(nft).await?);
        }

        NftCommands::Permissions { nft, account } => {
            let permissions = nft_datatoken.get_nft_permissions(nft, account).await?;
            println!("{}", serde_json::to_string_pretty(&permissions)?);
        }

        NftCommands::Grant { nft, role, target, from } => {
            let caller = session.sender(from).await?;
            let receipt = nft_datatoken.grant(nft, caller, target, role).await?;
            println!("Granted {} to {}", role, target);
            print_receipt(&receipt);
        }

        NftCommands::Revoke { nft, role, target, from } => {
            let caller = session.sender(from).await?;
            let receipt = nft_datatoken.revoke(nft, caller, target, role).await?;
            println!("Revoked {} from {}", role, target);
            print_receipt(&receipt);
        }

        NftCommands::CleanPermissions { nft, from } => {
            let caller = session.sender(from).await?;
            let receipt = nft_datatoken.clean_permissions(nft, caller).await?;
            println!("All permissions cleared");
            print_receipt(&receipt);
        }

        NftCommands::Transfer { nft, to, from, token_id, safe } => {
            let owner = session.sender(from).await?;
            let receipt = if safe {
                nft_datatoken.safe_transfer_nft(nft, owner, to, token_id).await?
            } else {
                nft_datatoken.transfer_nft(nft, owner, to, token_id).await?
            };
            println!("Transferred {} to {}", nft, to);
            print_receipt(&receipt);
        }

        NftCommands::CreateErc20 { nft, name, symbol, cap, template, fee_token, from } => {
            let caller = session.sender(from).await?;
            let params = Erc20Params {
                template_index: template,
                name,
                symbol,
                minter: caller,
                fee_manager: caller,
                market_fee_address: caller,
                fee_token: fee_token.unwrap_or(Address::ZERO),
                cap,
                fee_amount: U256::ZERO,
            };
            let token = nft_datatoken.create_erc20(nft, caller, params).await?;
            println!("Datatoken created: {}", token);
        }

        NftCommands::TokenUri { nft, token_id } => {
            println!("{}", nft_datatoken.get_token_uri(nft, token_id).await?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(&expand_path(&cli.config))?;
    init_logging(cli.verbose, &config.logging.level);

    let network_arg = cli.network.as_deref();
    let rpc_arg = cli.rpc.as_deref();

    match cli.command {
        Commands::Config { network, infura_project_id } => {
            let name = network
                .as_deref()
                .or(network_arg)
                .unwrap_or(&config.network.name);
            let infura = infura_project_id
                .as_deref()
                .or(config.network.infura_project_id.as_deref());

            let resolved = config_helper(&config).try_get_config(NetworkSelector::parse(name), infura)?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }

        Commands::Networks => {
            for network in config_helper(&config).networks() {
                let id = network
                    .network_id
                    .map_or_else(|| "-".to_string(), |id| id.to_string());
                println!("{:<12} {:>6}  {}", network.network, id, network.node_uri);
            }
        }

        Commands::Accounts => {
            let session = Session::connect(network_arg, rpc_arg, &config)?;
            for account in session.client.accounts().await? {
                println!("{}", account);
            }
        }

        Commands::Nft { nft } => {
            let session = Session::connect(network_arg, rpc_arg, &config)?;
            run_nft(&session, nft).await?;
        }
    }

    Ok(())
}
