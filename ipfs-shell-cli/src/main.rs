//! ipfs-shell CLI
//!
//! Command-line client for a running IPFS daemon's RPC API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ipfs_shell::{AddOption, PubSubEncoding, Shell, ShellConfig, ShellError};

/// ipfs-shell - talk to an IPFS daemon over its HTTP RPC API
#[derive(Parser)]
#[command(name = "ipfs-shell")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Daemon API address (host:port, URL or multiaddr)
    #[arg(long, global = true, env = "IPFS_API_URL")]
    api: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Pubsub wire encoding (legacy or multibase)
    #[arg(long, global = true, env = "IPFS_PUBSUB_ENCODING")]
    pubsub_encoding: Option<PubSubEncoding>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a file or directory
    Add {
        /// File or directory to add
        path: PathBuf,
        /// Only compute the hash, do not store
        #[arg(long)]
        only_hash: bool,
        /// Do not pin the added content
        #[arg(long)]
        no_pin: bool,
        /// Store leaves as raw blocks
        #[arg(long)]
        raw_leaves: bool,
    },

    /// Print the content at a path
    Cat {
        /// IPFS path or hash
        path: String,
    },

    /// List a directory
    Ls {
        /// IPFS path or hash
        path: String,
    },

    /// Manage pins
    Pin {
        #[command(subcommand)]
        command: PinCommands,
    },

    /// Show the daemon version
    Version,

    /// Publish a message on a pubsub topic
    Pub {
        /// Topic
        topic: String,
        /// Message payload
        data: String,
    },

    /// Print messages received on a pubsub topic
    Sub {
        /// Topic
        topic: String,
        /// Stop after this many messages
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Manage the bootstrap list
    Bootstrap {
        #[command(subcommand)]
        command: BootstrapCommands,
    },

    /// Store and fetch DAG nodes
    Dag {
        #[command(subcommand)]
        command: DagCommands,
    },
}

#[derive(Subcommand)]
enum PinCommands {
    /// Pin a path recursively
    Add { path: String },
    /// Remove a recursive pin
    Rm { path: String },
    /// List pinned objects
    Ls,
}

#[derive(Subcommand)]
enum BootstrapCommands {
    /// Add peers to the bootstrap list
    Add {
        /// Peer multiaddrs
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Restore the default bootstrap peers
    Default,
    /// Remove every bootstrap peer
    RmAll,
}

#[derive(Subcommand)]
enum DagCommands {
    /// Store a JSON document as a CBOR node
    Put {
        /// JSON document
        json: String,
    },
    /// Fetch a node as JSON
    Get {
        /// CID or path
        reference: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "ipfs_shell=debug,ipfs_shell_cli=debug,info"
    } else {
        "ipfs_shell=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let shell = build_shell(&cli)?;

    match cli.command {
        Commands::Add {
            path,
            only_hash,
            no_pin,
            raw_leaves,
        } => cmd_add(&shell, &path, add_options(only_hash, no_pin, raw_leaves)).await,
        Commands::Cat { path } => cmd_cat(&shell, &path).await,
        Commands::Ls { path } => cmd_ls(&shell, &path).await,
        Commands::Pin { command } => cmd_pin(&shell, command).await,
        Commands::Version => cmd_version(&shell).await,
        Commands::Pub { topic, data } => cmd_pub(&shell, &topic, data).await,
        Commands::Sub { topic, count } => cmd_sub(&shell, &topic, count).await,
        Commands::Bootstrap { command } => cmd_bootstrap(&shell, command).await,
        Commands::Dag { command } => cmd_dag(&shell, command).await,
    }
}

fn build_shell(cli: &Cli) -> Result<Shell> {
    let mut config = ShellConfig::from_env().context("Failed to load configuration")?;
    if let Some(api) = &cli.api {
        config.api_url = api.clone();
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(encoding) = cli.pubsub_encoding {
        config = config.with_pubsub_encoding(encoding);
    }
    debug!(api = %config.api_url, timeout = ?config.timeout_seconds, "Using daemon");
    Shell::with_config(config).context("Failed to create shell")
}

fn add_options(only_hash: bool, no_pin: bool, raw_leaves: bool) -> Vec<AddOption> {
    let mut options = Vec::new();
    if only_hash {
        options.push(AddOption::OnlyHash(true));
    }
    if no_pin {
        options.push(AddOption::Pin(false));
    }
    if raw_leaves {
        options.push(AddOption::RawLeaves(true));
    }
    options
}

/// Add a file or directory
async fn cmd_add(shell: &Shell, path: &Path, options: Vec<AddOption>) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    if meta.is_dir() {
        if !options.is_empty() {
            println!(
                "{}",
                "⚠️  --only-hash, --no-pin and --raw-leaves apply to single files only".yellow()
            );
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Adding {}", path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));

        let added = shell.add_dir(path).await;
        pb.finish_and_clear();

        let objects = added.context("Failed to add directory")?;
        for object in &objects {
            println!("{} {} {}", "added".green(), object.hash, object.name);
        }
        return Ok(());
    }

    let object = if options.is_empty() {
        shell.add_file(path).await
    } else {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Cannot open {}", path.display()))?;
        shell.add_reader(file, &options).await
    }
    .context("Failed to add file")?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{} {} {}", "added".green(), object.hash, name);
    Ok(())
}

/// Print content to stdout
async fn cmd_cat(shell: &Shell, path: &str) -> Result<()> {
    let response = shell.cat(path).await.context("Failed to fetch content")?;
    let mut reader = response.into_reader();
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut reader, &mut stdout)
        .await
        .context("Failed to read content")?;
    Ok(())
}

/// List a directory
async fn cmd_ls(shell: &Shell, path: &str) -> Result<()> {
    let links = shell.list(path).await.context("Failed to list directory")?;
    for link in links {
        println!("{} {:>10} {}", link.hash, link.size, link.name);
    }
    Ok(())
}

async fn cmd_pin(shell: &Shell, command: PinCommands) -> Result<()> {
    match command {
        PinCommands::Add { path } => {
            shell.pin(&path).await.context("Failed to pin")?;
            println!("{} {}", "pinned".green(), path);
        }
        PinCommands::Rm { path } => {
            shell.unpin(&path).await.context("Failed to unpin")?;
            println!("{} {}", "unpinned".yellow(), path);
        }
        PinCommands::Ls => {
            let mut pins: Vec<_> = shell
                .pins()
                .await
                .context("Failed to list pins")?
                .into_iter()
                .collect();
            pins.sort_by(|a, b| a.0.cmp(&b.0));
            for (hash, info) in pins {
                println!("{} {}", hash, info.kind.to_string().dimmed());
            }
        }
    }
    Ok(())
}

async fn cmd_version(shell: &Shell) -> Result<()> {
    let version = shell.version().await.context("Daemon is not reachable")?;
    println!("{} {}", "Version:".cyan().bold(), version.version);
    println!("   {} {}", "Commit:".dimmed(), version.commit);
    println!("   {} {}", "Repo:".dimmed(), version.repo);
    println!("   {} {}", "System:".dimmed(), version.system);
    println!("   {} {}", "Go:".dimmed(), version.golang);
    Ok(())
}

async fn cmd_pub(shell: &Shell, topic: &str, data: String) -> Result<()> {
    shell
        .pubsub_publish(topic, data)
        .await
        .context("Failed to publish")?;
    println!("{} {}", "published to".green(), topic);
    Ok(())
}

/// Print messages until the count is reached, the stream ends, or Ctrl+C
async fn cmd_sub(shell: &Shell, topic: &str, count: Option<usize>) -> Result<()> {
    let mut sub = shell
        .pubsub_subscribe(topic)
        .await
        .context("Failed to subscribe")?;
    println!("{} {}", "📡 Listening on".cyan().bold(), topic);

    let handle = sub.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let mut received = 0usize;
    while count.map_or(true, |limit| received < limit) {
        match sub.next().await {
            Ok(msg) => {
                received += 1;
                let data = match msg.data_str() {
                    Some(text) => text.to_string(),
                    None => format!("<{} bytes>", msg.data.len()),
                };
                println!("{} {}", msg.from.dimmed(), data);
            }
            Err(ShellError::SubscriptionClosed) => break,
            Err(ShellError::DecodeError(e)) => {
                eprintln!("{} {}", "skipped undecodable message:".yellow(), e);
            }
            Err(e) => return Err(e).context("Subscription failed"),
        }
    }

    sub.cancel();
    println!("{} {} message(s)", "received".green(), received);
    Ok(())
}

async fn cmd_bootstrap(shell: &Shell, command: BootstrapCommands) -> Result<()> {
    let (verb, peers) = match command {
        BootstrapCommands::Add { peers } => {
            let peers: Vec<&str> = peers.iter().map(String::as_str).collect();
            ("added", shell.bootstrap_add(&peers).await)
        }
        BootstrapCommands::Default => ("added", shell.bootstrap_add_default().await),
        BootstrapCommands::RmAll => ("removed", shell.bootstrap_rm_all().await),
    };

    let peers = peers.context("Bootstrap command failed")?;
    if peers.is_empty() {
        println!("{}", "No peers changed.".yellow());
    }
    for peer in peers {
        println!("{} {}", verb.green(), peer);
    }
    Ok(())
}

async fn cmd_dag(shell: &Shell, command: DagCommands) -> Result<()> {
    match command {
        DagCommands::Put { json } => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Argument is not valid JSON")?;
            let cid = shell.dag_put_json(&value).await.context("Failed to store node")?;
            println!("{}", cid);
        }
        DagCommands::Get { reference } => {
            let node: serde_json::Value = shell
                .dag_get(&reference)
                .await
                .context("Failed to fetch node")?;
            println!("{}", serde_json::to_string_pretty(&node)?);
        }
    }
    Ok(())
}
