use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use musiclib_bridge_core::{
    AggregateKind, AppConfig, ArtworkRef, AssetQueryOptions, LibraryError, SortSpec,
};
use musiclib_bridge_engine::MusicLibrary;
use musiclib_bridge_providers::{build_provider, spawn_mtime_watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "musiclib-bridge",
    about = "Native music library -> normalized asset listing"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List audio assets with paging, sorting, and filtering
    Tracks(TracksArgs),
    /// List album aggregates
    Albums,
    /// List artist aggregates
    Artists,
    /// List genre aggregates
    Genres,
    /// List folder (playlist) aggregates
    Folders,
    /// List every asset in one album/artist/genre/folder
    GroupAssets {
        /// album, artist, genre, or folder
        kind: String,
        id: String,
    },
    /// Write a track's artwork to a file
    Artwork {
        id: String,
        #[arg(long, default_value = "artwork.img")]
        out: PathBuf,
    },
    /// Show, or request, library authorization
    Permissions {
        #[arg(long)]
        request: bool,
    },
    /// Stream library change events until interrupted
    Watch,
    Doctor,
    Status,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Init,
}

#[derive(Args, Debug)]
struct TracksArgs {
    #[arg(long, default_value_t = 20)]
    first: i64,
    /// Cursor: id of the last item of the previous page
    #[arg(long)]
    after: Option<String>,
    #[arg(long)]
    album: Option<String>,
    #[arg(long)]
    artist: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    /// Inclusive lower creation-time bound, epoch milliseconds
    #[arg(long)]
    created_after: Option<i64>,
    /// Inclusive upper creation-time bound, epoch milliseconds
    #[arg(long)]
    created_before: Option<i64>,
    /// Sort spec like "creationTime ASC"; repeatable, first has precedence
    #[arg(long = "sort")]
    sort: Vec<String>,
}

impl TracksArgs {
    fn into_options(self) -> AssetQueryOptions {
        AssetQueryOptions {
            first: self.first,
            after: self.after,
            album: self.album,
            artist: self.artist,
            genre: self.genre,
            created_after: self.created_after,
            created_before: self.created_before,
            sort_by: SortSpec::parse_list(&self.sort),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.command.unwrap_or(Commands::Status);
    let cfg_path = cli.config.unwrap_or_else(default_config_path);

    if let Commands::Config {
        action: ConfigAction::Init,
    } = cmd
    {
        init_config(&cfg_path)?;
        println!("Initialized config at {}", cfg_path.display());
        return Ok(());
    }

    let cfg = load_or_default(&cfg_path)?;
    init_logging(&cfg.log_level);
    let library = MusicLibrary::new(build_provider(&cfg));

    match cmd {
        Commands::Tracks(args) => {
            let page = library
                .list_assets(&args.into_options())
                .await
                .map_err(fail)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Commands::Albums => print_aggregates(&library, AggregateKind::Album).await?,
        Commands::Artists => print_aggregates(&library, AggregateKind::Artist).await?,
        Commands::Genres => print_aggregates(&library, AggregateKind::Genre).await?,
        Commands::Folders => print_aggregates(&library, AggregateKind::Folder).await?,
        Commands::GroupAssets { kind, id } => {
            let kind = AggregateKind::parse(&kind)
                .ok_or_else(|| anyhow!("unknown group kind {kind:?} (expected album, artist, genre, or folder)"))?;
            let tracks = library.list_assets_by_group(kind, &id).await.map_err(fail)?;
            println!("{}", serde_json::to_string_pretty(&tracks)?);
        }
        Commands::Artwork { id, out } => {
            match library.load_artwork(&ArtworkRef::for_asset(&id)).await {
                Some(artwork) => {
                    std::fs::write(&out, &artwork.data).with_context(|| {
                        format!("failed to write artwork to {}", out.display())
                    })?;
                    println!(
                        "{} ({}x{}, {} bytes) -> {}",
                        artwork.mime,
                        artwork.width,
                        artwork.height,
                        artwork.data.len(),
                        out.display()
                    );
                }
                None => println!("no artwork available for asset {id}"),
            }
        }
        Commands::Permissions { request } => {
            if request {
                let result = library.request_authorization().await;
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("authorized: {}", library.is_authorized());
            }
        }
        Commands::Watch => watch(&cfg, &library).await?,
        Commands::Doctor => doctor(&cfg_path, &cfg, &library).await,
        Commands::Status => status(&library).await,
        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Surfaces the stable machine-readable kind next to the message.
fn fail(err: LibraryError) -> anyhow::Error {
    anyhow!("[{}] {err}", err.code())
}

async fn print_aggregates(library: &MusicLibrary, kind: AggregateKind) -> Result<()> {
    let aggregates = library.list_aggregates(kind).await.map_err(fail)?;
    println!("{}", serde_json::to_string_pretty(&aggregates)?);
    Ok(())
}

async fn watch(cfg: &AppConfig, library: &MusicLibrary) -> Result<()> {
    let mut subscription = library.subscribe();
    let watcher = spawn_mtime_watcher(
        cfg.scan.roots.clone(),
        Duration::from_millis(cfg.intervals.watch_poll_ms),
        library.notifier().clone(),
    );

    info!(backend = library.backend_name(), "watching for library changes");

    loop {
        tokio::select! {
            event = subscription.next() => {
                if event.is_none() {
                    break;
                }
                println!("library changed");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received ctrl-c; shutting down");
                break;
            }
        }
    }

    watcher.abort();
    Ok(())
}

async fn doctor(cfg_path: &Path, cfg: &AppConfig, library: &MusicLibrary) {
    println!("== musiclib-bridge doctor ==");
    println!(
        "Config file: {} ({})",
        cfg_path.display(),
        if cfg_path.exists() { "present" } else { "absent, using defaults" }
    );

    if cfg.scan.roots.is_empty() {
        println!("Library roots: none configured");
    }
    for root in &cfg.scan.roots {
        let state = if !root.exists() {
            "missing"
        } else if std::fs::read_dir(root).is_ok() {
            "readable"
        } else {
            "not readable"
        };
        println!("Library root: {} ({state})", root.display());
    }

    println!("Backend: {}", library.backend_name());
    println!("Authorized: {}", library.is_authorized());

    match library.list_assets(&AssetQueryOptions::default()).await {
        Ok(page) => {
            println!("Assets found: {}", page.total_count);
            let with_artwork = page.assets.iter().filter(|t| t.artwork.is_some()).count();
            println!("First page with artwork: {with_artwork}/{}", page.assets.len());
        }
        Err(err) => println!("Query failed: [{}] {err}", err.code()),
    }
}

async fn status(library: &MusicLibrary) {
    println!("backend: {}", library.backend_name());
    println!("authorized: {}", library.is_authorized());

    match library.list_assets(&AssetQueryOptions::default()).await {
        Ok(page) => println!("tracks: {}", page.total_count),
        Err(err) => println!("tracks: <error: [{}] {err}>", err.code()),
    }
    for (label, kind) in [
        ("albums", AggregateKind::Album),
        ("artists", AggregateKind::Artist),
        ("genres", AggregateKind::Genre),
        ("folders", AggregateKind::Folder),
    ] {
        match library.list_aggregates(kind).await {
            Ok(aggregates) => println!("{label}: {}", aggregates.len()),
            Err(err) => println!("{label}: <error: [{}] {err}>", err.code()),
        }
    }
}

fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("musiclib-bridge").join("config.toml")
}

fn init_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let cfg = AppConfig::default();
    let toml = toml::to_string_pretty(&cfg)?;
    std::fs::write(path, toml)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

fn load_or_default(path: &Path) -> Result<AppConfig> {
    let mut cfg = if !path.exists() {
        AppConfig::default()
    } else {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))?
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("MUSICLIB_BRIDGE_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.log_level = v;
        }
    }
    if let Ok(v) = std::env::var("MUSICLIB_BRIDGE_ROOT") {
        if !v.trim().is_empty() {
            cfg.scan.roots = vec![PathBuf::from(v)];
        }
    }
}
