use anyhow::Context;
use base64::Engine;
use bep52_merkle_core::{
    DIGEST_LEN, EmptyHashCache, Id32, MerkleLayer, PieceLayersEntry, check_piece_layers,
    layer_number_for_piece_length, reduce_to_root,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Encoding {
    #[default]
    Base64,
    Hex,
}

#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// The loglevel
    #[arg(value_enum, short = 'v')]
    log_level: Option<LogLevel>,

    /// How roots and hashes are encoded on the command line.
    #[arg(value_enum, long, global = true, default_value_t = Encoding::Base64)]
    encoding: Encoding,

    #[command(subcommand)]
    subcommand: SubCommand,
}

#[derive(Parser)]
struct RootOpts {
    /// The layer the hashes are at, 0 being the leaves.
    #[arg(short, long, default_value_t = 0)]
    layer: u32,

    /// The layer's hashes, concatenated.
    #[arg(long)]
    hashes: String,
}

#[derive(Parser)]
struct ValidateOpts {
    /// The layer the hashes are at.
    #[arg(short, long, required_unless_present = "piece_length")]
    layer: Option<u32>,

    /// Piece length of the torrent, to derive the piece layer from.
    #[arg(short, long, conflicts_with = "layer")]
    piece_length: Option<i64>,

    /// The expected root (the `piece layers` key).
    #[arg(long)]
    root: String,

    /// The piece layer hashes, concatenated (the `piece layers` value).
    #[arg(long)]
    hashes: String,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Print the merkle layer a piece length corresponds to.
    LayerNumber { piece_length: i64 },
    /// Print the hash of an empty subtree at a layer.
    EmptyHash { layer: u32 },
    /// Reduce a layer of hashes to its root.
    Root(RootOpts),
    /// Check a piece layers entry against its root.
    Validate(ValidateOpts),
}

fn init_logging(opts: &Opts) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_rust_log = match opts.log_level.as_ref() {
        Some(level) => match level {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        },
        None => "warn",
    };
    let stderr_filter = match std::env::var("RUST_LOG").ok() {
        Some(rust_log) => EnvFilter::builder()
            .parse(&rust_log)
            .context("can't parse RUST_LOG")?,
        None => EnvFilter::builder()
            .parse(default_rust_log)
            .context("can't parse default_rust_log")?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(stderr_filter)
        .try_init()
        .context("error initializing logging")?;
    Ok(())
}

fn decode(encoding: Encoding, what: &str, s: &str) -> anyhow::Result<Vec<u8>> {
    match encoding {
        Encoding::Base64 => base64::engine::general_purpose::STANDARD
            .decode(s)
            .with_context(|| format!("{what} is not valid base64")),
        Encoding::Hex => hex::decode(s).with_context(|| format!("{what} is not valid hex")),
    }
}

fn decode_hashes(encoding: Encoding, s: &str) -> anyhow::Result<Vec<Id32>> {
    let raw = decode(encoding, "hashes", s)?;
    let (digests, rest) = raw.as_chunks::<DIGEST_LEN>();
    if !rest.is_empty() {
        anyhow::bail!(
            "hashes are {} bytes long, expected a multiple of {DIGEST_LEN}",
            raw.len()
        );
    }
    Ok(digests.iter().copied().map(Id32::new).collect())
}

fn run(opts: Opts) -> anyhow::Result<()> {
    let cache = EmptyHashCache::global();
    match opts.subcommand {
        SubCommand::LayerNumber { piece_length } => {
            let layer = layer_number_for_piece_length(piece_length).with_context(|| {
                format!("piece length {piece_length} isn't 16 KiB times a power of two")
            })?;
            println!("{layer}");
        }
        SubCommand::EmptyHash { layer } => {
            println!("{}", cache.get(layer)?);
        }
        SubCommand::Root(root_opts) => {
            let hashes = decode_hashes(opts.encoding, &root_opts.hashes)?;
            debug!(layer = root_opts.layer, hashes = hashes.len(), "reducing to root");
            let root = reduce_to_root(cache, &MerkleLayer::new(root_opts.layer, hashes))?;
            println!("{root}");
        }
        SubCommand::Validate(v) => {
            let root = decode(opts.encoding, "root", &v.root)?;
            let hashes = decode(opts.encoding, "hashes", &v.hashes)?;
            let entry = PieceLayersEntry::try_parse(&root, &hashes)
                .context("malformed piece layers entry")?;
            let layer = match (v.layer, v.piece_length) {
                (Some(layer), _) => MerkleLayer::new(layer, entry.hashes),
                (None, Some(piece_length)) => {
                    MerkleLayer::for_piece_length(piece_length, entry.hashes)?
                }
                (None, None) => anyhow::bail!("either --layer or --piece-length is required"),
            };
            info!(root = ?entry.root, layer = layer.number, hashes = layer.hashes.len(), "validating");
            check_piece_layers(cache, &entry.root, &layer)
                .context("piece layers don't match the root")?;
            println!("ok");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(&opts)?;
    run(opts)
}
