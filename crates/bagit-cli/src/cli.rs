use std::path::PathBuf;

use bagit::ArchiveFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bagit",
    about = "Create, validate, update and package BagIt bags",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with bag options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ArchiveKind {
    Zip,
    Tgz,
}

impl From<ArchiveKind> for ArchiveFormat {
    fn from(kind: ArchiveKind) -> Self {
        match kind {
            ArchiveKind::Zip => ArchiveFormat::Zip,
            ArchiveKind::Tgz => ArchiveFormat::Tgz,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new bag in a directory
    Init(InitArgs),
    /// Validate a bag directory or archive
    Validate(BagArgs),
    /// Rewrite manifests and tag files from the payload on disk
    Update(UpdateArgs),
    /// Show bag metadata
    Info(BagArgs),
    /// Add a bag-info value
    SetInfo(SetInfoArgs),
    /// Copy a file into the payload
    Add(AddArgs),
    /// Write the bag to a zip or tgz archive
    Package(PackageArgs),
    /// Download the entries listed in fetch.txt
    Fetch(BagArgs),
    /// Add or remove a hash algorithm
    Hash(HashArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: PathBuf,
    /// Hash algorithm for the first manifest
    #[arg(short, long)]
    pub algorithm: Option<String>,
    /// Skip bag-info.txt and tag manifests
    #[arg(long)]
    pub minimal: bool,
}

#[derive(Args)]
pub struct BagArgs {
    pub bag: PathBuf,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub bag: PathBuf,
    /// Only rehash files modified since the manifest was written
    #[arg(long)]
    pub if_modified: bool,
}

#[derive(Args)]
pub struct SetInfoArgs {
    pub bag: PathBuf,
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub bag: PathBuf,
    pub src: PathBuf,
    /// Destination inside data/ (defaults to the source file name)
    pub dest: Option<String>,
}

#[derive(Args)]
pub struct PackageArgs {
    pub bag: PathBuf,
    pub output: PathBuf,
    /// Archive format; inferred from the output extension when omitted
    #[arg(long, value_enum)]
    pub archive: Option<ArchiveKind>,
}

#[derive(Args)]
pub struct HashArgs {
    pub bag: PathBuf,
    #[command(subcommand)]
    pub action: HashAction,
}

#[derive(Subcommand)]
pub enum HashAction {
    Add { algorithm: String },
    Remove { algorithm: String },
}
