use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use odb_types::ObjectKind;

#[derive(Parser)]
#[command(
    name = "odb",
    about = "Content-addressed object database with git-compatible loose objects",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Object-store root (objects live under `<dir>/objects`)
    #[arg(long, global = true)]
    pub git_dir: Option<PathBuf>,

    /// TOML file with a `[store]` section
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the object id of a file, optionally writing it
    HashObject(HashObjectArgs),
    /// Print the payload of a stored object
    CatFile(CatFileArgs),
    /// List the entries of a tree object
    LsTree(LsTreeArgs),
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Object kind to interpret the content as
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub kind: ObjectKind,
    /// Write the object into the store
    #[arg(short, long)]
    pub write: bool,
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Expected object kind
    pub kind: ObjectKind,
    pub object: String,
}

#[derive(Args)]
pub struct LsTreeArgs {
    pub object: String,
}
