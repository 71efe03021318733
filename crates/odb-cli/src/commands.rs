use std::io::Write;

use anyhow::{bail, Context};
use colored::Colorize;
use odb_store::{
    HexNameResolver, LooseObjectStore, ObjectId, ObjectKind, ObjectStore, StoreConfig, StoreError,
    Tree,
};
use serde::Serialize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = open_store(&cli)?;
    match cli.command {
        Command::HashObject(args) => cmd_hash_object(&store, args, cli.format),
        Command::CatFile(args) => cmd_cat_file(&store, args, cli.format),
        Command::LsTree(args) => cmd_ls_tree(&store, args, cli.format),
    }
}

fn open_store(cli: &Cli) -> anyhow::Result<LooseObjectStore> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(dir) = &cli.git_dir {
        config.root = dir.clone();
    }
    tracing::debug!(root = %config.root.display(), "opening object store");
    Ok(LooseObjectStore::new(config)?)
}

#[derive(Serialize)]
struct HashedObject {
    id: ObjectId,
    kind: ObjectKind,
    written: bool,
}

fn cmd_hash_object(
    store: &dyn ObjectStore,
    args: HashObjectArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let data = std::fs::read(&args.path)
        .with_context(|| format!("cannot read {}", args.path.display()))?;
    let id = store
        .write_payload(args.kind, &data, args.write)
        .with_context(|| format!("{} is not a valid {} object", args.path.display(), args.kind))?;

    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => print_json(&HashedObject {
            id,
            kind: args.kind,
            written: args.write,
        })?,
    }
    Ok(())
}

#[derive(Serialize)]
struct CatObject {
    id: ObjectId,
    kind: ObjectKind,
    size: usize,
    payload: String,
}

fn cmd_cat_file(
    store: &dyn ObjectStore,
    args: CatFileArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (id, object) = store
        .decode_named(&HexNameResolver, &args.object)
        .with_context(|| format!("cannot read object {}", args.object))?;
    if object.kind() != args.kind {
        bail!(
            "object {} is a {}, not a {}",
            id.short_hex().yellow(),
            object.kind(),
            args.kind
        );
    }
    let payload = object.serialize()?;

    match format {
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.flush()?;
        }
        OutputFormat::Json => print_json(&CatObject {
            id,
            kind: object.kind(),
            size: payload.len(),
            payload: String::from_utf8_lossy(&payload).into_owned(),
        })?,
    }
    Ok(())
}

#[derive(Serialize)]
struct ListedEntry {
    mode: String,
    kind: ObjectKind,
    id: ObjectId,
    path: String,
}

fn list_tree(store: &dyn ObjectStore, tree: &Tree) -> anyhow::Result<Vec<ListedEntry>> {
    tree.entries
        .iter()
        .map(|entry| {
            let kind = match store.decode(&entry.target) {
                Ok(target) => target.kind(),
                Err(StoreError::NotFound(_)) => match entry.entry_mode() {
                    Some(mode) => mode.implied_kind(),
                    None => bail!("entry {} has unknown mode {}", entry.path_lossy(), entry.mode),
                },
                Err(e) => return Err(e.into()),
            };
            Ok(ListedEntry {
                mode: entry.padded_mode(),
                kind,
                id: entry.target,
                path: entry.path_lossy(),
            })
        })
        .collect()
}

fn cmd_ls_tree(
    store: &dyn ObjectStore,
    args: LsTreeArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (id, object) = store
        .decode_named(&HexNameResolver, &args.object)
        .with_context(|| format!("cannot read object {}", args.object))?;
    let tree = object
        .into_tree()
        .with_context(|| format!("object {id} is not a tree"))?;
    let entries = list_tree(store, &tree)?;

    match format {
        OutputFormat::Text => {
            for e in &entries {
                println!("{} {} {}\t{}", e.mode, e.kind, e.id, e.path);
            }
        }
        OutputFormat::Json => print_json(&entries)?,
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
