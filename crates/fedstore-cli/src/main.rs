//! fedstore command-line tool.
//!
//! Provides the `fedstore` binary for provisioning a store file and for
//! inspecting or editing its contents by hand. Every subcommand goes through
//! the same `KvStore` a server would use, so the on-disk layout and the
//! load/save semantics are identical from both entry points.
//!
//! Items are read as JSON from a file argument or stdin; results are printed
//! to stdout as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use fedstore_storage::{
    bootstrap, idgen, CollectionStore, Config, ErrorKind, Filter, ItemLoader, ItemSaver, KvStore,
    StorageError, Store,
};
use fedstore_vocab::{codec, Iri, Item, OrderedCollection, VocabError};

/// Persistence tools for a federated object graph.
#[derive(Parser)]
#[command(name = "fedstore", about = "Persistence tools for a federated object graph")]
struct Cli {
    /// Path to the store database file.
    #[arg(long, env = "FEDSTORE_DB_PATH", default_value = "fedstore.db", global = true)]
    db: PathBuf,

    /// Name of the root bucket.
    #[arg(long, env = "FEDSTORE_ROOT_BUCKET", default_value = "fedstore", global = true)]
    root: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Create the root bucket and its children.
    Init,

    /// Save an item read from FILE (or stdin).
    Save {
        /// Bucket to save into; `auto` routes by the item's type.
        #[arg(short, long, value_enum, default_value_t = SaveKind::Auto)]
        kind: SaveKind,

        file: Option<PathBuf>,
    },

    /// Load every item whose id starts with one of the prefixes.
    Load {
        #[arg(short, long, value_enum)]
        kind: LoadKind,

        #[arg(required = true)]
        prefixes: Vec<String>,
    },

    /// Load the item or collection stored under IRI.
    Get { iri: String },

    /// Replace the item stored under IRI with a tombstone.
    Delete { iri: String },

    /// Create or edit collections.
    #[command(subcommand)]
    Collection(CollectionCommand),

    /// Assign an identifier to the item in FILE (or stdin).
    GenId {
        /// Parent IRI the new identifier is minted under.
        #[arg(long)]
        part_of: String,

        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CollectionCommand {
    /// Create (or overwrite) a collection with the given members.
    Create { iri: String, members: Vec<String> },
    /// Append a member.
    Add { collection: String, member: String },
    /// Remove a member.
    Remove { collection: String, member: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SaveKind {
    Auto,
    Actor,
    Activity,
    Object,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoadKind {
    Actors,
    Activities,
    Objects,
    Collections,
}

/// Why a subcommand failed.
#[derive(Debug)]
enum Failure {
    /// Bad arguments or unreadable input.
    Input(String),
    Storage(StorageError),
}

impl From<StorageError> for Failure {
    fn from(e: StorageError) -> Self {
        Failure::Storage(e)
    }
}

impl From<VocabError> for Failure {
    fn from(e: VocabError) -> Self {
        Failure::Input(format!("could not decode item: {}", e))
    }
}

impl Failure {
    /// Exit code: 1 = input error, 2 = not found, 3 = storage error.
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Input(_) => 1,
            Failure::Storage(e) => match e.kind() {
                ErrorKind::NotFound => 2,
                ErrorKind::Invalid | ErrorKind::Codec => 1,
                ErrorKind::NotWritable | ErrorKind::NotImplemented | ErrorKind::Io => 3,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Failure::Input(msg) => msg.clone(),
            Failure::Storage(e) => e.to_string(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(failure) => {
            eprintln!("Error: {}", failure.message());
            process::exit(failure.exit_code());
        }
    }
}

/// Executes the parsed command and returns what to print.
fn run(cli: &Cli) -> Result<String, Failure> {
    match &cli.command {
        Commands::Init => run_init(&cli.db, &cli.root),
        Commands::Save { kind, file } => {
            let item = read_item(file.as_deref())?;
            let mut store = open_store(cli)?;
            run_save(&mut store, *kind, item)
        }
        Commands::Load { kind, prefixes } => run_load(&open_store(cli)?, *kind, prefixes),
        Commands::Get { iri } => {
            let item = Store::load(&open_store(cli)?, &Iri::from(iri.as_str()))?;
            Ok(to_json(&item))
        }
        Commands::Delete { iri } => {
            let mut store = open_store(cli)?;
            let item = Store::load(&store, &Iri::from(iri.as_str()))?;
            Ok(to_json(&store.delete(item)?))
        }
        Commands::Collection(cmd) => run_collection(&mut open_store(cli)?, cmd),
        Commands::GenId { part_of, file } => {
            let mut item = read_item(file.as_deref())?;
            let id = idgen::generate_id(&mut item, &Iri::from(part_of.as_str()))?;
            Ok(id.into_string())
        }
    }
}

fn open_store(cli: &Cli) -> Result<KvStore, Failure> {
    let config = Config::new(&cli.db, &cli.root)
        .with_log_fn(|msg| tracing::info!("{}", msg))
        .with_err_fn(|msg| tracing::error!("{}", msg));
    Ok(KvStore::open(config)?)
}

fn run_init(db: &Path, root: &str) -> Result<String, Failure> {
    bootstrap(db, root)?;
    Ok(format!("provisioned bucket '{}' in {}", root, db.display()))
}

fn run_save(store: &mut KvStore, kind: SaveKind, item: Item) -> Result<String, Failure> {
    let saved = match kind {
        SaveKind::Auto => store.save(item)?,
        SaveKind::Actor => store.save_actor(item)?,
        SaveKind::Activity => store.save_activity(item)?,
        SaveKind::Object => store.save_object(item)?,
    };
    Ok(to_json(&saved))
}

fn run_load(store: &KvStore, kind: LoadKind, prefixes: &[String]) -> Result<String, Failure> {
    let filter = Filter::new(prefixes.iter().map(|p| Iri::from(p.as_str())).collect())?;
    let (items, count) = match kind {
        LoadKind::Actors => store.load_actors(&filter)?,
        LoadKind::Activities => store.load_activities(&filter)?,
        LoadKind::Objects => store.load_objects(&filter)?,
        LoadKind::Collections => match store.load_collection(&filter)? {
            Some(col) => return Ok(to_json(&Item::Collection(col))),
            None => return Err(Failure::Storage(StorageError::NotFound("no such collection".into()))),
        },
    };
    Ok(json!({ "count": count, "items": items }).to_string())
}

fn run_collection(store: &mut KvStore, cmd: &CollectionCommand) -> Result<String, Failure> {
    match cmd {
        CollectionCommand::Create { iri, members } => {
            let mut col = OrderedCollection::new(iri.as_str());
            col.ordered_items = members
                .iter()
                .map(|m| Item::Link(Iri::from(m.as_str())))
                .collect();
            let created = store.create(col)?;
            Ok(to_json(&Item::Collection(created)))
        }
        CollectionCommand::Add { collection, member } => {
            store.add_to(&Iri::from(collection.as_str()), &Item::Link(Iri::from(member.as_str())))?;
            Ok(String::new())
        }
        CollectionCommand::Remove { collection, member } => {
            store.remove_from(&Iri::from(collection.as_str()), &Item::Link(Iri::from(member.as_str())))?;
            Ok(String::new())
        }
    }
}

/// Reads and decodes one item from `path`, or from stdin when absent.
fn read_item(path: Option<&Path>) -> Result<Item, Failure> {
    let bytes = match path {
        Some(path) => fs::read(path)
            .map_err(|e| Failure::Input(format!("could not read '{}': {}", path.display(), e)))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| Failure::Input(format!("could not read stdin: {}", e)))?;
            buf
        }
    };
    Ok(codec::unmarshal(&bytes)?)
}

fn to_json(item: &Item) -> String {
    serde_json::to_string_pretty(item)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize item: {}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(db: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["fedstore", "--db", db.to_str().unwrap(), "--root", "test"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_init_save_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("store.db");
        run(&cli(&db, &["init"])).unwrap();

        let note = write_json(
            dir.path(),
            "note.json",
            json!({"id": "http://x/objects/1", "type": "Note", "content": "hi"}),
        );
        run(&cli(&db, &["save", note.to_str().unwrap()])).unwrap();

        let out = run(&cli(&db, &["get", "http://x/objects/1"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["content"], "hi");
        assert!(value["published"].is_string());

        let out = run(&cli(&db, &["delete", "http://x/objects/1"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "Tombstone");
        assert_eq!(value["formerType"], "Note");
    }

    #[test]
    fn test_load_and_collections() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("store.db");
        run(&cli(&db, &["init"])).unwrap();
        for (name, id) in [("a.json", "http://x/actors/a"), ("b.json", "http://x/actors/b")] {
            let file = write_json(dir.path(), name, json!({"id": id, "type": "Person"}));
            run(&cli(&db, &["save", "--kind", "actor", file.to_str().unwrap()])).unwrap();
        }

        let out = run(&cli(&db, &["load", "--kind", "actors", "http://x/actors/"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["count"], 2);

        run(&cli(&db, &["collection", "create", "http://x/actors/a/followers", "http://x/actors/b"]))
            .unwrap();
        run(&cli(&db, &["collection", "add", "http://x/actors/a/followers", "http://x/actors/a"]))
            .unwrap();
        let out = run(&cli(
            &db,
            &["load", "--kind", "collections", "http://x/actors/a/followers"],
        ))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["totalItems"], 2);
    }

    #[test]
    fn test_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("store.db");

        // Not provisioned yet.
        let err = run(&cli(&db, &["get", "http://x/objects/1"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        run(&cli(&db, &["init"])).unwrap();
        let err = run(&cli(&db, &["get", "http://x/objects/1"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{\"id\": \"x\"}").unwrap();
        let err = run(&cli(&db, &["save", bad.to_str().unwrap()])).unwrap_err();
        assert_eq!(err.exit_code(), 1);

        let missing = dir.path().join("missing.json");
        let err = run(&cli(&db, &["save", missing.to_str().unwrap()])).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_gen_id() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("unused.db");
        let file = write_json(dir.path(), "note.json", json!({"type": "Note"}));
        let out = run(&cli(
            &db,
            &["gen-id", "--part-of", "http://X/Objects", file.to_str().unwrap()],
        ))
        .unwrap();
        assert!(out.starts_with("http://x/objects/"));
        assert!(!db.exists());
    }
}
