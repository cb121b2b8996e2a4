//! heapdb - decode a heap snapshot dump into a SQLite database
//!
//! Usage:
//!   heapdb <snapshot-file> [--db <db-path>]
//!
//! Produces two relations, `node` and `edge`, with columns driven by the
//! dump's own metadata. The database path defaults to the snapshot file's
//! stem with a `.db` extension.

use std::path::{Path, PathBuf};

use anyhow::Context;

use heapdb::{convert, HeapDump, SqliteSink};

/// Default database path: snapshot file stem + ".db", in the working
/// directory.
fn db_path_for(dump_path: &Path) -> PathBuf {
    let stem = dump_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    PathBuf::from(format!("{}.db", stem))
}

fn run(dump_path: &Path, db_path: &Path) -> anyhow::Result<()> {
    tracing::info!("reading {}", dump_path.display());
    let dump = HeapDump::open(dump_path)
        .with_context(|| format!("failed to read {}", dump_path.display()))?;

    tracing::info!("initializing database {}", db_path.display());
    let mut sink = SqliteSink::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let stats = convert(&dump, &mut sink)?;
    tracing::info!("done: {} nodes, {} edges", stats.nodes, stats.edges);
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Handle --version / -V flag
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("heapdb {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // Handle --help / -h flag
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("heapdb {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Decode a heap snapshot dump into a SQLite database");
        println!();
        println!("Usage: heapdb <snapshot-file> [--db <db-path>]");
        println!();
        println!("Arguments:");
        println!("  <snapshot-file>  Path to the heap snapshot dump");
        println!("  --db             Database path (default: <snapshot stem>.db)");
        println!();
        println!("Flags:");
        println!("  -V, --version  Print version information");
        println!("  -h, --help     Print this help message");
        std::process::exit(0);
    }

    if args.len() < 2 {
        eprintln!("Usage: heapdb <snapshot-file> [--db <db-path>]");
        std::process::exit(1);
    }

    let dump_path_str = &args[1];
    if dump_path_str.starts_with("--") {
        eprintln!(
            "Error: snapshot path '{}' looks like a flag, not a path.",
            dump_path_str
        );
        eprintln!("The first argument must be the snapshot file.");
        std::process::exit(1);
    }
    let dump_path = PathBuf::from(dump_path_str);

    let db_path = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| db_path_for(&dump_path));

    tracing_subscriber::fmt().with_target(false).init();

    if let Err(err) = run(&dump_path, &db_path) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
