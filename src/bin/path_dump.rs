use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use aspath_store::config::PathStoreConfig;
use aspath_store::{AsPath, Asn, PathStore};
use clap::Parser;
use serde_derive::Serialize;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Snapshot file to load, or a text file with `--text`
    #[arg(required = true)]
    input: PathBuf,

    /// Read INPUT as text, one `<peer asn> <as path>` observation per line
    #[arg(long, default_value_t = false)]
    text: bool,

    /// Write a snapshot of the store to this file
    #[arg(short, long)]
    write: Option<PathBuf>,

    /// Reconstruct core paths as observed by this peer ASN
    #[arg(short, long)]
    peer: Option<u32>,

    /// Print the paths as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Only print store statistics
    #[arg(short, long, default_value_t = false)]
    stats: bool,

    /// Number of paths per bucket chunk
    #[arg(long)]
    chunk_size: Option<usize>,
}

#[derive(Serialize)]
struct DumpEntry {
    idx: u32,
    id: aspath_store::PathId,
    core: bool,
    path: String,
}

fn load_text(
    input: &PathBuf,
    config: PathStoreConfig,
) -> Result<PathStore, Box<dyn std::error::Error>> {
    let mut store = PathStore::new_with_config(config);
    let reader = BufReader::new(File::open(input)?);
    let mut observations = 0_usize;

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (peer, path) = line.split_once(char::is_whitespace).ok_or_else(
            || format!("line {}: expected `<peer asn> <as path>`", n + 1),
        )?;
        let peer = Asn::from_u32(peer.parse::<u32>()?);
        let path = AsPath::from_str(path)
            .map_err(|e| format!("line {}: {}", n + 1, e))?;
        store.get_path_id(&path, peer)?;
        observations += 1;
    }

    log::info!(
        "{} observations resulted in {} distinct paths",
        observations,
        store.size()
    );
    Ok(store)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Cli::parse();

    let mut config = PathStoreConfig::default();
    if let Some(chunk_size) = args.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }

    let t_s = Instant::now();
    let store = if args.text {
        load_text(&args.input, config)?
    } else {
        let bytes = std::fs::read(&args.input)?;
        PathStore::from_snapshot_with_config(&bytes, config)?
    };
    eprintln!(
        "loaded {} paths from {} in {}ms",
        store.size(),
        args.input.to_string_lossy(),
        t_s.elapsed().as_millis()
    );

    if let Some(out) = &args.write {
        let mut file = File::create(out)?;
        store.write_snapshot(&mut file)?;
        file.flush()?;
        eprintln!("snapshot written to {}", out.to_string_lossy());
    }

    if args.stats {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        } else {
            println!("{}", store.stats());
        }
        return Ok(());
    }

    let peer = args.peer.map(Asn::from_u32);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (id, sp) in store.iter_by_idx() {
        let path = match (peer, sp.is_core()) {
            (Some(peer), _) => sp.get_path(peer)?.to_string(),
            (None, true) => format!("* {}", sp.get_int_path()),
            (None, false) => sp.get_int_path().to_string(),
        };
        if args.json {
            let entry = DumpEntry {
                idx: sp.get_idx(),
                id,
                core: sp.is_core(),
                path,
            };
            writeln!(out, "{}", serde_json::to_string(&entry)?)?;
        } else {
            writeln!(out, "{}\t{}\t{}", sp.get_idx(), id, path)?;
        }
    }

    Ok(())
}
