use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use closed_hash::HashMap;
use thiserror::Error;

/// Counts visits per client and per resource in a tab-separated access log
/// (`ip<TAB>timestamp<TAB>method<TAB>resource`).
#[derive(Parser, Debug)]
struct Args {
    /// Access log to read.
    log: PathBuf,

    /// How many of the most requested resources to print.
    #[arg(short = 'n', long = "top", default_value_t = 10)]
    top: usize,

    /// Also print every client address, in address order.
    #[arg(long)]
    visitors: bool,
}

#[derive(Debug, Error)]
enum LogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected 4 tab-separated fields, found {found}")]
    Malformed { line: usize, found: usize },
    #[error("line {line}: invalid client address {ip:?}")]
    BadAddress { line: usize, ip: String },
}

#[derive(Default)]
struct Counts {
    per_client: HashMap<Ipv4Addr, u64>,
    per_resource: HashMap<String, u64>,
}

fn bump<K: core::hash::Hash + Eq>(map: &mut HashMap<K, u64>, key: K) {
    let visits = if map.contains(&key) {
        map.get(&key).copied().unwrap_or(0)
    } else {
        0
    };
    map.save(key, visits + 1);
}

fn read_log(args: &Args) -> Result<Counts, LogError> {
    let io_error = |source| LogError::Io {
        path: args.log.clone(),
        source,
    };
    let reader = BufReader::new(File::open(&args.log).map_err(io_error)?);

    let mut counts = Counts::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let &[ip, _timestamp, _method, resource] = fields.as_slice() else {
            return Err(LogError::Malformed {
                line: number,
                found: fields.len(),
            });
        };
        let ip: Ipv4Addr = ip.parse().map_err(|_| LogError::BadAddress {
            line: number,
            ip: ip.to_string(),
        })?;

        bump(&mut counts.per_client, ip);
        bump(&mut counts.per_resource, resource.to_string());
    }
    Ok(counts)
}

/// Copies every entry out through the map's cursor.
fn collect_entries<K: Clone, V: Copy>(map: &HashMap<K, V>) -> Vec<(K, V)> {
    let mut entries = Vec::with_capacity(map.count());
    let mut cursor = map.cursor();
    while let Ok((key, value)) = cursor.current() {
        entries.push((key.clone(), *value));
        if cursor.advance().is_err() {
            break;
        }
    }
    entries
}

fn main() -> ExitCode {
    let args = Args::parse();

    let counts = match read_log(&args) {
        Ok(counts) => counts,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{} clients, {} distinct resources",
        counts.per_client.count(),
        counts.per_resource.count()
    );

    if args.visitors {
        let mut clients = collect_entries(&counts.per_client);
        clients.sort_unstable_by_key(|(ip, _)| *ip);
        println!("Visitors:");
        for (ip, visits) in clients {
            println!("\t{ip}\t{visits}");
        }
    }

    let mut resources = collect_entries(&counts.per_resource);
    resources.sort_unstable_by(|(a_name, a), (b_name, b)| {
        b.cmp(a).then_with(|| a_name.cmp(b_name))
    });
    println!("Most visited:");
    for (resource, visits) in resources.into_iter().take(args.top) {
        println!("\t{resource} - {visits}");
    }

    ExitCode::SUCCESS
}
