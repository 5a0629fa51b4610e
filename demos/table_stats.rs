use clap::Parser;
use closed_hash::HashMap;

/// Fills a map, removes part of it, and prints the table statistics after
/// each phase.
#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'e', long = "entries", default_value_t = 1000)]
    entries: u64,

    /// Fraction of the entries to remove after filling.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.5)]
    remove_fraction: f64,
}

fn main() {
    let args = Args::parse();

    let mut map = HashMap::new();
    println!("Saving {} entries...", args.entries);
    for i in 0..args.entries {
        map.save(i, i * 2);
    }
    map.stats().print();

    let to_remove = (args.entries as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    println!();
    println!("Removing {to_remove} entries...");
    for i in 0..to_remove {
        if let Err(err) = map.remove(&i) {
            eprintln!("remove({i}) failed: {err}");
        }
    }
    map.stats().print();

    println!();
    println!("Shrinking to fit...");
    map.shrink_to_fit();
    map.stats().print();
}
