use clap::Parser;
use cuckoo_table::Arity;
use cuckoo_table::CuckooTable;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    /// Candidate slots per key (2 or 3).
    #[arg(short = 'a', long = "arity", default_value_t = 3, value_parser = clap::value_parser!(u8).range(2..=3))]
    arity: u8,

    /// Number of random keys to insert.
    #[arg(short = 'c', long = "count", default_value_t = 30_000)]
    count: usize,

    /// Seed for the key stream.
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    let arity = if args.arity == 2 {
        Arity::Two
    } else {
        Arity::Three
    };

    let mut table = CuckooTable::new(arity);
    println!(
        "Filling {}-way table ({} slots) with {} random keys...",
        arity.ways(),
        table.capacity(),
        args.count
    );

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut duplicates = 0;
    for _ in 0..args.count {
        let key: u32 = rng.random();
        match table.insert(key, key.rotate_left(16)) {
            Ok(true) => {}
            Ok(false) => duplicates += 1,
            Err(err) => {
                println!("Stopped after {} entries: {err}", table.len());
                break;
            }
        }
    }

    println!("Inserted {} entries ({} duplicate keys skipped)", table.len(), duplicates);
    println!(
        "Capacity: {} slots (2^{}), load factor {:.2}%",
        table.capacity(),
        table.exponent(),
        table.load_factor() * 100.0
    );
    println!("Rehashes at current capacity: {}", table.rehash_count());
    println!("{}", table.stats());
}
