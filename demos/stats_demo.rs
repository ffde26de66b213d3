use clap::Parser;
use oa_table::Config;
use oa_table::DeletionPolicy;
use oa_table::HashTable;
use oa_table::SlotState;
use oa_table::hashers;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    #[arg(short = 'c', long = "initial_capacity", default_value_t = 11)]
    initial_capacity: usize,

    /// Leave tombstones behind on removal instead of compacting.
    #[arg(long = "mark")]
    mark: bool,
}

fn main() {
    let args = Args::parse();

    let policy = if args.mark {
        DeletionPolicy::Mark
    } else {
        DeletionPolicy::Pack
    };
    let config = Config::new(args.initial_capacity, hashers::fold_primary)
        .with_secondary_hash(hashers::fold_secondary)
        .with_deletion_policy(policy);

    println!(
        "Creating table: initial capacity {}, policy {:?}",
        args.initial_capacity, policy
    );

    let mut table: HashTable<u64> = HashTable::new(config);

    for i in 0..args.entries {
        let key = format!("key_{i:016X}");
        table
            .insert(&key, i as u64)
            .expect("keys are unique and growth is unbounded");
    }
    println!("Inserted {} entries", table.len());

    // Remove every other entry to show the policies diverging.
    for i in (0..args.entries).step_by(2) {
        let key = format!("key_{i:016X}");
        table.remove(&key).expect("key was inserted above");
    }

    let tombstones = table
        .slots()
        .iter()
        .filter(|slot| slot.state() == SlotState::Deleted)
        .count();
    let stats = table.stats();

    println!("After removing half:");
    println!("  entries:    {}", stats.count);
    println!("  capacity:   {} (prime)", stats.capacity);
    println!("  load:       {:.2}%", table.load_factor() * 100.0);
    println!("  tombstones: {tombstones}");
    println!("  probes:     {}", stats.probes);
    println!("  expansions: {}", stats.expansions);
    println!(
        "  avg probes per op: {:.2}",
        stats.probes as f64 / (args.entries + args.entries / 2) as f64
    );
}
