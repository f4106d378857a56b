use cuckoo_table::Arity;
use cuckoo_table::CuckooError;
use cuckoo_table::CuckooTable;
use cuckoo_table::TableConfig;
use hashbrown::HashMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use test_log::test;

/// Random key/value pairs with distinct keys.
fn generate_items(count: usize, seed: u64) -> HashMap<u32, u32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut items = HashMap::with_capacity(count);
    while items.len() < count {
        items.insert(rng.random::<u32>(), rng.random::<u32>());
    }
    items
}

#[test]
fn insert_lookup_duplicate_remove() {
    let mut table = CuckooTable::new(Arity::Two);

    assert_eq!(table.insert(42, 7), Ok(true));
    assert_eq!(table.get(42), Some(7));

    assert_eq!(table.insert(42, 99), Ok(false));
    assert_eq!(table.get(42), Some(7));

    table.remove(42);
    assert_eq!(table.get(42), None);
    assert!(table.is_empty());
}

#[test]
fn three_way_scale() {
    let items = generate_items(30_000, 0xc0ff_ee00);
    let mut table = CuckooTable::new(Arity::Three);

    for (&key, &value) in &items {
        assert_eq!(table.insert(key, value), Ok(true));
        assert!(
            table.load_factor() <= 0.9,
            "load factor {} after {} inserts: {:?}",
            table.load_factor(),
            table.len(),
            table
        );
    }

    assert_eq!(table.len(), items.len());
    for (&key, &value) in &items {
        assert_eq!(table.get(key), Some(value));
    }
}

#[test]
fn two_way_stays_within_capacity_ceiling() {
    // Well below 2^16 * 0.5 entries.
    let items = generate_items(24_000, 0x7e57);
    let mut table = CuckooTable::new(Arity::Two);

    for (&key, &value) in &items {
        table.insert(key, value).unwrap();
        assert!(table.exponent() <= 16);
        assert!(table.load_factor() <= 0.5);
    }

    for (&key, &value) in &items {
        assert_eq!(table.get(key), Some(value));
    }
}

#[test]
fn insert_then_delete_everything() {
    for arity in [Arity::Two, Arity::Three] {
        let items = generate_items(2000, 99);
        let mut table = CuckooTable::new(arity);

        for (&key, &value) in &items {
            table.insert(key, value).unwrap();
        }
        for &key in items.keys() {
            assert!(table.remove(key).is_some());
        }
        for &key in items.keys() {
            assert_eq!(table.get(key), None);
        }

        assert!(table.is_empty());
        assert_eq!(table.exponent(), 10);
        assert_eq!(table.load_factor(), 0.0);
    }
}

#[test]
fn removing_absent_keys_is_a_no_op() {
    let mut table = CuckooTable::new(Arity::Three);
    for key in 0..1500u32 {
        table.insert(key, key).unwrap();
    }
    let capacity = table.capacity();
    let load = table.load_factor();

    for key in 10_000..12_000u32 {
        assert_eq!(table.remove(key), None);
    }

    assert_eq!(table.len(), 1500);
    assert_eq!(table.capacity(), capacity);
    assert_eq!(table.load_factor(), load);
}

#[test]
fn custom_bounds_report_exhaustion() {
    let config = TableConfig::two_way()
        .with_exponent_bounds(5, 6)
        .with_max_load_factor(1.0)
        .with_max_rehashes(1);
    let mut table = CuckooTable::with_config(config).unwrap();

    let mut inserted = 0usize;
    let err = loop {
        match table.insert(inserted as u32, 0) {
            Ok(true) => inserted += 1,
            Ok(false) => unreachable!("keys are distinct"),
            Err(err) => break err,
        }
        assert!(inserted <= 64, "more entries than slots");
    };

    assert!(err.is_capacity_exhausted());
    assert!(matches!(
        err,
        CuckooError::CapacityExhausted { max_exponent: 6, .. }
    ));
    assert_eq!(table.exponent(), 6);
    // The failed insert either stored its key in place of another entry or
    // stored nothing, so the count is unchanged.
    assert_eq!(table.len(), inserted);
    assert!(table.stats().stalls > 0);
}

#[test]
fn seeded_tables_are_reproducible() {
    let items = generate_items(5000, 5);
    let build = || {
        let mut table =
            CuckooTable::with_config_and_rng(TableConfig::three_way(), SmallRng::seed_from_u64(77))
                .unwrap();
        let mut keys: Vec<_> = items.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            table.insert(key, items[&key]).unwrap();
        }
        table
    };

    let a = build();
    let b = build();
    assert_eq!(a.stats(), b.stats());
    assert_eq!(a.exponent(), b.exponent());
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
}
