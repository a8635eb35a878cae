use std::collections::HashSet;

use aspath_store::config::PathStoreConfig;
use aspath_store::{AsPath, Asn, PathId, PathStore};
use rand::Rng;
use routecore::bgp::aspath::{Hop, HopPath, Segment};

mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

// Builds a store from random observations. Origins are drawn from a small
// pool, so buckets hold more than one path, and peers from a pool that
// overlaps with the first hops, so there's a mix of core and full paths.
fn random_store(
    observations: usize,
    config: PathStoreConfig,
) -> Result<PathStore, Box<dyn std::error::Error>> {
    let mut rng = rand::rng();
    let mut store = PathStore::new_with_config(config);

    for _ in 0..observations {
        let peer = Asn::from(rng.random_range(64500..64510_u32));
        let len = rng.random_range(0..6);
        let mut hops = vec![Hop::Asn(Asn::from(
            rng.random_range(64500..64520_u32),
        ))];
        for _ in 0..len {
            hops.push(Hop::Asn(Asn::from(rng.random_range(1..50_u32))));
        }
        if rng.random_bool(0.1) {
            hops.push(Hop::Segment(Segment::new_set(vec![
                Asn::from(13335),
                Asn::from(rng.random_range(1..4_u32)),
            ])));
        } else {
            hops.push(Hop::Asn(Asn::from(rng.random_range(100..120_u32))));
        }
        let path = AsPath::from_hops(&HopPath::from(hops))?;
        store.get_path_id(&path, peer)?;
    }

    Ok(store)
}

#[test]
fn test_iteration_visits_every_path_once(
) -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();

    let store = random_store(5_000, PathStoreConfig::default())?;
    let size = store.size() as usize;
    assert!(size > 0);

    let ids = store.iter().map(|(id, _)| id).collect::<Vec<_>>();
    assert_eq!(ids.len(), size);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), size);

    for (id, sp) in &store {
        assert_eq!(store.get_store_path(id), Some(sp));
    }

    // Two passes over an unchanged store see the same order.
    let again = store.iter().map(|(id, _)| id).collect::<Vec<_>>();
    assert_eq!(ids, again);

    Ok(())
}

#[test]
fn test_explicit_cursor() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();

    let store =
        random_store(500, PathStoreConfig::default().with_chunk_size(3))?;

    let mut cursor = store.iter();
    let mut seen: Vec<PathId> = vec![];
    while cursor.has_more() {
        let id = cursor.get_path_id().ok_or("cursor without id")?;
        let sp = cursor.get_path().ok_or("cursor without path")?;
        assert_eq!(store.get_store_path(id), Some(sp));
        seen.push(id);
        cursor.advance();
    }
    assert_eq!(seen.len(), store.size() as usize);
    assert!(cursor.get_path().is_none());

    // A second cursor runs independently of the first one.
    let mut other = store.iter();
    cursor.first();
    other.advance();
    assert_eq!(cursor.get_path_id(), seen.first().copied());
    assert_eq!(other.get_path_id(), seen.get(1).copied());

    Ok(())
}

#[test]
fn test_idx_is_dense() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();

    let config = PathStoreConfig::default().with_chunk_size(1);
    let store = random_store(2_000, config)?;

    let mut idxs = store
        .iter()
        .map(|(_, sp)| sp.get_idx())
        .collect::<Vec<_>>();
    idxs.sort_unstable();
    assert!(idxs.into_iter().eq(0..store.size()));

    for (n, (id, sp)) in store.iter_by_idx().enumerate() {
        assert_eq!(sp.get_idx() as usize, n);
        assert_eq!(store.get_by_idx(n as u32).map(|(i, _)| i), Some(id));
    }

    Ok(())
}

#[test]
fn test_chunk_size_does_not_change_ids(
) -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();

    let paths = [
        ("1 2 3", 1),
        ("4 2 3", 4),
        ("5 6 3", 5),
        ("2 3", 7),
        ("7 8 {3,4}", 7),
    ];

    let mut small = PathStore::new_with_config(
        PathStoreConfig::default().with_chunk_size(1),
    );
    let mut large = PathStore::new_with_config(
        PathStoreConfig::default()
            .with_chunk_size(1024)
            .with_initial_buckets(64),
    );

    for (path, peer) in paths {
        let path: AsPath = path.parse()?;
        assert_eq!(
            small.get_path_id(&path, Asn::from(peer))?,
            large.get_path_id(&path, Asn::from(peer))?
        );
    }
    assert_eq!(small.stats(), large.stats());

    Ok(())
}
