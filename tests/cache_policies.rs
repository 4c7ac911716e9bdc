//! Eviction behaviour of the result cache, one section per policy

use taskflow_core::cache::{CacheError, PolicyKind, ResultCache};

fn item(i: u32) -> String {
    format!("x{i}")
}

fn lru(size: usize) -> ResultCache<u32, String> {
    ResultCache::new(PolicyKind::Lru, size).unwrap()
}

#[test]
fn test_capacity_one_end_to_end() {
    let cache: ResultCache<&str, i32> = ResultCache::new(PolicyKind::Lru, 1).unwrap();
    cache.add("a", 1);
    cache.add("b", 2);

    assert_eq!(cache.get(&"a"), Err(CacheError::Miss));
    assert_eq!(cache.get(&"b"), Ok(2));
}

#[test]
fn test_lru_one_item_miss() {
    let cache: ResultCache<&str, &str> = ResultCache::new(PolicyKind::Lru, 1).unwrap();
    cache.add("item_id1", "item1");
    cache.add("item_id2", "item2");

    assert!(cache.get(&"item_id1").unwrap_err().is_miss());
}

#[test]
fn test_lru_two_items() {
    let cache: ResultCache<&str, &str> = ResultCache::new(PolicyKind::Lru, 2).unwrap();
    cache.add("item_id1", "item1");
    cache.add("item_id2", "item2");
    cache.add("item_id3", "item3");

    assert_eq!(cache.get(&"item_id1"), Err(CacheError::Miss));
    assert_eq!(cache.get(&"item_id2"), Ok("item2"));
    assert_eq!(cache.get(&"item_id3"), Ok("item3"));

    // item_id3 was used last, so item_id2 goes next
    cache.add("item_id1", "item1");
    assert_eq!(cache.get(&"item_id2"), Err(CacheError::Miss));
    assert_eq!(cache.get(&"item_id3"), Ok("item3"));
}

#[test]
fn test_lru_multiple_items() {
    let item_count = 16u32;
    let cache = lru(item_count as usize);

    for id in 0..item_count {
        cache.add(id, item(id));
    }
    cache.add(item_count, item(item_count));

    // the very first is removed
    assert_eq!(cache.get(&0), Err(CacheError::Miss));

    for id in (1..item_count).rev() {
        assert_eq!(cache.get(&id), Ok(item(id)));
    }

    // re-add 0, so we have 0..item_count
    cache.add(0, item(0));
    assert_eq!(cache.get(&item_count), Err(CacheError::Miss));

    for id in 0..item_count {
        assert_eq!(cache.get(&id), Ok(item(id)));
    }
}

#[test]
fn test_lru_multiple_items_get() {
    let item_count = 16u32;
    let cache = lru(item_count as usize);

    for id in 0..item_count {
        cache.add(id, item(id));
    }

    let used_items = [10, 5, 3, 1, 7];
    for id in used_items {
        assert_eq!(cache.get(&id), Ok(item(id)));
    }

    for id in 1..6 {
        cache.add(id * 100, item(id * 100));
    }

    let removed_items = [0, 2, 4, 6, 8];
    for id in removed_items {
        assert_eq!(cache.get(&id), Err(CacheError::Miss), "id {id} should be evicted");
    }

    for id in (0..item_count).filter(|id| !removed_items.contains(id)) {
        assert_eq!(cache.get(&id), Ok(item(id)));
    }
}

#[test]
fn test_fifo_ignores_gets() {
    let cache: ResultCache<u32, u32> = ResultCache::new(PolicyKind::Fifo, 3).unwrap();
    for id in 0..3 {
        cache.add(id, id);
    }
    for _ in 0..5 {
        cache.get(&0).unwrap();
    }

    cache.add(3, 3);
    assert_eq!(cache.get(&0), Err(CacheError::Miss));

    cache.add(4, 4);
    assert_eq!(cache.get(&1), Err(CacheError::Miss));
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_lifo_sacrifices_newest_insertion() {
    let cache: ResultCache<u32, u32> = ResultCache::new(PolicyKind::Lifo, 3).unwrap();
    for id in 0..3 {
        cache.add(id, id);
    }
    cache.get(&0).unwrap();

    cache.add(10, 10);
    assert_eq!(cache.get(&2), Err(CacheError::Miss));
    assert!(cache.contains(&0));
    assert!(cache.contains(&1));

    cache.add(11, 11);
    assert_eq!(cache.get(&10), Err(CacheError::Miss));
}

#[test]
fn test_mru_sacrifices_last_used() {
    let cache: ResultCache<u32, u32> = ResultCache::new(PolicyKind::Mru, 3).unwrap();
    for id in 0..3 {
        cache.add(id, id);
    }
    cache.get(&1).unwrap();

    cache.add(3, 3);
    assert_eq!(cache.get(&1), Err(CacheError::Miss));

    // the insert of 3 counts as its last use
    cache.add(4, 4);
    assert_eq!(cache.get(&3), Err(CacheError::Miss));
    assert!(cache.contains(&0));
    assert!(cache.contains(&2));
}

#[test]
fn test_overwrite_refreshes_lru_rank() {
    let cache: ResultCache<u32, u32> = ResultCache::new(PolicyKind::Lru, 2).unwrap();
    cache.add(1, 1);
    cache.add(2, 2);
    cache.add(1, 100);
    cache.add(3, 3);

    assert_eq!(cache.get(&1), Ok(100));
    assert_eq!(cache.get(&2), Err(CacheError::Miss));
}

#[test]
fn test_random_replacement_is_seeded() {
    let victims = |seed| {
        let cache: ResultCache<u32, u32> = ResultCache::with_seed(PolicyKind::Rr, 4, seed).unwrap();
        for id in 0..12 {
            cache.add(id, id);
        }
        let mut kept: Vec<_> = cache.entries().into_iter().map(|e| e.key).collect();
        kept.sort_unstable();
        kept
    };

    assert_eq!(victims(7), victims(7));
    assert_eq!(victims(7).len(), 4);
    assert!(victims(7).contains(&11));
}

#[test]
fn test_miss_on_never_inserted_key() {
    for policy in PolicyKind::ALL {
        let cache: ResultCache<u32, u32> = ResultCache::new(policy, 4).unwrap();
        assert_eq!(cache.get(&42), Err(CacheError::Miss));
        cache.add(42, 1);
        cache.add(42, 2);
        assert_eq!(cache.get(&42), Ok(2), "policy {policy}");
    }
}
