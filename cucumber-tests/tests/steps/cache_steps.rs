use cucumber::{given, then, when};
use cucumber_tests::ShortlinkWorld;
use shortlink_core::cache::{Cache, LruCache};

#[given(expr = "an LRU cache with capacity {int}")]
async fn given_cache(world: &mut ShortlinkWorld, capacity: usize) {
    world.cache = Some(LruCache::new(capacity).expect("valid capacity"));
}

#[when(expr = "I create an LRU cache with capacity {int}")]
async fn when_create_cache(world: &mut ShortlinkWorld, capacity: usize) {
    match LruCache::<String, String>::new(capacity) {
        Ok(cache) => world.cache = Some(cache),
        Err(e) => world.cache_error = Some(e.to_string()),
    }
}

#[when(expr = "I put {string} with value {string}")]
async fn when_put(world: &mut ShortlinkWorld, key: String, value: String) {
    world.cache_mut().put(key, value);
}

#[when(expr = "I get {string}")]
async fn when_get(world: &mut ShortlinkWorld, key: String) {
    world.cache_mut().get(&key);
}

#[then(expr = "getting {string} returns {string}")]
async fn then_get_returns(world: &mut ShortlinkWorld, key: String, expected: String) {
    assert_eq!(world.cache_mut().get(&key), Some(&expected));
}

#[then(expr = "getting {string} returns nothing")]
async fn then_get_misses(world: &mut ShortlinkWorld, key: String) {
    assert_eq!(world.cache_mut().get(&key), None);
}

#[then(expr = "the cache holds {int} entries")]
async fn then_cache_size(world: &mut ShortlinkWorld, expected: usize) {
    assert_eq!(world.cache_mut().size(), expected);
}

#[then("cache creation fails")]
async fn then_creation_fails(world: &mut ShortlinkWorld) {
    assert!(world.cache.is_none());
    let error = world.cache_error.as_deref().expect("cache creation succeeded");
    assert!(error.contains("capacity"), "unexpected error: {}", error);
}
