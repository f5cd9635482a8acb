use cucumber::{given, then, when};
use cucumber_tests::ShortlinkWorld;

#[given(expr = "a shortlink server with cache capacity {int}")]
async fn given_server(world: &mut ShortlinkWorld, capacity: usize) {
    world.start_server(capacity).await.expect("server failed to start");
}

#[when(expr = "I shorten {string}")]
async fn when_shorten(world: &mut ShortlinkWorld, original_url: String) {
    if world.shorten(&original_url).await.is_err() {
        // Rejected input: the response is still recorded for Then steps
        assert!(world.last_response.is_some(), "no response for {}", original_url);
    }
}

#[when(expr = "I follow the short link for {string}")]
async fn when_follow(world: &mut ShortlinkWorld, original_url: String) {
    let code = world.code_for(&original_url);
    world.request("GET", &format!("/{}", code), None).await.expect("redirect request failed");
}

#[when(expr = "I request stats for {string}")]
async fn when_stats(world: &mut ShortlinkWorld, original_url: String) {
    let code = world.code_for(&original_url);
    world.request("GET", &format!("/stats/{}", code), None).await.expect("stats request failed");
}

#[when(expr = "I send {word} to {string}")]
async fn when_send(world: &mut ShortlinkWorld, method: String, path: String) {
    world.request(&method, &path, None).await.expect("request failed");
}

#[then(expr = "the response status is {int}")]
async fn then_status(world: &mut ShortlinkWorld, expected: u16) {
    assert_eq!(world.last().status, expected, "body: {}", world.last().body);
}

#[then(expr = "I am redirected to {string}")]
async fn then_redirected(world: &mut ShortlinkWorld, expected: String) {
    assert_eq!(world.last().location.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the click count is {int}")]
async fn then_click_count(world: &mut ShortlinkWorld, expected: u64) {
    assert_eq!(world.last().body["click_count"].as_u64(), Some(expected));
}

#[then(expr = "both requests for {string} returned the same code")]
async fn then_same_code(world: &mut ShortlinkWorld, original_url: String) {
    let remembered = world.code_for(&original_url);
    assert_eq!(world.last().body["short_code"].as_str(), Some(remembered.as_str()));
    assert_eq!(world.codes.len(), 1);
}

#[then(expr = "the cache reports {int} hits and {int} misses")]
async fn then_cache_counts(world: &mut ShortlinkWorld, hits: u64, misses: u64) {
    world.request("GET", "/cache/stats", None).await.expect("cache stats request failed");
    let body = &world.last().body;
    assert_eq!(body["hits"].as_u64(), Some(hits));
    assert_eq!(body["misses"].as_u64(), Some(misses));
}

#[then(expr = "the hit rate is {string}")]
async fn then_hit_rate(world: &mut ShortlinkWorld, expected: String) {
    assert_eq!(world.last().body["hit_rate"].as_str(), Some(expected.as_str()));
}
