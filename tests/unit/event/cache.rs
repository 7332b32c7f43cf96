use super::*;

#[test]
fn values_are_keyed_by_layout_id() {
    let cache = PrecalcCache::new();
    let a = LayoutId::next();
    let b = LayoutId::next();
    cache.insert(a, "alpha".to_string());

    assert_eq!(cache.get(a).as_deref(), Some("alpha"));
    assert_eq!(cache.get(b), None);
    assert!(cache.contains(a));
    assert_eq!(cache.len(), 1);

    cache.insert(a, "beta".to_string());
    assert_eq!(cache.get(a).as_deref(), Some("beta"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn clone_is_a_snapshot() {
    let cache = PrecalcCache::new();
    let a = LayoutId::next();
    cache.insert(a, "x".to_string());

    let snapshot = cache.clone();
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(snapshot.get(a).as_deref(), Some("x"));
}
