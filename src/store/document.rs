//! Key-path operations on a JSON document tree.
//!
//! Deleting a path prunes parent objects that become empty, but never a
//! top-level root: once a root exists it keeps existing, so emptying a
//! collection does not look like a fresh store.

use serde_json::{Map, Value};

pub fn get<'a>(tree: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

/// Set `value` at the path, creating intermediate objects as needed.
/// Writing `null` is a delete.
pub fn set(tree: &mut Value, segments: &[String], value: Value) {
    if value.is_null() {
        remove(tree, segments);
        return;
    }
    let Some((last, parents)) = segments.split_last() else {
        *tree = value;
        return;
    };

    let mut node = tree;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.clone(), value);
}

/// Remove the value at the path. Returns whether anything was removed.
pub fn remove(tree: &mut Value, segments: &[String]) -> bool {
    remove_at(tree, segments, 0)
}

fn remove_at(node: &mut Value, segments: &[String], depth: usize) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    if rest.is_empty() {
        return map.remove(head).is_some();
    }

    let Some(child) = map.get_mut(head) else {
        return false;
    };
    let removed = remove_at(child, rest, depth + 1);
    if removed && depth > 0 && child.as_object().is_some_and(Map::is_empty) {
        map.remove(head);
    }
    removed
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut tree = json!({});
        set(&mut tree, &segs("participants/tim-a/scores/juri-1/3"), json!(60));
        assert_eq!(
            tree,
            json!({ "participants": { "tim-a": { "scores": { "juri-1": { "3": 60 } } } } })
        );
        assert_eq!(get(&tree, &segs("participants/tim-a/scores/juri-1/3")), Some(&json!(60)));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut tree = json!({ "judges": { "juri-1": { "id": "juri-1", "name": "Old" } } });
        set(&mut tree, &segs("judges/juri-1"), json!({ "id": "juri-1", "name": "New" }));
        assert_eq!(get(&tree, &segs("judges/juri-1/name")), Some(&json!("New")));
    }

    #[test]
    fn test_remove_prunes_empty_parents_but_keeps_root() {
        let mut tree = json!({ "participants": { "tim-a": { "scores": { "juri-1": { "3": 60 } } } } });
        assert!(remove(&mut tree, &segs("participants/tim-a/scores/juri-1/3")));
        // scores and tim-a emptied out; only the root survives
        assert_eq!(tree, json!({ "participants": {} }));
    }

    #[test]
    fn test_remove_keeps_non_empty_siblings() {
        let mut tree = json!({
            "participants": { "tim-a": { "id": "tim-a", "scores": { "juri-1": { "3": 60, "4": 65 } } } }
        });
        assert!(remove(&mut tree, &segs("participants/tim-a/scores/juri-1/3")));
        assert_eq!(
            get(&tree, &segs("participants/tim-a/scores/juri-1")),
            Some(&json!({ "4": 65 }))
        );
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut tree = json!({ "judges": {} });
        assert!(!remove(&mut tree, &segs("judges/juri-9")));
        assert!(!remove(&mut tree, &segs("participants/tim-a/scores")));
        assert_eq!(tree, json!({ "judges": {} }));
    }

    #[test]
    fn test_set_null_deletes() {
        let mut tree = json!({ "judges": { "juri-1": { "id": "juri-1" } } });
        set(&mut tree, &segs("judges/juri-1"), Value::Null);
        assert_eq!(tree, json!({ "judges": {} }));
    }

    #[test]
    fn test_root_can_be_removed_explicitly() {
        let mut tree = json!({ "judges": { "juri-1": {} } });
        assert!(remove(&mut tree, &segs("judges")));
        assert_eq!(get(&tree, &segs("judges")), None);
    }
}
