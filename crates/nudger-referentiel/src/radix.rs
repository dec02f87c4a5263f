//! Compressed prefix tree (radix tree) keyed by strings.
//!
//! Edges carry whole label fragments, split only where two keys diverge, so
//! a prefix query walks at most one edge per distinct fragment before
//! collecting the subtree below it.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct RadixTree<V> {
    root: Node<V>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<V> {
    value: Option<V>,
    /// Outgoing edges keyed by the first char of their label
    children: BTreeMap<char, Edge<V>>,
}

#[derive(Debug, Clone)]
struct Edge<V> {
    label: String,
    node: Box<Node<V>>,
}

/// Byte length of the longest common prefix, always on a char boundary
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

impl<V> Node<V> {
    fn empty() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }

    fn leaf(value: V) -> Self {
        Self {
            value: Some(value),
            children: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let Some(first) = key.chars().next() else {
            return self.value.replace(value);
        };

        if !self.children.contains_key(&first) {
            self.children.insert(
                first,
                Edge {
                    label: key.to_string(),
                    node: Box::new(Node::leaf(value)),
                },
            );
            return None;
        }
        let edge = self.children.get_mut(&first)?;

        let common = common_prefix_len(&edge.label, key);
        if common < edge.label.len() {
            // Split the edge: keep the shared part, push the rest one level down
            let suffix = edge.label.split_off(common);
            let below = std::mem::replace(&mut edge.node, Box::new(Node::empty()));
            if let Some(suffix_first) = suffix.chars().next() {
                edge.node.children.insert(
                    suffix_first,
                    Edge {
                        label: suffix,
                        node: below,
                    },
                );
            }
        }
        edge.node.insert(&key[common..], value)
    }

    fn get(&self, key: &str) -> Option<&V> {
        let Some(first) = key.chars().next() else {
            return self.value.as_ref();
        };
        let edge = self.children.get(&first)?;
        key.strip_prefix(edge.label.as_str())
            .and_then(|rest| edge.node.get(rest))
    }

    fn collect<'a>(&'a self, path: &mut String, out: &mut Vec<(String, &'a V)>) {
        if let Some(value) = &self.value {
            out.push((path.clone(), value));
        }
        for edge in self.children.values() {
            let mark = path.len();
            path.push_str(&edge.label);
            edge.node.collect(path, out);
            path.truncate(mark);
        }
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RadixTree<V> {
    pub fn new() -> Self {
        Self {
            root: Node::empty(),
            len: 0,
        }
    }

    /// Insert `key`, returning the value it previously held
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let previous = self.root.insert(key, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Exact lookup
    pub fn get(&self, key: &str) -> Option<&V> {
        self.root.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All `(key, value)` pairs whose key starts with `prefix`, in key order
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, &V)> {
        let mut node = &self.root;
        let mut path = String::new();
        let mut rest = prefix;

        while let Some(first) = rest.chars().next() {
            let Some(edge) = node.children.get(&first) else {
                return Vec::new();
            };
            if let Some(after) = rest.strip_prefix(edge.label.as_str()) {
                path.push_str(&edge.label);
                node = &edge.node;
                rest = after;
            } else if edge.label.starts_with(rest) {
                // The prefix ends inside this edge: everything below matches
                path.push_str(&edge.label);
                node = &edge.node;
                rest = "";
            } else {
                return Vec::new();
            }
        }

        let mut out = Vec::new();
        node.collect(&mut path, &mut out);
        out
    }

    /// Values of all keys starting with `prefix`
    pub fn values_with_prefix(&self, prefix: &str) -> Vec<&V> {
        self.entries_with_prefix(prefix)
            .into_iter()
            .map(|(_, v)| v)
            .collect()
    }

    /// Every entry, in key order
    pub fn iter(&self) -> impl Iterator<Item = (String, &V)> {
        self.entries_with_prefix("").into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(keys: &[(&str, u64)]) -> RadixTree<u64> {
        let mut t = RadixTree::new();
        for (k, v) in keys {
            t.insert(k, *v);
        }
        t
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("KV1234", "KV1299"), 4);
        assert_eq!(common_prefix_len("KV", "KV1234"), 2);
        assert_eq!(common_prefix_len("abc", "xyz"), 0);
        assert_eq!(common_prefix_len("éa", "éb"), 'é'.len_utf8());
    }

    #[test]
    fn test_insert_and_get_with_splits() {
        let t = tree(&[("KV1234", 1), ("KV1234A", 2), ("KV12", 3), ("KD55", 4)]);

        assert_eq!(t.len(), 4);
        assert_eq!(t.get("KV1234"), Some(&1));
        assert_eq!(t.get("KV1234A"), Some(&2));
        assert_eq!(t.get("KV12"), Some(&3));
        assert_eq!(t.get("KD55"), Some(&4));
        assert_eq!(t.get("KV"), None);
        assert_eq!(t.get("KV12345"), None);
        assert_eq!(t.get(""), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut t = tree(&[("ABC", 1)]);
        assert_eq!(t.insert("ABC", 2), Some(1));
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("ABC"), Some(&2));
    }

    #[test]
    fn test_prefix_query() {
        let t = tree(&[("ABC1", 10), ("ABC2", 20), ("ABD", 30), ("X", 40)]);

        let keys: Vec<String> = t.entries_with_prefix("ABC").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ABC1", "ABC2"]);

        // prefix ending inside an edge
        assert_eq!(t.values_with_prefix("AB").len(), 3);
        assert_eq!(t.values_with_prefix("ABC1"), vec![&10]);
        assert!(t.values_with_prefix("ABE").is_empty());
        assert!(t.values_with_prefix("ABC12").is_empty());
        assert_eq!(t.values_with_prefix("").len(), 4);
    }

    #[test]
    fn test_unicode_keys() {
        let t = tree(&[("TÉLÉ-1", 1), ("TÉLÉ-2", 2), ("TE", 3)]);
        assert_eq!(t.values_with_prefix("TÉ").len(), 2);
        assert_eq!(t.get("TE"), Some(&3));
    }

    #[test]
    fn test_iter_is_sorted() {
        let t = tree(&[("b", 2), ("a", 1), ("ab", 3)]);
        let keys: Vec<String> = t.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "ab", "b"]);
    }
}
