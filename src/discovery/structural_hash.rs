use std::collections::HashMap;

use crate::canvas::node::SceneNode;
use crate::error::HashError;

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_VISIT_BUDGET: usize = 10_000;

/// Sentinel suffixes substituted for a subtree that could not be hashed.
pub const MAX_DEPTH_SENTINEL: &str = "MAX_DEPTH";
pub const CIRCULAR_SENTINEL: &str = "CIRCULAR";
pub const BUDGET_SENTINEL: &str = "TIMEOUT";
pub const ERROR_SENTINEL: &str = "ERROR";

#[derive(Debug, Clone)]
struct CachedHash {
    hash: String,
    /// Levels below the node (0 for a leaf).
    height: usize,
    /// Nodes in the subtree, the node included.
    size: usize,
}

/// Per-root traversal state.
struct Walk {
    path: Vec<String>,
    visits: usize,
}

/// Result of hashing one subtree.
struct Hashed {
    hash: String,
    height: usize,
    size: usize,
    /// No sentinel anywhere below: safe to memoize.
    exact: bool,
}

/// Structural fingerprint of a subtree's node-type shape.
///
/// A leaf hashes to its type tag; an interior node to
/// `TYPE[child,child,...]` with the child hashes sorted, so sibling order does
/// not matter. Styling never takes part.
///
/// The memo cache belongs to one discovery pass: call [`clear`](Self::clear)
/// before and after each pass. A cached entry is only reused when reusing it
/// gives the same result as recomputing under the current depth bound and
/// visit budget. When ids are unique within the document, hashes therefore
/// do not depend on the order nodes are hashed in. Nodes sharing an id share
/// a cache entry and skip the `CIRCULAR` check on a hit, so with duplicate
/// ids the result can depend on that order.
#[derive(Debug)]
pub struct StructuralHasher {
    cache: HashMap<String, CachedHash>,
    max_depth: usize,
    visit_budget: usize,
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, DEFAULT_VISIT_BUDGET)
    }
}

impl StructuralHasher {
    pub fn new(max_depth: usize, visit_budget: usize) -> Self {
        Self {
            cache: HashMap::new(),
            max_depth,
            visit_budget: visit_budget.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Hash `node`'s subtree.
    ///
    /// Problems below the root (depth bound, an id revisited on the current
    /// path, an exhausted visit budget, a child without id) become sentinel
    /// leaves such as `FRAME[CIRCULAR]`. Only a root that cannot be identified
    /// is an error.
    pub fn hash(&mut self, node: &SceneNode) -> Result<String, HashError> {
        if node.id.is_empty() {
            return Err(HashError::MissingId {
                node_type: node.type_tag().to_string(),
            });
        }

        let mut walk = Walk {
            path: Vec::new(),
            visits: 0,
        };
        Ok(self.hash_at(node, 0, &mut walk).hash)
    }

    fn hash_at(&mut self, node: &SceneNode, depth: usize, walk: &mut Walk) -> Hashed {
        let tag = node.type_tag();

        if depth > self.max_depth {
            return sentinel(tag, MAX_DEPTH_SENTINEL);
        }
        if node.id.is_empty() {
            return sentinel(tag, ERROR_SENTINEL);
        }
        if walk.path.iter().any(|id| id == &node.id) {
            return sentinel(tag, CIRCULAR_SENTINEL);
        }

        if let Some(cached) = self.cache.get(&node.id) {
            if depth + cached.height <= self.max_depth
                && walk.visits + cached.size <= self.visit_budget
            {
                walk.visits += cached.size;
                return Hashed {
                    hash: cached.hash.clone(),
                    height: cached.height,
                    size: cached.size,
                    exact: true,
                };
            }
        }

        walk.visits += 1;
        if walk.visits > self.visit_budget {
            return sentinel(tag, BUDGET_SENTINEL);
        }

        let result = if node.children.is_empty() {
            Hashed {
                hash: tag.to_string(),
                height: 0,
                size: 1,
                exact: true,
            }
        } else {
            walk.path.push(node.id.clone());
            let mut child_hashes = Vec::with_capacity(node.children.len());
            let mut height = 0;
            let mut size = 1;
            let mut exact = true;
            for child in &node.children {
                let hashed = self.hash_at(child, depth + 1, walk);
                height = height.max(hashed.height + 1);
                size += hashed.size;
                exact &= hashed.exact;
                child_hashes.push(hashed.hash);
            }
            walk.path.pop();

            child_hashes.sort();
            Hashed {
                hash: format!("{}[{}]", tag, child_hashes.join(",")),
                height,
                size,
                exact,
            }
        };

        if result.exact {
            self.cache.insert(
                node.id.clone(),
                CachedHash {
                    hash: result.hash.clone(),
                    height: result.height,
                    size: result.size,
                },
            );
        }
        result
    }
}

fn sentinel(tag: &str, reason: &str) -> Hashed {
    Hashed {
        hash: format!("{tag}[{reason}]"),
        height: 0,
        size: 1,
        exact: false,
    }
}
