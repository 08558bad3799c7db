use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::canvas::ingest::ingest_node;
use crate::canvas::node::{SceneNode, collect};
use crate::error::DocumentError;

/// One page of the design document. The page itself is not a scene node and
/// never takes part in discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub children: Vec<SceneNode>,
}

impl Page {
    /// All nodes of the page matching `pred`, pre-order (canvas traversal order).
    pub fn find_all<'a, F>(&'a self, pred: F) -> Vec<&'a SceneNode>
    where
        F: Fn(&SceneNode) -> bool,
    {
        let mut out = Vec::new();
        collect(&self.children, &pred, &mut out);
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&SceneNode> {
        self.children.iter().find_map(|n| n.find_by_id(id))
    }
}

/// Read-only view of a host document export.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub name: String,
    pub pages: Vec<Page>,
    current: usize,
}

impl Canvas {
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            pages,
            current: 0,
        }
    }

    /// Single-page canvas, mostly for tests and embedding.
    pub fn from_nodes(nodes: Vec<SceneNode>) -> Self {
        Self::new(
            "Untitled",
            vec![Page {
                id: "0:1".to_string(),
                name: "Page 1".to_string(),
                children: nodes,
            }],
        )
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Accepted shapes, checked in order:
    /// - `{ "name", "pages": [page...], "currentPage"? }`
    /// - REST file `{ "name", "document": { "children": [CANVAS...] } }`
    /// - a single page `{ "type": "PAGE" | "CANVAS", "children": [...] }`
    /// - a single node.
    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string();

        let page_values: Vec<&Value> = if let Some(pages) = value.get("pages").and_then(Value::as_array) {
            pages.iter().collect()
        } else if let Some(doc) = value.get("document") {
            doc.get("children")
                .and_then(Value::as_array)
                .map(|c| c.iter().collect())
                .unwrap_or_default()
        } else if matches!(
            value.get("type").and_then(Value::as_str),
            Some("PAGE") | Some("CANVAS")
        ) {
            vec![value]
        } else if value.get("type").is_some() {
            let node = ingest_node(value).ok_or(DocumentError::NoNodes)?;
            return Ok(Self::from_nodes(vec![node]));
        } else {
            vec![]
        };

        let pages: Vec<Page> = page_values.into_iter().filter_map(ingest_page).collect();
        if pages.is_empty() {
            return Err(DocumentError::NoNodes);
        }

        let mut canvas = Self::new(name, pages);
        if let Some(current) = value.get("currentPage") {
            canvas.select_page(current);
        }
        debug!(
            pages = canvas.pages.len(),
            current = %canvas.current_page().name,
            "document loaded"
        );
        Ok(canvas)
    }

    fn select_page(&mut self, selector: &Value) {
        let index = match selector {
            Value::Number(n) => n.as_u64().map(|i| i as usize),
            Value::String(id) => self.pages.iter().position(|p| &p.id == id || &p.name == id),
            _ => None,
        };
        match index {
            Some(i) if i < self.pages.len() => self.current = i,
            _ => warn!(selector = %selector, "currentPage does not match any page, using the first"),
        }
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    /// Nodes of the current page matching `pred`, in traversal order.
    pub fn find_all<'a, F>(&'a self, pred: F) -> Vec<&'a SceneNode>
    where
        F: Fn(&SceneNode) -> bool,
    {
        self.current_page().find_all(pred)
    }

    /// Lookup across all pages. A spec id is only a weak reference: the node
    /// may be gone.
    pub fn find_by_id(&self, id: &str) -> Option<&SceneNode> {
        self.pages.iter().find_map(|p| p.find_by_id(id))
    }
}

fn ingest_page(value: &Value) -> Option<Page> {
    let obj = value.as_object()?;
    let children = obj
        .get("children")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(ingest_node).collect())
        .unwrap_or_default();

    Some(Page {
        id: obj
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        children,
    })
}
