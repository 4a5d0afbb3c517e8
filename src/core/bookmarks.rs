//! Bookmark hierarchy — the tree behind the new-tab grid.
//!
//! The [`BookmarkTree`] stores every link and folder in an arena and links
//! them by index, exactly like a browser's bookmark store keys nodes by id.
//! The rest of the app never touches the arena; it talks to a
//! [`BookmarkSource`], which mirrors the browser's asynchronous
//! `getChildren` / `get` calls.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use serde::Deserialize;

/// Id of the invisible root that holds the three special folders.
pub const ROOT_ID: &str = "0";
pub const BOOKMARKS_BAR_ID: &str = "1";
pub const OTHER_BOOKMARKS_ID: &str = "2";
pub const MOBILE_BOOKMARKS_ID: &str = "3";

#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    #[error("unknown bookmark folder `{0}`")]
    UnknownFolder(String),
    #[error("failed to read bookmarks file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed bookmarks file: {0}")]
    Parse(#[from] serde_json::Error),
}

// ───────────────────────────────────────── public node ───────

/// One bookmark entry as handed out by a [`BookmarkSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkNode {
    Link {
        id: String,
        title: String,
        url: String,
    },
    Folder {
        id: String,
        title: String,
        parent_id: Option<String>,
    },
}

impl BookmarkNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Link { id, .. } | Self::Folder { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Link { title, .. } | Self::Folder { title, .. } => title,
        }
    }
}

/// Read access to a bookmark hierarchy.
///
/// Both calls are asynchronous because the real store lives behind the
/// browser's extension API; the returned futures must be `Send` so fetches
/// can run on spawned tasks.
pub trait BookmarkSource: Send + Sync + 'static {
    /// Ordered children of the folder `id`.
    fn get_children(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Vec<BookmarkNode>, BookmarkError>> + Send;

    /// The node `id` itself, or `None` if no such node exists.
    fn get_node(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<BookmarkNode>, BookmarkError>> + Send;
}

// ───────────────────────────────────────── arena tree ────────

/// Index into [`BookmarkTree::nodes`].
type NodeIdx = usize;

#[derive(Debug, Clone)]
struct TreeNode {
    id: String,
    title: String,
    /// `Some` for links, `None` for folders.
    url: Option<String>,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
}

/// Arena-backed bookmark tree.
///
/// A fresh tree always contains the root and the three special folders, so
/// the well-known ids resolve even for an empty profile.
#[derive(Debug, Clone)]
pub struct BookmarkTree {
    nodes: Vec<TreeNode>,
    by_id: HashMap<String, NodeIdx>,
}

impl Default for BookmarkTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkTree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: vec![TreeNode {
                id: ROOT_ID.to_string(),
                title: String::new(),
                url: None,
                parent: None,
                children: Vec::new(),
            }],
            by_id: HashMap::from([(ROOT_ID.to_string(), 0)]),
        };
        tree.push(0, BOOKMARKS_BAR_ID, "Bookmarks bar", None);
        tree.push(0, OTHER_BOOKMARKS_ID, "Other bookmarks", None);
        tree.push(0, MOBILE_BOOKMARKS_ID, "Mobile bookmarks", None);
        tree
    }

    /// Add a folder under `parent_id` and return the id it was stored under.
    pub fn add_folder(&mut self, parent_id: &str, id: &str, title: &str) -> Option<String> {
        let parent = *self.by_id.get(parent_id)?;
        self.folder_guard(parent)?;
        let idx = self.push(parent, id, title, None);
        Some(self.nodes[idx].id.clone())
    }

    /// Add a link under `parent_id` and return the id it was stored under.
    pub fn add_link(&mut self, parent_id: &str, id: &str, title: &str, url: &str) -> Option<String> {
        let parent = *self.by_id.get(parent_id)?;
        self.folder_guard(parent)?;
        let idx = self.push(parent, id, title, Some(url.to_string()));
        Some(self.nodes[idx].id.clone())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Links can't hold children.
    fn folder_guard(&self, idx: NodeIdx) -> Option<()> {
        self.nodes[idx].url.is_none().then_some(())
    }

    /// Insert a node. Empty or already-taken ids get a fresh numeric id.
    fn push(&mut self, parent: NodeIdx, id: &str, title: &str, url: Option<String>) -> NodeIdx {
        let id = if id.is_empty() || self.by_id.contains_key(id) {
            self.fresh_id()
        } else {
            id.to_string()
        };
        let idx = self.nodes.len();
        self.nodes.push(TreeNode {
            id: id.clone(),
            title: title.to_string(),
            url,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(idx);
        self.by_id.insert(id, idx);
        idx
    }

    fn fresh_id(&self) -> String {
        let mut n = self.nodes.len();
        while self.by_id.contains_key(&n.to_string()) {
            n += 1;
        }
        n.to_string()
    }

    fn node(&self, idx: NodeIdx) -> BookmarkNode {
        let node = &self.nodes[idx];
        match &node.url {
            Some(url) => BookmarkNode::Link {
                id: node.id.clone(),
                title: node.title.clone(),
                url: url.clone(),
            },
            None => BookmarkNode::Folder {
                id: node.id.clone(),
                title: node.title.clone(),
                parent_id: node.parent.map(|p| self.nodes[p].id.clone()),
            },
        }
    }

    /// Children of folder `id`, in stored order.
    pub fn children(&self, id: &str) -> Result<Vec<BookmarkNode>, BookmarkError> {
        let idx = self
            .by_id
            .get(id)
            .copied()
            .filter(|&i| self.nodes[i].url.is_none())
            .ok_or_else(|| BookmarkError::UnknownFolder(id.to_string()))?;
        Ok(self.nodes[idx].children.iter().map(|&c| self.node(c)).collect())
    }

    pub fn lookup(&self, id: &str) -> Option<BookmarkNode> {
        self.by_id.get(id).map(|&idx| self.node(idx))
    }

    // ── Chromium `Bookmarks` file ───────────────────────────────

    /// Build a tree from the JSON of a Chromium-family `Bookmarks` file.
    ///
    /// `roots.bookmark_bar`, `roots.other` and `roots.synced` become the three
    /// special folders; their ids are pinned to `1`, `2` and `3`.
    pub fn from_chromium_json(json: &str) -> Result<Self, BookmarkError> {
        let file: ChromiumFile = serde_json::from_str(json)?;
        let mut tree = Self::new();

        let roots = [
            (BOOKMARKS_BAR_ID, file.roots.bookmark_bar),
            (OTHER_BOOKMARKS_ID, file.roots.other),
            (MOBILE_BOOKMARKS_ID, file.roots.synced),
        ];
        for (special_id, entry) in roots {
            let Some(entry) = entry else { continue };
            let idx = tree.by_id[special_id];
            if !entry.name.is_empty() {
                tree.nodes[idx].title = entry.name;
            }
            tree.add_chromium_children(idx, entry.children);
        }

        Ok(tree)
    }

    /// Read and parse a Chromium `Bookmarks` file from disk.
    pub fn load(path: &Path) -> Result<Self, BookmarkError> {
        let contents = std::fs::read_to_string(path)?;
        let tree = Self::from_chromium_json(&contents)?;
        tracing::debug!("loaded {} bookmark nodes from {}", tree.len(), path.display());
        Ok(tree)
    }

    fn add_chromium_children(&mut self, parent: NodeIdx, entries: Vec<ChromiumEntry>) {
        for entry in entries {
            match (entry.kind.as_str(), entry.url) {
                ("url", Some(url)) => {
                    self.push(parent, &entry.id, &entry.name, Some(url));
                }
                // Anything that isn't a proper link is treated as a folder.
                _ => {
                    let idx = self.push(parent, &entry.id, &entry.name, None);
                    self.add_chromium_children(idx, entry.children);
                }
            }
        }
    }
}

impl BookmarkSource for BookmarkTree {
    async fn get_children(&self, id: &str) -> Result<Vec<BookmarkNode>, BookmarkError> {
        self.children(id)
    }

    async fn get_node(&self, id: &str) -> Result<Option<BookmarkNode>, BookmarkError> {
        Ok(self.lookup(id))
    }
}

// ───────────────────────────────────────── file format ───────

#[derive(Debug, Deserialize)]
struct ChromiumFile {
    roots: ChromiumRoots,
}

#[derive(Debug, Deserialize)]
struct ChromiumRoots {
    bookmark_bar: Option<ChromiumEntry>,
    other: Option<ChromiumEntry>,
    synced: Option<ChromiumEntry>,
}

#[derive(Debug, Deserialize)]
struct ChromiumEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    url: Option<String>,
    #[serde(default)]
    children: Vec<ChromiumEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "checksum": "00",
        "roots": {
            "bookmark_bar": {
                "id": "1", "name": "Bookmarks bar", "type": "folder",
                "children": [
                    { "id": "5", "name": "Rust", "type": "url", "url": "https://www.rust-lang.org/" },
                    { "id": "6", "name": "Reading", "type": "folder", "children": [
                        { "id": "7", "name": "Docs", "type": "url", "url": "https://docs.rs/" }
                    ] }
                ]
            },
            "other": { "id": "2", "name": "Other bookmarks", "type": "folder", "children": [] },
            "synced": { "id": "3", "name": "Mobile bookmarks", "type": "folder", "children": [] }
        },
        "version": 1
    }"#;

    #[test]
    fn empty_tree_has_special_folders() {
        let tree = BookmarkTree::new();
        let ids: Vec<_> = tree
            .children(ROOT_ID)
            .unwrap()
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn parses_chromium_file() {
        let tree = BookmarkTree::from_chromium_json(SAMPLE).unwrap();
        let bar = tree.children(BOOKMARKS_BAR_ID).unwrap();
        assert_eq!(bar.len(), 2);
        assert_eq!(
            bar[0],
            BookmarkNode::Link {
                id: "5".into(),
                title: "Rust".into(),
                url: "https://www.rust-lang.org/".into(),
            }
        );
        assert_eq!(
            tree.lookup("6"),
            Some(BookmarkNode::Folder {
                id: "6".into(),
                title: "Reading".into(),
                parent_id: Some("1".into()),
            })
        );
        assert_eq!(tree.children("6").unwrap()[0].title(), "Docs");
    }

    #[test]
    fn unknown_or_link_ids_are_not_folders() {
        let tree = BookmarkTree::from_chromium_json(SAMPLE).unwrap();
        assert!(matches!(tree.children("99"), Err(BookmarkError::UnknownFolder(_))));
        assert!(matches!(tree.children("5"), Err(BookmarkError::UnknownFolder(_))));
    }

    #[test]
    fn duplicate_ids_get_fresh_ones() {
        let mut tree = BookmarkTree::new();
        let a = tree.add_link(BOOKMARKS_BAR_ID, "10", "a", "https://a.example/").unwrap();
        let b = tree.add_link(BOOKMARKS_BAR_ID, "10", "b", "https://b.example/").unwrap();
        assert_eq!(a, "10");
        assert_ne!(a, b);
        assert_eq!(tree.children(BOOKMARKS_BAR_ID).unwrap().len(), 2);
        assert!(tree.add_folder(&a, "", "nested").is_none());
    }

    #[tokio::test]
    async fn source_trait_reports_missing_nodes() {
        let tree = BookmarkTree::from_chromium_json(SAMPLE).unwrap();
        assert!(tree.get_node("404").await.unwrap().is_none());
        assert_eq!(tree.get_children("6").await.unwrap().len(), 1);
    }
}
