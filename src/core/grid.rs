//! Grid layout — arrange a folder's children into rows of tiles.
//!
//! The grid is rebuilt from scratch whenever the displayed folder changes.
//! Tiles fill rows left-to-right and wrap after the configured number of
//! columns, so every row is full except possibly the last one.

use serde::{Deserialize, Serialize};

use super::bookmarks::{
    BookmarkNode, BOOKMARKS_BAR_ID, MOBILE_BOOKMARKS_ID, OTHER_BOOKMARKS_ID, ROOT_ID,
};

// ───────────────────────────────────────── types ─────────────

/// How rows shorter than the widest row sit inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: &[Alignment] = &[Alignment::Left, Alignment::Center, Alignment::Right];

    /// Value as stored in settings.
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Alignment::Left => "Left",
            Alignment::Center => "Center",
            Alignment::Right => "Right",
        }
    }
}

/// Which of the root's special folders may appear in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialFolders {
    pub bookmarks_bar: bool,
    pub other: bool,
    pub mobile: bool,
}

impl SpecialFolders {
    /// Whether a child of the root with this id should be shown.
    pub fn allows(&self, id: &str) -> bool {
        match id {
            BOOKMARKS_BAR_ID => self.bookmarks_bar,
            OTHER_BOOKMARKS_ID => self.other,
            MOBILE_BOOKMARKS_ID => self.mobile,
            _ => true,
        }
    }

    /// The folder shown when no specific folder is requested.
    ///
    /// If exactly one special folder is allowed there is nothing else to pick
    /// at the root, so that folder is shown directly.
    pub fn effective_root(&self) -> &'static str {
        match (self.bookmarks_bar, self.other, self.mobile) {
            (true, false, false) => BOOKMARKS_BAR_ID,
            (false, true, false) => OTHER_BOOKMARKS_ID,
            (false, false, true) => MOBILE_BOOKMARKS_ID,
            _ => ROOT_ID,
        }
    }

    /// Resolve a location fragment (`#123`) to a folder id.
    ///
    /// Anything other than `#` followed by digits selects the effective root.
    pub fn folder_for_fragment(&self, fragment: &str) -> String {
        match fragment.strip_prefix('#') {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits.to_string()
            }
            _ => self.effective_root().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKind {
    Link { url: String },
    Folder { target_id: String },
}

/// One rendered bookmark tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    pub label: String,
    pub col: usize,
    pub row: usize,
}

// ───────────────────────────────────────── layout ────────────

/// Tiles grouped into rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLayout {
    rows: Vec<Vec<Tile>>,
}

impl GridLayout {
    /// Lay out `children` of `folder_id` in rows of `columns` tiles.
    ///
    /// At the root, special folders disallowed by `folders` are dropped
    /// before columns are assigned, so they never leave gaps.
    pub fn build(
        folder_id: &str,
        children: &[BookmarkNode],
        columns: usize,
        folders: &SpecialFolders,
    ) -> Self {
        let columns = columns.max(1);
        let at_root = folder_id == ROOT_ID;
        let mut rows: Vec<Vec<Tile>> = Vec::new();

        let visible = children.iter().filter(|node| match node {
            BookmarkNode::Folder { id, .. } if at_root => folders.allows(id),
            _ => true,
        });

        for (i, node) in visible.enumerate() {
            let col = i % columns;
            if col == 0 {
                rows.push(Vec::with_capacity(columns));
            }
            let row = rows.len() - 1;
            let kind = match node {
                BookmarkNode::Link { url, .. } => TileKind::Link { url: url.clone() },
                BookmarkNode::Folder { id, .. } => TileKind::Folder {
                    target_id: id.clone(),
                },
            };
            rows[row].push(Tile {
                kind,
                label: node.title().to_string(),
                col,
                row,
            });
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of tiles in `row`, or `None` past the last row.
    pub fn column_count(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Vec::len)
    }

    /// Widest row (the configured column count unless there are fewer tiles).
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<&Tile> {
        self.rows.get(row)?.get(col)
    }

    pub fn first_tile(&self) -> Option<&Tile> {
        self.tile(0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn tile_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}
