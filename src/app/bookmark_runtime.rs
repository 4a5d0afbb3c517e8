//! Background bookmark fetches, so the UI keeps drawing while the grid loads.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::{
    bookmarks::{BookmarkError, BookmarkNode, BookmarkSource},
    grid::{GridLayout, SpecialFolders},
};

/// Everything the view needs to show one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFolder {
    /// The folder actually shown (the root if the requested one was unknown).
    pub folder_id: String,
    pub layout: GridLayout,
    /// Empty at the root.
    pub title: String,
    /// Where the back affordance leads; `None` hides it.
    pub back_target: Option<String>,
}

pub struct BookmarkUpdate {
    pub result: Result<RenderedFolder, BookmarkError>,
}

/// Parameters of one render, captured when the request is made.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub folder_id: String,
    pub columns: usize,
    pub folders: SpecialFolders,
}

pub fn spawn_folder_render<B: BookmarkSource>(
    tx: mpsc::UnboundedSender<BookmarkUpdate>,
    source: Arc<B>,
    request: RenderRequest,
) {
    tokio::spawn(async move {
        let result = render_folder(source.as_ref(), &request).await;
        let _ = tx.send(BookmarkUpdate { result });
    });
}

/// Fetch a folder's children and lay them out.
///
/// A folder id that doesn't resolve falls back to the effective root.
pub async fn render_folder<B: BookmarkSource>(
    source: &B,
    request: &RenderRequest,
) -> Result<RenderedFolder, BookmarkError> {
    let root = request.folders.effective_root();
    let (folder_id, children) = match source.get_children(&request.folder_id).await {
        Ok(children) => (request.folder_id.clone(), children),
        Err(BookmarkError::UnknownFolder(id)) if id != root => {
            tracing::debug!("folder {id} not found, showing root {root}");
            (root.to_string(), source.get_children(root).await?)
        }
        Err(e) => return Err(e),
    };

    let layout = GridLayout::build(&folder_id, &children, request.columns, &request.folders);

    let (title, back_target) = if folder_id == root {
        (String::new(), None)
    } else {
        match source.get_node(&folder_id).await? {
            Some(BookmarkNode::Folder {
                title, parent_id, ..
            }) => (title, parent_id),
            _ => (String::new(), None),
        }
    };

    Ok(RenderedFolder {
        folder_id,
        layout,
        title,
        back_target,
    })
}
