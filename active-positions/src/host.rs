//! Boundary to the editor that embeds the tracker.

use serde::{Deserialize, Serialize};

use crate::store::{DocumentId, Focus};
use crate::view::ClusterItem;

/// What the embedding editor provides to, and accepts from, the tracker.
///
/// Editor-side failures (no active editor, closed document) must be
/// absorbed here and reported as `None` from [`EditorHost::focus`].
pub trait EditorHost {
    /// The focused document, its cursor line and its current lines.
    fn focus(&self) -> Option<Focus<'_>>;

    /// Scroll to and select a location.
    fn reveal(&mut self, document: &DocumentId, line: usize);

    /// Replace the displayed cluster list.
    fn render(&mut self, items: &[ClusterItem]);
}

/// An owned focus, for hosts that keep their own copy of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    pub document: DocumentId,
    pub line: usize,
    pub lines: Vec<String>,
}

impl FocusState {
    pub fn new(document: impl Into<DocumentId>, line: usize, lines: Vec<String>) -> Self {
        Self {
            document: document.into(),
            line,
            lines,
        }
    }

    /// Split `text` into lines the way editors number them.
    pub fn from_text(document: impl Into<DocumentId>, line: usize, text: &str) -> Self {
        Self::new(document, line, text.split('\n').map(String::from).collect())
    }

    pub fn as_focus(&self) -> Focus<'_> {
        Focus::new(&self.document, self.line, &self.lines)
    }
}
