//! Shared types and utilities for the menumap workspace.
//!
//! This crate holds the menu data model that the extraction pipeline
//! deserializes LLM output into, plus the [`observability`] module that
//! centralises `tracing` setup for binaries and integration tests. It is
//! intentionally lightweight so every crate can depend on it without heavy
//! transitive costs.
//!
//! # Examples
//!
//! ```rust
//! use menumap_common::{MenuItem, MenuTree};
//!
//! let tree = MenuTree {
//!     menu: vec![MenuItem {
//!         text: "About".into(),
//!         href: "/about".into(),
//!         children: None,
//!     }],
//! };
//! assert_eq!(tree.max_depth(), 1);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// One entry of a site's global navigation bar (GNB).
///
/// Nesting is expressed through `children`; a leaf entry carries no
/// `children` field at all rather than an empty list, matching the shape
/// the response schema enforces on the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Visible label of the menu entry.
    pub text: String,
    /// Link target of the menu entry.
    pub href: String,
    /// Sub-entries at the next depth, when any exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuItem>>,
}

impl MenuItem {
    /// Depth of the subtree rooted at this entry (a leaf counts as 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(MenuItem::depth)
            .max()
            .unwrap_or(0)
    }
}

/// The full extracted menu, as returned by the LLM under the top-level
/// `menu` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTree {
    pub menu: Vec<MenuItem>,
}

impl MenuTree {
    /// Deepest nesting level present anywhere in the tree.
    pub fn max_depth(&self) -> usize {
        self.menu.iter().map(MenuItem::depth).max().unwrap_or(0)
    }

    /// Total number of entries across all levels.
    pub fn entry_count(&self) -> usize {
        fn count(items: &[MenuItem]) -> usize {
            items
                .iter()
                .map(|i| 1 + count(i.children.as_deref().unwrap_or_default()))
                .sum()
        }
        count(&self.menu)
    }
}
