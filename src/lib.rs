//! Outliner task tree.
//!
//! Tasks form an ordered forest. [`TreeStore`] owns it together with the
//! current selection and exposes the reorder, nest/unnest and navigation
//! operations; the `ops` modules hold the algorithms as free functions over
//! the forest, and `io` is the boundary to disk (JSON snapshot, TOML
//! settings).

pub mod io;
pub mod model;
pub mod ops;
pub mod store;

pub use io::snapshot::{Snapshot, SnapshotError, load_snapshot, save_snapshot};
pub use model::{Hotkey, Node, Settings};
pub use ops::flatten::FlatEntry;
pub use ops::locate::Location;
pub use ops::tree_ops::InsertPosition;
pub use store::{SharedStore, TreeStore};
