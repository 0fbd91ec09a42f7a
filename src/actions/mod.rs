//! User actions on matrix cells
//!
//! - `next_action` - the allow/block/clear cycle
//! - `apply_action` - run one click against the temporary layer
//! - `persist` / `unpersist` - move a cell's rule in or out of the saved layer
//! - `ActionPreview` - human-readable description of the next click

mod cycle;

pub use cycle::{apply_action, next_action, persist, unpersist, ActionPreview, Leaning, NextAction};
