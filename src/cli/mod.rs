//! Terminal front-end
//!
//! - `PageSnapshot` - JSON input: page URL, observed requests, seed rules
//! - `Console` - colored cells and messages
//! - `MatrixRenderer` - the whole matrix, partition by partition

mod console;
mod renderer;
mod snapshot;

pub use console::Console;
pub use renderer::{column_label, MatrixRenderer};
pub use snapshot::PageSnapshot;
