//! Configuration
//!
//! - `SwitchboardConfig` - default policy, public suffixes, initial view
//! - `ViewSettings` - collapse state and blacklist visibility

mod settings;
mod view;

pub use settings::{SwitchboardConfig, CONFIG_ENV_VAR};
pub use view::ViewSettings;
