//! Request aggregation
//!
//! - `EntryStat` - one (hostname, type) counter with its resolved state
//! - `HostnameAggregate` - every type counter for one hostname, plus `*`
//! - `TrafficMatrix` - all hostnames of a page, plus the `*` totals row

mod stats;
mod traffic;

pub use stats::{EntryStat, HostnameAggregate};
pub use traffic::{Request, TrafficMatrix, ALL_HOSTNAMES};
