//! Display partitioning of matrix hostnames
//!
//! Every hostname with traffic lands in exactly one `Partition`:
//! first-party, whitelisted, graylisted or blacklisted. Within a partition,
//! hostnames are grouped by registrable domain into `DomainSection`s.

mod engine;
mod groups;

pub use engine::GroupingEngine;
pub use groups::{BlacklistSummary, DomainSection, Group, Groups, Partition};
