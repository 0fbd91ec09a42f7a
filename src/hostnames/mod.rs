//! Hostname utilities
//!
//! - `HostnameHierarchy` - ancestor chains and registrable domains
//! - `uri` - scheme/hostname/domain extraction from URLs
//! - `hostname_compare` - display ordering

pub mod compare;
pub mod hierarchy;
pub mod uri;

pub use compare::{hostname_compare, sort_hostnames};
pub use hierarchy::{is_ip_literal, HostnameHierarchy, SuffixHierarchy};
