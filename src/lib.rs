//! # ddns6
//!
//! A dynamic DNS updater that watches a network interface for a global
//! public IPv6 address and keeps a provider-side AAAA record pointed at it.
//!
//! ## Features
//!
//! - Interface-based address detection (first qualifying global IPv6 wins)
//! - Change-driven updates plus a periodic forced refresh
//! - Hetzner DNS backend behind a small provider trait
//! - Single record, single interface, no persisted state
//!
//! ## Usage
//!
//! ```bash
//! # Keep home.example.com pointed at eth0's global IPv6 address
//! ddns6 -i eth0 -r home -z example.com -s /etc/node-ddns-controller/key
//!
//! # Check every 10 seconds, force-refresh every 10 minutes
//! ddns6 -i eth0 -r home -z example.com -c 10 -u 600
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod providers;
pub mod resolver;

pub use config::Config;
pub use controller::{Controller, Rule};
pub use error::{DdnsError, Result};
pub use providers::{DnsSession, HetznerProvider};
pub use resolver::{AddressResolver, IfaceResolver};
