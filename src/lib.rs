//! Claude Deck: configuration core for a terminal dashboard
//!
//! The data layer the dashboard screens are built on: a front-matter codec
//! for agent and skill documents, a TTL-cached store over the `~/.claude`
//! directory tree, a debounced filesystem watcher, and the usage-log reader
//! behind the analytics view. Screens, modals, and wizards live in the host
//! application and consume these contracts.

pub mod document;
pub mod error;
pub mod logging;
pub mod paths;
pub mod store;
pub mod usage;
pub mod watch;
