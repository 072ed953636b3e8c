//! scrollsearch
//!
//! Debounced search over an infinite-scroll result list.
//!
//! The library follows a Pure Core / Impure Shell architecture: `state`
//! holds the controller that decides when to search, which page to ask for
//! and what to do with the answer, driven only by values passed in.
//! `source`, `view` and `shell` do the I/O around it.

pub mod config;
pub mod logging;
pub mod model;
pub mod shell;
pub mod source;
pub mod state;
pub mod view;

// Re-export main loop integration
pub mod integration;

#[cfg(test)]
mod test_harness;
