//! Core of figoro: list events from many calendar accounts at once.
//!
//! - `filter` describes what to list
//! - `concurrent` runs one fetch per (account, calendar) pair, first error wins
//! - `combined` merges the batches, orders and caps them
//! - `remote` talks to provider binaries that know how to reach a calendar API

pub mod account;
pub mod combined;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod remote;
pub mod source;

pub use account::{Account, Calendars};
pub use combined::CombinedAccount;
pub use error::{FigoroError, FigoroResult};
pub use event::{Event, EventStart, EventStatus};
pub use filter::{EventsFilter, OrderBy};
pub use source::Source;
