//! pick - searchable combobox selection controller
//!
//! Library crate exposing the controller used by the binary: expression
//! parsing, the item registry, the selection state machine, model binding and
//! key routing, plus the terminal front end.
//!
//! Tests live close to the modules they exercise as unit tests.

pub mod binding;
pub mod config;
pub mod error;
pub mod expr;
pub mod keys;
pub mod logging;
pub mod registry;
pub mod schedule;
pub mod select;

pub mod ui;

pub use config::Config;
pub use error::{Error, Result};
pub use expr::RepeatExpr;
pub use select::{Effect, Select};
