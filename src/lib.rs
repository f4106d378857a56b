#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "logging")] {
        macro_rules! log_debug {
            ($($arg:tt)*) => {
                log::debug!($($arg)*)
            };
        }

        macro_rules! log_warn {
            ($($arg:tt)*) => {
                log::warn!($($arg)*)
            };
        }
    } else {
        macro_rules! log_debug {
            ($($arg:tt)*) => {};
        }

        macro_rules! log_warn {
            ($($arg:tt)*) => {};
        }
    }
}

/// Table configuration: arity, capacity bounds, and load-factor policy.
pub mod config;

mod error;

pub mod hash;

pub mod table;

pub use config::Arity;
pub use config::TableConfig;
pub use error::CuckooError;
pub use table::CuckooTable;
pub use table::TableStats;
