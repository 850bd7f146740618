//! Snowflake-style 64-bit ids with a bit layout chosen at runtime.
//!
//! An id packs, from most to least significant bit:
//!
//! ```text
//! | 0 (sign) | timestamp | worker id | sequence |
//! ```
//!
//! The timestamp counts milliseconds since a configurable epoch, the worker
//! id tells concurrently running generators apart, and the sequence orders
//! ids issued within the same millisecond. The three widths are free as long
//! as they sum to at most 63 bits, so ids are always non-negative `i64`s.
//!
//! - [`Configuration`]: layout, worker id, epoch, and validation
//! - [`Generator`]: thread-safe, monotonic id production
//! - [`Decoder`]: stateless field extraction
//! - [`IdServices`]: one shared generator/decoder pair for an application
//!
//! Uniqueness across processes depends entirely on giving every concurrently
//! running generator its own worker id. Nothing here allocates or checks
//! worker ids across processes.
//!
//! # Example
//! ```
//! use snowgen::{Configuration, Decoder, Generator};
//!
//! let config = Configuration::default().with_worker_id(42);
//! let generator = Generator::new(&config).unwrap();
//! let decoder = Decoder::new(&config).unwrap();
//!
//! let id = generator.next_id().unwrap();
//! assert_eq!(decoder.worker_id(id), 42);
//! assert!(decoder.timestamp(id) >= config.epoch);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod decoder;
mod error;
mod generator;
mod layout;
mod services;
mod time;

pub use crate::config::*;
pub use crate::decoder::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::services::*;
pub use crate::time::*;
