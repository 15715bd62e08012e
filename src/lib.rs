#![warn(clippy::pedantic)]
#![allow(
    clippy::len_without_is_empty,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! Double-sided Voigtian line shapes and the small parameter workspace they are evaluated
//! against.

pub mod config;
pub mod error;
pub mod models;
pub mod numerics;
pub mod pdf;
pub mod scan;
pub mod workspace;

pub use error::{Error, Result};
