//! Format implementations
//!
//! This module contains all format implementations that convert between
//! the question bank tree and its text representations.

pub mod aiken;
pub mod cloze;
pub mod common;
pub mod gift;
pub mod icons;
pub mod json;
pub mod tag;
pub mod treeviz;

pub use aiken::AikenFormat;
pub use cloze::ClozeFormat;
pub use gift::GiftFormat;
pub use json::JsonFormat;
pub use tag::TagFormat;
pub use treeviz::TreevizFormat;
