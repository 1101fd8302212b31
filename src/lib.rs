//! Music Ledger - a shared music-rating ledger kept in a worksheet.
//!
//! Three fixed users rate tracks on a 0-10 scale. The whole catalog lives in
//! one worksheet that is read and written as a complete table; each user
//! works through their own [`session::Session`].

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod library;
pub mod model;
pub mod session;
pub mod sheet;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
