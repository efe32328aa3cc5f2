//! Access-control core for the mess gate
//!
//! This crate holds the domain logic that decides whether a member may be
//! served a meal: the signed QR credential codec, the access decision
//! engine, the cutoff/meal-window calculator, and the staff bearer secret
//! primitives. Everything here is pure; persistence and HTTP live in the
//! scanner service.

pub mod credential;
pub mod cutoff;
pub mod decision;
pub mod error;
pub mod models;
pub mod qr;
pub mod token;

pub use error::{AccessError, AccessResult};
