//! Data Transfer Objects for REST request/response serialization.
//!
//! All amounts are carried as JSON decimal strings so fixed-point values
//! never pass through floating point.

pub mod common_dto;
pub mod launch_dto;
pub mod trade_dto;

pub use common_dto::*;
pub use launch_dto::*;
pub use trade_dto::*;
