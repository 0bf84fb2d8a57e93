//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{
    BALANCE_TOLERANCE, MONEY_DECIMAL_PLACES, ROUNDING_UNIT, has_money_precision, round_money,
    round_half_up,
};
