//! Canonical text encodings of certificate data

pub mod ev_literal;

pub use crate::encoder::ev_literal::*;
