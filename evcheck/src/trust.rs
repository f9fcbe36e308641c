//! Trust policy used when validating an EV chain

pub mod ev_trust_domain;

pub use crate::trust::ev_trust_domain::*;
