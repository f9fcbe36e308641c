//! Basic utility functionality supporting certification path validation

pub mod crypto;
pub mod error;
pub mod logging;
pub mod pdv_alg_oids;
pub mod pdv_utilities;

pub use crate::{
    util::crypto::*, util::error::*, util::logging::*, util::pdv_alg_oids::*,
    util::pdv_utilities::*,
};
