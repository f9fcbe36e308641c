//! Certification path building and validation for EV chains

pub mod cert_path;
pub mod chain_validator;
pub mod path_builder;
pub mod path_settings;
pub mod path_validator;
pub mod pdv_certificate;
pub mod pdv_extension;

pub use crate::{
    validator::cert_path::*, validator::chain_validator::*, validator::path_builder::*,
    validator::path_settings::*, validator::path_validator::*, validator::pdv_certificate::*,
    validator::pdv_extension::*,
};
