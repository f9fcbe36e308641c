//! Reading certificates from PEM text

pub mod cert_chain;
pub mod cert_materializer;
pub mod pem_decoder;

pub use crate::{source::cert_chain::*, source::cert_materializer::*, source::pem_decoder::*};
