//! Domain model of the Folio contact inbox.
//!
//! Holds the contact record, submission validation, email normalisation,
//! pagination and the [`store::ContactStore`] trait. No HTTP or SQL here.

pub mod contact;
pub mod email;
pub mod error;
pub mod pagination;
pub mod store;
pub mod validation;

pub use error::{Error, Result};
