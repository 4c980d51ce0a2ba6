//! # Domain Layer
//!
//! Pure domain logic for the Document Registry.
//!
//! This module contains NO I/O dependencies. Time and event publication
//! are handled by the service through the ports in `crate::ports`.

pub mod entities;
pub mod errors;
pub mod registry;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use registry::*;
pub use value_objects::*;
