//! Serac wire format codec
//!
//! This crate implements the binary wire format exchanged with Serac nodes:
//! big-endian fixed-width primitives, length-prefixed byte strings,
//! count-prefixed lists, a wire-type-id registry for polymorphic values, and
//! a versioned codec manager. Encoding must be byte-identical to the node
//! implementation; consensus depends on exact bytes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod manager;
pub mod registry;
pub mod wire;

pub use error::{CodecError, Result};
pub use manager::Manager;
pub use registry::{ReadFn, Registry, RegistryBuilder, Tagged};
pub use wire::{read_list, write_list, Reader, Wire, Writer};
