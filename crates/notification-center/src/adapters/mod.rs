//! # Adapters Layer (Hexagonal Architecture)
//!
//! Default implementations of the outbound ports that do not need I/O.

mod presentation;

pub use presentation::DefaultPresentation;
