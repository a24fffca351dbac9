//! Contract bindings for the OP Stack deposit entrypoint.
//!
//! Bindings are generated using alloy's `sol!` macro.

pub mod opstack;
