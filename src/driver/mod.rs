//! Runs the whole front-end over a set of sources.
//!
//! [`driver::Front`] lexes and parses every source it is given, splits them
//! into modules, orders the modules by their imports and type-checks each one
//! against the analyses of the modules it imports.

pub mod driver;

#[cfg(test)]
mod tests;
