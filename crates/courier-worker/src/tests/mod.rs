//! Crate-level behaviour tests and shared doubles.

pub(crate) mod support;
