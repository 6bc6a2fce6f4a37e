//! Test suites for the component bootstrapper.

pub(crate) mod support;
