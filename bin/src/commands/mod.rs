//! CLI command implementations.

pub(crate) mod fetch;
pub(crate) mod starts;
pub(crate) mod trend;
