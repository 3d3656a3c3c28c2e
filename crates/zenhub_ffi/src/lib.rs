//! Flutter bridge for the ZenHub core.

pub mod api;
