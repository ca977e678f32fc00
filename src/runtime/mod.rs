//! Application execution modes

pub mod modes;
