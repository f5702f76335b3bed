//! Table layout of the crash data exports

pub mod columns;
