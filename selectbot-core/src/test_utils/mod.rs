//! Shared fixtures for unit and integration tests: in-memory stores, a
//! scriptable chat client, and sample campaign builders.

pub mod helpers;
