//! Scenario tests that drive the library the way the binary does, against a
//! scripted engine.

mod cli_tests;
mod session_tests;
