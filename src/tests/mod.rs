//! Binary-level tests: engine scenarios run end to end and the terminal
//! reports built from them.

mod engine_tests;
