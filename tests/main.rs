//! Integration tests for `src/main.rs`.

#[path = "main/cli_test.rs"]
mod cli_test;
