//! # caixa
//!
//! Entry point for the glass shop back office CLI. Setup lives in `lib.rs`
//! so it can be tested.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    vidracaria_caixa::run().await
}
