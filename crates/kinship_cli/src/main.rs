//! CLI smoke probe.
//!
//! Verifies `kinship_core` linkage and that a fresh database migrates.

use kinship_core::db::migrations::latest_version;
use kinship_core::db::open_db_in_memory;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("kinship_core ping={}", kinship_core::ping());
    println!("kinship_core version={}", kinship_core::core_version());

    match open_db_in_memory() {
        Ok(_) => {
            println!("kinship_core schema_version={}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("kinship_core schema bootstrap failed: {err}");
            ExitCode::FAILURE
        }
    }
}
