//! Throttle accuracy harness for vm-core.
//!
//! Runs a countdown program at several requested clock frequencies and
//! compares the achieved frequency with the request.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p vm-core --example throttle_harness
//! ```
//!
//! ## Metrics
//!
//! - Cycles executed
//! - Achieved cycles per second
//! - Ratio of achieved to requested frequency
//! - Overrun cycles

#![allow(clippy::pedantic)]

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use vm_core::{Opcode, RunOutcome, Vm, VmError};

const COUNTDOWN_FROM: i64 = 250;
const FREQUENCIES_HZ: &[Option<f64>] = &[Some(1_000.0), Some(10_000.0), Some(100_000.0), None];

/// `acc = COUNTDOWN_FROM; loop { acc += -1; if acc != 0 goto loop }; halt`
fn countdown_program() -> Vec<i64> {
    let mut program = vec![
        i64::from(Opcode::Ld),
        16,
        i64::from(Opcode::Add),
        17,
        i64::from(Opcode::Jif),
        2,
        i64::from(Opcode::Halt),
    ];
    program.resize(16, 0);
    program.extend([COUNTDOWN_FROM, -1]);
    program
}

fn run_at(frequency: Option<f64>) -> Result<RunOutcome, VmError> {
    let mut vm = Vm::new(64, [])?;
    vm.load_program(&countdown_program())?;
    vm.run(frequency)
}

fn main() -> Result<(), VmError> {
    println!("=== vm-core throttle harness ===\n");
    println!(
        "{:>12} {:>8} {:>14} {:>8} {:>9}",
        "requested", "cycles", "achieved", "ratio", "overruns"
    );

    for &frequency in FREQUENCIES_HZ {
        let outcome = run_at(frequency)?;
        let achieved = outcome.achieved_frequency();
        let (requested, ratio) = match frequency {
            Some(hz) => (format!("{hz:.0} Hz"), format!("{:.3}", achieved / hz)),
            None => ("unthrottled".to_string(), "-".to_string()),
        };
        println!(
            "{:>12} {:>8} {:>11.0} Hz {:>8} {:>9}",
            requested, outcome.cycles, achieved, ratio, outcome.overruns
        );
    }

    Ok(())
}
