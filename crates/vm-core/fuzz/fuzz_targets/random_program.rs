#![no_main]

use libfuzzer_sys::fuzz_target;
use vm_core::{Interrupt, StopReason, Vm, VmConfig, VmError};

const RAM_CELLS: usize = 256;
const CYCLE_LIMIT: u64 = 4_096;

fuzz_target!(|data: &[u8]| {
    let program: Vec<i64> = data
        .chunks_exact(2)
        .take(RAM_CELLS)
        .map(|pair| i64::from(i16::from_be_bytes([pair[0], pair[1]])))
        .collect();

    let config = VmConfig {
        ram_size: RAM_CELLS,
        cycle_limit: Some(CYCLE_LIMIT),
    };
    let Ok(mut vm) = Vm::with_config(config, []) else {
        return;
    };
    if vm.load_program(&program).is_err() {
        return;
    }

    match vm.run(None) {
        Ok(outcome) => {
            assert!(matches!(
                outcome.reason,
                StopReason::Halted | StopReason::CycleLimit
            ));
            assert!(outcome.cycles <= CYCLE_LIMIT);
        }
        Err(VmError::Interrupt(fault)) => {
            assert!(fault.is_fault());
            assert_eq!(vm.latched_fault(), Some(fault));
            assert_eq!(vm.cycle(), Err::<(), Interrupt>(fault));
        }
        Err(other) => panic!("unexpected run error: {other}"),
    }

    vm.reset();
    assert!(vm.registers().is_zeroed());
});
