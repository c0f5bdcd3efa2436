//! End-to-end program execution through the VM.

use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use vm_core::{
    BusError, CycleStage, Interrupt, Opcode, RegisterValue, StageEvent, StopReason, Vm, VmError,
};

fn op(opcode: Opcode) -> i64 {
    i64::from(opcode)
}

fn vm_with(ram_size: usize, program: &[i64]) -> Vm {
    let mut vm = Vm::new(ram_size, []).expect("layout fits");
    vm.load_program(program).expect("program fits");
    vm
}

#[test]
fn load_then_store_copies_a_cell() {
    let mut vm = vm_with(
        16,
        &[op(Opcode::Ld), 6, op(Opcode::St), 7, op(Opcode::Halt), 0, 42, 0],
    );

    let outcome = vm.run(None).expect("program halts");

    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(outcome.cycles, 3);
    assert_eq!(vm.read(7), Ok(RegisterValue::new(42)));
    assert_eq!(vm.registers().acc(), RegisterValue::new(42));
}

#[test]
fn halt_only_program_returns_cleanly_past_the_opcode() {
    let mut vm = vm_with(8, &[op(Opcode::Halt)]);

    let outcome = vm.run(None).expect("halt is not an error");

    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(outcome.cycles, 1);
    assert_eq!(vm.registers().ia(), 1);
    assert_eq!(vm.latched_fault(), None);
}

#[test]
fn jump_sets_ia_to_the_literal_operand() {
    let mut vm = vm_with(
        16,
        &[op(Opcode::Jmp), 5, op(Opcode::Halt), 0, 0, op(Opcode::Ld), 0],
    );

    vm.cycle().expect("jump executes");

    assert_eq!(vm.registers().ia(), 5);
    assert_eq!(vm.registers().arg0(), 5);
}

#[rstest]
#[case::zero_falls_through(0, 4)]
#[case::nonzero_jumps(3, 9)]
#[case::negative_jumps(-3, 9)]
fn conditional_jump_is_gated_on_accumulator(#[case] acc: i64, #[case] expected_ia: u16) {
    let mut vm = vm_with(16, &[op(Opcode::Ld), 15, op(Opcode::Jif), 9]);
    vm.write(15, RegisterValue::from_int(acc))
        .expect("data cell is mapped");

    vm.cycle().expect("load executes");
    vm.cycle().expect("jif executes");

    assert_eq!(vm.registers().ia(), expected_ia);
}

#[rstest]
#[case::division_truncates(Opcode::Div, 7, 2, 3)]
#[case::negative_division_truncates_toward_zero(Opcode::Div, -7, 2, -3)]
#[case::multiplication_wraps(Opcode::Mul, 300, 300, 24_464)]
#[case::addition_wraps(Opcode::Add, 32_767, 1, -32_768)]
#[case::greater_than(Opcode::Gt, 3, -3, 1)]
#[case::equality(Opcode::Eq, 3, -3, 0)]
fn arithmetic_program_leaves_result_in_memory(
    #[case] opcode: Opcode,
    #[case] lhs: i64,
    #[case] rhs: i64,
    #[case] expected: i16,
) {
    let mut vm = vm_with(
        16,
        &[
            op(Opcode::Ld),
            10,
            op(opcode),
            11,
            op(Opcode::St),
            12,
            op(Opcode::Halt),
            0,
            0,
            0,
            lhs,
            rhs,
        ],
    );

    vm.run(None).expect("program halts");

    assert_eq!(vm.read(12), Ok(RegisterValue::new(expected)));
}

#[test]
fn square_root_truncates() {
    let mut vm = vm_with(
        16,
        &[op(Opcode::Ld), 8, op(Opcode::Sqrt), op(Opcode::Halt), 0, 0, 0, 0, 10],
    );

    vm.run(None).expect("program halts");

    assert_eq!(vm.registers().acc(), RegisterValue::new(3));
}

#[test]
fn countdown_loop_runs_until_accumulator_is_zero() {
    // acc = 3; loop { acc += -1; if acc != 0 goto loop }; halt
    let mut vm = vm_with(
        32,
        &[
            op(Opcode::Ld),
            20,
            op(Opcode::Add),
            21,
            op(Opcode::Jif),
            2,
            op(Opcode::Halt),
        ],
    );
    vm.write(20, RegisterValue::new(3)).expect("mapped");
    vm.write(21, RegisterValue::new(-1)).expect("mapped");

    let outcome = vm.run(None).expect("loop terminates");

    assert_eq!(outcome.cycles, 1 + 3 * 2 + 1);
    assert!(vm.registers().acc().is_zero());
    assert_eq!(vm.registers().ia(), 7);
}

#[test]
fn unmapped_opcode_faults_instead_of_executing_noop() {
    let mut vm = vm_with(8, &[0x42]);

    assert_eq!(
        vm.cycle(),
        Err(Interrupt::InvalidInstruction {
            ia: 0,
            opcode: RegisterValue::new(0x42),
        })
    );
    assert_eq!(vm.registers().oc(), RegisterValue::new(0x42));
    assert_eq!(vm.stage(), CycleStage::AwaitingDecode);
}

#[test]
fn run_surfaces_faults_and_keeps_them_latched_until_reset() {
    let mut vm = vm_with(16, &[op(Opcode::Ld), 100]);
    let expected = VmError::Interrupt(Interrupt::Bus(BusError::Unmapped { addr: 100 }));

    assert_eq!(vm.run(None), Err(expected));
    assert_eq!(vm.run(None), Err(expected));
    assert!(vm.latched_fault().is_some());

    vm.reset();
    vm.load_program(&[op(Opcode::Halt)]).expect("program fits");

    assert_eq!(
        vm.run(None).map(|outcome| outcome.reason),
        Ok(StopReason::Halted)
    );
}

#[test]
fn reset_zeroes_registers_and_every_ram_cell() {
    let mut vm = vm_with(
        16,
        &[op(Opcode::Ld), 6, op(Opcode::St), 15, op(Opcode::Halt), 0, -9],
    );
    vm.run(None).expect("program halts");

    for _ in 0..2 {
        vm.reset();

        assert!(vm.registers().is_zeroed());
        assert_eq!(vm.stage(), CycleStage::AwaitingFetch);
        for addr in 0..16 {
            assert_eq!(vm.read(addr), Ok(RegisterValue::ZERO));
        }
    }
}

#[test]
fn stepping_exposes_each_stage_of_a_cycle() {
    let mut vm = vm_with(8, &[op(Opcode::St), 5]);

    let events: Vec<StageEvent> = (0..4).map(|_| vm.step().expect("stage runs")).collect();

    assert_eq!(
        events,
        vec![
            StageEvent::Fetched {
                ia: 0,
                opcode: RegisterValue::new(2),
            },
            StageEvent::Decoded {
                opcode: Opcode::St,
                operands: 1,
            },
            StageEvent::OperandFetched { arg0: 5 },
            StageEvent::Executed { opcode: Opcode::St },
        ]
    );
    assert_eq!(vm.stage(), CycleStage::AwaitingFetch);
    assert_eq!(vm.registers().ia(), 2);
}

proptest! {
    #[test]
    fn every_unassigned_opcode_value_faults(raw in any::<i16>()) {
        prop_assume!(Opcode::from_value(RegisterValue::new(raw)).is_none());
        let mut vm = vm_with(4, &[i64::from(raw)]);

        let result = vm.cycle();

        prop_assert_eq!(
            result,
            Err(Interrupt::InvalidInstruction {
                ia: 0,
                opcode: RegisterValue::new(raw),
            })
        );
    }

    #[test]
    fn loaded_cells_read_back_wrapped_to_register_width(cell in any::<i64>()) {
        let mut vm = vm_with(1, &[cell]);
        #[allow(clippy::cast_possible_truncation)]
        let expected = cell as i16;

        prop_assert_eq!(vm.read(0), Ok(RegisterValue::new(expected)));
    }
}
