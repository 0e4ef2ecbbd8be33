//! The concrete end-to-end scenarios: each builds a complete memory image
//! and checks the byte the simulator reports on halt.

use rstest::rstest;
use tomasulo_core::{Config, Simulator};

use crate::common::program::{add, addi, beq, jal, jalr, lw, sw, HALT};

fn run_words(words: &[u32]) -> u8 {
    let mut sim = Simulator::new(Config::with_cycle_budget(100_000));
    let image = crate::common::program::image_text(words);
    sim.load_image(image.as_bytes()).unwrap();
    sim.run().unwrap();
    (sim.register(10) & 0xff) as u8
}

/// Loop summing `counter` down to 1 into x10, shared by the plain-loop and
/// misprediction-stress scenarios.
fn sum_down_from(counter: i32) -> Vec<u32> {
    vec![
        addi(10, 0, 0),        // 0: sum = 0
        addi(1, 0, counter),   // 4: counter = N
        beq(1, 0, 16),         // 8: if counter == 0, goto 24
        add(10, 10, 1),        // 12: sum += counter
        addi(1, 1, -1),        // 16: counter -= 1
        jal(0, -12),           // 20: goto 8
        HALT,                  // 24
    ]
}

#[rstest]
#[case::addi_chain_then_halt(vec![addi(1, 0, 0), addi(10, 1, 0xff), HALT], 255)]
#[case::halt_does_not_clobber_x10(
    vec![addi(10, 0, 1), addi(11, 0, 2), add(10, 10, 11), addi(10, 10, 0), HALT],
    3,
)]
#[case::loop_sums_one_to_ten(sum_down_from(10), 55)]
#[case::store_then_load_round_trip(
    vec![addi(5, 0, 0x42), sw(0, 5, 0), lw(10, 0, 0), HALT],
    0x42,
)]
#[case::misprediction_stress_still_terminates_with_correct_sum(sum_down_from(5), 15)]
#[case::jalr_function_call_return(
    vec![jal(1, 8), HALT, addi(10, 0, 7), jalr(0, 1, 0)],
    7,
)]
fn concrete_scenario_halts_with_expected_byte(#[case] words: Vec<u32>, #[case] expected: u8) {
    assert_eq!(run_words(&words), expected);
}
