//! Property tests over the public trial and ladder API.

use collider::{
    summarize, Ceiling, Entry, Ladder, ScriptedDraws, TrialConfig, TrialRunner,
    MAX_NATIVE_DIFFICULTY,
};
use proptest::prelude::*;
use quickcheck::{quickcheck, TestResult};

fn single_worker(difficulty: u32, collision_order: usize) -> TrialRunner {
    TrialRunner::new(TrialConfig::new(difficulty, collision_order).with_workers(1)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Random trials always terminate with at least `k` draws.
    #[test]
    fn prop_random_trial_at_least_k(
        difficulty in 1u32..9,
        collision_order in 2usize..5,
        workers in 1usize..5,
    ) {
        let report = TrialRunner::new(
            TrialConfig::new(difficulty, collision_order).with_workers(workers),
        )
        .unwrap()
        .run()
        .unwrap();

        prop_assert!(report.result >= collision_order as u64);
        prop_assert_eq!(report.coordination.solutions, 1);
        prop_assert_eq!(report.workers.len(), workers);
    }

    /// Reading the drained ladder twice gives the same answer.
    #[test]
    fn prop_summarize_is_idempotent(
        collision_order in 2usize..6,
        draws in proptest::collection::vec(0u64..32, 0..300),
    ) {
        let ladder = Ladder::new(collision_order);
        for value in draws {
            ladder.record_draw(&Entry::from_u64(value)).unwrap();
        }
        prop_assert_eq!(summarize(&ladder), summarize(&ladder));
    }
}

quickcheck! {
    fn qc_scripted_trial_counts_every_draw(prefix: Vec<u8>, order: u8) -> TestResult {
        let collision_order = usize::from(order % 4) + 2;
        if prefix.len() > 200 {
            return TestResult::discard();
        }
        let script: Vec<u64> = prefix
            .iter()
            .map(|&value| u64::from(value))
            .chain(std::iter::repeat(0).take(collision_order))
            .collect();
        let source = ScriptedDraws::new(script);
        let report = single_worker(8, collision_order)
            .run_with_sources(|_| source.clone())
            .unwrap();

        TestResult::from_bool(
            report.result == report.draws_performed
                && report.record.terminal_entries() == 1
                && report.record.terminal_draws() == collision_order as u64,
        )
    }

    fn qc_entry_key_is_decimal(value: u64) -> bool {
        Entry::from_u64(value).as_str() == value.to_string()
    }

    fn qc_native_ceiling_admits_only_below_bound(difficulty: u8, value: u64) -> TestResult {
        let difficulty = u32::from(difficulty) % MAX_NATIVE_DIFFICULTY + 1;
        let ceiling = Ceiling::from_difficulty(difficulty).unwrap();
        TestResult::from_bool(ceiling.admits(value) == (value < 1u64 << difficulty))
    }
}
