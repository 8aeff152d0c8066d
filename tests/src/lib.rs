//! Integration tests for the Collider k-fold collision estimator.

#[cfg(test)]
mod property_tests;

/// End-to-end tests through the public facade.
#[cfg(test)]
mod integration_tests {
    use collider::{
        run_trial, CollisionError, ConfigError, Entry, ScriptedDraws, Sweep, SweepConfig,
        TrialConfig, TrialPhase, TrialRunner, WorkerExit,
    };

    fn runner(difficulty: u32, collision_order: usize, workers: usize) -> TrialRunner {
        TrialRunner::new(TrialConfig::new(difficulty, collision_order).with_workers(workers))
            .unwrap()
    }

    #[test]
    fn test_trials_terminate_at_or_above_k() {
        for collision_order in 2..=5 {
            for difficulty in 1..=6 {
                let draws = run_trial(difficulty, collision_order).unwrap();
                assert!(
                    draws >= collision_order as u64,
                    "d={difficulty} k={collision_order} returned {draws}"
                );
            }
        }
    }

    #[test]
    fn test_smallest_space_is_immediate() {
        // Two values only: three draws always produce a pair.
        for _ in 0..20 {
            let report = runner(1, 2, 1).run().unwrap();
            assert!((2..=3).contains(&report.result));
            assert_eq!(report.result, report.draws_performed);
        }
    }

    #[test]
    fn test_exactly_one_solution_under_contention() {
        for _ in 0..50 {
            let report = runner(3, 2, 8).run().unwrap();
            let delivered = report
                .workers
                .iter()
                .filter(|worker| worker.exit == WorkerExit::Solved)
                .count();

            assert_eq!(report.coordination.solutions, 1);
            assert_eq!(report.coordination.phase, TrialPhase::Drained);
            assert_eq!(delivered, 1 + report.coordination.redundant);
            assert_eq!(report.record.terminal_entries(), 1);
            assert_eq!(report.record.terminal_draws(), 2);
            assert!(report
                .workers
                .iter()
                .all(|worker| matches!(worker.exit, WorkerExit::Solved | WorkerExit::Stopped)));
        }
    }

    #[test]
    fn test_scripted_scenarios() {
        let pair = ScriptedDraws::new([3, 7, 3]);
        let report = runner(4, 2, 1).run_with_sources(|_| pair.clone()).unwrap();
        assert_eq!(report.solution, Entry::from_u64(3));
        assert_eq!(report.record.terminal_draws(), 2);
        assert_eq!(report.result, 3);

        let triple = ScriptedDraws::new([5, 5, 9, 5]);
        let report = runner(4, 3, 1).run_with_sources(|_| triple.clone()).unwrap();
        assert_eq!(report.solution, Entry::from_u64(5));
        assert_eq!(report.record.terminal_draws(), 3);
        assert_eq!(report.result, 4);
    }

    #[test]
    fn test_wide_difficulty_uses_arbitrary_precision() {
        let config = TrialConfig::new(80, 2).with_workers(1);
        assert!(!config.ceiling().unwrap().is_native());

        let script = ScriptedDraws::new([u64::MAX, 1, u64::MAX]);
        let report = TrialRunner::new(config)
            .unwrap()
            .run_with_sources(|_| script.clone())
            .unwrap();
        assert_eq!(report.solution, Entry::from_u64(u64::MAX));
        assert_eq!(report.result, 3);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        assert_eq!(
            run_trial(0, 3).unwrap_err(),
            CollisionError::Config(ConfigError::DifficultyTooLow(0))
        );
        assert_eq!(
            run_trial(8, 0).unwrap_err(),
            CollisionError::Config(ConfigError::CollisionOrderTooLow(0))
        );
        assert_eq!(
            TrialRunner::new(TrialConfig::new(8, 2).with_workers(0)).unwrap_err(),
            CollisionError::Config(ConfigError::NoWorkers)
        );
    }

    #[test]
    fn test_starved_workers_report_no_solution() {
        let result = runner(8, 4, 3).run_with_sources(|worker| ScriptedDraws::new([worker as u64; 2]));
        assert_eq!(result.unwrap_err(), CollisionError::NoSolution);
    }

    #[test]
    fn test_mean_grows_with_collision_order() {
        let sweep = Sweep::new(
            SweepConfig::new(6, 4)
                .with_min_difficulty(6)
                .with_iterations(40)
                .with_workers(2),
        )
        .unwrap();
        let means: Vec<f64> = sweep
            .run()
            .unwrap()
            .into_iter()
            .map(|point| point.stats.mean)
            .collect();

        assert_eq!(means.len(), 3);
        assert!(means.windows(2).all(|pair| pair[0] < pair[1]), "{means:?}");
    }
}

/// Tests that mirror the crate documentation.
#[cfg(test)]
mod documentation_tests {
    use collider::{run_trial, Sweep, SweepConfig};

    #[test]
    fn test_quick_start_documentation_example() -> Result<(), Box<dyn std::error::Error>> {
        let draws = run_trial(12, 3)?;
        assert!(draws >= 3);

        let sweep = Sweep::new(SweepConfig::new(4, 3).with_iterations(5).with_workers(2))?;
        let points = sweep.run()?;
        assert_eq!(points.len(), 8);
        assert_eq!(points.first().map(|point| point.key), Some(102));
        assert_eq!(points.last().map(|point| point.key), Some(403));
        Ok(())
    }
}
