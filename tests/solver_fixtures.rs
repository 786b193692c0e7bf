//! Both solvers on the hand-worked 3x3 centre fixture

use mountain_rescue::{
    Action, Mountain, QLearningSolver, Solver, StateId, ValueIterationSolver,
    config::{QLearningConfig, TerrainConfig, ValueIterationConfig},
    mdp::MdpDataset,
};

mod common;

use common::{CENTRE_UTILITIES_HALF_DISCOUNT, approx_eq, centre_dataset, state};

/// States next to the centre and the move that enters it
const ADJACENT_TO_CENTRE: [(usize, Action); 4] = [
    (2, Action::Down),
    (4, Action::Right),
    (6, Action::Left),
    (8, Action::Up),
];

#[test]
fn value_iteration_reaches_hand_computed_fixed_point() {
    let config = ValueIterationConfig::default().with_discount(0.5);
    let mut solver = ValueIterationSolver::new(&centre_dataset(), config).unwrap();
    let report = solver.solve().unwrap();

    assert!(report.converged);
    for (index, expected) in CENTRE_UTILITIES_HALF_DISCOUNT.iter().enumerate() {
        let utility = solver.utility(StateId::from_index(index)).unwrap();
        assert!(
            approx_eq(utility, *expected, 0.01),
            "state {}: {utility} vs {expected}",
            index + 1
        );
    }
    assert_eq!(solver.policy().unwrap(), common::toward_centre_policy());
}

#[test]
fn value_iteration_max_delta_strictly_decreases() {
    let config = ValueIterationConfig::default().with_discount(0.5);
    let mut solver = ValueIterationSolver::new(&centre_dataset(), config).unwrap();
    let report = solver.solve().unwrap();

    let deltas: Vec<f64> = report.epochs.iter().map(|epoch| epoch.max_delta).collect();
    assert_eq!(&deltas[..2], &[59.0, 24.0]);
    assert!(deltas.windows(2).all(|pair| pair[1] < pair[0]), "{deltas:?}");
    assert!(report.final_delta().unwrap() < 0.005);
}

#[test]
fn value_iteration_high_discount_points_at_centre() {
    let config = ValueIterationConfig::default().with_discount(0.95);
    let mut solver = ValueIterationSolver::new(&centre_dataset(), config).unwrap();
    solver.solve().unwrap();
    let policy = solver.policy().unwrap();

    for (id, action) in ADJACENT_TO_CENTRE {
        assert_eq!(policy.action(state(id)), Some(action), "state {id}");
    }
}

#[test]
fn q_learning_high_discount_points_at_centre() {
    for seed in [1, 2, 3] {
        let config = QLearningConfig::default()
            .with_discount(0.95)
            .with_max_epochs(500)
            .with_stability_epsilon(0.0)
            .with_seed(seed);
        let mut solver = QLearningSolver::new(&centre_dataset(), config).unwrap();
        let report = solver.solve().unwrap();
        assert_eq!(report.epochs_run, 500);

        let policy = solver.policy().unwrap();
        for (id, action) in ADJACENT_TO_CENTRE {
            assert_eq!(policy.action(state(id)), Some(action), "seed {seed}, state {id}");
        }
    }
}

#[test]
fn q_learning_default_config_matches_value_iteration_policy() {
    let config = QLearningConfig::default().with_seed(1);
    let mut q_solver = QLearningSolver::new(&centre_dataset(), config).unwrap();
    q_solver.solve().unwrap();

    let mut vi_solver =
        ValueIterationSolver::new(&centre_dataset(), ValueIterationConfig::default()).unwrap();
    vi_solver.solve().unwrap();

    assert_eq!(q_solver.policy().unwrap(), vi_solver.policy().unwrap());
}

#[test]
fn policies_are_total_and_legal_on_generated_terrain() {
    for (size, seed) in [(2, 5), (4, 6), (7, 7), (10, 8)] {
        let config = TerrainConfig::new(size).with_seed(seed);
        let mountain = Mountain::generate(&config).unwrap();
        let dataset =
            MdpDataset::build(&mountain.grid, mountain.stranded, config.found_bonus).unwrap();

        let mut solvers: Vec<Box<dyn Solver>> = vec![
            Box::new(
                QLearningSolver::new(&dataset, QLearningConfig::default().with_seed(seed))
                    .unwrap(),
            ),
            Box::new(ValueIterationSolver::new(&dataset, ValueIterationConfig::default()).unwrap()),
        ];

        for solver in &mut solvers {
            let report = solver.solve().unwrap();
            let policy = solver.policy().unwrap();
            assert_eq!(report.num_states, size * size);
            assert_eq!(policy.num_states(), size * size, "{}", solver.name());

            for (id, action) in policy.iter() {
                let legal = dataset
                    .records()
                    .iter()
                    .any(|record| record.s == id && record.a == action);
                assert!(legal, "{} picked {action} in state {id}", solver.name());
            }
        }
    }
}

#[test]
fn one_by_one_grid_cannot_be_solved() {
    let config = TerrainConfig::new(1).with_seed(0);
    let mountain = Mountain::generate(&config).unwrap();
    let dataset =
        MdpDataset::build(&mountain.grid, mountain.stranded, config.found_bonus).unwrap();
    assert!(dataset.is_empty());

    assert!(QLearningSolver::new(&dataset, QLearningConfig::default()).is_err());
    assert!(ValueIterationSolver::new(&dataset, ValueIterationConfig::default()).is_err());
}
