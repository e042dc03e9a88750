mod common;

use common::{groups, shop_input, solution, two_pairs};
use pretty_assertions::assert_eq;
use servicemap::config::MoecaConfig;
use servicemap::quality::DEFAULT_MEMORY_LIMIT;
use servicemap::solver::moeca::{
    constrained_ranks, dominates, Encoding, Evaluation, ARCHIVE_EVOLUTION, NSGA2,
};
use servicemap::{run_moeca, Error, MetricType, MoecaSolver, Solution};
use std::collections::BTreeSet;

fn config(seed: u64) -> MoecaConfig {
    MoecaConfig {
        metrics: vec![MetricType::Carvalho],
        min_cluster_amount: 2,
        max_cluster_amount: 4,
        population_size: 20,
        max_evaluations: 600,
        seed: Some(seed),
        algorithm: ARCHIVE_EVOLUTION.into(),
        ..MoecaConfig::default()
    }
}

fn sorted_groups(solution: &Solution) -> Vec<Vec<String>> {
    let mut g = groups(solution);
    g.sort();
    g
}

fn feature_partition() -> Solution {
    solution(&[
        &["shop.Cart", "shop.CartView"],
        &["shop.Order", "shop.OrderMailer"],
        &["shop.Invoice", "shop.Payment"],
    ])
}

#[test]
fn test_front_respects_cluster_bounds() {
    let input = shop_input();
    let outcome = run_moeca(&input, &config(3), Vec::new(), DEFAULT_MEMORY_LIMIT).unwrap();

    assert_eq!(outcome.evaluations, 600);
    assert!(!outcome.solutions.is_empty());
    let mut partitions = BTreeSet::new();
    for solution in &outcome.solutions {
        assert!((2..=4).contains(&solution.cluster_count()));
        assert_eq!(solution.class_count(), 6);
        assert!(partitions.insert(sorted_groups(solution)));
    }
    assert_eq!(outcome.indicators.front_size, outcome.solutions.len());
    assert!(outcome.indicators.hypervolume >= 0.0);
}

#[test]
fn test_seeded_feature_partition_stays_on_front() {
    let input = shop_input();
    let seed = feature_partition();
    let outcome = run_moeca(&input, &config(5), vec![seed.clone()], DEFAULT_MEMORY_LIMIT).unwrap();

    // three feature pairs have the lowest possible cohesion value
    let seeded = outcome
        .solutions
        .iter()
        .find(|s| sorted_groups(s) == sorted_groups(&seed))
        .expect("seed partition on the front");
    assert_eq!(seeded.metric_values[&MetricType::Carvalho], vec![-4.0, 2.0]);
    assert_eq!(seeded.normalized_values[&MetricType::Carvalho][0], 0.0);
}

#[test]
fn test_same_seed_same_front() {
    let input = shop_input();
    let a = run_moeca(&input, &config(9), Vec::new(), DEFAULT_MEMORY_LIMIT).unwrap();
    let b = run_moeca(&input, &config(9), Vec::new(), DEFAULT_MEMORY_LIMIT).unwrap();

    assert_eq!(a.solutions, b.solutions);
    assert_eq!(a.indicators, b.indicators);
}

#[test]
fn test_graph_adjacency_encoding_runs() {
    let input = shop_input();
    let config = MoecaConfig {
        encoding: Encoding::GraphAdjacency,
        ..config(4)
    };
    let outcome = MoecaSolver::new(&input, config).run().unwrap();
    for solution in &outcome.solutions {
        assert!((2..=4).contains(&solution.cluster_count()));
    }
}

#[test]
fn test_seeds_need_cluster_label_encoding() {
    let input = shop_input();
    let config = MoecaConfig {
        encoding: Encoding::GraphAdjacency,
        ..config(4)
    };
    let result = run_moeca(&input, &config, vec![feature_partition()], DEFAULT_MEMORY_LIMIT);
    assert!(matches!(result, Err(Error::Solver(_))));
}

#[test]
fn test_invalid_population_rejected() {
    let input = two_pairs();
    let config = MoecaConfig {
        population_size: 1,
        ..config(1)
    };
    assert!(matches!(
        MoecaSolver::new(&input, config).run(),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_all_metric_types_produce_objectives() {
    let input = shop_input();
    let config = MoecaConfig {
        metrics: MetricType::ALL.to_vec(),
        population_size: 10,
        max_evaluations: 100,
        ..config(2)
    };
    let outcome = MoecaSolver::new(&input, config).run().unwrap();
    for solution in &outcome.solutions {
        assert_eq!(solution.metric_values.len(), MetricType::ALL.len());
        for value in solution.normalized_values.values().flatten() {
            assert!((0.0..=1.0).contains(value));
        }
    }
}

#[test]
fn test_default_optimizer_is_nsga2() {
    assert_eq!(MoecaConfig::default().algorithm, NSGA2);

    let input = shop_input();
    let config = MoecaConfig {
        algorithm: MoecaConfig::default().algorithm,
        ..config(6)
    };
    let outcome = run_moeca(&input, &config, vec![feature_partition()], DEFAULT_MEMORY_LIMIT)
        .unwrap();

    assert!(outcome.evaluations > 0);
    let mut partitions = BTreeSet::new();
    for solution in &outcome.solutions {
        assert!((2..=4).contains(&solution.cluster_count()));
        assert!(partitions.insert(sorted_groups(solution)));
    }
    let seeded = outcome
        .solutions
        .iter()
        .find(|s| sorted_groups(s) == sorted_groups(&feature_partition()))
        .expect("seed partition on the nsga2 front");
    assert_eq!(seeded.metric_values[&MetricType::Carvalho], vec![-4.0, 2.0]);
}

#[test]
fn test_feasibility_orders_mixed_population() {
    let evaluations = [
        Evaluation::infeasible(2.0),
        Evaluation::feasible(vec![-1.0, 9.0]),
        Evaluation::infeasible(0.5),
        Evaluation::feasible(vec![-4.0, 2.0]),
    ];

    assert!(dominates(&evaluations[1], &evaluations[2]));
    assert!(dominates(&evaluations[2], &evaluations[0]));
    assert!(!dominates(&evaluations[0], &evaluations[1]));

    let refs: Vec<&Evaluation> = evaluations.iter().collect();
    assert_eq!(constrained_ranks(&refs), vec![3, 1, 2, 0]);
}
