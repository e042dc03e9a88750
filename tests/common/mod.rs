//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use servicemap::graph::load_input;
use servicemap::{ClassSpec, EvaluationInput, Microservice, RelationshipSpec, Solution};
use std::path::PathBuf;

pub const SHOP_CLASSES: [&str; 6] = [
    "shop.Cart",
    "shop.CartView",
    "shop.Invoice",
    "shop.Order",
    "shop.OrderMailer",
    "shop.Payment",
];

pub fn shop_graph_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("shop_graph.json")
}

/// Six behavioral classes in three feature groups plus three data classes.
pub fn shop_input() -> EvaluationInput {
    load_input(&shop_graph_path()).expect("shop graph fixture loads")
}

/// A→B 3 and C→D 2, nothing else.
pub fn two_pairs() -> EvaluationInput {
    EvaluationInput::builder()
        .class(ClassSpec::other("A", 1))
        .class(ClassSpec::other("B", 1))
        .class(ClassSpec::other("C", 1))
        .class(ClassSpec::other("D", 1))
        .relationship(RelationshipSpec::dependence("A", "B", 3))
        .relationship(RelationshipSpec::dependence("C", "D", 2))
        .build()
        .expect("two-pair fixture builds")
}

/// `n` behavioral classes `c00..`, chained by `c[i]→c[i+1]` with frequency `i % 3 + 1`.
pub fn chain(n: usize) -> EvaluationInput {
    let name = |i: usize| format!("c{:02}", i);
    let mut builder = EvaluationInput::builder();
    for i in 0..n {
        builder.add_class(ClassSpec::other(name(i), 1));
    }
    for i in 1..n {
        builder.add_relationship(RelationshipSpec::dependence(
            name(i - 1),
            name(i),
            (i % 3 + 1) as u64,
        ));
    }
    builder.build().expect("chain fixture builds")
}

pub fn solution(groups: &[&[&str]]) -> Solution {
    Solution::new(
        groups
            .iter()
            .enumerate()
            .map(|(ordinal, classes)| {
                Microservice::new(ordinal, classes.iter().map(|c| c.to_string()).collect())
            })
            .collect(),
    )
}

/// Member lists of a solution, each sorted, in microservice order.
pub fn groups(solution: &Solution) -> Vec<Vec<String>> {
    solution
        .microservices
        .iter()
        .map(|m| {
            let mut classes = m.classes.clone();
            classes.sort();
            classes
        })
        .collect()
}
