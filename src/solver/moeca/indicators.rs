//! Quality indicators of a normalized Pareto front.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Reference point offset beyond the normalized worst value of 1.0
pub const REFERENCE_MARGIN: f64 = 0.1;

/// Fronts with more objectives than this use a sampled hypervolume
const EXACT_HYPERVOLUME_MAX_DIMENSIONS: usize = 3;

const HYPERVOLUME_SAMPLES: usize = 20_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PopulationIndicators {
    pub front_size: usize,
    /// Volume dominated by the front up to the reference point
    pub hypervolume: f64,
    /// Spread of nearest-neighbor distances; 0 is perfectly even
    pub spacing: f64,
    /// Best value per objective
    pub ideal: Vec<f64>,
    /// Worst value per objective among front members
    pub nadir: Vec<f64>,
}

impl PopulationIndicators {
    /// Indicators of objective vectors already normalized to `[0, 1]`.
    pub fn from_front(front: &[Vec<f64>]) -> Self {
        let Some(first) = front.first() else {
            return Self::default();
        };
        let dims = first.len();
        let mut ideal = vec![f64::INFINITY; dims];
        let mut nadir = vec![f64::NEG_INFINITY; dims];
        for point in front {
            for (d, value) in point.iter().enumerate().take(dims) {
                ideal[d] = ideal[d].min(*value);
                nadir[d] = nadir[d].max(*value);
            }
        }

        let reference = vec![1.0 + REFERENCE_MARGIN; dims];
        Self {
            front_size: front.len(),
            hypervolume: hypervolume(front, &reference),
            spacing: spacing(front),
            ideal,
            nadir,
        }
    }
}

/// Hypervolume of `points` (minimization) bounded by `reference`.
///
/// Exact by slicing for up to three objectives, a fixed-seed Monte Carlo
/// estimate above that.
pub fn hypervolume(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let inside: Vec<&[f64]> = points
        .iter()
        .map(|p| p.as_slice())
        .filter(|p| p.len() == reference.len() && p.iter().zip(reference).all(|(x, r)| x < r))
        .collect();
    if inside.is_empty() || reference.is_empty() {
        return 0.0;
    }
    if reference.len() <= EXACT_HYPERVOLUME_MAX_DIMENSIONS {
        exact_hypervolume(&inside, reference)
    } else {
        sampled_hypervolume(&inside, reference)
    }
}

fn exact_hypervolume(points: &[&[f64]], reference: &[f64]) -> f64 {
    let dims = reference.len();
    if dims == 1 {
        let best = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        return (reference[0] - best).max(0.0);
    }

    let last = dims - 1;
    let mut sorted: Vec<&[f64]> = points.to_vec();
    sorted.sort_by(|a, b| a[last].total_cmp(&b[last]));

    let mut volume = 0.0;
    for idx in 0..sorted.len() {
        let upper = sorted
            .get(idx + 1)
            .map_or(reference[last], |next| next[last]);
        let height = upper - sorted[idx][last];
        if height <= 0.0 {
            continue;
        }
        let projected: Vec<&[f64]> = sorted[..=idx].iter().map(|p| &p[..last]).collect();
        volume += height * exact_hypervolume(&projected, &reference[..last]);
    }
    volume
}

fn sampled_hypervolume(points: &[&[f64]], reference: &[f64]) -> f64 {
    let dims = reference.len();
    let lower: Vec<f64> = (0..dims)
        .map(|d| points.iter().map(|p| p[d]).fold(f64::INFINITY, f64::min))
        .collect();
    let box_volume: f64 = lower.iter().zip(reference).map(|(l, r)| r - l).product();
    if box_volume <= 0.0 {
        return 0.0;
    }

    let mut rng = StdRng::seed_from_u64(0);
    let mut sample = vec![0.0; dims];
    let mut hits = 0usize;
    for _ in 0..HYPERVOLUME_SAMPLES {
        for d in 0..dims {
            sample[d] = lower[d] + rng.random::<f64>() * (reference[d] - lower[d]);
        }
        if points
            .iter()
            .any(|p| p.iter().zip(&sample).all(|(x, s)| x <= s))
        {
            hits += 1;
        }
    }
    box_volume * hits as f64 / HYPERVOLUME_SAMPLES as f64
}

/// Schott's spacing over Manhattan nearest-neighbor distances.
pub fn spacing(points: &[Vec<f64>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let nearest: Vec<f64> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i)
                .map(|j| {
                    points[i]
                        .iter()
                        .zip(&points[j])
                        .map(|(a, b)| (a - b).abs())
                        .sum::<f64>()
                })
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    let mean = nearest.iter().sum::<f64>() / n as f64;
    let variance = nearest.iter().map(|d| (mean - d).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
