//! Bagged decision-tree ensemble over binary features
//!
//! Each tree is grown on a bootstrap sample with Gini splits over a random
//! feature subset per node. Prediction is a majority vote: the probability of
//! a class is the share of trees voting for it.

use super::ProbabilisticClassifier;
use crate::config::TrainingConfig;
use crate::error::ScreenerError;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const MAX_DEPTH: usize = 32;
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
enum Node {
    Leaf { class: usize },
    Split { feature: usize, absent: usize, present: usize },
}

/// Single tree stored as a node arena; the root is node 0 and children
/// always come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Grower<'a> {
    rows: &'a [Vec<u8>],
    labels: &'a [usize],
    n_classes: usize,
    max_features: usize,
}

impl DecisionTree {
    fn grow(grower: &Grower<'_>, samples: Vec<usize>, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(grower, samples, 0, rng);
        tree
    }

    fn build(
        &mut self,
        grower: &Grower<'_>,
        samples: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let counts = class_counts(&samples, grower.labels, grower.n_classes);
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            class: majority(&counts),
        });

        let distinct = counts.iter().filter(|&&c| c > 0).count();
        if depth >= MAX_DEPTH || samples.len() < 2 || distinct <= 1 {
            return node_idx;
        }

        let Some(feature) = best_split(grower, &samples, &counts, rng) else {
            return node_idx;
        };

        let (present, absent): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| grower.rows[i][feature] != 0);

        let absent_idx = self.build(grower, absent, depth + 1, rng);
        let present_idx = self.build(grower, present, depth + 1, rng);
        self.nodes[node_idx] = Node::Split {
            feature,
            absent: absent_idx,
            present: present_idx,
        };

        node_idx
    }

    pub fn predict(&self, features: &[u8]) -> usize {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    absent,
                    present,
                } => {
                    idx = if features.get(*feature).copied().unwrap_or(0) != 0 {
                        *present
                    } else {
                        *absent
                    };
                }
            }
        }
    }

    /// Structural check used after deserialization
    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { class } if *class >= n_classes => {
                    return Err(format!("leaf {} references class {}", idx, class));
                }
                Node::Split {
                    feature,
                    absent,
                    present,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {}", idx, feature));
                    }
                    for child in [absent, present] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Majority-vote ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit the ensemble. `labels` are class indices below `n_classes`.
    pub fn fit(
        rows: &[Vec<u8>],
        labels: &[usize],
        n_classes: usize,
        config: &TrainingConfig,
    ) -> Result<Self> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(ScreenerError::DataUnavailable(format!(
                "cannot fit on {} rows with {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if config.n_trees == 0 {
            return Err(ScreenerError::ConfigError(
                "ensemble needs at least one tree".to_string(),
            ));
        }

        let n_features = rows[0].len();
        if rows.iter().any(|r| r.len() != n_features) {
            return Err(ScreenerError::DataUnavailable(
                "rows have differing feature counts".to_string(),
            ));
        }
        if let Some(bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(ScreenerError::DataUnavailable(format!(
                "label index {} out of range for {} classes",
                bad, n_classes
            )));
        }

        let grower = Grower {
            rows,
            labels,
            n_classes,
            max_features: ((n_features as f64).sqrt().round() as usize).max(1),
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let n_samples = rows.len();
        let trees = (0..config.n_trees)
            .map(|_| {
                let bootstrap: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                DecisionTree::grow(&grower, bootstrap, &mut rng)
            })
            .collect();

        Ok(Self {
            n_features,
            n_classes,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Vote share per class
    pub fn predict_proba(&self, features: &[u8]) -> Vec<f64> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(features)] += 1;
        }
        let total = self.trees.len().max(1) as f64;
        votes.into_iter().map(|v| v as f64 / total).collect()
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if self.n_classes == 0 {
            return Err("forest has no classes".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|e| format!("tree {}: {}", idx, e))?;
        }
        Ok(())
    }
}

/// A fitted forest together with its label names
pub struct ForestClassifier {
    labels: Vec<String>,
    forest: RandomForest,
}

impl ForestClassifier {
    pub fn new(labels: Vec<String>, forest: RandomForest) -> Result<Self> {
        if labels.len() != forest.n_classes() {
            return Err(ScreenerError::ModelCorrupt(format!(
                "{} labels for a forest with {} classes",
                labels.len(),
                forest.n_classes()
            )));
        }
        Ok(Self { labels, forest })
    }
}

impl ProbabilisticClassifier for ForestClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn n_features(&self) -> usize {
        self.forest.n_features()
    }

    fn predict_proba(&self, features: &[u8]) -> Vec<f64> {
        self.forest.predict_proba(features)
    }
}

fn class_counts(samples: &[usize], labels: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in samples {
        counts[labels[i]] += 1;
    }
    counts
}

/// Most frequent class; ties go to the lowest index
fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Pick the feature with the best Gini gain among a random subset. When the
/// subset offers no gain, the remaining features are tried before giving up.
fn best_split(
    grower: &Grower<'_>,
    samples: &[usize],
    counts: &[usize],
    rng: &mut StdRng,
) -> Option<usize> {
    let n_features = grower.rows[samples[0]].len();
    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);

    let parent = gini(counts, samples.len());
    let total = samples.len() as f64;
    let mut best: Option<(usize, f64)> = None;

    for (visited, &feature) in features.iter().enumerate() {
        if visited >= grower.max_features && best.is_some() {
            break;
        }

        let mut present = vec![0usize; grower.n_classes];
        let mut n_present = 0;
        for &i in samples {
            if grower.rows[i][feature] != 0 {
                present[grower.labels[i]] += 1;
                n_present += 1;
            }
        }
        let n_absent = samples.len() - n_present;
        if n_present == 0 || n_absent == 0 {
            continue;
        }

        let absent: Vec<usize> = counts.iter().zip(&present).map(|(c, p)| c - p).collect();
        let weighted = (n_present as f64 / total) * gini(&present, n_present)
            + (n_absent as f64 / total) * gini(&absent, n_absent);
        let gain = parent - weighted;

        if gain > MIN_GAIN && best.map_or(true, |(_, g)| gain > g) {
            best = Some((feature, gain));
        }
    }

    best.map(|(feature, _)| feature)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three well-separated classes over six features, five copies each
    fn separable() -> (Vec<Vec<u8>>, Vec<usize>) {
        let prototypes = [
            (vec![1, 1, 0, 0, 0, 0], 0),
            (vec![0, 0, 1, 1, 0, 0], 1),
            (vec![0, 0, 0, 0, 1, 1], 2),
        ];
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (row, label) in prototypes.iter() {
            for _ in 0..5 {
                rows.push(row.clone());
                labels.push(*label);
            }
        }
        (rows, labels)
    }

    fn config(n_trees: usize) -> TrainingConfig {
        TrainingConfig { n_trees, seed: 42 }
    }

    #[test]
    fn test_fits_separable_data() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, 3, &config(25)).unwrap();

        assert_eq!(forest.n_trees(), 25);
        for (row, label) in rows.iter().zip(&labels) {
            let proba = forest.predict_proba(row);
            let winner = majority(
                &proba
                    .iter()
                    .map(|p| (p * 1000.0) as usize)
                    .collect::<Vec<_>>(),
            );
            assert_eq!(winner, *label);
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, 3, &config(10)).unwrap();

        let proba = forest.predict_proba(&[1, 0, 1, 0, 1, 0]);
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let (rows, labels) = separable();
        let a = RandomForest::fit(&rows, &labels, 3, &config(8)).unwrap();
        let b = RandomForest::fit(&rows, &labels, 3, &config(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialized_forest_validates() {
        let (rows, labels) = separable();
        let forest = RandomForest::fit(&rows, &labels, 3, &config(4)).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        assert!(restored.validate().is_ok());
        assert_eq!(restored, forest);
    }

    #[test]
    fn test_validate_rejects_dangling_child() {
        let forest = RandomForest {
            n_features: 2,
            n_classes: 2,
            trees: vec![DecisionTree {
                nodes: vec![Node::Split {
                    feature: 0,
                    absent: 1,
                    present: 7,
                }],
            }],
        };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(RandomForest::fit(&[], &[], 2, &config(3)).is_err());
        assert!(RandomForest::fit(&[vec![1, 0]], &[5], 2, &config(3)).is_err());
    }

    #[test]
    fn test_single_class_yields_leaf_only_trees() {
        let rows = vec![vec![1, 0], vec![0, 1]];
        let forest = RandomForest::fit(&rows, &[0, 0], 1, &config(3)).unwrap();
        assert_eq!(forest.predict_proba(&[1, 1]), vec![1.0]);
    }
}
