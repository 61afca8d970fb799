//! Random forest over 0/1 indicator features.
//!
//! Every split tests a single indicator column, so a tree node is either a
//! leaf holding a class index or a branch on "column set / not set". Trees
//! are grown to purity on bootstrap samples with a random subset of columns
//! considered at each node, and predict by majority vote.

use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    /// Columns considered per split; `None` uses the square root of the width
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_features: None,
            min_samples_split: 2,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ForestError {
    #[error("no training samples")]
    NoSamples,

    #[error("{samples} samples but {labels} labels")]
    LabelCountMismatch { samples: usize, labels: usize },

    #[error("sample {index} has {found} features, expected {expected}")]
    RaggedSample {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("label {label} out of range for {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },

    #[error("forest needs at least one tree")]
    NoTrees,

    #[error("expected {expected} features, got {found}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("feature {index} has non-indicator value {value}")]
    NonIndicator { index: usize, value: u8 },

    #[error("split on column {column} but the forest has {features} features")]
    ColumnOutOfRange { column: usize, features: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf {
        class: usize,
    },
    Split {
        column: usize,
        absent: Box<Node>,
        present: Box<Node>,
    },
}

impl Node {
    fn classify(&self, features: &[u8]) -> Result<usize, ForestError> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { class } => return Ok(*class),
                Node::Split {
                    column,
                    absent,
                    present,
                } => {
                    let value = features.get(*column).ok_or(ForestError::ColumnOutOfRange {
                        column: *column,
                        features: features.len(),
                    })?;
                    node = if *value != 0 { present } else { absent };
                }
            }
        }
    }

    /// Every split column below `n_features`, every leaf class below `n_classes`
    fn check(&self, n_features: usize, n_classes: usize) -> Result<(), ForestError> {
        match self {
            Node::Leaf { class } if *class >= n_classes => Err(ForestError::LabelOutOfRange {
                label: *class,
                classes: n_classes,
            }),
            Node::Leaf { .. } => Ok(()),
            Node::Split { column, .. } if *column >= n_features => {
                Err(ForestError::ColumnOutOfRange {
                    column: *column,
                    features: n_features,
                })
            }
            Node::Split {
                absent, present, ..
            } => {
                absent.check(n_features, n_classes)?;
                present.check(n_features, n_classes)
            }
        }
    }
}

/// A fitted forest; class labels are indices into the caller's label list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<Node>,
}

impl RandomForest {
    /// Fits a forest on indicator rows and class indices
    pub fn fit(
        samples: &[Vec<u8>],
        labels: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> Result<Self, ForestError> {
        if samples.is_empty() {
            return Err(ForestError::NoSamples);
        }
        if samples.len() != labels.len() {
            return Err(ForestError::LabelCountMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        if params.n_trees == 0 {
            return Err(ForestError::NoTrees);
        }

        let n_features = samples[0].len();
        for (index, sample) in samples.iter().enumerate() {
            if sample.len() != n_features {
                return Err(ForestError::RaggedSample {
                    index,
                    expected: n_features,
                    found: sample.len(),
                });
            }
        }
        if let Some(&label) = labels.iter().find(|label| **label >= n_classes) {
            return Err(ForestError::LabelOutOfRange {
                label,
                classes: n_classes,
            });
        }

        let max_features = params
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1));

        let mut builder = TreeBuilder {
            samples,
            labels,
            n_classes,
            n_features,
            max_features,
            min_samples_split: params.min_samples_split.max(2),
            rng: StdRng::seed_from_u64(params.seed),
        };

        let trees = (0..params.n_trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..samples.len())
                    .map(|_| builder.rng.random_range(0..samples.len()))
                    .collect();
                builder.grow(&bootstrap)
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

    /// Verifies the trees only reference columns and classes the forest declares
    ///
    /// Fitted forests always pass; this guards forests read back from disk.
    pub fn check(&self) -> Result<(), ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NoTrees);
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.check(self.n_features, self.n_classes))
    }

    /// Majority vote over all trees; ties go to the lowest class index
    pub fn predict(&self, features: &[u8]) -> Result<usize, ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NoTrees);
        }
        if features.len() != self.n_features {
            return Err(ForestError::WidthMismatch {
                expected: self.n_features,
                found: features.len(),
            });
        }
        if let Some((index, &value)) = features.iter().enumerate().find(|(_, v)| **v > 1) {
            return Err(ForestError::NonIndicator { index, value });
        }

        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let class = tree.classify(features)?;
            if let Some(count) = votes.get_mut(class) {
                *count += 1;
            }
        }

        Ok(argmax(&votes))
    }
}

struct TreeBuilder<'a> {
    samples: &'a [Vec<u8>],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
    max_features: usize,
    min_samples_split: usize,
    rng: StdRng,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, indices: &[usize]) -> Node {
        let counts = self.class_counts(indices);
        let majority = argmax(&counts);

        if indices.len() < self.min_samples_split || counts[majority] == indices.len() {
            return Node::Leaf { class: majority };
        }

        match self.best_split(indices) {
            Some(column) => {
                let (present, absent): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| self.samples[i][column] != 0);

                Node::Split {
                    column,
                    absent: Box::new(self.grow(&absent)),
                    present: Box::new(self.grow(&present)),
                }
            }
            None => Node::Leaf { class: majority },
        }
    }

    /// Lowest weighted Gini impurity among sampled columns
    ///
    /// Columns are visited in random order; at least `max_features` are
    /// examined, and the search keeps going past that only while no column
    /// has split the node yet.
    fn best_split(&mut self, indices: &[usize]) -> Option<usize> {
        let order = index::sample(&mut self.rng, self.n_features, self.n_features);
        let mut best: Option<(usize, f64)> = None;

        for (visited, column) in order.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            let mut present = vec![0usize; self.n_classes];
            let mut absent = vec![0usize; self.n_classes];
            for &i in indices {
                if self.samples[i][column] != 0 {
                    present[self.labels[i]] += 1;
                } else {
                    absent[self.labels[i]] += 1;
                }
            }

            let n_present: usize = present.iter().sum();
            let n_absent = indices.len() - n_present;
            if n_present == 0 || n_absent == 0 {
                continue;
            }

            let impurity = (n_present as f64 * gini(&present, n_present)
                + n_absent as f64 * gini(&absent, n_absent))
                / indices.len() as f64;

            if best.map_or(true, |(_, b)| impurity < b) {
                best = Some((column, impurity));
            }
        }

        best.map(|(column, _)| column)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Index of the largest count, first one on ties
fn argmax(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .fold((0, 0), |(best_i, best_c), (i, &c)| {
            if c > best_c {
                (i, c)
            } else {
                (best_i, best_c)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Class 2 whenever column 2 is set, otherwise the index of the set column
    fn dataset() -> (Vec<Vec<u8>>, Vec<usize>) {
        let patterns = [
            (vec![1, 0, 0], 0),
            (vec![0, 1, 0], 1),
            (vec![1, 0, 1], 2),
            (vec![0, 1, 1], 2),
        ];
        patterns
            .iter()
            .cycle()
            .take(12)
            .map(|(sample, label)| (sample.clone(), *label))
            .unzip()
    }

    #[test]
    fn test_fit_and_predict_training_rows() {
        let (samples, labels) = dataset();
        let params = ForestParams {
            n_trees: 25,
            ..ForestParams::default()
        };

        let forest = RandomForest::fit(&samples, &labels, 3, &params).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.predict(&[1, 0, 0]).unwrap(), 0);
        assert_eq!(forest.predict(&[0, 1, 0]).unwrap(), 1);
        assert_eq!(forest.predict(&[0, 1, 1]).unwrap(), 2);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (samples, labels) = dataset();
        let params = ForestParams::default();

        let a = RandomForest::fit(&samples, &labels, 3, &params).unwrap();
        let b = RandomForest::fit(&samples, &labels, 3, &params).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_is_a_leaf() {
        let samples = vec![vec![1, 0], vec![0, 1]];
        let labels = vec![0, 0];

        let forest = RandomForest::fit(&samples, &labels, 1, &ForestParams::default()).unwrap();

        assert!(forest
            .trees
            .iter()
            .all(|tree| matches!(tree, Node::Leaf { class: 0 })));
        assert_eq!(forest.predict(&[0, 0]).unwrap(), 0);
    }

    #[test]
    fn test_conflicting_duplicates_terminate() {
        let samples = vec![vec![1, 0], vec![1, 0], vec![1, 0]];
        let labels = vec![1, 0, 1];

        let forest = RandomForest::fit(&samples, &labels, 2, &ForestParams::default()).unwrap();

        // Every bootstrap is identical rows, so nothing can split them
        assert!(forest.trees.iter().all(|tree| matches!(tree, Node::Leaf { .. })));
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let params = ForestParams::default();

        assert_eq!(
            RandomForest::fit(&[], &[], 1, &params),
            Err(ForestError::NoSamples)
        );
        assert_eq!(
            RandomForest::fit(&[vec![1]], &[0, 1], 2, &params),
            Err(ForestError::LabelCountMismatch {
                samples: 1,
                labels: 2
            })
        );
        assert_eq!(
            RandomForest::fit(&[vec![1, 0], vec![1]], &[0, 1], 2, &params),
            Err(ForestError::RaggedSample {
                index: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            RandomForest::fit(&[vec![1]], &[3], 2, &params),
            Err(ForestError::LabelOutOfRange {
                label: 3,
                classes: 2
            })
        );
        assert_eq!(
            RandomForest::fit(
                &[vec![1]],
                &[0],
                1,
                &ForestParams {
                    n_trees: 0,
                    ..params
                }
            ),
            Err(ForestError::NoTrees)
        );
    }

    #[test]
    fn test_predict_rejects_bad_vectors() {
        let (samples, labels) = dataset();
        let forest = RandomForest::fit(&samples, &labels, 3, &ForestParams::default()).unwrap();

        assert_eq!(
            forest.predict(&[1, 0]),
            Err(ForestError::WidthMismatch {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            forest.predict(&[1, 7, 0]),
            Err(ForestError::NonIndicator { index: 1, value: 7 })
        );
    }

    fn forest_from_json(trees: serde_json::Value) -> RandomForest {
        serde_json::from_value(serde_json::json!({
            "n_features": 2,
            "n_classes": 2,
            "trees": trees,
        }))
        .unwrap()
    }

    #[test]
    fn test_check_accepts_fitted_forest() {
        let (samples, labels) = dataset();
        let forest = RandomForest::fit(&samples, &labels, 3, &ForestParams::default()).unwrap();

        assert_eq!(forest.check(), Ok(()));
    }

    #[test]
    fn test_check_rejects_out_of_range_nodes() {
        let bad_column = forest_from_json(serde_json::json!([
            {"split": {"column": 99, "absent": {"leaf": {"class": 0}}, "present": {"leaf": {"class": 1}}}}
        ]));
        assert_eq!(
            bad_column.check(),
            Err(ForestError::ColumnOutOfRange {
                column: 99,
                features: 2
            })
        );

        let bad_class = forest_from_json(serde_json::json!([
            {"split": {"column": 1, "absent": {"leaf": {"class": 0}}, "present": {"leaf": {"class": 5}}}}
        ]));
        assert_eq!(
            bad_class.check(),
            Err(ForestError::LabelOutOfRange {
                label: 5,
                classes: 2
            })
        );

        assert_eq!(forest_from_json(serde_json::json!([])).check(), Err(ForestError::NoTrees));
    }

    #[test]
    fn test_unchecked_bad_column_errors_instead_of_panicking() {
        let forest = forest_from_json(serde_json::json!([
            {"split": {"column": 99, "absent": {"leaf": {"class": 0}}, "present": {"leaf": {"class": 1}}}}
        ]));

        assert_eq!(
            forest.predict(&[1, 0]),
            Err(ForestError::ColumnOutOfRange {
                column: 99,
                features: 2
            })
        );
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[2, 5, 5, 1]), 1);
        assert_eq!(argmax(&[0, 0]), 0);
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < f64::EPSILON);
    }
}
