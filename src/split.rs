//! Stratified train/test splitting
//!
//! The split keeps the proportion of every class in both partitions as close
//! as integer counts allow. All randomness comes from a seeded `StdRng`, so
//! the same dataset and seed always yield the same partition in the same
//! order.
use std::collections::BTreeMap;

use linfa::ParamGuard;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::TabularDataset;
use crate::error::{Result, TrainError};

/// Checked parameters of a stratified split
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StratifiedSplitValidParams {
    test_ratio: f64,
    seed: u64,
}

impl StratifiedSplitValidParams {
    pub fn test_ratio(&self) -> f64 {
        self.test_ratio
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of samples ending up in (train, test) for `nsamples` records
    pub fn partition_sizes(&self, nsamples: usize) -> (usize, usize) {
        let ntest = (self.test_ratio * nsamples as f64).ceil() as usize;
        (nsamples - ntest.min(nsamples), ntest.min(nsamples))
    }

    /// Split `data` into a training and an evaluation dataset
    pub fn split(&self, data: &TabularDataset) -> Result<(TabularDataset, TabularDataset)> {
        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, class) in data.targets().iter().enumerate() {
            members.entry(*class).or_default().push(idx);
        }

        let least = members.values().map(Vec::len).min().unwrap_or(0);
        if least < 2 {
            return Err(TrainError::SparseClass { members: least });
        }

        let nclasses = members.len();
        let (ntrain, ntest) = self.partition_sizes(data.nsamples());
        if ntrain < nclasses {
            return Err(TrainError::PartitionTooSmall {
                partition: "train",
                size: ntrain,
                classes: nclasses,
            });
        }
        if ntest < nclasses {
            return Err(TrainError::PartitionTooSmall {
                partition: "test",
                size: ntest,
                classes: nclasses,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);

        let counts = members.values().map(Vec::len).collect::<Vec<_>>();
        let train_counts = approximate_mode(&counts, ntrain, &mut rng);
        let remaining = counts
            .iter()
            .zip(&train_counts)
            .map(|(n, t)| n - t)
            .collect::<Vec<_>>();
        let test_counts = approximate_mode(&remaining, ntest, &mut rng);

        let mut train = Vec::with_capacity(ntrain);
        let mut test = Vec::with_capacity(ntest);
        for ((indices, ntrain), ntest) in members.values().zip(train_counts).zip(test_counts) {
            let mut indices = indices.clone();
            indices.shuffle(&mut rng);
            train.extend_from_slice(&indices[..ntrain]);
            test.extend_from_slice(&indices[ntrain..ntrain + ntest]);
        }
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        tracing::debug!(
            train = train.len(),
            test = test.len(),
            classes = nclasses,
            seed = self.seed,
            "stratified split"
        );

        Ok((data.select(&train), data.select(&test)))
    }
}

/// Parameters of a stratified split, see [`StratifiedSplit::params`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StratifiedSplitParams(StratifiedSplitValidParams);

impl StratifiedSplitParams {
    pub fn new() -> Self {
        Self(StratifiedSplitValidParams {
            test_ratio: 0.2,
            seed: 42,
        })
    }

    /// Sets the fraction of samples held out for evaluation
    pub fn test_ratio(mut self, test_ratio: f64) -> Self {
        self.0.test_ratio = test_ratio;
        self
    }

    /// Sets the seed of the random generator assigning samples
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for StratifiedSplitParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for StratifiedSplitParams {
    type Checked = StratifiedSplitValidParams;
    type Error = TrainError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !(self.0.test_ratio > 0.0 && self.0.test_ratio < 1.0) {
            Err(TrainError::Parameters(format!(
                "test ratio should be in (0, 1), but was {}",
                self.0.test_ratio
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

pub struct StratifiedSplit;

impl StratifiedSplit {
    /// Defaults are a held-out fraction of `0.2` and seed `42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> StratifiedSplitParams {
        StratifiedSplitParams::new()
    }
}

/// Most likely per-class counts when drawing `ndraws` samples without
/// replacement from classes of size `counts`
///
/// Every class gets the floor of its proportional share, the remaining draws
/// go to the classes with the largest fractional parts. Ties are broken by the
/// random generator.
fn approximate_mode(counts: &[usize], ndraws: usize, rng: &mut StdRng) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    let continuous = counts
        .iter()
        .map(|n| *n as f64 * ndraws as f64 / total as f64)
        .collect::<Vec<_>>();
    let mut floored = continuous.iter().map(|x| x.floor() as usize).collect::<Vec<_>>();

    let mut need = ndraws - floored.iter().sum::<usize>();
    if need == 0 {
        return floored;
    }

    let remainder = continuous
        .iter()
        .zip(&floored)
        .map(|(c, f)| c - *f as f64)
        .collect::<Vec<_>>();
    let mut values = remainder.clone();
    values.sort_by(|a, b| b.total_cmp(a));
    values.dedup();

    for value in values {
        let mut candidates = (0..counts.len())
            .filter(|idx| remainder[*idx] == value)
            .collect::<Vec<_>>();
        candidates.shuffle(rng);
        let add_now = candidates.len().min(need);
        for idx in &candidates[..add_now] {
            floored[*idx] += 1;
        }
        need -= add_now;
        if need == 0 {
            break;
        }
    }

    floored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ClassSet, DataSource};
    use crate::error::ErrorKind;
    use ndarray::{Array1, Array2};
    use std::collections::HashSet;

    fn toy(targets: Vec<usize>) -> TabularDataset {
        let n = targets.len();
        let nclasses = targets.iter().max().map_or(0, |x| x + 1);
        TabularDataset::new(
            Array2::from_shape_fn((n, 1), |(i, _)| i as f64),
            Array1::from(targets),
            ClassSet::from_indices(nclasses),
            vec!["x".to_string()],
        )
    }

    #[test]
    fn iris_split_is_stratified() {
        let iris = DataSource::Iris.load().unwrap();
        let (train, test) = StratifiedSplit::params()
            .check()
            .unwrap()
            .split(&iris)
            .unwrap();

        assert_eq!(train.nsamples(), 120);
        assert_eq!(test.nsamples(), 30);
        for class in 0..3 {
            assert_eq!(test.targets().iter().filter(|x| **x == class).count(), 10);
            assert_eq!(train.targets().iter().filter(|x| **x == class).count(), 40);
        }
    }

    #[test]
    fn split_is_reproducible_and_disjoint() {
        let data = toy((0..40).map(|i| i % 3).collect());
        let params = StratifiedSplit::params().check().unwrap();

        let (train_a, test_a) = params.split(&data).unwrap();
        let (train_b, test_b) = params.split(&data).unwrap();
        assert_eq!(train_a.records(), train_b.records());
        assert_eq!(test_a.records(), test_b.records());

        let seen = train_a
            .records()
            .iter()
            .chain(test_a.records().iter())
            .map(|x| *x as usize)
            .collect::<HashSet<_>>();
        assert_eq!(seen.len(), 40);
        assert_eq!(test_a.nsamples(), 8);
    }

    #[test]
    fn other_seed_other_partition() {
        let data = toy((0..40).map(|i| i % 2).collect());
        let (_, test_a) = StratifiedSplit::params().check().unwrap().split(&data).unwrap();
        let (_, test_b) = StratifiedSplit::params()
            .seed(7)
            .check()
            .unwrap()
            .split(&data)
            .unwrap();

        assert_ne!(test_a.records(), test_b.records());
    }

    #[test]
    fn uneven_classes_keep_proportions() {
        // 30 / 10 members -> 6 / 2 in a test partition of 8
        let mut targets = vec![0; 30];
        targets.extend(vec![1; 10]);
        let (train, test) = StratifiedSplit::params()
            .check()
            .unwrap()
            .split(&toy(targets))
            .unwrap();

        assert_eq!(test.targets().iter().filter(|x| **x == 1).count(), 2);
        assert_eq!(train.targets().iter().filter(|x| **x == 1).count(), 8);
    }

    #[test]
    fn single_member_class_fails() {
        let err = StratifiedSplit::params()
            .check()
            .unwrap()
            .split(&toy(vec![0, 0, 0, 0, 1]))
            .unwrap_err();

        assert!(matches!(err, TrainError::SparseClass { members: 1 }));
        assert_eq!(err.kind(), ErrorKind::Dataset);
    }

    #[test]
    fn test_partition_smaller_than_classes_fails() {
        // 6 samples -> 2 test samples for 3 classes
        let err = StratifiedSplit::params()
            .check()
            .unwrap()
            .split(&toy(vec![0, 0, 1, 1, 2, 2]))
            .unwrap_err();

        assert!(matches!(
            err,
            TrainError::PartitionTooSmall {
                partition: "test",
                ..
            }
        ));
    }

    #[test]
    fn invalid_ratio() {
        assert!(StratifiedSplit::params().test_ratio(0.0).check().is_err());
        assert!(StratifiedSplit::params().test_ratio(1.0).check().is_err());
        assert!(StratifiedSplit::params().test_ratio(0.5).check().is_ok());
    }

    #[test]
    fn approximate_mode_distributes_all_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let counts = approximate_mode(&[50, 50, 50], 30, &mut rng);
        assert_eq!(counts, vec![10, 10, 10]);

        let counts = approximate_mode(&[3, 3, 3], 4, &mut rng);
        assert_eq!(counts.iter().sum::<usize>(), 4);
        assert!(counts.iter().all(|x| *x == 1 || *x == 2));
    }
}
