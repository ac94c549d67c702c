//! Scores of a fitted classifier on held-out records
//!
//! The evaluation consists of the accuracy, a per-class report of precision,
//! recall, f1-score and support, and the confusion matrix. Classes are the
//! union of true and predicted classes in natural order. Ratios with a zero
//! denominator are reported as `0.0`.
use std::collections::{BTreeSet, HashMap};

use linfa::traits::{Predict, PredictInplace};
use linfa::Dataset;
use ndarray::{Array1, Array2, Axis, Ix1};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::dataset::ClassSet;
use crate::error::Result;

/// Confusion matrix of a multi-class prediction
///
/// Rows correspond to the true class, columns to the predicted class, the
/// diagonal holds the correct predictions.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionMatrix {
    matrix: Array2<usize>,
    members: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(ground_truth: &Array1<usize>, prediction: &Array1<usize>) -> Self {
        let members = ground_truth
            .iter()
            .chain(prediction.iter())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let index = members
            .iter()
            .enumerate()
            .map(|(idx, class)| (*class, idx))
            .collect::<HashMap<_, _>>();

        let mut matrix = Array2::zeros((members.len(), members.len()));
        for (truth, predicted) in ground_truth.iter().zip(prediction.iter()) {
            matrix[(index[truth], index[predicted])] += 1;
        }

        ConfusionMatrix { matrix, members }
    }

    /// Class indices of the rows and columns, in ascending order
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn matrix(&self) -> &Array2<usize> {
        &self.matrix
    }

    /// Number of true records of every class
    pub fn support(&self) -> Array1<usize> {
        self.matrix.sum_axis(Axis(1))
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.matrix.diag().sum(), self.matrix.sum())
    }

    /// Fraction of the records predicted as a class that truly belong to it
    pub fn precision(&self) -> Array1<f64> {
        let predicted = self.matrix.sum_axis(Axis(0));
        self.matrix
            .diag()
            .iter()
            .zip(predicted.iter())
            .map(|(hits, total)| ratio(*hits, *total))
            .collect()
    }

    /// Fraction of the records of a class that are predicted as such
    pub fn recall(&self) -> Array1<f64> {
        self.matrix
            .diag()
            .iter()
            .zip(self.support().iter())
            .map(|(hits, total)| ratio(*hits, *total))
            .collect()
    }

    /// Harmonic mean of precision and recall
    pub fn f1_score(&self) -> Array1<f64> {
        self.precision()
            .iter()
            .zip(self.recall().iter())
            .map(|(p, r)| if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 })
            .collect()
    }

    /// Rows of the matrix as nested vectors
    pub fn to_rows(&self) -> Vec<Vec<usize>> {
        self.matrix.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Scores of a single class or of an average over classes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class scores followed by accuracy, macro and weighted averages
///
/// Serializes to a map keyed by the class label, then `accuracy`,
/// `macro avg` and `weighted avg`, in that order.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<(String, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(confusion: &ConfusionMatrix, classes: &ClassSet) -> Self {
        let (precision, recall, f1_score) = (
            confusion.precision(),
            confusion.recall(),
            confusion.f1_score(),
        );
        let support = confusion.support();
        let total = support.sum();

        let rows = confusion
            .members()
            .iter()
            .enumerate()
            .map(|(idx, class)| {
                let metrics = ClassMetrics {
                    precision: precision[idx],
                    recall: recall[idx],
                    f1_score: f1_score[idx],
                    support: support[idx],
                };
                (classes.label(*class).to_string(), metrics)
            })
            .collect::<Vec<_>>();

        let nclasses = rows.len().max(1) as f64;
        let weights = support.mapv(|s| s as f64);
        let weighted = |values: &Array1<f64>| {
            if total == 0 {
                0.0
            } else {
                values.dot(&weights) / total as f64
            }
        };

        ClassificationReport {
            classes: rows,
            accuracy: confusion.accuracy(),
            macro_avg: ClassMetrics {
                precision: precision.sum() / nclasses,
                recall: recall.sum() / nclasses,
                f1_score: f1_score.sum() / nclasses,
                support: total,
            },
            weighted_avg: ClassMetrics {
                precision: weighted(&precision),
                recall: weighted(&recall),
                f1_score: weighted(&f1_score),
                support: total,
            },
        }
    }

    /// Scores of the class with label `label`
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, metrics)| metrics)
    }
}

impl Serialize for ClassificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.classes.len() + 3))?;
        for (label, metrics) in &self.classes {
            map.serialize_entry(label, metrics)?;
        }
        map.serialize_entry("accuracy", &self.accuracy)?;
        map.serialize_entry("macro avg", &self.macro_avg)?;
        map.serialize_entry("weighted avg", &self.weighted_avg)?;
        map.end()
    }
}

/// Result of evaluating a classifier on a test partition
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub confusion_matrix: Vec<Vec<usize>>,
}

/// Predict the records of `test` with `model` and score the predictions
pub fn evaluate<M>(
    model: &M,
    test: &Dataset<f64, usize, Ix1>,
    classes: &ClassSet,
) -> Result<Evaluation>
where
    M: PredictInplace<Array2<f64>, Array1<usize>>,
{
    if test.records().nrows() == 0 {
        return Err(linfa::Error::NotEnoughSamples.into());
    }

    let prediction: Array1<usize> = model.predict(test.records());
    let confusion = ConfusionMatrix::new(test.targets(), &prediction);
    let report = ClassificationReport::new(&confusion, classes);

    tracing::info!(
        accuracy = report.accuracy,
        samples = prediction.len(),
        "evaluated classifier"
    );

    Ok(Evaluation {
        accuracy: report.accuracy,
        confusion_matrix: confusion.to_rows(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn example() -> ConfusionMatrix {
        let truth = array![0usize, 0, 1, 1, 2];
        let prediction = array![0, 1, 1, 1, 0];
        ConfusionMatrix::new(&truth, &prediction)
    }

    /// Predicts the class stored in the first feature
    struct Echo;

    impl PredictInplace<Array2<f64>, Array1<usize>> for Echo {
        fn predict_inplace(&self, x: &Array2<f64>, y: &mut Array1<usize>) {
            for (target, value) in y.iter_mut().zip(x.column(0)) {
                *target = *value as usize;
            }
        }

        fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
            Array1::zeros(x.nrows())
        }
    }

    #[test]
    fn confusion_matrix_rows_are_truth() {
        let cm = example();

        assert_eq!(cm.to_rows(), vec![vec![1, 1, 0], vec![0, 2, 0], vec![1, 0, 0]]);
        assert_eq!(cm.support(), array![2usize, 2, 1]);
        assert_abs_diff_eq!(cm.accuracy(), 0.6);
    }

    #[test]
    fn per_class_scores() {
        let cm = example();

        assert_abs_diff_eq!(cm.precision(), array![0.5, 2.0 / 3.0, 0.0], epsilon = 1e-12);
        assert_abs_diff_eq!(cm.recall(), array![0.5, 1.0, 0.0], epsilon = 1e-12);
        assert_abs_diff_eq!(cm.f1_score(), array![0.5, 0.8, 0.0], epsilon = 1e-12);
    }

    #[test]
    fn predicted_only_classes_are_included() {
        let cm = ConfusionMatrix::new(&array![0, 0], &array![0, 3]);

        assert_eq!(cm.members(), &[0usize, 3]);
        assert_eq!(cm.to_rows(), vec![vec![1, 1], vec![0, 0]]);
        assert_abs_diff_eq!(cm.recall(), array![0.5, 0.0]);
    }

    #[test]
    fn averages() {
        let report = ClassificationReport::new(&example(), &ClassSet::from_indices(3));

        assert_abs_diff_eq!(
            report.macro_avg.precision,
            (0.5 + 2.0 / 3.0) / 3.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            report.weighted_avg.precision,
            (0.5 * 2.0 + 2.0 / 3.0 * 2.0) / 5.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(report.weighted_avg.recall, 0.6, epsilon = 1e-12);
        assert_eq!(report.macro_avg.support, 5);
        assert_eq!(report.class("1").map(|m| m.support), Some(2));
    }

    #[test]
    fn report_serializes_in_order() {
        let (classes, _) = ClassSet::encode(&["cat", "dog", "emu"]);
        let report = ClassificationReport::new(&example(), &classes);
        let json = serde_json::to_string(&report).unwrap();

        let position = |key: &str| json.find(&format!("\"{}\"", key)).unwrap();
        assert!(position("cat") < position("dog"));
        assert!(position("emu") < position("accuracy"));
        assert!(position("accuracy") < position("macro avg"));
        assert!(position("macro avg") < position("weighted avg"));
        assert!(json.contains("\"f1-score\""));
    }

    #[test]
    fn evaluate_scores_predictions() -> Result<()> {
        let test = Dataset::new(array![[0.], [1.], [1.], [2.]], array![0, 1, 2, 2]);
        let evaluation = evaluate(&Echo, &test, &ClassSet::from_indices(3))?;

        assert_abs_diff_eq!(evaluation.accuracy, 0.75);
        assert_eq!(
            evaluation.confusion_matrix,
            vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 1, 1]]
        );
        for (row, (_, metrics)) in evaluation
            .confusion_matrix
            .iter()
            .zip(&evaluation.report.classes)
        {
            assert_eq!(row.iter().sum::<usize>(), metrics.support);
        }

        Ok(())
    }

    #[test]
    fn empty_test_set_fails() {
        let test = Dataset::new(Array2::<f64>::zeros((0, 1)), Array1::<usize>::zeros(0));
        assert!(evaluate(&Echo, &test, &ClassSet::from_indices(1)).is_err());
    }
}
