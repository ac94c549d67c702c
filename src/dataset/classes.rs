use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Distinct class labels of a dataset in natural sort order
///
/// Labels are kept as text so that CSV targets like `setosa` and numeric
/// targets like `0` are handled the same way. When every label parses as a
/// number the labels are ordered numerically (`2` before `10`) and spellings
/// of the same number (`1`, `1.0`) form one class named after the
/// lexicographically first spelling. Otherwise labels are ordered
/// lexicographically. The position of a label in this order is the class
/// index used as target by the learning algorithms.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClassSet {
    labels: Vec<String>,
}

impl ClassSet {
    /// Collect the distinct labels of `raw` and encode every entry as class index
    pub fn encode<S: AsRef<str>>(raw: &[S]) -> (ClassSet, Vec<usize>) {
        let mut spellings: Vec<&str> = raw.iter().map(|x| x.as_ref()).collect();
        spellings.sort_unstable();
        spellings.dedup();

        let numeric = spellings
            .iter()
            .map(|x| x.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>();

        let mut labels: Vec<String> = Vec::new();
        let mut index = HashMap::new();
        match numeric {
            Some(values) => {
                let mut order: Vec<usize> = (0..spellings.len()).collect();
                order.sort_by(|a, b| {
                    values[*a]
                        .partial_cmp(&values[*b])
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| spellings[*a].cmp(spellings[*b]))
                });

                let mut previous = None;
                for idx in order {
                    if previous != Some(values[idx]) {
                        labels.push(spellings[idx].to_string());
                        previous = Some(values[idx]);
                    }
                    index.insert(spellings[idx], labels.len() - 1);
                }
            }
            None => {
                for (idx, spelling) in spellings.iter().enumerate() {
                    labels.push(spelling.to_string());
                    index.insert(*spelling, idx);
                }
            }
        }

        let targets = raw.iter().map(|x| index[x.as_ref()]).collect();

        (ClassSet { labels }, targets)
    }

    /// Classes `0..n` for datasets whose targets are already class indices
    pub fn from_indices(n: usize) -> ClassSet {
        ClassSet {
            labels: (0..n).map(|idx| idx.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label text of class `idx`
    pub fn label(&self, idx: usize) -> &str {
        &self.labels[idx]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::ClassSet;

    #[test]
    fn numeric_labels_sort_numerically() {
        let (classes, targets) = ClassSet::encode(&["10", "2", "1", "2"]);

        assert_eq!(classes.labels(), &["1", "2", "10"]);
        assert_eq!(targets, vec![2, 1, 0, 1]);
    }

    #[test]
    fn text_labels_sort_lexicographically() {
        let (classes, targets) = ClassSet::encode(&["virginica", "setosa", "versicolor", "1"]);

        assert_eq!(classes.labels(), &["1", "setosa", "versicolor", "virginica"]);
        assert_eq!(targets, vec![3, 1, 2, 0]);
        assert_eq!(classes.label(1), "setosa");
    }

    #[test]
    fn spellings_of_one_number_share_a_class() {
        let (classes, targets) = ClassSet::encode(&["1.0", "2", "1", "01", "2.5"]);

        assert_eq!(classes.labels(), &["01", "2", "2.5"]);
        assert_eq!(targets, vec![0, 1, 0, 0, 2]);
    }

    #[test]
    fn indices_as_labels() {
        let classes = ClassSet::from_indices(3);

        assert_eq!(classes.len(), 3);
        assert_eq!(classes.labels(), &["0", "1", "2"]);
    }
}
