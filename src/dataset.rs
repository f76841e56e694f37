//! # Dataset
//!
//! Tabular feature/target data and the fixed training/validation split the
//! search evaluates against. The engine never re-splits or reshuffles a
//! [`DataSplit`] it is handed; splitting happens once, here, before a run.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SearchError};
use crate::rng::RandomNumberGenerator;

/// Fraction of rows held out for validation unless a caller asks otherwise.
pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.2;

/// Seed used for the split unless a caller asks otherwise.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// The kind of prediction a target column calls for.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Classification,
    Regression,
}

impl TaskKind {
    /// Integral targets are class labels (binary or multiclass); anything else
    /// is a regression target.
    pub fn infer(targets: &[f64]) -> TaskKind {
        if !targets.is_empty() && targets.iter().all(|t| t.is_finite() && t.fract() == 0.0) {
            TaskKind::Classification
        } else {
            TaskKind::Regression
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Classification => "classification",
            TaskKind::Regression => "regression",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature rows paired with their targets.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSplit {
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl DataSplit {
    /// # Errors
    ///
    /// Fails if the row counts differ or the rows have different widths.
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(SearchError::Dataset(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if let Some(first) = features.first() {
            let width = first.len();
            if let Some(pos) = features.iter().position(|row| row.len() != width) {
                return Err(SearchError::Dataset(format!(
                    "Row {} has {} features, expected {}",
                    pos,
                    features[pos].len(),
                    width
                )));
            }
        }
        Ok(Self { features, targets })
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn num_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn task_kind(&self) -> TaskKind {
        TaskKind::infer(&self.targets)
    }
}

/// A full table before splitting.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    data: DataSplit,
    class_labels: Option<Vec<String>>,
}

impl Dataset {
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        targets: Vec<f64>,
    ) -> Result<Self> {
        let data = DataSplit::new(features, targets)?;
        if !data.is_empty() && data.num_features() != feature_names.len() {
            return Err(SearchError::Dataset(format!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                data.num_features()
            )));
        }
        Ok(Self {
            feature_names,
            data,
            class_labels: None,
        })
    }

    /// Builds a classification dataset from string labels.
    ///
    /// Labels are encoded as `0, 1, 2, ...` in order of first appearance.
    pub fn from_labels<S: AsRef<str>>(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: &[S],
    ) -> Result<Self> {
        let mut codes: HashMap<&str, usize> = HashMap::new();
        let mut class_labels = Vec::new();
        let targets = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                let next = codes.len();
                let code = *codes.entry(label).or_insert_with(|| {
                    class_labels.push(label.to_string());
                    next
                });
                code as f64
            })
            .collect();

        let mut dataset = Self::new(feature_names, features, targets)?;
        dataset.class_labels = Some(class_labels);
        Ok(dataset)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Original label strings, indexed by encoded class, if built from labels.
    pub fn class_labels(&self) -> Option<&[String]> {
        self.class_labels.as_deref()
    }

    pub fn data(&self) -> &DataSplit {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn task_kind(&self) -> TaskKind {
        self.data.task_kind()
    }

    /// Shuffles the rows with `seed` and holds out `ceil(validation_fraction * rows)`
    /// of them for validation.
    ///
    /// # Errors
    ///
    /// Fails if the fraction is outside `(0, 1)` or either side would be empty.
    pub fn train_validation_split(
        &self,
        validation_fraction: f64,
        seed: u64,
    ) -> Result<(DataSplit, DataSplit)> {
        if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
            return Err(SearchError::Configuration(format!(
                "Validation fraction must be in (0, 1), got {}",
                validation_fraction
            )));
        }
        let rows = self.len();
        let validation_rows = (validation_fraction * rows as f64).ceil() as usize;
        if validation_rows == 0 || validation_rows >= rows {
            return Err(SearchError::Dataset(format!(
                "Cannot split {} rows with validation fraction {}",
                rows, validation_fraction
            )));
        }

        let mut rng = RandomNumberGenerator::from_seed(seed);
        let order = rng.sample_distinct(rows, rows);
        let (validation_idx, training_idx) = order.split_at(validation_rows);

        Ok((self.take_rows(training_idx), self.take_rows(validation_idx)))
    }

    fn take_rows(&self, indices: &[usize]) -> DataSplit {
        DataSplit {
            features: indices.iter().map(|&i| self.data.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.data.targets[i]).collect(),
        }
    }
}
