//! # Hyperparameter Schema
//!
//! The schema maps a model-family identifier to the ordered list of tunable
//! hyperparameters for that family. Gene order in every chromosome follows the
//! order of the ranges here, which is what crossover cuts against.
//!
//! ```rust
//! use hyperga::schema::{families, HyperparameterSchema};
//!
//! let schema = HyperparameterSchema::standard();
//! let ranges = schema.ranges_for(families::SVM).unwrap();
//! let names: Vec<&str> = ranges.iter().map(|r| r.name()).collect();
//!
//! assert_eq!(names, ["C", "gamma", "tol"]);
//! assert!(schema.ranges_for("gradient_boosting").is_err());
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{OptionExt, Result, SearchError};
use crate::rng::RandomNumberGenerator;

/// Identifiers of the model families shipped with [`HyperparameterSchema::standard`].
pub mod families {
    pub const RANDOM_FOREST: &str = "random_forest";
    pub const SVM: &str = "svm";
    pub const NEURAL_NETWORK: &str = "neural_network";
}

/// How values of a hyperparameter are drawn.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Inclusive integer draw.
    Integer,
    /// Continuous draw.
    Real,
}

/// A concrete hyperparameter value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Real(f64),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Integer(_) => ParamKind::Integer,
            ParamValue::Real(_) => ParamKind::Real,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Integer(v) => v as f64,
            ParamValue::Real(v) => v,
        }
    }

    /// Integer view of the value; reals are truncated toward zero.
    pub fn as_i64(&self) -> i64 {
        match *self {
            ParamValue::Integer(v) => v,
            ParamValue::Real(v) => v as i64,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Real(v) => write!(f, "{}", v),
        }
    }
}

/// Name, kind and inclusive bounds of one tunable hyperparameter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RangeFields"))]
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparameterRange {
    name: String,
    kind: ParamKind,
    low: f64,
    high: f64,
}

impl HyperparameterRange {
    /// Creates a range, rejecting reversed or non-finite bounds.
    ///
    /// Integer ranges additionally need integral bounds.
    pub fn new(name: impl Into<String>, kind: ParamKind, low: f64, high: f64) -> Result<Self> {
        let name = name.into();
        let integral = low.fract() == 0.0 && high.fract() == 0.0;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(SearchError::InvalidRange { name, low, high });
        }
        if kind == ParamKind::Integer && !integral {
            return Err(SearchError::InvalidRange { name, low, high });
        }
        Ok(Self {
            name,
            kind,
            low,
            high,
        })
    }

    pub fn integer(name: impl Into<String>, low: i64, high: i64) -> Result<Self> {
        Self::new(name, ParamKind::Integer, low as f64, high as f64)
    }

    pub fn real(name: impl Into<String>, low: f64, high: f64) -> Result<Self> {
        Self::new(name, ParamKind::Real, low, high)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Draws a fresh value uniformly from the range.
    pub fn sample(&self, rng: &mut RandomNumberGenerator) -> ParamValue {
        match self.kind {
            ParamKind::Integer => {
                ParamValue::Integer(rng.gen_integer(self.low as i64, self.high as i64))
            }
            ParamKind::Real => ParamValue::Real(rng.gen_real(self.low, self.high)),
        }
    }

    /// Whether `value` has this range's kind and lies within its bounds.
    pub fn contains(&self, value: &ParamValue) -> bool {
        value.kind() == self.kind && (self.low..=self.high).contains(&value.as_f64())
    }

    // Bounds of the built-in families are known to be valid.
    fn known(name: &str, kind: ParamKind, low: f64, high: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            low,
            high,
        }
    }
}

/// Immutable registry of hyperparameter ranges per model family.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SchemaFields"))]
#[derive(Debug, Clone, Default)]
pub struct HyperparameterSchema {
    families: HashMap<String, Vec<HyperparameterRange>>,
}

// Deserialized forms, converted through the validating constructors.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RangeFields {
    name: String,
    kind: ParamKind,
    low: f64,
    high: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RangeFields> for HyperparameterRange {
    type Error = SearchError;

    fn try_from(fields: RangeFields) -> Result<Self> {
        Self::new(fields.name, fields.kind, fields.low, fields.high)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SchemaFields {
    families: HashMap<String, Vec<HyperparameterRange>>,
}

#[cfg(feature = "serde")]
impl TryFrom<SchemaFields> for HyperparameterSchema {
    type Error = SearchError;

    fn try_from(fields: SchemaFields) -> Result<Self> {
        fields
            .families
            .into_iter()
            .fold(Self::builder(), |builder, (name, ranges)| {
                builder.family(name, ranges)
            })
            .build()
    }
}

impl HyperparameterSchema {
    /// The tree-ensemble, margin-classifier and feedforward-network families.
    pub fn standard() -> Self {
        use ParamKind::{Integer, Real};

        let mut families = HashMap::new();
        families.insert(
            families::RANDOM_FOREST.to_string(),
            vec![
                HyperparameterRange::known("n_estimators", Integer, 10.0, 200.0),
                HyperparameterRange::known("max_depth", Integer, 2.0, 30.0),
                HyperparameterRange::known("min_samples_split", Integer, 2.0, 10.0),
                HyperparameterRange::known("min_samples_leaf", Integer, 1.0, 10.0),
                HyperparameterRange::known("max_features", Real, 0.1, 1.0),
            ],
        );
        families.insert(
            families::SVM.to_string(),
            vec![
                HyperparameterRange::known("C", Real, 0.1, 10.0),
                HyperparameterRange::known("gamma", Real, 0.001, 1.0),
                HyperparameterRange::known("tol", Real, 1e-5, 1e-1),
            ],
        );
        families.insert(
            families::NEURAL_NETWORK.to_string(),
            vec![
                HyperparameterRange::known("hidden_layer_sizes", Integer, 1.0, 3.0),
                HyperparameterRange::known("layer_size", Integer, 10.0, 200.0),
                HyperparameterRange::known("alpha", Real, 0.0001, 0.1),
                HyperparameterRange::known("learning_rate_init", Real, 0.0001, 0.1),
            ],
        );
        Self { families }
    }

    pub fn builder() -> HyperparameterSchemaBuilder {
        HyperparameterSchemaBuilder::default()
    }

    /// Returns the ordered ranges of `family`.
    pub fn ranges_for(&self, family: &str) -> Result<&[HyperparameterRange]> {
        self.families
            .get(family)
            .map(Vec::as_slice)
            .ok_or_else_search(|| SearchError::UnknownModelFamily(family.to_string()))
    }

    pub fn contains_family(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    /// Registered family identifiers in sorted order.
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.families.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Builder for custom schemas.
#[derive(Debug, Default)]
pub struct HyperparameterSchemaBuilder {
    families: Vec<(String, Vec<HyperparameterRange>)>,
}

impl HyperparameterSchemaBuilder {
    /// Adds a family with its ordered ranges.
    pub fn family(mut self, name: impl Into<String>, ranges: Vec<HyperparameterRange>) -> Self {
        self.families.push((name.into(), ranges));
        self
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Fails if a family is registered twice, has no ranges, or repeats a parameter name.
    pub fn build(self) -> Result<HyperparameterSchema> {
        let mut families = HashMap::with_capacity(self.families.len());
        for (name, ranges) in self.families {
            if ranges.is_empty() {
                return Err(SearchError::Configuration(format!(
                    "Model family '{}' has no hyperparameters",
                    name
                )));
            }
            let mut seen = HashSet::new();
            let duplicate = ranges
                .iter()
                .find(|r| !seen.insert(r.name()))
                .map(|r| r.name().to_string());
            if let Some(dup) = duplicate {
                return Err(SearchError::Configuration(format!(
                    "Hyperparameter '{}' appears twice in model family '{}'",
                    dup, name
                )));
            }
            if families.contains_key(&name) {
                return Err(SearchError::Configuration(format!(
                    "Model family '{}' registered twice",
                    name
                )));
            }
            families.insert(name, ranges);
        }
        Ok(HyperparameterSchema { families })
    }
}
