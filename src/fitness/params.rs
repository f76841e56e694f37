//! Translation of chromosome genes into the parameter names and shapes a
//! trainer expects.

use std::collections::BTreeMap;

use crate::chromosome::Chromosome;
use crate::schema::{families, ParamValue};

/// Seed handed to trainers of families whose fitting is randomised.
pub const TRAINER_RANDOM_STATE: i64 = 42;

/// Iteration cap handed to feedforward-network trainers.
pub const NEURAL_NETWORK_MAX_ITER: i64 = 500;

/// A single trainer-facing setting.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSetting {
    Integer(i64),
    Real(f64),
    /// Width of each hidden layer, input side first.
    Layers(Vec<usize>),
}

/// Named settings passed to [`Trainer::fit`](super::Trainer::fit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainerParams {
    settings: BTreeMap<String, ParamSetting>,
}

impl TrainerParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the genes of `chromosome` for `family`.
    ///
    /// Genes pass through under their own names, except for feedforward networks
    /// whose layer count and layer width collapse into one `hidden_layer_sizes`
    /// list. Randomised families also receive a fixed `random_state`.
    pub fn from_chromosome(family: &str, chromosome: &Chromosome) -> Self {
        let mut params = Self::new();

        if family == families::NEURAL_NETWORK {
            let count = chromosome
                .get("hidden_layer_sizes")
                .map_or(0, |v| v.as_i64());
            let width = chromosome.get("layer_size").map_or(0, |v| v.as_i64());
            let count = usize::try_from(count).unwrap_or(0);
            let layers = vec![usize::try_from(width).unwrap_or(0); count];
            params.insert("hidden_layer_sizes", ParamSetting::Layers(layers));

            for gene in chromosome.genes() {
                if gene.name != "hidden_layer_sizes" && gene.name != "layer_size" {
                    params.insert(&gene.name, gene.value.into());
                }
            }
            params.insert("max_iter", ParamSetting::Integer(NEURAL_NETWORK_MAX_ITER));
            params.insert("random_state", ParamSetting::Integer(TRAINER_RANDOM_STATE));
            return params;
        }

        for gene in chromosome.genes() {
            params.insert(&gene.name, gene.value.into());
        }
        if family == families::RANDOM_FOREST {
            params.insert("random_state", ParamSetting::Integer(TRAINER_RANDOM_STATE));
        }
        params
    }

    pub fn insert(&mut self, name: &str, setting: ParamSetting) {
        self.settings.insert(name.to_string(), setting);
    }

    pub fn get(&self, name: &str) -> Option<&ParamSetting> {
        self.settings.get(name)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.settings.get(name)? {
            ParamSetting::Integer(v) => Some(*v),
            ParamSetting::Real(v) => Some(*v as i64),
            ParamSetting::Layers(_) => None,
        }
    }

    pub fn real(&self, name: &str) -> Option<f64> {
        match self.settings.get(name)? {
            ParamSetting::Integer(v) => Some(*v as f64),
            ParamSetting::Real(v) => Some(*v),
            ParamSetting::Layers(_) => None,
        }
    }

    pub fn layers(&self, name: &str) -> Option<&[usize]> {
        match self.settings.get(name)? {
            ParamSetting::Layers(layers) => Some(layers),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSetting)> {
        self.settings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

impl From<ParamValue> for ParamSetting {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Integer(v) => ParamSetting::Integer(v),
            ParamValue::Real(v) => ParamSetting::Real(v),
        }
    }
}
