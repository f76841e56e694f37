//! # Chromosome
//!
//! A chromosome is one candidate hyperparameter configuration: an ordered list
//! of genes, one per range of the active model family. Chromosomes are
//! immutable values; the genetic operators build new instances instead of
//! editing their inputs, so a parent that wins several tournaments is never
//! aliased by its children.

use std::fmt;

use crate::rng::RandomNumberGenerator;
use crate::schema::{HyperparameterRange, ParamValue};

/// A named hyperparameter value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub name: String,
    pub value: ParamValue,
}

impl Gene {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An ordered, immutable set of genes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Draws one value per range, in range order.
    pub fn random(ranges: &[HyperparameterRange], rng: &mut RandomNumberGenerator) -> Self {
        let genes = ranges
            .iter()
            .map(|range| Gene::new(range.name(), range.sample(rng)))
            .collect();
        Self { genes }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.genes.iter().find(|g| g.name == name).map(|g| g.value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.genes.iter().map(|g| g.name.as_str())
    }

    /// Returns a copy whose genes from `point` onward come from `other`.
    ///
    /// Both chromosomes must share the same gene order.
    pub fn splice(&self, other: &Chromosome, point: usize) -> Chromosome {
        let genes = self
            .genes
            .iter()
            .take(point)
            .chain(other.genes.iter().skip(point))
            .cloned()
            .collect();
        Chromosome { genes }
    }

    /// Whether the genes match `ranges` one to one, in order, and lie inside them.
    pub fn conforms_to(&self, ranges: &[HyperparameterRange]) -> bool {
        self.genes.len() == ranges.len()
            && self
                .genes
                .iter()
                .zip(ranges)
                .all(|(gene, range)| gene.name == range.name() && range.contains(&gene.value))
    }

    /// Bit-exact identity of the gene values, usable as a hash key.
    pub fn cache_key(&self) -> Vec<u64> {
        self.genes
            .iter()
            .map(|g| match g.value {
                ParamValue::Integer(v) => v as u64,
                ParamValue::Real(v) => v.to_bits(),
            })
            .collect()
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", gene.name, gene.value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc(a: i64, b: i64, c: f64) -> Chromosome {
        Chromosome::from_genes(vec![
            Gene::new("a", ParamValue::Integer(a)),
            Gene::new("b", ParamValue::Integer(b)),
            Gene::new("c", ParamValue::Real(c)),
        ])
    }

    #[test]
    fn test_random_conforms() {
        let ranges = vec![
            HyperparameterRange::integer("a", 0, 5).unwrap(),
            HyperparameterRange::real("b", 0.1, 0.2).unwrap(),
        ];
        let mut rng = RandomNumberGenerator::from_seed(9);
        for _ in 0..50 {
            let chromosome = Chromosome::random(&ranges, &mut rng);
            assert!(chromosome.conforms_to(&ranges));
            assert_eq!(chromosome.names().collect::<Vec<_>>(), ["a", "b"]);
        }
    }

    #[test]
    fn test_splice() {
        let left = abc(1, 2, 3.0);
        let right = abc(10, 20, 30.0);

        let child = left.splice(&right, 1);
        assert_eq!(child, abc(1, 20, 30.0));

        let child = right.splice(&left, 2);
        assert_eq!(child, abc(10, 20, 3.0));

        // Inputs untouched
        assert_eq!(left, abc(1, 2, 3.0));
    }

    #[test]
    fn test_cache_key_distinguishes_values() {
        assert_eq!(abc(1, 2, 3.0).cache_key(), abc(1, 2, 3.0).cache_key());
        assert_ne!(abc(1, 2, 3.0).cache_key(), abc(1, 2, 3.5).cache_key());
    }

    #[test]
    fn test_display() {
        assert_eq!(abc(1, 2, 0.5).to_string(), "{a: 1, b: 2, c: 0.5}");
    }
}
