//! Genetic representation.
//!
//! An [`Individual`] is polyploid: it carries one [`Chromosome`] per active
//! [`Encoding`], in a slot order shared by the whole population. Each
//! chromosome assigns a machine (1-based) to every position of its
//! encoding's dispatch order.
//!
//! Rank and crowding distance describe a chromosome's standing within the
//! last ranking pass over its slot; every pass overwrites them.

use std::fmt;

use rand::{Rng, RngExt};

use crate::scenario::Encoding;

/// One encoding's gene sequence plus its objectives and ranking data.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    /// Dispatch policy this chromosome is decoded under.
    pub encoding: Encoding,
    /// Machine choice per dispatch position, in `1..=num_machines`.
    pub genes: Vec<usize>,
    /// f1: makespan.
    pub makespan: f64,
    /// f2: total energy.
    pub energy: f64,
    /// Pareto rank within the last ranked cohort (1 = non-dominated).
    pub rank: Option<usize>,
    /// Crowding distance within the chromosome's front.
    pub crowding_distance: Option<f64>,
}

impl Chromosome {
    /// Creates an empty, unevaluated chromosome.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            genes: Vec::new(),
            makespan: 0.0,
            energy: 0.0,
            rank: None,
            crowding_distance: None,
        }
    }

    /// Creates an unevaluated chromosome with the given genes.
    pub fn with_genes(encoding: Encoding, genes: Vec<usize>) -> Self {
        Self {
            genes,
            ..Self::new(encoding)
        }
    }

    /// Fills the chromosome with `len` uniform genes in `1..=machines`.
    pub fn randomize<R: Rng>(&mut self, len: usize, machines: usize, rng: &mut R) {
        self.genes.clear();
        self.genes.reserve(len);
        for _ in 0..len {
            self.genes.push(rng.random_range(1..=machines));
        }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// `(f1, f2)` pair.
    pub fn objectives(&self) -> (f64, f64) {
        (self.makespan, self.energy)
    }

    /// Clears rank and crowding distance.
    pub fn reset_ranking(&mut self) {
        self.rank = None;
        self.crowding_distance = None;
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.encoding)?;
        for (i, g) in self.genes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{g}")?;
        }
        f.write_str("]")
    }
}

/// A polyploid individual: one chromosome per active encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub chromosomes: Vec<Chromosome>,
}

impl Individual {
    /// Creates an individual with one empty chromosome per encoding.
    pub fn new(encodings: &[Encoding]) -> Self {
        Self {
            chromosomes: encodings.iter().map(|&e| Chromosome::new(e)).collect(),
        }
    }

    /// Creates an individual with random genes in every slot.
    pub fn random<R: Rng>(
        encodings: &[Encoding],
        len: usize,
        machines: usize,
        rng: &mut R,
    ) -> Self {
        let mut ind = Self::new(encodings);
        for chromosome in &mut ind.chromosomes {
            chromosome.randomize(len, machines, rng);
        }
        ind
    }

    /// Number of chromosome slots.
    pub fn num_chromosomes(&self) -> usize {
        self.chromosomes.len()
    }

    /// Gene length shared by all slots (0 for an empty individual).
    pub fn gene_len(&self) -> usize {
        self.chromosomes.first().map_or(0, Chromosome::len)
    }

    /// Structural check: at least one slot, equal non-zero gene lengths,
    /// every gene at least 1.
    pub fn is_valid(&self) -> bool {
        let Some(first) = self.chromosomes.first() else {
            return false;
        };
        let len = first.len();
        len > 0
            && self
                .chromosomes
                .iter()
                .all(|c| c.len() == len && c.genes.iter().all(|&g| g >= 1))
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chromosomes {
            writeln!(f, "{c}  (f1={}, f2={})", c.makespan, c.energy)?;
        }
        Ok(())
    }
}

/// One scheduled operation produced by decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationSchedule {
    pub operation: usize,
    pub job: usize,
    /// 0-based machine index.
    pub machine: usize,
    pub start: f64,
    pub end: f64,
    pub processing_time: f64,
    pub energy_cost: f64,
}
