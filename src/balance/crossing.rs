use crate::design::{Factor, Level};
use serde::{Deserialize, Serialize};

/// N-ary Cartesian product of ordered lists
///
/// Lists are combined left to right, so the first list varies slowest and
/// the last varies fastest. The product of zero lists is a single empty
/// tuple.
///
/// # Example
/// ```
/// use sourpea::balance::cartesian_product;
///
/// let product = cartesian_product(&[vec!["a1", "a2"], vec!["b1", "b2"]]);
/// assert_eq!(
///     product,
///     vec![
///         vec!["a1", "b1"],
///         vec!["a1", "b2"],
///         vec!["a2", "b1"],
///         vec!["a2", "b2"],
///     ]
/// );
/// ```
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}

/// One combination of crossing levels with its expected relative weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingCell {
    /// Level names, one per crossing factor, in crossing order
    pub names: Vec<String>,

    /// Product of the chosen levels' weights
    pub weight: f64,
}

/// Every combination of the crossing factors' levels, built once per block
///
/// Cell order is the Cartesian-product order (first factor slowest). It
/// aligns observed counts with expected counts, so it is part of the
/// contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingTable {
    factors: Vec<String>,
    cells: Vec<CrossingCell>,
    max_deficit: usize,
}

impl CrossingTable {
    /// Build the table for `crossing`. An empty crossing yields an empty table.
    pub fn new(crossing: &[Factor]) -> Self {
        let factors = crossing.iter().map(|f| f.name().to_string()).collect();
        let max_deficit = crossing.iter().map(Factor::max_deficit).max().unwrap_or(0);

        if crossing.is_empty() {
            return Self {
                factors,
                cells: Vec::new(),
                max_deficit,
            };
        }

        let levels: Vec<Vec<&Level>> = crossing
            .iter()
            .map(|f| f.levels().iter().collect())
            .collect();
        let cells = cartesian_product(&levels)
            .into_iter()
            .map(|combination| CrossingCell {
                names: combination.iter().map(|l| l.name().to_string()).collect(),
                weight: combination.iter().map(|l| l.weight()).product(),
            })
            .collect();

        Self {
            factors,
            cells,
            max_deficit,
        }
    }

    pub fn factor_names(&self) -> &[String] {
        &self.factors
    }

    pub fn cells(&self) -> &[CrossingCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Largest `width - 1` among derived levels of the crossing factors
    ///
    /// A single correction is applied for the whole table even when crossing
    /// factors carry windows of different widths.
    pub fn max_deficit(&self) -> usize {
        self.max_deficit
    }

    pub fn total_weight(&self) -> f64 {
        self.cells.iter().map(|c| c.weight).sum()
    }

    /// Index of the cell whose level names equal `names` exactly
    pub fn index_of(&self, names: &[&str]) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| cell.names.iter().map(String::as_str).eq(names.iter().copied()))
    }

    /// Expected count per cell for a sequence of `n_trials`
    ///
    /// `expected_i = weight_i / (total_weight + max_deficit) * n_trials`
    ///
    /// The deficit term accounts for the leading trials that cannot carry a
    /// derived label and are left out of the tally.
    pub fn expected_counts(&self, n_trials: usize) -> Vec<f64> {
        let mass = self.total_weight() + self.max_deficit as f64;
        self.cells
            .iter()
            .map(|cell| cell.weight * n_trials as f64 / mass)
            .collect()
    }
}
