//! Evaluation weights.
//!
//! Each side carries its own ordered list of coefficients for the game's
//! evaluation polynomial. The controller owns them and lends them to the
//! search by reference; they only change between searches.

use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered list of numeric evaluation weights.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightVector {
    values: Vec<f64>,
}

impl WeightVector {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        WeightVector { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Weight at `index`, or 0.0 when the vector is shorter than expected.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }
}

impl Index<usize> for WeightVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl From<Vec<f64>> for WeightVector {
    fn from(values: Vec<f64>) -> Self {
        WeightVector { values }
    }
}

impl FromIterator<f64> for WeightVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        WeightVector {
            values: iter.into_iter().collect(),
        }
    }
}

/// Weight sets for both computer players plus the defaults used to score
/// human moves.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameWeights {
    pub player1: WeightVector,
    pub player2: WeightVector,
    pub default: WeightVector,
}

impl GameWeights {
    /// Both players start from the defaults.
    #[must_use]
    pub fn new(default: WeightVector) -> Self {
        GameWeights {
            player1: default.clone(),
            player2: default.clone(),
            default,
        }
    }

    /// Weights used when searching for `player1` (or player 2 when false).
    #[must_use]
    pub fn for_player(&self, player1: bool) -> &WeightVector {
        if player1 {
            &self.player1
        } else {
            &self.player2
        }
    }

    pub fn for_player_mut(&mut self, player1: bool) -> &mut WeightVector {
        if player1 {
            &mut self.player1
        } else {
            &mut self.player2
        }
    }
}
