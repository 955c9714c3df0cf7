//! The bracketed 3-symbol notation for rating vectors.
//!
//! A vector serializes as `<S1S2S3>` with one symbol per axis in the fixed
//! order expressiveness, dependency-flow, error-surface — e.g. `<RLG>`.
//! Parsing accepts only symbols from the correct per-position alphabet and
//! round-trips exactly with formatting.

use std::fmt;

use thiserror::Error;

use crate::axes::{Axis, State};
use crate::types::{AxisRating, RatingVector};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("notation must be '<' followed by three symbols and '>', got {got:?}")]
    Malformed { got: String },

    #[error("{symbol:?} is not a {axis} symbol (expected one of {alphabet:?})")]
    UnknownSymbol {
        axis: Axis,
        symbol: char,
        alphabet: String,
    },
}

/// Format a vector as its `<S1S2S3>` notation string.
pub fn format(vector: &RatingVector) -> String {
    let mut out = String::with_capacity(5);
    out.push('<');
    for axis in Axis::ALL {
        out.push(axis.symbol(vector.state(axis)));
    }
    out.push('>');
    out
}

/// Parse a `<S1S2S3>` notation string into a rating vector.
///
/// The result carries bare states: confidence and rationale do not survive
/// the notation form. Surrounding whitespace is tolerated; anything else is
/// a parse error, never a best-effort guess.
pub fn parse(input: &str) -> Result<RatingVector, NotationError> {
    let trimmed = input.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() != 5 || chars[0] != '<' || chars[4] != '>' {
        return Err(NotationError::Malformed {
            got: trimmed.to_string(),
        });
    }

    let mut states = [State::MIN; 3];
    for (position, axis) in Axis::ALL.into_iter().enumerate() {
        let symbol = chars[position + 1];
        states[position] =
            axis.state_for_symbol(symbol)
                .ok_or_else(|| NotationError::UnknownSymbol {
                    axis,
                    symbol,
                    alphabet: axis.alphabet(),
                })?;
    }

    let [e, d, s] = states;
    Ok(RatingVector::new(
        AxisRating::new(e),
        AxisRating::new(d),
        AxisRating::new(s),
    ))
}

impl fmt::Display for RatingVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self))
    }
}
