//! Product and reduction of factors.
//!
//! Cf. Koller & Friedman, 297 (sum-out) and 359 (factor product).

use rayon::prelude::*;
use smallvec::smallvec;

use super::{strides, Dims, Factor};
use crate::conf;
use crate::errors::{Result, StructuralErr};

impl Factor {
    /// Multiplies this factor by `other` in place.
    ///
    /// The resulting scope is this factor's scope followed by the variables
    /// of `other` not already present; `other` is left unchanged.
    pub fn multiply(&mut self, other: &Factor) -> Result<()> {
        self.multiply_with(other, conf::settings().par_threshold)
    }

    /// Products with at least `par_threshold` entries are computed on the
    /// rayon thread pool.
    pub(crate) fn multiply_with(&mut self, other: &Factor, par_threshold: usize) -> Result<()> {
        let mut scope = self.scope.clone();
        let mut card = self.card.clone();
        for (var, &c) in other.scope.iter().zip(&other.card) {
            match self.position(var.name()) {
                Some(pos) if self.card[pos] != c => {
                    return Err(StructuralErr::CardinalityMismatch {
                        var: var.name().to_owned(),
                        left: self.card[pos],
                        right: c,
                    }
                    .into());
                }
                Some(_) => {}
                None => {
                    scope.push(var.clone());
                    card.push(c);
                }
            }
        }

        let lhs: Dims = scope
            .iter()
            .map(|v| self.stride(v.name()).unwrap_or(0))
            .collect();
        let rhs: Dims = scope
            .iter()
            .map(|v| other.stride(v.name()).unwrap_or(0))
            .collect();
        let total: usize = card.iter().product();

        let (lhs_vals, rhs_vals) = (&self.values, &other.values);
        let values = if total >= par_threshold {
            (0..total)
                .into_par_iter()
                .map(|i| {
                    let (mut j, mut k, mut rem) = (0, 0, i);
                    for l in 0..card.len() {
                        let digit = rem % card[l];
                        rem /= card[l];
                        j += digit * lhs[l];
                        k += digit * rhs[l];
                    }
                    lhs_vals[j] * rhs_vals[k]
                })
                .collect()
        } else {
            product_walk(lhs_vals, rhs_vals, &card, &lhs, &rhs, total)
        };

        self.stride = strides(&card);
        self.card = card;
        self.scope = scope;
        self.values = values;
        Ok(())
    }

    /// Returns the product of this factor and `other`, leaving both unchanged.
    pub fn product(&self, other: &Factor) -> Result<Factor> {
        let mut product = self.clone();
        product.multiply(other)?;
        Ok(product)
    }

    /// Removes `var` from the scope in place.
    ///
    /// Without a value every entry is summed over the outcomes of `var`
    /// (marginalization), otherwise only the entries where `var` takes the
    /// given outcome are kept (evidence selection).
    pub fn reduce(&mut self, var: &str, value: Option<&str>) -> Result<()> {
        self.reduce_with(var, value, conf::settings().par_threshold)
    }

    pub(crate) fn reduce_with(
        &mut self,
        var: &str,
        value: Option<&str>,
        par_threshold: usize,
    ) -> Result<()> {
        let pos = self
            .position(var)
            .ok_or_else(|| StructuralErr::MissingScopeVar {
                var: var.to_owned(),
            })?;
        let vstride = self.stride[pos];
        let vcard = self.card[pos];
        let selected = match value {
            Some(label) => Some(self.scope[pos].index_of(label)?),
            None => None,
        };

        let values = &self.values;
        let entry = |i: usize| -> f64 {
            let low = i % vstride;
            let base = (i - low) * vcard + low;
            match selected {
                Some(idx) => values[base + idx * vstride],
                None => (0..vcard).map(|h| values[base + h * vstride]).sum(),
            }
        };
        let out_len = values.len() / vcard;
        let reduced: Vec<f64> = if out_len >= par_threshold {
            (0..out_len).into_par_iter().map(entry).collect()
        } else {
            (0..out_len).map(entry).collect()
        };

        self.values = reduced;
        self.scope.remove(pos);
        self.card.remove(pos);
        self.stride.remove(pos);
        for s in &mut self.stride[pos..] {
            *s /= vcard;
        }
        Ok(())
    }

    /// Returns a copy of this factor with `var` summed out.
    pub fn sum_out(&self, var: &str) -> Result<Factor> {
        let mut reduced = self.clone();
        reduced.reduce(var, None)?;
        Ok(reduced)
    }

    /// Returns a copy of this factor restricted to `var == value`.
    pub fn select(&self, var: &str, value: &str) -> Result<Factor> {
        let mut reduced = self.clone();
        reduced.reduce(var, Some(value))?;
        Ok(reduced)
    }
}

/// Walks every assignment of the joined scope with a mixed radix counter,
/// keeping the offsets into both operands in step.
fn product_walk(
    lhs_vals: &[f64],
    rhs_vals: &[f64],
    card: &[usize],
    lhs: &[usize],
    rhs: &[usize],
    total: usize,
) -> Vec<f64> {
    let mut assignment: Dims = smallvec![0; card.len()];
    let mut values = Vec::with_capacity(total);
    let (mut j, mut k) = (0, 0);
    for _ in 0..total {
        values.push(lhs_vals[j] * rhs_vals[k]);
        for l in 0..card.len() {
            assignment[l] += 1;
            if assignment[l] == card[l] {
                assignment[l] = 0;
                j -= (card[l] - 1) * lhs[l];
                k -= (card[l] - 1) * rhs[l];
            } else {
                j += lhs[l];
                k += rhs[l];
                break;
            }
        }
    }
    values
}
