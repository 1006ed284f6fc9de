//! Posterior queries answered by variable elimination.

use std::collections::{HashMap, HashSet};

use crate::elimination::{Evidence, Factorization};
use crate::errors::{Result, StructuralErr};
use crate::factor::Factor;

/// Accepted outcomes for each queried variable: outcomes of one variable are
/// alternatives, and every queried variable must take one of its accepted
/// outcomes.
pub type EventQuery = HashMap<String, Vec<String>>;

impl Factorization {
    /// Computes the posterior joint distribution of the `query` variables
    /// given `evidence`.
    ///
    /// Every vertex neither queried nor observed is eliminated, in
    /// topological order. The result is normalized and its scope is exactly
    /// the query variables. The working list is refreshed before and after
    /// the query.
    pub fn cond_prob_ve<S: AsRef<str>>(&mut self, query: &[S], evidence: &Evidence) -> Result<Factor> {
        let query: HashSet<&str> = query.iter().map(AsRef::as_ref).collect();
        self.check_query(query.iter().copied(), evidence)?;

        let eliminate: Vec<String> = self
            .order
            .iter()
            .filter(|v| !query.contains(v.as_str()) && !evidence.contains_key(v.as_str()))
            .cloned()
            .collect();

        self.refresh();
        let result = self
            .condition(evidence, true, false)
            .and_then(|_| self.sum_product_ve(eliminate.as_slice()));
        self.refresh();

        let mut result = result?;
        result.normalize()?;
        log::debug!("posterior: {}", result);
        Ok(result)
    }

    /// Probability that every queried variable takes one of its accepted
    /// outcomes, given `evidence`.
    pub fn specific_query(&mut self, query: &EventQuery, evidence: &Evidence) -> Result<f64> {
        self.check_query(query.keys().map(String::as_str), evidence)?;
        let mut accepted: HashMap<&str, Vec<usize>> = HashMap::with_capacity(query.len());
        for (var, labels) in query {
            let variable = self.variable(var)?;
            let mut idxs = labels
                .iter()
                .map(|l| variable.index_of(l))
                .collect::<Result<Vec<_>>>()?;
            idxs.sort_unstable();
            idxs.dedup();
            accepted.insert(var.as_str(), idxs);
        }

        let names: Vec<&str> = query.keys().map(String::as_str).collect();
        let dist = self.cond_prob_ve(names.as_slice(), evidence)?;

        let mut dims = Vec::with_capacity(dist.scope_vars().len());
        for var in dist.scope_vars() {
            let stride = dist.stride(var.name()).unwrap_or(0);
            let idxs = accepted.get(var.name()).ok_or_else(|| {
                StructuralErr::MissingScopeVar {
                    var: var.name().to_owned(),
                }
            })?;
            dims.push((stride, idxs.as_slice()));
        }
        Ok(sum_entries(&dims, 0, dist.values()))
    }

    fn check_query<'a, I>(&self, query: I, evidence: &Evidence) -> Result<()>
    where
        I: Iterator<Item = &'a str>,
    {
        self.check_evidence(evidence)?;
        let mut empty = true;
        for var in query {
            empty = false;
            self.variable(var)?;
            if evidence.contains_key(var) {
                return Err(StructuralErr::QueryIsEvidence(var.to_owned()).into());
            }
        }
        if empty {
            return Err(StructuralErr::EmptyQuery.into());
        }
        Ok(())
    }
}

/// Sums the values at every combination of one accepted index per variable.
fn sum_entries(dims: &[(usize, &[usize])], offset: usize, values: &[f64]) -> f64 {
    match dims.split_first() {
        None => values[offset],
        Some(((stride, idxs), rest)) => idxs
            .iter()
            .map(|i| sum_entries(rest, offset + i * stride, values))
            .sum(),
    }
}
