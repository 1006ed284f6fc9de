//! Sum-product variable elimination and evidence conditioning over a list
//! of factors whose product represents the joint distribution.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{Result, StructuralErr};
use crate::factor::Factor;
use crate::network::{DiscreteNetwork, Variable};

pub type FactorList = Vec<Factor>;

/// Observed outcome for each evidence variable.
pub type Evidence = HashMap<String, String>;

/// Eliminates every variable of `order` from `factors`, in that order, and
/// returns the product of the remaining factors.
///
/// Products are computed in place on the factors taken out of the list, the
/// list is owned by this call.
pub fn eliminate<S: AsRef<str>>(mut factors: FactorList, order: &[S]) -> Result<Factor> {
    for var in order {
        let var = var.as_ref();
        let (mentioning, rest): (FactorList, FactorList) =
            factors.into_iter().partition(|f| f.contains(var));
        factors = rest;

        let mut mentioning = mentioning.into_iter();
        let mut product = match mentioning.next() {
            Some(f) => f,
            None => {
                log::trace!("no factor mentions `{}`, skipping", var);
                continue;
            }
        };
        for f in mentioning {
            product.multiply(&f)?;
        }
        product.reduce(var, None)?;
        log::trace!("eliminated `{}`: {}", var, product);
        factors.push(product);
    }

    let mut remaining = factors.into_iter();
    let mut result = remaining.next().ok_or(StructuralErr::EmptyFactorList)?;
    for f in remaining {
        result.multiply(&f)?;
    }
    Ok(result)
}

/// Replaces every factor mentioning an evidence variable by its restriction
/// to the observed outcome.
///
/// Factors left with an empty scope are dropped: the constant they hold
/// cancels out once the final result is normalized, so unnormalized totals
/// computed from the returned list do not preserve scale.
pub fn condition_factors(factors: FactorList, evidence: &Evidence) -> Result<FactorList> {
    let mut factors = factors;
    for (var, value) in evidence {
        factors = factors
            .into_iter()
            .filter_map(|mut f| {
                if !f.contains(var) {
                    return Some(Ok(f));
                }
                match f.reduce(var, Some(value.as_str())) {
                    Ok(()) if f.is_scalar() => {
                        log::trace!("dropping constant factor {} after observing `{}`", f, var);
                        None
                    }
                    Ok(()) => Some(Ok(f)),
                    Err(err) => Some(Err(err)),
                }
            })
            .collect::<Result<FactorList>>()?;
    }
    Ok(factors)
}

/// Factorized representation of a discrete Bayesian network: one factor per
/// vertex, kept pristine, plus a working copy that conditioning and
/// elimination operate on.
#[derive(Debug, Clone)]
pub struct Factorization {
    pub(crate) variables: HashMap<String, Arc<Variable>>,
    pub(crate) order: Vec<String>,
    original: FactorList,
    factors: FactorList,
}

impl Factorization {
    pub fn new(network: &DiscreteNetwork) -> Result<Factorization> {
        let order: Vec<String> = network.vertices()?.into_iter().map(str::to_owned).collect();
        let mut variables = HashMap::with_capacity(order.len());
        let mut original = Vec::with_capacity(order.len());
        for name in &order {
            variables.insert(name.clone(), network.variable(name)?.clone());
            original.push(Factor::from_vertex(network, name)?);
        }
        log::debug!("factorized network with {} vertices", original.len());
        Ok(Factorization {
            variables,
            order,
            factors: original.clone(),
            original,
        })
    }

    /// Working factor list.
    #[inline]
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Vertices in topological order.
    #[inline]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn variable(&self, name: &str) -> Result<&Arc<Variable>> {
        self.variables
            .get(name)
            .ok_or_else(|| StructuralErr::UnknownVariable(name.to_owned()).into())
    }

    /// Discards any conditioning or elimination applied to the working list.
    pub fn refresh(&mut self) {
        self.factors = self.original.clone();
    }

    /// Conditions the factor list on `evidence`.
    ///
    /// With `reset_first` conditioning starts from the pristine factors,
    /// otherwise from the working list, where already observed variables are
    /// no longer in scope and are left untouched. With `in_place` the result
    /// also replaces the working list.
    pub fn condition(
        &mut self,
        evidence: &Evidence,
        in_place: bool,
        reset_first: bool,
    ) -> Result<FactorList> {
        self.check_evidence(evidence)?;
        let start = if reset_first {
            self.original.clone()
        } else {
            self.factors.clone()
        };
        let conditioned = condition_factors(start, evidence)?;
        log::debug!(
            "conditioned on {} observations, {} factors left",
            evidence.len(),
            conditioned.len()
        );
        if in_place {
            self.factors = conditioned.clone();
        }
        Ok(conditioned)
    }

    /// Runs variable elimination over the working list; the working list is
    /// replaced by the resulting factor.
    ///
    /// On error the working list is left empty until the next `refresh`.
    pub fn sum_product_ve<S: AsRef<str>>(&mut self, order: &[S]) -> Result<Factor> {
        let factors = std::mem::take(&mut self.factors);
        let result = eliminate(factors, order)?;
        self.factors = vec![result.clone()];
        Ok(result)
    }

    pub(crate) fn check_evidence(&self, evidence: &Evidence) -> Result<()> {
        for (var, value) in evidence {
            self.variable(var)?.index_of(value)?;
        }
        Ok(())
    }
}
