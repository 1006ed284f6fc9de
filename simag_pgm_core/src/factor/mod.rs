//! Flattened probability tables.
//!
//! A `Factor` stores the values of a table over its scope variables in a
//! single array using a mixed radix encoding: the first scope variable is
//! the least significant digit, and the stride of every other variable is
//! the product of the cardinalities of the variables before it.

mod algebra;

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::errors::{InferenceError, Result, StructuralErr};
use crate::network::{Cpt, DiscreteNetwork, ParentOutcomes, Variable};

pub(crate) type Dims = SmallVec<[usize; 8]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    values: Vec<f64>,
    scope: Vec<Arc<Variable>>,
    card: Dims,
    stride: Dims,
}

impl Factor {
    /// Builds the factor of a network vertex from its table.
    ///
    /// The scope is the vertex followed by its parents in reverse declaration
    /// order, so the vertex outcome is the fastest varying index and the
    /// first declared parent the slowest.
    pub fn from_vertex(network: &DiscreteNetwork, name: &str) -> Result<Factor> {
        let vertex = network.vertex(name)?;
        network.validate_vertex(vertex)?;
        let parents = network.parent_variables(vertex)?;

        let values = match vertex.cpt() {
            Cpt::Unconditional(row) => row.clone(),
            Cpt::Conditional(rows) => {
                let mut values = Vec::with_capacity(
                    vertex.variable().cardinality()
                        * parents.iter().map(|p| p.cardinality()).product::<usize>(),
                );
                for key in ParentOutcomes::new(&parents) {
                    // presence of every row was checked by the validation above
                    if let Some(row) = rows.get(&key) {
                        values.extend_from_slice(row);
                    }
                }
                values
            }
        };

        let scope: Vec<Arc<Variable>> = std::iter::once(vertex.variable())
            .chain(parents.into_iter().rev())
            .cloned()
            .collect();
        Ok(Factor::with_scope(values, scope))
    }

    /// A factor with an empty scope holding a single value.
    pub fn scalar(value: f64) -> Factor {
        Factor {
            values: vec![value],
            scope: Vec::new(),
            card: Dims::new(),
            stride: Dims::new(),
        }
    }

    /// Builds a factor from its flat values and ordered scope.
    pub fn new(values: Vec<f64>, scope: Vec<Arc<Variable>>) -> Result<Factor> {
        for (i, var) in scope.iter().enumerate() {
            if scope[..i].iter().any(|v| v.name() == var.name()) {
                return Err(StructuralErr::DuplicateVariable(var.name().to_owned()).into());
            }
        }
        let expected: usize = scope.iter().map(|v| v.cardinality()).product();
        if values.len() != expected {
            return Err(StructuralErr::ValuesLength {
                scope: scope.iter().map(|v| v.name().to_owned()).collect(),
                expected,
                found: values.len(),
            }
            .into());
        }
        Ok(Factor::with_scope(values, scope))
    }

    fn with_scope(values: Vec<f64>, scope: Vec<Arc<Variable>>) -> Factor {
        let card: Dims = scope.iter().map(|v| v.cardinality()).collect();
        let stride = strides(&card);
        Factor {
            values,
            scope,
            card,
            stride,
        }
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Names of the scope variables, in encoding order.
    pub fn scope(&self) -> Vec<&str> {
        self.scope.iter().map(|v| v.name()).collect()
    }

    #[inline]
    pub fn scope_vars(&self) -> &[Arc<Variable>] {
        &self.scope
    }

    #[inline]
    pub fn contains(&self, var: &str) -> bool {
        self.position(var).is_some()
    }

    pub fn variable(&self, var: &str) -> Option<&Arc<Variable>> {
        self.position(var).map(|pos| &self.scope[pos])
    }

    pub fn cardinality(&self, var: &str) -> Option<usize> {
        self.position(var).map(|pos| self.card[pos])
    }

    pub fn stride(&self, var: &str) -> Option<usize> {
        self.position(var).map(|pos| self.stride[pos])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the scope is empty and the factor degenerated to a constant.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Value for a full assignment of the scope, given as `(variable, label)`
    /// pairs. Pairs for variables outside the scope are ignored.
    pub fn value_at(&self, assignment: &[(&str, &str)]) -> Result<f64> {
        let mut idx = 0;
        for (var, stride) in self.scope.iter().zip(&self.stride) {
            let label = assignment
                .iter()
                .find(|(name, _)| *name == var.name())
                .map(|(_, label)| *label)
                .ok_or_else(|| StructuralErr::MissingAssignment {
                    var: var.name().to_owned(),
                })?;
            idx += var.index_of(label)? * stride;
        }
        Ok(self.values[idx])
    }

    /// Divides every value by the sum of all values.
    pub fn normalize(&mut self) -> Result<()> {
        let total = self.sum();
        if total == 0.0 || !total.is_finite() {
            return Err(InferenceError::Arithmetic(format!(
                "cannot normalize factor over {:?}, sum of values is {}",
                self.scope(),
                total
            )));
        }
        self.values.iter_mut().for_each(|v| *v /= total);
        Ok(())
    }

    #[inline]
    fn position(&self, var: &str) -> Option<usize> {
        self.scope.iter().position(|v| v.name() == var)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Factor({})", self.scope().join(", "))?;
        write!(f, "{:?}", self.values)
    }
}

fn strides(card: &[usize]) -> Dims {
    let mut t_stride = 1;
    card.iter()
        .map(|c| {
            let s = t_stride;
            t_stride *= c;
            s
        })
        .collect()
}
