//! Discrete Bayesian network description: the variables, their domains and
//! the conditional probability tables of every vertex.
//!
//! The network is plain data for the inference machinery; it can be built
//! programmatically or loaded from the JSON node data format:
//!
//! ```json
//! {
//!     "V": ["C", "Q"],
//!     "E": [["C", "Q"]],
//!     "Vdata": {
//!         "C": { "parents": null, "vals": ["C1", "C2"], "cprob": [0.4, 0.6] },
//!         "Q": {
//!             "parents": ["C"],
//!             "vals": ["yes", "no"],
//!             "cprob": { "['C1']": [0.9, 0.1], "['C2']": [0.2, 0.8] }
//!         }
//!     }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::conf;
use crate::errors::{ConfigErr, InferenceError, Result, StructuralErr};

/// A named discrete random variable with an ordered, immutable domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
    domain: Vec<String>,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S, domain: Vec<String>) -> Result<Variable> {
        let name = name.into();
        if domain.is_empty() {
            return Err(ConfigErr::EmptyDomain { var: name }.into());
        }
        let mut seen = HashSet::with_capacity(domain.len());
        for label in &domain {
            if !seen.insert(label.as_str()) {
                return Err(ConfigErr::DuplicateLabel {
                    var: name,
                    label: label.clone(),
                }
                .into());
            }
        }
        Ok(Variable { name, domain })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// Position of `label` in the domain.
    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.domain
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| InferenceError::domain(&self.name, label))
    }
}

/// Conditional probability table of a vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum Cpt {
    /// Distribution over the vertex domain, for vertices without parents.
    Unconditional(Vec<f64>),
    /// One distribution over the vertex domain per combination of parent
    /// outcomes, keyed by the outcomes in parent declaration order.
    Conditional(HashMap<Vec<String>, Vec<f64>>),
}

#[derive(Debug, Clone)]
pub struct Vertex {
    variable: Arc<Variable>,
    parents: Vec<String>,
    cpt: Cpt,
}

impl Vertex {
    #[inline]
    pub fn name(&self) -> &str {
        self.variable.name()
    }

    #[inline]
    pub fn variable(&self) -> &Arc<Variable> {
        &self.variable
    }

    #[inline]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    #[inline]
    pub fn cpt(&self) -> &Cpt {
        &self.cpt
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscreteNetwork {
    vertices: HashMap<String, Vertex>,
    insertion: Vec<String>,
}

impl DiscreteNetwork {
    pub fn new() -> DiscreteNetwork {
        DiscreteNetwork::default()
    }

    /// Adds a vertex to the network. Parents can be added in any order, the
    /// tables are checked once the network is complete (see
    /// [`validate`](DiscreteNetwork::validate)).
    pub fn add_vertex<S: Into<String>>(
        &mut self,
        name: S,
        domain: Vec<String>,
        parents: Vec<String>,
        cpt: Cpt,
    ) -> Result<()> {
        let variable = Variable::new(name, domain)?;
        if self.vertices.contains_key(variable.name()) {
            return Err(StructuralErr::DuplicateVariable(variable.name().to_owned()).into());
        }
        let name = variable.name().to_owned();
        self.insertion.push(name.clone());
        self.vertices.insert(
            name,
            Vertex {
                variable: Arc::new(variable),
                parents,
                cpt,
            },
        );
        Ok(())
    }

    pub fn vertex(&self, name: &str) -> Result<&Vertex> {
        self.vertices
            .get(name)
            .ok_or_else(|| StructuralErr::UnknownVariable(name.to_owned()).into())
    }

    pub fn variable(&self, name: &str) -> Result<&Arc<Variable>> {
        self.vertex(name).map(Vertex::variable)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.vertices.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex names in topological order, parents before children; ties are
    /// broken by insertion order.
    pub fn vertices(&self) -> Result<Vec<&str>> {
        for name in &self.insertion {
            self.parent_variables(&self.vertices[name.as_str()])?;
        }
        let mut emitted: HashSet<&str> = HashSet::with_capacity(self.len());
        let mut order = Vec::with_capacity(self.len());
        while order.len() < self.insertion.len() {
            let next = self.insertion.iter().find(|name| {
                !emitted.contains(name.as_str())
                    && self.vertices[name.as_str()]
                        .parents
                        .iter()
                        .all(|p| emitted.contains(p.as_str()))
            });
            match next {
                Some(name) => {
                    emitted.insert(name.as_str());
                    order.push(name.as_str());
                }
                None => return Err(StructuralErr::Cycle.into()),
            }
        }
        Ok(order)
    }

    /// Checks every table of the network eagerly and that the graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        for name in &self.insertion {
            self.validate_vertex(&self.vertices[name.as_str()])?;
        }
        self.vertices().map(|_| ())
    }

    pub(crate) fn parent_variables(&self, vertex: &Vertex) -> Result<Vec<&Arc<Variable>>> {
        vertex
            .parents
            .iter()
            .map(|p| {
                self.vertices.get(p).map(Vertex::variable).ok_or_else(|| {
                    ConfigErr::UnknownParent {
                        var: vertex.name().to_owned(),
                        parent: p.clone(),
                    }
                    .into()
                })
            })
            .collect()
    }

    pub(crate) fn validate_vertex(&self, vertex: &Vertex) -> Result<()> {
        let name = vertex.name();
        let mut seen = HashSet::with_capacity(vertex.parents.len());
        for parent in &vertex.parents {
            if parent == name || !seen.insert(parent.as_str()) {
                return Err(ConfigErr::RepeatedParent {
                    var: name.to_owned(),
                    parent: parent.clone(),
                }
                .into());
            }
        }
        let parents = self.parent_variables(vertex)?;
        let card = vertex.variable.cardinality();
        match (&vertex.cpt, parents.is_empty()) {
            (Cpt::Unconditional(row), true) => check_row(name, row, card),
            (Cpt::Conditional(rows), false) => {
                let expected: usize = parents.iter().map(|p| p.cardinality()).product();
                for key in ParentOutcomes::new(&parents) {
                    let row = rows.get(&key).ok_or_else(|| ConfigErr::MissingRow {
                        var: name.to_owned(),
                        key: key.clone(),
                    })?;
                    check_row(name, row, card)?;
                }
                if rows.len() != expected {
                    // every expected key is present, so some other key is not a valid assignment
                    let unexpected = rows
                        .keys()
                        .find(|key| {
                            key.len() != parents.len()
                                || key
                                    .iter()
                                    .zip(&parents)
                                    .any(|(label, p)| p.index_of(label).is_err())
                        })
                        .cloned()
                        .unwrap_or_default();
                    return Err(ConfigErr::UnexpectedRow {
                        var: name.to_owned(),
                        key: unexpected,
                    }
                    .into());
                }
                Ok(())
            }
            _ => Err(ConfigErr::CptKind {
                var: name.to_owned(),
            }
            .into()),
        }
    }

    /// Reads a network in the JSON node data format from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DiscreteNetwork> {
        let source = std::fs::read_to_string(path)?;
        DiscreteNetwork::from_json_str(&source)
    }

    pub fn from_json_str(source: &str) -> Result<DiscreteNetwork> {
        let NetworkData {
            v,
            e: edges,
            vdata: mut vdata,
        } = serde_json::from_str(source)?;
        let names: Vec<String> = match v {
            Some(v) => {
                if v.len() != vdata.len() || v.iter().any(|n| !vdata.contains_key(n)) {
                    return Err(ConfigErr::Malformed(
                        "vertex list `V` does not match the keys of `Vdata`".to_owned(),
                    )
                    .into());
                }
                v
            }
            None => {
                let mut names: Vec<String> = vdata.keys().cloned().collect();
                names.sort();
                names
            }
        };

        let mut network = DiscreteNetwork::new();
        for name in names {
            let vertex = match vdata.remove(&name) {
                Some(v) => v,
                None => {
                    return Err(StructuralErr::DuplicateVariable(name).into());
                }
            };
            if let Some(n) = vertex.numoutcomes {
                if n != vertex.vals.len() {
                    return Err(ConfigErr::Malformed(format!(
                        "`{}` declares {} outcomes but lists {}",
                        name,
                        n,
                        vertex.vals.len()
                    ))
                    .into());
                }
            }
            let cpt = match vertex.cprob {
                CprobData::Flat(row) => Cpt::Unconditional(row),
                CprobData::Table(rows) => {
                    let mut parsed = HashMap::with_capacity(rows.len());
                    for (key, row) in rows {
                        parsed.insert(parse_outcomes_key(&key)?, row);
                    }
                    Cpt::Conditional(parsed)
                }
            };
            network.add_vertex(name, vertex.vals, vertex.parents.unwrap_or_default(), cpt)?;
        }

        if let Some(edges) = edges {
            for (from, to) in edges {
                let child = network.vertex(&to)?;
                if !child.parents.contains(&from) {
                    return Err(ConfigErr::Malformed(format!(
                        "edge {} -> {} is not declared in the parents of `{}`",
                        from, to, to
                    ))
                    .into());
                }
            }
        }

        network.validate()?;
        log::debug!("loaded network with {} vertices", network.len());
        Ok(network)
    }
}

fn check_row(var: &str, row: &[f64], card: usize) -> Result<()> {
    if row.len() != card {
        return Err(ConfigErr::RowLength {
            var: var.to_owned(),
            expected: card,
            found: row.len(),
        }
        .into());
    }
    if let Some(&value) = row.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ConfigErr::ProbabilityRange {
            var: var.to_owned(),
            value,
        }
        .into());
    }
    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > conf::settings().cpt_tolerance {
        return Err(ConfigErr::RowSum {
            var: var.to_owned(),
            sum,
        }
        .into());
    }
    Ok(())
}

/// Iterates every combination of parent outcomes, the first parent being the
/// slowest varying one.
pub(crate) struct ParentOutcomes<'a> {
    parents: &'a [&'a Arc<Variable>],
    counter: Vec<usize>,
    done: bool,
}

impl<'a> ParentOutcomes<'a> {
    pub(crate) fn new(parents: &'a [&'a Arc<Variable>]) -> ParentOutcomes<'a> {
        ParentOutcomes {
            parents,
            counter: vec![0; parents.len()],
            done: false,
        }
    }
}

impl<'a> Iterator for ParentOutcomes<'a> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let key = self
            .counter
            .iter()
            .zip(self.parents)
            .map(|(&i, p)| p.domain()[i].clone())
            .collect();

        self.done = true;
        for (i, p) in self.counter.iter_mut().zip(self.parents).rev() {
            *i += 1;
            if *i == p.cardinality() {
                *i = 0;
            } else {
                self.done = false;
                break;
            }
        }
        Some(key)
    }
}

/// Parses a parent outcomes key of the form `['a', 'b']`.
fn parse_outcomes_key(key: &str) -> Result<Vec<String>> {
    let malformed = || ConfigErr::Malformed(format!("invalid parent outcomes key: {}", key));
    let inner = key
        .trim()
        .strip_prefix('[')
        .and_then(|k| k.strip_suffix(']'))
        .ok_or_else(malformed)?;
    inner
        .split(',')
        .map(|label| {
            let label = label.trim();
            label
                .strip_prefix('\'')
                .and_then(|l| l.strip_suffix('\''))
                .or_else(|| label.strip_prefix('"').and_then(|l| l.strip_suffix('"')))
                .map(str::to_owned)
                .ok_or_else(malformed)
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Into::into)
}

#[derive(Deserialize)]
struct NetworkData {
    #[serde(rename = "V", default)]
    v: Option<Vec<String>>,
    #[serde(rename = "E", default)]
    e: Option<Vec<(String, String)>>,
    #[serde(rename = "Vdata")]
    vdata: HashMap<String, VertexData>,
}

#[derive(Deserialize)]
struct VertexData {
    #[serde(default)]
    parents: Option<Vec<String>>,
    vals: Vec<String>,
    cprob: CprobData,
    #[serde(default)]
    numoutcomes: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CprobData {
    Flat(Vec<f64>),
    Table(HashMap<String, Vec<f64>>),
}
