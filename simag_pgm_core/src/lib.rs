//! Exact inference over discrete Bayesian networks for the simAG framework.
//!
//! Networks are factorized into one flat table (`Factor`) per vertex and
//! queried with sum-product variable elimination:
//!
//! ```no_run
//! use simag_pgm_core::{DiscreteNetwork, Evidence, Factorization};
//!
//! let network = DiscreteNetwork::load("network.json").unwrap();
//! let mut fact = Factorization::new(&network).unwrap();
//! let mut evidence = Evidence::new();
//! evidence.insert("Q4".to_owned(), "Yes".to_owned());
//! let posterior = fact.cond_prob_ve(&["C"], &evidence).unwrap();
//! println!("{}", posterior);
//! ```

// clippy lints config:
#![allow(unknown_lints)]

mod conf;
mod elimination;
mod errors;
mod factor;
mod network;
mod query;

pub use self::conf::{init_logger, settings, Config};
pub use self::elimination::{condition_factors, eliminate, Evidence, FactorList, Factorization};
pub use self::errors::{ConfigErr, InferenceError, Result, StructuralErr};
pub use self::factor::Factor;
pub use self::network::{Cpt, DiscreteNetwork, Variable, Vertex};
pub use self::query::EventQuery;
