//! SimAg PGM
//!
//! Exact posterior queries over discrete Bayesian networks from the command line.
//!
//! ```text
//! simag-pgm <network.json> --query C [--query Q1=A1.1,A1.3] [--evidence Q4=Yes]
//! ```
//!
//! When every query comes without outcomes the joint posterior distribution
//! is printed, one line per assignment; otherwise the probability of the
//! event is printed.

use std::collections::HashMap;
use std::process;

use simag_pgm_core::{init_logger, DiscreteNetwork, EventQuery, Evidence, Factor, Factorization};

const USAGE: &str =
    "usage: simag-pgm <network.json> --query VAR[=L1,L2..] ... [--evidence VAR=LABEL ...]";

struct Args {
    network: String,
    query: Vec<(String, Vec<String>)>,
    evidence: Evidence,
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Args, String> {
    let mut argv = argv.into_iter().peekable();
    let network = match argv.next() {
        Some(n) if !n.is_empty() && !n.starts_with("--") => n,
        _ => return Err(USAGE.to_owned()),
    };

    let mut query = Vec::new();
    let mut evidence = HashMap::new();
    while let Some(arg) = argv.next() {
        let opt = match arg.strip_prefix("--") {
            Some(opt) => opt.to_owned(),
            None => return Err(format!("unexpected argument `{}`\n{}", arg, USAGE)),
        };
        let mut values = Vec::new();
        while let Some(val) = argv.next_if(|v| !v.starts_with("--")) {
            values.push(val);
        }
        if opt == "help" || opt == "h" {
            return Err(USAGE.to_owned());
        }
        if values.is_empty() {
            return Err(format!("missing value for `--{}`\n{}", opt, USAGE));
        }
        match opt.as_str() {
            "query" | "q" => {
                for val in values {
                    let mut split = val.splitn(2, '=');
                    let var = split.next().unwrap_or("").to_owned();
                    let labels: Vec<String> = split
                        .next()
                        .map(|l| l.split(',').map(str::to_owned).collect())
                        .unwrap_or_default();
                    query.push((var, labels));
                }
            }
            "evidence" | "e" => {
                for val in values {
                    let mut split = val.splitn(2, '=');
                    match (split.next(), split.next()) {
                        (Some(var), Some(label)) if !var.is_empty() => {
                            evidence.insert(var.to_owned(), label.to_owned());
                        }
                        _ => return Err(format!("invalid evidence `{}`, expected VAR=LABEL", val)),
                    }
                }
            }
            _ => return Err(format!("unknown option `--{}`\n{}", opt, USAGE)),
        }
    }
    if query.is_empty() {
        return Err(USAGE.to_owned());
    }

    Ok(Args {
        network,
        query,
        evidence,
    })
}

fn print_distribution(dist: &Factor) {
    for (i, p) in dist.values().iter().enumerate() {
        let assignment: Vec<String> = dist
            .scope_vars()
            .iter()
            .map(|var| {
                let stride = dist.stride(var.name()).unwrap_or(1);
                let label = &var.domain()[(i / stride) % var.cardinality()];
                format!("{}={}", var.name(), label)
            })
            .collect();
        println!("{}\t{:.6}", assignment.join(" "), p);
    }
}

fn run(args: Args) -> Result<(), String> {
    let network = DiscreteNetwork::load(&args.network).map_err(|err| err.to_string())?;
    let mut fact = Factorization::new(&network).map_err(|err| err.to_string())?;
    log::info!(
        "loaded `{}`: {} vertices, querying {:?} given {:?}",
        args.network,
        network.len(),
        args.query,
        args.evidence
    );

    if args.query.iter().all(|(_, labels)| labels.is_empty()) {
        let vars: Vec<&str> = args.query.iter().map(|(v, _)| v.as_str()).collect();
        let dist = fact
            .cond_prob_ve(vars.as_slice(), &args.evidence)
            .map_err(|err| err.to_string())?;
        print_distribution(&dist);
    } else {
        let mut event = EventQuery::new();
        for (var, labels) in args.query {
            let labels = if labels.is_empty() {
                network
                    .variable(&var)
                    .map_err(|err| err.to_string())?
                    .domain()
                    .to_vec()
            } else {
                labels
            };
            event.entry(var).or_insert_with(Vec::new).extend(labels);
        }
        let p = fact
            .specific_query(&event, &args.evidence)
            .map_err(|err| err.to_string())?;
        println!("{:.6}", p);
    }
    Ok(())
}

fn main() {
    init_logger();
    let res = parse_args(std::env::args().skip(1)).and_then(run);
    if let Err(err) = res {
        eprintln!("{}", err);
        process::exit(1);
    }
}
