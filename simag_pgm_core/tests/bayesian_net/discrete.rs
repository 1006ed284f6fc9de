use float_cmp::approx_eq;
use simag_pgm_core::*;

use super::{diagnosis, event, evidence};

#[test]
fn condprobve() {
    init_logger();
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let result = fact
        .cond_prob_ve(&["C"], &evidence(&[("Q4", "Yes")]))
        .unwrap();
    assert_eq!(result.scope(), vec!["C"]);
    let ps = result.values();
    assert!(approx_eq!(f64, ps[0], 0.0853658536585365, epsilon = 1e-12));
    assert!(approx_eq!(f64, ps[1], 0.6585365853658537, epsilon = 1e-12));
    assert!(approx_eq!(f64, ps[2], 0.2560975609756097, epsilon = 1e-12));
}

#[test]
fn condprobve_multiple_evidence() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let result = fact
        .cond_prob_ve(&["C"], &evidence(&[("Q4", "Yes"), ("Q2", "A2.1")]))
        .unwrap();
    let ps = result.values();
    assert!(approx_eq!(f64, ps[0], 0.28378378378378377, epsilon = 1e-12));
    assert!(approx_eq!(f64, ps[1], 0.24324324324324323, epsilon = 1e-12));
    assert!(approx_eq!(f64, ps[2], 0.472972972972973, epsilon = 1e-12));
    assert!(approx_eq!(f64, result.sum(), 1.0, epsilon = 1e-12));
}

#[test]
fn repeated_queries_are_independent() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let ev = evidence(&[("Q4", "Yes")]);
    let first = fact.cond_prob_ve(&["C"], &ev).unwrap();
    let _ = fact
        .cond_prob_ve(&["Q1"], &evidence(&[("Q2", "A2.2")]))
        .unwrap();
    let again = fact.cond_prob_ve(&["C"], &ev).unwrap();
    assert_eq!(first, again);
}

#[test]
fn prior_without_evidence() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let result = fact.cond_prob_ve(&["C"], &Evidence::new()).unwrap();
    let ps = result.values();
    assert!(approx_eq!(f64, ps[0], 0.1, epsilon = 1e-12));
    assert!(approx_eq!(f64, ps[1], 0.6, epsilon = 1e-12));
    assert!(approx_eq!(f64, ps[2], 0.3, epsilon = 1e-12));
}

#[test]
fn specificquery() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let ev = evidence(&[("Q4", "Yes")]);

    let p = fact
        .specific_query(&event(&[("Q1", &["A1.1", "A1.3"])]), &ev)
        .unwrap();
    assert!(approx_eq!(f64, p, 0.5426829268292682, epsilon = 1e-12));

    let p = fact
        .specific_query(&event(&[("Q1", &["A1.2"]), ("Q2", &["A2.2"])]), &ev)
        .unwrap();
    assert!(approx_eq!(f64, p, 0.36036585365853663, epsilon = 1e-12));
}

#[test]
fn specificquery_single_label_matches_distribution() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let ev = evidence(&[("Q4", "Yes")]);
    let dist = fact.cond_prob_ve(&["C"], &ev).unwrap();
    for (i, label) in ["C1", "C2", "C3"].iter().enumerate() {
        let p = fact.specific_query(&event(&[("C", &[*label])]), &ev).unwrap();
        assert!(approx_eq!(f64, p, dist.values()[i], epsilon = 1e-12));
    }
}

#[test]
fn specificquery_full_domain() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let p = fact
        .specific_query(
            &event(&[
                ("C", &["C1", "C2", "C3"]),
                ("Q3", &["A", "B", "Both"]),
            ]),
            &evidence(&[("Q4", "No")]),
        )
        .unwrap();
    assert!(approx_eq!(f64, p, 1.0, epsilon = 1e-12));
}

#[test]
fn observed_constants_are_dropped() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    // p(Q4 = Yes | Q3 = B) is zero, but observing both collapses that factor
    // to a constant which is discarded before normalization
    let both = fact
        .cond_prob_ve(&["C"], &evidence(&[("Q3", "B"), ("Q4", "Yes")]))
        .unwrap();
    let q3 = fact.cond_prob_ve(&["C"], &evidence(&[("Q3", "B")])).unwrap();
    for (x, y) in both.values().iter().zip(q3.values()) {
        assert!(approx_eq!(f64, *x, *y, epsilon = 1e-12));
    }
    assert!(approx_eq!(f64, q3.values()[0], 1.0 / 6.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, q3.values()[2], 0.5, epsilon = 1e-12));
}

#[test]
fn manual_elimination() {
    let mut fact = Factorization::new(&diagnosis()).unwrap();
    let conditioned = fact
        .condition(&evidence(&[("Q4", "Yes")]), true, true)
        .unwrap();
    assert_eq!(conditioned.len(), 5);
    let mut result = fact.sum_product_ve(&["Q1", "Q2", "Q3"]).unwrap();
    result.normalize().unwrap();
    assert!(approx_eq!(
        f64,
        result.values()[1],
        0.6585365853658537,
        epsilon = 1e-12
    ));

    let mut free = eliminate(conditioned, &["Q1", "Q2", "Q3"]).unwrap();
    free.normalize().unwrap();
    assert_eq!(free, result);
}
