use float_cmp::approx_eq;
use simag_pgm_core::*;

use super::{diagnosis, evidence, network_path};

#[test]
fn load_from_file() {
    let net = DiscreteNetwork::load(network_path("diagnosis.json")).unwrap();
    assert_eq!(net.len(), 5);
    assert_eq!(net.vertices().unwrap(), vec!["C", "Q1", "Q2", "Q3", "Q4"]);
    assert_eq!(net.vertex("Q4").unwrap().parents(), &["Q3".to_owned()]);

    let mut from_file = Factorization::new(&net).unwrap();
    let mut by_hand = Factorization::new(&diagnosis()).unwrap();
    let ev = evidence(&[("Q4", "Yes")]);
    let a = from_file.cond_prob_ve(&["C"], &ev).unwrap();
    let b = by_hand.cond_prob_ve(&["C"], &ev).unwrap();
    for (x, y) in a.values().iter().zip(b.values()) {
        assert!(approx_eq!(f64, *x, *y, epsilon = 1e-15));
    }
}

#[test]
fn load_missing_file() {
    assert!(matches!(
        DiscreteNetwork::load(network_path("missing.json")),
        Err(InferenceError::Io(_))
    ));
}

#[test]
fn reject_malformed_json() {
    assert!(matches!(
        DiscreteNetwork::from_json_str("{\"Vdata\": [1, 2]}"),
        Err(InferenceError::Json(_))
    ));
}

#[test]
fn reject_invalid_tables() {
    let source = r#"{
        "Vdata": {
            "a": { "parents": null, "vals": ["x", "y"], "cprob": [0.5, 0.6] }
        }
    }"#;
    assert!(matches!(
        DiscreteNetwork::from_json_str(source),
        Err(InferenceError::Configuration(ConfigErr::RowSum { .. }))
    ));

    let source = r#"{
        "Vdata": {
            "a": { "parents": [], "vals": ["x", "y"], "cprob": [0.5, 0.5] },
            "b": { "parents": ["a"], "vals": ["x"], "cprob": { "x": [1.0], "y": [1.0] } }
        }
    }"#;
    assert!(matches!(
        DiscreteNetwork::from_json_str(source),
        Err(InferenceError::Configuration(ConfigErr::Malformed(_)))
    ));

    let source = r#"{
        "E": [["b", "a"]],
        "Vdata": {
            "a": { "parents": [], "vals": ["x", "y"], "cprob": [0.5, 0.5] },
            "b": { "parents": ["a"], "vals": ["x"], "cprob": { "['x']": [1.0], "['y']": [1.0] } }
        }
    }"#;
    assert!(matches!(
        DiscreteNetwork::from_json_str(source),
        Err(InferenceError::Configuration(ConfigErr::Malformed(_)))
    ));
}

#[test]
fn default_order_without_vertex_list() {
    let source = r#"{
        "Vdata": {
            "b": { "parents": ["a"], "vals": ["x"], "cprob": { "['x']": [1.0], "['y']": [1.0] } },
            "a": { "vals": ["x", "y"], "cprob": [0.25, 0.75] }
        }
    }"#;
    let net = DiscreteNetwork::from_json_str(source).unwrap();
    assert_eq!(net.vertices().unwrap(), vec!["a", "b"]);
    let mut fact = Factorization::new(&net).unwrap();
    let p = fact.cond_prob_ve(&["a"], &evidence(&[("b", "x")])).unwrap();
    assert_eq!(p.values(), &[0.25, 0.75]);
}

#[test]
fn vertex_list_fixes_order() {
    let source = r#"{
        "V": ["b", "a"],
        "Vdata": {
            "a": { "vals": ["x", "y"], "cprob": [0.25, 0.75] },
            "b": { "vals": ["x", "y"], "cprob": [0.5, 0.5] }
        }
    }"#;
    let net = DiscreteNetwork::from_json_str(source).unwrap();
    assert_eq!(net.vertices().unwrap(), vec!["b", "a"]);

    let source = r#"{
        "V": ["a", "c"],
        "Vdata": {
            "a": { "vals": ["x", "y"], "cprob": [0.25, 0.75] },
            "b": { "vals": ["x", "y"], "cprob": [0.5, 0.5] }
        }
    }"#;
    assert!(matches!(
        DiscreteNetwork::from_json_str(source),
        Err(InferenceError::Configuration(ConfigErr::Malformed(_)))
    ));

    let source = r#"{
        "V": ["a", "b"],
        "Vdata": {
            "a": { "vals": ["x", "y"], "cprob": [0.25, 0.75] },
            "b": {
                "parents": ["a", "a"],
                "vals": ["x"],
                "cprob": {
                    "['x', 'x']": [1.0], "['x', 'y']": [1.0],
                    "['y', 'x']": [1.0], "['y', 'y']": [1.0]
                }
            }
        }
    }"#;
    assert!(matches!(
        DiscreteNetwork::from_json_str(source),
        Err(InferenceError::Configuration(ConfigErr::RepeatedParent { .. }))
    ));
}
