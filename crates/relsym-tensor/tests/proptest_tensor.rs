//! Property tests for tensor construction and index configurations

use proptest::prelude::*;
use relsym_tensor::{IndexConfig, Nested, SymArray, SymExpr, Tensor, TensorError};

fn arb_component() -> impl Strategy<Value = SymExpr> {
    prop_oneof![
        (-9i64..9).prop_map(SymExpr::int),
        prop::sample::select(vec!["t", "r", "theta", "phi", "a"]).prop_map(SymExpr::var),
        (1i64..4, prop::sample::select(vec!["r", "theta"]))
            .prop_map(|(n, v)| SymExpr::var(v).powi(n)),
    ]
}

/// Shape of rank 0 to 3 with small dimensions, and matching flat data
fn arb_array() -> impl Strategy<Value = (Vec<usize>, Vec<SymExpr>)> {
    prop::collection::vec(1usize..4, 0..4).prop_flat_map(|shape| {
        let len = shape.iter().product::<usize>();
        (Just(shape), prop::collection::vec(arb_component(), len))
    })
}

fn nest(shape: &[usize], data: &[SymExpr]) -> Nested {
    match shape.split_first() {
        None => Nested::Leaf(data[0].clone()),
        Some((&len, rest)) => {
            let stride: usize = rest.iter().product();
            Nested::List(
                (0..len)
                    .map(|i| nest(rest, &data[i * stride..(i + 1) * stride]))
                    .collect(),
            )
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Nested input and native array input give the same components
    #[test]
    fn construction_sources_agree((shape, data) in arb_array()) {
        let from_nested = Tensor::new(nest(&shape, &data)).unwrap();
        let arr = SymArray::from_shape_vec(shape.clone(), data.clone()).unwrap();
        let from_array = Tensor::new(arr.clone()).unwrap();
        prop_assert_eq!(from_nested.tensor(), from_array.tensor());
        for (idx, expected) in arr.indexed_iter() {
            prop_assert_eq!(&from_nested[&idx[..]], expected);
        }
    }

    /// order equals rank and the default config has one lower index per order
    #[test]
    fn order_matches_rank((shape, data) in arb_array()) {
        let t = Tensor::new(SymArray::from_shape_vec(shape.clone(), data).unwrap()).unwrap();
        prop_assert_eq!(t.order(), shape.len());
        prop_assert_eq!(t.config().len(), t.order());
        prop_assert!(t.config().to_string().chars().all(|c| c == 'l'));
    }

    /// Any string of l/u of the right length is accepted and round-trips
    #[test]
    fn valid_configs_accepted(config in "[lu]{0,4}") {
        let order = config.len();
        let t = Tensor::with_config(
            SymArray::from_shape_vec(vec![2; order], vec![SymExpr::int(1); 1 << order]).unwrap(),
            &config,
        ).unwrap();
        prop_assert_eq!(t.config().to_string(), config);
    }

    /// A single foreign character anywhere invalidates the config
    #[test]
    fn foreign_character_rejected(
        prefix in "[lu]{0,3}",
        bad in "[a-km-tv-zA-Z0-9]",
        suffix in "[lu]{0,3}",
    ) {
        let config = format!("{prefix}{bad}{suffix}");
        let err = IndexConfig::parse(&config).unwrap_err();
        let is_invalid_index = matches!(
            err,
            TensorError::InvalidIndex { position, .. } if position == prefix.len()
        );
        prop_assert!(is_invalid_index);
    }

    /// Display and Debug never show addresses
    #[test]
    fn no_addresses_in_output((shape, data) in arb_array()) {
        let t = Tensor::new(SymArray::from_shape_vec(shape, data).unwrap()).unwrap();
        prop_assert!(!t.to_string().contains("0x"));
        let debug = format!("{:?}", t);
        prop_assert!(!debug.contains("0x"));
    }
}
