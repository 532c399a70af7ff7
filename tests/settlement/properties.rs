use debt_settle::domain::{BalanceStore, DEFAULT_EPSILON};
use debt_settle::optimizer::{
    GoodLpSolver, MilpSolver, ModelBuilder, ResultDecoder, SchemeKind,
};
use proptest::prelude::*;
use strum::IntoEnumIterator;

use super::common::{assert_conserves, min_transactions, settle};

/// Zero-sum ledgers of 2..=5 participants in whole cents, with zeros and
/// repeated magnitudes showing up often enough to create cancelling groups.
fn ledger_cents() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(
        prop_oneof![
            1 => Just(0i64),
            2 => prop::sample::select(vec![-500i64, -250, 250, 500]),
            4 => -90_000i64..90_000,
        ],
        1..=4,
    )
    .prop_map(|mut cents| {
        let total: i64 = cents.iter().sum();
        cents.push(-total);
        cents
    })
}

fn to_currency(cents: &[i64]) -> Vec<f64> {
    cents.iter().map(|&c| c as f64 / 100.0).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn schemes_agree_on_the_optimum(cents in ledger_cents()) {
        let balances = to_currency(&cents);
        let expected = min_transactions(&cents);

        for scheme in SchemeKind::iter() {
            let plan = settle(&balances, scheme);
            prop_assert_eq!(plan.transaction_count, expected, "scheme {}", scheme);
            prop_assert_eq!(plan.payments.len(), expected, "scheme {}", scheme);
            assert_conserves(&plan, 1e-4);
        }
    }

    #[test]
    fn objective_counts_each_payment_per_redundancy(cents in ledger_cents()) {
        let balances = to_currency(&cents);
        for scheme in SchemeKind::iter() {
            let plan = settle(&balances, scheme);
            let factor = scheme.scheme().redundancy_factor() as usize;
            prop_assert_eq!(plan.objective_value.round() as usize, factor * plan.payments.len());
        }
    }

    #[test]
    fn decoding_the_same_solution_is_stable(cents in ledger_cents()) {
        let store = BalanceStore::from_balances(&to_currency(&cents), DEFAULT_EPSILON).unwrap();
        let scheme = SchemeKind::Triangular.scheme();
        let built = ModelBuilder::new(&store, scheme.as_ref()).build();
        let solution = GoodLpSolver.solve(&built.model, None).unwrap();

        let decoder = ResultDecoder::default();
        let first = decoder.decode(&store, &built, &solution).unwrap();
        let second = decoder.decode(&store, &built, &solution).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn non_zero_sum_is_rejected_before_solving(
        cents in ledger_cents(),
        residue in prop_oneof![-10_000i64..-1, 1i64..10_000],
    ) {
        let mut balances = to_currency(&cents);
        balances[0] += residue as f64 / 100.0;
        prop_assert!(BalanceStore::from_balances(&balances, DEFAULT_EPSILON).is_err());
    }
}
