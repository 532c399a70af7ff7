use debt_settle::config::LedgerConfig;
use debt_settle::domain::{ParticipantId, DEFAULT_EPSILON};
use debt_settle::optimizer::{DebtSettler, GoodLpSolver, SchemeKind, SettlementOptions};
use debt_settle::report::{render_text, AmountDisplay, Rounding, BANNER};
use debt_settle::SettlementError;
use rstest::rstest;
use strum::IntoEnumIterator;

use super::common::{assert_conserves, settle, SIX_PARTY_BALANCES};

#[rstest]
#[case::full(SchemeKind::Full)]
#[case::directional(SchemeKind::Directional)]
#[case::triangular(SchemeKind::Triangular)]
fn two_participants_settle_in_one_payment(#[case] scheme: SchemeKind) {
    let plan = settle(&[-100.0, 100.0], scheme);

    assert_eq!(plan.transaction_count, 1);
    assert_eq!(plan.payments.len(), 1);
    assert_eq!(plan.payments[0].payer, ParticipantId(0));
    assert_eq!(plan.payments[0].payee, ParticipantId(1));
    assert!((plan.payments[0].amount - 100.0).abs() < 1e-6);

    let text = render_text(&plan, &AmountDisplay::default());
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![BANNER, "Total number of payments: 1", "P1 owes 100 to P2"]
    );
}

#[rstest]
#[case::full(SchemeKind::Full)]
#[case::directional(SchemeKind::Directional)]
#[case::triangular(SchemeKind::Triangular)]
fn zero_balances_need_no_payments(#[case] scheme: SchemeKind) {
    let plan = settle(&[0.0, 0.0, 0.0], scheme);
    assert_eq!(plan.transaction_count, 0);
    assert!(plan.payments.is_empty());
    assert!(plan.objective_value.abs() < 1e-9);
    assert_eq!(plan.big_m, 0.0);
}

#[rstest]
#[case::full(SchemeKind::Full)]
#[case::directional(SchemeKind::Directional)]
#[case::triangular(SchemeKind::Triangular)]
fn residue_within_epsilon_still_settles(#[case] scheme: SchemeKind) {
    let plan = settle(&[-100.0, 100.0000005], scheme);
    assert_eq!(plan.transaction_count, 1);
    assert_eq!(plan.payments.len(), 1);
    assert!((plan.payments[0].amount - 100.0).abs() < 1e-6);
    assert_conserves(&plan, 1e-6);

    let ledger = LedgerConfig {
        labels: Vec::new(),
        balances: vec![-100.0, 60.0, 40.004],
        epsilon: 0.005,
    };
    let plan = DebtSettler::new(
        Box::new(GoodLpSolver),
        SettlementOptions {
            scheme,
            ..SettlementOptions::default()
        },
    )
    .settle_ledger(&ledger)
    .unwrap_or_else(|e| panic!("{scheme}: {e}"));
    assert_eq!(plan.transaction_count, 2);
    assert_conserves(&plan, 1e-6);
}

#[rstest]
#[case::full(SchemeKind::Full)]
#[case::directional(SchemeKind::Directional)]
#[case::triangular(SchemeKind::Triangular)]
fn dust_balances_need_no_payments(#[case] scheme: SchemeKind) {
    let plan = settle(&[-1e-7, 1e-7], scheme);
    assert_eq!(plan.transaction_count, 0);
    assert!(plan.payments.is_empty());
    assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    assert_eq!(
        render_text(&plan, &AmountDisplay::default()).lines().nth(1),
        Some("Total number of payments: 0")
    );
}

#[rstest]
#[case::full(SchemeKind::Full, 2)]
#[case::directional(SchemeKind::Directional, 1)]
#[case::triangular(SchemeKind::Triangular, 1)]
fn six_party_ledger_minimum_is_shared_by_all_schemes(
    #[case] scheme: SchemeKind,
    #[case] redundancy: usize,
) {
    // No proper subset of these balances sums to zero, so the six
    // participants form one component and need five payments.
    let plan = settle(&SIX_PARTY_BALANCES, scheme);

    assert_eq!(plan.transaction_count, 5);
    assert_eq!(plan.payments.len(), 5);
    assert_eq!(plan.objective_value.round() as usize, redundancy * plan.payments.len());
    assert_conserves(&plan, 1e-4);
    assert!((plan.big_m - 2140.48).abs() < 1e-9);
}

#[test]
fn independent_pairs_are_settled_separately() {
    // {P1, P2} and {P3, P4} cancel internally
    for scheme in SchemeKind::iter() {
        let plan = settle(&[-25.0, 25.0, 40.0, -40.0], scheme);
        assert_eq!(plan.transaction_count, 2, "{scheme}");
        assert_conserves(&plan, 1e-6);
    }
}

#[test]
fn directional_payments_run_from_losers_to_winners() {
    let plan = settle(&SIX_PARTY_BALANCES, SchemeKind::Directional);
    for payment in &plan.payments {
        assert!(SIX_PARTY_BALANCES[payment.payer.index()] < 0.0);
        assert!(SIX_PARTY_BALANCES[payment.payee.index()] > 0.0);
    }
}

#[test]
fn truncated_report_drops_sub_unit_amounts() {
    let plan = settle(&[-414.80, 414.80], SchemeKind::Triangular);
    let display = AmountDisplay {
        rounding: Rounding::Truncate,
        decimals: 0,
    };
    assert!(render_text(&plan, &display).contains("P1 owes 414 to P2"));
}

#[test]
fn labelled_ledger_flows_into_report() {
    let ledger = LedgerConfig {
        labels: vec!["ana".into(), "ben".into(), "cleo".into()],
        balances: vec![-30.0, 10.0, 20.0],
        epsilon: DEFAULT_EPSILON,
    };
    let plan = DebtSettler::default().settle_ledger(&ledger).unwrap();
    let text = render_text(&plan, &AmountDisplay::default());
    assert!(text.contains("ana owes 10 to ben"), "{text}");
    assert!(text.contains("ana owes 20 to cleo"), "{text}");
}

#[test]
fn unbalanced_ledger_is_rejected() {
    let ledger = LedgerConfig {
        labels: Vec::new(),
        balances: vec![-643.16, 643.15],
        epsilon: DEFAULT_EPSILON,
    };
    let err = DebtSettler::default().settle_ledger(&ledger).unwrap_err();
    assert!(matches!(err, SettlementError::InfeasibleInput { .. }));
}
