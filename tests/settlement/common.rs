use debt_settle::domain::{BalanceStore, DEFAULT_EPSILON};
use debt_settle::optimizer::{DebtSettler, GoodLpSolver, SchemeKind, SettlementOptions, SettlementPlan};

pub const SIX_PARTY_BALANCES: [f64; 6] = [-643.16, -602.16, 414.80, 440.84, 1284.84, -895.16];

pub fn settle(balances: &[f64], scheme: SchemeKind) -> SettlementPlan {
    let store = BalanceStore::from_balances(balances, DEFAULT_EPSILON).expect("balanced ledger");
    DebtSettler::new(
        Box::new(GoodLpSolver),
        SettlementOptions {
            scheme,
            ..SettlementOptions::default()
        },
    )
    .settle(&store)
    .unwrap_or_else(|e| panic!("{scheme} settlement failed: {e}"))
}

/// Net position of every participant after replaying the plan's payments
pub fn replay(plan: &SettlementPlan) -> Vec<f64> {
    let mut net = vec![0.0; plan.participants.len()];
    for payment in &plan.payments {
        assert!(payment.amount > 0.0, "non-positive payment {payment:?}");
        assert_ne!(payment.payer, payment.payee);
        net[payment.payer.index()] -= payment.amount;
        net[payment.payee.index()] += payment.amount;
    }
    net
}

pub fn assert_conserves(plan: &SettlementPlan, tolerance: f64) {
    for (participant, net) in plan.participants.iter().zip(replay(plan)) {
        assert!(
            (net - participant.balance).abs() <= tolerance,
            "{} ends at {net}, expected {}",
            participant.label,
            participant.balance
        );
    }
}

/// Exact minimum payment count for integer balances: the number of non-zero
/// participants minus the largest number of disjoint zero-sum groups they
/// split into.
pub fn min_transactions(cents: &[i64]) -> usize {
    let nonzero: Vec<i64> = cents.iter().copied().filter(|&c| c != 0).collect();
    let k = nonzero.len();
    if k == 0 {
        return 0;
    }

    let full = (1usize << k) - 1;
    let sums: Vec<i64> = (0..=full)
        .map(|mask| {
            (0..k)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| nonzero[bit])
                .sum()
        })
        .collect();

    let mut groups = vec![0usize; full + 1];
    for mask in 1..=full {
        if sums[mask] != 0 {
            continue;
        }
        let lowest = mask & mask.wrapping_neg();
        let mut sub = mask;
        while sub > 0 {
            if sub & lowest != 0 && sums[sub] == 0 {
                groups[mask] = groups[mask].max(groups[mask ^ sub] + 1);
            }
            sub = (sub - 1) & mask;
        }
    }
    k - groups[full]
}

#[test]
fn oracle_matches_hand_counts() {
    assert_eq!(min_transactions(&[]), 0);
    assert_eq!(min_transactions(&[0, 0]), 0);
    assert_eq!(min_transactions(&[-100, 100]), 1);
    assert_eq!(min_transactions(&[-10, 10, -20, 20]), 2);
    assert_eq!(min_transactions(&[-30, 10, 20]), 2);
    assert_eq!(min_transactions(&[-64316, -60216, 41480, 44084, 128484, -89516]), 5);
}
