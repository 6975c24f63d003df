/// Which side of `k` a Poisson probability covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// P(X = k)
    Exact,
    /// P(X <= k)
    AtMost,
    /// P(X >= k)
    AtLeast,
}

/// Largest count the goal expectation sums over.
pub const GOAL_OUTCOMES: u32 = 5;

pub fn poisson(lambda: f64, k: u32, tail: Tail) -> f64 {
    match tail {
        Tail::Exact => pmf_terms(lambda)
            .find(|(i, _)| *i == k)
            .map_or(0.0, |(_, p)| p),
        Tail::AtMost => pmf_terms(lambda)
            .take_while(|(i, _)| *i <= k)
            .map(|(_, p)| p)
            .sum(),
        Tail::AtLeast => {
            if k == 0 {
                return 1.0;
            }
            let below: f64 = pmf_terms(lambda)
                .take_while(|(i, _)| *i < k)
                .map(|(_, p)| p)
                .sum();
            (1.0 - below).max(0.0)
        }
    }
}

/// Σ_{x=1..5} x·P(X=x). Truncated at five goals, so slightly under λ for large rates.
pub fn expected_goals_truncated(lambda: f64) -> f64 {
    pmf_terms(lambda)
        .take_while(|(x, _)| *x <= GOAL_OUTCOMES)
        .skip(1)
        .map(|(x, p)| f64::from(x) * p)
        .sum()
}

// (k, P(X = k)) for k = 0, 1, ... by the recurrence p(k) = p(k-1)·λ/k.
// Once a term is zero every later one is too, so the sequence ends there.
fn pmf_terms(lambda: f64) -> impl Iterator<Item = (u32, f64)> {
    let lambda = if lambda.is_finite() { lambda.max(0.0) } else { 0.0 };
    std::iter::successors(Some((0u32, (-lambda).exp())), move |&(k, p)| {
        let next = k.checked_add(1)?;
        let q = p * lambda / f64::from(next);
        (q > 0.0).then_some((next, q))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factorial(n: u32) -> f64 {
        (1..=n).map(f64::from).product()
    }

    #[test]
    fn exact_matches_closed_form() {
        for &l in &[0.1f64, 0.6, 1.4, 3.2] {
            for k in 0..8 {
                let direct = (-l as f64).exp() * l.powi(k as i32) / factorial(k);
                assert!((poisson(l, k, Tail::Exact) - direct).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn cumulative_and_survival_are_complementary() {
        for &l in &[0.0, 0.05, 0.9, 2.5, 6.0] {
            for k in 0..10 {
                let lte = poisson(l, k, Tail::AtMost);
                let gte = poisson(l, k + 1, Tail::AtLeast);
                assert!((lte + gte - 1.0).abs() < 1e-12, "l={l} k={k}");

                let summed: f64 = (0..=k).map(|i| poisson(l, i, Tail::Exact)).sum();
                assert!((lte - summed).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn zero_rate_is_degenerate_at_zero() {
        assert_eq!(poisson(0.0, 0, Tail::Exact), 1.0);
        assert_eq!(poisson(0.0, 1, Tail::Exact), 0.0);
        assert_eq!(poisson(0.0, 2, Tail::AtLeast), 0.0);
        assert_eq!(expected_goals_truncated(0.0), 0.0);
    }

    #[test]
    fn far_tail_is_zero_without_walking_every_count() {
        assert_eq!(poisson(0.8, u32::MAX, Tail::Exact), 0.0);
        assert!((poisson(0.8, u32::MAX, Tail::AtMost) - 1.0).abs() < 1e-12);
        assert!(poisson(0.8, u32::MAX, Tail::AtLeast) < 1e-12);
        assert_eq!(poisson(f64::NAN, 3, Tail::Exact), 0.0);
    }

    #[test]
    fn survival_from_zero_is_certain() {
        assert_eq!(poisson(1.3, 0, Tail::AtLeast), 1.0);
    }

    #[test]
    fn truncated_expectation_approaches_rate() {
        let e = expected_goals_truncated(0.6);
        assert!(e < 0.6);
        assert!(0.6 - e < 1e-3);
    }
}
