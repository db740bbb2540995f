//! Dynamic similarity threshold

/// Cutoff derived from the best similarities
///
/// Takes the first `window` values of `sorted_desc` (fewer if there are
/// fewer), and returns `mean - multiplier * stddev` using the population
/// standard deviation. Uniformly weak matches still clear their own mean,
/// and uniformly strong ones do not drag in borderline noise. `None` for
/// empty input.
pub fn dynamic_threshold(sorted_desc: &[f64], window: usize, multiplier: f64) -> Option<f64> {
    let top = &sorted_desc[..sorted_desc.len().min(window.max(1))];
    if top.is_empty() {
        return None;
    }

    let n = top.len() as f64;
    let mean = top.iter().sum::<f64>() / n;
    let variance = top.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    Some(mean - multiplier * variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(dynamic_threshold(&[], 5, 0.5), None);
    }

    #[test]
    fn test_single_value_is_its_own_threshold() {
        assert_eq!(dynamic_threshold(&[0.42], 5, 0.5), Some(0.42));
    }

    #[test]
    fn test_known_values() {
        // mean 0.6, population stddev 0.2 over the top 2
        let threshold = dynamic_threshold(&[0.8, 0.4, 0.1], 2, 0.5).unwrap();
        assert!((threshold - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_only_window_counts() {
        let with_tail = dynamic_threshold(&[0.9, 0.9, 0.9, 0.9, 0.9, 0.0, 0.0], 5, 0.5).unwrap();
        assert!((with_tail - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_weak_matches_keep_best() {
        let sims = [0.12, 0.10, 0.09, 0.05, 0.02];
        let threshold = dynamic_threshold(&sims, 5, 0.5).unwrap();
        assert!(sims[0] >= threshold);
        assert!(sims[4] < threshold);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the best similarity always clears the threshold
        #[test]
        fn test_best_always_retained(
            mut sims in prop::collection::vec(-1.0f64..1.0, 1..40),
            multiplier in 0.0f64..2.0,
        ) {
            sims.sort_by(|a, b| b.total_cmp(a));
            let threshold = dynamic_threshold(&sims, 5, multiplier).unwrap();
            prop_assert!(sims[0] >= threshold - 1e-12);
        }

        /// Property: a tight top-5 cluster is retained whole
        #[test]
        fn test_tight_cluster_not_collapsed(
            base in 0.05f64..0.95,
            jitter in prop::collection::vec(0.0f64..1e-6, 5),
            tail in prop::collection::vec(-1.0f64..0.0, 0..20),
        ) {
            let mut sims: Vec<f64> = jitter.iter().map(|j| base + j).collect();
            sims.extend(tail);
            sims.sort_by(|a, b| b.total_cmp(a));

            let threshold = dynamic_threshold(&sims, 5, 0.5).unwrap();
            prop_assert!(threshold <= sims[0] + 1e-12);
            prop_assert!(sims[4] >= threshold - 1e-6);
            prop_assert!(threshold > 0.0);
        }
    }
}
