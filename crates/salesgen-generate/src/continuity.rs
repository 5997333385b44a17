//! Carry-over of customers between dataset versions.

use rand::RngCore;
use rand::seq::{IndexedRandom, index};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use salesgen_core::Customer;

use crate::config::ContinuityConfig;

/// Customers found in the previous dataset, if any.
#[derive(Debug, Clone)]
pub enum PriorCustomers {
    /// No previous dataset.
    Absent,
    /// A previous dataset exists but could not be parsed.
    Unreadable(String),
    Loaded(Vec<Customer>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityStatus {
    Disabled,
    NoPriorDataset,
    Unreadable,
    Sampled,
}

/// Continuity section of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityReport {
    pub status: ContinuityStatus,
    pub prior_customers: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_percent: Option<u32>,
    pub preserved: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContinuityReport {
    fn empty(status: ContinuityStatus) -> Self {
        Self {
            status,
            prior_customers: 0,
            fraction_percent: None,
            preserved: 0,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContinuityOutcome {
    pub report: ContinuityReport,
    /// Sampled customers, in their prior order.
    pub preserved: Vec<Customer>,
}

/// Number of customers kept from `prior_count` at `percent`.
pub fn sample_size(prior_count: usize, percent: u32) -> usize {
    let kept = prior_count as u128 * u128::from(percent.min(100)) / 100;
    kept as usize
}

/// Sample the customers to carry into the next dataset.
///
/// One fraction is drawn from the configured candidates, then
/// `floor(M * fraction)` customers are picked uniformly without replacement.
/// An unreadable prior dataset is logged and treated as empty.
pub fn sample_prior(
    config: &ContinuityConfig,
    prior: PriorCustomers,
    rng: &mut dyn RngCore,
) -> ContinuityOutcome {
    if !config.enabled {
        return ContinuityOutcome {
            report: ContinuityReport::empty(ContinuityStatus::Disabled),
            preserved: Vec::new(),
        };
    }

    let customers = match prior {
        PriorCustomers::Absent => {
            return ContinuityOutcome {
                report: ContinuityReport::empty(ContinuityStatus::NoPriorDataset),
                preserved: Vec::new(),
            };
        }
        PriorCustomers::Unreadable(error) => {
            warn!(error = %error, "prior dataset unreadable; starting with an empty pool");
            let mut report = ContinuityReport::empty(ContinuityStatus::Unreadable);
            report.error = Some(error);
            return ContinuityOutcome {
                report,
                preserved: Vec::new(),
            };
        }
        PriorCustomers::Loaded(customers) => customers,
    };

    let prior_count = customers.len();
    let percent = config.fractions_percent.choose(rng).copied().unwrap_or(0);
    let amount = sample_size(prior_count, percent);

    let mut picked = index::sample(rng, prior_count, amount).into_vec();
    picked.sort_unstable();
    let mut wanted = picked.into_iter().peekable();
    let preserved: Vec<Customer> = customers
        .into_iter()
        .enumerate()
        .filter_map(|(position, customer)| {
            if wanted.peek() == Some(&position) {
                wanted.next();
                Some(customer)
            } else {
                None
            }
        })
        .collect();

    info!(
        prior_customers = prior_count,
        fraction_percent = percent,
        preserved = preserved.len(),
        "continuity sampled"
    );

    ContinuityOutcome {
        report: ContinuityReport {
            status: ContinuityStatus::Sampled,
            prior_customers: prior_count as u64,
            fraction_percent: Some(percent),
            preserved: preserved.len() as u64,
            error: None,
        },
        preserved,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use salesgen_core::{CustomerId, NormalizedEmail};

    use super::*;

    fn prior(count: usize) -> Vec<Customer> {
        (0..count)
            .map(|index| Customer {
                id: CustomerId::Numeric(index as i64 + 1),
                name: format!("Cliente {index}"),
                email: NormalizedEmail::parse(&format!("cliente{index}@gmail.com")).unwrap(),
                country: "Brasil".to_string(),
                state: "Minas Gerais".to_string(),
                city: "Belo Horizonte".to_string(),
            })
            .collect()
    }

    fn fixed(percent: u32) -> ContinuityConfig {
        ContinuityConfig {
            enabled: true,
            fractions_percent: vec![percent],
        }
    }

    #[test]
    fn sample_size_floors() {
        assert_eq!(sample_size(1000, 6), 60);
        assert_eq!(sample_size(49, 2), 0);
        assert_eq!(sample_size(50, 2), 1);
        assert_eq!(sample_size(33, 9), 2);
        assert_eq!(sample_size(10, 100), 10);
    }

    #[test]
    fn samples_without_replacement_in_prior_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let outcome = sample_prior(&fixed(6), PriorCustomers::Loaded(prior(1000)), &mut rng);

        assert_eq!(outcome.report.status, ContinuityStatus::Sampled);
        assert_eq!(outcome.report.preserved, 60);
        assert_eq!(outcome.preserved.len(), 60);

        let ids: HashSet<&CustomerId> = outcome.preserved.iter().map(|c| &c.id).collect();
        assert_eq!(ids.len(), 60);

        let positions: Vec<i64> = outcome
            .preserved
            .iter()
            .map(|c| match c.id {
                CustomerId::Numeric(value) => value,
                CustomerId::Token(_) => unreachable!(),
            })
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn fraction_is_drawn_from_candidates() {
        let config = ContinuityConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let outcome = sample_prior(&config, PriorCustomers::Loaded(prior(100)), &mut rng);
            let percent = outcome.report.fraction_percent.unwrap();
            assert!([2, 6, 9].contains(&percent));
            assert_eq!(outcome.preserved.len(), percent as usize);
        }
    }

    #[test]
    fn unreadable_prior_yields_empty_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = sample_prior(
            &fixed(9),
            PriorCustomers::Unreadable("bad header".to_string()),
            &mut rng,
        );
        assert_eq!(outcome.report.status, ContinuityStatus::Unreadable);
        assert_eq!(outcome.report.error.as_deref(), Some("bad header"));
        assert!(outcome.preserved.is_empty());
    }

    #[test]
    fn disabled_ignores_prior_customers() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = ContinuityConfig {
            enabled: false,
            fractions_percent: vec![9],
        };
        let outcome = sample_prior(&config, PriorCustomers::Loaded(prior(100)), &mut rng);
        assert_eq!(outcome.report.status, ContinuityStatus::Disabled);
        assert!(outcome.preserved.is_empty());
    }
}
