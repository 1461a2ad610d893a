//! Re-filtering of loaded candidates by the optional numeric and boolean criteria.

use super::availability::{is_available_at, ReferenceInstant};
use super::domain::Technician;
use serde::{Deserialize, Serialize};

/// Optional narrowing criteria. `None` leaves the dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCriteria {
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub available_now: Option<bool>,
    pub emergency_service: Option<bool>,
}

impl CandidateCriteria {
    pub fn matches(&self, technician: &Technician, now: &ReferenceInstant) -> bool {
        if technician.display_name().is_none() {
            return false;
        }

        if let Some(min_rating) = self.min_rating {
            if technician.rating() < min_rating {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            // A quote-on-request technician cannot prove it is under the ceiling.
            match technician.fee_amount() {
                Some(fee) if fee <= max_price => {}
                _ => return false,
            }
        }

        if self.emergency_service == Some(true) && !technician.is_emergency_service {
            return false;
        }

        if self.available_now == Some(true) && !is_available_at(technician, now) {
            return false;
        }

        true
    }
}

/// Keeps the matching candidates in input order.
pub fn filter_candidates(
    candidates: Vec<Technician>,
    criteria: &CandidateCriteria,
    now: &ReferenceInstant,
) -> Vec<Technician> {
    candidates
        .into_iter()
        .filter(|technician| criteria.matches(technician, now))
        .collect()
}
