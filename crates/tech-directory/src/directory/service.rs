use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::availability::{is_available_at, Clock, ReferenceInstant, SystemClock};
use super::domain::{Coordinates, Region, Review, Technician, TechnicianId};
use super::filter::{filter_candidates, CandidateCriteria};
use super::pagination::{paginate, Page, PageRequest};
use super::ranking::{rank, RankedTechnician, RankingRequest, SortMode};
use super::repository::{RepositoryError, StorageFilter, TechnicianRepository};

/// Everything one discovery request asks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub storage: StorageFilter,
    pub criteria: CandidateCriteria,
    pub origin: Option<Coordinates>,
    pub max_distance_km: Option<f64>,
    /// Raw sort mode; unknown values fall back per [`SortMode::resolve`].
    pub sort_by: Option<String>,
    pub page: PageRequest,
}

/// One ranked technician as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianHit {
    #[serde(flatten)]
    pub technician: Technician,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub available_now: bool,
}

/// Public profile: the snapshot plus its reviews, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianProfile {
    pub technician: Technician,
    pub reviews: Vec<Review>,
}

/// Stateless discovery pipeline over a read-only repository.
pub struct DirectorySearchService<R, C = SystemClock> {
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R> DirectorySearchService<R, SystemClock>
where
    R: TechnicianRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }
}

impl<R, C> DirectorySearchService<R, C>
where
    R: TechnicianRepository + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Load candidates, re-filter, rank, and slice one page.
    pub fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Page<TechnicianHit>, DirectoryServiceError> {
        let candidates = self
            .repository
            .candidates(&request.storage)
            .inspect_err(|err| warn!(error = %err, "candidate fetch failed"))?;
        let loaded = candidates.len();

        let now = self.clock.now();
        let filtered = filter_candidates(candidates, &request.criteria, &now);
        let kept = filtered.len();

        let mode = SortMode::resolve(request.sort_by.as_deref(), request.origin.is_some());
        let ranked = rank(
            filtered,
            &RankingRequest {
                mode,
                origin: request.origin,
                max_distance_km: request.max_distance_km,
            },
        );

        debug!(
            loaded,
            kept,
            ranked = ranked.len(),
            sort = mode.label(),
            page = request.page.page(),
            size = request.page.size(),
            "technician search evaluated"
        );

        let page = paginate(ranked, request.page);
        Ok(page.map(|candidate| hit(candidate, &now)))
    }

    pub fn profile(&self, id: &TechnicianId) -> Result<TechnicianProfile, DirectoryServiceError> {
        let technician = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let mut reviews = self
            .repository
            .reviews(id)
            .inspect_err(|err| warn!(technician = %id, error = %err, "review fetch failed"))?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(TechnicianProfile {
            technician,
            reviews,
        })
    }

    pub fn regions(&self) -> Result<Vec<Region>, DirectoryServiceError> {
        Ok(self.repository.regions()?)
    }

    pub fn fields(&self) -> Result<Vec<String>, DirectoryServiceError> {
        Ok(self.repository.fields()?)
    }
}

fn hit(candidate: RankedTechnician, now: &ReferenceInstant) -> TechnicianHit {
    let available_now = is_available_at(&candidate.technician, now);
    TechnicianHit {
        distance_km: candidate.distance.km(),
        available_now,
        technician: candidate.technician,
    }
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
