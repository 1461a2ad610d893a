use serde::{Deserialize, Serialize};

use super::domain::{Region, Review, Technician, TechnicianId};

/// Coarse attribute filter pushed down to storage. Only active technicians are returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFilter {
    pub governorate: Option<String>,
    pub city: Option<String>,
    pub field: Option<String>,
}

impl StorageFilter {
    /// Case-insensitive match on region and field names; inactive records never match.
    pub fn admits(&self, technician: &Technician) -> bool {
        if !technician.active {
            return false;
        }

        let region = technician.region.as_ref();
        if let Some(governorate) = non_blank(&self.governorate) {
            if !region.is_some_and(|r| r.governorate.eq_ignore_ascii_case(governorate)) {
                return false;
            }
        }

        if let Some(city) = non_blank(&self.city) {
            if !region.is_some_and(|r| r.city.eq_ignore_ascii_case(city)) {
                return false;
            }
        }

        if let Some(field) = non_blank(&self.field) {
            if !technician
                .fields
                .iter()
                .any(|name| name.eq_ignore_ascii_case(field))
            {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Read-only persistence collaborator backing the directory.
pub trait TechnicianRepository: Send + Sync {
    /// Candidate set for one search, in storage order.
    fn candidates(&self, filter: &StorageFilter) -> Result<Vec<Technician>, RepositoryError>;
    fn fetch(&self, id: &TechnicianId) -> Result<Option<Technician>, RepositoryError>;
    /// Reviews left for one technician, newest first.
    fn reviews(&self, technician: &TechnicianId) -> Result<Vec<Review>, RepositoryError>;
    /// Distinct regions present in the store, sorted.
    fn regions(&self) -> Result<Vec<Region>, RepositoryError>;
    /// Distinct field names present in the store, sorted.
    fn fields(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("technician not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
