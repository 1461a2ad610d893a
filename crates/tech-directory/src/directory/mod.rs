//! Technician discovery: candidate filtering, proximity ranking, and pagination over a
//! read-only technician store.

pub mod availability;
pub mod catalog;
pub mod domain;
pub mod filter;
pub mod geo;
pub mod pagination;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use availability::{is_available_at, Clock, FixedClock, ReferenceInstant, SystemClock};
pub use catalog::{CatalogImportError, TechnicianCatalog, TechnicianCatalogImporter};
pub use domain::{
    AvailabilityStatus, ContactPreferences, Coordinates, PriceType, Region, Review, ServiceFee,
    Technician, TechnicianId, WorkingDay,
};
pub use filter::CandidateCriteria;
pub use geo::{distance_between, Distance};
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use ranking::SortMode;
pub use repository::{RepositoryError, StorageFilter, TechnicianRepository};
pub use router::{directory_router, SearchParams, SearchResponse};
pub use service::{
    DirectoryServiceError, DirectorySearchService, SearchRequest, TechnicianHit,
    TechnicianProfile,
};
