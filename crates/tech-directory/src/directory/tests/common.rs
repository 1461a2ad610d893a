use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::directory::availability::{FixedClock, ReferenceInstant};
use crate::directory::catalog::TechnicianCatalog;
use crate::directory::domain::{
    Coordinates, Region, Review, ServiceFee, Technician, TechnicianId, WorkingDay,
};
use crate::directory::repository::{RepositoryError, StorageFilter, TechnicianRepository};
use crate::directory::{directory_router, DirectorySearchService};

pub(super) fn monday_noon() -> ReferenceInstant {
    ReferenceInstant::new(
        WorkingDay::Monday,
        NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
    )
}

pub(super) fn technician(
    id: u64,
    name: &str,
    rating: Option<f64>,
    fee: Option<f64>,
    location: Option<(f64, f64)>,
) -> Technician {
    Technician {
        average_rating: rating,
        base_service_fee: fee.map(|amount| ServiceFee {
            amount,
            currency: Some("EGP".to_string()),
        }),
        location: location.map(|(lat, lng)| Coordinates::new(lat, lng)),
        region: Some(Region {
            governorate: "Cairo".to_string(),
            city: "Maadi".to_string(),
        }),
        fields: BTreeSet::from(["Plumbing".to_string()]),
        working_days: BTreeSet::from([WorkingDay::Monday, WorkingDay::Tuesday]),
        working_hours_start: NaiveTime::from_hms_opt(9, 0, 0),
        working_hours_end: NaiveTime::from_hms_opt(17, 0, 0),
        ..Technician::new(id, name)
    }
}

/// The A/B/C trio: two equally rated priced technicians and one with nothing set.
pub(super) fn rating_trio() -> Vec<Technician> {
    vec![
        technician(3, "C", None, None, None),
        technician(2, "B", Some(4.5), Some(50.0), None),
        technician(1, "A", Some(4.5), Some(100.0), None),
    ]
}

pub(super) fn build_service(
    technicians: Vec<Technician>,
) -> DirectorySearchService<TechnicianCatalog, FixedClock> {
    DirectorySearchService::with_clock(
        Arc::new(TechnicianCatalog::new(technicians)),
        Arc::new(FixedClock(monday_noon())),
    )
}

/// Review of `technician` posted at noon on the given day of March 2024.
pub(super) fn review(id: u64, technician: u64, rating: u8, day: u32) -> Review {
    Review {
        id,
        technician_id: TechnicianId(technician),
        user_id: None,
        user_name: Some(format!("Reviewer {id}")),
        rating,
        comment: None,
        created_at: NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp"),
        verified: false,
    }
}

pub(super) fn build_service_with_reviews(
    technicians: Vec<Technician>,
    reviews: Vec<Review>,
) -> DirectorySearchService<TechnicianCatalog, FixedClock> {
    let catalog = TechnicianCatalog::new(technicians)
        .with_reviews(reviews)
        .expect("reviews belong to known technicians");
    DirectorySearchService::with_clock(Arc::new(catalog), Arc::new(FixedClock(monday_noon())))
}

pub(super) fn directory_router_with_service(
    service: DirectorySearchService<TechnicianCatalog, FixedClock>,
) -> axum::Router {
    directory_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl TechnicianRepository for UnavailableRepository {
    fn candidates(&self, _filter: &StorageFilter) -> Result<Vec<Technician>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &TechnicianId) -> Result<Option<Technician>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn reviews(&self, _technician: &TechnicianId) -> Result<Vec<Review>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn regions(&self) -> Result<Vec<Region>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fields(&self) -> Result<Vec<String>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
