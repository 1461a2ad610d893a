use std::num::IntErrorKind;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::json;

use super::availability::Clock;
use super::domain::{Coordinates, TechnicianId};
use super::filter::CandidateCriteria;
use super::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use super::repository::{RepositoryError, StorageFilter, TechnicianRepository};
use super::service::{DirectoryServiceError, DirectorySearchService, SearchRequest, TechnicianHit};

/// Public read-only directory endpoints.
pub fn directory_router<R, C>(service: Arc<DirectorySearchService<R, C>>) -> Router
where
    R: TechnicianRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/public/technicians/search",
            get(search_handler::<R, C>),
        )
        .route(
            "/api/public/technicians/regions",
            get(regions_handler::<R, C>),
        )
        .route(
            "/api/public/technicians/:technician_id",
            get(profile_handler::<R, C>),
        )
        .route(
            "/api/public/technician-fields",
            get(fields_handler::<R, C>),
        )
        .with_state(service)
}

/// Query string accepted by the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub governorate: Option<String>,
    pub city: Option<String>,
    pub field: Option<String>,
    pub user_lat: Option<f64>,
    pub user_lng: Option<f64>,
    pub max_distance: Option<f64>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub available_now: Option<bool>,
    pub emergency_service: Option<bool>,
    #[serde(default, deserialize_with = "saturating_integer")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "saturating_integer")]
    pub size: Option<i64>,
    pub sort_by: Option<String>,
}

impl SearchParams {
    pub fn into_request(self) -> SearchRequest {
        SearchRequest {
            storage: StorageFilter {
                governorate: self.governorate,
                city: self.city,
                field: self.field,
            },
            criteria: CandidateCriteria {
                min_rating: self.min_rating,
                max_price: self.max_price,
                available_now: self.available_now,
                emergency_service: self.emergency_service,
            },
            origin: Coordinates::from_parts(self.user_lat, self.user_lng),
            max_distance_km: self.max_distance,
            sort_by: self.sort_by,
            page: PageRequest::new(
                self.page.unwrap_or(0),
                self.size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
            ),
        }
    }
}

/// Integers past the `i64` range saturate so paging values get clamped, not rejected.
fn saturating_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<i64>() {
        Ok(value) => Ok(Some(value)),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
            IntErrorKind::NegOverflow => Ok(Some(i64::MIN)),
            _ => Err(D::Error::custom(format!("invalid integer '{trimmed}'"))),
        },
    }
}

/// Search result envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub technicians: Vec<TechnicianHit>,
    pub total_elements: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

pub(crate) async fn search_handler<R, C>(
    State(service): State<Arc<DirectorySearchService<R, C>>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response
where
    R: TechnicianRepository + 'static,
    C: Clock + 'static,
{
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            let payload = json!({
                "error": rejection.body_text(),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.search(&params.into_request()) {
        Ok(page) => {
            let body = SearchResponse {
                technicians: page.items,
                total_elements: page.total_elements,
                current_page: page.current_page,
                page_size: page.page_size,
                total_pages: page.total_pages,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => service_error(err),
    }
}

pub(crate) async fn profile_handler<R, C>(
    State(service): State<Arc<DirectorySearchService<R, C>>>,
    Path(technician_id): Path<String>,
) -> Response
where
    R: TechnicianRepository + 'static,
    C: Clock + 'static,
{
    let Ok(id) = technician_id.trim().parse::<u64>() else {
        let payload = json!({
            "error": format!("invalid technician id '{technician_id}'"),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    match service.profile(&TechnicianId(id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn regions_handler<R, C>(
    State(service): State<Arc<DirectorySearchService<R, C>>>,
) -> Response
where
    R: TechnicianRepository + 'static,
    C: Clock + 'static,
{
    match service.regions() {
        Ok(regions) => (StatusCode::OK, axum::Json(regions)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn fields_handler<R, C>(
    State(service): State<Arc<DirectorySearchService<R, C>>>,
) -> Response
where
    R: TechnicianRepository + 'static,
    C: Clock + 'static,
{
    match service.fields() {
        Ok(fields) => (StatusCode::OK, axum::Json(fields)).into_response(),
        Err(err) => service_error(err),
    }
}

fn service_error(err: DirectoryServiceError) -> Response {
    let status = match &err {
        DirectoryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DirectoryServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
