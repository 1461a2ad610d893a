use std::sync::Arc;

use chrono::NaiveTime;
use tech_directory::directory::{
    CandidateCriteria, Coordinates, DirectorySearchService, FixedClock, PageRequest,
    ReferenceInstant, SearchRequest, StorageFilter, TechnicianCatalog, TechnicianCatalogImporter,
    TechnicianHit, WorkingDay,
};

const DOWNTOWN_CAIRO: Coordinates = Coordinates::new(30.0444, 31.2357);

fn service() -> DirectorySearchService<TechnicianCatalog, FixedClock> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/technicians.csv");
    let catalog = TechnicianCatalogImporter::from_path(path).expect("fixture imports");
    let monday_noon = ReferenceInstant::new(
        WorkingDay::Monday,
        NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
    );
    DirectorySearchService::with_clock(Arc::new(catalog), Arc::new(FixedClock(monday_noon)))
}

fn ids(items: &[TechnicianHit]) -> Vec<u64> {
    items.iter().map(|hit| hit.technician.id.0).collect()
}

#[test]
fn nearest_plumbers_in_cairo() {
    let page = service()
        .search(&SearchRequest {
            storage: StorageFilter {
                governorate: Some("Cairo".to_string()),
                field: Some("Plumbing".to_string()),
                ..StorageFilter::default()
            },
            origin: Some(Coordinates::new(30.0561, 31.3301)),
            sort_by: Some("distance".to_string()),
            ..SearchRequest::default()
        })
        .expect("search succeeds");

    assert_eq!(ids(&page.items), vec![101, 104]);
    assert!(page.items[0].distance_km.expect("distance") < 1e-9);
}

#[test]
fn radius_search_drops_far_and_unlocated_technicians() {
    let page = service()
        .search(&SearchRequest {
            origin: Some(DOWNTOWN_CAIRO),
            max_distance_km: Some(10.0),
            ..SearchRequest::default()
        })
        .expect("search succeeds");

    assert_eq!(ids(&page.items), vec![105, 101, 102, 103]);
    assert!(page
        .items
        .iter()
        .all(|hit| hit.distance_km.is_some_and(|km| km <= 10.0)));
}

#[test]
fn available_now_sorted_by_rating() {
    let page = service()
        .search(&SearchRequest {
            criteria: CandidateCriteria {
                available_now: Some(true),
                ..CandidateCriteria::default()
            },
            sort_by: Some("rating".to_string()),
            ..SearchRequest::default()
        })
        .expect("search succeeds");

    assert_eq!(ids(&page.items), vec![105, 101, 102, 107, 108, 106, 104]);
    assert!(page.items.iter().all(|hit| hit.available_now));
}

#[test]
fn emergency_responders_by_price_put_negotiable_last() {
    let page = service()
        .search(&SearchRequest {
            criteria: CandidateCriteria {
                emergency_service: Some(true),
                ..CandidateCriteria::default()
            },
            sort_by: Some("price".to_string()),
            ..SearchRequest::default()
        })
        .expect("search succeeds");

    assert_eq!(ids(&page.items), vec![101, 107, 105, 104]);
}

#[test]
fn paging_through_the_catalog_visits_every_candidate_once() {
    let service = service();
    let mut seen = Vec::new();
    let mut page_index = 0;

    loop {
        let page = service
            .search(&SearchRequest {
                sort_by: Some("name".to_string()),
                page: PageRequest::new(page_index, 4),
                ..SearchRequest::default()
            })
            .expect("search succeeds");
        assert_eq!(page.total_elements, 9);
        assert_eq!(page.total_pages, 3);
        if page.items.is_empty() {
            break;
        }
        seen.extend(ids(&page.items));
        page_index += 1;
    }

    assert_eq!(page_index, 3);
    assert_eq!(seen.len(), 9);
    let mut unique = seen.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 9);
}

#[test]
fn repeated_searches_are_identical() {
    let service = service();
    let request = SearchRequest {
        origin: Some(DOWNTOWN_CAIRO),
        criteria: CandidateCriteria {
            min_rating: Some(4.0),
            max_price: Some(350.0),
            ..CandidateCriteria::default()
        },
        sort_by: Some("rating".to_string()),
        ..SearchRequest::default()
    };

    let first = service.search(&request).expect("search succeeds");
    let second = service.search(&request).expect("search succeeds");
    assert_eq!(first, second);
    assert_eq!(ids(&first.items), vec![101, 102, 107, 103, 108]);
}
