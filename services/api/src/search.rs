use crate::infra::{load_catalog, parse_reference_instant};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tech_directory::directory::{
    CandidateCriteria, Clock, Coordinates, DirectorySearchService, FixedClock, Page, PageRequest,
    ReferenceInstant, SearchRequest, SearchResponse, StorageFilter, SystemClock,
    TechnicianCatalog, TechnicianHit, DEFAULT_PAGE_SIZE,
};
use tech_directory::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Technician catalog CSV to search
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Restrict to a governorate
    #[arg(long)]
    pub(crate) governorate: Option<String>,
    /// Restrict to a city
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Restrict to a skill field
    #[arg(long)]
    pub(crate) field: Option<String>,
    /// Requester latitude (used together with --user-lng)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) user_lat: Option<f64>,
    /// Requester longitude (used together with --user-lat)
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) user_lng: Option<f64>,
    /// Maximum distance in km from the requester
    #[arg(long)]
    pub(crate) max_distance: Option<f64>,
    /// Minimum average rating
    #[arg(long)]
    pub(crate) min_rating: Option<f64>,
    /// Maximum base service fee
    #[arg(long)]
    pub(crate) max_price: Option<f64>,
    /// Only technicians working right now
    #[arg(long)]
    pub(crate) available_now: bool,
    /// Only technicians offering emergency service
    #[arg(long)]
    pub(crate) emergency_service: bool,
    /// distance, rating, price, or name
    #[arg(long)]
    pub(crate) sort_by: Option<String>,
    /// Zero-based page index
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub(crate) page: i64,
    /// Page size (clamped to 1-100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE as i64, allow_negative_numbers = true)]
    pub(crate) size: i64,
    /// Evaluate availability at '<weekday> <HH:MM>' instead of the local clock
    #[arg(long, value_parser = parse_reference_instant)]
    pub(crate) at: Option<ReferenceInstant>,
    /// Print the JSON response envelope instead of a listing
    #[arg(long)]
    pub(crate) json: bool,
}

impl SearchArgs {
    fn request(&self) -> SearchRequest {
        SearchRequest {
            storage: StorageFilter {
                governorate: self.governorate.clone(),
                city: self.city.clone(),
                field: self.field.clone(),
            },
            criteria: CandidateCriteria {
                min_rating: self.min_rating,
                max_price: self.max_price,
                available_now: self.available_now.then_some(true),
                emergency_service: self.emergency_service.then_some(true),
            },
            origin: Coordinates::from_parts(self.user_lat, self.user_lng),
            max_distance_km: self.max_distance,
            sort_by: self.sort_by.clone(),
            page: PageRequest::new(self.page, self.size),
        }
    }
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let catalog = Arc::new(load_catalog(Some(args.catalog.as_path()), None)?);
    let request = args.request();

    let page = match args.at {
        Some(instant) => search_with(catalog, FixedClock(instant), &request)?,
        None => search_with(catalog, SystemClock, &request)?,
    };

    if args.json {
        let envelope = SearchResponse {
            technicians: page.items,
            total_elements: page.total_elements,
            current_page: page.current_page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        };
        match serde_json::to_string_pretty(&envelope) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Response unavailable: {}", err),
        }
        return Ok(());
    }

    render_page(&page);
    Ok(())
}

fn search_with<C: Clock + 'static>(
    catalog: Arc<TechnicianCatalog>,
    clock: C,
    request: &SearchRequest,
) -> Result<Page<TechnicianHit>, AppError> {
    let service = DirectorySearchService::with_clock(catalog, Arc::new(clock));
    Ok(service.search(request)?)
}

fn render_page(page: &Page<TechnicianHit>) {
    println!(
        "Technicians {} of {} (page {} of {}, size {})",
        page.items.len(),
        page.total_elements,
        page.current_page + 1,
        page.total_pages.max(1),
        page.page_size
    );

    if page.items.is_empty() {
        println!("  No technicians matched");
        return;
    }

    let offset = page.current_page * page.page_size;
    for (index, hit) in page.items.iter().enumerate() {
        println!("{}", describe_hit(offset + index + 1, hit));
    }
}

fn describe_hit(rank: usize, hit: &TechnicianHit) -> String {
    let technician = &hit.technician;
    let name = technician.display_name().unwrap_or("(unnamed)");
    let region = technician
        .region
        .as_ref()
        .map(|region| format!("{}, {}", region.city, region.governorate))
        .unwrap_or_else(|| "no region".to_string());
    let rating = technician
        .average_rating
        .map(|rating| format!("{:.1}", rating))
        .unwrap_or_else(|| "unrated".to_string());
    let fee = technician
        .base_service_fee
        .as_ref()
        .map(|fee| match &fee.currency {
            Some(currency) => format!("{:.0} {}", fee.amount, currency),
            None => format!("{:.0}", fee.amount),
        })
        .unwrap_or_else(|| "on request".to_string());
    let distance = hit
        .distance_km
        .map(|km| format!("{:.1} km", km))
        .unwrap_or_else(|| "-".to_string());
    let availability = if hit.available_now {
        "available now"
    } else {
        "unavailable"
    };

    format!(
        "{:>3}. {} [#{}] {} | rating {} | fee {} | distance {} | {}",
        rank, name, technician.id, region, rating, fee, distance, availability
    )
}
