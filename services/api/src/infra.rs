use chrono::NaiveTime;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tech_directory::directory::{
    ReferenceInstant, TechnicianCatalog, TechnicianCatalogImporter, WorkingDay,
};
use tech_directory::error::AppError;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seeds the in-memory catalog. Without a CSV the directory starts empty.
pub(crate) fn load_catalog(
    path: Option<&Path>,
    reviews: Option<&Path>,
) -> Result<TechnicianCatalog, AppError> {
    let Some(path) = path else {
        if reviews.is_some() {
            warn!("review CSV ignored without a technician catalog");
        }
        warn!("no technician catalog configured; serving an empty directory");
        return Ok(TechnicianCatalog::default());
    };

    let mut catalog = TechnicianCatalogImporter::from_path(path)?;
    if let Some(reviews) = reviews {
        catalog = catalog.with_reviews(TechnicianCatalogImporter::reviews_from_path(reviews)?)?;
    }
    info!(
        path = %path.display(),
        technicians = catalog.len(),
        reviews = catalog.review_count(),
        "technician catalog loaded"
    );
    Ok(catalog)
}

/// Parses `<weekday> <HH:MM>`, e.g. `mon 09:30` or `Saturday 18:00`.
pub(crate) fn parse_reference_instant(raw: &str) -> Result<ReferenceInstant, String> {
    let mut parts = raw.split_whitespace();
    let (Some(day), Some(time), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected '<weekday> <HH:MM>', got '{raw}'"));
    };

    let weekday =
        WorkingDay::parse(day).ok_or_else(|| format!("unknown weekday '{day}' in '{raw}'"))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|err| format!("failed to parse '{time}' as HH:MM ({err})"))?;

    Ok(ReferenceInstant::new(weekday, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_instant_accepts_day_and_time() {
        let instant = parse_reference_instant("sat 18:30").expect("parses");
        assert_eq!(instant.weekday, WorkingDay::Saturday);
        assert_eq!(
            instant.time,
            NaiveTime::from_hms_opt(18, 30, 0).expect("valid time")
        );

        let with_seconds = parse_reference_instant("Monday 09:00:01").expect("parses");
        assert_eq!(with_seconds.weekday, WorkingDay::Monday);
    }

    #[test]
    fn reference_instant_rejects_malformed_input() {
        assert!(parse_reference_instant("18:30").is_err());
        assert!(parse_reference_instant("someday 18:30").is_err());
        assert!(parse_reference_instant("mon 6pm").is_err());
        assert!(parse_reference_instant("mon 10:00 extra").is_err());
    }

    #[test]
    fn missing_catalog_path_yields_empty_directory() {
        let catalog = load_catalog(None, None).expect("empty catalog");
        assert!(catalog.is_empty());
    }

    #[test]
    fn unreadable_catalog_is_an_error() {
        let err = load_catalog(Some(Path::new("/nonexistent/technicians.csv")), None)
            .expect_err("missing file");
        assert!(matches!(err, AppError::Catalog(_)));
    }

    #[test]
    fn bundled_catalog_loads_with_its_reviews() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../crates/tech-directory/data");
        let catalog = load_catalog(
            Some(data.join("technicians.csv").as_path()),
            Some(data.join("reviews.csv").as_path()),
        )
        .expect("bundled data loads");
        assert_eq!(catalog.len(), 10);
        assert!(catalog.review_count() > 0);
    }
}
