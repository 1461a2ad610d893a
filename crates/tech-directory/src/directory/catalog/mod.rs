//! CSV-seeded, read-only technician catalog.
//!
//! One technician per row. List columns (`fields`, `working_days`) are `;`-separated,
//! hours are `HH:MM`, and empty cells mean "absent". Reviews come from a second CSV
//! keyed by `technician_id`.

mod parser;

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use super::domain::{Region, Review, Technician, TechnicianId};
use super::repository::{RepositoryError, StorageFilter, TechnicianRepository};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
    DuplicateId(TechnicianId),
    DuplicateReviewId(u64),
    UnknownTechnician {
        review: u64,
        technician: TechnicianId,
    },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read technician catalog: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid technician CSV data: {}", err),
            CatalogImportError::InvalidValue {
                line,
                column,
                value,
            } if value.is_empty() => {
                write!(f, "line {}: column '{}' is required here", line, column)
            }
            CatalogImportError::InvalidValue {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}: invalid value '{}' in column '{}'",
                line, value, column
            ),
            CatalogImportError::DuplicateId(id) => {
                write!(f, "technician id {} appears more than once", id)
            }
            CatalogImportError::DuplicateReviewId(id) => {
                write!(f, "review id {} appears more than once", id)
            }
            CatalogImportError::UnknownTechnician { review, technician } => write!(
                f,
                "review {} refers to unknown technician {}",
                review, technician
            ),
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidValue { .. }
            | CatalogImportError::DuplicateId(_)
            | CatalogImportError::DuplicateReviewId(_)
            | CatalogImportError::UnknownTechnician { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct TechnicianCatalogImporter;

impl TechnicianCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<TechnicianCatalog, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<TechnicianCatalog, CatalogImportError> {
        let technicians = parser::parse_records(reader)?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = technicians.iter().find(|t| !seen.insert(t.id)) {
            return Err(CatalogImportError::DuplicateId(duplicate.id));
        }

        Ok(TechnicianCatalog::new(technicians))
    }

    pub fn reviews_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Review>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::reviews_from_reader(file)
    }

    pub fn reviews_from_reader<R: Read>(reader: R) -> Result<Vec<Review>, CatalogImportError> {
        let reviews = parser::parse_reviews(reader)?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = reviews.iter().find(|r| !seen.insert(r.id)) {
            return Err(CatalogImportError::DuplicateReviewId(duplicate.id));
        }

        Ok(reviews)
    }
}

/// In-memory repository over an immutable technician list, kept in import order.
#[derive(Debug, Clone, Default)]
pub struct TechnicianCatalog {
    technicians: Vec<Technician>,
    reviews: Vec<Review>,
}

impl TechnicianCatalog {
    pub fn new(technicians: Vec<Technician>) -> Self {
        Self {
            technicians,
            reviews: Vec::new(),
        }
    }

    /// Attaches reviews; every review must point at a technician in the catalog.
    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Result<Self, CatalogImportError> {
        let known: HashSet<TechnicianId> = self.technicians.iter().map(|t| t.id).collect();
        if let Some(orphan) = reviews.iter().find(|r| !known.contains(&r.technician_id)) {
            return Err(CatalogImportError::UnknownTechnician {
                review: orphan.id,
                technician: orphan.technician_id,
            });
        }

        self.reviews = reviews;
        Ok(self)
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    pub fn len(&self) -> usize {
        self.technicians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technicians.is_empty()
    }
}

impl TechnicianRepository for TechnicianCatalog {
    fn candidates(&self, filter: &StorageFilter) -> Result<Vec<Technician>, RepositoryError> {
        Ok(self
            .technicians
            .iter()
            .filter(|technician| filter.admits(technician))
            .cloned()
            .collect())
    }

    fn fetch(&self, id: &TechnicianId) -> Result<Option<Technician>, RepositoryError> {
        Ok(self
            .technicians
            .iter()
            .find(|technician| technician.id == *id)
            .cloned())
    }

    fn reviews(&self, technician: &TechnicianId) -> Result<Vec<Review>, RepositoryError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|review| review.technician_id == *technician)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    fn regions(&self) -> Result<Vec<Region>, RepositoryError> {
        let regions: BTreeSet<Region> = self
            .technicians
            .iter()
            .filter_map(|technician| technician.region.clone())
            .collect();
        Ok(regions.into_iter().collect())
    }

    fn fields(&self) -> Result<Vec<String>, RepositoryError> {
        let fields: BTreeSet<&String> = self
            .technicians
            .iter()
            .flat_map(|technician| technician.fields.iter())
            .collect();
        Ok(fields.into_iter().cloned().collect())
    }
}
