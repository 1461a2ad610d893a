use std::collections::BTreeSet;
use std::io::Read;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

use super::CatalogImportError;
use crate::directory::domain::{
    AvailabilityStatus, ContactPreferences, Coordinates, PriceType, Region, Review, ServiceFee,
    Technician, TechnicianId, WorkingDay,
};

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<Technician>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut technicians = Vec::new();

    for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let row = record?;
        // Header occupies line 1.
        technicians.push(row.into_technician(index + 2)?);
    }

    Ok(technicians)
}

pub(crate) fn parse_reviews<R: Read>(reader: R) -> Result<Vec<Review>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut reviews = Vec::new();

    for (index, record) in csv_reader.deserialize::<ReviewRow>().enumerate() {
        let row = record?;
        reviews.push(row.into_review(index + 2)?);
    }

    Ok(reviews)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    full_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    governorate: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fields: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    available: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    availability_status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    working_days: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    working_hours_start: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    working_hours_end: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    average_rating: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    total_reviews: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    base_service_fee: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_emergency_service: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    emergency_fee_multiplier: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    is_verified: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    experience_years: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    whatsapp_number: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    allow_direct_calls: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    allow_whats_app: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    allow_in_app_messages: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    profile_photo_url: Option<String>,
}

impl CatalogRow {
    fn into_technician(self, line: usize) -> Result<Technician, CatalogImportError> {
        let cell = Cell { line };

        let region = match (self.governorate, self.city) {
            (Some(governorate), Some(city)) => Some(Region { governorate, city }),
            (None, None) => None,
            (Some(_), None) => return Err(cell.invalid("city", "")),
            (None, Some(_)) => return Err(cell.invalid("governorate", "")),
        };

        let latitude = cell.number::<f64>("latitude", self.latitude.as_deref())?;
        let longitude = cell.number::<f64>("longitude", self.longitude.as_deref())?;
        let location = match (latitude, longitude) {
            (Some(_), None) => return Err(cell.invalid("longitude", "")),
            (None, Some(_)) => return Err(cell.invalid("latitude", "")),
            (lat, lng) => Coordinates::from_parts(lat, lng),
        };

        let availability_status = match self.availability_status.as_deref() {
            Some(raw) => AvailabilityStatus::parse(raw)
                .ok_or_else(|| cell.invalid("availability_status", raw))?,
            None => AvailabilityStatus::Available,
        };

        let price_type = self
            .price_type
            .as_deref()
            .map(|raw| PriceType::parse(raw).ok_or_else(|| cell.invalid("price_type", raw)))
            .transpose()?;

        let working_days = list(self.working_days.as_deref())
            .map(|day| WorkingDay::parse(day).ok_or_else(|| cell.invalid("working_days", day)))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let base_service_fee = cell
            .number::<f64>("base_service_fee", self.base_service_fee.as_deref())?
            .map(|amount| ServiceFee {
                amount,
                currency: self.currency,
            });

        let contact = ContactPreferences {
            allow_direct_calls: cell.flag(
                "allow_direct_calls",
                self.allow_direct_calls.as_deref(),
                false,
            )?,
            allow_whats_app: cell.flag("allow_whats_app", self.allow_whats_app.as_deref(), false)?,
            allow_in_app_messages: cell.flag(
                "allow_in_app_messages",
                self.allow_in_app_messages.as_deref(),
                false,
            )?,
            whatsapp_number: self.whatsapp_number,
        };

        Ok(Technician {
            id: TechnicianId(self.id),
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            summary: self.summary,
            region,
            fields: list(self.fields.as_deref()).map(str::to_string).collect(),
            location,
            address: self.address,
            experience_years: cell.number("experience_years", self.experience_years.as_deref())?,
            active: cell.flag("active", self.active.as_deref(), true)?,
            available: cell.flag("available", self.available.as_deref(), true)?,
            availability_status,
            working_days,
            working_hours_start: cell.time("working_hours_start", self.working_hours_start)?,
            working_hours_end: cell.time("working_hours_end", self.working_hours_end)?,
            average_rating: cell.number("average_rating", self.average_rating.as_deref())?,
            total_reviews: cell
                .number("total_reviews", self.total_reviews.as_deref())?
                .unwrap_or(0),
            base_service_fee,
            price_type,
            contact,
            is_verified: cell.flag("is_verified", self.is_verified.as_deref(), false)?,
            profile_photo_url: self.profile_photo_url,
            is_emergency_service: cell.flag(
                "is_emergency_service",
                self.is_emergency_service.as_deref(),
                false,
            )?,
            emergency_fee_multiplier: cell.number(
                "emergency_fee_multiplier",
                self.emergency_fee_multiplier.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    id: u64,
    technician_id: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    user_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    comment: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    verified: Option<String>,
}

impl ReviewRow {
    fn into_review(self, line: usize) -> Result<Review, CatalogImportError> {
        let cell = Cell { line };

        let rating = match cell.number::<u8>("rating", self.rating.as_deref())? {
            Some(rating @ 1..=5) => rating,
            _ => return Err(cell.invalid("rating", self.rating.as_deref().unwrap_or_default())),
        };

        let created_at = match self.created_at.as_deref() {
            Some(raw) => parse_timestamp(raw).ok_or_else(|| cell.invalid("created_at", raw))?,
            None => return Err(cell.invalid("created_at", "")),
        };

        Ok(Review {
            id: self.id,
            technician_id: TechnicianId(self.technician_id),
            user_id: cell.number("user_id", self.user_id.as_deref())?,
            user_name: self.user_name,
            rating,
            comment: self.comment,
            created_at,
            verified: cell.flag("verified", self.verified.as_deref(), false)?,
        })
    }
}

/// Location of the row being converted, for error reporting.
struct Cell {
    line: usize,
}

impl Cell {
    fn invalid(&self, column: &'static str, value: &str) -> CatalogImportError {
        CatalogImportError::InvalidValue {
            line: self.line,
            column,
            value: value.to_string(),
        }
    }

    fn number<T: FromStr>(
        &self,
        column: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<T>, CatalogImportError> {
        raw.map(|value| value.parse::<T>().map_err(|_| self.invalid(column, value)))
            .transpose()
    }

    fn flag(
        &self,
        column: &'static str,
        raw: Option<&str>,
        default: bool,
    ) -> Result<bool, CatalogImportError> {
        let Some(value) = raw else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            _ => Err(self.invalid(column, value)),
        }
    }

    fn time(
        &self,
        column: &'static str,
        raw: Option<String>,
    ) -> Result<Option<NaiveTime>, CatalogImportError> {
        raw.map(|value| parse_time(&value).ok_or_else(|| self.invalid(column, &value)))
            .transpose()
    }
}

fn list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub(crate) fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Accepts `YYYY-MM-DD HH:MM[:SS]`, with a space or a `T` separator.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let normalized = value.trim().replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
        .ok()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
