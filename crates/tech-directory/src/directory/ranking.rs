//! Ordering of filtered candidates by the requested sort mode.
//!
//! Each mode maps to one `RankingRule`: a key extractor, a direction, and whether
//! equal keys fall back to the case-insensitive name. Absent keys always sort last,
//! whatever the direction, and the sort is stable.

use super::domain::{Coordinates, Technician};
use super::geo::{distance_between, Distance};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortMode {
    Distance,
    Rating,
    Price,
    Name,
}

impl SortMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Rating => "rating",
            Self::Price => "price",
            Self::Name => "name",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "distance" => Some(Self::Distance),
            "rating" => Some(Self::Rating),
            "price" => Some(Self::Price),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    /// Picks the effective mode for a request. Missing or unknown values fall back to
    /// `distance` when the requester sent a position and to `name` otherwise; `distance`
    /// itself degrades to `name` without a reference point.
    pub fn resolve(requested: Option<&str>, has_origin: bool) -> Self {
        match requested.and_then(Self::parse) {
            Some(Self::Distance) | None if has_origin => Self::Distance,
            Some(Self::Distance) | None => Self::Name,
            Some(mode) => mode,
        }
    }
}

/// Everything the ranking stage needs besides the candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingRequest {
    pub mode: SortMode,
    pub origin: Option<Coordinates>,
    pub max_distance_km: Option<f64>,
}

/// A candidate annotated with its distance from the requester.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTechnician {
    pub technician: Technician,
    pub distance: Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

enum RankKey<'a> {
    Number(Option<f64>),
    Text(Option<&'a str>),
}

#[derive(Clone, Copy)]
struct RankingRule {
    key: fn(&RankedTechnician) -> RankKey<'_>,
    direction: Direction,
    name_tie_break: bool,
}

fn distance_key(candidate: &RankedTechnician) -> RankKey<'_> {
    RankKey::Number(candidate.distance.km())
}

fn rating_key(candidate: &RankedTechnician) -> RankKey<'_> {
    RankKey::Number(Some(candidate.technician.rating()))
}

fn price_key(candidate: &RankedTechnician) -> RankKey<'_> {
    RankKey::Number(candidate.technician.fee_amount())
}

fn name_key(candidate: &RankedTechnician) -> RankKey<'_> {
    RankKey::Text(candidate.technician.display_name())
}

fn rule_for(mode: SortMode) -> RankingRule {
    match mode {
        SortMode::Distance => RankingRule {
            key: distance_key,
            direction: Direction::Ascending,
            name_tie_break: true,
        },
        SortMode::Rating => RankingRule {
            key: rating_key,
            direction: Direction::Descending,
            name_tie_break: true,
        },
        SortMode::Price => RankingRule {
            key: price_key,
            direction: Direction::Ascending,
            name_tie_break: true,
        },
        SortMode::Name => RankingRule {
            key: name_key,
            direction: Direction::Ascending,
            name_tie_break: false,
        },
    }
}

/// Annotates, drops out-of-range candidates, and orders the rest.
pub fn rank(candidates: Vec<Technician>, request: &RankingRequest) -> Vec<RankedTechnician> {
    let mut ranked: Vec<RankedTechnician> = candidates
        .into_iter()
        .map(|technician| RankedTechnician {
            distance: distance_between(request.origin, technician.location),
            technician,
        })
        .collect();

    if let (Some(_), Some(max_km)) = (request.origin, request.max_distance_km) {
        ranked.retain(|candidate| candidate.distance.is_within(max_km));
    }

    let mode = match (request.mode, request.origin) {
        (SortMode::Distance, None) => SortMode::Name,
        (mode, _) => mode,
    };
    sort_by_mode(&mut ranked, mode);
    ranked
}

fn sort_by_mode(candidates: &mut [RankedTechnician], mode: SortMode) {
    let rule = rule_for(mode);
    candidates.sort_by(|a, b| {
        let ord = compare_keys((rule.key)(a), (rule.key)(b), rule.direction);

        if ord != Ordering::Equal || !rule.name_tie_break {
            return ord;
        }

        compare_keys(name_key(a), name_key(b), Direction::Ascending)
    });
}

fn compare_keys(a: RankKey<'_>, b: RankKey<'_>, direction: Direction) -> Ordering {
    match (a, b) {
        (RankKey::Number(a), RankKey::Number(b)) => present_first(
            a.filter(|value| value.is_finite()),
            b.filter(|value| value.is_finite()),
            |a, b| direction.apply(a.total_cmp(&b)),
        ),
        (RankKey::Text(a), RankKey::Text(b)) => {
            present_first(a, b, |a, b| direction.apply(cmp_ignore_case(a, b)))
        }
        _ => Ordering::Equal,
    }
}

fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::domain::ServiceFee;

    fn technician(id: u64, name: &str) -> Technician {
        Technician::new(id, name)
    }

    fn rated(id: u64, name: &str, rating: Option<f64>) -> Technician {
        Technician {
            average_rating: rating,
            ..technician(id, name)
        }
    }

    fn priced(id: u64, name: &str, fee: Option<f64>) -> Technician {
        Technician {
            base_service_fee: fee.map(|amount| ServiceFee {
                amount,
                currency: None,
            }),
            ..technician(id, name)
        }
    }

    fn located(id: u64, name: &str, location: Option<(f64, f64)>) -> Technician {
        Technician {
            location: location.map(|(lat, lng)| Coordinates::new(lat, lng)),
            ..technician(id, name)
        }
    }

    fn request(mode: SortMode) -> RankingRequest {
        RankingRequest {
            mode,
            origin: None,
            max_distance_km: None,
        }
    }

    fn order(ranked: &[RankedTechnician]) -> Vec<String> {
        ranked
            .iter()
            .map(|candidate| candidate.technician.full_name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn resolve_applies_documented_fallbacks() {
        assert_eq!(SortMode::resolve(None, true), SortMode::Distance);
        assert_eq!(SortMode::resolve(None, false), SortMode::Name);
        assert_eq!(SortMode::resolve(Some("distance"), false), SortMode::Name);
        assert_eq!(SortMode::resolve(Some("popularity"), true), SortMode::Distance);
        assert_eq!(SortMode::resolve(Some("popularity"), false), SortMode::Name);
        assert_eq!(SortMode::resolve(Some(" Rating "), false), SortMode::Rating);
        assert_eq!(SortMode::resolve(Some("price"), true), SortMode::Price);
    }

    #[test]
    fn only_rating_sorts_descending_and_only_name_skips_the_tie_break() {
        for mode in [SortMode::Distance, SortMode::Price] {
            let rule = rule_for(mode);
            assert_eq!(rule.direction, Direction::Ascending);
            assert!(rule.name_tie_break);
        }

        let rating = rule_for(SortMode::Rating);
        assert_eq!(rating.direction, Direction::Descending);
        assert!(rating.name_tie_break);

        let name = rule_for(SortMode::Name);
        assert_eq!(name.direction, Direction::Ascending);
        assert!(!name.name_tie_break);
    }

    #[test]
    fn distance_mode_orders_nearest_first_and_unlocated_last() {
        let origin = Coordinates::new(30.0, 31.0);
        let candidates = vec![
            located(1, "Nowhere", None),
            located(2, "Far", Some((31.2, 29.9))),
            located(3, "Here", Some((30.0, 31.0))),
            located(4, "Near", Some((30.05, 31.05))),
        ];
        let ranked = rank(
            candidates,
            &RankingRequest {
                origin: Some(origin),
                ..request(SortMode::Distance)
            },
        );
        assert_eq!(order(&ranked), vec!["Here", "Near", "Far", "Nowhere"]);
        assert!(ranked[0].distance.km().expect("finite") < 1e-9);
        assert_eq!(ranked[3].distance, Distance::Unbounded);
    }

    #[test]
    fn max_distance_drops_far_and_unlocated_candidates() {
        let ranked = rank(
            vec![
                located(1, "Nowhere", None),
                located(2, "Far", Some((31.2, 29.9))),
                located(3, "Near", Some((30.05, 31.05))),
            ],
            &RankingRequest {
                mode: SortMode::Rating,
                origin: Some(Coordinates::new(30.0, 31.0)),
                max_distance_km: Some(25.0),
            },
        );
        assert_eq!(order(&ranked), vec!["Near"]);
    }

    #[test]
    fn max_distance_is_ignored_without_origin() {
        let ranked = rank(
            vec![located(1, "Nowhere", None), located(2, "Far", Some((31.2, 29.9)))],
            &RankingRequest {
                max_distance_km: Some(1.0),
                ..request(SortMode::Name)
            },
        );
        assert_eq!(order(&ranked), vec!["Far", "Nowhere"]);
    }

    #[test]
    fn distance_without_origin_sorts_by_name() {
        let ranked = rank(
            vec![
                located(1, "zeinab", Some((30.0, 31.0))),
                located(2, "Adham", None),
            ],
            &request(SortMode::Distance),
        );
        assert_eq!(order(&ranked), vec!["Adham", "zeinab"]);
    }

    #[test]
    fn rating_mode_prefers_higher_rating_regardless_of_name() {
        let ranked = rank(
            vec![
                rated(1, "Aya", Some(3.5)),
                rated(2, "Ziad", Some(4.9)),
                rated(3, "Basma", None),
                rated(4, "Mahmoud", Some(0.0)),
            ],
            &request(SortMode::Rating),
        );
        assert_eq!(order(&ranked), vec!["Ziad", "Aya", "Basma", "Mahmoud"]);
    }

    #[test]
    fn rating_ties_break_alphabetically() {
        let ranked = rank(
            vec![
                rated(1, "karim", Some(4.5)),
                rated(2, "Hoda", Some(4.5)),
                rated(3, "Adel", Some(4.5)),
            ],
            &request(SortMode::Rating),
        );
        assert_eq!(order(&ranked), vec!["Adel", "Hoda", "karim"]);
    }

    #[test]
    fn price_mode_puts_unpriced_after_every_priced_candidate() {
        let ranked = rank(
            vec![
                priced(1, "Aaron", None),
                priced(2, "Nour", Some(900.0)),
                priced(3, "Fady", Some(50.0)),
                priced(4, "Badr", Some(50.0)),
            ],
            &request(SortMode::Price),
        );
        assert_eq!(order(&ranked), vec!["Badr", "Fady", "Nour", "Aaron"]);
    }

    #[test]
    fn name_mode_is_case_insensitive_and_puts_missing_names_last() {
        let mut nameless = technician(9, "");
        nameless.full_name = None;
        let ranked = rank(
            vec![
                nameless,
                technician(1, "mostafa"),
                technician(2, "Ahmed"),
                technician(3, "basem"),
            ],
            &request(SortMode::Name),
        );
        assert_eq!(order(&ranked), vec!["Ahmed", "basem", "mostafa", ""]);
    }

    #[test]
    fn equal_names_keep_their_input_order() {
        let ranked = rank(
            vec![technician(5, "Samir"), technician(2, "SAMIR"), technician(9, "samir")],
            &request(SortMode::Name),
        );
        let ids: Vec<u64> = ranked.iter().map(|c| c.technician.id.0).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn non_finite_ratings_sort_with_the_missing() {
        let ranked = rank(
            vec![rated(1, "Broken", Some(f64::NAN)), rated(2, "Solid", Some(1.0))],
            &request(SortMode::Rating),
        );
        assert_eq!(order(&ranked), vec!["Solid", "Broken"]);
    }
}
