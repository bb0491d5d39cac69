use crate::core::{
    distance::{haversine_distance, normalize_distances, Geocoder},
    error::OracleError,
    filters::filter_catalog,
    scoring::{aggregate_scores, availability_score, availability_weight, duration_score, urgency_score},
    semantic::{normalize_rating, SemanticOracle},
};
use crate::models::{Coordinates, Criterion, ScoredShelter, SeekerProfile, ShelterRecord};
use chrono::NaiveDateTime;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Tunables for the matching pipeline
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Maximum shortlist length returned to the seeker
    pub shortlist_size: usize,
    /// Upper bound on any single oracle call
    pub oracle_timeout: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            shortlist_size: 3,
            oracle_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub shortlist: Vec<ScoredShelter>,
    pub total_candidates: usize,
    pub eligible_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline stages
/// 1. Hard-eligibility filtering (city, sex served, niche exclusions)
/// 2. Per-criterion scoring; oracle-backed criteria fan out concurrently
/// 3. Weighted aggregation over the criteria actually computed
/// 4. Stable ascending ranking, truncated to the shortlist size
pub struct Matcher {
    geocoder: Arc<dyn Geocoder>,
    oracle: Arc<dyn SemanticOracle>,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        oracle: Arc<dyn SemanticOracle>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            geocoder,
            oracle,
            config,
        }
    }

    /// Filter, score, and rank the catalog for one seeker
    ///
    /// `now` is the current date-time in the seeker-facing timezone.
    ///
    /// Criteria whose prerequisite input is missing (no zip code, blank
    /// needs text, urgency a week out) are omitted from both scoring and
    /// the aggregate denominator. A single candidate's oracle failure only
    /// omits the affected criterion for that candidate; the batch proceeds.
    pub async fn find_shelters(
        &self,
        profile: &SeekerProfile,
        catalog: Vec<ShelterRecord>,
        now: NaiveDateTime,
    ) -> MatchResult {
        let total_candidates = catalog.len();

        // Stage 1: hard constraints; failures are never scored
        let candidates = filter_catalog(catalog, profile);
        let eligible_candidates = candidates.len();

        if candidates.is_empty() {
            debug!("No eligible candidates out of {}", total_candidates);
            return MatchResult {
                shortlist: Vec::new(),
                total_candidates,
                eligible_candidates,
            };
        }

        // Stage 2: oracle-backed criteria, keyed by candidate position
        let distance_scores = match &profile.postal_code {
            Some(postal_code) => match self.distance_scores(postal_code, &candidates).await {
                Ok(scores) => scores,
                Err(e) => {
                    // Seeker-side geocoding failure: omit the distance
                    // criterion for this whole query
                    warn!("Distance scoring omitted for this query: {}", e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        let service_scores = match profile.needs() {
            Some(needs) => self.service_scores(needs, &candidates).await,
            None => HashMap::new(),
        };

        let availability_applies = availability_weight(profile.urgency).is_some();

        // Stage 3: per-candidate aggregation
        let mut scored: Vec<ScoredShelter> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let mut scores = BTreeMap::new();

                if let Some(score) = distance_scores.get(&index) {
                    scores.insert(Criterion::Distance, *score);
                }
                scores.insert(Criterion::Urgency, urgency_score(profile.urgency, record.urgency));
                scores.insert(
                    Criterion::Duration,
                    duration_score(profile.duration, record.duration),
                );
                if let Some(score) = service_scores.get(&index) {
                    scores.insert(Criterion::Services, *score);
                }
                if availability_applies {
                    scores.insert(
                        Criterion::Availability,
                        availability_score(&record.schedule, now),
                    );
                }

                // No applicable criteria leaves every total at 0.0, so the
                // stable sort below degrades to catalog order
                let total = aggregate_scores(&scores, profile.urgency).unwrap_or(0.0);

                ScoredShelter {
                    record,
                    scores,
                    total,
                }
            })
            .collect();

        // Stage 4: stable ascending sort (lower total = better fit);
        // ties keep catalog order
        scored.sort_by(|a, b| {
            a.total
                .partial_cmp(&b.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(self.config.shortlist_size);

        debug!(
            "Ranked {} of {} eligible candidates",
            scored.len(),
            eligible_candidates
        );

        MatchResult {
            shortlist: scored,
            total_candidates,
            eligible_candidates,
        }
    }

    /// Proximity scores for every candidate that geocodes successfully
    ///
    /// The seeker's own postal code must resolve or the whole criterion is
    /// abandoned (the caller decides how to treat that). Candidate lookups
    /// fan out concurrently; a failed or timed-out lookup drops only that
    /// candidate from the distance map, and normalization runs over the
    /// distances actually observed.
    async fn distance_scores(
        &self,
        seeker_postal_code: &str,
        candidates: &[ShelterRecord],
    ) -> Result<HashMap<usize, f64>, OracleError> {
        let timeout = self.config.oracle_timeout;

        let seeker = tokio::time::timeout(timeout, self.geocoder.resolve(seeker_postal_code))
            .await
            .map_err(|_| OracleError::Timeout(timeout))??;

        let lookups = candidates.iter().enumerate().map(|(index, record)| {
            let geocoder = Arc::clone(&self.geocoder);
            let postal_code = record.postal_code.clone();
            async move {
                match tokio::time::timeout(timeout, geocoder.resolve(&postal_code)).await {
                    Ok(Ok(coordinates)) => Some((index, coordinates)),
                    Ok(Err(e)) => {
                        warn!("Geocoding failed for {}, omitting distance: {}", postal_code, e);
                        None
                    }
                    Err(_) => {
                        warn!("Geocoding timed out for {}, omitting distance", postal_code);
                        None
                    }
                }
            }
        });

        let resolved: Vec<(usize, Coordinates)> =
            join_all(lookups).await.into_iter().flatten().collect();

        let distances: Vec<f64> = resolved
            .iter()
            .map(|(_, coordinates)| {
                haversine_distance(seeker.lat, seeker.lon, coordinates.lat, coordinates.lon)
            })
            .collect();

        let normalized = normalize_distances(&distances);

        Ok(resolved
            .iter()
            .map(|(index, _)| *index)
            .zip(normalized)
            .collect())
    }

    /// Semantic need-fit scores for every candidate the oracle rates
    ///
    /// Calls fan out concurrently; a failure, timeout, or contract
    /// violation drops only that candidate's services criterion.
    async fn service_scores(
        &self,
        needs: &str,
        candidates: &[ShelterRecord],
    ) -> HashMap<usize, f64> {
        let timeout = self.config.oracle_timeout;

        let calls = candidates.iter().enumerate().map(|(index, record)| {
            let oracle = Arc::clone(&self.oracle);
            let needs = needs.to_string();
            let services = record.services.clone();
            async move {
                let outcome = match tokio::time::timeout(timeout, oracle.compare(&needs, &services))
                    .await
                {
                    Ok(Ok(rating)) => normalize_rating(rating),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(OracleError::Timeout(timeout)),
                };

                match outcome {
                    Ok(score) => Some((index, score)),
                    Err(e) => {
                        warn!("Semantic scoring failed for candidate {}, omitting: {}", index, e);
                        None
                    }
                }
            }
        });

        join_all(calls).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DurationNeed, DurationTier, DayWindow, Sex, SexServed, UrgencyNeed, UrgencyTier,
        WeekSchedule,
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};

    struct StubGeocoder {
        coordinates: HashMap<String, Coordinates>,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn resolve(&self, postal_code: &str) -> Result<Coordinates, OracleError> {
            self.coordinates
                .get(postal_code)
                .copied()
                .ok_or_else(|| OracleError::Api(format!("unknown zip {}", postal_code)))
        }
    }

    struct StubOracle {
        ratings: HashMap<String, u8>,
    }

    #[async_trait]
    impl SemanticOracle for StubOracle {
        async fn compare(&self, _needs: &str, services: &str) -> Result<u8, OracleError> {
            self.ratings
                .get(services)
                .copied()
                .ok_or_else(|| OracleError::Api("no rating".to_string()))
        }
    }

    fn create_record(
        name: &str,
        postal_code: &str,
        urgency: UrgencyTier,
        duration: DurationTier,
        services: &str,
    ) -> ShelterRecord {
        ShelterRecord {
            organization_name: name.to_string(),
            program_name: format!("{} Program", name),
            shelter_type: "Emergency Shelter".to_string(),
            city: "San Francisco".to_string(),
            postal_code: postal_code.to_string(),
            address: "123 Main St".to_string(),
            sex_served: SexServed::All,
            lgbtq_specific: false,
            dv_specific: false,
            urgency,
            duration,
            schedule: WeekSchedule::default(),
            services: services.to_string(),
            open_hours: String::new(),
            summary: String::new(),
            application_details: String::new(),
            program_about: String::new(),
            organization_about: String::new(),
            phone: String::new(),
            webpage: String::new(),
        }
    }

    fn create_profile(
        postal_code: Option<&str>,
        urgency: UrgencyNeed,
        duration: DurationNeed,
        needs: &str,
    ) -> SeekerProfile {
        SeekerProfile {
            city: "San Francisco".to_string(),
            postal_code: postal_code.map(str::to_string),
            sex: Sex::Female,
            lgbtq: false,
            domestic_violence: false,
            urgency,
            duration,
            needs: needs.to_string(),
        }
    }

    fn create_matcher(geocoder: StubGeocoder, oracle: StubOracle) -> Matcher {
        Matcher::new(Arc::new(geocoder), Arc::new(oracle), MatcherConfig::default())
    }

    fn empty_stubs() -> (StubGeocoder, StubOracle) {
        (
            StubGeocoder {
                coordinates: HashMap::new(),
            },
            StubOracle {
                ratings: HashMap::new(),
            },
        )
    }

    fn monday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_ranking_driven_by_duration_when_other_criteria_absent() {
        // No zip, no needs, urgency a week out: distance, services, and
        // availability are all omitted. Every candidate shares the same
        // urgency tier, so the ordering is decided by duration fit alone.
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::WeekOrMore, DurationNeed::Overnight, "");

        let catalog = vec![
            create_record("Long", "94110", UrgencyTier::Moderate, DurationTier::LongTerm, "beds"),
            create_record("Night", "94103", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
            create_record("Temp", "94109", UrgencyTier::Moderate, DurationTier::Temporary, "beds"),
        ];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist.len(), 3);
        assert_eq!(result.shortlist[0].record.organization_name, "Night");
        assert_eq!(result.shortlist[1].record.organization_name, "Temp");
        assert_eq!(result.shortlist[2].record.organization_name, "Long");

        // Urgency (always supplied) and duration are the only criteria
        for scored in &result.shortlist {
            assert_eq!(scored.scores.len(), 2);
            assert!(scored.scores.contains_key(&Criterion::Urgency));
            assert!(scored.scores.contains_key(&Criterion::Duration));
        }
    }

    #[tokio::test]
    async fn test_truncates_to_shortlist_size() {
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::WeekOrMore, DurationNeed::Overnight, "");

        let catalog: Vec<ShelterRecord> = (0..10)
            .map(|i| {
                create_record(
                    &format!("Shelter {}", i),
                    "94103",
                    UrgencyTier::Moderate,
                    DurationTier::Overnight,
                    "beds",
                )
            })
            .collect();

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist.len(), 3);
        assert_eq!(result.eligible_candidates, 10);
    }

    #[tokio::test]
    async fn test_returns_fewer_than_shortlist_size_without_error() {
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::WeekOrMore, DurationNeed::Overnight, "");

        let catalog = vec![create_record(
            "Only",
            "94103",
            UrgencyTier::Moderate,
            DurationTier::Overnight,
            "beds",
        )];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_valid() {
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::Today, DurationNeed::Overnight, "");

        let result = matcher.find_shelters(&profile, Vec::new(), monday_noon()).await;

        assert!(result.shortlist.is_empty());
        assert_eq!(result.total_candidates, 0);
    }

    #[tokio::test]
    async fn test_ties_keep_catalog_order() {
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::WeekOrMore, DurationNeed::Overnight, "");

        let catalog = vec![
            create_record("First", "94103", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
            create_record("Second", "94109", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
            create_record("Third", "94110", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
        ];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist[0].record.organization_name, "First");
        assert_eq!(result.shortlist[1].record.organization_name, "Second");
        assert_eq!(result.shortlist[2].record.organization_name, "Third");
    }

    #[tokio::test]
    async fn test_distance_scores_relative_to_result_set() {
        let mut coordinates = HashMap::new();
        coordinates.insert("94103".to_string(), Coordinates { lat: 37.7749, lon: -122.4194 });
        coordinates.insert("94110".to_string(), Coordinates { lat: 37.7599, lon: -122.4148 });
        coordinates.insert("94601".to_string(), Coordinates { lat: 37.7786, lon: -122.2174 });
        let geocoder = StubGeocoder { coordinates };
        let (_, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);

        let profile = create_profile(
            Some("94103"),
            UrgencyNeed::WeekOrMore,
            DurationNeed::Overnight,
            "",
        );
        let catalog = vec![
            create_record("Near", "94110", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
            create_record("Far", "94601", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
        ];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        let near = &result.shortlist[0];
        let far = &result.shortlist[1];
        assert_eq!(near.record.organization_name, "Near");
        // Farthest candidate normalizes to exactly 1.0
        assert_eq!(far.scores[&Criterion::Distance], 1.0);
        assert!(near.scores[&Criterion::Distance] < 1.0);
    }

    #[tokio::test]
    async fn test_seeker_geocode_failure_omits_distance_for_query() {
        let mut coordinates = HashMap::new();
        // Candidate zips resolve; the seeker's does not
        coordinates.insert("94110".to_string(), Coordinates { lat: 37.7599, lon: -122.4148 });
        let geocoder = StubGeocoder { coordinates };
        let (_, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);

        let profile = create_profile(
            Some("00000"),
            UrgencyNeed::WeekOrMore,
            DurationNeed::Overnight,
            "",
        );
        let catalog = vec![create_record(
            "Near",
            "94110",
            UrgencyTier::Moderate,
            DurationTier::Overnight,
            "beds",
        )];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist.len(), 1);
        assert!(!result.shortlist[0].scores.contains_key(&Criterion::Distance));
    }

    #[tokio::test]
    async fn test_candidate_geocode_failure_is_isolated() {
        let mut coordinates = HashMap::new();
        coordinates.insert("94103".to_string(), Coordinates { lat: 37.7749, lon: -122.4194 });
        coordinates.insert("94110".to_string(), Coordinates { lat: 37.7599, lon: -122.4148 });
        // "99999" is missing: that candidate loses only its distance score
        let geocoder = StubGeocoder { coordinates };
        let (_, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);

        let profile = create_profile(
            Some("94103"),
            UrgencyNeed::WeekOrMore,
            DurationNeed::Overnight,
            "",
        );
        let catalog = vec![
            create_record("Good", "94110", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
            create_record("Bad", "99999", UrgencyTier::Moderate, DurationTier::Overnight, "beds"),
        ];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist.len(), 2);
        let good = result
            .shortlist
            .iter()
            .find(|s| s.record.organization_name == "Good")
            .unwrap();
        let bad = result
            .shortlist
            .iter()
            .find(|s| s.record.organization_name == "Bad")
            .unwrap();
        assert!(good.scores.contains_key(&Criterion::Distance));
        assert!(!bad.scores.contains_key(&Criterion::Distance));
    }

    #[tokio::test]
    async fn test_semantic_failure_is_isolated() {
        let (geocoder, _) = empty_stubs();
        let mut ratings = HashMap::new();
        ratings.insert("beds and meals".to_string(), 2);
        // "case management" has no rating: the oracle errors for it
        let oracle = StubOracle { ratings };
        let matcher = create_matcher(geocoder, oracle);

        let profile = create_profile(
            None,
            UrgencyNeed::WeekOrMore,
            DurationNeed::Overnight,
            "somewhere to sleep tonight",
        );
        let catalog = vec![
            create_record("Rated", "94103", UrgencyTier::Moderate, DurationTier::Overnight, "beds and meals"),
            create_record("Unrated", "94110", UrgencyTier::Moderate, DurationTier::Overnight, "case management"),
        ];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert_eq!(result.shortlist.len(), 2);
        let rated = result
            .shortlist
            .iter()
            .find(|s| s.record.organization_name == "Rated")
            .unwrap();
        let unrated = result
            .shortlist
            .iter()
            .find(|s| s.record.organization_name == "Unrated")
            .unwrap();
        assert_eq!(rated.scores[&Criterion::Services], 0.2);
        assert!(!unrated.scores.contains_key(&Criterion::Services));
    }

    #[tokio::test]
    async fn test_today_urgency_weights_availability_triple() {
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::Today, DurationNeed::Overnight, "");

        let mut open_schedule = WeekSchedule::default();
        open_schedule.windows[0] = Some(DayWindow {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        });

        // Closed shelter fits urgency perfectly; open shelter does not
        let closed = create_record("Closed", "94103", UrgencyTier::Immediate, DurationTier::Overnight, "beds");
        let mut open = create_record("Open", "94110", UrgencyTier::High, DurationTier::Overnight, "beds");
        open.schedule = open_schedule;

        let result = matcher
            .find_shelters(&profile, vec![closed, open], monday_noon())
            .await;

        // Closed: (urgency 0 + duration 0 + 3 * availability 1) / 5 = 0.6
        // Open:   (urgency 0.75 + duration 0 + 3 * availability 0) / 5 = 0.15
        // Tripled availability outweighs the urgency mismatch
        assert_eq!(result.shortlist[0].record.organization_name, "Open");
        assert!((result.shortlist[0].total - 0.15).abs() < 1e-12);
        assert!((result.shortlist[1].total - 0.6).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_week_or_more_omits_availability() {
        let (geocoder, oracle) = empty_stubs();
        let matcher = create_matcher(geocoder, oracle);
        let profile = create_profile(None, UrgencyNeed::WeekOrMore, DurationNeed::Overnight, "");

        let catalog = vec![create_record(
            "Any",
            "94103",
            UrgencyTier::Moderate,
            DurationTier::Overnight,
            "beds",
        )];

        let result = matcher.find_shelters(&profile, catalog, monday_noon()).await;

        assert!(!result.shortlist[0]
            .scores
            .contains_key(&Criterion::Availability));
    }
}
