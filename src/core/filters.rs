use crate::models::{SeekerProfile, ShelterRecord};

/// Check whether a shelter is eligible for the seeker
///
/// This is the hard-constraint stage of the pipeline: a record failing it is
/// excluded outright and never scored. The niche rules only exclude
/// providers exclusively serving a community the seeker is not part of; a
/// general provider is never excluded by them.
#[inline]
pub fn matches_eligibility(record: &ShelterRecord, profile: &SeekerProfile) -> bool {
    // City must match (city is always known, unlike the zip code)
    if record.city != profile.city {
        return false;
    }

    // Sex served must cover the seeker
    if !record.sex_served.admits(profile.sex) {
        return false;
    }

    // LGBTQ-exclusive providers only match seekers in that community
    if !profile.lgbtq && record.lgbtq_specific {
        return false;
    }

    // Same exclusion rule for domestic-violence-specific providers
    if !profile.domestic_violence && record.dv_specific {
        return false;
    }

    true
}

/// Apply the hard-eligibility predicate to the whole catalog
///
/// An empty result is valid; downstream reports "no matches" rather than
/// treating it as a failure.
pub fn filter_catalog(catalog: Vec<ShelterRecord>, profile: &SeekerProfile) -> Vec<ShelterRecord> {
    catalog
        .into_iter()
        .filter(|record| matches_eligibility(record, profile))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DurationNeed, DurationTier, Sex, SexServed, UrgencyNeed, UrgencyTier, WeekSchedule,
    };

    fn create_record(city: &str, sex_served: SexServed, lgbtq: bool, dv: bool) -> ShelterRecord {
        ShelterRecord {
            organization_name: "Test Org".to_string(),
            program_name: "Test Program".to_string(),
            shelter_type: "Emergency Shelter".to_string(),
            city: city.to_string(),
            postal_code: "94102".to_string(),
            address: "123 Main St".to_string(),
            sex_served,
            lgbtq_specific: lgbtq,
            dv_specific: dv,
            urgency: UrgencyTier::Immediate,
            duration: DurationTier::Overnight,
            schedule: WeekSchedule::default(),
            services: "beds, meals".to_string(),
            open_hours: String::new(),
            summary: String::new(),
            application_details: String::new(),
            program_about: String::new(),
            organization_about: String::new(),
            phone: String::new(),
            webpage: String::new(),
        }
    }

    fn create_profile(city: &str, sex: Sex, lgbtq: bool, dv: bool) -> SeekerProfile {
        SeekerProfile {
            city: city.to_string(),
            postal_code: None,
            sex,
            lgbtq,
            domestic_violence: dv,
            urgency: UrgencyNeed::Today,
            duration: DurationNeed::Overnight,
            needs: String::new(),
        }
    }

    #[test]
    fn test_city_mismatch_excluded() {
        let record = create_record("Oakland", SexServed::All, false, false);
        let profile = create_profile("San Francisco", Sex::Male, false, false);

        assert!(!matches_eligibility(&record, &profile));
    }

    #[test]
    fn test_sex_served_all_admits_everyone() {
        let record = create_record("San Francisco", SexServed::All, false, false);

        for sex in [Sex::Male, Sex::Female, Sex::Other] {
            let profile = create_profile("San Francisco", sex, false, false);
            assert!(matches_eligibility(&record, &profile));
        }
    }

    #[test]
    fn test_sex_served_exclusionary() {
        // A shelter serving only women excludes a male seeker regardless of
        // any other attribute
        let record = create_record("San Francisco", SexServed::Female, false, false);
        let profile = create_profile("San Francisco", Sex::Male, false, false);

        assert!(!matches_eligibility(&record, &profile));
    }

    #[test]
    fn test_lgbtq_specific_excluded_for_non_lgbtq_seeker() {
        let record = create_record("San Francisco", SexServed::All, true, false);
        let profile = create_profile("San Francisco", Sex::Female, false, false);

        assert!(!matches_eligibility(&record, &profile));
    }

    #[test]
    fn test_lgbtq_seeker_matches_general_and_specific() {
        let general = create_record("San Francisco", SexServed::All, false, false);
        let specific = create_record("San Francisco", SexServed::All, true, false);
        let profile = create_profile("San Francisco", Sex::Female, true, false);

        assert!(matches_eligibility(&general, &profile));
        assert!(matches_eligibility(&specific, &profile));
    }

    #[test]
    fn test_dv_specific_excluded_for_non_dv_seeker() {
        let record = create_record("San Francisco", SexServed::All, false, true);
        let profile = create_profile("San Francisco", Sex::Female, false, false);

        assert!(!matches_eligibility(&record, &profile));
    }

    #[test]
    fn test_filter_catalog_conjunctive() {
        let catalog = vec![
            create_record("San Francisco", SexServed::All, false, false),
            create_record("San Francisco", SexServed::Female, false, false),
            create_record("Oakland", SexServed::All, false, false),
            create_record("San Francisco", SexServed::All, true, false),
        ];
        let profile = create_profile("San Francisco", Sex::Male, false, false);

        let survivors = filter_catalog(catalog, &profile);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].sex_served, SexServed::All);
        assert!(!survivors[0].lgbtq_specific);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let catalog = vec![create_record("Berkeley", SexServed::All, false, false)];
        let profile = create_profile("San Francisco", Sex::Other, false, false);

        assert!(filter_catalog(catalog, &profile).is_empty());
    }
}
