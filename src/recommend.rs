//! Packing recommendation derivation
//!
//! Pure function over a weather description and activity tags. Weather
//! checks run before activity checks, and the result is intentionally not
//! deduplicated: overlapping matches may repeat an item.

/// Derive packing suggestions from a weather description and activity tags
///
/// Case-insensitive substring matching on the weather description
/// ("rain", "snow") plus exact activity tags ("hiking", "beach").
#[must_use]
pub fn recommend_packing(weather_description: &str, activity_tags: &[String]) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let weather = weather_description.to_lowercase();

    if weather.contains("rain") {
        items.extend(["Raincoat".to_string(), "Umbrella".to_string()]);
    }
    if weather.contains("snow") {
        items.extend([
            "Gloves".to_string(),
            "Boots".to_string(),
            "Heavy Coat".to_string(),
        ]);
    }

    if activity_tags.iter().any(|tag| tag == "hiking") {
        items.extend(["Hiking boots".to_string(), "Bug spray".to_string()]);
    }
    if activity_tags.iter().any(|tag| tag == "beach") {
        items.extend(["Swimsuit".to_string(), "Sunscreen".to_string()]);
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_rain_and_hiking_ordering() {
        let items = recommend_packing("light rain expected", &tags(&["hiking"]));
        assert_eq!(items, ["Raincoat", "Umbrella", "Hiking boots", "Bug spray"]);
    }

    #[test]
    fn test_clear_skies_no_activities() {
        let items = recommend_packing("clear skies", &[]);
        assert!(items.is_empty());
    }

    #[rstest]
    #[case("Heavy RAIN showers", &["Raincoat", "Umbrella"])]
    #[case("Snow flurries", &["Gloves", "Boots", "Heavy Coat"])]
    #[case("rain turning to snow", &["Raincoat", "Umbrella", "Gloves", "Boots", "Heavy Coat"])]
    fn test_weather_matching(#[case] description: &str, #[case] expected: &[&str]) {
        let items = recommend_packing(description, &[]);
        assert_eq!(items, expected);
    }

    #[rstest]
    #[case(&["beach"], &["Swimsuit", "Sunscreen"])]
    #[case(&["hiking", "beach"], &["Hiking boots", "Bug spray", "Swimsuit", "Sunscreen"])]
    #[case(&["museum"], &[])]
    fn test_activity_matching(#[case] activity: &[&str], #[case] expected: &[&str]) {
        let items = recommend_packing("mild", &tags(activity));
        assert_eq!(items, expected);
    }

    #[test]
    fn test_no_deduplication_across_repeated_tags() {
        // Tag matching is any-based, so repeated tags add items once,
        // but weather and activity overlap is never collapsed.
        let items = recommend_packing("rain", &tags(&["hiking", "hiking"]));
        assert_eq!(items, ["Raincoat", "Umbrella", "Hiking boots", "Bug spray"]);
    }
}
