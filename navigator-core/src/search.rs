use navigator_shared::Airport;

/// Client-side airport search over an already fetched list.
///
/// A blank query returns the list unchanged; otherwise an airport is kept when
/// its name, code, city or country contains the query, ignoring case.
pub fn filter_airports(airports: &[Airport], query: &str) -> Vec<Airport> {
    if query.trim().is_empty() {
        return airports.to_vec();
    }
    let needle = query.to_lowercase();
    airports
        .iter()
        .filter(|airport| airport.matches(&needle))
        .cloned()
        .collect()
}

/// Normalized pattern sent to the remote flight search, `None` when blank.
pub fn flight_search_pattern(query: &str) -> Option<String> {
    let pattern = query.trim().to_uppercase();
    if pattern.is_empty() {
        None
    } else {
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn airport(code: &str, name: &str, city: &str, country: &str) -> Airport {
        Airport {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            timezone: String::new(),
            latitude: None,
            longitude: None,
        }
    }

    fn sample() -> Vec<Airport> {
        vec![
            airport("JFK", "John F. Kennedy International", "New York", "United States"),
            airport("LAX", "Los Angeles International", "Los Angeles", "United States"),
            airport("LHR", "Heathrow", "London", "United Kingdom"),
        ]
    }

    #[test]
    fn test_search_by_code_returns_only_match() {
        let airports = sample();
        let result = filter_airports(&airports[..2], "JFK");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "JFK");
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let airports = sample();
        assert_eq!(filter_airports(&airports, ""), airports);
        assert_eq!(filter_airports(&airports, "   "), airports);
    }

    #[test]
    fn test_matches_each_field_case_insensitively() {
        let airports = sample();
        assert_eq!(filter_airports(&airports, "heath")[0].code, "LHR");
        assert_eq!(filter_airports(&airports, "los ANGELES")[0].code, "LAX");
        assert_eq!(filter_airports(&airports, "kingdom")[0].code, "LHR");
        assert_eq!(filter_airports(&airports, "united").len(), 3);
        assert!(filter_airports(&airports, "tokyo").is_empty());
    }

    #[test]
    fn test_result_is_exactly_the_matching_subset() {
        let airports = sample();
        for query in ["a", "on", "x", "ne", "UNITED S"] {
            let needle = query.to_lowercase();
            let expected: Vec<Airport> = airports
                .iter()
                .filter(|a| {
                    [&a.name, &a.code, &a.city, &a.country]
                        .iter()
                        .any(|f| f.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect();
            assert_eq!(filter_airports(&airports, query), expected, "query {query:?}");
        }
    }

    #[test]
    fn test_flight_search_pattern() {
        assert_eq!(flight_search_pattern("  aa1 "), Some("AA1".to_string()));
        assert_eq!(flight_search_pattern("   "), None);
    }
}
