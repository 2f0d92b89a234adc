//! Human-readable route summaries.

use super::types::{Route, TravelMode};

/// Formats a route summary, e.g. `"2.3 km, approx. 7 min drive"`.
///
/// Distance is shown in kilometres with one decimal, duration in whole
/// minutes rounded to nearest. Ties round up in both, so 1250 m reads
/// "1.3 km".
pub fn format_summary(distance_meters: f64, duration_seconds: f64, mode: TravelMode) -> String {
    let distance_km = (distance_meters / 100.0).round() / 10.0;
    let minutes = (duration_seconds / 60.0).round();
    format!(
        "{:.1} km, approx. {:.0} min {}",
        distance_km,
        minutes,
        mode.verb()
    )
}

/// Formats the summary of a settled route.
pub fn format_route(route: &Route, mode: TravelMode) -> String {
    format_summary(route.distance_meters, route.duration_seconds, mode)
}

/// Builds the user-facing message for a failed routing attempt.
pub fn failure_message(mode: TravelMode, detail: &str) -> String {
    format!("Could not calculate {} route. {}", mode.profile(), detail)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_driving() {
        assert_eq!(
            format_summary(2345.0, 400.0, TravelMode::Driving),
            "2.3 km, approx. 7 min drive"
        );
    }

    #[test]
    fn test_format_walking() {
        assert_eq!(
            format_summary(2345.0, 400.0, TravelMode::Walking),
            "2.3 km, approx. 7 min walk"
        );
    }

    #[test]
    fn test_format_round_numbers() {
        assert_eq!(
            format_summary(5000.0, 600.0, TravelMode::Driving),
            "5.0 km, approx. 10 min drive"
        );
    }

    #[test]
    fn test_format_short_route() {
        assert_eq!(
            format_summary(80.0, 20.0, TravelMode::Walking),
            "0.1 km, approx. 0 min walk"
        );
    }

    #[test]
    fn test_format_rounds_half_kilometre_tenths_up() {
        assert_eq!(
            format_summary(250.0, 600.0, TravelMode::Driving),
            "0.3 km, approx. 10 min drive"
        );
        assert_eq!(
            format_summary(1250.0, 600.0, TravelMode::Driving),
            "1.3 km, approx. 10 min drive"
        );
        assert_eq!(
            format_summary(3250.0, 90.0, TravelMode::Walking),
            "3.3 km, approx. 2 min walk"
        );
    }

    #[test]
    fn test_format_route_uses_route_fields() {
        let route = Route::new(12_345.0, 1_830.0);
        assert_eq!(
            format_route(&route, TravelMode::Driving),
            "12.3 km, approx. 31 min drive"
        );
    }

    #[test]
    fn test_failure_message_includes_profile() {
        assert_eq!(
            failure_message(TravelMode::Walking, "HTTP error: timeout"),
            "Could not calculate foot route. HTTP error: timeout"
        );
    }

    #[test]
    fn test_failure_message_trims_empty_detail() {
        assert_eq!(
            failure_message(TravelMode::Driving, ""),
            "Could not calculate driving route."
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_summary_shape(
                meters in 0.0..1_000_000.0f64,
                seconds in 0.0..100_000.0f64,
                walking in any::<bool>(),
            ) {
                let mode = if walking { TravelMode::Walking } else { TravelMode::Driving };
                let text = format_summary(meters, seconds, mode);
                prop_assert!(text.contains(" km, approx. "));
                let suffix = if walking { " min walk" } else { " min drive" };
                prop_assert!(text.ends_with(suffix));
            }
        }
    }
}
