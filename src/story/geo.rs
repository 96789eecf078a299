use std::fmt;

/// Mean Earth radius used for great-circle distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const ORIGIN: Self = Self { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse `"<lat>,<lon>"`.
    pub fn parse(text: &str) -> Option<Self> {
        let (lat, lon) = text.split_once(',')?;
        Some(Self {
            lat: lat.trim().parse().ok()?,
            lon: lon.trim().parse().ok()?,
        })
    }

    /// Like [`parse`](Self::parse), but malformed text becomes `(0, 0)`.
    /// Such input is then matched like any other coordinate.
    pub fn parse_or_origin(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|| {
            tracing::debug!(input = text, "unparsable coordinates, using (0,0)");
            Self::ORIGIN
        })
    }

    /// Haversine distance to `other`, in meters.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let p1 = self.lat.to_radians();
        let p2 = other.lat.to_radians();
        let dp = p2 - p1;
        let dl = other.lon.to_radians() - self.lon.to_radians();

        let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Expected location and the tolerated distance around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoExpectation {
    pub point: GeoPoint,
    pub precision_m: f64,
}

impl GeoExpectation {
    pub fn new(lat: f64, lon: f64, precision_m: f64) -> Self {
        Self {
            point: GeoPoint::new(lat, lon),
            precision_m,
        }
    }

    /// Inclusive: a point exactly `precision_m` away matches.
    pub fn matches(&self, input: &str) -> bool {
        let actual = GeoPoint::parse_or_origin(input);
        self.point.distance_to(&actual) <= self.precision_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_spaces() {
        assert_eq!(
            GeoPoint::parse("43.257081, 76.924835"),
            Some(GeoPoint::new(43.257_081, 76.924_835))
        );
        assert_eq!(GeoPoint::parse("43.2"), None);
        assert_eq!(GeoPoint::parse("north,south"), None);
    }

    #[test]
    fn malformed_input_parses_as_origin() {
        assert_eq!(GeoPoint::parse_or_origin("somewhere"), GeoPoint::ORIGIN);
        assert_eq!(GeoPoint::parse_or_origin(""), GeoPoint::ORIGIN);
    }

    #[test]
    fn malformed_input_matches_expectation_at_origin() {
        let at_origin = GeoExpectation::new(0.0, 0.0, 1.0);
        assert!(at_origin.matches("not a location"));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(43.257_169, 76.924_515);
        let b = GeoPoint::new(43.257_081, 76.924_835);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
        assert!(a.distance_to(&b) < 50.0);
        assert!(a.distance_to(&b) > 20.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = GeoPoint::new(0.0, 0.0).distance_to(&GeoPoint::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn boundary_is_inclusive_and_one_meter_more_is_rejected() {
        let expected = GeoPoint::new(43.257_169, 76.924_515);
        let actual = GeoPoint::new(43.257_600, 76.925_100);
        let input = actual.to_string();
        let distance = expected.distance_to(&GeoPoint::parse(&input).unwrap());

        let exact = GeoExpectation::new(expected.lat, expected.lon, distance);
        assert!(exact.matches(&input));

        let too_tight = GeoExpectation::new(expected.lat, expected.lon, distance - 1.0);
        assert!(!too_tight.matches(&input));

        let moved = GeoPoint::new(actual.lat + 1.0 / 111_195.0 * 1.5, actual.lon);
        assert!(!exact.matches(&moved.to_string()));
    }

    #[test]
    fn display_round_trips() {
        let point = GeoPoint::new(43.123_456_789, -76.5);
        assert_eq!(GeoPoint::parse(&point.to_string()), Some(point));
    }
}
