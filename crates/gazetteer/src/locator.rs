use std::path::Path;

use foundation::Coordinates;
use tracing::{debug, warn};

use crate::builtin;
use crate::error::GazetteerError;
use crate::place::{PlaceNode, overlapping_aliases};

/// City names that mean "no finer-grained location known".
pub const UNKNOWN_CITY: &str = "Unknown";
/// Region code that means "no finer-grained location known".
pub const UNKNOWN_REGION: &str = "ZZ";

/// Strict name/alias lookup against a gazetteer.
///
/// Each level is scanned in reverse insertion order and the first node whose
/// alias list contains the requested name (case-sensitive) wins. Lookups never
/// mutate the locator, so one instance can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    countries: Vec<PlaceNode>,
}

impl Locator {
    pub fn new(countries: Vec<PlaceNode>) -> Self {
        let overlaps = overlapping_aliases(&countries);
        if !overlaps.is_empty() {
            warn!(?overlaps, "gazetteer has ambiguous sibling aliases; last entry wins");
        }
        Self { countries }
    }

    /// Locator over the dictionary compiled into the crate.
    pub fn builtin() -> Self {
        Self::new(builtin::places())
    }

    pub fn from_json_str(json: &str) -> Result<Self, GazetteerError> {
        let countries: Vec<PlaceNode> = serde_json::from_str(json)?;
        Ok(Self::new(countries))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GazetteerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GazetteerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn countries(&self) -> &[PlaceNode] {
        &self.countries
    }

    /// Deepest coordinates resolvable for the triple.
    ///
    /// `None` when the country is unknown, or when nothing along the matched
    /// path carries coordinates. A miss at the region or city level falls back
    /// to what the shallower level provided.
    pub fn locate(&self, country: &str, region: Option<&str>, city: Option<&str>) -> Option<Coordinates> {
        let Some(country_node) = find(&self.countries, country) else {
            debug!(country, "no gazetteer entry for country");
            return None;
        };
        let mut coordinates = country_node.coordinates;

        let Some(region) = region.filter(|r| !r.is_empty()) else {
            return coordinates;
        };
        let Some(region_node) = find(&country_node.children, region) else {
            return coordinates;
        };
        if region_node.coordinates.is_some() {
            coordinates = region_node.coordinates;
        }

        if let Some(city) = city.filter(|c| !is_unresolved_city(c)) {
            if let Some(city_node) = find(&region_node.children, city) {
                if city_node.coordinates.is_some() {
                    coordinates = city_node.coordinates;
                }
            }
        }

        coordinates
    }

    /// Resolve a dot-joined place key (`"US"`, `"US.TX"`, `"US.TX.Dallas"`).
    pub fn locate_key(&self, place_key: &str) -> Option<Coordinates> {
        let mut parts = place_key.splitn(3, '.');
        let country = parts.next()?;
        let region = parts.next();
        let city = parts.next();
        self.locate(country, region, city)
    }
}

/// Empty names and any casing of "unknown" are intentionally unresolved and
/// must never match a literal place called "Unknown".
pub fn is_unresolved_city(city: &str) -> bool {
    city.is_empty() || city.eq_ignore_ascii_case(UNKNOWN_CITY)
}

fn find<'a>(nodes: &'a [PlaceNode], name: &str) -> Option<&'a PlaceNode> {
    nodes.iter().rev().find(|n| n.answers_to(name))
}

#[cfg(test)]
mod tests {
    use super::{Locator, is_unresolved_city};
    use crate::place::PlaceNode;
    use foundation::Coordinates;

    fn dallas() -> Coordinates {
        Coordinates::new(32.7801399, -96.8004511)
    }

    fn us_only_city_coordinates() -> Locator {
        Locator::new(vec![PlaceNode::new(["US", "USA"]).with_child(
            PlaceNode::new(["TX", "Texas"]).with_child(
                PlaceNode::new(["Dallas"]).at(32.7801399, -96.8004511),
            ),
        )])
    }

    #[test]
    fn resolves_city_when_ancestors_have_no_coordinates() {
        let loc = us_only_city_coordinates();
        assert_eq!(loc.locate("US", Some("TX"), Some("Dallas")), Some(dallas()));
        assert_eq!(loc.locate("USA", Some("Texas"), Some("Dallas")), Some(dallas()));
    }

    #[test]
    fn unknown_city_short_circuits() {
        let loc = us_only_city_coordinates();
        assert_eq!(loc.locate("US", Some("TX"), Some("Unknown")), None);
        assert_eq!(loc.locate("US", Some("TX"), Some("UNKNOWN")), None);
        assert_eq!(loc.locate("US", Some("TX"), None), None);
        assert_eq!(loc.locate("US", Some("TX"), Some("")), None);
    }

    #[test]
    fn unknown_country_is_not_found() {
        let loc = us_only_city_coordinates();
        assert_eq!(loc.locate("ZZ", Some(""), Some("")), None);
        assert_eq!(loc.locate("us", None, None), None);
    }

    #[test]
    fn literal_unknown_city_is_never_matched() {
        let loc = Locator::new(vec![PlaceNode::new(["XX"]).at(1.0, 1.0).with_child(
            PlaceNode::new(["ZZ"]).with_child(PlaceNode::new(["Unknown"]).at(5.0, 5.0)),
        )]);
        assert_eq!(
            loc.locate("XX", Some("ZZ"), Some("Unknown")),
            Some(Coordinates::new(1.0, 1.0))
        );
    }

    #[test]
    fn misses_fall_back_to_shallower_levels() {
        let loc = Locator::new(vec![PlaceNode::new(["US"]).at(37.09024, -95.712891).with_child(
            PlaceNode::new(["TX"]).at(31.0, -100.0),
        )]);
        let us = Some(Coordinates::new(37.09024, -95.712891));
        let tx = Some(Coordinates::new(31.0, -100.0));
        assert_eq!(loc.locate("US", Some("CA"), Some("Dallas")), us);
        assert_eq!(loc.locate("US", Some("TX"), Some("Austin")), tx);
        assert_eq!(loc.locate("US", None, Some("Dallas")), us);
    }

    #[test]
    fn later_siblings_win_on_overlap() {
        let loc = Locator::new(vec![
            PlaceNode::new(["GN", "Guinea"]).at(1.0, 1.0),
            PlaceNode::new(["Guinea"]).at(2.0, 2.0),
        ]);
        assert_eq!(loc.locate("Guinea", None, None), Some(Coordinates::new(2.0, 2.0)));
        assert_eq!(loc.locate("GN", None, None), Some(Coordinates::new(1.0, 1.0)));
    }

    #[test]
    fn lookups_are_idempotent() {
        let loc = Locator::builtin();
        let first = loc.locate("US", Some("TX"), Some("Dallas"));
        let second = loc.locate("US", Some("TX"), Some("Dallas"));
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn place_keys_split_into_levels() {
        let loc = us_only_city_coordinates();
        assert_eq!(loc.locate_key("US.TX.Dallas"), Some(dallas()));
        assert_eq!(loc.locate_key("US"), None);
        assert_eq!(loc.locate_key(""), None);
    }

    #[test]
    fn unresolved_city_names() {
        assert!(is_unresolved_city(""));
        assert!(is_unresolved_city("unknown"));
        assert!(!is_unresolved_city("Unknownville"));
    }

    #[test]
    fn loads_json_dictionary() {
        let loc = Locator::from_json_str(
            r#"[{"names": ["ES", "Spain"], "coordinates": {"latitude": 40.46, "longitude": -3.75}}]"#,
        )
        .expect("valid json");
        assert_eq!(loc.locate("Spain", None, None), Some(Coordinates::new(40.46, -3.75)));
        assert!(Locator::from_json_str("{").is_err());
    }
}
