/// Station registry for the weather console.
///
/// Defines the canonical list of NWS observation stations this tool knows
/// about, along with their metadata. This is the single source of truth for
/// station identifiers — other modules should reference stations from here
/// rather than hardcoding call signs.

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single NWS observation station.
pub struct Station {
    /// ICAO-style station identifier as used by api.weather.gov.
    pub id: &'static str,
    /// Official station name.
    pub name: &'static str,
    /// Human-readable note on the station's role for this deployment.
    pub description: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// Default station when neither config nor environment names one.
pub const DEFAULT_STATION: &str = "KMPR";

/// Known stations, ordered nearest-first relative to the default site.
///
/// Sources:
///   - Identifiers and coordinates: NWS station catalog (api.weather.gov/stations)
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        id: "KMPR",
        name: "McPherson Airport, KS",
        description: "Primary station for the McPherson site. AWOS; pressure \
                      and dewpoint occasionally drop out of individual \
                      observations.",
        latitude: 38.3524,
        longitude: -97.6914,
    },
    Station {
        id: "KHUT",
        name: "Hutchinson Regional Airport, KS",
        description: "Nearest ASOS southwest of McPherson. Use as a fallback \
                      when KMPR reports gaps.",
        latitude: 38.0655,
        longitude: -97.8606,
    },
    Station {
        id: "KSLN",
        name: "Salina Regional Airport, KS",
        description: "Full ASOS ~30 miles north. Reliable pressure reporting.",
        latitude: 38.7910,
        longitude: -97.6522,
    },
    Station {
        id: "KEWK",
        name: "Newton City/County Airport, KS",
        description: "AWOS southeast of McPherson.",
        latitude: 38.0582,
        longitude: -97.2744,
    },
    Station {
        id: "KICT",
        name: "Wichita Dwight D. Eisenhower National Airport, KS",
        description: "Major ASOS for the region; useful as a sanity reference \
                      when the local AWOS readings look off.",
        latitude: 37.6499,
        longitude: -97.4331,
    },
];

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Find a registered station by identifier (case-insensitive).
pub fn lookup(id: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.id.eq_ignore_ascii_case(id))
}

/// Whether an identifier has the shape of a US station call sign: four
/// ASCII alphanumerics starting with 'K'. Unregistered stations are still
/// accepted by the rest of the crate; this only gates obvious typos early.
pub fn is_valid_station_id(id: &str) -> bool {
    id.len() == 4
        && id.starts_with(['K', 'k'])
        && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_ids_are_valid_format() {
        for station in STATION_REGISTRY {
            assert!(
                is_valid_station_id(station.id),
                "registry entry {} has an invalid identifier",
                station.id
            );
        }
    }

    #[test]
    fn test_default_station_is_registered() {
        assert!(
            lookup(DEFAULT_STATION).is_some(),
            "default station must exist in the registry"
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(lookup("kmpr").is_some());
        assert!(lookup("KMPR").is_some());
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        assert!(!is_valid_station_id(""));
        assert!(!is_valid_station_id("MPR"));
        assert!(!is_valid_station_id("XMPRS"));
        assert!(!is_valid_station_id("K MP"));
    }
}
