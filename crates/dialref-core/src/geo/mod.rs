//! Postal code to district resolution.
//!
//! A [`Geocoder`] turns a free-text query into a coordinate; the
//! [`GeoResolver`] then picks the nearest entry of a small table of
//! district centroids by great-circle distance. Every failure along the way
//! collapses into the [`NOT_FOUND`] label.

#[cfg(feature = "native")]
mod nominatim;

#[cfg(feature = "native")]
pub use nominatim::NominatimGeocoder;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::GeocodeError;

/// District label used when a postal code cannot be placed.
pub const NOT_FOUND: &str = "Não encontrado";

/// Separator between region and district name in a district label.
const REGION_SEPARATOR: &str = " - ";

/// Mean Earth radius (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A named district and its representative point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    /// Label shown on the form, e.g. `"SUL - SANTO AMARO"`.
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl District {
    pub fn new(label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            label: label.into(),
            latitude,
            longitude,
        }
    }

    pub fn centroid(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// São Paulo regional health districts.
pub fn default_districts() -> Vec<District> {
    vec![
        District::new("CENTRO - BELA VISTA", -23.561414, -46.655881),
        District::new("LESTE - ITAQUERA", -23.544588, -46.460170),
        District::new("NORTE - SANTANA", -23.501529, -46.624692),
        District::new("OESTE - BUTANTÃ", -23.570718, -46.719190),
        District::new("SUDESTE - VILA MARIANA", -23.589548, -46.634018),
        District::new("SUL - SANTO AMARO", -23.649308, -46.715133),
    ]
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Region part of a `"<REGION> - <NAME>"` label, `""` otherwise.
pub fn region_of(label: &str) -> String {
    label
        .split_once(REGION_SEPARATOR)
        .map(|(region, _)| region.to_string())
        .unwrap_or_default()
}

/// Free-text geocoding backend.
pub trait Geocoder {
    /// Resolve `query` to a coordinate. `Ok(None)` means no match.
    fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Geocoder for offline runs; never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

impl Geocoder for DisabledGeocoder {
    fn geocode(&self, _query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(None)
    }
}

/// District and region of preference assigned to a postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictAssignment {
    pub district: String,
    pub region: String,
}

impl DistrictAssignment {
    pub fn not_found() -> Self {
        Self::from_label(NOT_FOUND)
    }

    pub fn from_label(label: &str) -> Self {
        Self {
            district: label.to_string(),
            region: region_of(label),
        }
    }

    pub fn is_found(&self) -> bool {
        self.district != NOT_FOUND
    }
}

/// Nearest-district lookup for postal codes.
pub struct GeoResolver {
    geocoder: Box<dyn Geocoder>,
    districts: Vec<District>,
    city: String,
    country: String,
}

impl GeoResolver {
    /// Create a resolver for São Paulo, Brasil.
    pub fn new(geocoder: Box<dyn Geocoder>, districts: Vec<District>) -> Self {
        Self {
            geocoder,
            districts,
            city: "São Paulo".to_string(),
            country: "Brasil".to_string(),
        }
    }

    /// Set the city and country appended to every query.
    pub fn with_locality(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = city.into();
        self.country = country.into();
        self
    }

    /// Geocoding query for a postal code.
    pub fn query_for(&self, postal_code: &str) -> String {
        format!("{}, {}, {}", postal_code, self.city, self.country)
    }

    /// District whose centroid is closest to `point`.
    ///
    /// On equal distances the earlier table entry wins.
    pub fn nearest(&self, point: Coordinate) -> Option<&District> {
        let mut best: Option<(&District, f64)> = None;
        for district in &self.districts {
            let km = haversine_km(point, district.centroid());
            if best.is_none_or(|(_, best_km)| km < best_km) {
                best = Some((district, km));
            }
        }
        best.map(|(district, _)| district)
    }

    /// Assign a district to `postal_code`. Never fails.
    pub fn resolve(&self, postal_code: &str) -> DistrictAssignment {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            debug!("No postal code, skipping geocoding");
            return DistrictAssignment::not_found();
        }

        let query = self.query_for(postal_code);
        let point = match self.geocoder.geocode(&query) {
            Ok(Some(point)) => point,
            Ok(None) => {
                info!("Geocoder found no match for {:?}", query);
                return DistrictAssignment::not_found();
            }
            Err(e) => {
                warn!("Geocoding {:?} failed: {}", query, e);
                return DistrictAssignment::not_found();
            }
        };

        match self.nearest(point) {
            Some(district) => {
                debug!(
                    "Postal code {} at ({:.5}, {:.5}) -> {}",
                    postal_code, point.latitude, point.longitude, district.label
                );
                DistrictAssignment::from_label(&district.label)
            }
            None => {
                warn!("District table is empty");
                DistrictAssignment::not_found()
            }
        }
    }
}
