//! Geographic coordinates for destinations and graph nodes.

use std::fmt;

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in degrees.
///
/// Destinations arrive as `(lat, lon)` pairs, while `geo` works in
/// `x = longitude`, `y = latitude`; conversions go through [`GeoPoint::to_point`].
///
/// # Examples
/// ```
/// use stopover_core::GeoPoint;
///
/// let point = GeoPoint::new(13.754739, 100.784444);
/// assert!(point.is_valid());
/// assert_eq!(point.to_point().x(), 100.784444);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Convert to a `geo` point (`x = lon`, `y = lat`).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Great-circle distance to `other` in metres.
    ///
    /// # Examples
    /// ```
    /// use stopover_core::GeoPoint;
    ///
    /// let a = GeoPoint::new(0.0, 0.0);
    /// assert_eq!(a.haversine_m(&a), 0.0);
    /// ```
    pub fn haversine_m(&self, other: &Self) -> f64 {
        Haversine.distance(self.to_point(), other.to_point())
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
