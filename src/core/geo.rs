const EARTH_RADIUS_M: f64 = 6_371_000.0;
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Great-circle distance in meters.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let la1 = lat1.to_radians();
    let la2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + la1.cos() * la2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Square box that contains the circle of `radius_km` around the point.
    pub fn around(lat: f64, lon: f64, radius_km: f64) -> Self {
        let d_lat = radius_km / KM_PER_DEGREE_LAT;
        let d_lon = radius_km / (KM_PER_DEGREE_LAT * lat.to_radians().cos());
        Self {
            min_lon: lon - d_lon,
            min_lat: lat - d_lat,
            max_lon: lon + d_lon,
            max_lat: lat + d_lat,
        }
    }

    /// ArcGIS envelope order: xmin,ymin,xmax,ymax.
    pub fn to_envelope(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}
