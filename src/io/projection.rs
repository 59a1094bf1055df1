//! Geodetic to projected coordinates.
//!
//! Elevation surfaces often come in WGS84 latitude/longitude, while the
//! mesh lives in metres around the station centre. A [`CoordinateProjection`]
//! bridges the two:
//!
//! - [`LocalProjection`]: tangent plane at a reference point, good for
//!   surveys spanning a few hundred kilometres at most.
//! - [`UtmProjection`]: transverse Mercator in a UTM zone.
//!
//! ```
//! use modem_mesh::io::{CoordinateProjection, LocalProjection};
//!
//! let proj = LocalProjection::new(-30.0, 138.5);
//! let (x, y) = proj.geo_to_xy(-29.9, 138.6);
//! assert!(x > 9_000.0 && y > 11_000.0);
//! ```

use std::f64::consts::PI;

use crate::error::{MeshError, Result};

/// Maps geodetic coordinates to planar metres and back.
pub trait CoordinateProjection {
    /// Convert geographic coordinates (lat, lon) to projected (x, y) in meters.
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64);

    /// Convert projected coordinates (x, y) to geographic (lat, lon).
    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64);
}

/// Tangent plane at a reference point.
///
/// Scales by the WGS84 radii of curvature at the reference latitude, so
/// distortion grows with distance from the reference.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    /// Reference latitude in degrees
    ref_lat: f64,
    /// Reference longitude in degrees
    ref_lon: f64,
    /// Meters per degree latitude (~111,320 m)
    meters_per_deg_lat: f64,
    /// Meters per degree longitude at reference latitude
    meters_per_deg_lon: f64,
}

impl LocalProjection {
    /// WGS84 equatorial radius in meters
    const A: f64 = 6_378_137.0;
    /// WGS84 flattening
    const F: f64 = 1.0 / 298.257_223_563;

    /// Projection centred on `(ref_lat, ref_lon)` in degrees.
    pub fn new(ref_lat: f64, ref_lon: f64) -> Self {
        let lat_rad = ref_lat * PI / 180.0;
        let cos_lat = lat_rad.cos();

        let e2 = 2.0 * Self::F - Self::F * Self::F;
        let sin_lat = lat_rad.sin();
        let sin2 = sin_lat * sin_lat;

        // Radius of curvature in meridian
        let rho = Self::A * (1.0 - e2) / (1.0 - e2 * sin2).powf(1.5);
        // Radius of curvature in prime vertical
        let nu = Self::A / (1.0 - e2 * sin2).sqrt();

        let meters_per_deg_lat = rho * PI / 180.0;
        let meters_per_deg_lon = nu * cos_lat * PI / 180.0;

        Self {
            ref_lat,
            ref_lon,
            meters_per_deg_lat,
            meters_per_deg_lon,
        }
    }

    pub fn ref_lat(&self) -> f64 {
        self.ref_lat
    }

    pub fn ref_lon(&self) -> f64 {
        self.ref_lon
    }

    /// Metres per degree of latitude and longitude.
    pub fn scale_factors(&self) -> (f64, f64) {
        (self.meters_per_deg_lat, self.meters_per_deg_lon)
    }
}

impl CoordinateProjection for LocalProjection {
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = (lon - self.ref_lon) * self.meters_per_deg_lon;
        let y = (lat - self.ref_lat) * self.meters_per_deg_lat;
        (x, y)
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lat = self.ref_lat + y / self.meters_per_deg_lat;
        let lon = self.ref_lon + x / self.meters_per_deg_lon;
        (lat, lon)
    }
}

/// Universal Transverse Mercator projection in one zone.
#[derive(Debug, Clone, Copy)]
pub struct UtmProjection {
    /// Central meridian in degrees
    central_meridian: f64,
    /// Scale factor at central meridian (0.9996 for UTM)
    scale_factor: f64,
    /// False easting in meters (500,000 for UTM)
    false_easting: f64,
    /// False northing in meters (0 for northern hemisphere, 10,000,000 for southern)
    false_northing: f64,
    /// Zone number (1-60)
    zone: u8,
    /// Northern hemisphere flag
    northern: bool,
}

impl UtmProjection {
    /// WGS84 equatorial radius in meters
    const A: f64 = 6_378_137.0;
    /// WGS84 flattening
    const F: f64 = 1.0 / 298.257_223_563;

    /// Projection for `zone` (1-60) in the given hemisphere.
    pub fn new(zone: u8, northern: bool) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            return Err(MeshError::config(format!(
                "UTM zone must be 1-60, got {}",
                zone
            )));
        }
        let central_meridian = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

        Ok(Self {
            central_meridian,
            scale_factor: 0.9996,
            false_easting: 500_000.0,
            false_northing: if northern { 0.0 } else { 10_000_000.0 },
            zone,
            northern,
        })
    }

    /// Zone containing the point `(lat, lon)`.
    pub fn containing(lat: f64, lon: f64) -> Result<Self> {
        let wrapped = (lon + 180.0).rem_euclid(360.0);
        let zone = ((wrapped / 6.0).floor() as u8 + 1).min(60);
        Self::new(zone, lat >= 0.0)
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn is_northern(&self) -> bool {
        self.northern
    }
}

impl CoordinateProjection for UtmProjection {
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let lat_rad = lat * PI / 180.0;
        let lon_rad = lon * PI / 180.0;
        let lon0_rad = self.central_meridian * PI / 180.0;

        let e2 = 2.0 * Self::F - Self::F * Self::F;
        let e_prime2 = e2 / (1.0 - e2);

        let n = Self::A / (1.0 - e2 * lat_rad.sin().powi(2)).sqrt();
        let t = lat_rad.tan().powi(2);
        let c = e_prime2 * lat_rad.cos().powi(2);
        let a_coef = (lon_rad - lon0_rad) * lat_rad.cos();

        // Meridian arc length
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let m = Self::A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat_rad
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat_rad).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat_rad).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat_rad).sin());

        let x = self.scale_factor * n
            * (a_coef
                + (1.0 - t + c) * a_coef.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * e_prime2) * a_coef.powi(5) / 120.0)
            + self.false_easting;

        let y = self.scale_factor
            * (m
                + n * lat_rad.tan()
                    * (a_coef.powi(2) / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a_coef.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * e_prime2)
                            * a_coef.powi(6)
                            / 720.0))
            + self.false_northing;

        (x, y)
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let e2 = 2.0 * Self::F - Self::F * Self::F;
        let e_prime2 = e2 / (1.0 - e2);
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let m = y / self.scale_factor;
        let mu = m
            / (Self::A
                * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let n1 = Self::A / (1.0 - e2 * phi1.sin().powi(2)).sqrt();
        let t1 = phi1.tan().powi(2);
        let c1 = e_prime2 * phi1.cos().powi(2);
        let r1 = Self::A * (1.0 - e2) / (1.0 - e2 * phi1.sin().powi(2)).powf(1.5);
        let d = x / (n1 * self.scale_factor);

        let lat = phi1
            - (n1 * phi1.tan() / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * e_prime2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * e_prime2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lon = self.central_meridian * PI / 180.0
            + (d
                - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * e_prime2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / phi1.cos();

        (lat * 180.0 / PI, lon * 180.0 / PI)
    }
}
