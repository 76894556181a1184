// Copyright (c) 2025 Ken Barker

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! The transverse_mercator module contains the ellipsoidal Transverse
//! Mercator projection used by the British National Grid.
//!
//! It uses the series given in Annex C of the Ordnance Survey
//! [A Guide to Coordinate Systems in Great Britain](https://www.ordnancesurvey.co.uk/documents/resources/guide-coordinate-systems-great-britain.pdf).
//! The forward projection is closed form. The inverse projection requires
//! the footpoint latitude: the latitude whose meridional arc length from
//! the true origin equals the northing. It is found by Newton's method.

#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::suboptimal_flops)]

use crate::ellipsoid::{calculate_meridional_radius, calculate_prime_vertical_radius};
use crate::error::ProjectionError;
use crate::{Ellipsoid, Metres, AIRY1830_ELLIPSOID};
use angle_sc::{Angle, Degrees, Radians};
use core::f64::consts::FRAC_PI_2;
use once_cell::sync::Lazy;

/// The maximum number of footpoint latitude iterations.
pub const MAX_ITERATIONS: u32 = 10;

/// The footpoint latitude tolerance: 0.01 mm of meridional arc.
pub const TOLERANCE: Metres = Metres(1.0e-5);

/// The maximum distance of an easting from the central meridian.
/// The inverse series diverge beyond it.
pub const MAX_EASTING_OFFSET: Metres = Metres(1_000_000.0);

/// The parameters of a Transverse Mercator projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionOrigin {
    /// The latitude of the true origin.
    pub lat: Degrees,
    /// The longitude of the true origin, the central meridian.
    pub lon: Degrees,
    /// The easting of the true origin.
    pub false_easting: Metres,
    /// The northing of the true origin.
    pub false_northing: Metres,
    /// The scale factor on the central meridian.
    pub scale_factor: f64,
}

/// The British National Grid projection parameters:
/// true origin 49°N 2°W, false origin 400 km west and 100 km north of it.
pub const NATIONAL_GRID_ORIGIN: ProjectionOrigin = ProjectionOrigin {
    lat: Degrees(49.0),
    lon: Degrees(-2.0),
    false_easting: Metres(400_000.0),
    false_northing: Metres(-100_000.0),
    scale_factor: 0.999_601_271_7,
};

/// A Transverse Mercator projection of an `Ellipsoid`.
#[derive(Clone, Debug, PartialEq)]
pub struct TransverseMercator<'a> {
    origin: ProjectionOrigin,
    /// The latitude of the true origin in radians.
    phi0: f64,
    /// The central meridian.
    lon0: Angle,
    /// The scaled Semimajor axis, a * F0.
    a_f0: f64,
    /// The scaled Semiminor axis, b * F0.
    b_f0: f64,
    /// The meridional arc series coefficients.
    arc: [f64; 4],
    /// A reference to the underlying `Ellipsoid`.
    ellipsoid: &'a Ellipsoid,
}

impl<'a> TransverseMercator<'a> {
    /// Constructor.
    /// * `origin` - the projection parameters.
    /// * `ellipsoid` - a reference to the `Ellipsoid`.
    #[must_use]
    pub fn new(origin: ProjectionOrigin, ellipsoid: &'a Ellipsoid) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n * n2;
        Self {
            origin,
            phi0: Radians::from(Angle::from(origin.lat)).0,
            lon0: Angle::from(origin.lon),
            a_f0: ellipsoid.a().0 * origin.scale_factor,
            b_f0: ellipsoid.b().0 * origin.scale_factor,
            arc: [
                1.0 + n + 1.25 * (n2 + n3),
                3.0 * (n + n2) + 21.0 / 8.0 * n3,
                15.0 / 8.0 * (n2 + n3),
                35.0 / 24.0 * n3,
            ],
            ellipsoid,
        }
    }

    /// Accessor for the projection parameters.
    #[must_use]
    pub const fn origin(&self) -> &ProjectionOrigin {
        &self.origin
    }

    /// Accessor for the reference to the underlying `Ellipsoid`.
    #[must_use]
    pub const fn ellipsoid(&self) -> &Ellipsoid {
        self.ellipsoid
    }

    /// Calculate the scaled meridional arc length from the true origin
    /// latitude to `phi`.
    /// * `phi` - the latitude in radians.
    #[must_use]
    pub fn meridional_arc(&self, phi: f64) -> f64 {
        let d = phi - self.phi0;
        let s = phi + self.phi0;
        self.b_f0
            * (self.arc[0] * d - self.arc[1] * libm::sin(d) * libm::cos(s)
                + self.arc[2] * libm::sin(2.0 * d) * libm::cos(2.0 * s)
                - self.arc[3] * libm::sin(3.0 * d) * libm::cos(3.0 * s))
    }

    /// Calculate the footpoint latitude of a northing.
    /// * `northing` - the northing.
    ///
    /// returns the footpoint latitude in radians and the number of iterations.
    /// # Errors
    /// `ProjectionError::OutOfRange` if an estimate is beyond a pole,
    /// `ProjectionError::NotConverged` if the arc length is not within
    /// `TOLERANCE` after `MAX_ITERATIONS`.
    pub fn footpoint_latitude(&self, northing: Metres) -> Result<(Radians, u32), ProjectionError> {
        let arc_length = northing.0 - self.origin.false_northing.0;
        let e_2 = self.ellipsoid.e_2();

        let mut phi = self.phi0 + arc_length / self.a_f0;
        let mut iterations = 0;
        while iterations <= MAX_ITERATIONS {
            if !(-FRAC_PI_2..=FRAC_PI_2).contains(&phi) {
                return Err(ProjectionError::OutOfRange {
                    northing: northing.0,
                });
            }

            let delta = arc_length - self.meridional_arc(phi);
            if libm::fabs(delta) < TOLERANCE.0 {
                return Ok((Radians(phi), iterations));
            }

            // the derivative of the arc length is the scaled meridional radius
            phi += delta / calculate_meridional_radius(self.a_f0, e_2, libm::sin(phi));
            iterations += 1;
        }

        tracing::warn!(
            northing = northing.0,
            iterations = MAX_ITERATIONS,
            "footpoint latitude did not converge"
        );
        Err(ProjectionError::NotConverged {
            northing: northing.0,
            iterations: MAX_ITERATIONS,
        })
    }

    /// Project a latitude and longitude to an easting and northing.
    /// @pre |lat| < 90.0 degrees.
    /// * `lat` - the latitude on the projection's `Ellipsoid`.
    /// * `lon` - the longitude on the projection's `Ellipsoid`.
    ///
    /// returns the easting and northing.
    #[must_use]
    pub fn forward(&self, lat: Degrees, lon: Degrees) -> (Metres, Metres) {
        let lat = Angle::from(lat);
        let phi = Radians::from(lat).0;
        let sin_lat = lat.sin().0;
        let cos_lat = lat.cos().0;
        let cos3 = cos_lat * cos_lat * cos_lat;
        let cos5 = cos3 * cos_lat * cos_lat;
        let tan2 = (sin_lat * sin_lat) / (cos_lat * cos_lat);
        let tan4 = tan2 * tan2;

        let e_2 = self.ellipsoid.e_2();
        let nu = calculate_prime_vertical_radius(self.a_f0, e_2, sin_lat);
        let rho = calculate_meridional_radius(self.a_f0, e_2, sin_lat);
        let eta2 = nu / rho - 1.0;

        let i = self.meridional_arc(phi) + self.origin.false_northing.0;
        let ii = nu / 2.0 * sin_lat * cos_lat;
        let iii = nu / 24.0 * sin_lat * cos3 * (5.0 - tan2 + 9.0 * eta2);
        let iiia = nu / 720.0 * sin_lat * cos5 * (61.0 - 58.0 * tan2 + tan4);
        let iv = nu * cos_lat;
        let v = nu / 6.0 * cos3 * (nu / rho - tan2);
        let vi = nu / 120.0 * cos5 * (5.0 - 18.0 * tan2 + tan4 + 14.0 * eta2 - 58.0 * tan2 * eta2);

        let l = Radians::from(Angle::from(lon) - self.lon0).0;
        let l2 = l * l;

        let northing = i + l2 * (ii + l2 * (iii + l2 * iiia));
        let easting = self.origin.false_easting.0 + l * (iv + l2 * (v + l2 * vi));
        (Metres(easting), Metres(northing))
    }

    /// Project an easting and northing to a latitude and longitude.
    /// * `easting`, `northing` - the projected coordinates.
    ///
    /// returns the latitude and longitude on the projection's `Ellipsoid`.
    /// # Errors
    /// `ProjectionError` if the coordinates are not finite, the easting is
    /// more than `MAX_EASTING_OFFSET` from the central meridian, or the
    /// latitude cannot be found.
    pub fn inverse(
        &self,
        easting: Metres,
        northing: Metres,
    ) -> Result<(Degrees, Degrees), ProjectionError> {
        if !easting.0.is_finite() || !northing.0.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        if MAX_EASTING_OFFSET.0 < libm::fabs(easting.0 - self.origin.false_easting.0) {
            return Err(ProjectionError::EastingOutOfRange { easting: easting.0 });
        }

        let (phi, _) = self.footpoint_latitude(northing)?;
        let phi = phi.0;
        let sin_lat = libm::sin(phi);
        let cos_lat = libm::cos(phi);
        let tan_lat = sin_lat / cos_lat;
        let tan2 = tan_lat * tan_lat;
        let tan4 = tan2 * tan2;
        let tan6 = tan4 * tan2;
        let sec_lat = 1.0 / cos_lat;

        let e_2 = self.ellipsoid.e_2();
        let nu = calculate_prime_vertical_radius(self.a_f0, e_2, sin_lat);
        let rho = calculate_meridional_radius(self.a_f0, e_2, sin_lat);
        let eta2 = nu / rho - 1.0;
        let nu3 = nu * nu * nu;
        let nu5 = nu3 * nu * nu;
        let nu7 = nu5 * nu * nu;

        let vii = tan_lat / (2.0 * rho * nu);
        let viii = tan_lat / (24.0 * rho * nu3) * (5.0 + 3.0 * tan2 + eta2 - 9.0 * tan2 * eta2);
        let ix = tan_lat / (720.0 * rho * nu5) * (61.0 + 90.0 * tan2 + 45.0 * tan4);
        let x = sec_lat / nu;
        let xi = sec_lat / (6.0 * nu3) * (nu / rho + 2.0 * tan2);
        let xii = sec_lat / (120.0 * nu5) * (5.0 + 28.0 * tan2 + 24.0 * tan4);
        let xiia = sec_lat / (5040.0 * nu7) * (61.0 + 662.0 * tan2 + 1320.0 * tan4 + 720.0 * tan6);

        let e = easting.0 - self.origin.false_easting.0;
        let e2 = e * e;

        let lat = (phi - e2 * (vii - e2 * (viii - e2 * ix))).to_degrees();
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::OutOfRange {
                northing: northing.0,
            });
        }
        let d_lon = e * (x - e2 * (xi - e2 * (xii - e2 * xiia)));

        Ok((
            Degrees(lat),
            Degrees::from(self.lon0 + Angle::from(Radians(d_lon))),
        ))
    }
}

/// A static instance of the British National Grid projection of the
/// Airy 1830 `Ellipsoid`.
pub static NATIONAL_GRID: Lazy<TransverseMercator<'static>> =
    Lazy::new(|| TransverseMercator::new(NATIONAL_GRID_ORIGIN, &AIRY1830_ELLIPSOID));

#[cfg(test)]
mod tests {
    use super::*;
    use angle_sc::is_within_tolerance;

    /// Degrees from degrees, minutes and seconds.
    fn dms(degrees: f64, minutes: f64, seconds: f64) -> Degrees {
        Degrees(degrees + minutes / 60.0 + seconds / 3600.0)
    }

    #[test]
    fn test_national_grid_origin() {
        let grid = &*NATIONAL_GRID;
        assert_eq!(&NATIONAL_GRID_ORIGIN, grid.origin());
        assert_eq!(*AIRY1830_ELLIPSOID, *grid.ellipsoid());

        // The true origin projects to the false origin offsets
        let (easting, northing) = grid.forward(Degrees(49.0), Degrees(-2.0));
        assert!(is_within_tolerance(400_000.0, easting.0, 1e-9));
        assert!(is_within_tolerance(-100_000.0, northing.0, 1e-9));
        assert_eq!(0.0, grid.meridional_arc(grid.phi0));
    }

    #[test]
    fn test_forward_os_worked_example() {
        // Ordnance Survey guide, Annex C, example C.1
        let (easting, northing) =
            NATIONAL_GRID.forward(dms(52.0, 39.0, 27.2531), dms(1.0, 43.0, 4.5177));
        assert!(is_within_tolerance(651_409.903, easting.0, 1e-3));
        assert!(is_within_tolerance(313_177.270, northing.0, 1e-3));
    }

    #[test]
    fn test_inverse_os_worked_example() {
        // Ordnance Survey guide, Annex C, example C.2
        let (lat, lon) = NATIONAL_GRID
            .inverse(Metres(651_409.903), Metres(313_177.270))
            .unwrap();
        assert!(is_within_tolerance(dms(52.0, 39.0, 27.2531).0, lat.0, 1e-8));
        assert!(is_within_tolerance(dms(1.0, 43.0, 4.5177).0, lon.0, 1e-8));
    }

    #[test]
    fn test_footpoint_latitude() {
        let grid = &*NATIONAL_GRID;

        // The false northing is on the true origin latitude
        let (phi, iterations) = grid.footpoint_latitude(Metres(-100_000.0)).unwrap();
        assert!(is_within_tolerance(49.0_f64.to_radians(), phi.0, 1e-15));
        assert_eq!(0, iterations);

        for i in 0..=130 {
            let northing = Metres(f64::from(i) * 10_000.0);
            let (phi, iterations) = grid.footpoint_latitude(northing).unwrap();
            assert!(iterations <= 3);
            let arc = grid.meridional_arc(phi.0);
            assert!(libm::fabs(northing.0 + 100_000.0 - arc) < TOLERANCE.0);
        }
    }

    #[test]
    fn test_inverse_converges_over_grid() {
        for i in 0..=130 {
            for j in 0..=7 {
                let easting = Metres(f64::from(j) * 100_000.0);
                let northing = Metres(f64::from(i) * 10_000.0);
                let (lat, lon) = NATIONAL_GRID.inverse(easting, northing).unwrap();
                assert!((49.0..62.0).contains(&lat.0));
                assert!((-10.0..4.0).contains(&lon.0));

                // the series are accurate to about a centimetre 300 km
                // from the central meridian
                let (e, n) = NATIONAL_GRID.forward(lat, lon);
                assert!(is_within_tolerance(easting.0, e.0, 2e-2));
                assert!(is_within_tolerance(northing.0, n.0, 2e-2));
            }
        }
    }

    #[test]
    fn test_inverse_out_of_range() {
        assert_eq!(
            Err(ProjectionError::OutOfRange {
                northing: 50_000_000.0
            }),
            NATIONAL_GRID.inverse(Metres(400_000.0), Metres(50_000_000.0))
        );
        assert_eq!(
            Err(ProjectionError::OutOfRange {
                northing: -50_000_000.0
            }),
            NATIONAL_GRID.inverse(Metres(400_000.0), Metres(-50_000_000.0))
        );
        assert_eq!(
            Err(ProjectionError::NonFinite),
            NATIONAL_GRID.inverse(Metres(f64::NAN), Metres(0.0))
        );

        // Far from the central meridian
        assert_eq!(
            Err(ProjectionError::EastingOutOfRange { easting: 2.0e7 }),
            NATIONAL_GRID.inverse(Metres(2.0e7), Metres(500_000.0))
        );
        assert_eq!(
            Err(ProjectionError::EastingOutOfRange { easting: -1.0e7 }),
            NATIONAL_GRID.inverse(Metres(-1.0e7), Metres(500_000.0))
        );

        // The footpoint latitude converges near the pole,
        // but the series give a latitude beyond it
        assert!(NATIONAL_GRID
            .footpoint_latitude(Metres(4_400_000.0))
            .is_ok());
        assert_eq!(
            Err(ProjectionError::OutOfRange {
                northing: 4_400_000.0
            }),
            NATIONAL_GRID.inverse(Metres(0.0), Metres(4_400_000.0))
        );
        assert_eq!(
            Err(ProjectionError::NonFinite),
            NATIONAL_GRID.inverse(Metres(0.0), Metres(f64::INFINITY))
        );
    }

    #[test]
    fn test_wgs84_projection() {
        // The same projection parameters on another ellipsoid
        let ellipsoid = Ellipsoid::wgs84();
        let projection = TransverseMercator::new(NATIONAL_GRID_ORIGIN, &ellipsoid);
        let (easting, northing) = projection.forward(Degrees(52.5), Degrees(-1.5));
        let (lat, lon) = projection.inverse(easting, northing).unwrap();
        assert!(is_within_tolerance(52.5, lat.0, 1e-9));
        assert!(is_within_tolerance(-1.5, lon.0, 1e-9));
    }
}
