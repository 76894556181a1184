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

//! The helmert module contains the 7 parameter Helmert transformation
//! between geodetic datums.
//!
//! A position is converted from geodetic (latitude, longitude and
//! ellipsoidal height) to geocentric Cartesian coordinates on the source
//! ellipsoid, transformed by a similarity transformation (a translation,
//! a small rotation and a scale) and converted back to geodetic
//! coordinates on the target ellipsoid.
//!
//! The rotations are applied as a linear approximation, so the inverse
//! transformation (the negated parameters) is only an approximate inverse:
//! a round trip between OSGB36 and WGS84 differs by a few millimetres.

#![allow(clippy::suboptimal_flops)]

use crate::ellipsoid::calculate_prime_vertical_radius;
use crate::error::TransformError;
use crate::{Ellipsoid, Metres};
use angle_sc::{Angle, Degrees, Radians};

/// The maximum number of geodetic latitude iterations.
pub const MAX_ITERATIONS: u32 = 10;

/// The geodetic latitude precision, in Radians: about 6 μm.
pub const PRECISION: Radians = Radians(1.0e-12);

/// The minimum geocentric radius of a terrestrial position.
pub const MIN_RADIUS: Metres = Metres(6_000_000.0);

/// The maximum geocentric radius of a terrestrial position.
pub const MAX_RADIUS: Metres = Metres(6_800_000.0);

/// The number of radians in an arc second.
const ARC_SECOND: f64 = core::f64::consts::PI / (180.0 * 3600.0);

/// The parameters of a Helmert transformation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HelmertParameters {
    /// The translation along the X axis.
    pub tx: Metres,
    /// The translation along the Y axis.
    pub ty: Metres,
    /// The translation along the Z axis.
    pub tz: Metres,
    /// The rotation about the X axis, in arc seconds.
    pub rx: f64,
    /// The rotation about the Y axis, in arc seconds.
    pub ry: f64,
    /// The rotation about the Z axis, in arc seconds.
    pub rz: f64,
    /// The scale change, in parts per million.
    pub s: f64,
}

impl HelmertParameters {
    /// The parameters of the approximate inverse transformation.
    #[must_use]
    pub const fn inverse(&self) -> Self {
        Self {
            tx: Metres(-self.tx.0),
            ty: Metres(-self.ty.0),
            tz: Metres(-self.tz.0),
            rx: -self.rx,
            ry: -self.ry,
            rz: -self.rz,
            s: -self.s,
        }
    }

    /// Transform a geocentric position.
    /// * `p` - the position in the source datum.
    ///
    /// returns the position in the target datum.
    #[must_use]
    pub fn apply(&self, p: &Geocentric) -> Geocentric {
        let scale = 1.0 + self.s * 1.0e-6;
        let rx = self.rx * ARC_SECOND;
        let ry = self.ry * ARC_SECOND;
        let rz = self.rz * ARC_SECOND;
        Geocentric {
            x: self.tx.0 + scale * p.x - rz * p.y + ry * p.z,
            y: self.ty.0 + rz * p.x + scale * p.y - rx * p.z,
            z: self.tz.0 - ry * p.x + rx * p.y + scale * p.z,
        }
    }
}

/// The OSGB36 to WGS84 transformation, from the Ordnance Survey
/// [A Guide to Coordinate Systems in Great Britain](https://www.ordnancesurvey.co.uk/documents/resources/guide-coordinate-systems-great-britain.pdf)
/// section 6.6. Accurate to about 5 metres.
pub const OSGB36_TO_WGS84: HelmertParameters = HelmertParameters {
    tx: Metres(446.448),
    ty: Metres(-125.157),
    tz: Metres(542.060),
    rx: 0.1502,
    ry: 0.2470,
    rz: 0.8421,
    s: -20.4894,
};

/// Geocentric Cartesian coordinates, in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geocentric {
    /// Towards latitude 0°, longitude 0°.
    pub x: f64,
    /// Towards latitude 0°, longitude 90°E.
    pub y: f64,
    /// Towards the north pole.
    pub z: f64,
}

impl Geocentric {
    /// The distance from the centre of the ellipsoid.
    #[must_use]
    pub fn radius(&self) -> Metres {
        Metres(libm::sqrt(self.x * self.x + self.y * self.y + self.z * self.z))
    }

    /// Convert a geodetic position to geocentric coordinates.
    /// * `lat`, `lon` - the geodetic latitude and longitude.
    /// * `height` - the height above the ellipsoid.
    /// * `ellipsoid` - the `Ellipsoid` of the position.
    #[must_use]
    pub fn from_geodetic(lat: Degrees, lon: Degrees, height: Metres, ellipsoid: &Ellipsoid) -> Self {
        let lat = Angle::from(lat);
        let lon = Angle::from(lon);
        let sin_lat = lat.sin().0;
        let e_2 = ellipsoid.e_2();
        let nu = calculate_prime_vertical_radius(ellipsoid.a().0, e_2, sin_lat);
        let r = (nu + height.0) * lat.cos().0;
        Self {
            x: r * lon.cos().0,
            y: r * lon.sin().0,
            z: ((1.0 - e_2) * nu + height.0) * sin_lat,
        }
    }

    /// Convert geocentric coordinates to a geodetic position by iterating
    /// the geodetic latitude.
    /// * `ellipsoid` - the `Ellipsoid` of the position.
    ///
    /// returns the geodetic latitude, longitude and height.
    /// # Errors
    /// `TransformError::NotConverged` if the latitude does not converge
    /// within `MAX_ITERATIONS`.
    pub fn to_geodetic(
        &self,
        ellipsoid: &Ellipsoid,
    ) -> Result<(Degrees, Degrees, Metres), TransformError> {
        let a = ellipsoid.a().0;
        let e_2 = ellipsoid.e_2();
        let p = libm::hypot(self.x, self.y);

        let mut lat = Angle::from_y_x(self.z, p * (1.0 - e_2));
        for _ in 0..MAX_ITERATIONS {
            let sin_lat = lat.sin().0;
            let nu = calculate_prime_vertical_radius(a, e_2, sin_lat);
            let next = Angle::from_y_x(self.z + e_2 * nu * sin_lat, p);
            let delta = libm::fabs(Radians::from(next - lat).0);
            lat = next;

            if delta < PRECISION.0 {
                let sin_lat = lat.sin().0;
                let height = p * lat.cos().0 + self.z * sin_lat
                    - a * libm::sqrt(1.0 - e_2 * sin_lat * sin_lat);
                return Ok((
                    Degrees::from(lat),
                    Degrees::from(Angle::from_y_x(self.y, self.x)),
                    Metres(height),
                ));
            }
        }

        tracing::warn!(
            x = self.x,
            y = self.y,
            z = self.z,
            "geodetic latitude did not converge"
        );
        Err(TransformError::NotConverged {
            iterations: MAX_ITERATIONS,
        })
    }
}

/// Check that a geocentric position is near the Earth's surface.
fn validate_radius(p: &Geocentric) -> Result<(), TransformError> {
    let radius = p.radius();
    if (MIN_RADIUS.0..=MAX_RADIUS.0).contains(&radius.0) {
        Ok(())
    } else {
        Err(TransformError::OutOfRange { radius: radius.0 })
    }
}

/// Transform a geodetic position from one datum to another.
/// * `lat`, `lon`, `height` - the position on the `from` ellipsoid.
/// * `from` - the `Ellipsoid` of the source datum.
/// * `to` - the `Ellipsoid` of the target datum.
/// * `params` - the Helmert transformation from the source to the target datum.
///
/// returns the latitude, longitude and height on the `to` ellipsoid.
/// # Errors
/// `TransformError` if the latitude or longitude is invalid, a geocentric
/// position is not near the Earth's surface or the target latitude does not
/// converge.
/// # Examples
/// ```
/// use osgb_grid::{helmert, Degrees, Metres, AIRY1830_ELLIPSOID, WGS84_ELLIPSOID};
///
/// // Big Ben, OSGB36
/// let (lat, lon, _) = helmert::transform(
///     Degrees(51.5), Degrees(-0.12), Metres(0.0),
///     &AIRY1830_ELLIPSOID, &WGS84_ELLIPSOID, &helmert::OSGB36_TO_WGS84
/// ).unwrap();
///
/// // WGS84 is about 50 m north and 100 m west in London
/// assert!(51.5 < lat.0 && lat.0 < 51.501);
/// assert!(-0.1217 < lon.0 && lon.0 < -0.1215);
/// ```
pub fn transform(
    lat: Degrees,
    lon: Degrees,
    height: Metres,
    from: &Ellipsoid,
    to: &Ellipsoid,
    params: &HelmertParameters,
) -> Result<(Degrees, Degrees, Metres), TransformError> {
    if !(-90.0..=90.0).contains(&lat.0) || !(-180.0..=180.0).contains(&lon.0) {
        return Err(TransformError::InvalidPosition {
            lat: lat.0,
            lon: lon.0,
        });
    }

    let source = Geocentric::from_geodetic(lat, lon, height, from);
    validate_radius(&source)?;
    let target = params.apply(&source);
    validate_radius(&target)?;
    target.to_geodetic(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AIRY1830_ELLIPSOID, WGS84_ELLIPSOID};
    use angle_sc::is_within_tolerance;

    #[test]
    fn test_inverse_parameters() {
        let inverse = OSGB36_TO_WGS84.inverse();
        assert_eq!(Metres(-446.448), inverse.tx);
        assert_eq!(Metres(125.157), inverse.ty);
        assert_eq!(Metres(-542.060), inverse.tz);
        assert_eq!(-0.1502, inverse.rx);
        assert_eq!(-0.2470, inverse.ry);
        assert_eq!(-0.8421, inverse.rz);
        assert_eq!(20.4894, inverse.s);
        assert_eq!(OSGB36_TO_WGS84, inverse.inverse());
    }

    #[test]
    fn test_geocentric_round_trip() {
        for i in -9_i32..=9 {
            for j in -17..18 {
                let lat = Degrees(f64::from(i) * 10.0);
                let lon = Degrees(f64::from(j) * 10.0);
                let p = Geocentric::from_geodetic(lat, lon, Metres(100.0), &WGS84_ELLIPSOID);
                let (lat1, lon1, height) = p.to_geodetic(&WGS84_ELLIPSOID).unwrap();
                assert!(is_within_tolerance(lat.0, lat1.0, 1e-9));
                if i.abs() != 9 {
                    assert!(is_within_tolerance(lon.0, lon1.0, 1e-9));
                }
                assert!(is_within_tolerance(100.0, height.0, 1e-6));
            }
        }
    }

    #[test]
    fn test_from_geodetic_equator_and_pole() {
        let p = Geocentric::from_geodetic(
            Degrees(0.0),
            Degrees(0.0),
            Metres(0.0),
            &WGS84_ELLIPSOID,
        );
        assert!(is_within_tolerance(WGS84_ELLIPSOID.a().0, p.x, 1e-9));
        assert!(libm::fabs(p.y) < 1e-9);
        assert!(libm::fabs(p.z) < 1e-9);

        let p = Geocentric::from_geodetic(
            Degrees(90.0),
            Degrees(0.0),
            Metres(0.0),
            &WGS84_ELLIPSOID,
        );
        assert!(is_within_tolerance(WGS84_ELLIPSOID.b().0, p.z, 1e-6));
        assert!(libm::fabs(p.x) < 1e-6);
    }

    #[test]
    fn test_transform_osgb36_to_wgs84() {
        // SN 85300 87200 on OSGB36
        let (lat, lon, height) = transform(
            Degrees(52.470_299_434_154_16),
            Degrees(-3.688_757_862_152_979),
            Metres(0.0),
            &AIRY1830_ELLIPSOID,
            &WGS84_ELLIPSOID,
            &OSGB36_TO_WGS84,
        )
        .unwrap();
        assert!(is_within_tolerance(52.470_646_705_678_07, lat.0, 1e-9));
        assert!(is_within_tolerance(-3.689_987_347_636_527_5, lon.0, 1e-9));
        assert!(is_within_tolerance(51.272, height.0, 1e-3));
    }

    #[test]
    fn test_transform_round_trip() {
        for i in 0..=12 {
            for j in 0..=12 {
                let lat = Degrees(50.0 + f64::from(i));
                let lon = Degrees(-8.0 + f64::from(j));
                let (lat1, lon1, height1) = transform(
                    lat,
                    lon,
                    Metres(0.0),
                    &AIRY1830_ELLIPSOID,
                    &WGS84_ELLIPSOID,
                    &OSGB36_TO_WGS84,
                )
                .unwrap();
                let (lat2, lon2, height2) = transform(
                    lat1,
                    lon1,
                    height1,
                    &WGS84_ELLIPSOID,
                    &AIRY1830_ELLIPSOID,
                    &OSGB36_TO_WGS84.inverse(),
                )
                .unwrap();

                // within 1e-6 degrees, i.e. about 10 cm
                assert!(is_within_tolerance(lat.0, lat2.0, 1e-6));
                assert!(is_within_tolerance(lon.0, lon2.0, 1e-6));
                assert!(libm::fabs(height2.0) < 0.1);
            }
        }
    }

    #[test]
    fn test_transform_out_of_range() {
        let result = transform(
            Degrees(52.0),
            Degrees(-2.0),
            Metres(-1_000_000.0),
            &AIRY1830_ELLIPSOID,
            &WGS84_ELLIPSOID,
            &OSGB36_TO_WGS84,
        );
        assert!(matches!(result, Err(TransformError::OutOfRange { .. })));

        let result = transform(
            Degrees(52.0),
            Degrees(-2.0),
            Metres(1_000_000.0),
            &AIRY1830_ELLIPSOID,
            &WGS84_ELLIPSOID,
            &OSGB36_TO_WGS84,
        );
        assert!(matches!(result, Err(TransformError::OutOfRange { .. })));
    }

    #[test]
    fn test_transform_invalid_position() {
        // A latitude that angle-sc would otherwise wrap onto the ellipsoid
        let result = transform(
            Degrees(-642.9),
            Degrees(-7.5),
            Metres(0.0),
            &AIRY1830_ELLIPSOID,
            &WGS84_ELLIPSOID,
            &OSGB36_TO_WGS84,
        );
        assert_eq!(
            Err(TransformError::InvalidPosition {
                lat: -642.9,
                lon: -7.5
            }),
            result
        );

        let result = transform(
            Degrees(52.0),
            Degrees(181.0),
            Metres(0.0),
            &AIRY1830_ELLIPSOID,
            &WGS84_ELLIPSOID,
            &OSGB36_TO_WGS84,
        );
        assert!(matches!(result, Err(TransformError::InvalidPosition { .. })));

        let result = transform(
            Degrees(f64::NAN),
            Degrees(0.0),
            Metres(0.0),
            &AIRY1830_ELLIPSOID,
            &WGS84_ELLIPSOID,
            &OSGB36_TO_WGS84,
        );
        assert!(matches!(result, Err(TransformError::InvalidPosition { .. })));
    }
}
