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

//! The ellipsoid module contains types and functions for defining an ellipsoid
//! given its Semimajor axis (the equivalent of its radius) and flattening ratio.
//!
//! It also contains the radii of curvature used by the Transverse Mercator
//! projection and by the conversion between geodetic and geocentric
//! coordinates.

#![allow(clippy::suboptimal_flops)]

pub mod airy1830;
pub mod wgs84;

use crate::Metres;

/// Calculate the Semiminor axis of an ellipsoid.
/// * `a` - the Semimajor axis of an ellipsoid.
/// * `f` - the flattening ratio.
/// # Examples
/// ```
/// use osgb_grid::Metres;
/// use osgb_grid::ellipsoid::{calculate_minor_axis, airy1830};
///
/// // The Airy 1830 Semiminor axis measured in metres.
/// let b : Metres = Metres(6_356_256.909_237_285);
/// assert_eq!(b, calculate_minor_axis(airy1830::A, airy1830::F));
/// ```
#[must_use]
pub fn calculate_minor_axis(a: Metres, f: f64) -> Metres {
    Metres(a.0 * (1.0 - f))
}

/// Calculate the square of the Eccentricity of an ellipsoid.
/// * `f` - the flattening ratio.
/// # Examples
/// ```
/// use osgb_grid::ellipsoid::{calculate_sq_eccentricity, wgs84};
///
/// // The WGS 84 sq_eccentricity.
/// assert_eq!(0.0066943799901413165, calculate_sq_eccentricity(wgs84::F));
/// ```
#[must_use]
pub fn calculate_sq_eccentricity(f: f64) -> f64 {
    f * (2.0 - f)
}

/// Calculate the square of the second Eccentricity of an ellipsoid.
/// * `f` - the flattening ratio.
/// # Examples
/// ```
/// use osgb_grid::ellipsoid::{calculate_sq_2nd_eccentricity, wgs84};
///
/// // The WGS 84 sq 2nd eccentricity.
/// assert_eq!(0.006739496742276434, calculate_sq_2nd_eccentricity(wgs84::F));
/// ```
#[must_use]
pub fn calculate_sq_2nd_eccentricity(f: f64) -> f64 {
    let one_minus_f = 1.0 - f;
    calculate_sq_eccentricity(f) / (one_minus_f * one_minus_f)
}

/// Calculate the third flattening of an ellipsoid, `n = (a - b) / (a + b)`.
/// * `f` - the flattening ratio.
/// # Examples
/// ```
/// use osgb_grid::ellipsoid::{calculate_3rd_flattening, airy1830};
///
/// // The Airy 1830 3rd flattening.
/// assert_eq!(0.0016732203103220916, calculate_3rd_flattening(airy1830::F));
/// ```
#[must_use]
pub fn calculate_3rd_flattening(f: f64) -> f64 {
    f / (2.0 - f)
}

/// Calculate the radius of curvature in the prime vertical, `nu`.
/// * `a` - the Semimajor axis of the ellipsoid, scaled if required.
/// * `e_2` - the square of the Eccentricity of the ellipsoid.
/// * `sin_lat` - the sine of the geodetic latitude.
#[must_use]
pub fn calculate_prime_vertical_radius(a: f64, e_2: f64, sin_lat: f64) -> f64 {
    a / libm::sqrt(1.0 - e_2 * sin_lat * sin_lat)
}

/// Calculate the radius of curvature in the meridian, `rho`.
/// * `a` - the Semimajor axis of the ellipsoid, scaled if required.
/// * `e_2` - the square of the Eccentricity of the ellipsoid.
/// * `sin_lat` - the sine of the geodetic latitude.
#[must_use]
pub fn calculate_meridional_radius(a: f64, e_2: f64, sin_lat: f64) -> f64 {
    let w_2 = 1.0 - e_2 * sin_lat * sin_lat;
    a * (1.0 - e_2) / (w_2 * libm::sqrt(w_2))
}
