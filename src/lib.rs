// Copyright (c) 2024-2025 Ken Barker

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

//! osgb-grid
//!
//! [![crates.io](https://img.shields.io/crates/v/osgb-grid.svg)](https://crates.io/crates/osgb-grid)
//! [![docs.io](https://docs.rs/osgb-grid/badge.svg)](https://docs.rs/osgb-grid/)
//! [![License](https://img.shields.io/badge/License-MIT-blue)](https://opensource.org/license/mit/)
//!
//! A library for converting Ordnance Survey National Grid references,
//! e.g. "SN 853 872", to
//! [British National Grid](https://epsg.io/27700) (BNG) eastings and northings
//! and to [WGS-84](https://epsg.io/4326) latitudes and longitudes.
//!
//! ## Grid references
//!
//! A grid reference is two letters, identifying a 100 km square of the
//! National Grid, followed by an even number of digits (up to 10), the
//! easting and northing within the square. The number of digits determines
//! the [`Resolution`] of the reference: from 100 km (letters only) to 1 m
//! (10 digits).
//!
//! ## Coordinate conversion
//!
//! The BNG is a Transverse Mercator projection of the Airy 1830 ellipsoid,
//! the ellipsoid of the OSGB36 datum. Converting a grid reference to WGS-84:
//!
//! - parses the grid reference to a BNG [`PlaneCoordinate`];
//! - projects it to an OSGB36 latitude and longitude using the inverse
//!   Transverse Mercator projection, see [`transverse_mercator`];
//! - transforms it to WGS-84 using a 7 parameter Helmert transformation,
//!   see [`helmert`].
//!
//! The Helmert transformation is accurate to about 5 metres,
//! see the Ordnance Survey
//! [A Guide to Coordinate Systems in Great Britain](https://www.ordnancesurvey.co.uk/documents/resources/guide-coordinate-systems-great-britain.pdf).
//!
//! ## Design
//!
//! Coordinates are immutable values tagged with their [`Datum`], rather than
//! separate types per datum.
//! Batch conversions, see [`convert`], process each grid reference
//! independently: a malformed reference produces an error in its own slot
//! without affecting the others. With the `parallel` feature (the default)
//! batches are converted using [rayon](https://crates.io/crates/rayon).
//!
//! The library depends upon the following crates:
//!
//! - [angle-sc](https://crates.io/crates/angle-sc) - to define `Angle`,
//!   `Degrees` and `Radians` and perform trigonometric calculations;
//! - [unit-sphere](https://crates.io/crates/unit-sphere) - to define `LatLong`.
//! - [icao_units](https://crates.io/crates/icao-units) - to define `Metres`.
//! - [thiserror](https://crates.io/crates/thiserror) - to define the errors.
//! - [tracing](https://crates.io/crates/tracing) - to log conversion failures.
//! - [serde](https://crates.io/crates/serde) - to read `ConversionConfig` and write `TableRow`s.
//!
//! # Examples
//! ```
//! use osgb_grid::*;
//!
//! let results = grid_reference_to_wgs84(&["SN853872", "SI853872"]);
//!
//! let position = results[0].as_ref().unwrap();
//! assert_eq!(Datum::Wgs84, position.datum());
//! assert!(52.47 < position.lat().0 && position.lat().0 < 52.48);
//! assert!(-3.70 < position.lon().0 && position.lon().0 < -3.68);
//!
//! // 'I' is not a grid letter
//! assert!(results[1].is_err());
//! ```

pub mod converter;
pub mod ellipsoid;
pub mod error;
pub mod grid;
pub mod helmert;
pub mod transverse_mercator;

pub use angle_sc::{Angle, Degrees, Radians, Validate};
pub use converter::{
    convert, grid_reference_to_bng, grid_reference_to_wgs84, wgs84_to_grid_reference,
    ConversionConfig, Conversion, CoordSystem, Coordinates, TableRow,
};
pub use error::{Error, GridError, ParseError, ParseErrorKind, ProjectionError, TransformError};
pub use grid::{format_grid_reference, parse_grid_reference, PlaneCoordinate, Resolution};
pub use icao_units::si::Metres;
pub use unit_sphere::LatLong;

use once_cell::sync::Lazy;
use transverse_mercator::NATIONAL_GRID;

/// The parameters of an `Ellipsoid`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    /// The Semimajor axis of the ellipsoid.
    a: Metres,
    /// The flattening of the ellipsoid, a ratio.
    f: f64,

    /// The Semiminor axis of the ellipsoid.
    b: Metres,
    /// The square of the Eccentricity of the ellipsoid.
    e_2: f64,
    /// The square of the second Eccentricity of the ellipsoid.
    ep_2: f64,
    /// The third flattening of the ellipsoid.
    n: f64,
}

impl Ellipsoid {
    /// Constructor.
    /// * `a` - the Semimajor axis of the `Ellipsoid`.
    /// * `f` - the flattening of the `Ellipsoid`, a ratio.
    #[must_use]
    pub fn new(a: Metres, f: f64) -> Self {
        Self {
            a,
            f,
            b: ellipsoid::calculate_minor_axis(a, f),
            e_2: ellipsoid::calculate_sq_eccentricity(f),
            ep_2: ellipsoid::calculate_sq_2nd_eccentricity(f),
            n: ellipsoid::calculate_3rd_flattening(f),
        }
    }

    /// Construct an `Ellipsoid` with the Airy 1830 parameters.
    #[must_use]
    pub fn airy1830() -> Self {
        Self::new(ellipsoid::airy1830::A, ellipsoid::airy1830::F)
    }

    /// Construct an `Ellipsoid` with the WGS-84 parameters.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::new(ellipsoid::wgs84::A, ellipsoid::wgs84::F)
    }

    /// The Semimajor axis of the ellipsoid.
    #[must_use]
    pub const fn a(&self) -> Metres {
        self.a
    }

    /// The flattening of the ellipsoid, a ratio.
    #[must_use]
    pub const fn f(&self) -> f64 {
        self.f
    }

    /// The Semiminor axis of the ellipsoid.
    #[must_use]
    pub const fn b(&self) -> Metres {
        self.b
    }

    /// The square of the Eccentricity of the ellipsoid.
    #[must_use]
    pub const fn e_2(&self) -> f64 {
        self.e_2
    }

    /// The square of the second Eccentricity of the ellipsoid.
    #[must_use]
    pub const fn ep_2(&self) -> f64 {
        self.ep_2
    }

    /// The third flattening of the ellipsoid.
    #[must_use]
    pub const fn n(&self) -> f64 {
        self.n
    }
}

/// A static instance of the Airy 1830 `Ellipsoid`.
pub static AIRY1830_ELLIPSOID: Lazy<Ellipsoid> = Lazy::new(Ellipsoid::airy1830);

/// A static instance of the WGS-84 `Ellipsoid`.
pub static WGS84_ELLIPSOID: Lazy<Ellipsoid> = Lazy::new(Ellipsoid::wgs84);

/// A geodetic datum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Datum {
    /// The Ordnance Survey datum of the British National Grid.
    Osgb36,
    /// The GPS datum.
    Wgs84,
}

impl Datum {
    /// The `Ellipsoid` of the datum.
    #[must_use]
    pub fn ellipsoid(self) -> &'static Ellipsoid {
        match self {
            Self::Osgb36 => &*AIRY1830_ELLIPSOID,
            Self::Wgs84 => &*WGS84_ELLIPSOID,
        }
    }

    /// The Helmert transformation from this datum to `target`.
    #[must_use]
    pub const fn helmert_parameters(self, target: Self) -> Option<helmert::HelmertParameters> {
        match (self, target) {
            (Self::Osgb36, Self::Wgs84) => Some(helmert::OSGB36_TO_WGS84),
            (Self::Wgs84, Self::Osgb36) => Some(helmert::OSGB36_TO_WGS84.inverse()),
            _ => None,
        }
    }
}

/// A latitude, longitude and ellipsoidal height referenced to a `Datum`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeographicCoordinate {
    lat: Degrees,
    lon: Degrees,
    height: Metres,
    datum: Datum,
}

impl Validate for GeographicCoordinate {
    /// Test whether a `GeographicCoordinate` is valid.
    /// Whether |`latitude`| <= 90° and |`longitude`| <= 180°.
    fn is_valid(&self) -> bool {
        self.lat.0.abs() <= 90.0 && self.lon.0.abs() <= 180.0
    }
}

impl GeographicCoordinate {
    /// Constructor, at zero height above the ellipsoid.
    /// * `lat`, `lon` - the latitude and longitude.
    /// * `datum` - the datum of the latitude and longitude.
    #[must_use]
    pub const fn new(lat: Degrees, lon: Degrees, datum: Datum) -> Self {
        Self::with_height(lat, lon, Metres(0.0), datum)
    }

    /// Constructor.
    /// * `lat`, `lon` - the latitude and longitude.
    /// * `height` - the height above the ellipsoid.
    /// * `datum` - the datum of the position.
    #[must_use]
    pub const fn with_height(lat: Degrees, lon: Degrees, height: Metres, datum: Datum) -> Self {
        Self {
            lat,
            lon,
            height,
            datum,
        }
    }

    /// Construct a `GeographicCoordinate` from a `LatLong`.
    #[must_use]
    pub fn from_lat_long(position: &LatLong, datum: Datum) -> Self {
        Self::new(position.lat(), position.lon(), datum)
    }

    /// The latitude.
    #[must_use]
    pub const fn lat(&self) -> Degrees {
        self.lat
    }

    /// The longitude.
    #[must_use]
    pub const fn lon(&self) -> Degrees {
        self.lon
    }

    /// The height above the ellipsoid.
    #[must_use]
    pub const fn height(&self) -> Metres {
        self.height
    }

    /// The datum of the position.
    #[must_use]
    pub const fn datum(&self) -> Datum {
        self.datum
    }

    /// The latitude and longitude as a `LatLong`.
    #[must_use]
    pub fn lat_long(&self) -> LatLong {
        LatLong::new(self.lat, self.lon)
    }

    /// Transform the position to another datum.
    /// * `datum` - the target datum.
    /// # Errors
    /// `TransformError::InvalidPosition` if the position is not valid,
    /// `TransformError` if it is not near the Earth's surface.
    pub fn to_datum(&self, datum: Datum) -> Result<Self, TransformError> {
        if !self.is_valid() {
            return Err(TransformError::InvalidPosition {
                lat: self.lat.0,
                lon: self.lon.0,
            });
        }

        match self.datum.helmert_parameters(datum) {
            None => Ok(*self),
            Some(params) => {
                let (lat, lon, height) = helmert::transform(
                    self.lat,
                    self.lon,
                    self.height,
                    self.datum.ellipsoid(),
                    datum.ellipsoid(),
                    &params,
                )?;
                Ok(Self::with_height(lat, lon, height, datum))
            }
        }
    }

    /// Convert the position to a British National Grid coordinate.
    /// The position is transformed to OSGB36 first, if required.
    /// @pre |lat| < 90.0 degrees.
    /// # Errors
    /// `TransformError` if the position is not near the Earth's surface.
    pub fn to_plane(&self) -> Result<PlaneCoordinate, TransformError> {
        let position = self.to_datum(Datum::Osgb36)?;
        let (easting, northing) = NATIONAL_GRID.forward(position.lat, position.lon);
        Ok(PlaneCoordinate::new(easting, northing, Resolution::Metre))
    }
}

impl From<&LatLong> for GeographicCoordinate {
    /// A WGS-84 position, e.g. from a GPS receiver.
    fn from(position: &LatLong) -> Self {
        Self::from_lat_long(position, Datum::Wgs84)
    }
}
