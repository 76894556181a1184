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

//! The converter module contains the batch conversions of grid references
//! to British National Grid or WGS-84 coordinates.
//!
//! Each grid reference in a batch is converted independently, so a batch of
//! N references always returns N results, in the same order, with an error
//! in the slot of each reference that could not be converted.

use crate::error::Error;
use crate::grid::{format_grid_reference, parse_grid_reference, PlaneCoordinate, Resolution};
use crate::{Datum, GeographicCoordinate};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The coordinate system of a conversion result.
///
/// It is serialized by name, "BNG" or "WGS84", and deserialized from any
/// name accepted by `from_str`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CoordSystem {
    /// British National Grid eastings and northings, EPSG:27700.
    #[default]
    Bng,
    /// WGS-84 latitudes and longitudes, EPSG:4326.
    Wgs84,
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bng => f.write_str("BNG"),
            Self::Wgs84 => f.write_str("WGS84"),
        }
    }
}

impl FromStr for CoordSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BNG" | "OSGB" | "OSGB36" | "EPSG:27700" => Ok(Self::Bng),
            "WGS84" | "WGS-84" | "EPSG:4326" => Ok(Self::Wgs84),
            _ => Err(Error::UnknownCoordSystem(s.to_owned())),
        }
    }
}

impl TryFrom<String> for CoordSystem {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CoordSystem> for String {
    fn from(coord_system: CoordSystem) -> Self {
        coord_system.to_string()
    }
}

/// The options of a batch conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// The coordinate system of the results.
    pub coord_system: CoordSystem,
    /// Whether to convert on the rayon thread pool.
    /// Ignored without the `parallel` feature.
    pub parallel: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            coord_system: CoordSystem::Bng,
            parallel: true,
        }
    }
}

impl ConversionConfig {
    /// A parallel conversion to `coord_system`.
    #[must_use]
    pub const fn new(coord_system: CoordSystem) -> Self {
        Self {
            coord_system,
            parallel: true,
        }
    }
}

/// The coordinates of a converted grid reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coordinates {
    /// A British National Grid coordinate.
    Plane(PlaneCoordinate),
    /// A WGS-84 position and the resolution of its grid reference.
    Geographic(GeographicCoordinate, Resolution),
}

impl Coordinates {
    /// The resolution of the grid reference.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        match self {
            Self::Plane(coord) => coord.resolution(),
            Self::Geographic(_, resolution) => *resolution,
        }
    }
}

/// The result of converting a grid reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    /// The grid reference, as supplied.
    pub reference: String,
    /// The coordinates, or the reason the conversion failed.
    pub result: Result<Coordinates, Error>,
}

/// A `Conversion` as a row of a table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// The grid reference, as supplied.
    pub reference: String,
    /// The BNG easting in metres.
    pub easting: Option<f64>,
    /// The BNG northing in metres.
    pub northing: Option<f64>,
    /// The WGS-84 latitude in degrees.
    pub lat: Option<f64>,
    /// The WGS-84 longitude in degrees.
    pub lon: Option<f64>,
    /// The resolution in metres.
    pub resolution: Option<f64>,
    /// The reason the conversion failed.
    pub error: Option<String>,
}

impl From<&Conversion> for TableRow {
    fn from(conversion: &Conversion) -> Self {
        let row = Self {
            reference: conversion.reference.clone(),
            ..Self::default()
        };
        match &conversion.result {
            Ok(Coordinates::Plane(coord)) => Self {
                easting: Some(coord.easting().0),
                northing: Some(coord.northing().0),
                resolution: Some(coord.resolution().metres()),
                ..row
            },
            Ok(Coordinates::Geographic(position, resolution)) => Self {
                lat: Some(position.lat().0),
                lon: Some(position.lon().0),
                resolution: Some(resolution.metres()),
                ..row
            },
            Err(error) => Self {
                error: Some(error.to_string()),
                ..row
            },
        }
    }
}

/// Log the failure of a grid reference conversion.
fn logged<T>(reference: &str, result: Result<T, Error>) -> Result<T, Error> {
    if let Err(error) = &result {
        debug!(reference, %error, "grid reference conversion failed");
    }
    result
}

fn to_bng(reference: &str) -> Result<PlaneCoordinate, Error> {
    logged(reference, parse_grid_reference(reference).map_err(Error::from))
}

fn to_wgs84(reference: &str) -> Result<(GeographicCoordinate, Resolution), Error> {
    let result = parse_grid_reference(reference)
        .map_err(Error::from)
        .and_then(|coord| {
            let position = coord.to_geographic()?.to_datum(Datum::Wgs84)?;
            Ok((position, coord.resolution()))
        });
    logged(reference, result)
}

#[cfg(feature = "parallel")]
fn map_references<S, T, F>(references: &[S], parallel: bool, f: F) -> Vec<T>
where
    S: AsRef<str> + Sync,
    T: Send,
    F: Fn(&str) -> T + Send + Sync,
{
    if parallel {
        references.par_iter().map(|r| f(r.as_ref())).collect()
    } else {
        references.iter().map(|r| f(r.as_ref())).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_references<S, T, F>(references: &[S], _parallel: bool, f: F) -> Vec<T>
where
    S: AsRef<str> + Sync,
    T: Send,
    F: Fn(&str) -> T + Send + Sync,
{
    references.iter().map(|r| f(r.as_ref())).collect()
}

/// Convert grid references to British National Grid coordinates.
/// * `references` - the grid references.
///
/// returns a result for each grid reference, in the same order.
#[must_use]
pub fn grid_reference_to_bng<S: AsRef<str> + Sync>(
    references: &[S],
) -> Vec<Result<PlaneCoordinate, Error>> {
    map_references(references, true, to_bng)
}

/// Convert grid references to WGS-84 latitudes and longitudes.
/// * `references` - the grid references.
///
/// returns a result for each grid reference, in the same order.
#[must_use]
pub fn grid_reference_to_wgs84<S: AsRef<str> + Sync>(
    references: &[S],
) -> Vec<Result<GeographicCoordinate, Error>> {
    map_references(references, true, |reference| {
        to_wgs84(reference).map(|(position, _)| position)
    })
}

/// Convert grid references to the coordinate system in `config`.
/// * `references` - the grid references.
/// * `config` - the conversion options.
///
/// returns a `Conversion` for each grid reference, in the same order.
/// # Examples
/// ```
/// use osgb_grid::*;
///
/// let config = ConversionConfig::new("wgs84".parse().unwrap());
/// let conversions = convert(&["NN 166 712", "SN85387"], &config);
///
/// let rows: Vec<TableRow> = conversions.iter().map(TableRow::from).collect();
/// assert_eq!("NN 166 712", rows[0].reference);
/// assert_eq!(Some(100.0), rows[0].resolution);
/// assert!(rows[0].lat.is_some() && rows[0].lon.is_some());
/// assert!(rows[1].error.is_some());
/// ```
#[must_use]
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(count = references.len(), coord_system = %config.coord_system)
)]
pub fn convert<S: AsRef<str> + Sync>(references: &[S], config: &ConversionConfig) -> Vec<Conversion> {
    let coord_system = config.coord_system;
    let conversions: Vec<Conversion> = map_references(references, config.parallel, |reference| {
        let result = match coord_system {
            CoordSystem::Bng => to_bng(reference).map(Coordinates::Plane),
            CoordSystem::Wgs84 => {
                to_wgs84(reference).map(|(position, resolution)| {
                    Coordinates::Geographic(position, resolution)
                })
            }
        };
        Conversion {
            reference: reference.to_owned(),
            result,
        }
    });

    let failures = conversions.iter().filter(|c| c.result.is_err()).count();
    debug!(
        successes = conversions.len() - failures,
        failures, "converted grid references"
    );
    conversions
}

/// Convert a position to a grid reference.
/// * `position` - the position, in any `Datum`.
/// * `resolution` - the resolution of the grid reference.
///
/// returns the grid reference of the square containing the position.
/// # Errors
/// `Error::Transform` if the position is not near the Earth's surface,
/// `Error::Grid` if it is not on the National Grid.
pub fn wgs84_to_grid_reference(
    position: &GeographicCoordinate,
    resolution: Resolution,
) -> Result<String, Error> {
    let coord = position.to_plane()?;
    Ok(format_grid_reference(&coord, resolution)?)
}
