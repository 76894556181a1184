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

//! The error module contains the errors returned by grid reference parsing,
//! the Transverse Mercator projection and the Helmert datum transformation.

use thiserror::Error;

/// The reason a grid reference failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Fewer than two letters.
    Empty,
    /// A square letter outside the 25 letter alphabet, e.g. 'I' or a digit.
    InvalidLetter(char),
    /// A non digit character after the square letters.
    InvalidCharacter(char),
    /// The easting and northing digits must be of equal length.
    OddDigitCount(usize),
    /// More than 10 digits, i.e. finer than 1 metre.
    TooManyDigits(usize),
    /// Valid letters, but the square is not on the National Grid.
    OutsideGrid(String),
}

impl core::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "expected two grid square letters"),
            Self::InvalidLetter(c) => write!(f, "invalid grid square letter '{c}'"),
            Self::InvalidCharacter(c) => write!(f, "invalid character '{c}', expected a digit"),
            Self::OddDigitCount(n) => write!(f, "odd number of digits: {n}"),
            Self::TooManyDigits(n) => write!(f, "too many digits: {n}, the maximum is 10"),
            Self::OutsideGrid(letters) => {
                write!(f, "grid square {letters} is outside the National Grid")
            }
        }
    }
}

/// A grid reference that could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid grid reference \"{reference}\": {kind}")]
pub struct ParseError {
    /// The grid reference, as supplied.
    pub reference: String,
    /// The constraint that it violated.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Constructor.
    #[must_use]
    pub fn new(reference: &str, kind: ParseErrorKind) -> Self {
        Self {
            reference: reference.to_owned(),
            kind,
        }
    }
}

/// A plane coordinate that cannot be expressed as a grid reference.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("({easting}, {northing}) is outside the National Grid")]
pub struct GridError {
    /// The easting, in metres.
    pub easting: f64,
    /// The northing, in metres.
    pub northing: f64,
}

/// A failure of the inverse Transverse Mercator projection.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("footpoint latitude did not converge for northing {northing} after {iterations} iterations")]
    NotConverged { northing: f64, iterations: u32 },
    #[error("northing {northing} is beyond the pole")]
    OutOfRange { northing: f64 },
    #[error("easting {easting} is too far from the central meridian")]
    EastingOutOfRange { easting: f64 },
    #[error("easting and northing must be finite")]
    NonFinite,
}

/// A failure of the Helmert datum transformation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("invalid position: latitude {lat}, longitude {lon}")]
    InvalidPosition { lat: f64, lon: f64 },
    #[error("geocentric radius {radius} m is not on the Earth's surface")]
    OutOfRange { radius: f64 },
    #[error("geodetic latitude did not converge after {iterations} iterations")]
    NotConverged { iterations: u32 },
}

/// Any error returned by a grid reference conversion.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("unknown coordinate system: \"{0}\", expected \"BNG\" or \"WGS84\"")]
    UnknownCoordSystem(String),
}
