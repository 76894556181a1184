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

//! The grid module contains the Ordnance Survey National Grid letter table
//! and the functions to parse and format alphanumeric grid references,
//! e.g. "SN 853 872".
//!
//! The National Grid is divided into 500 km squares, each labelled by the
//! first letter of a grid reference, which are divided into 25 100 km
//! squares, labelled by the second letter. Both letters are taken from a
//! 5 x 5 table of the alphabet without 'I', see *Figure 1*.
//!
//! ```text
//!   A B C D E
//!   F G H J K
//!   L M N O P
//!   Q R S T U
//!   V W X Y Z
//! ```
//!
//! *Figure 1 The grid letter table*
//!
//! The false origin of the National Grid is the south west corner of 500 km
//! square 'S', so all coordinates on the grid are positive.
//! The digits after the letters are split into an easting and a northing
//! half, the number of digits determining the [`Resolution`].

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::error::{GridError, ParseError, ParseErrorKind, ProjectionError};
use crate::transverse_mercator::NATIONAL_GRID;
use crate::{Datum, GeographicCoordinate, Metres};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// The grid letter table: the alphabet without 'I'.
pub const LETTERS: [char; 25] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// The side of a grid square labelled by the second letter, in metres.
pub const SQUARE_SIZE: f64 = 100_000.0;

/// The number of 100 km squares east of the false origin.
pub const EASTING_SQUARES: i32 = 7;

/// The number of 100 km squares north of the false origin.
pub const NORTHING_SQUARES: i32 = 13;

/// The maximum number of digits in a grid reference.
pub const MAX_DIGITS: usize = 10;

/// The index of a letter in the grid letter table.
/// * `letter` - an upper case letter.
///
/// returns the index, or None if `letter` is not in the table.
#[must_use]
pub fn letter_index(letter: char) -> Option<i32> {
    LETTERS
        .iter()
        .position(|&l| l == letter)
        .and_then(|i| i32::try_from(i).ok())
}

/// Calculate the 100 km square indices east and north of the false origin
/// for a pair of grid letter indices.
/// * `first` - the index of the 500 km square letter.
/// * `second` - the index of the 100 km square letter.
///
/// returns the easting and northing indices of the 100 km square.
/// Note: they may be outside of the National Grid.
#[must_use]
pub const fn square_indices(first: i32, second: i32) -> (i32, i32) {
    // 'S', the false origin, is in column 2, row 3 of the table
    let easting = (first % 5 - 2) * 5 + second % 5;
    let northing = (3 - first / 5) * 5 + (4 - second / 5);
    (easting, northing)
}

/// Calculate the grid letters of a 100 km square.
/// * `easting`, `northing` - the 100 km square indices from the false origin.
///
/// returns the pair of letters, or None if the square is not on the National Grid.
#[must_use]
pub fn square_letters(easting: i32, northing: i32) -> Option<(char, char)> {
    if !(0..EASTING_SQUARES).contains(&easting) || !(0..NORTHING_SQUARES).contains(&northing) {
        return None;
    }

    let first = (3 - northing / 5) * 5 + easting / 5 + 2;
    let second = (4 - northing % 5) * 5 + easting % 5;
    Some((LETTERS[first as usize], LETTERS[second as usize]))
}

/// The precision of a grid reference, determined by its number of digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    /// 10 digits.
    Metre,
    /// 8 digits.
    TenMetres,
    /// 6 digits.
    HundredMetres,
    /// 4 digits.
    Kilometre,
    /// 2 digits.
    TenKilometres,
    /// Letters only.
    HundredKilometres,
}

impl Resolution {
    /// The `Resolution`s from finest to coarsest.
    pub const ALL: [Self; 6] = [
        Self::Metre,
        Self::TenMetres,
        Self::HundredMetres,
        Self::Kilometre,
        Self::TenKilometres,
        Self::HundredKilometres,
    ];

    /// The `Resolution` of a grid reference with `digits` easting digits.
    #[must_use]
    pub const fn from_digits(digits: usize) -> Option<Self> {
        match digits {
            5 => Some(Self::Metre),
            4 => Some(Self::TenMetres),
            3 => Some(Self::HundredMetres),
            2 => Some(Self::Kilometre),
            1 => Some(Self::TenKilometres),
            0 => Some(Self::HundredKilometres),
            _ => None,
        }
    }

    /// The number of easting (or northing) digits.
    #[must_use]
    pub const fn digits(self) -> usize {
        match self {
            Self::Metre => 5,
            Self::TenMetres => 4,
            Self::HundredMetres => 3,
            Self::Kilometre => 2,
            Self::TenKilometres => 1,
            Self::HundredKilometres => 0,
        }
    }

    /// The side of the square denoted by a grid reference, in metres.
    #[must_use]
    pub const fn metres(self) -> f64 {
        match self {
            Self::Metre => 1.0,
            Self::TenMetres => 10.0,
            Self::HundredMetres => 100.0,
            Self::Kilometre => 1_000.0,
            Self::TenKilometres => 10_000.0,
            Self::HundredKilometres => 100_000.0,
        }
    }
}

/// A British National Grid coordinate.
///
/// The easting and northing of the south west corner of a square with
/// sides of `resolution`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneCoordinate {
    easting: Metres,
    northing: Metres,
    resolution: Resolution,
}

impl PlaneCoordinate {
    /// Constructor.
    /// * `easting`, `northing` - from the National Grid false origin.
    /// * `resolution` - the precision of the coordinate.
    #[must_use]
    pub const fn new(easting: Metres, northing: Metres, resolution: Resolution) -> Self {
        Self {
            easting,
            northing,
            resolution,
        }
    }

    /// The easting from the false origin.
    #[must_use]
    pub const fn easting(&self) -> Metres {
        self.easting
    }

    /// The northing from the false origin.
    #[must_use]
    pub const fn northing(&self) -> Metres {
        self.northing
    }

    /// The precision of the coordinate.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// The centre of the square denoted by the coordinate.
    #[must_use]
    pub fn centre(&self) -> (Metres, Metres) {
        let half = 0.5 * self.resolution.metres();
        (
            Metres(self.easting.0 + half),
            Metres(self.northing.0 + half),
        )
    }

    /// Whether the coordinate lies within a 100 km square of the National Grid.
    #[must_use]
    pub fn is_on_grid(&self) -> bool {
        self.square().is_some()
    }

    /// The grid letters of the 100 km square containing the coordinate.
    fn square(&self) -> Option<(char, char)> {
        let easting = libm::floor(self.easting.0 / SQUARE_SIZE);
        let northing = libm::floor(self.northing.0 / SQUARE_SIZE);
        if easting.is_finite() && northing.is_finite() {
            square_letters(easting as i32, northing as i32)
        } else {
            None
        }
    }

    /// Convert the coordinate to an OSGB36 latitude and longitude using the
    /// inverse National Grid projection.
    /// # Errors
    /// `ProjectionError` if the footpoint latitude does not converge.
    pub fn to_geographic(&self) -> Result<GeographicCoordinate, ProjectionError> {
        let (lat, lon) = NATIONAL_GRID.inverse(self.easting, self.northing)?;
        Ok(GeographicCoordinate::new(lat, lon, Datum::Osgb36))
    }
}

impl fmt::Display for PlaneCoordinate {
    /// A grid reference at the coordinate's resolution, or the easting and
    /// northing if it is not on the National Grid.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_grid_reference(self, self.resolution) {
            Ok(reference) => f.write_str(&reference),
            Err(_) => write!(f, "{}, {}", self.easting.0, self.northing.0),
        }
    }
}

impl FromStr for PlaneCoordinate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_grid_reference(s)
    }
}

/// Normalize a grid reference: remove whitespace and convert to upper case.
/// # Examples
/// ```
/// use osgb_grid::grid::normalize;
///
/// assert_eq!("SN853872", normalize(" sn 853 872"));
/// ```
#[must_use]
pub fn normalize(reference: &str) -> String {
    reference
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Parse an alphanumeric grid reference.
/// * `reference` - two grid letters followed by an even number of digits,
///   up to 10. Case and whitespace are ignored.
///
/// returns the south west corner of the referenced square.
/// # Errors
/// `ParseError` naming the reference and the constraint it violates.
/// # Examples
/// ```
/// use osgb_grid::grid::{parse_grid_reference, Resolution};
///
/// let coord = parse_grid_reference("SN 853 872").unwrap();
/// assert_eq!(285_300.0, coord.easting().0);
/// assert_eq!(287_200.0, coord.northing().0);
/// assert_eq!(Resolution::HundredMetres, coord.resolution());
/// ```
pub fn parse_grid_reference(reference: &str) -> Result<PlaneCoordinate, ParseError> {
    let error = |kind| ParseError::new(reference, kind);

    let normalized = normalize(reference);
    let mut chars = normalized.chars();
    let mut next_letter = || {
        let letter = chars.next().ok_or_else(|| error(ParseErrorKind::Empty))?;
        letter_index(letter).ok_or_else(|| error(ParseErrorKind::InvalidLetter(letter)))
    };
    let first = next_letter()?;
    let second = next_letter()?;

    let digits = &normalized[2..];
    if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(error(ParseErrorKind::InvalidCharacter(c)));
    }
    if MAX_DIGITS < digits.len() {
        return Err(error(ParseErrorKind::TooManyDigits(digits.len())));
    }
    if digits.len() % 2 != 0 {
        return Err(error(ParseErrorKind::OddDigitCount(digits.len())));
    }

    let (square_easting, square_northing) = square_indices(first, second);
    if !(0..EASTING_SQUARES).contains(&square_easting)
        || !(0..NORTHING_SQUARES).contains(&square_northing)
    {
        return Err(error(ParseErrorKind::OutsideGrid(normalized[..2].to_owned())));
    }

    let half = digits.len() / 2;
    let resolution = Resolution::from_digits(half)
        .ok_or_else(|| error(ParseErrorKind::TooManyDigits(digits.len())))?;
    let (easting_digits, northing_digits) = digits.split_at(half);

    Ok(PlaneCoordinate::new(
        Metres(
            f64::from(square_easting) * SQUARE_SIZE
                + f64::from(digits_value(easting_digits)) * resolution.metres(),
        ),
        Metres(
            f64::from(square_northing) * SQUARE_SIZE
                + f64::from(digits_value(northing_digits)) * resolution.metres(),
        ),
        resolution,
    ))
}

/// The value of a string of at most 5 ASCII digits, zero if empty.
fn digits_value(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Format the grid letters and the easting and northing digits of a
/// coordinate at `resolution`. Offsets are truncated, not rounded.
fn grid_reference_parts(
    coord: &PlaneCoordinate,
    resolution: Resolution,
) -> Result<(String, String, String), GridError> {
    let (first, second) = coord.square().ok_or(GridError {
        easting: coord.easting.0,
        northing: coord.northing.0,
    })?;

    let width = resolution.digits();
    let offset_digits = |value: f64| {
        let offset = value - libm::floor(value / SQUARE_SIZE) * SQUARE_SIZE;
        let digits = libm::floor(offset / resolution.metres()) as u32;
        format!("{digits:0width$}")
    };

    let easting = if width == 0 {
        String::new()
    } else {
        offset_digits(coord.easting.0)
    };
    let northing = if width == 0 {
        String::new()
    } else {
        offset_digits(coord.northing.0)
    };
    Ok((format!("{first}{second}"), easting, northing))
}

/// Format a coordinate as a grid reference.
/// * `coord` - the coordinate.
/// * `resolution` - the resolution of the grid reference.
///
/// returns the grid reference of the square of side `resolution` that
/// contains the coordinate, without spaces.
/// # Errors
/// `GridError` if `coord` is not on the National Grid.
/// # Examples
/// ```
/// use osgb_grid::Metres;
/// use osgb_grid::grid::{format_grid_reference, PlaneCoordinate, Resolution};
///
/// let coord = PlaneCoordinate::new(Metres(285_300.0), Metres(287_200.0), Resolution::HundredMetres);
/// assert_eq!("SN853872", format_grid_reference(&coord, Resolution::HundredMetres).unwrap());
/// assert_eq!("SN8587", format_grid_reference(&coord, Resolution::Kilometre).unwrap());
/// ```
pub fn format_grid_reference(
    coord: &PlaneCoordinate,
    resolution: Resolution,
) -> Result<String, GridError> {
    let (letters, easting, northing) = grid_reference_parts(coord, resolution)?;
    Ok(letters + &easting + &northing)
}

/// Format a coordinate as a grid reference with spaces between the
/// letters and the easting and northing digits, e.g. "SN 853 872".
/// # Errors
/// `GridError` if `coord` is not on the National Grid.
pub fn format_grid_reference_spaced(
    coord: &PlaneCoordinate,
    resolution: Resolution,
) -> Result<String, GridError> {
    let (letters, easting, northing) = grid_reference_parts(coord, resolution)?;
    if easting.is_empty() {
        Ok(letters)
    } else {
        Ok(format!("{letters} {easting} {northing}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_table() {
        assert_eq!(25, LETTERS.len());
        assert!(!LETTERS.contains(&'I'));
        assert_eq!(Some(0), letter_index('A'));
        assert_eq!(Some(7), letter_index('H'));
        assert_eq!(Some(8), letter_index('J'));
        assert_eq!(Some(24), letter_index('Z'));
        assert_eq!(None, letter_index('I'));
        assert_eq!(None, letter_index('a'));
        assert_eq!(None, letter_index('1'));
    }

    #[test]
    fn test_square_indices_and_letters() {
        // SV is the false origin
        let s = letter_index('S').unwrap();
        let v = letter_index('V').unwrap();
        assert_eq!((0, 0), square_indices(s, v));
        assert_eq!(Some(('S', 'V')), square_letters(0, 0));

        let n = letter_index('N').unwrap();
        assert_eq!((2, 2), square_indices(s, n));

        let t = letter_index('T').unwrap();
        let g = letter_index('G').unwrap();
        assert_eq!((6, 3), square_indices(t, g));

        let h = letter_index('H').unwrap();
        let p = letter_index('P').unwrap();
        assert_eq!((4, 12), square_indices(h, p));

        // Every square on the grid round trips through its letters
        for easting in 0..EASTING_SQUARES {
            for northing in 0..NORTHING_SQUARES {
                let (first, second) = square_letters(easting, northing).unwrap();
                let indices = square_indices(
                    letter_index(first).unwrap(),
                    letter_index(second).unwrap(),
                );
                assert_eq!((easting, northing), indices);
            }
        }

        assert_eq!(None, square_letters(-1, 0));
        assert_eq!(None, square_letters(7, 0));
        assert_eq!(None, square_letters(0, 13));
    }

    #[test]
    fn test_resolution() {
        for resolution in Resolution::ALL {
            assert_eq!(Some(resolution), Resolution::from_digits(resolution.digits()));
            let expected = (resolution.digits()..5).fold(1.0, |acc, _| acc * 10.0);
            assert_eq!(expected, resolution.metres());
        }
        assert_eq!(None, Resolution::from_digits(6));
        assert!(Resolution::Metre < Resolution::HundredKilometres);
    }

    #[test]
    fn test_parse_grid_reference() {
        let coord = parse_grid_reference("SN853872").unwrap();
        assert_eq!(Metres(285_300.0), coord.easting());
        assert_eq!(Metres(287_200.0), coord.northing());
        assert_eq!(Resolution::HundredMetres, coord.resolution());

        let coord: PlaneCoordinate = " tq 30080 80080 ".parse().unwrap();
        assert_eq!(Metres(530_080.0), coord.easting());
        assert_eq!(Metres(180_080.0), coord.northing());
        assert_eq!(Resolution::Metre, coord.resolution());

        let coord = parse_grid_reference("HP").unwrap();
        assert_eq!(Metres(400_000.0), coord.easting());
        assert_eq!(Metres(1_200_000.0), coord.northing());
        assert_eq!(Resolution::HundredKilometres, coord.resolution());

        let coord = parse_grid_reference("NN16").unwrap();
        assert_eq!(Metres(210_000.0), coord.easting());
        assert_eq!(Metres(760_000.0), coord.northing());
        assert_eq!(Resolution::TenKilometres, coord.resolution());
    }

    #[test]
    fn test_parse_grid_reference_errors() {
        let kind = |reference: &str| parse_grid_reference(reference).unwrap_err().kind;

        assert_eq!(ParseErrorKind::Empty, kind(""));
        assert_eq!(ParseErrorKind::Empty, kind("S"));
        assert_eq!(ParseErrorKind::InvalidLetter('I'), kind("SI123456"));
        assert_eq!(ParseErrorKind::InvalidLetter('I'), kind("IN123456"));
        assert_eq!(ParseErrorKind::InvalidLetter('1'), kind("1N123456"));
        assert_eq!(ParseErrorKind::InvalidCharacter('X'), kind("SN85X872"));
        assert_eq!(ParseErrorKind::OddDigitCount(5), kind("SN85387"));
        assert_eq!(ParseErrorKind::TooManyDigits(12), kind("SN853872853872"));
        assert_eq!(ParseErrorKind::TooManyDigits(11), kind("SN12345678901"));
        assert_eq!(ParseErrorKind::OutsideGrid("AA".to_owned()), kind("AA1234"));
        assert_eq!(ParseErrorKind::OutsideGrid("UA".to_owned()), kind("UA"));
        assert_eq!(ParseErrorKind::OutsideGrid("JA".to_owned()), kind("ja 12 34"));

        let error = parse_grid_reference("sn 853 87").unwrap_err();
        assert_eq!("sn 853 87", error.reference);
    }

    #[test]
    fn test_format_grid_reference() {
        let coord = parse_grid_reference("SN853872").unwrap();
        assert_eq!("SN853872", coord.to_string());
        assert_eq!(
            "SN8530087200",
            format_grid_reference(&coord, Resolution::Metre).unwrap()
        );
        assert_eq!(
            "SN8587",
            format_grid_reference(&coord, Resolution::Kilometre).unwrap()
        );
        assert_eq!(
            "SN",
            format_grid_reference(&coord, Resolution::HundredKilometres).unwrap()
        );
        assert_eq!(
            "SN 853 872",
            format_grid_reference_spaced(&coord, Resolution::HundredMetres).unwrap()
        );
        assert_eq!(
            "SN",
            format_grid_reference_spaced(&coord, Resolution::HundredKilometres).unwrap()
        );

        let coord = PlaneCoordinate::new(Metres(12.0), Metres(3.0), Resolution::Metre);
        assert_eq!("SV0001200003", coord.to_string());

        let coord = PlaneCoordinate::new(Metres(-1.0), Metres(3.0), Resolution::Metre);
        assert!(!coord.is_on_grid());
        assert_eq!(
            Err(GridError {
                easting: -1.0,
                northing: 3.0
            }),
            format_grid_reference(&coord, Resolution::Metre)
        );
        assert_eq!("-1, 3", coord.to_string());
    }

    #[test]
    fn test_grid_reference_round_trip() {
        let references = [
            "SV", "HP", "TG51", "NN1665", "SN853872", "TQ30088008", "NT2555573451", "HU3961241228",
            "SX9268091020",
        ];
        for reference in references {
            let coord = parse_grid_reference(reference).unwrap();
            assert_eq!(reference, coord.to_string());

            // Formatting at a coarser resolution truncates the digits
            for resolution in Resolution::ALL
                .into_iter()
                .filter(|r| coord.resolution() <= *r)
            {
                let coarse = format_grid_reference(&coord, resolution).unwrap();
                let digits = resolution.digits();
                let half = (reference.len() - 2) / 2;
                let expected = format!(
                    "{}{}{}",
                    &reference[..2],
                    &reference[2..2 + digits],
                    &reference[2 + half..2 + half + digits]
                );
                assert_eq!(expected, coarse);
            }
        }
    }

    #[test]
    fn test_monotonic_resolution() {
        let references = ["SN", "SN88", "SN8587", "SN853872", "SN85308720", "SN8530087200"];
        let mut previous: Option<PlaneCoordinate> = None;
        for reference in references {
            let coord = parse_grid_reference(reference).unwrap();
            if let Some(previous) = previous {
                assert!(coord.resolution() < previous.resolution());
                // the finer square lies within the coarser square
                assert!(previous.easting().0 <= coord.easting().0);
                assert!(coord.easting().0 < previous.easting().0 + previous.resolution().metres());
                assert!(previous.northing().0 <= coord.northing().0);
                assert!(
                    coord.northing().0 < previous.northing().0 + previous.resolution().metres()
                );
            }
            previous = Some(coord);
        }
    }

    #[test]
    fn test_centre() {
        let coord = parse_grid_reference("SN853872").unwrap();
        let (easting, northing) = coord.centre();
        assert_eq!(Metres(285_350.0), easting);
        assert_eq!(Metres(287_250.0), northing);

        let coord = parse_grid_reference("SN").unwrap();
        let (easting, northing) = coord.centre();
        assert_eq!(Metres(250_000.0), easting);
        assert_eq!(Metres(250_000.0), northing);
    }
}
