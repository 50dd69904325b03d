use alloc::string::{String, ToString};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separates the coordinate pairs of a descriptor.
pub const PAIR_SEPARATOR: char = ';';
/// Separates the two coordinates inside a pair.
pub const FIELD_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A drill as encoded in a descriptor string like
/// `072.4188,166.2855;031.2016,035.1107;027.4153,030.8499;000.0,000.0`.
///
/// The pairs are, in order:
/// * `cue`: where the cue ball lies
/// * `target`: where the cue ball has to hit (the ghost ball position)
/// * `called`: the ball that has to be pocketed
/// * `pocket`: the pocket the called ball has to go into
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub cue: Point,
    pub target: Point,
    pub called: Point,
    pub pocket: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("expected at least 4 coordinate pairs, found {0}")]
    PairCount(usize),
    #[error("pair {pair} has {found} fields instead of 2")]
    FieldCount { pair: usize, found: usize },
    #[error("pair {pair} contains {field:?}, which is not a decimal number")]
    InvalidField { pair: usize, field: String },
}

impl Drill {
    /// Parses a descriptor: four pairs of decimal fields, optionally followed by more
    /// `;` groups of decimal fields (like the `00120025` drill code the renderer appends),
    /// which are checked but not kept. No whitespace, no signs, no exponents.
    pub fn parse(descriptor: &str) -> Result<Drill, DescriptorError> {
        let pairs = descriptor.split(PAIR_SEPARATOR).count();
        if pairs < 4 {
            return Err(DescriptorError::PairCount(pairs));
        }

        let mut points = [Point::default(); 4];
        let mut groups = descriptor.split(PAIR_SEPARATOR).enumerate();
        for (point, (pair, text)) in points.iter_mut().zip(&mut groups) {
            *point = parse_pair(pair, text)?;
        }
        for (pair, text) in groups {
            for field in text.split(FIELD_SEPARATOR) {
                parse_field(pair, field)?;
            }
        }

        let [cue, target, called, pocket] = points;
        Ok(Drill {
            cue,
            target,
            called,
            pocket,
        })
    }

    /// The four points in descriptor order.
    pub fn points(&self) -> [Point; 4] {
        [self.cue, self.target, self.called, self.pocket]
    }
}

impl FromStr for Drill {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Drill::parse(s)
    }
}

fn parse_pair(pair: usize, text: &str) -> Result<Point, DescriptorError> {
    let found = text.split(FIELD_SEPARATOR).count();
    let mut fields = text.split(FIELD_SEPARATOR);
    match (fields.next(), fields.next(), found) {
        (Some(x), Some(y), 2) => Ok(Point {
            x: parse_field(pair, x)?,
            y: parse_field(pair, y)?,
        }),
        _ => Err(DescriptorError::FieldCount { pair, found }),
    }
}

/// digits with at most one `.`, at least one digit
fn parse_field(pair: usize, field: &str) -> Result<f64, DescriptorError> {
    let invalid = || DescriptorError::InvalidField {
        pair,
        field: field.to_string(),
    };
    let digits = field.bytes().filter(u8::is_ascii_digit).count();
    let dots = field.bytes().filter(|b| *b == b'.').count();
    if digits == 0 || dots > 1 || digits + dots != field.len() {
        return Err(invalid());
    }
    field.parse().map_err(|_| invalid())
}
