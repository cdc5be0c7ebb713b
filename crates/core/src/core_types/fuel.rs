//! FBP fuel types and their published parameters
//!
//! Fuel types follow the Canadian Forest Fire Behavior Prediction System
//! (Forestry Canada Fire Danger Group 1992, ST-X-3) with the 2009 updates of
//! Wotton, Alexander & Taylor (GLC-X-10).
//!
//! # References
//! - Forestry Canada Fire Danger Group (1992). "Development and structure of the
//!   Canadian Forest Fire Behavior Prediction System." Information Report ST-X-3.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). "Updates and revisions to
//!   the 1992 Canadian Forest Fire Behavior Prediction System." GLC-X-10.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canadian FBP fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    /// Spruce-lichen woodland
    C1,
    /// Boreal spruce
    C2,
    /// Mature jack or lodgepole pine
    C3,
    /// Immature jack or lodgepole pine
    C4,
    /// Red and white pine
    C5,
    /// Conifer plantation
    C6,
    /// Ponderosa pine / Douglas-fir
    C7,
    /// Leafless aspen
    D1,
    /// Boreal mixedwood, leafless
    M1,
    /// Boreal mixedwood, green
    M2,
    /// Dead balsam fir mixedwood, leafless
    M3,
    /// Dead balsam fir mixedwood, green
    M4,
    /// Jack or lodgepole pine slash
    S1,
    /// White spruce / balsam slash
    S2,
    /// Coastal cedar / hemlock / Douglas-fir slash
    S3,
    /// Matted grass
    O1a,
    /// Standing grass
    O1b,
}

/// Rate-of-spread curve `RSI = a (1 - e^(-b ISI))^c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl SpreadCurve {
    /// Build a curve from its three coefficients
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Initial spread rate (m/min) for a given ISI
    #[inline]
    pub fn rsi(&self, isi: f64) -> f64 {
        self.a * (1.0 - (-self.b * isi).exp()).powf(self.c)
    }

    /// Invert the curve: the ISI that produces `rsi`
    ///
    /// Follows FBP eq. 41a; the argument of the logarithm is floored at 0.01
    /// as the published equations prescribe for rates at the asymptote.
    #[inline]
    pub fn isi_for(&self, rsi: f64) -> f64 {
        if rsi <= 0.0 {
            return 0.0;
        }
        let ratio = (rsi / self.a).powf(1.0 / self.c);
        let inner = (1.0 - ratio).max(0.01);
        inner.ln() / -self.b
    }
}

/// Static FBP parameters for a fuel type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelParameters {
    /// Spread curve (for mixedwoods this is the conifer or dead-fir component)
    pub curve: SpreadCurve,
    /// Buildup effect exponent base `q`
    pub q: f64,
    /// Reference buildup index `BUI0`
    pub bui0: f64,
    /// Crown base height (m), 0 for fuels without a canopy
    pub cbh: f64,
    /// Crown fuel load (kg/m²)
    pub cfl: f64,
}

const C2_CURVE: SpreadCurve = SpreadCurve::new(110.0, 0.0282, 1.5);
const D1_CURVE: SpreadCurve = SpreadCurve::new(30.0, 0.0232, 1.6);

impl FuelType {
    /// All fuel types in table order
    pub const ALL: [FuelType; 17] = [
        FuelType::C1,
        FuelType::C2,
        FuelType::C3,
        FuelType::C4,
        FuelType::C5,
        FuelType::C6,
        FuelType::C7,
        FuelType::D1,
        FuelType::M1,
        FuelType::M2,
        FuelType::M3,
        FuelType::M4,
        FuelType::S1,
        FuelType::S2,
        FuelType::S3,
        FuelType::O1a,
        FuelType::O1b,
    ];

    /// FBP table 6 parameters
    pub const fn parameters(self) -> FuelParameters {
        let (curve, q, bui0, cbh, cfl) = match self {
            FuelType::C1 => (SpreadCurve::new(90.0, 0.0649, 4.5), 0.90, 72.0, 2.0, 0.75),
            FuelType::C2 => (C2_CURVE, 0.70, 64.0, 3.0, 0.80),
            FuelType::C3 => (SpreadCurve::new(110.0, 0.0444, 3.0), 0.75, 62.0, 8.0, 1.15),
            FuelType::C4 => (SpreadCurve::new(110.0, 0.0293, 1.5), 0.80, 66.0, 4.0, 1.20),
            FuelType::C5 => (SpreadCurve::new(30.0, 0.0697, 4.0), 0.80, 56.0, 18.0, 1.20),
            FuelType::C6 => (SpreadCurve::new(30.0, 0.0800, 3.0), 0.80, 62.0, 7.0, 1.80),
            FuelType::C7 => (SpreadCurve::new(45.0, 0.0305, 2.0), 0.85, 106.0, 10.0, 0.50),
            FuelType::D1 => (D1_CURVE, 0.90, 32.0, 0.0, 0.0),
            FuelType::M1 | FuelType::M2 => (C2_CURVE, 0.80, 50.0, 6.0, 0.80),
            FuelType::M3 => (SpreadCurve::new(170.0, 0.082, 1.698), 0.80, 50.0, 6.0, 0.80),
            FuelType::M4 => (SpreadCurve::new(140.0, 0.0404, 3.02), 0.80, 50.0, 6.0, 0.80),
            FuelType::S1 => (SpreadCurve::new(75.0, 0.0297, 1.3), 0.75, 38.0, 0.0, 0.0),
            FuelType::S2 => (SpreadCurve::new(40.0, 0.0438, 1.7), 0.75, 63.0, 0.0, 0.0),
            FuelType::S3 => (SpreadCurve::new(55.0, 0.0829, 3.2), 0.75, 31.0, 0.0, 0.0),
            FuelType::O1a => (SpreadCurve::new(190.0, 0.0310, 1.4), 1.0, 1.0, 0.0, 0.0),
            FuelType::O1b => (SpreadCurve::new(250.0, 0.0350, 1.7), 1.0, 1.0, 0.0, 0.0),
        };
        FuelParameters {
            curve,
            q,
            bui0,
            cbh,
            cfl,
        }
    }

    /// Curve used for the deciduous component of mixedwood fuels
    pub const fn deciduous_curve() -> SpreadCurve {
        D1_CURVE
    }

    /// True for the open grass fuels
    pub const fn is_grass(self) -> bool {
        matches!(self, FuelType::O1a | FuelType::O1b)
    }

    /// True for fuels that can carry a crown fire
    pub fn has_canopy(self) -> bool {
        self.parameters().cbh > 0.0
    }

    /// Canonical label (`C1`, `O1a`, ...)
    pub const fn label(self) -> &'static str {
        match self {
            FuelType::C1 => "C1",
            FuelType::C2 => "C2",
            FuelType::C3 => "C3",
            FuelType::C4 => "C4",
            FuelType::C5 => "C5",
            FuelType::C6 => "C6",
            FuelType::C7 => "C7",
            FuelType::D1 => "D1",
            FuelType::M1 => "M1",
            FuelType::M2 => "M2",
            FuelType::M3 => "M3",
            FuelType::M4 => "M4",
            FuelType::S1 => "S1",
            FuelType::S2 => "S2",
            FuelType::S3 => "S3",
            FuelType::O1a => "O1a",
            FuelType::O1b => "O1b",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of interpreting a fuel label from an input file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuelLabel {
    /// Burnable FBP fuel, with an optional embedded percentage (PC or PDF)
    Fuel {
        fuel: FuelType,
        percent: Option<f64>,
    },
    /// Non-fuel, water, urban, rock...
    NonFuel,
}

/// Error returned when a fuel label cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFuel(pub String);

impl fmt::Display for UnknownFuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown fuel type '{}'", self.0)
    }
}

impl std::error::Error for UnknownFuel {}

impl FromStr for FuelLabel {
    type Err = UnknownFuel;

    /// Accepts `C1`, `C-1`, `c-1`, `O-1a`, `M-1/M-2 (25 PC)`, `M-3/M-4 (30 PDF)`,
    /// and the non-fuel labels `NF`, `WA`, `Non-fuel`, `Water`, `Urban`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if matches!(
            lower.as_str(),
            "nf" | "wa" | "non-fuel" | "nonfuel" | "non fuel" | "water" | "urban" | "rock"
        ) {
            return Ok(FuelLabel::NonFuel);
        }

        // Split off an embedded percentage such as "(25 PC)"
        let (code_part, percent) = match trimmed.find('(') {
            Some(open) => {
                let inside = trimmed[open + 1..].trim_end_matches(')');
                let digits: String = inside
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                let percent = digits
                    .parse::<f64>()
                    .map_err(|_| UnknownFuel(raw.to_string()))?;
                (trimmed[..open].trim(), Some(percent))
            }
            None => (trimmed, None),
        };

        // "M-1/M-2" style labels resolve to their first member
        let first = code_part.split('/').next().unwrap_or(code_part);
        let code: String = first
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        let fuel = match code.as_str() {
            "C1" => FuelType::C1,
            "C2" => FuelType::C2,
            "C3" => FuelType::C3,
            "C4" => FuelType::C4,
            "C5" => FuelType::C5,
            "C6" => FuelType::C6,
            "C7" => FuelType::C7,
            "D1" => FuelType::D1,
            "M1" => FuelType::M1,
            "M2" => FuelType::M2,
            "M3" => FuelType::M3,
            "M4" => FuelType::M4,
            "S1" => FuelType::S1,
            "S2" => FuelType::S2,
            "S3" => FuelType::S3,
            "O1A" => FuelType::O1a,
            "O1B" => FuelType::O1b,
            _ => return Err(UnknownFuel(raw.to_string())),
        };
        Ok(FuelLabel::Fuel { fuel, percent })
    }
}
