//! Input record for one capsid build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CapsidError;

/// Largest accepted lattice walk index. Bounds `t_number` and the lattice
/// index box.
pub const MAX_WALK_INDEX: i32 = 256;

/// The eight periodic tilings a lattice can be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
    Hex,
    TriHex,
    SnubHex,
    RhombiTriHex,
    DualHex,
    DualTriHex,
    DualSnubHex,
    DualRhombiTriHex,
}

impl TileType {
    pub const ALL: [TileType; 8] = [
        TileType::Hex,
        TileType::TriHex,
        TileType::SnubHex,
        TileType::RhombiTriHex,
        TileType::DualHex,
        TileType::DualTriHex,
        TileType::DualSnubHex,
        TileType::DualRhombiTriHex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TileType::Hex => "hex",
            TileType::TriHex => "trihex",
            TileType::SnubHex => "snubhex",
            TileType::RhombiTriHex => "rhombitrihex",
            TileType::DualHex => "dualhex",
            TileType::DualTriHex => "dualtrihex",
            TileType::DualSnubHex => "dualsnubhex",
            TileType::DualRhombiTriHex => "dualrhombitrihex",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileType {
    type Err = CapsidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CapsidError::UnknownTile(s.to_string()))
    }
}

/// Order of the rotational axis the cage is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Symmetry {
    Two,
    Three,
    Five,
}

impl Symmetry {
    pub fn order(&self) -> usize {
        match self {
            Symmetry::Two => 2,
            Symmetry::Three => 3,
            Symmetry::Five => 5,
        }
    }

    /// Rotation between consecutive face copies (radians).
    pub fn step_angle(&self) -> f64 {
        std::f64::consts::TAU / self.order() as f64
    }
}

impl TryFrom<u8> for Symmetry {
    type Error = CapsidError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Symmetry::Two),
            3 => Ok(Symmetry::Three),
            5 => Ok(Symmetry::Five),
            other => Err(CapsidError::InvalidSymmetry(other)),
        }
    }
}

impl From<Symmetry> for u8 {
    fn from(s: Symmetry) -> u8 {
        s.order() as u8
    }
}

/// Triangulation number `h² + hk + k²`.
pub fn t_number(h: i32, k: i32) -> i32 {
    h * h + h * k + k * k
}

/// The same quadratic form for the second axis, `H² + HK + K²`.
pub fn q_number(h: i32, k: i32) -> i32 {
    t_number(h, k)
}

/// Caspar–Klug lattice parameters and view angles.
///
/// `tile` and `symmetry` are kept in their serialized form and parsed by
/// [`LatticeParams::tile_type`] and [`LatticeParams::symmetry`], so that an
/// unknown tile name or axis order surfaces as its own error kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeParams {
    pub h: i32,
    pub k: i32,
    /// First index of the second axis; `H = K = 0` mirrors `(h, k)`.
    #[serde(rename = "H")]
    pub h2: i32,
    /// Second index of the second axis.
    #[serde(rename = "K")]
    pub k2: i32,
    /// Circumradius of a single mer.
    #[serde(rename = "R")]
    pub radius: f64,
    pub tile: String,
    pub symmetry: u8,
    /// 0 keeps the flat polyhedron, 1 inflates fully.
    pub inflation: f64,
    /// Camera yaw, pitch and roll in degrees.
    pub theta: f64,
    pub psi: f64,
    pub phi: f64,
}

impl LatticeParams {
    /// Flat, unrotated build with `H = K = 0`.
    pub fn new(tile: TileType, h: i32, k: i32, radius: f64, symmetry: Symmetry) -> Self {
        Self {
            h,
            k,
            h2: 0,
            k2: 0,
            radius,
            tile: tile.as_str().to_string(),
            symmetry: symmetry.into(),
            inflation: 0.0,
            theta: 0.0,
            psi: 0.0,
            phi: 0.0,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, CapsidError> {
        let params: LatticeParams = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn tile_type(&self) -> Result<TileType, CapsidError> {
        self.tile.parse()
    }

    pub fn symmetry(&self) -> Result<Symmetry, CapsidError> {
        Symmetry::try_from(self.symmetry)
    }

    /// `(H, K)` after resolving the `(0, 0)` shorthand.
    pub fn second_axis(&self) -> (i32, i32) {
        if self.h2 == 0 && self.k2 == 0 {
            (self.h, self.k)
        } else {
            (self.h2, self.k2)
        }
    }

    pub fn t_number(&self) -> i32 {
        t_number(self.h, self.k)
    }

    pub fn q_number(&self) -> i32 {
        let (h2, k2) = self.second_axis();
        q_number(h2, k2)
    }

    /// Both axes share the same lattice walk; such cages are inflated
    /// toward a sphere rather than a capsule.
    pub fn is_equilateral(&self) -> bool {
        self.second_axis() == (self.h, self.k)
    }

    pub fn validate(&self) -> Result<(), CapsidError> {
        self.tile_type()?;
        self.symmetry()?;
        for (name, value) in [("h", self.h), ("k", self.k), ("H", self.h2), ("K", self.k2)] {
            if value < 0 {
                return Err(invalid(name, format!("must be non-negative, got {value}")));
            }
            if value > MAX_WALK_INDEX {
                return Err(invalid(name, format!("must be at most {MAX_WALK_INDEX}, got {value}")));
            }
        }
        if self.h == 0 && self.k == 0 {
            return Err(invalid("h", "h and k cannot both be zero".to_string()));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(invalid("R", format!("must be positive, got {}", self.radius)));
        }
        if !(0.0..=1.0).contains(&self.inflation) {
            return Err(invalid("inflation", format!("must lie in [0, 1], got {}", self.inflation)));
        }
        for (name, value) in [("theta", self.theta), ("psi", self.psi), ("phi", self.phi)] {
            if !value.is_finite() {
                return Err(invalid(name, "must be finite".to_string()));
            }
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> CapsidError {
    CapsidError::InvalidParameter { name, reason }
}
