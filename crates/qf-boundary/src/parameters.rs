//! Fixed-slot parameters record exchanged with `BoundaryLayer::compute`.

use crate::error::{BoundaryError, BoundaryResult};
use qf_core::units::{HeatFlux, Temperature, k, wpm2};

/// Record length for a single wall.
pub const SINGLE_WALL_LEN: usize = 24;

/// Record length with a second wall.
pub const SECOND_WALL_LEN: usize = 32;

/// Semantic index of each slot.
///
/// Slots `X` and `Area` are inputs; `compute` fills `DHydraulic..=Alpha`,
/// `compute_second_wall` fills `TWall2..=Alpha2`. The error slots are only
/// written by the Messe method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Slot {
    X = 0,
    Area,
    DHydraulic,
    TMean,
    PMean,
    UMean,
    MaMean,
    HMean,
    SMean,
    PrMean,
    ReDh,
    TCenter,
    UCenter,
    ErrMass,
    ErrMomentum,
    ErrEnergy,
    TWall,
    TauWall,
    QWall,
    HWall,
    YPlus1,
    TRecovery,
    HRecovery,
    Alpha,
    TWall2,
    TauWall2,
    QWall2,
    HWall2,
    YPlus1Wall2,
    TRecovery2,
    HRecovery2,
    Alpha2,
}

impl Slot {
    pub const ALL: [Slot; SECOND_WALL_LEN] = [
        Slot::X,
        Slot::Area,
        Slot::DHydraulic,
        Slot::TMean,
        Slot::PMean,
        Slot::UMean,
        Slot::MaMean,
        Slot::HMean,
        Slot::SMean,
        Slot::PrMean,
        Slot::ReDh,
        Slot::TCenter,
        Slot::UCenter,
        Slot::ErrMass,
        Slot::ErrMomentum,
        Slot::ErrEnergy,
        Slot::TWall,
        Slot::TauWall,
        Slot::QWall,
        Slot::HWall,
        Slot::YPlus1,
        Slot::TRecovery,
        Slot::HRecovery,
        Slot::Alpha,
        Slot::TWall2,
        Slot::TauWall2,
        Slot::QWall2,
        Slot::HWall2,
        Slot::YPlus1Wall2,
        Slot::TRecovery2,
        Slot::HRecovery2,
        Slot::Alpha2,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column label with SI unit.
    pub fn label(self) -> &'static str {
        match self {
            Slot::X => "x_m",
            Slot::Area => "area_m2",
            Slot::DHydraulic => "d_h_m",
            Slot::TMean => "T_K",
            Slot::PMean => "p_Pa",
            Slot::UMean => "u_m_s",
            Slot::MaMean => "Ma",
            Slot::HMean => "h_J_kg",
            Slot::SMean => "s_J_kgK",
            Slot::PrMean => "Pr",
            Slot::ReDh => "Re_dh",
            Slot::TCenter => "T_center_K",
            Slot::UCenter => "u_center_m_s",
            Slot::ErrMass => "err_mass",
            Slot::ErrMomentum => "err_momentum",
            Slot::ErrEnergy => "err_energy",
            Slot::TWall => "T_wall_K",
            Slot::TauWall => "tau_wall_Pa",
            Slot::QWall => "q_wall_W_m2",
            Slot::HWall => "h_wall_J_kg",
            Slot::YPlus1 => "y_plus_1",
            Slot::TRecovery => "T_recovery_K",
            Slot::HRecovery => "h_recovery_J_kg",
            Slot::Alpha => "alpha_W_m2K",
            Slot::TWall2 => "T_wall2_K",
            Slot::TauWall2 => "tau_wall2_Pa",
            Slot::QWall2 => "q_wall2_W_m2",
            Slot::HWall2 => "h_wall2_J_kg",
            Slot::YPlus1Wall2 => "y_plus_1_wall2",
            Slot::TRecovery2 => "T_recovery2_K",
            Slot::HRecovery2 => "h_recovery2_J_kg",
            Slot::Alpha2 => "alpha2_W_m2K",
        }
    }
}

/// Wall state of one wall, as stored in the record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallState {
    pub t_wall: f64,
    pub tau_wall: f64,
    pub q_wall: f64,
    pub h_wall: f64,
    pub y_plus_1: f64,
    pub t_recovery: f64,
    pub h_recovery: f64,
    pub alpha: f64,
}

impl WallState {
    /// Wall heat flux, positive into the wall.
    pub fn heat_flux(&self) -> HeatFlux {
        wpm2(self.q_wall)
    }

    pub fn recovery_temperature(&self) -> Temperature {
        k(self.t_recovery)
    }
}

/// Parameters record of 24 (one wall) or 32 (two walls) values.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    values: Vec<f64>,
}

impl Parameters {
    /// Single-wall record at axial position `x` with flow area `area`.
    pub fn new(x: f64, area: f64) -> Self {
        let mut values = vec![0.0; SINGLE_WALL_LEN];
        values[Slot::X.index()] = x;
        values[Slot::Area.index()] = area;
        Self { values }
    }

    /// Record with room for the second wall.
    pub fn with_second_wall(x: f64, area: f64) -> Self {
        let mut p = Self::new(x, area);
        p.values.resize(SECOND_WALL_LEN, 0.0);
        p
    }

    /// Wrap an existing array; it must hold at least 24 values.
    pub fn from_vec(values: Vec<f64>) -> BoundaryResult<Self> {
        if values.len() < SINGLE_WALL_LEN {
            return Err(BoundaryError::InvalidArg {
                what: "parameters record needs at least 24 slots",
            });
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_second_wall(&self) -> bool {
        self.values.len() >= SECOND_WALL_LEN
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Value of a slot; second-wall slots of a short record read as zero.
    pub fn get(&self, slot: Slot) -> f64 {
        self.values.get(slot.index()).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, slot: Slot, value: f64) -> BoundaryResult<()> {
        let v = self
            .values
            .get_mut(slot.index())
            .ok_or(BoundaryError::InvalidArg {
                what: "slot beyond record length",
            })?;
        *v = value;
        Ok(())
    }

    /// Wall state of the first wall.
    pub fn wall(&self) -> WallState {
        self.wall_from(Slot::TWall.index())
    }

    /// Wall state of the second wall.
    pub fn second_wall(&self) -> Option<WallState> {
        self.has_second_wall()
            .then(|| self.wall_from(Slot::TWall2.index()))
    }

    pub(crate) fn set_wall(&mut self, first_slot: Slot, w: &WallState) -> BoundaryResult<()> {
        let start = first_slot.index();
        if start + 8 > self.values.len() {
            return Err(BoundaryError::InvalidArg {
                what: "record too short for wall state",
            });
        }
        self.values[start..start + 8].copy_from_slice(&[
            w.t_wall,
            w.tau_wall,
            w.q_wall,
            w.h_wall,
            w.y_plus_1,
            w.t_recovery,
            w.h_recovery,
            w.alpha,
        ]);
        Ok(())
    }

    fn wall_from(&self, start: usize) -> WallState {
        let v = &self.values[start..start + 8];
        WallState {
            t_wall: v[0],
            tau_wall: v[1],
            q_wall: v[2],
            h_wall: v[3],
            y_plus_1: v[4],
            t_recovery: v[5],
            h_recovery: v[6],
            alpha: v[7],
        }
    }
}
