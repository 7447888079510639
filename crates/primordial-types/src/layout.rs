// ─────────────────────────────────────────────────────────────────────
// Primordial Spectrum Core — Perturbation Layout
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! What the perturbation module hands over to the primordial module:
//! which modes exist, their wavenumber ranges and their initial conditions.
//!
//! The position of an initial condition inside `ModeLayout::initial_conditions`
//! is its index in the packed symmetric tables.

use serde::{Deserialize, Serialize};

/// Perturbation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeType {
    Scalar,
    Vector,
    Tensor,
}

/// Initial condition catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcType {
    Adiabatic,
    BaryonIsocurvature,
    CdmIsocurvature,
    NeutrinoDensityIsocurvature,
    NeutrinoVelocityIsocurvature,
    Tensor,
}

/// Entries of a packed `n x n` symmetric matrix, `n(n+1)/2`.
pub fn packed_size(n: usize) -> usize {
    n * (n + 1) / 2
}

/// One perturbation mode as sampled by the perturbation module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeLayout {
    pub mode: ModeType,
    /// First wavenumber sampled for this mode [1/Mpc].
    pub k_min: f64,
    /// Last wavenumber sampled for this mode [1/Mpc].
    pub k_max: f64,
    pub initial_conditions: Vec<IcType>,
}

impl ModeLayout {
    pub fn new(mode: ModeType, k_min: f64, k_max: f64, initial_conditions: Vec<IcType>) -> Self {
        ModeLayout {
            mode,
            k_min,
            k_max,
            initial_conditions,
        }
    }

    pub fn ic_size(&self) -> usize {
        self.initial_conditions.len()
    }

    pub fn ic_ic_size(&self) -> usize {
        packed_size(self.ic_size())
    }

    pub fn ic_index(&self, ic: IcType) -> Option<usize> {
        self.initial_conditions.iter().position(|&c| c == ic)
    }
}

/// Full set of modes requested from the primordial module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerturbationLayout {
    pub modes: Vec<ModeLayout>,
}

impl PerturbationLayout {
    pub fn new(modes: Vec<ModeLayout>) -> Self {
        PerturbationLayout { modes }
    }

    pub fn has_perturbations(&self) -> bool {
        !self.modes.is_empty()
    }

    pub fn mode_index(&self, mode: ModeType) -> Option<usize> {
        self.modes.iter().position(|m| m.mode == mode)
    }

    pub fn mode(&self, mode: ModeType) -> Option<&ModeLayout> {
        self.modes.iter().find(|m| m.mode == mode)
    }

    pub fn has_mode(&self, mode: ModeType) -> bool {
        self.mode(mode).is_some()
    }

    /// Smallest first-k and largest last-k over all modes.
    pub fn k_range(&self) -> Option<(f64, f64)> {
        if self.modes.is_empty() {
            return None;
        }
        let k_min = self.modes.iter().map(|m| m.k_min).fold(f64::INFINITY, f64::min);
        let k_max = self.modes.iter().map(|m| m.k_max).fold(0.0_f64, f64::max);
        Some((k_min, k_max))
    }
}
