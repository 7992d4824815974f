//! Energy levels and the energy-based visibility rule.
//!
//! The current energy level narrows which tasks are suggested: the lower
//! the level, the smaller and lower-effort the visible set. The rule is
//! directional, not a symmetric closest-match.

use serde::{Deserialize, Serialize};

/// Self-reported capacity tier used to filter task suggestions.
///
/// `Crisis` is the overwhelm-recovery tier; it sits after `High` in the
/// selector cycle but below `Low` in terms of what it surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
    Crisis,
}

impl Default for EnergyLevel {
    fn default() -> Self {
        EnergyLevel::Medium
    }
}

impl EnergyLevel {
    /// Next level in the selector cycle: low → medium → high → crisis → low.
    pub fn next(self) -> Self {
        match self {
            EnergyLevel::Low => EnergyLevel::Medium,
            EnergyLevel::Medium => EnergyLevel::High,
            EnergyLevel::High => EnergyLevel::Crisis,
            EnergyLevel::Crisis => EnergyLevel::Low,
        }
    }

    /// Whether an item tagged with `task` energy is visible at this level.
    ///
    /// | current | visible task energies        |
    /// |---------|------------------------------|
    /// | crisis  | low                          |
    /// | low     | low, medium                  |
    /// | medium  | low, medium, high            |
    /// | high    | all                          |
    pub fn allows(self, task: EnergyLevel) -> bool {
        match self {
            EnergyLevel::Crisis => matches!(task, EnergyLevel::Low),
            EnergyLevel::Low => matches!(task, EnergyLevel::Low | EnergyLevel::Medium),
            EnergyLevel::Medium => matches!(
                task,
                EnergyLevel::Low | EnergyLevel::Medium | EnergyLevel::High
            ),
            EnergyLevel::High => true,
        }
    }
}
