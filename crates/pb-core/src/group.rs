//! Groups and their settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::id::GroupId;

/// The rating system a group runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingSystem {
    SeriousElo,
    CatchUp,
    RacsElo,
}

impl RatingSystem {
    /// Default volatility for this system.
    pub fn default_k_factor(self) -> f64 {
        match self {
            RatingSystem::SeriousElo => 32.0,
            RatingSystem::CatchUp => 32.0,
            RatingSystem::RacsElo => 100.0,
        }
    }

    /// Default sensitivity constant for this system.
    ///
    /// Serious and Catch-Up interpret this as a rating-point scale; Rac's
    /// interprets it as a ratio of the combined team ratings.
    pub fn default_elo_const(self) -> f64 {
        match self {
            RatingSystem::SeriousElo => 400.0,
            RatingSystem::CatchUp => 400.0,
            RatingSystem::RacsElo => 0.3,
        }
    }
}

/// Which matchup rules are active during schedule generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintToggles {
    pub no_repeat_teammate_in_event: bool,
    pub no_repeat_teammate_from_previous_event: bool,
    pub no_repeat_opponent_in_event: bool,
}

/// Group configuration.
///
/// This is a closed struct: unknown keys are rejected at the serde boundary.
/// `k_factor` and `elo_const` default per rating system when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GroupSettings {
    pub rating_system: RatingSystem,
    /// Baseline rating for new members and for recompute resets.
    pub initial_rating: f64,
    pub k_factor: Option<f64>,
    pub elo_const: Option<f64>,
    /// Rating-balance bound as a fraction of the stronger team's average.
    pub elo_diff: f64,
    pub no_repeat_teammate_in_event: bool,
    pub no_repeat_teammate_from_previous_event: bool,
    pub no_repeat_opponent_in_event: bool,
    pub auto_relax_elo_diff: bool,
    pub auto_relax_step: f64,
    pub auto_relax_max_elo_diff: f64,
    /// UX hint for event creation forms; the engine honours only the rounds
    /// passed in when an event is created.
    pub default_rounds: u32,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            rating_system: RatingSystem::SeriousElo,
            initial_rating: 1000.0,
            k_factor: None,
            elo_const: None,
            elo_diff: 0.05,
            no_repeat_teammate_in_event: true,
            no_repeat_teammate_from_previous_event: true,
            no_repeat_opponent_in_event: true,
            auto_relax_elo_diff: true,
            auto_relax_step: 0.01,
            auto_relax_max_elo_diff: 0.25,
            default_rounds: 1,
        }
    }
}

impl GroupSettings {
    /// Effective K factor: the configured value or the system default.
    pub fn effective_k_factor(&self) -> f64 {
        self.k_factor
            .unwrap_or_else(|| self.rating_system.default_k_factor())
    }

    /// Effective sensitivity constant: the configured value or the system default.
    pub fn effective_elo_const(&self) -> f64 {
        self.elo_const
            .unwrap_or_else(|| self.rating_system.default_elo_const())
    }

    /// The active matchup rules.
    pub fn constraint_toggles(&self) -> ConstraintToggles {
        ConstraintToggles {
            no_repeat_teammate_in_event: self.no_repeat_teammate_in_event,
            no_repeat_teammate_from_previous_event: self.no_repeat_teammate_from_previous_event,
            no_repeat_opponent_in_event: self.no_repeat_opponent_in_event,
        }
    }

    /// Validate settings values.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_rating.is_finite() || self.initial_rating <= 0.0 {
            return Err(EngineError::Validation(format!(
                "initial_rating must be positive, got {}",
                self.initial_rating
            )));
        }
        if !(0.0..=1.0).contains(&self.elo_diff) {
            return Err(EngineError::Validation(format!(
                "elo_diff must be a fraction in [0, 1], got {}",
                self.elo_diff
            )));
        }
        if let Some(k) = self.k_factor {
            if !k.is_finite() || k <= 0.0 {
                return Err(EngineError::Validation(format!(
                    "k_factor must be positive, got {k}"
                )));
            }
        }
        if let Some(c) = self.elo_const {
            if !c.is_finite() || c <= 0.0 {
                return Err(EngineError::Validation(format!(
                    "elo_const must be positive, got {c}"
                )));
            }
        }
        if self.auto_relax_step <= 0.0 {
            return Err(EngineError::Validation(format!(
                "auto_relax_step must be positive, got {}",
                self.auto_relax_step
            )));
        }
        if self.auto_relax_max_elo_diff < self.elo_diff {
            return Err(EngineError::Validation(format!(
                "auto_relax_max_elo_diff ({}) must not be below elo_diff ({})",
                self.auto_relax_max_elo_diff, self.elo_diff
            )));
        }
        if self.default_rounds < 1 {
            return Err(EngineError::Validation(
                "default_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A closed group of players that meets for recurring events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub settings: GroupSettings,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group with a fresh id.
    pub fn new(name: impl Into<String>, settings: GroupSettings) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            settings,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = GroupSettings::default();
        assert_eq!(s.initial_rating, 1000.0);
        assert_eq!(s.elo_diff, 0.05);
        assert!(s.no_repeat_teammate_in_event);
        assert!(s.auto_relax_elo_diff);
        assert_eq!(s.auto_relax_step, 0.01);
        assert_eq!(s.auto_relax_max_elo_diff, 0.25);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_per_system_defaults() {
        let mut s = GroupSettings::default();
        assert_eq!(s.effective_k_factor(), 32.0);
        assert_eq!(s.effective_elo_const(), 400.0);

        s.rating_system = RatingSystem::RacsElo;
        assert_eq!(s.effective_k_factor(), 100.0);
        assert_eq!(s.effective_elo_const(), 0.3);

        s.k_factor = Some(48.0);
        assert_eq!(s.effective_k_factor(), 48.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut s = GroupSettings::default();
        s.elo_diff = 1.5;
        assert!(s.validate().is_err());

        let mut s = GroupSettings::default();
        s.initial_rating = -10.0;
        assert!(s.validate().is_err());

        let mut s = GroupSettings::default();
        s.auto_relax_max_elo_diff = 0.01;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = serde_json::from_str::<GroupSettings>(r#"{"elo_dif": 0.1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_settings_round_trip() {
        let s = GroupSettings {
            rating_system: RatingSystem::CatchUp,
            k_factor: Some(24.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: GroupSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rating_system, RatingSystem::CatchUp);
        assert_eq!(back.k_factor, Some(24.0));
    }
}
