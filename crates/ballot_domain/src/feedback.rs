use serde::{Deserialize, Serialize};

use crate::{error::PlatformError, Completion};

/// Haptic primitives a device can play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum HapticStyle {
    Light,
    Medium,
    Heavy,
    Soft,
    Rigid,
    Success,
    Warning,
    Error,
    Selection,
}

impl HapticStyle {
    /// Resolves a bridge `type` name: primitives, then product aliases,
    /// anything else plays as a button tap.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" | "navigate" | "share" => HapticStyle::Light,
            "medium" | "importantAction" => HapticStyle::Medium,
            "heavy" => HapticStyle::Heavy,
            "soft" | "buttonTap" => HapticStyle::Soft,
            "rigid" => HapticStyle::Rigid,
            "success" | "reminderScheduled" | "calendarEventAdded" => HapticStyle::Success,
            "warning" => HapticStyle::Warning,
            "error" => HapticStyle::Error,
            "selection" | "stateSelected" => HapticStyle::Selection,
            _ => HapticStyle::Soft,
        }
    }

    /// What to play instead on engines without soft/rigid impacts.
    pub fn fallback(self) -> Self {
        match self {
            HapticStyle::Soft => HapticStyle::Light,
            HapticStyle::Rigid => HapticStyle::Medium,
            other => other,
        }
    }
}

pub trait HapticEngine: Send + Sync {
    fn supports(&self, _style: HapticStyle) -> bool {
        true
    }

    fn play(&self, style: HapticStyle);

    /// Medium impact at `intensity` in `[0, 1]`.
    fn play_with_intensity(&self, _intensity: f32) {
        self.play(HapticStyle::Medium);
    }
}

/// Plays `style`, substituting the fallback primitive when unsupported.
pub fn play_haptic(engine: &dyn HapticEngine, style: HapticStyle) {
    if engine.supports(style) {
        engine.play(style);
    } else {
        engine.play(style.fallback());
    }
}

pub fn play_custom_impact(engine: &dyn HapticEngine, intensity: f64) {
    let clamped = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };
    engine.play_with_intensity(clamped as f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareOutcome {
    /// `false` when the user dismissed the sheet.
    pub completed: bool,
}

pub trait ShareSheet: Send + Sync {
    fn present(&self, text: String, done: Completion<Result<ShareOutcome, PlatformError>>);
}
