//! Anthropometric parameters, in millimeters and degrees.

use insole_kernel::mm_to_m;
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, ParamRangeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArchType {
    Flat,
    #[default]
    Normal,
    High,
}

/// How strongly the arch is supported. Unknown names read as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum SupportLevel {
    Low,
    #[default]
    Medium,
    High,
    ExtraHigh,
}

impl SupportLevel {
    pub fn from_name(name: &str) -> Self {
        match name {
            "low" => SupportLevel::Low,
            "high" => SupportLevel::High,
            "extraHigh" => SupportLevel::ExtraHigh,
            _ => SupportLevel::Medium,
        }
    }

    /// Multiplier applied to the arch height by the support deformation,
    /// the arch tube and the support grid.
    pub fn strength(self) -> f64 {
        match self {
            SupportLevel::Low => 0.6,
            SupportLevel::Medium => 1.0,
            SupportLevel::High => 1.4,
            SupportLevel::ExtraHigh => 1.8,
        }
    }
}

impl From<String> for SupportLevel {
    fn from(name: String) -> Self {
        SupportLevel::from_name(&name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnthropometricParams {
    pub foot_length: f64,
    pub foot_width: f64,
    pub arch_height: f64,
    pub heel_width: f64,
    pub arch_type: ArchType,
    pub arch_support_level: SupportLevel,
    pub base_thickness: f64,
    pub support_thickness: f64,
    pub cushion_thickness: f64,
    pub heel_cup_height: f64,
    pub metatarsal_pad_height: f64,
    /// Degrees; zero leaves the wedge out.
    pub heel_wedge_angle: f64,
}

impl Default for AnthropometricParams {
    fn default() -> Self {
        Self {
            foot_length: 250.0,
            foot_width: 100.0,
            arch_height: 25.0,
            heel_width: 70.0,
            arch_type: ArchType::Normal,
            arch_support_level: SupportLevel::Medium,
            base_thickness: 5.0,
            support_thickness: 1.0,
            cushion_thickness: 3.0,
            heel_cup_height: 10.0,
            metatarsal_pad_height: 3.0,
            heel_wedge_angle: 0.0,
        }
    }
}

impl AnthropometricParams {
    pub fn from_json_str(json: &str) -> Result<Self, DesignError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every field. Lengths must be finite and non-negative; the wedge
    /// angle only has to be finite.
    pub fn validate(&self) -> Result<(), ParamRangeError> {
        let lengths = [
            ("footLength", self.foot_length),
            ("footWidth", self.foot_width),
            ("archHeight", self.arch_height),
            ("heelWidth", self.heel_width),
            ("baseThickness", self.base_thickness),
            ("supportThickness", self.support_thickness),
            ("cushionThickness", self.cushion_thickness),
            ("heelCupHeight", self.heel_cup_height),
            ("metatarsalPadHeight", self.metatarsal_pad_height),
        ];
        for (field, value) in lengths {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParamRangeError { field, value });
            }
        }

        if !self.heel_wedge_angle.is_finite() {
            return Err(ParamRangeError {
                field: "heelWedgeAngle",
                value: self.heel_wedge_angle,
            });
        }
        Ok(())
    }

    /// Scale the outline dimensions by `percent`, rounded to whole millimeters.
    #[must_use]
    pub fn scaled_by_percent(&self, percent: f64) -> Self {
        let factor = percent / 100.0;
        Self {
            foot_length: (self.foot_length * factor).round(),
            foot_width: (self.foot_width * factor).round(),
            heel_width: (self.heel_width * factor).round(),
            ..self.clone()
        }
    }

    pub fn strength(&self) -> f64 {
        self.arch_support_level.strength()
    }

    /// Total height of the three layers, in meters.
    pub fn stack_height(&self) -> f64 {
        mm_to_m(self.base_thickness + self.support_thickness + self.cushion_thickness)
    }

    /// Outline dimensions in meters: `(length, width, heel width)`.
    pub fn outline_m(&self) -> (f64, f64, f64) {
        (
            mm_to_m(self.foot_length),
            mm_to_m(self.foot_width),
            mm_to_m(self.heel_width),
        )
    }
}
