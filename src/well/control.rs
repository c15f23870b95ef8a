//! Well controls: the aggregate constraint a well operates under.
//!
//! Exactly one of a bottomhole pressure or a total rate is active at a
//! time. The schedule that picks the control for a time step lives outside
//! this crate; only the resulting value is consumed here.

use crate::well_error::WellError;
use std::fmt;
use std::str::FromStr;

/// The active control and its value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ControlMode {
    /// Imposed bottomhole pressure.
    BottomholePressure(f64),
    /// Imposed total volumetric rate, split among cells by productivity.
    TotalRate(f64),
}

impl ControlMode {
    pub fn kind(&self) -> ControlKind {
        match self {
            ControlMode::BottomholePressure(_) => ControlKind::BottomholePressure,
            ControlMode::TotalRate(_) => ControlKind::TotalRate,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            ControlMode::BottomholePressure(v) | ControlMode::TotalRate(v) => v,
        }
    }
}

/// Control kind without a value, as named in well schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlKind {
    BottomholePressure,
    TotalRate,
}

impl ControlKind {
    pub fn with_value(self, value: f64) -> ControlMode {
        match self {
            ControlKind::BottomholePressure => ControlMode::BottomholePressure(value),
            ControlKind::TotalRate => ControlMode::TotalRate(value),
        }
    }
}

impl FromStr for ControlKind {
    type Err = WellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pressure" | "bhp" | "bottomhole_pressure" | "bottomhole-pressure" => {
                Ok(ControlKind::BottomholePressure)
            }
            "rate" | "total_rate" | "total-rate" | "flow" => Ok(ControlKind::TotalRate),
            _ => Err(WellError::UnknownControl(s.to_string())),
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::BottomholePressure => f.write_str("bottomhole_pressure"),
            ControlKind::TotalRate => f.write_str("total_rate"),
        }
    }
}

/// Current control of a well, with an optional skin override.
///
/// When `skin` is `None` the trajectory's skin factor is used by the
/// productivity model.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WellControl {
    pub mode: ControlMode,
    #[serde(default)]
    pub skin: Option<f64>,
}

impl WellControl {
    pub fn bottomhole_pressure(value: f64) -> Self {
        Self {
            mode: ControlMode::BottomholePressure(value),
            skin: None,
        }
    }

    pub fn total_rate(value: f64) -> Self {
        Self {
            mode: ControlMode::TotalRate(value),
            skin: None,
        }
    }

    /// Build a control from a schedule's kind string.
    ///
    /// Unrecognized kinds are a configuration error.
    pub fn from_kind(kind: &str, value: f64, skin: Option<f64>) -> Result<Self, WellError> {
        Ok(Self {
            mode: kind.parse::<ControlKind>()?.with_value(value),
            skin,
        })
    }

    pub fn with_skin(mut self, skin: f64) -> Self {
        self.skin = Some(skin);
        self
    }

    /// Skin used by the productivity model.
    pub fn effective_skin(&self, trajectory_skin: f64) -> f64 {
        self.skin.unwrap_or(trajectory_skin)
    }
}

impl Default for WellControl {
    /// A shut-in well: zero total rate.
    fn default() -> Self {
        Self::total_rate(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        let c = WellControl::from_kind("BHP", 200.0, None).unwrap();
        assert_eq!(c.mode, ControlMode::BottomholePressure(200.0));
        let r = WellControl::from_kind("total-rate", -15.0, Some(2.0)).unwrap();
        assert_eq!(r.mode.kind(), ControlKind::TotalRate);
        assert_eq!(r.mode.value(), -15.0);
        assert_eq!(r.effective_skin(0.0), 2.0);
    }

    #[test]
    fn unknown_kind_is_fatal() {
        assert_eq!(
            WellControl::from_kind("choke", 1.0, None),
            Err(WellError::UnknownControl("choke".into()))
        );
    }

    #[test]
    fn default_is_shut_in_and_uses_trajectory_skin() {
        let c = WellControl::default();
        assert_eq!(c.mode, ControlMode::TotalRate(0.0));
        assert_eq!(c.effective_skin(-0.5), -0.5);
    }

    #[test]
    fn json_shape() {
        let c = WellControl::bottomhole_pressure(150.0).with_skin(1.0);
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(
            s,
            r#"{"mode":{"kind":"bottomhole_pressure","value":150.0},"skin":1.0}"#
        );
        let back: WellControl = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
        let unknown = serde_json::from_str::<WellControl>(r#"{"mode":{"kind":"choke","value":1.0}}"#);
        assert!(unknown.is_err());
    }
}
