//! Static technical risk registry and mitigation catalog used in the
//! risk identification and mitigation steps.

use crate::ValidationError;
use serde::Serialize;
use tracing::debug;

/// A technical risk of the steering architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Risk {
    pub id: &'static str,
    pub title: &'static str,
}

/// A mitigation that can be added to the mitigation registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Mitigation {
    pub id: &'static str,
    pub title: &'static str,
}

macro_rules! entries {
    ($ty:ident; $($id:literal => $title:literal),+ $(,)?) => {
        [$($ty { id: $id, title: $title }),+]
    };
}

pub static RISKS: [Risk; 31] = entries![Risk;
    "R01" => "Wheel front axle failure",
    "R02" => "Hub front axle failure",
    "R03" => "Steering knuckle front axle failure",
    "R04" => "Knuckle arm front axle failure",
    "R05" => "Frame front axle failure",
    "R06" => "Tie rod front axle failure",
    "R07" => "Angle sensor front axle failure",
    "R08" => "Speedometer failure",
    "R09" => "ECU failure",
    "R10" => "Engine failure",
    "R11" => "Hydraulic oil reservoir failure",
    "R12" => "Steering actuation cylinder front axle failure",
    "R13" => "Servo valve front axle failure",
    "R14" => "Pump front axle failure",
    "R15" => "Filter front axle failure",
    "R16" => "Cooler front axle failure",
    "R17" => "Steering actuation cylinder second axle failure",
    "R18" => "Servo valve second axle failure",
    "R19" => "Pump second axle failure",
    "R20" => "Filter second axle failure",
    "R21" => "Cooler second axle failure",
    "R22" => "Wheel second axle failure",
    "R23" => "Hub second axle failure",
    "R24" => "Steering knuckle second axle failure",
    "R25" => "Knuckle arm second axle failure",
    "R26" => "Frame second axle failure",
    "R27" => "Tie rod second axle failure",
    "R28" => "Angle sensor second axle failure",
    "R29" => "Electric steering motor front axle failure",
    "R30" => "Electric steering motor second axle failure",
    "R31" => "Battery Box failure",
];

pub static MITIGATIONS: [Mitigation; 25] = entries![Mitigation;
    "M01" => "EMI Filter",
    "M02" => "Cable shielding",
    "M03" => "Heat-resistant bearing",
    "M04" => "Regular inspection of hub alignment and torque values",
    "M05" => "Regular lubrication of moving parts",
    "M06" => "Temperature sensors or thermal monitoring devices",
    "M07" => "Heat sinks",
    "M08" => "Hydraulic reservoir shutdown mechanism",
    "M09" => "Cable shielding",
    "M10" => "EMI Filter",
    "M11" => "Optical isolators",
    "M12" => "EMI shielded housing",
    "M13" => "Redundant angle sensor",
    "M14" => "Load sensors",
    "M15" => "Motor Force Control and Feedback System",
    "M16" => "Load cells",
    "M17" => "Load cells",
    "M18" => "Load cells",
    "M19" => "Ventilation mechanism",
    "M20" => "Dampening mechanism",
    "M21" => "Elastomeric mount",
    "M22" => "Electromagnetic Shielding",
    "M23" => "Electric motor housing with conductive materials",
    "M24" => "Heat-resistant material",
    "M25" => "Ventilation system",
];

impl Risk {
    /// Label as shown in selection lists, e.g. "R09 - ECU failure".
    pub fn label(&self) -> String {
        format!("{} - {}", self.id, self.title)
    }
}

impl Mitigation {
    /// Label as shown in selection lists, e.g. "M01 - EMI Filter".
    pub fn label(&self) -> String {
        format!("{} - {}", self.id, self.title)
    }
}

/// Accepts either a bare id ("M01") or a full label ("M01 - EMI Filter").
fn key(selection: &str) -> &str {
    selection
        .split_once(" - ")
        .map_or(selection, |(id, _)| id)
        .trim()
}

/// Look up a risk by id or label.
pub fn risk(selection: &str) -> Result<&'static Risk, ValidationError> {
    let id = key(selection);
    RISKS
        .iter()
        .find(|r| r.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| ValidationError::UnknownRisk(selection.to_string()))
}

/// Look up a mitigation by id or label.
pub fn mitigation(selection: &str) -> Result<&'static Mitigation, ValidationError> {
    let id = key(selection);
    MITIGATIONS
        .iter()
        .find(|m| m.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| ValidationError::UnknownMitigation(selection.to_string()))
}

/// Resolve a multi-selection of mitigations.
///
/// Unknown entries reject the whole selection. Duplicates are dropped, the
/// first occurrence keeps its position.
pub fn select_mitigations<S: AsRef<str>>(
    selection: &[S],
) -> Result<Vec<&'static Mitigation>, ValidationError> {
    let mut picked: Vec<&'static Mitigation> = Vec::with_capacity(selection.len());
    for s in selection {
        let m = mitigation(s.as_ref())?;
        if !picked.iter().any(|p| p.id == m.id) {
            picked.push(m);
        }
    }
    debug!(count = picked.len(), "mitigations selected");
    Ok(picked)
}
