use std::fmt;

use serde::Serialize;

use super::messages::RawMessage;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlType {
    Button,
    Fader,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlSubtype {
    On,
    OnOff,
    Special,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    Trigger,
    Repeat,
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlType::Button => "BUTTON",
            ControlType::Fader => "FADER",
        })
    }
}

impl fmt::Display for ControlSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlSubtype::On => "ON",
            ControlSubtype::OnOff => "ON_OFF",
            ControlSubtype::Special => "SPECIAL",
        })
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlMode::Trigger => "TRIGGER",
            ControlMode::Repeat => "REPEAT",
        })
    }
}

/// Taxonomy decision for one trained control.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlClassification {
    pub control_type: ControlType,
    pub subtype: Option<ControlSubtype>,
    pub mode: ControlMode,
}

/// Decide the control shape from the distinct messages of one training burst.
///
/// The distinct-tuple count is the signal: buttons emit one or two distinct
/// messages (down, and optionally up), faders and rotaries emit many distinct
/// value messages under a single status + identifier, and anything else is
/// flagged SPECIAL for manual handling rather than misclassified.
pub fn classify(distinct: &[RawMessage], original_count: usize) -> ControlClassification {
    // more raw messages than distinct ones means the control repeated itself
    let duplicates = original_count > distinct.len();

    match distinct.len() {
        1 => ControlClassification {
            control_type: ControlType::Button,
            subtype: Some(ControlSubtype::On),
            mode: mode_for(duplicates),
        },
        2 => ControlClassification {
            control_type: ControlType::Button,
            subtype: Some(ControlSubtype::OnOff),
            mode: mode_for(duplicates),
        },
        _ => {
            // more than 2 distinct messages: either a fader/rotary, or
            // something else special
            let mut statuses: Vec<u8> = Vec::new();
            let mut idents: Vec<u8> = Vec::new();
            for msg in distinct {
                if !statuses.contains(&msg.status()) {
                    statuses.push(msg.status());
                }
                if !idents.contains(&msg.ident()) {
                    idents.push(msg.ident());
                }
            }
            // fader/rotary: same status + identifier, only the value varies
            if statuses.len() == 1 && idents.len() == 1 {
                ControlClassification {
                    control_type: ControlType::Fader,
                    subtype: None,
                    mode: ControlMode::Trigger,
                }
            } else {
                ControlClassification {
                    control_type: ControlType::Button,
                    subtype: Some(ControlSubtype::Special),
                    mode: ControlMode::Repeat,
                }
            }
        }
    }
}

/// Reduced two-way split kept for hosts that only care whether a control is
/// button-like or continuous.
pub fn classify_coarse(distinct: &[RawMessage]) -> ControlClassification {
    let control_type = if distinct.len() <= 2 {
        ControlType::Button
    } else {
        ControlType::Fader
    };
    ControlClassification {
        control_type,
        subtype: None,
        mode: ControlMode::Trigger,
    }
}

fn mode_for(duplicates: bool) -> ControlMode {
    if duplicates {
        ControlMode::Repeat
    } else {
        ControlMode::Trigger
    }
}
