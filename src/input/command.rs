//! Command catalogue and wire parsing.
//!
//! ## Wire Format
//!
//! ```json
//! { "kind": "declareTarget", "payload": { "target": 1 } }
//! ```
//!
//! Parsing is two-step: the `kind` string is looked up first (unknown kinds
//! are not an error, the scheduler drops them), then the payload is checked
//! against that kind's schema. Unknown payload fields are rejected.
//!
//! Every kind carries the set of phases it may be issued in; the scheduler
//! checks it before the command touches any state.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::cards::Affinity;
use crate::core::EntityId;
use crate::error::ValidationError;
use crate::phases::Phase;
use crate::state::SlotRef;

/// Command discriminant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CommandKind {
    PlayDestinyCard,
    SkipDestiny,
    PlayCard,
    CommitPlayCard,
    UseAbility,
    CommitAbility,
    SelectCardOnBoard,
    SelectMinionSlot,
    CommitSelection,
    ChooseCards,
    ChooseAffinity,
    CancelInteraction,
    Pass,
    DeclareAttacker,
    DeclareTarget,
    DeclareBlocker,
    CancelAttack,
    EndTurn,
    Surrender,
}

const LIVE_PHASES: &[Phase] = &[Phase::Draw, Phase::Destiny, Phase::Main, Phase::Attack, Phase::End];

impl CommandKind {
    /// Phases this kind may be issued in.
    #[must_use]
    pub fn allowed_phases(self) -> &'static [Phase] {
        match self {
            CommandKind::PlayDestinyCard | CommandKind::SkipDestiny => &[Phase::Destiny],
            CommandKind::PlayCard | CommandKind::Pass => &[Phase::Main, Phase::Attack],
            CommandKind::UseAbility | CommandKind::DeclareAttacker | CommandKind::EndTurn => &[Phase::Main],
            CommandKind::DeclareTarget | CommandKind::DeclareBlocker | CommandKind::CancelAttack => {
                &[Phase::Attack]
            }
            // Decision answers follow the pause wherever it was raised.
            CommandKind::CommitPlayCard
            | CommandKind::CommitAbility
            | CommandKind::SelectCardOnBoard
            | CommandKind::SelectMinionSlot
            | CommandKind::CommitSelection
            | CommandKind::ChooseCards
            | CommandKind::ChooseAffinity
            | CommandKind::CancelInteraction
            | CommandKind::Surrender => LIVE_PHASES,
        }
    }

    /// Check the phase gate.
    #[must_use]
    pub fn allowed_in(self, phase: Phase) -> bool {
        self.allowed_phases().contains(&phase)
    }
}

/// A validated command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase", deny_unknown_fields)]
pub enum Command {
    PlayDestinyCard { card: EntityId },
    SkipDestiny {},
    PlayCard { card: EntityId },
    CommitPlayCard {},
    UseAbility { unit: EntityId, ability: u8 },
    CommitAbility {},
    SelectCardOnBoard { entity: EntityId },
    SelectMinionSlot { slot: SlotRef },
    CommitSelection {},
    ChooseCards { cards: Vec<EntityId> },
    ChooseAffinity { affinity: Affinity },
    CancelInteraction {},
    Pass {},
    DeclareAttacker { unit: EntityId },
    DeclareTarget { target: EntityId },
    DeclareBlocker { blocker: Option<EntityId> },
    CancelAttack {},
    EndTurn {},
    Surrender {},
}

impl Command {
    /// The command's kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::PlayDestinyCard { .. } => CommandKind::PlayDestinyCard,
            Command::SkipDestiny {} => CommandKind::SkipDestiny,
            Command::PlayCard { .. } => CommandKind::PlayCard,
            Command::CommitPlayCard {} => CommandKind::CommitPlayCard,
            Command::UseAbility { .. } => CommandKind::UseAbility,
            Command::CommitAbility {} => CommandKind::CommitAbility,
            Command::SelectCardOnBoard { .. } => CommandKind::SelectCardOnBoard,
            Command::SelectMinionSlot { .. } => CommandKind::SelectMinionSlot,
            Command::CommitSelection {} => CommandKind::CommitSelection,
            Command::ChooseCards { .. } => CommandKind::ChooseCards,
            Command::ChooseAffinity { .. } => CommandKind::ChooseAffinity,
            Command::CancelInteraction {} => CommandKind::CancelInteraction,
            Command::Pass {} => CommandKind::Pass,
            Command::DeclareAttacker { .. } => CommandKind::DeclareAttacker,
            Command::DeclareTarget { .. } => CommandKind::DeclareTarget,
            Command::DeclareBlocker { .. } => CommandKind::DeclareBlocker,
            Command::CancelAttack {} => CommandKind::CancelAttack,
            Command::EndTurn {} => CommandKind::EndTurn,
            Command::Surrender {} => CommandKind::Surrender,
        }
    }

    /// Parse a raw wire command.
    ///
    /// Returns `Ok(None)` for unrecognised kinds.
    pub fn parse(raw: &RawCommand) -> Result<Option<Command>, ValidationError> {
        let Ok(kind) = raw.kind.parse::<CommandKind>() else {
            return Ok(None);
        };
        let payload = match &raw.payload {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        let document = serde_json::json!({ "kind": kind, "payload": payload });
        serde_json::from_value(document)
            .map(Some)
            .map_err(|e| ValidationError::Schema {
                kind,
                message: e.to_string(),
            })
    }
}

/// Command as received on the wire, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCommand {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl RawCommand {
    /// Create a raw command.
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Parse the `{ kind, payload }` envelope from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<&Command> for RawCommand {
    fn from(command: &Command) -> Self {
        let kind: &'static str = command.kind().into();
        let payload = serde_json::to_value(command)
            .ok()
            .and_then(|mut v| v.get_mut("payload").map(serde_json::Value::take))
            .unwrap_or(serde_json::Value::Null);
        Self::new(kind, payload)
    }
}
