//! Command intake and the flush loop.
//!
//! Every mutation of a running game starts here. A command is parsed,
//! queued, and executed by the flush loop against a checkpoint of the
//! board; the checkpoint is what makes rejected commands invisible.

use tracing::{debug, error, warn};

use super::{Checkpoint, Game};
use crate::core::PlayerId;
use crate::error::{ErrorReport, GameError, GameResult, InvariantError, ValidationError};
use crate::events::CommandEvent;
use crate::input::{Command, CommandKind, Job, LoggedCommand, QueuedCommand, RawCommand, ReproductionDump};
use crate::interaction::InteractionState;

/// What happened to a dispatched command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The queue drained; nothing is pending.
    Completed,

    /// The queue drained up to a decision.
    Suspended {
        state: InteractionState,
        owner: PlayerId,
    },

    /// Appended to the queue of a flush already in progress.
    Queued,

    /// Unknown command kind, ignored.
    Dropped,
}

impl Game {
    /// Parse and submit a wire command.
    ///
    /// Rejected commands are rolled back, never logged, and announced with a
    /// `Resync` event before the error is returned.
    pub fn dispatch(&mut self, issuer: PlayerId, raw: &RawCommand) -> GameResult<Dispatch> {
        if self.is_halted() {
            return Err(InvariantError::Halted.into());
        }
        match Command::parse(raw) {
            Ok(Some(command)) => self.submit(issuer, command),
            Ok(None) => {
                debug!(target: "tactics::scheduler", kind = %raw.kind, %issuer, "dropping unknown command");
                Ok(Dispatch::Dropped)
            }
            Err(err) => {
                let err = GameError::from(err);
                self.fail(&err, None, None);
                Err(err)
            }
        }
    }

    /// Submit an already typed command.
    pub fn submit(&mut self, issuer: PlayerId, command: Command) -> GameResult<Dispatch> {
        if self.is_halted() {
            return Err(InvariantError::Halted.into());
        }
        if self.scheduler.is_flushing() {
            self.scheduler.enqueue(issuer, command);
            return Ok(Dispatch::Queued);
        }
        if self.scheduler.is_paused() {
            // Queues are held while paused, so the answer runs directly.
            self.run_command(QueuedCommand { issuer, command })?;
            return self.flush();
        }
        self.scheduler.enqueue(issuer, command);
        self.flush()
    }

    /// Drain the queues, then snapshot.
    pub(crate) fn flush(&mut self) -> GameResult<Dispatch> {
        if !self.scheduler.begin_flush() {
            return Ok(Dispatch::Queued);
        }
        let result = self.drain();
        self.scheduler.end_flush();

        if !self.is_halted() {
            let sequence = self.next_snapshot_sequence();
            self.emit(CommandEvent::QueueFlushed { sequence });
            self.take_snapshot();
        }
        result?;

        Ok(match self.scheduler.pending() {
            Some((state, owner)) => Dispatch::Suspended { state, owner },
            None => Dispatch::Completed,
        })
    }

    /// Run jobs until the queues are empty or a decision is pending.
    ///
    /// A rejected command does not stop the loop: internal work queued by
    /// earlier commands still runs. The first rejection is returned.
    fn drain(&mut self) -> GameResult<()> {
        let mut rejected = None;
        while let Some(job) = self.scheduler.next_job() {
            let result = match job {
                Job::Internal(task) => match task(self) {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        let err = err.escalate();
                        self.fail(&err, None, None);
                        Err(err)
                    }
                },
                Job::External(queued) => self.run_command(queued),
            };
            if let Err(err) = result {
                if !err.is_recoverable() {
                    return Err(err);
                }
                rejected.get_or_insert(err);
            }
        }
        rejected.map_or(Ok(()), Err)
    }

    /// Execute one external command against a checkpoint.
    fn run_command(&mut self, queued: QueuedCommand) -> GameResult<()> {
        let QueuedCommand { issuer, command } = queued;
        let id = self.scheduler.next_command_id();
        let kind = command.kind();
        self.emit(CommandEvent::Started { id, issuer, kind });

        let checkpoint = self.checkpoint();
        match self.execute(issuer, &command) {
            Ok(()) => {
                self.log.push(LoggedCommand { id, issuer, command });
                self.emit(CommandEvent::Finished { id, kind });
                Ok(())
            }
            Err(err) => {
                let offending = LoggedCommand { id, issuer, command };
                self.fail(&err, Some(checkpoint), Some(offending));
                Err(err)
            }
        }
    }

    /// Gate and route a command.
    fn execute(&mut self, issuer: PlayerId, command: &Command) -> GameResult<()> {
        if self.is_over() {
            return Err(ValidationError::GameOver.into());
        }
        let kind = command.kind();
        let phase = self.phase();
        if !kind.allowed_in(phase) {
            return Err(ValidationError::PhaseNotAllowed { kind, phase }.into());
        }
        if let Some((awaiting, _)) = self.scheduler.pending() {
            if kind != CommandKind::Surrender && !awaiting.accepts(kind) {
                return Err(ValidationError::AwaitingDecision { awaiting, kind }.into());
            }
        }

        match command {
            Command::PlayDestinyCard { card } => self.play_destiny_card(issuer, *card),
            Command::SkipDestiny {} => self.skip_destiny(issuer),
            Command::PlayCard { card } => self.play_card(issuer, *card),
            Command::CommitPlayCard {} => self.commit_play_card(issuer),
            Command::UseAbility { unit, ability } => self.use_ability(issuer, *unit, *ability),
            Command::CommitAbility {} => self.commit_ability(issuer),
            Command::SelectCardOnBoard { entity } => self.select_card_on_board(issuer, *entity),
            Command::SelectMinionSlot { slot } => self.select_minion_slot(issuer, *slot),
            Command::CommitSelection {} => self.commit_selection(issuer),
            Command::ChooseCards { cards } => self.choose_cards(issuer, cards),
            Command::ChooseAffinity { affinity } => self.choose_affinity(issuer, *affinity),
            Command::CancelInteraction {} => self.cancel_interaction(issuer),
            Command::Pass {} => self.pass(issuer),
            Command::DeclareAttacker { unit } => self.declare_attacker(issuer, *unit),
            Command::DeclareTarget { target } => self.declare_target(issuer, *target),
            Command::DeclareBlocker { blocker } => self.declare_blocker(issuer, *blocker),
            Command::CancelAttack {} => self.cancel_attack(issuer),
            Command::EndTurn {} => self.request_end_turn(issuer),
            Command::Surrender {} => self.surrender(issuer),
        }
    }

    /// Handle a failed command or task.
    ///
    /// Recoverable errors roll back to `checkpoint` and resync. Anything else
    /// publishes a reproduction dump and halts the game.
    fn fail(&mut self, err: &GameError, checkpoint: Option<Checkpoint>, offending: Option<LoggedCommand>) {
        let report = ErrorReport::from(err);

        if err.is_recoverable() {
            if let Some(checkpoint) = checkpoint {
                self.restore(checkpoint);
            }
            self.scheduler.clear_external();
            warn!(
                target: "tactics::scheduler",
                code = report.code.as_str(),
                command = ?offending.as_ref().map(|c| c.command.kind()),
                "command rejected: {}",
                report.message
            );
            // Inside a flush the closing snapshot carries the same sequence.
            let sequence = self.next_snapshot_sequence();
            self.emit(CommandEvent::Resync {
                error: report,
                sequence,
            });
            if !self.scheduler.is_flushing() {
                self.take_snapshot();
            }
            return;
        }

        let mut commands = self.log.entries().to_vec();
        commands.extend(offending);
        let dump = ReproductionDump {
            config: self.config.clone(),
            commands,
            error: report,
        };
        match dump.to_json() {
            Ok(json) => error!(target: "tactics::scheduler", dump = %json, "fatal: {err}"),
            Err(encode) => error!(target: "tactics::scheduler", %encode, "fatal: {err} (dump unavailable)"),
        }
        self.emit(CommandEvent::Fatal { dump });
        self.scheduler.halt();
    }
}
