//! Topic-based event bus.
//!
//! One typed channel per category plus the aggregated `any` channel.
//! Subscribers are plain callbacks invoked synchronously, in subscription
//! order, while the game is mid-command. They only see the event; they cannot
//! reach back into the game.

use super::event::{
    BoardEvent, ChainEvent, CombatEvent, CommandEvent, GameEvent, InteractionEvent, PhaseEvent,
};

/// Callback registered on a channel.
pub type Subscriber<E> = Box<dyn FnMut(&E)>;

/// A single typed channel.
pub struct Channel<E> {
    subscribers: Vec<Subscriber<E>>,
}

impl<E> Channel<E> {
    fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register a callback.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&E) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self, event: &E) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}

impl<E> std::fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Event bus owned by the game.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use tactics_core::core::PlayerId;
/// use tactics_core::events::{BoardEvent, EventBus};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// let mut bus = EventBus::new();
/// bus.board.subscribe(move |e: &BoardEvent| sink.borrow_mut().push(e.clone()));
/// bus.publish(BoardEvent::CardDrawn { player: PlayerId::new(0) });
///
/// assert_eq!(seen.borrow().len(), 1);
/// assert_eq!(bus.buffered().len(), 1);
/// ```
#[derive(Debug)]
pub struct EventBus {
    pub command: Channel<CommandEvent>,
    pub phase: Channel<PhaseEvent>,
    pub combat: Channel<CombatEvent>,
    pub interaction: Channel<InteractionEvent>,
    pub chain: Channel<ChainEvent>,
    pub board: Channel<BoardEvent>,
    /// Every event, after its category channel.
    pub any: Channel<GameEvent>,

    /// Events since the last snapshot.
    buffer: Vec<GameEvent>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            command: Channel::new(),
            phase: Channel::new(),
            combat: Channel::new(),
            interaction: Channel::new(),
            chain: Channel::new(),
            board: Channel::new(),
            any: Channel::new(),
            buffer: Vec::new(),
        }
    }

    /// Publish an event to its category channel and the `any` channel.
    pub fn publish(&mut self, event: impl Into<GameEvent>) {
        let event = event.into();
        match &event {
            GameEvent::Command(e) => self.command.publish(e),
            GameEvent::Phase(e) => self.phase.publish(e),
            GameEvent::Combat(e) => self.combat.publish(e),
            GameEvent::Interaction(e) => self.interaction.publish(e),
            GameEvent::Chain(e) => self.chain.publish(e),
            GameEvent::Board(e) => self.board.publish(e),
        }
        self.any.publish(&event);
        self.buffer.push(event);
    }

    /// Events buffered since the last drain.
    #[must_use]
    pub fn buffered(&self) -> &[GameEvent] {
        &self.buffer
    }

    /// Forget buffered events past `len`. Subscribers have already seen
    /// them.
    pub fn rewind(&mut self, len: usize) {
        self.buffer.truncate(len);
    }

    /// Take the buffered events.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.buffer)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
