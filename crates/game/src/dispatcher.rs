//! # Command Dispatcher
//!
//! Routes each [`Command`] to the handler registered for its [`Action`].
//!
//! # Architecture
//!
//! The dispatch table maps actions to plain handler functions. Handlers
//! receive the shared [`World`] and the command, and return an [`Outcome`].
//! Dispatch is split in two steps so the connection can register a new
//! player's listeners between running the handler and publishing its events:
//!
//! 1. [`Dispatcher::execute`] runs the handler
//! 2. [`Dispatcher::publish`] hands the outcome's events to the event manager
//!
//! [`Dispatcher::dispatch`] does both.
//!
//! # Thread Safety
//!
//! The table is immutable once built and may be shared by every connection
//! task. Handlers synchronise through the world's own locks.

use crate::handlers::{self, CommandHandler, Outcome, Publication};
use crate::world::World;
use gridhunt_protocol::{Action, Command, CommandResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Action to handler routing table
pub struct Dispatcher {
    world: Arc<World>,

    /// Map from action to handler function
    handlers: HashMap<Action, CommandHandler>,
}

impl Dispatcher {
    /// Create a dispatcher with the standard handler for every routable action
    pub fn new(world: Arc<World>) -> Self {
        let mut dispatcher = Self::empty(world);
        dispatcher.register(Action::Login, handlers::login);
        dispatcher.register(Action::Map, handlers::map);
        dispatcher.register(Action::Move, handlers::move_player);
        dispatcher.register(Action::Message, handlers::message);
        dispatcher.register(Action::Players, handlers::players);
        dispatcher.register(Action::Quit, handlers::quit);
        dispatcher
    }

    /// Create a dispatcher with no handlers registered
    #[inline]
    pub fn empty(world: Arc<World>) -> Self {
        Self {
            world,
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) the handler for `action`
    pub fn register(&mut self, action: Action, handler: CommandHandler) {
        tracing::debug!("Registered handler for action: {}", action);
        self.handlers.insert(action, handler);
    }

    /// Check if a handler is registered for an action
    pub fn has_handler(&self, action: Action) -> bool {
        self.handlers.contains_key(&action)
    }

    /// Get the number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Run the handler for `cmd` without publishing anything
    ///
    /// Commands with no registered handler go to a fallback that reports
    /// `log in first`, `unknown command` or an internal error, in that order.
    pub fn execute(&self, cmd: &Command) -> Outcome {
        let handler = self
            .handlers
            .get(&cmd.action)
            .copied()
            .unwrap_or(handlers::unroutable as CommandHandler);

        let outcome = handler(&self.world, cmd);
        tracing::trace!(
            "{} from {:?} -> {}:{}",
            cmd.action,
            cmd.player,
            outcome.result.code,
            outcome.result.message
        );
        outcome
    }

    /// Deliver publications in order
    pub fn publish(&self, publications: Vec<Publication>) {
        for publication in publications {
            self.world.publish(publication);
        }
    }

    /// Execute `cmd` and publish its events
    pub fn dispatch(&self, cmd: &Command) -> CommandResult {
        let outcome = self.execute(cmd);
        self.publish(outcome.publications);
        outcome.result
    }
}
