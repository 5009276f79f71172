//! # Command Handlers
//!
//! One handler per [`Action`]. Each handler validates the command, mutates
//! the shared world only once validation has passed, and returns an
//! [`Outcome`]: the result for the sender plus the events to publish.
//!
//! Handlers never publish themselves. The dispatcher publishes after the
//! handler returns, which lets the connection subscribe a freshly logged-in
//! player in between.

use crate::event::Event;
use crate::player::Player;
use crate::validation::{
    has_arg_count, has_min_arg_count, has_no_player, has_valid_action, has_valid_direction,
    has_valid_name, has_valid_player, is_expected_action, validate, CommandError,
};
use crate::world::World;
use gridhunt_core::{Direction, PlayerName, Position};
use gridhunt_levels::REVEAL_RADIUS;
use gridhunt_protocol::{Action, Command, CommandResult};
use std::sync::Arc;

/// Handler entry in the dispatch table
pub type CommandHandler = fn(&World, &Command) -> Outcome;

/// Where an event should go
#[derive(Debug, Clone)]
pub enum Publication {
    /// Every listener of the event's subject
    Broadcast(Event),

    /// Only the named player's listener
    To(PlayerName, Event),
}

/// What a handler produced
#[derive(Debug)]
pub struct Outcome {
    pub result: CommandResult,
    pub publications: Vec<Publication>,
}

impl Outcome {
    pub fn reply(result: CommandResult) -> Self {
        Self {
            result,
            publications: Vec::new(),
        }
    }

    pub fn rejected(cmd: &Command, error: CommandError) -> Self {
        tracing::debug!("Rejected {} from {:?}: {}", cmd.action, cmd.player, error);
        Self::reply(error.into_result(cmd.player.clone()))
    }

    fn broadcast(mut self, event: Event) -> Self {
        self.publications.push(Publication::Broadcast(event));
        self
    }

    fn send_to(mut self, owner: &PlayerName, event: Event) -> Self {
        self.publications.push(Publication::To(owner.clone(), event));
        self
    }
}

/// Run `body` and fold a rejection into the outcome
fn guarded(cmd: &Command, body: impl FnOnce() -> Result<Outcome, CommandError>) -> Outcome {
    body().unwrap_or_else(|error| Outcome::rejected(cmd, error))
}

/// Look up the sender, who passed `has_valid_player`
fn sender(world: &World, cmd: &Command) -> Result<(PlayerName, Arc<Player>), CommandError> {
    let name = cmd
        .player
        .clone()
        .ok_or_else(|| CommandError::State("log in first".into()))?;
    let player = world
        .players
        .get_player(&name)
        .ok_or_else(|| CommandError::State("log in first".into()))?;
    Ok((name, player))
}

/// `login <name>`
///
/// Restores the player's saved position and score when the saved position
/// is still walkable; otherwise the player starts at the spawn point.
pub fn login(world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(
            cmd,
            Action::Login,
            &[
                &has_valid_action,
                &is_expected_action,
                &has_no_player,
                &has_arg_count(1),
                &has_valid_name,
            ],
        )?;

        let name = PlayerName::from(cmd.args[0].as_str());
        if world.players.contains(&name) {
            return Err(CommandError::State("name in use".into()));
        }

        let saved = match world.store.load(&name) {
            Ok(saved) => saved.filter(|record| world.map.is_valid_position(record.position)),
            Err(e) => {
                tracing::warn!("Could not load saved data for {}: {}", name, e);
                None
            }
        };
        let (position, score) = match saved {
            Some(record) => (record.position, record.score),
            None => {
                let spawn = world
                    .map
                    .spawn_point()
                    .map_err(|e| CommandError::Internal(format!("no spawn point: {}", e)))?;
                (spawn, 0)
            }
        };

        let player = Arc::new(Player::new(name.clone(), position, score));
        world
            .players
            .try_add_player(player.clone())
            .map_err(|_| CommandError::State("name in use".into()))?;

        tracing::info!("{} logged in at ({})", name, position);

        let mut outcome = Outcome::reply(CommandResult::success(
            Some(name.clone()),
            format!("welcome {}", name),
        ))
        .broadcast(Event::PlayerConnected(player.snapshot()));

        for other in world.players.snapshots() {
            if other.name != name {
                outcome = outcome.send_to(&name, Event::PlayerUpdate(other));
            }
        }
        Ok(outcome)
    })
}

/// `map`
pub fn map(world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(
            cmd,
            Action::Map,
            &[&has_valid_player, &has_valid_action, &is_expected_action, &has_arg_count(0)],
        )?;
        let (name, _) = sender(world, cmd)?;

        let result = CommandResult::success(
            Some(name.clone()),
            format!("{}x{} spaces", world.map.rows(), world.map.cols()),
        );
        Ok(Outcome::reply(result).send_to(&name, Event::MapData(world.map.clone())))
    })
}

/// `move <north|south|east|west>`
///
/// Stepping onto an item collects it: the value is added to the score and
/// the item leaves the map. Items next to the new position are revealed to
/// the mover.
pub fn move_player(world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(
            cmd,
            Action::Move,
            &[
                &has_valid_player,
                &has_valid_action,
                &is_expected_action,
                &has_arg_count(1),
                &has_valid_direction,
            ],
        )?;
        let (name, player) = sender(world, cmd)?;
        let direction = Direction::parse(&cmd.args[0])
            .ok_or_else(|| CommandError::Validation("unknown direction".into()))?;

        let target: Position = player.position().step(direction);
        if !world.map.is_valid_position(target) {
            return Err(CommandError::Validation("cannot move".into()));
        }

        player.set_position(target);
        let mut outcome = Outcome::reply(CommandResult::success(Some(name.clone()), String::new()));

        if let Some(item) = world.map.take_item_at(target) {
            player.add_score(u64::from(item.value));
            tracing::debug!("{} collected item {} worth {}", name, item.id, item.value);
            outcome = outcome.broadcast(Event::ItemCollected {
                player: player.snapshot(),
                item,
            });
        }

        let snapshot = player.snapshot();
        outcome.result.message = format!("{}, {}, {}", name, snapshot.position, snapshot.score);
        outcome = outcome.broadcast(Event::PlayerUpdate(snapshot));

        for item in world.map.items_near(target, REVEAL_RADIUS) {
            outcome = outcome.send_to(&name, Event::ItemData(item));
        }
        Ok(outcome)
    })
}

/// `message <token>...`
pub fn message(world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(
            cmd,
            Action::Message,
            &[&has_valid_player, &has_valid_action, &is_expected_action, &has_min_arg_count(1)],
        )?;
        let (name, _) = sender(world, cmd)?;

        let body: String = cmd.args.iter().map(|token| format!(" {}", token)).collect();
        let text = format!("[{}] {}", name, body);

        Ok(Outcome::reply(CommandResult::success(Some(name), "message sent"))
            .broadcast(Event::SendMessage(text)))
    })
}

/// `players`
pub fn players(world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(
            cmd,
            Action::Players,
            &[&has_valid_player, &has_valid_action, &is_expected_action, &has_arg_count(0)],
        )?;

        Ok(Outcome::reply(CommandResult::success(
            cmd.player.clone(),
            format!("{} players in the game", world.players.player_count()),
        )))
    })
}

/// `quit`
///
/// Saves everyone, removes the sender from the registry and their
/// subscriptions, then announces the departure to everyone else.
pub fn quit(world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(
            cmd,
            Action::Quit,
            &[&has_valid_player, &has_valid_action, &is_expected_action, &has_arg_count(0)],
        )?;
        let (name, _) = sender(world, cmd)?;

        let outcome = Outcome::reply(CommandResult::success(
            Some(name.clone()),
            format!("farewell {}", name),
        ));
        Ok(match world.depart(&name) {
            Some(player) => outcome.broadcast(World::departure_event(&player)),
            None => outcome,
        })
    })
}

/// Fallback for actions with no registered handler
pub fn unroutable(_world: &World, cmd: &Command) -> Outcome {
    guarded(cmd, || {
        validate(cmd, cmd.action, &[&has_valid_player, &has_valid_action])?;
        Err(CommandError::Internal(format!("no handler registered for {}", cmd.action)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Subject;
    use crate::testing::RecordingListener;
    use gridhunt_core::ItemId;
    use gridhunt_levels::GameMap;
    use gridhunt_protocol::ResultCode;
    use gridhunt_storage::{MemoryPlayerStore, PlayerRecord, PlayerStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world(layout: &str) -> World {
        let map = GameMap::parse_with_rng(layout, &mut StdRng::seed_from_u64(1)).unwrap();
        World::new(Arc::new(map), Arc::new(MemoryPlayerStore::new()))
    }

    fn run(world: &World, handler: CommandHandler, line: &str, player: Option<&str>) -> Outcome {
        let outcome = handler(world, &Command::parse(line, player.map(PlayerName::from)));
        for publication in outcome.publications.clone() {
            world.publish(publication);
        }
        outcome
    }

    fn listen(world: &World, name: &str, subject: Subject) -> Arc<RecordingListener> {
        let listener = Arc::new(RecordingListener::default());
        world
            .events
            .subscribe(subject, PlayerName::from(name), listener.clone());
        listener
    }

    fn position_of(world: &World, name: &str) -> Position {
        world.players.get_player(&PlayerName::from(name)).unwrap().position()
    }

    // The single item keeps the room from being seeded with random ones
    const OPEN: &str = "#####\n#1..#\n#.S.#\n#...#\n#####";

    #[test]
    fn test_login_spawns_player() {
        let world = world("###\n#S#\n###");
        let outcome = run(&world, login, "login Ann", None);

        assert!(outcome.result.is_success());
        assert_eq!(outcome.result.player, Some(PlayerName::from("Ann")));
        assert_eq!(position_of(&world, "Ann"), Position::new(1, 1));
        assert!(matches!(
            outcome.publications.as_slice(),
            [Publication::Broadcast(Event::PlayerConnected(_))]
        ));
    }

    #[test]
    fn test_login_duplicate_name() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);

        let outcome = run(&world, login, "login aNN", None);
        assert_eq!(outcome.result.code, ResultCode::BadRequest);
        assert_eq!(outcome.result.message, "name in use");
        assert!(outcome.publications.is_empty());
        assert_eq!(world.players.player_count(), 1);
    }

    #[test]
    fn test_login_twice_on_same_connection() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);

        let outcome = run(&world, login, "login Bob", Some("Ann"));
        assert_eq!(outcome.result.message, "already logged in");
        assert_eq!(world.players.player_count(), 1);
    }

    #[test]
    fn test_login_arity_and_name() {
        let world = world(OPEN);
        assert_eq!(run(&world, login, "login", None).result.code, ResultCode::BadRequest);
        assert_eq!(run(&world, login, "login a b", None).result.code, ResultCode::BadRequest);
        assert_eq!(run(&world, login, "login a,b", None).result.message, "invalid name");
        assert_eq!(world.players.player_count(), 0);
    }

    #[test]
    fn test_login_restores_saved_state() {
        let world = world(OPEN);
        world
            .store
            .store(&[PlayerRecord::new(PlayerName::from("Ann"), Position::new(3, 3), 55)])
            .unwrap();

        run(&world, login, "login ann", None);
        let player = world.players.get_player(&PlayerName::from("Ann")).unwrap();
        assert_eq!(player.position(), Position::new(3, 3));
        assert_eq!(player.score(), 55);
    }

    #[test]
    fn test_login_ignores_unwalkable_saved_position() {
        let world = world(OPEN);
        world
            .store
            .store(&[PlayerRecord::new(PlayerName::from("Ann"), Position::new(0, 0), 55)])
            .unwrap();

        run(&world, login, "login Ann", None);
        let player = world.players.get_player(&PlayerName::from("Ann")).unwrap();
        assert_eq!(player.position(), Position::new(2, 2));
        assert_eq!(player.score(), 0);
    }

    #[test]
    fn test_login_tells_newcomer_about_others() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let outcome = run(&world, login, "login Bob", None);

        let targeted: Vec<_> = outcome
            .publications
            .iter()
            .filter_map(|p| match p {
                Publication::To(owner, Event::PlayerUpdate(other)) => Some((owner.clone(), other.name.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(targeted, vec![(PlayerName::from("Bob"), PlayerName::from("Ann"))]);
    }

    #[test]
    fn test_commands_require_login() {
        let world = world(OPEN);
        let cases: [(CommandHandler, &str); 5] = [
            (map, "map"),
            (move_player, "move north"),
            (message, "message hi"),
            (players, "players"),
            (quit, "quit"),
        ];
        for (handler, line) in cases {
            let outcome = run(&world, handler, line, None);
            assert_eq!(outcome.result.code, ResultCode::BadRequest);
            assert_eq!(outcome.result.message, "log in first");
        }
    }

    #[test]
    fn test_walled_in_player_cannot_move() {
        let world = world("###\n#S#\n###");
        run(&world, login, "login Ann", None);

        for direction in ["north", "south", "east", "west"] {
            let outcome = run(&world, move_player, &format!("move {}", direction), Some("Ann"));
            assert_eq!(outcome.result.code, ResultCode::BadRequest);
            assert_eq!(outcome.result.message, "cannot move");
            assert!(outcome.publications.is_empty());
            assert_eq!(position_of(&world, "Ann"), Position::new(1, 1));
        }
    }

    #[test]
    fn test_move_offsets() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let start = Position::new(2, 2);

        for direction in Direction::ALL {
            let outcome = run(&world, move_player, &format!("move {}", direction.as_str()), Some("Ann"));
            assert!(outcome.result.is_success());
            assert_eq!(position_of(&world, "Ann"), start.step(direction));

            let back = match direction {
                Direction::North => "south",
                Direction::South => "north",
                Direction::East => "west",
                Direction::West => "east",
            };
            run(&world, move_player, &format!("move {}", back), Some("Ann"));
            assert_eq!(position_of(&world, "Ann"), start);
        }
    }

    #[test]
    fn test_move_out_of_bounds() {
        let world = world("S..");
        run(&world, login, "login Ann", None);
        let outcome = run(&world, move_player, "move west", Some("Ann"));
        assert_eq!(outcome.result.message, "cannot move");
        assert_eq!(position_of(&world, "Ann"), Position::new(0, 0));
    }

    #[test]
    fn test_move_bad_arguments() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        assert_eq!(
            run(&world, move_player, "move up", Some("Ann")).result.message,
            "unknown direction"
        );
        assert_eq!(
            run(&world, move_player, "move", Some("Ann")).result.message,
            "expected 1 argument(s)"
        );
    }

    #[test]
    fn test_move_result_line() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let outcome = run(&world, move_player, "move east", Some("Ann"));
        assert_eq!(outcome.result.to_response().to_line(), "200:Ann, 3, 2, 0");
    }

    #[test]
    fn test_move_collects_item() {
        // Item 1 (value 40) sits east of the spawn
        let world = world("#####\n#.S4#\n#####");
        run(&world, login, "login Ann", None);
        let collected = listen(&world, "Ann", Subject::ItemCollected);
        let updates = listen(&world, "Ann", Subject::PlayerUpdate);

        let outcome = run(&world, move_player, "move east", Some("Ann"));
        assert_eq!(outcome.result.message, "Ann, 3, 1, 40");

        let events = collected.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::ItemCollected { player, item } => {
                assert_eq!(item.id, ItemId::new(1));
                assert_eq!(item.value, 40);
                assert_eq!(player.score, 40);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(updates.len(), 1);

        // The item is gone: walking off and back scores nothing
        run(&world, move_player, "move west", Some("Ann"));
        let outcome = run(&world, move_player, "move east", Some("Ann"));
        assert_eq!(outcome.result.message, "Ann, 3, 1, 40");
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn test_move_reveals_neighbouring_items() {
        let world = world("1....\n..S..\n....2");
        run(&world, login, "login Ann", None);
        let revealed = listen(&world, "Ann", Subject::ItemData);
        let other = listen(&world, "Bob", Subject::ItemData);

        run(&world, move_player, "move west", Some("Ann"));
        let events = revealed.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::ItemData(item) if item.value == 10));
        assert_eq!(other.len(), 0);
    }

    #[test]
    fn test_message_format() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let ann = listen(&world, "Ann", Subject::SendMessage);
        let bob = listen(&world, "Bob", Subject::SendMessage);

        let outcome = run(&world, message, "message hello world", Some("Ann"));
        assert_eq!(outcome.result.message, "message sent");

        for listener in [&ann, &bob] {
            let events = listener.events();
            assert_eq!(events.len(), 1);
            assert_eq!(
                events[0].to_responses()[0].to_line(),
                "100:[Ann]  hello world"
            );
        }
    }

    #[test]
    fn test_message_requires_text() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let outcome = run(&world, message, "message", Some("Ann"));
        assert_eq!(outcome.result.message, "expected at least 1 argument(s)");
    }

    #[test]
    fn test_map_reply() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let maps = listen(&world, "Ann", Subject::MapData);
        let bob_maps = listen(&world, "Bob", Subject::MapData);

        let outcome = run(&world, map, "map", Some("Ann"));
        assert_eq!(outcome.result.message, "5x5 spaces");
        assert_eq!(maps.len(), 1);
        assert_eq!(bob_maps.len(), 0);
    }

    #[test]
    fn test_players_count() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        run(&world, login, "login Bob", None);
        let outcome = run(&world, players, "players", Some("Ann"));
        assert_eq!(outcome.result.message, "2 players in the game");
    }

    #[test]
    fn test_quit_removes_and_unsubscribes() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        run(&world, login, "login Bob", None);
        let ann = listen(&world, "Ann", Subject::PlayerDisconnected);
        let bob = listen(&world, "Bob", Subject::PlayerDisconnected);

        let outcome = run(&world, quit, "quit", Some("Ann"));
        assert_eq!(outcome.result.message, "farewell Ann");
        assert!(!world.players.contains(&PlayerName::from("Ann")));
        assert_eq!(world.events.subscription_count(&PlayerName::from("Ann")), 0);

        assert_eq!(ann.len(), 0);
        let events = bob.events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].to_responses()[0].to_line(),
            "101:Ann, -1, -1, 0, disconnected"
        );
    }

    #[test]
    fn test_quit_persists_everyone() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        run(&world, login, "login Bob", None);
        run(&world, move_player, "move north", Some("Bob"));

        run(&world, quit, "quit", Some("Ann"));

        let bob = world.store.load(&PlayerName::from("Bob")).unwrap().unwrap();
        assert_eq!(bob.position, Position::new(2, 1));
        assert!(world.store.load(&PlayerName::from("Ann")).unwrap().is_some());
    }

    #[test]
    fn test_quit_rejects_arguments() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let outcome = run(&world, quit, "quit now", Some("Ann"));
        assert_eq!(outcome.result.code, ResultCode::BadRequest);
        assert!(world.players.contains(&PlayerName::from("Ann")));
    }

    #[test]
    fn test_misrouted_command_is_server_error() {
        let world = world(OPEN);
        run(&world, login, "login Ann", None);
        let outcome = run(&world, map, "players", Some("Ann"));
        assert_eq!(outcome.result.code, ResultCode::ServerError);
        assert_eq!(outcome.result.message, "internal error");
    }
}
