//! Command parsing and execution for the read-eval loop
//!
//! The driver owns all raw-input validation: numeric parses, new-object
//! name well-formedness, command recognition. By the time the core is
//! reached, arguments are well-typed. A line whose first token names a live
//! agent is an order to that agent; anything else is a world or view
//! command.

use crate::core::error::{Result, SimError};
use crate::core::types::Point;
use crate::observer::views::{AmountView, HealthView, MapView};
use crate::observer::ObserverHandle;
use crate::world::World;
use std::cell::RefCell;
use std::rc::Rc;
use std::str::SplitWhitespace;

const MIN_NAME_LEN: usize = 2;

/// A fully parsed, well-typed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Go,
    Status,
    Show,
    Health,
    Amounts,
    Snapshot,
    Default,
    Size(i32),
    Zoom(f64),
    Pan(Point),
    Build { name: String, type_name: String, location: Point },
    Train { name: String, type_name: String, location: Point },
    Move { agent: String, destination: Point },
    Work { agent: String, source: String, destination: String },
    Attack { agent: String, target: String },
    Stop { agent: String },
}

/// Whether the loop should keep running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Parse one input line into a command
///
/// The world is consulted only to decide whether the first token names an
/// agent; nothing is mutated here.
pub fn parse(input: &str, world: &World) -> Result<Command> {
    let mut tokens = input.split_whitespace();
    let first = tokens
        .next()
        .ok_or_else(|| SimError::UnrecognizedCommand(String::new()))?;

    if world.lookup_agent(first).is_ok() {
        return parse_agent_order(first, &mut tokens);
    }

    match first {
        "quit" => Ok(Command::Quit),
        "go" => Ok(Command::Go),
        "status" => Ok(Command::Status),
        "show" => Ok(Command::Show),
        "health" => Ok(Command::Health),
        "amounts" => Ok(Command::Amounts),
        "snapshot" => Ok(Command::Snapshot),
        "default" => Ok(Command::Default),
        "size" => Ok(Command::Size(next_int(&mut tokens)?)),
        "zoom" => Ok(Command::Zoom(next_number(&mut tokens)?)),
        "pan" => Ok(Command::Pan(next_point(&mut tokens)?)),
        "build" => {
            let name = next_new_name(&mut tokens)?;
            let type_name = next_token(&mut tokens)?.to_string();
            let location = next_point(&mut tokens)?;
            Ok(Command::Build { name, type_name, location })
        }
        "train" => {
            let name = next_new_name(&mut tokens)?;
            let type_name = next_token(&mut tokens)?.to_string();
            let location = next_point(&mut tokens)?;
            Ok(Command::Train { name, type_name, location })
        }
        other => Err(SimError::UnrecognizedCommand(other.to_string())),
    }
}

fn parse_agent_order(agent: &str, tokens: &mut SplitWhitespace) -> Result<Command> {
    let agent = agent.to_string();
    match next_token(tokens)? {
        "move" => Ok(Command::Move { agent, destination: next_point(tokens)? }),
        "work" => {
            let source = next_token(tokens)?.to_string();
            let destination = next_token(tokens)?.to_string();
            Ok(Command::Work { agent, source, destination })
        }
        "attack" => Ok(Command::Attack { agent, target: next_token(tokens)?.to_string() }),
        "stop" => Ok(Command::Stop { agent }),
        other => Err(SimError::UnrecognizedCommand(other.to_string())),
    }
}

fn next_token<'a>(tokens: &mut SplitWhitespace<'a>) -> Result<&'a str> {
    tokens
        .next()
        .ok_or_else(|| SimError::UnrecognizedCommand(String::new()))
}

fn next_int(tokens: &mut SplitWhitespace) -> Result<i32> {
    next_token(tokens)?
        .parse()
        .map_err(|_| SimError::ExpectedInteger)
}

fn next_number(tokens: &mut SplitWhitespace) -> Result<f64> {
    next_token(tokens)?
        .parse()
        .map_err(|_| SimError::ExpectedNumber)
}

fn next_point(tokens: &mut SplitWhitespace) -> Result<Point> {
    let x = next_number(tokens)?;
    let y = next_number(tokens)?;
    Ok(Point::new(x, y))
}

/// Names for new objects must be at least two alphanumeric characters
fn next_new_name(tokens: &mut SplitWhitespace) -> Result<String> {
    let name = next_token(tokens)?;
    if name.len() < MIN_NAME_LEN || !name.chars().all(|c| c.is_alphanumeric()) {
        return Err(SimError::InvalidObjectName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Executes parsed commands against the world and the standard views
///
/// The executor owns drawing handles to the same views the registry
/// notifies; construction attaches them, so they are synchronized from the
/// first command on.
pub struct CommandExecutor {
    map: Rc<RefCell<MapView>>,
    health: Rc<RefCell<HealthView>>,
    amounts: Rc<RefCell<AmountView>>,
}

impl CommandExecutor {
    pub fn new(world: &mut World) -> Self {
        let map = Rc::new(RefCell::new(MapView::new()));
        let health = Rc::new(RefCell::new(HealthView::new()));
        let amounts = Rc::new(RefCell::new(AmountView::new()));
        let map_handle: ObserverHandle = map.clone();
        let health_handle: ObserverHandle = health.clone();
        let amounts_handle: ObserverHandle = amounts.clone();
        world.attach_observer(map_handle);
        world.attach_observer(health_handle);
        world.attach_observer(amounts_handle);
        Self { map, health, amounts }
    }

    /// Run one command; output goes straight to stdout
    pub fn execute(&self, world: &mut World, command: Command) -> Result<Outcome> {
        match command {
            Command::Quit => return Ok(Outcome::Quit),
            Command::Go => world.tick(),
            Command::Status => print!("{}", world.describe()),
            Command::Show => print!("{}", self.map.borrow().draw()),
            Command::Health => print!("{}", self.health.borrow().draw()),
            Command::Amounts => print!("{}", self.amounts.borrow().draw()),
            Command::Snapshot => println!("{}", world.snapshot_json()?),
            Command::Default => self.map.borrow_mut().set_defaults(),
            Command::Size(size) => self.map.borrow_mut().set_size(size)?,
            Command::Zoom(scale) => self.map.borrow_mut().set_scale(scale)?,
            Command::Pan(origin) => self.map.borrow_mut().set_origin(origin),
            Command::Build { name, type_name, location } => {
                world.create_structure(&name, &type_name, location)?
            }
            Command::Train { name, type_name, location } => {
                world.create_agent(&name, &type_name, location)?
            }
            Command::Move { agent, destination } => world.order_move(&agent, destination)?,
            Command::Work { agent, source, destination } => {
                world.order_work(&agent, &source, &destination)?
            }
            Command::Attack { agent, target } => world.order_attack(&agent, &target)?,
            Command::Stop { agent } => world.order_stop(&agent)?,
        }
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;

    fn world_with_agent() -> World {
        let mut world = World::new(WorldConfig::default()).unwrap();
        world.create_agent("Pippin", "Peasant", Point::new(5.0, 10.0)).unwrap();
        world.create_structure("Shire", "Town_Hall", Point::new(20.0, 20.0)).unwrap();
        world
    }

    #[test]
    fn test_parse_world_commands() {
        let world = world_with_agent();
        assert_eq!(parse("go", &world).unwrap(), Command::Go);
        assert_eq!(parse("quit", &world).unwrap(), Command::Quit);
        assert_eq!(parse("size 12", &world).unwrap(), Command::Size(12));
        assert_eq!(parse("zoom 0.5", &world).unwrap(), Command::Zoom(0.5));
        assert_eq!(
            parse("pan 3 -4.5", &world).unwrap(),
            Command::Pan(Point::new(3.0, -4.5))
        );
    }

    #[test]
    fn test_parse_agent_orders() {
        let world = world_with_agent();
        assert_eq!(
            parse("Pippin move 1 2", &world).unwrap(),
            Command::Move { agent: "Pippin".into(), destination: Point::new(1.0, 2.0) }
        );
        assert_eq!(
            parse("Pippin stop", &world).unwrap(),
            Command::Stop { agent: "Pippin".into() }
        );
        assert_eq!(
            parse("Pippin work Rivendale Shire", &world).unwrap(),
            Command::Work {
                agent: "Pippin".into(),
                source: "Rivendale".into(),
                destination: "Shire".into()
            }
        );
    }

    #[test]
    fn test_structure_name_is_not_an_agent_order() {
        let world = world_with_agent();
        // "Shire" is a structure, so the line falls through to world
        // commands and is unrecognized
        let err = parse("Shire move 1 2", &world).unwrap_err();
        assert!(matches!(err, SimError::UnrecognizedCommand(_)));
    }

    #[test]
    fn test_parse_numeric_failures() {
        let world = world_with_agent();
        assert!(matches!(parse("size big", &world), Err(SimError::ExpectedInteger)));
        assert!(matches!(parse("zoom wide", &world), Err(SimError::ExpectedNumber)));
        assert!(matches!(
            parse("Pippin move 1 north", &world),
            Err(SimError::ExpectedNumber)
        ));
    }

    #[test]
    fn test_parse_new_name_validation() {
        let world = world_with_agent();
        assert!(matches!(
            parse("train X Soldier 0 0", &world),
            Err(SimError::InvalidObjectName(_))
        ));
        assert!(matches!(
            parse("build new!place Farm 0 0", &world),
            Err(SimError::InvalidObjectName(_))
        ));
        assert!(parse("train Gimli Soldier 0 0", &world).is_ok());
    }

    #[test]
    fn test_parse_unrecognized() {
        let world = world_with_agent();
        assert!(matches!(
            parse("dance", &world),
            Err(SimError::UnrecognizedCommand(_))
        ));
        assert!(matches!(
            parse("Pippin dance", &world),
            Err(SimError::UnrecognizedCommand(_))
        ));
    }

    #[test]
    fn test_executor_build_and_train() {
        let mut world = world_with_agent();
        let executor = CommandExecutor::new(&mut world);

        let command = parse("build Mill Farm 2 2", &world).unwrap();
        assert_eq!(executor.execute(&mut world, command).unwrap(), Outcome::Continue);
        assert!(world.lookup_structure("Mill").is_ok());

        let command = parse("train Gimli Soldier 0 0", &world).unwrap();
        executor.execute(&mut world, command).unwrap();
        assert!(world.lookup_agent("Gimli").is_ok());

        // the attached map view learned of both immediately
        assert!(executor.map.borrow().draw().contains("Mi"));
    }

    #[test]
    fn test_executor_quit() {
        let mut world = world_with_agent();
        let executor = CommandExecutor::new(&mut world);
        assert_eq!(executor.execute(&mut world, Command::Quit).unwrap(), Outcome::Quit);
    }
}
