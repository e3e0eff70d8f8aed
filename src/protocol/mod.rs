//! Protocol handling.
//!
//! Implements the line protocol the binary speaks: the command parser, the
//! text notation for actions, and JSON scenario files used to set up a
//! position.

pub mod notation;
pub mod parser;
pub mod scenario;

pub use notation::{format_actions, parse_action, parse_actions, NotationError};
pub use parser::{parse_command, Command, GoParams};
pub use scenario::{load_scenario, parse_scenario, Scenario, ScenarioError};
