//! Battle and tutorial logic

pub mod choices;
pub mod controller;
pub mod schedule;
pub mod script;
pub mod state;

pub use choices::{WRONG_CHOICES, generate_choices, shuffled};
pub use controller::BattleController;
pub use schedule::{Continuation, TaskId, TurnScheduler};
pub use script::{TUTORIAL_COMBAT_SEQUENCE, TutorialAction, TutorialAttack};
pub use state::{Combatant, GameMode, GameState, TutorialPhase, TutorialState};
