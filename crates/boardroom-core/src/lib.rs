//! Pure game engine: board seeding, action transitions, and conservation
//! invariants. No I/O and no storage; callers pass full state in and get
//! full state out.

pub mod catalog;
pub mod game;

pub use game::{
    apply_action, game_created_event, new_game, verify_invariants, ActionError, ActionOutcome,
};
