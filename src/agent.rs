use crate::{game::GameState, types::action::Action};

/// A decision-maker that is asked for one action per tick.
pub trait Agent<G: GameState> {
    type Error;

    fn act(&mut self, state: &G) -> Result<Action, Self::Error>;
}
