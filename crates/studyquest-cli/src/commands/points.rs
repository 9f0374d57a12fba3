use clap::Subcommand;

use super::{emit, open_state, CmdResult};

#[derive(Subcommand)]
pub enum PointsAction {
    /// Award points directly
    Add {
        /// Amount to award (must be non-negative)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

pub fn run(action: PointsAction) -> CmdResult {
    let (mut state, _config) = open_state()?;
    match action {
        PointsAction::Add { amount } => {
            let delta = state.try_add_points(amount)?;
            emit(&mut state, &delta)
        }
    }
}
