//! Study task commands.

use clap::Subcommand;

use super::{emit, open_state, resolve_id, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
    },
    /// Mark a task done, or not done again
    Toggle {
        /// Task id or unique prefix
        id: String,
    },
    /// List tasks
    List {
        /// Only tasks that are not done
        #[arg(long)]
        open: bool,
    },
}

pub fn run(action: TaskAction) -> CmdResult {
    let (mut state, _config) = open_state()?;

    match action {
        TaskAction::Add { text } => {
            let task = state.add_task(&text)?;
            emit(&mut state, &task)
        }
        TaskAction::Toggle { id } => {
            let id = resolve_id(state.tasks().iter().map(|t| t.id), &id)?;
            let task = state
                .toggle_task(id)
                .ok_or_else(|| format!("task not found: {id}"))?;
            emit(&mut state, &task)
        }
        TaskAction::List { open } => {
            let tasks: Vec<_> = state
                .tasks()
                .iter()
                .filter(|t| !open || !t.completed)
                .cloned()
                .collect();
            emit(&mut state, &tasks)
        }
    }
}
