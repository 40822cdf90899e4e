use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Present the next task in the rotation
    ///
    /// Example: rotor next
    Next,
    /// Create a project
    ///
    /// Example: rotor add-project "Website relaunch"
    AddProject {
        name: String,
        #[arg(long)]
        context: Option<String>,
    },
    /// Create a task under a project
    ///
    /// Example: rotor add-task proj-1 "Draft the copy"
    /// Example: rotor add-task proj-1 "Ping legal" --waiting "sent mail" --until 2d
    AddTask {
        project: String,
        title: String,
        #[arg(long)]
        context: Option<String>,
        /// Create the task already waiting, with this reason
        #[arg(long, value_name = "REASON", requires = "until")]
        waiting: Option<String>,
        /// Snooze target for a task created waiting (duration or RFC3339)
        #[arg(long, value_name = "TIME", requires = "waiting")]
        until: Option<String>,
    },
    /// Mark a task as done
    ///
    /// Example: rotor done task-1
    Done {
        id: String,
    },
    /// Park a task until something external happens
    ///
    /// Example: rotor snooze task-1 "awaiting review" 2h
    /// Example: rotor snooze task-1 "on hold" 2026-09-01T09:00:00Z
    Snooze {
        id: String,
        reason: String,
        /// Duration (45m, 2h, 1d6h30m, bare minutes) or RFC3339 timestamp;
        /// falls back to default_snooze from the config
        until: Option<String>,
    },
    /// Bring a waiting task back into the rotation
    ///
    /// Example: rotor wake task-1
    /// Example: rotor wake task-1 --force
    Wake {
        id: String,
        /// Wake even if the snooze has not expired yet
        #[arg(long)]
        force: bool,
    },
    /// Reopen a done task
    ///
    /// Example: rotor reopen task-1
    Reopen {
        id: String,
    },
    /// Edit a task's title or context
    ///
    /// Example: rotor edit task-1 --title "Draft the final copy"
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Edit a project's name or context
    ///
    /// Example: rotor edit-project proj-1 --name "Relaunch"
    EditProject {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Delete a task
    ///
    /// Example: rotor delete-task task-1
    DeleteTask {
        id: String,
    },
    /// Delete a project and the tasks it owns
    ///
    /// Example: rotor delete-project proj-1 --force
    DeleteProject {
        id: String,
        /// Delete even if the project still has open tasks
        #[arg(long)]
        force: bool,
    },
    /// List all projects and tasks
    ///
    /// Example: rotor list
    List,
    /// Show a task together with its project
    ///
    /// Example: rotor show task-1
    Show {
        id: String,
    },
}
