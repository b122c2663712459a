use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use taskboard_core::AuthMode;
use taskboard_domain::{ColumnId, CompletionFilter, DeadlineFilter, ProjectId, TaskId};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Kanban boards backed by a taskboard server", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Base URL of the taskboard API
    #[arg(long, global = true, env = "TASKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the API
    #[arg(long, global = true, env = "TASKBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Signed-in user id (required in user-id auth mode)
    #[arg(long, global = true, env = "TASKBOARD_USER_ID")]
    pub user_id: Option<String>,

    /// Signed-in user email, recorded on created and completed tasks
    #[arg(long, global = true, env = "TASKBOARD_EMAIL")]
    pub email: Option<String>,

    /// How requests are authenticated (defaults to the config file)
    #[arg(long, global = true, value_enum)]
    pub auth_mode: Option<AuthModeArg>,

    /// Config file to read instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthModeArg {
    Bearer,
    UserId,
}

impl From<AuthModeArg> for AuthMode {
    fn from(arg: AuthModeArg) -> Self {
        match arg {
            AuthModeArg::Bearer => AuthMode::Bearer,
            AuthModeArg::UserId => AuthMode::UserId,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project operations
    Project(ProjectCommand),
    /// Column operations
    Column(ColumnCommand),
    /// Task operations
    Task(TaskCommand),
    /// Per-member counts and daily activity for a project
    Metrics {
        #[arg(long)]
        project: ProjectId,
        /// Day to evaluate deadlines against (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Project commands
#[derive(Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects visible to the signed-in user
    List,
    /// Create a project
    Create {
        #[arg(long)]
        name: String,
    },
    /// Rename a project
    Rename {
        #[arg(long)]
        id: ProjectId,
        #[arg(long)]
        name: String,
    },
    /// Delete a project
    Delete {
        #[arg(long)]
        id: ProjectId,
    },
    /// Share a project with a member
    AddMember {
        #[arg(long)]
        id: ProjectId,
        #[arg(long)]
        email: String,
    },
    /// Stop sharing a project with a member
    RemoveMember {
        #[arg(long)]
        id: ProjectId,
        #[arg(long)]
        email: String,
    },
}

// Column commands
#[derive(Args)]
pub struct ColumnCommand {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// List a project's columns
    List {
        #[arg(long)]
        project: ProjectId,
    },
    /// Append a column to a project
    Create {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        name: String,
    },
    /// Rename a column
    Rename {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        id: ColumnId,
        #[arg(long)]
        name: String,
    },
    /// Delete a column and its tasks
    Delete {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        id: ColumnId,
    },
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks with optional filters
    List(TaskListArgs),
    /// Append a task to a column
    Create(TaskCreateArgs),
    /// Edit a task
    Update(TaskUpdateArgs),
    /// Move a task within or across columns
    Move {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        id: TaskId,
        /// Destination column
        #[arg(long)]
        column: ColumnId,
        /// Zero-based position in the destination (defaults to the end)
        #[arg(long)]
        position: Option<usize>,
    },
    /// Delete a task
    Delete {
        #[arg(long)]
        project: ProjectId,
        #[arg(long)]
        id: TaskId,
    },
}

#[derive(Args)]
pub struct TaskListArgs {
    #[arg(long)]
    pub project: ProjectId,
    /// Only this column (defaults to every column)
    #[arg(long)]
    pub column: Option<ColumnId>,
    /// Case-insensitive text in title or description
    #[arg(long)]
    pub query: Option<String>,
    /// Earliest creation day, inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Latest creation day, inclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// all, completed or incomplete
    #[arg(long, default_value = "all")]
    pub completion: CompletionFilter,
    /// all, overdue or upcoming
    #[arg(long, default_value = "all")]
    pub deadline: DeadlineFilter,
    /// Day to evaluate deadlines against (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Args)]
pub struct TaskCreateArgs {
    #[arg(long)]
    pub project: ProjectId,
    #[arg(long)]
    pub column: ColumnId,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    #[arg(long)]
    pub project: ProjectId,
    #[arg(long)]
    pub id: TaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub completed: Option<bool>,
    /// Deadline as YYYY-MM-DD
    #[arg(long, conflicts_with = "clear_deadline")]
    pub deadline: Option<NaiveDate>,
    #[arg(long)]
    pub clear_deadline: bool,
}
