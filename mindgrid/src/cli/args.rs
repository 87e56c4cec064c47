//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// MindGrid - projects, resources and workflows from the terminal
#[derive(Parser, Debug)]
#[command(name = "mindgrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "MINDGRID_BACKEND_URL")]
    pub backend: Option<String>,

    /// Profile directory holding the saved session and project
    #[arg(long, global = true, env = "MINDGRID_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// More log output on stderr (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password, or a Google authorization code
    Login {
        /// Account email
        #[arg(long, required_unless_present = "google_code")]
        email: Option<String>,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "MINDGRID_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Google OAuth authorization code
        #[arg(long, conflicts_with_all = ["email", "password"])]
        google_code: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        full_name: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "MINDGRID_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the saved session and open project
    Logout,

    /// Show who is logged in
    Whoami,

    /// List, create and open projects
    #[command(subcommand)]
    Projects(ProjectCommand),

    /// Resources of the open project
    #[command(subcommand)]
    Resources(ResourceCommand),

    /// Knowledge graph of the open project
    Graph,

    /// Google Docs linked to the open project
    #[command(subcommand)]
    Docs(DocsCommand),

    /// Agent workflows
    #[command(subcommand)]
    Workflows(WorkflowCommand),

    /// Ask a question over the project's documents
    Chat {
        /// Question to ask
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,

        /// Also append the answer to the project's Google Doc
        #[arg(long)]
        push: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects
    List,

    /// Create a project
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Open the new project right away
        #[arg(long)]
        open: bool,
    },

    /// Open a project and fetch its resources
    Open {
        /// Project ID
        id: String,
    },

    /// Show the open project
    Current,
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List resources of the open project
    List {
        /// List resources across all projects instead
        #[arg(long)]
        all: bool,

        /// Re-fetch instead of using the cached list
        #[arg(long)]
        refresh: bool,
    },

    /// Register a link resource in the open project
    Add {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        link: Option<String>,
    },

    /// Upload a file into the open project
    Upload {
        path: PathBuf,
    },

    /// Show one cached resource
    Show {
        /// Resource ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocsCommand {
    /// List Google Docs in the linked Drive
    List,

    /// Import Google Docs into the open project
    Import {
        /// Doc IDs to import
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,

        /// Import every listed doc
        #[arg(long)]
        all: bool,
    },

    /// Append text to the project's Google Doc
    Push {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },

    /// Open the project's Google Doc in the browser
    Open,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// List stored workflows
    List,

    /// Show a workflow as input -> action -> output
    Show {
        /// Workflow ID
        id: String,
    },

    /// Create a workflow over resources of the open project
    Create {
        /// Input resource ID
        #[arg(long)]
        input: String,

        /// Action, e.g. summarise, add_event, create_contact
        #[arg(long)]
        action: String,

        /// Prompt for the LLM (defaults to the action name)
        #[arg(long)]
        prompt: Option<String>,

        /// Output resource ID, or "auto"
        #[arg(long)]
        output: Option<String>,
    },

    /// Run a stored workflow
    Run {
        /// Workflow ID
        id: String,
    },

    /// List actions and their output rules
    Actions,
}
