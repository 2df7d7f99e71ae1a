use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "keel-console")]
#[command(about = "Headless administrative console", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Prints one page of a list screen.
    List {
        resource: ListResource,

        #[arg(long)]
        keyword: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Prints a hierarchical screen.
    Tree {
        resource: TreeResourceKind,

        #[arg(long)]
        keyword: Option<String>,

        #[arg(long)]
        collapsed: bool,
    },

    /// Moves a tree node one position among its siblings.
    Move {
        resource: TreeResourceKind,

        id: u64,

        direction: MoveDirection,
    },

    /// Deletes records of a list screen.
    Delete {
        resource: ListResource,

        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Follows live server status.
    Monitor {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListResource {
    Users,
    Roles,
    Posts,
    Dicts,
    Configs,
    Operlogs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TreeResourceKind {
    Depts,
    Menus,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}
