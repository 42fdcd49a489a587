use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Portfolio content store: edit projects and blog posts kept in a repository"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "FOLIO_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the admin secret that `login` is checked against.
    #[arg(
        long = "admin-secret",
        env = "FOLIO_ADMIN_SECRET",
        hide_env_values = true,
        value_name = "SECRET",
        global = true
    )]
    pub admin_secret: Option<String>,

    /// Override the session marker file.
    #[arg(long = "session-file", value_name = "PATH", global = true)]
    pub session_file: Option<PathBuf>,

    /// Override the blob store backend (github|local|memory).
    #[arg(long = "store-backend", value_name = "BACKEND", global = true)]
    pub store_backend: Option<String>,

    /// Override the blob store write token.
    #[arg(
        long = "store-token",
        env = "FOLIO_STORE_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN",
        global = true
    )]
    pub store_token: Option<String>,

    /// Override the directory used by the local backend.
    #[arg(long = "store-root", value_name = "PATH", global = true)]
    pub store_root: Option<PathBuf>,

    /// Override the write policy (overwrite|check_revision).
    #[arg(long = "write-mode", value_name = "MODE", global = true)]
    pub write_mode: Option<String>,

    /// Override the local mirror directory.
    #[arg(long = "mirror-dir", value_name = "PATH", global = true)]
    pub mirror_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Start an admin session.
    Login(LoginArgs),
    /// End the admin session.
    Logout,
    /// Manage projects.
    Projects(ProjectsArgs),
    /// Manage blog posts.
    Blogs(BlogsArgs),
    /// Talk to the portfolio assistant.
    Chat(ChatArgs),
}

#[derive(Debug, Args, Clone)]
pub struct LoginArgs {
    /// Secret to present; read from stdin when omitted.
    #[arg(long, value_name = "SECRET")]
    pub secret: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    /// Ask a single question and exit instead of reading lines from stdin.
    #[arg(long, short, value_name = "TEXT")]
    pub message: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Debug, Args, Clone)]
pub struct BlogsArgs {
    #[command(subcommand)]
    pub action: BlogAction,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ProjectAction {
    /// Print every project.
    List(ListArgs),
    /// Print one project.
    Get(GetArgs),
    /// Create a project, or update one when `--id` is given.
    Save(ProjectFields),
    /// Delete a project.
    Remove(RemoveArgs),
}

#[derive(Debug, Subcommand, Clone)]
pub enum BlogAction {
    /// Print every blog post.
    List(ListArgs),
    /// Print one blog post.
    Get(GetArgs),
    /// Create a blog post, or update one when `--id` is given.
    Save(BlogPostFields),
    /// Delete a blog post.
    Remove(RemoveArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct ListArgs {
    /// Print the local mirror instead of reading the store.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub cached: bool,
}

#[derive(Debug, Args, Clone)]
pub struct GetArgs {
    #[arg(value_name = "ID")]
    pub id: u64,
}

#[derive(Debug, Args, Clone)]
pub struct RemoveArgs {
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Skip the interactive confirmation.
    #[arg(long, short, action = clap::ArgAction::SetTrue)]
    pub yes: bool,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ProjectFields {
    /// Existing project to update.
    #[arg(long, value_name = "ID")]
    pub id: Option<u64>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Add a tag; repeatable.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Drop existing tags before adding new ones.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub clear_tags: bool,

    #[arg(long, value_name = "URL")]
    pub image: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub featured: Option<bool>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct BlogPostFields {
    /// Existing post to update.
    #[arg(long, value_name = "ID")]
    pub id: Option<u64>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub excerpt: Option<String>,

    #[arg(long = "medium-url", value_name = "URL")]
    pub medium_url: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long = "read-time")]
    pub read_time: Option<String>,

    #[arg(long = "image-url", value_name = "URL")]
    pub image_url: Option<String>,

    /// Add a category; repeatable.
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Drop existing categories before adding new ones.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub clear_categories: bool,
}
