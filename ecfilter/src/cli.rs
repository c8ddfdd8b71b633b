use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Manage serverless traffic filters and their project associations.
#[derive(Parser, Debug)]
#[command(name = "ecfilter", version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Traffic filter lifecycle
    #[command(subcommand)]
    Filter(FilterCommand),

    #[command(subcommand, about = trafficfilter::association::DESCRIPTION)]
    Association(AssociationCommand),

    /// Project level views
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Subcommand, Debug)]
pub enum FilterCommand {
    /// Create a traffic filter from a YAML model
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Read {
        #[arg(long)]
        id: String,
    },
    /// Update a traffic filter in place from a YAML model
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Import an existing traffic filter by id and read it
    Import { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct AssociationArgs {
    #[arg(long)]
    pub project_id: String,
    /// One of elasticsearch, observability, security
    #[arg(long)]
    pub project_type: String,
    #[arg(long)]
    pub traffic_filter_id: String,
}

#[derive(Subcommand, Debug)]
pub enum AssociationCommand {
    Create(AssociationArgs),
    Read(AssociationArgs),
    Delete(AssociationArgs),
    /// Import from `<project_id>,<project_type>,<traffic_filter_id>` and read
    Import { key: String },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Show the traffic filters currently attached to a project
    Filters {
        #[arg(long)]
        project_id: String,
        #[arg(long)]
        project_type: String,
    },
}
