use clap::Parser;
use std::path::PathBuf;

use crate::date_source::DateSource;
use crate::plan::RenameOptions;

#[derive(Parser, Debug)]
#[command(name = "dateprefix")]
#[command(author, version, about, long_about = None)]
#[command(about = "Prefix file names with a YYYYMMDD_ date, with preview and undo")]
pub struct Args {
    /// File or folder to rename
    #[arg(required_unless_present_any = ["undo", "undo_id", "history"])]
    pub target: Option<PathBuf>,

    /// Simulate changes without modifying the filesystem
    #[arg(short, long)]
    pub dry: bool,

    /// Include files in subfolders
    #[arg(short, long)]
    pub recursive: bool,

    /// Where the date comes from
    #[arg(short, long, value_enum, default_value_t = DateSource::ModifiedTime)]
    pub source: DateSource,

    /// Only rename these extensions, e.g. "jpg,png"
    #[arg(short, long, value_name = "LIST", default_value = "")]
    pub ext: String,

    /// Only rename files whose name contains this text
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    pub include: String,

    /// Skip files whose name contains this text
    #[arg(short = 'x', long, value_name = "TEXT", default_value = "")]
    pub exclude: String,

    /// Undo the last executed batch
    #[arg(short, long, conflicts_with_all = ["undo_id", "history"])]
    pub undo: bool,

    /// Undo a specific batch by id
    #[arg(long, value_name = "ID", conflicts_with = "history")]
    pub undo_id: Option<String>,

    /// List recorded batches
    #[arg(long)]
    pub history: bool,

    /// Only show files that would get an auto-numbered suffix
    #[arg(long, requires = "target")]
    pub conflicts: bool,

    /// History file location
    #[arg(long, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn rename_options(&self) -> RenameOptions {
        RenameOptions {
            recursive: self.recursive,
            date_source: self.source,
            filter_exts: self.ext.clone(),
            filter_include: self.include.clone(),
            filter_exclude: self.exclude.clone(),
        }
    }
}
