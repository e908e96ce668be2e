use clap::Args;
use serde::Serialize;

use tsmig::imports::{self, RewriteResult};

use super::CmdResult;

#[derive(Args)]
pub struct ImportsArgs {
    /// Repository root containing the app/ tree
    #[arg(long, default_value = ".")]
    pub root: String,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ImportsOutput {
    #[serde(rename = "imports")]
    Run {
        root: String,
        dry_run: bool,
        #[serde(flatten)]
        result: RewriteResult,
    },
}

pub fn run(args: ImportsArgs, _global: &super::GlobalArgs) -> CmdResult<ImportsOutput> {
    let root = std::path::Path::new(&args.root);
    let mut result = imports::generate_rewrites(root)?;

    if args.write {
        imports::apply_rewrites(&mut result);
    }

    Ok((
        ImportsOutput::Run {
            root: args.root.clone(),
            dry_run: !args.write,
            result,
        },
        0,
    ))
}
