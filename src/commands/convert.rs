use clap::Args;
use serde::Serialize;

use tsmig::convert::{self, ConvertResult};

use super::CmdResult;

#[derive(Args)]
pub struct ConvertArgs {
    /// Repository root containing the app/ tree
    #[arg(long, default_value = ".")]
    pub root: String,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConvertOutput {
    #[serde(rename = "convert")]
    Run {
        root: String,
        dry_run: bool,
        #[serde(flatten)]
        result: ConvertResult,
    },
}

pub fn run(args: ConvertArgs, _global: &super::GlobalArgs) -> CmdResult<ConvertOutput> {
    let root = std::path::Path::new(&args.root);
    let mut result = convert::generate_conversions(root)?;

    if args.write {
        convert::apply_conversions(&mut result);
    }

    Ok((
        ConvertOutput::Run {
            root: args.root.clone(),
            dry_run: !args.write,
            result,
        },
        0,
    ))
}
