use clap::Args;
use serde::Serialize;

use tsmig::regions::{self, ExciseResult};

use super::CmdResult;

#[derive(Args)]
pub struct ExciseArgs {
    /// File to excise regions from
    pub file: String,

    /// Region plan as a JSON array (supports @file and - for stdin)
    #[arg(long, value_name = "JSON")]
    pub plan: String,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ExciseOutput {
    #[serde(rename = "excise")]
    Run {
        dry_run: bool,
        #[serde(flatten)]
        result: ExciseResult,
    },
}

pub fn run(args: ExciseArgs, _global: &super::GlobalArgs) -> CmdResult<ExciseOutput> {
    let plan = super::parse_region_plan(&args.plan)?;

    let path = std::path::Path::new(&args.file);
    let mut result = regions::generate_excision(path, &plan)?;

    if args.write {
        regions::apply_excision(&mut result)?;
    }

    Ok((
        ExciseOutput::Run {
            dry_run: !args.write,
            result,
        },
        0,
    ))
}
