use std::io::Read;
use std::path::Path;

use tsmig::regions::RegionSpec;

pub type CmdResult<T> = tsmig::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

// ============================================================================
// Plan input parsing (CLI layer)
// ============================================================================

/// Read a region plan from string, file (@path), or stdin (-).
fn read_plan_to_string(plan: &str) -> tsmig::Result<String> {
    use std::io::IsTerminal;

    if plan.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(tsmig::Error::validation_invalid_argument(
                "plan",
                "Cannot read plan from stdin when stdin is a TTY",
            ));
        }
        stdin.read_to_string(&mut buf).map_err(|e| {
            tsmig::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = plan.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(tsmig::Error::validation_invalid_argument(
                "plan",
                "Invalid plan '@' (missing file path)",
            ));
        }
        return std::fs::read_to_string(Path::new(path)).map_err(|e| {
            tsmig::Error::internal_io(e.to_string(), Some(format!("read {}", path)))
        });
    }

    Ok(plan.to_string())
}

/// Parse the `--plan` argument into region specs.
pub fn parse_region_plan(plan: &str) -> tsmig::Result<Vec<RegionSpec>> {
    let raw = read_plan_to_string(plan)?;
    serde_json::from_str(&raw)
        .map_err(|e| tsmig::Error::validation_invalid_json(e, Some("parse region plan".to_string())))
}

pub mod convert;
pub mod excise;
pub mod imports;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (tsmig::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Convert(args) => dispatch!(args, global, convert),
        crate::Commands::Imports(args) => dispatch!(args, global, imports),
        crate::Commands::Excise(args) => dispatch!(args, global, excise),
    }
}
