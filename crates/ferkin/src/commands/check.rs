use ferkin_core::{FileManager, StderrLog};

use crate::TargetArgs;

/// Run the `check` command. Returns `true` when any file is not in
/// canonical form or failed outright.
pub async fn run(args: &TargetArgs) -> bool {
    tracing::debug!(path = %args.path, indent = args.indent, "checking");
    let logger = StderrLog::new();
    let manager = FileManager::new(args.indent, &logger);
    manager.check(&args.path).await
}
