use ferkin_core::{FileManager, StderrLog};

use crate::TargetArgs;

/// Run the `format` command. Returns `true` when any file failed.
pub async fn run(args: &TargetArgs) -> bool {
    tracing::debug!(path = %args.path, indent = args.indent, "formatting");
    let logger = StderrLog::new();
    let manager = FileManager::new(args.indent, &logger);
    manager.format_and_replace(&args.path).await
}
