//! Handler invocation.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::error::{DispatchError, FieldIssue};
use crate::domains::handlers::{ErasedHandler, InvokeError};
use crate::domains::registry::{CommandSpec, Invoker, LoadedHandler};
use crate::domains::schema::ROOT_FIELD;

/// Run a handler on an already validated request, bounded by `timeout`.
pub async fn invoke(
    handler: Arc<LoadedHandler>,
    request: Value,
    timeout: Duration,
) -> Result<Value, DispatchError> {
    let name = handler.name.as_str();

    let outcome = match &handler.invoker {
        Invoker::Builtin(plugin) => {
            tokio::time::timeout(timeout, call_builtin(name, plugin.clone(), request)).await
        }
        Invoker::Command(spec) => {
            tokio::time::timeout(timeout, run_command(name, spec, request)).await
        }
    };

    outcome.map_err(|_| DispatchError::TimedOut {
        handler: name.to_string(),
        timeout,
    })?
}

async fn call_builtin(
    name: &str,
    plugin: Arc<dyn ErasedHandler>,
    request: Value,
) -> Result<Value, DispatchError> {
    // A timed-out call keeps its blocking thread until it returns; only the
    // result is discarded.
    tokio::task::spawn_blocking(move || plugin.call(request))
        .await
        .map_err(|e| DispatchError::handler_failed(name, format!("handler panicked: {e}")))?
        .map_err(|e| match e {
            // Nested elements and integer ranges are only checked by decoding.
            InvokeError::Decode { field, source } => {
                let field = if field == "." { ROOT_FIELD.to_string() } else { field };
                DispatchError::validation_failed(name, vec![FieldIssue::new(field, source.to_string())])
            }
            other => DispatchError::handler_failed(name, other),
        })
}

async fn run_command(
    name: &str,
    spec: &CommandSpec,
    request: Value,
) -> Result<Value, DispatchError> {
    let failed = |reason: String| DispatchError::handler_failed(name, reason);

    let input = serde_json::to_vec(&request).map_err(|e| failed(e.to_string()))?;

    let mut child = Command::new(resolve_program(spec))
        .args(&spec.args)
        .current_dir(&spec.working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| failed(format!("cannot start '{}': {e}", spec.program)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| failed("child stdin unavailable".to_string()))?;

    let write = async move {
        let written = stdin.write_all(&input).await;
        drop(stdin);
        match written {
            // The process may exit without reading its input.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    };

    let (written, output) = tokio::join!(write, child.wait_with_output());
    let output = output.map_err(|e| failed(e.to_string()))?;
    written.map_err(|e| failed(format!("writing request: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    debug!(handler = name, bytes = output.stdout.len(), "Command finished");

    let response: Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| failed(format!("malformed output: {e}")))?;

    if !response.is_object() {
        return Err(failed("output is not a JSON object".to_string()));
    }

    Ok(response)
}

/// Relative program paths (`./run.sh`, `bin/handler`) resolve against the
/// manifest directory; bare names go through `PATH`.
fn resolve_program(spec: &CommandSpec) -> PathBuf {
    let program = PathBuf::from(&spec.program);
    if program.is_relative() && program.components().count() > 1 {
        spec.working_dir.join(program)
    } else {
        program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn spec(program: &str) -> CommandSpec {
        CommandSpec {
            program: program.to_string(),
            args: Vec::new(),
            working_dir: PathBuf::from("/srv/functions"),
        }
    }

    #[test]
    fn test_resolve_program() {
        assert_eq!(resolve_program(&spec("python3")), Path::new("python3"));
        assert_eq!(
            resolve_program(&spec("./run.sh")),
            Path::new("/srv/functions/./run.sh")
        );
        assert_eq!(
            resolve_program(&spec("bin/handler")),
            Path::new("/srv/functions/bin/handler")
        );
        assert_eq!(resolve_program(&spec("/usr/bin/env")), Path::new("/usr/bin/env"));
    }
}
