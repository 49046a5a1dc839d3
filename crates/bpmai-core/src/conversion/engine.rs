//! JSON to BPMN transformation engine seam.
//!
//! The converter never interprets model JSON itself. It hands the text to a
//! `ModelTransformer` and writes back whatever XML comes out.

use crate::error::{BpmaiError, Result};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Converts Signavio model JSON into BPMN 2.0 XML.
///
/// Implementations return an error instead of partial output on malformed input.
pub trait ModelTransformer: Send + Sync {
    fn transform(&self, model_json: &str) -> Result<String>;
}

impl<F> ModelTransformer for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn transform(&self, model_json: &str) -> Result<String> {
        self(model_json)
    }
}

/// Runs an external program per model: JSON on stdin, BPMN XML on stdout.
///
/// Typically a JVM wrapper around the Signavio connector, e.g.
/// `java -jar signavio-bpmn.jar`.
#[derive(Debug, Clone)]
pub struct CommandTransformer {
    program: String,
    args: Vec<String>,
}

impl CommandTransformer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line: program followed by its arguments.
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        match command.split_first() {
            Some((program, args)) if !program.trim().is_empty() => {
                Ok(Self::new(program.clone(), args.to_vec()))
            }
            _ => Err(BpmaiError::Config {
                message: "engine command must name a program".to_string(),
            }),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ModelTransformer for CommandTransformer {
    fn transform(&self, model_json: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BpmaiError::Io {
                message: format!("Failed to spawn engine {}: {}", self.program, e),
                path: None,
                source: Some(e),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| BpmaiError::Other("engine stdin was not piped".to_string()))?;

        // stdin is fed while stdout is drained; large models would otherwise
        // deadlock on a full pipe.
        let (write_result, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(model_json.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.map_err(|e| BpmaiError::Io {
            message: format!("Failed to wait for engine {}: {}", self.program, e),
            path: None,
            source: Some(e),
        })?;

        match write_result {
            Ok(Ok(())) => {}
            // The engine may exit before draining stdin; its status decides.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("Engine {} closed stdin early", self.program);
            }
            Ok(Err(e)) => {
                return Err(BpmaiError::Io {
                    message: format!("Failed to write to engine {}: {}", self.program, e),
                    path: None,
                    source: Some(e),
                })
            }
            Err(_) => {
                return Err(BpmaiError::Other(
                    "engine stdin writer panicked".to_string(),
                ))
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BpmaiError::TransformFailed {
                message: format!(
                    "{} exited with status {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| BpmaiError::TransformFailed {
            message: format!("{} produced non UTF-8 output: {}", self.program, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_transformer() {
        let upper = |json: &str| -> Result<String> { Ok(json.to_uppercase()) };
        assert_eq!(upper.transform("{\"a\":1}").unwrap(), "{\"A\":1}");
    }

    #[test]
    fn test_from_command_line() {
        let cmd = vec!["java".to_string(), "-jar".to_string(), "engine.jar".to_string()];
        let transformer = CommandTransformer::from_command_line(&cmd).unwrap();
        assert_eq!(transformer.program(), "java");

        assert!(CommandTransformer::from_command_line(&[]).is_err());
        assert!(CommandTransformer::from_command_line(&[" ".to_string()]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_transformer_pipes_stdin_to_stdout() {
        let transformer = CommandTransformer::new("cat", Vec::new());
        let json = "{\"childShapes\": []}\n".repeat(20_000);
        assert_eq!(transformer.transform(&json).unwrap(), json);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_transformer_reports_exit_failure() {
        let transformer = CommandTransformer::new(
            "sh",
            vec!["-c".to_string(), "echo 'bad stencil' >&2; exit 3".to_string()],
        );
        let err = transformer.transform("{}").unwrap_err();
        match err {
            BpmaiError::TransformFailed { message } => assert!(message.contains("bad stencil")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_command_transformer_missing_program() {
        let transformer = CommandTransformer::new("bpmai-no-such-engine", Vec::new());
        assert!(matches!(
            transformer.transform("{}"),
            Err(BpmaiError::Io { .. })
        ));
    }
}
