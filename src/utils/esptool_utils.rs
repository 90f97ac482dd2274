//! Invocation of the external esptool flashing program

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;

use crate::config::ToolConfig;
use crate::errors::ToolError;
use crate::models::AppEvent;

const FATAL_MARKER: &str = "A fatal error occurred:";
const TRANSPORT_MARKERS: [&str; 3] = ["SerialException", "could not open port", "Serial port"];

/// The external flashing tool, seen as a single blocking call.
///
/// Implementations forward every piece of output as `AppEvent::ToolOutput`
/// in the order it was produced.
#[async_trait]
pub trait FlashTool: Send + Sync {
    async fn run(
        &self,
        args: &[String],
        output: &mpsc::UnboundedSender<AppEvent>,
    ) -> Result<(), ToolError>;
}

/// Runs esptool as a child process
#[derive(Debug, Clone)]
pub struct EsptoolProcess {
    program: String,
    prefix_args: Vec<String>,
}

impl EsptoolProcess {
    pub fn new(program: impl Into<String>, prefix_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args,
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Human readable command line, for logging
    pub fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.prefix_args.iter().map(String::as_str))
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for EsptoolProcess {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

#[async_trait]
impl FlashTool for EsptoolProcess {
    async fn run(
        &self,
        args: &[String],
        output: &mpsc::UnboundedSender<AppEvent>,
    ) -> Result<(), ToolError> {
        log::info!("Running: {}", self.command_line(args));

        let program = which::which(&self.program).map_err(|e| {
            ToolError::Unexpected(format!(
                "{} not found ({}), install esptool with `pip install esptool` or set tool.program in the configuration",
                self.program, e
            ))
        })?;
        log::debug!("Resolved {} to {}", self.program, program.display());

        let mut cmd = TokioCommand::new(&program);
        cmd.args(&self.prefix_args)
            .args(args)
            .env("PYTHONUNBUFFERED", "1") // Force Python to not buffer output
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            ToolError::Unexpected(format!("failed to launch {}: {}", self.program, e))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::Unexpected("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::Unexpected("stderr was not captured".to_string()))?;

        let stdout_task = tokio::spawn(forward_stream(stdout, output.clone()));
        let stderr_task = tokio::spawn(forward_stream(stderr, output.clone()));

        let status = child
            .wait()
            .await
            .map_err(|e| ToolError::Unexpected(format!("failed to wait for {}: {}", self.program, e)))?;

        let mut transcript = String::new();
        for task in [stdout_task, stderr_task] {
            match task.await {
                Ok(Ok(text)) => transcript.push_str(&text),
                Ok(Err(e)) => log::warn!("Failed to read tool output: {}", e),
                Err(e) => log::warn!("Output reader task failed: {}", e),
            }
        }

        if status.success() {
            log::debug!("{} exited successfully", self.program);
            Ok(())
        } else {
            Err(classify_failure(
                &format!("{} exited with {}", self.program, status),
                &transcript,
            ))
        }
    }
}

/// Copy a child stream to the event channel chunk by chunk, returning
/// everything that was read.
async fn forward_stream<R>(
    mut reader: R,
    output: mpsc::UnboundedSender<AppEvent>,
) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1024];
    let mut pending = Vec::new();
    let mut collected = String::new();

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);
        let chunk = take_complete_utf8(&mut pending);
        if !chunk.is_empty() {
            collected.push_str(&chunk);
            let _ = output.send(AppEvent::ToolOutput(chunk));
        }
    }

    if !pending.is_empty() {
        let chunk = String::from_utf8_lossy(&pending).into_owned();
        collected.push_str(&chunk);
        let _ = output.send(AppEvent::ToolOutput(chunk));
    }

    Ok(collected)
}

/// Split off the decodable prefix of `pending`, keeping an incomplete
/// trailing UTF-8 sequence for the next read.
fn take_complete_utf8(pending: &mut Vec<u8>) -> String {
    let cut = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => pending.len(),
    };
    let rest = pending.split_off(cut);
    let chunk = String::from_utf8_lossy(pending).into_owned();
    *pending = rest;
    chunk
}

/// Decide which kind of failure a non-zero exit was, from the tool's output
pub fn classify_failure(status: &str, output: &str) -> ToolError {
    if let Some(pos) = output.find(FATAL_MARKER) {
        let message = output[pos + FATAL_MARKER.len()..]
            .lines()
            .next()
            .unwrap_or_default()
            .trim();
        let message = if message.is_empty() { status } else { message };
        return ToolError::Fatal(message.to_string());
    }

    if let Some(line) = output
        .lines()
        .find(|line| TRANSPORT_MARKERS.iter().any(|m| line.contains(m)))
    {
        return ToolError::Transport(line.trim().to_string());
    }

    ToolError::Unexpected(status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_error_message_is_extracted() {
        let output = "Connecting........_____\n\nA fatal error occurred: Failed to connect to ESP32: No serial data received.\n";
        assert_eq!(
            classify_failure("esptool.py exited with 2", output),
            ToolError::Fatal("Failed to connect to ESP32: No serial data received.".to_string())
        );
    }

    #[test]
    fn test_serial_failure_is_transport() {
        let output = "serial.serialutil.SerialException: [Errno 2] could not open port /dev/ttyUSB9\n";
        match classify_failure("esptool.py exited with 1", output) {
            ToolError::Transport(msg) => assert!(msg.contains("/dev/ttyUSB9")),
            other => panic!("Expected transport error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_failure_is_unexpected() {
        assert_eq!(
            classify_failure("esptool.py exited with 1", "Traceback...\nKeyError: 'x'\n"),
            ToolError::Unexpected("esptool.py exited with 1".to_string())
        );
    }

    #[test]
    fn test_split_utf8_sequence_waits_for_rest() {
        let check = "✓".as_bytes();
        let mut pending = vec![b'o', b'k', check[0], check[1]];
        assert_eq!(take_complete_utf8(&mut pending), "ok");
        assert_eq!(pending.len(), 2);

        pending.push(check[2]);
        assert_eq!(take_complete_utf8(&mut pending), "✓");
        assert!(pending.is_empty());
    }

    #[test]
    fn test_command_line_includes_prefix() {
        let tool = EsptoolProcess::new("python3", vec!["-m".into(), "esptool".into()]);
        assert_eq!(
            tool.command_line(&["erase_flash".to_string()]),
            "python3 -m esptool erase_flash"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_unexpected() {
        let tool = EsptoolProcess::new("esp-flasher-definitely-not-installed", Vec::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        match tool.run(&["version".to_string()], &tx).await {
            Err(ToolError::Unexpected(msg)) => assert!(msg.contains("pip install esptool")),
            other => panic!("Expected launch failure, got: {:?}", other),
        }
    }
}
