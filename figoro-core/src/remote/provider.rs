//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `figoro-provider-google`) using JSON over stdin/stdout.
//!
//! Providers manage their own credentials and tokens. figoro only passes
//! the account identifier and the query along.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{FigoroError, FigoroResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct Provider {
    name: String,
    /// Program and arguments overriding the PATH lookup
    command: Option<(PathBuf, Vec<String>)>,
    timeout: Duration,
}

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider {
            name: name.to_string(),
            command: None,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Run `program args..` instead of looking up `figoro-provider-<name>` in PATH.
    pub fn with_command(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.command = Some((program.into(), args));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn program(&self) -> FigoroResult<(PathBuf, Vec<String>)> {
        if let Some((program, args)) = &self.command {
            return Ok((program.clone(), args.clone()));
        }

        let binary_name = format!("figoro-provider-{}", self.name);
        let binary_path = which::which(&binary_name)
            .map_err(|_| FigoroError::ProviderNotInstalled(binary_name))?;
        Ok((binary_path, Vec::new()))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> FigoroResult<C::Response> {
        timeout(self.timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| FigoroError::ProviderTimeout(self.timeout))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> FigoroResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| FigoroError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| FigoroError::Serialization(e.to_string()))?;

        let (binary_path, args) = self.program()?;
        tracing::trace!(provider = %self.name, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .args(&args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FigoroError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FigoroError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(FigoroError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(FigoroError::Provider("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| FigoroError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(FigoroError::Provider(error)),
        }
    }
}
