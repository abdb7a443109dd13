use std::fmt;

use crate::client::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Failure,
    InvalidArgs,
    ConnectionFailed,
    BackendFailed,
    MalformedResponse,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
            ExitCode::InvalidArgs => 2,
            ExitCode::ConnectionFailed => 10,
            ExitCode::BackendFailed => 20,
            ExitCode::MalformedResponse => 30,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

/// Marks a failure whose message has already been shown to the user.
#[derive(Debug)]
pub struct Reported(pub ExitCode);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0.as_i32())
    }
}

impl std::error::Error for Reported {}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    if let Some(Reported(code)) = err.downcast_ref::<Reported>() {
        return code.as_i32();
    }
    if let Some(client) = err.downcast_ref::<ClientError>() {
        return client_exit_code(client).as_i32();
    }
    ExitCode::Failure.as_i32()
}

pub fn client_exit_code(err: &ClientError) -> ExitCode {
    match err {
        ClientError::Transport(_) => ExitCode::ConnectionFailed,
        ClientError::Backend { .. } => ExitCode::BackendFailed,
        ClientError::MalformedResponse(_) => ExitCode::MalformedResponse,
    }
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

pub fn reported(code: ExitCode) -> anyhow::Error {
    Reported(code).into()
}

pub fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Reported>().is_some()
}

pub fn query_failed(err: ClientError) -> anyhow::Error {
    ExitError::new(client_exit_code(&err), anyhow::Error::new(err)).into()
}
