pub mod config;
pub mod doctor;
pub mod lookup;
pub mod payment_methods;
pub mod report;
pub mod scenarios;

use railrefund_core::PaymentMethod;
use railrefund_gateway::GatewayError;
use serde::Serialize;

pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_UPSTREAM: u8 = 3;
pub const EXIT_EVALUATION: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub(crate) fn from_gateway(command: &str, error: &GatewayError) -> Self {
        let (error_class, exit_code) = match error {
            GatewayError::MissingApiKey | GatewayError::Client(_) => {
                ("config_validation", EXIT_INVALID_INPUT)
            }
            GatewayError::Rejected(_) => ("pnr_not_found", EXIT_UPSTREAM),
            GatewayError::Decode(_) | GatewayError::Normalize(_) => {
                ("invalid_record", EXIT_EVALUATION)
            }
            GatewayError::Timeout { .. }
            | GatewayError::Transport(_)
            | GatewayError::Status { .. }
            | GatewayError::Refused { .. } => ("upstream", EXIT_UPSTREAM),
        };

        Self::failure(command, error_class, format!("{} ({error})", error.user_message()), exit_code)
    }
}

/// Falls back to the configured default when no method was given on the command line.
pub(crate) fn resolve_payment_method(
    command: &str,
    raw: Option<&str>,
    default: PaymentMethod,
) -> Result<PaymentMethod, CommandResult> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse::<PaymentMethod>().map_err(|error| {
            CommandResult::failure(command, "invalid_input", error.to_string(), EXIT_INVALID_INPUT)
        }),
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
