use railrefund_core::config::{AppConfig, LoadOptions};
use railrefund_gateway::RapidApiGateway;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code is non-zero when any check fails. No upstream request is made.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let key_check = check_api_key(&config);
            let key_ready = key_check.status == CheckStatus::Pass;
            checks.push(key_check);
            checks.push(if key_ready {
                check_gateway_client(&config)
            } else {
                skipped("gateway_client", "skipped because no API key is configured")
            });
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("api_key_readiness", "skipped because configuration did not load"));
            checks.push(skipped("gateway_client", "skipped because configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_api_key(config: &AppConfig) -> DoctorCheck {
    match config.gateway.api_key_value() {
        Some(_) => DoctorCheck {
            name: "api_key_readiness",
            status: CheckStatus::Pass,
            details: format!("API key configured for `{}`", config.gateway.api_host),
        },
        None => DoctorCheck {
            name: "api_key_readiness",
            status: CheckStatus::Fail,
            details: "set RAILREFUND_GATEWAY_API_KEY or RAPIDAPI_KEY".to_string(),
        },
    }
}

fn check_gateway_client(config: &AppConfig) -> DoctorCheck {
    match RapidApiGateway::from_config(&config.gateway) {
        Ok(_) => DoctorCheck {
            name: "gateway_client",
            status: CheckStatus::Pass,
            details: format!(
                "client ready for {} (timeout {}s, {} retry)",
                config.gateway.base_url, config.gateway.timeout_secs, config.gateway.max_retries
            ),
        },
        Err(error) => {
            DoctorCheck { name: "gateway_client", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn skipped(name: &'static str, details: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: details.to_string() }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
