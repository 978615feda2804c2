use chrono::Local;
use railrefund_core::config::{AppConfig, LoadOptions};
use railrefund_core::PnrNumber;
use railrefund_gateway::{PnrGateway, RapidApiGateway};

use crate::commands::{report, resolve_payment_method, CommandResult, EXIT_INVALID_INPUT};

const COMMAND: &str = "lookup";

pub fn run(pnr: &str, payment_method: Option<&str>, json_output: bool) -> CommandResult {
    let pnr = match PnrNumber::parse(pnr) {
        Ok(pnr) => pnr,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_input",
                error.to_string(),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                error.to_string(),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let payment_method =
        match resolve_payment_method(COMMAND, payment_method, config.refund.default_payment_method)
        {
            Ok(method) => method,
            Err(failure) => return failure,
        };

    let gateway = match RapidApiGateway::from_config(&config.gateway) {
        Ok(gateway) => gateway,
        Err(error) => return CommandResult::from_gateway(COMMAND, &error),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    let reservation = match runtime.block_on(gateway.lookup(&pnr)) {
        Ok(reservation) => reservation,
        Err(error) => return CommandResult::from_gateway(COMMAND, &error),
    };

    report::evaluate(COMMAND, &reservation, payment_method, Local::now().naive_local(), json_output)
}
