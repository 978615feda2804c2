use railrefund_core::domain::reservation::check_fare_range;
use railrefund_core::{total_payable, PaymentMethodCatalog};
use rust_decimal::Decimal;

use crate::commands::{report::rupees, CommandResult, EXIT_INVALID_INPUT};

pub fn run(amount: Option<&str>) -> CommandResult {
    let amount = match amount.map(parse_amount).transpose() {
        Ok(amount) => amount,
        Err(message) => {
            return CommandResult::failure(
                "payment-methods",
                "invalid_input",
                message,
                EXIT_INVALID_INPUT,
            )
        }
    };

    let catalog = PaymentMethodCatalog;
    let mut lines = vec![match amount {
        Some(amount) => format!("payment methods (charges on {}):", rupees(amount)),
        None => "payment methods:".to_string(),
    }];

    for method in catalog.methods() {
        let line = match amount {
            Some(amount) => {
                let charge = catalog.charges(amount, *method);
                format!(
                    "- {} ({}): charges {}, total payable {}",
                    method.slug(),
                    method.name(),
                    rupees(charge),
                    rupees(total_payable(amount, *method))
                )
            }
            None => format!("- {} ({})", method.slug(), method.name()),
        };
        lines.push(line);
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let amount = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    check_fare_range(amount, raw).map_err(|error| error.to_string())?;
    Ok(amount)
}
