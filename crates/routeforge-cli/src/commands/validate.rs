// Check a value against validation rules

use routeforge_config::ForgeConfig;
use routeforge_engine::{ForgeContext, Pipeline};
use serde_json::Value;

use super::Command;
use crate::error::{CliError, CliResult};
use crate::output;

/// `routeforge validate --rule <name> --value <v>`
pub struct ValidateCommand {
    pub rules: Vec<String>,
    pub value: String,
    pub field: String,
    /// Parse `value` as a JSON literal
    pub json_value: bool,
}

impl ValidateCommand {
    fn parsed_value(&self) -> CliResult<Value> {
        if self.json_value {
            serde_json::from_str(&self.value).map_err(|e| CliError::InvalidArgument {
                message: format!("--value is not valid JSON: {}", e),
            })
        } else {
            Ok(Value::String(self.value.clone()))
        }
    }
}

impl Command for ValidateCommand {
    fn execute(&self, config: &ForgeConfig) -> CliResult<()> {
        let value = self.parsed_value()?;
        let ctx = ForgeContext::new(config.clone())?;
        let mut pipeline = Pipeline::new(&ctx);
        let rules: Vec<&str> = self.rules.iter().map(String::as_str).collect();
        let result = pipeline.validate(&self.field, &value, &rules)?;
        ctx.shutdown()?;

        if result.valid {
            output::print_success(&format!(
                "{} passed {}",
                self.field,
                result.applied_rules.join(", ")
            ));
            return Ok(());
        }

        for issue in &result.errors {
            output::print_error(&format!("[{}] {}: {}", issue.code, issue.rule, issue.message));
        }
        Err(CliError::ValidationFailed {
            field: self.field.clone(),
            count: result.errors.len(),
        })
    }
}
