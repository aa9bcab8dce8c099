use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    MissingSeparator(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// One `-S key=value` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValue {
    pub key: String,
    pub value: String,
}

/// Splits on the first `=`; the value may itself contain `=`.
pub fn parse_set_value(input: &str) -> Result<SetValue, ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(input.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            input: input.to_string(),
        });
    }

    Ok(SetValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

pub fn parse_set_values(inputs: &[String]) -> Result<Vec<SetValue>, ParseError> {
    inputs.iter().map(|s| parse_set_value(s)).collect()
}
