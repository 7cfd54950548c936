//! Module parameters and the validated invocation request
//!
//! Parameters arrive as the JSON object Ansible writes for binary modules.
//! Validation mirrors the module's argument spec: `name` is a required,
//! non-empty string and `script_args` an optional list of strings.

use serde_json::{Map, Value};

use crate::error::{KrunError, Result};

/// Module parameter naming the script to run
pub const PARAM_NAME: &str = "name";
/// Module parameter carrying extra script arguments
pub const PARAM_SCRIPT_ARGS: &str = "script_args";
/// Internal Ansible key signalling check mode
pub const PARAM_CHECK_MODE: &str = "_ansible_check_mode";

const INTERNAL_PREFIX: &str = "_ansible_";
const WRAPPED_ARGS_KEY: &str = "ANSIBLE_MODULE_ARGS";

/// A validated request: script name plus ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    script_name: String,
    arguments: Vec<String>,
}

impl InvocationRequest {
    /// Build a request, rejecting an empty script name
    pub fn new<I, S>(script_name: impl Into<String>, arguments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script_name = script_name.into();
        if script_name.trim().is_empty() {
            return Err(KrunError::invalid_parameter(
                PARAM_NAME,
                "must be a non-empty string",
            ));
        }

        Ok(Self {
            script_name,
            arguments: arguments.into_iter().map(Into::into).collect(),
        })
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// Everything the module reads from its parameter file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleParams {
    pub request: InvocationRequest,
    pub check_mode: bool,
}

impl ModuleParams {
    /// Parse the contents of an Ansible module args file
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| KrunError::json("module arguments", e))?;
        Self::from_value(value)
    }

    /// Validate an already-decoded parameter object.
    ///
    /// Accepts both the bare object and the `{"ANSIBLE_MODULE_ARGS": {...}}`
    /// wrapper.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut params = match value {
            Value::Object(map) => map,
            other => {
                return Err(KrunError::invalid_parameter(
                    "module arguments",
                    format!("expected a JSON object, got {}", type_name(&other)),
                ))
            }
        };

        if params.len() == 1 && matches!(params.get(WRAPPED_ARGS_KEY), Some(Value::Object(_))) {
            if let Some(Value::Object(inner)) = params.remove(WRAPPED_ARGS_KEY) {
                params = inner;
            }
        }

        reject_unsupported(&params)?;

        let check_mode = match params.get(PARAM_CHECK_MODE) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(KrunError::invalid_parameter(
                    PARAM_CHECK_MODE,
                    format!("expected a boolean, got {}", type_name(other)),
                ))
            }
        };

        let name = match params.get(PARAM_NAME) {
            None | Some(Value::Null) => return Err(KrunError::missing_field(PARAM_NAME)),
            Some(value) => scalar_to_string(PARAM_NAME, value)?,
        };

        let arguments = match params.get(PARAM_SCRIPT_ARGS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| scalar_to_string(PARAM_SCRIPT_ARGS, item))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(KrunError::invalid_parameter(
                    PARAM_SCRIPT_ARGS,
                    format!("expected a list, got {}", type_name(other)),
                ))
            }
        };

        Ok(Self {
            request: InvocationRequest::new(name, arguments)?,
            check_mode,
        })
    }
}

fn reject_unsupported(params: &Map<String, Value>) -> Result<()> {
    let mut names: Vec<String> = params
        .keys()
        .filter(|key| {
            !key.starts_with(INTERNAL_PREFIX)
                && key.as_str() != PARAM_NAME
                && key.as_str() != PARAM_SCRIPT_ARGS
        })
        .cloned()
        .collect();

    if names.is_empty() {
        return Ok(());
    }
    names.sort();
    Err(KrunError::UnsupportedParameters { names })
}

/// Convert a scalar to its string form; Ansible stringifies bools as `True`/`False`
fn scalar_to_string(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        other => Err(KrunError::invalid_parameter(
            field,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
