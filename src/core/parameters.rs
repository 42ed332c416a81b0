// src/core/parameters.rs

//! Parameter declarations and argument coercion.

use crate::models::{ParamType, ParamValue, ParameterSpec};
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use thiserror::Error;

lazy_static! {
    static ref PARAMETER_DECLARATION_RE: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?::\s*([^\s:]+)\s*)?$")
            .expect("parameter declaration regex is valid");
}

/// Failures raised while declaring parameters or coercing arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// The type tag is not in the parser table.
    #[error("Unsupported parameter type '{0}'")]
    UnsupportedType(String),
    /// The declaration is not `name` or `name:type`.
    #[error("Invalid parameter declaration '{0}' (expected `name` or `name:type`)")]
    InvalidDeclaration(String),
}

/// The first argument of a line that could not be coerced to its parameter type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid argument #{position}: '{text}' (expected {expected})")]
pub struct CoercionFailure {
    /// 1-based position of the offending argument.
    pub position: usize,
    /// The argument exactly as typed.
    pub text: String,
    /// The type the parameter declares.
    pub expected: ParamType,
}

// --- TYPE TAGS ---

impl FromStr for ParamType {
    type Err = ParameterError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_lowercase().as_str() {
            "int" | "integer" | "i32" | "i64" | "long" => Ok(Self::Integer),
            "float" | "double" | "f32" | "f64" | "number" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Boolean),
            "string" | "str" | "text" => Ok(Self::Text),
            _ => Err(ParameterError::UnsupportedType(tag.trim().to_string())),
        }
    }
}

/// Parses a parameter declaration such as `"value:float"` or `"scene"`.
/// A declaration without a type tag is a text parameter.
pub fn parse_parameter_declaration(declaration: &str) -> Result<ParameterSpec, ParameterError> {
    let caps = PARAMETER_DECLARATION_RE
        .captures(declaration)
        .ok_or_else(|| ParameterError::InvalidDeclaration(declaration.to_string()))?;

    let name = caps
        .get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ParameterError::InvalidDeclaration(declaration.to_string()))?;
    let ty = match caps.get(2) {
        Some(tag) => tag.as_str().parse()?,
        None => ParamType::Text,
    };

    log::trace!("Parsed parameter declaration '{}' as {}:{}", declaration, name, ty);
    Ok(ParameterSpec { name, ty })
}

// --- PARSER TABLE ---

/// Converts one raw token to the requested type.
///
/// Pure: returns `None` when the text does not represent a value of `ty`.
pub fn coerce(raw: &str, ty: ParamType) -> Option<ParamValue> {
    match ty {
        ParamType::Integer => raw.parse::<i64>().ok().map(ParamValue::Integer),
        // `NaN`, `inf` and `Infinity` are valid floats; handlers range-check.
        ParamType::Float => raw.parse::<f64>().ok().map(ParamValue::Float),
        ParamType::Boolean => match raw.to_lowercase().as_str() {
            "true" => Some(ParamValue::Boolean(true)),
            "false" => Some(ParamValue::Boolean(false)),
            _ => None,
        },
        ParamType::Text => Some(ParamValue::Text(raw.to_string())),
    }
}

/// Coerces every argument against its positional parameter, all or nothing.
///
/// The caller has already checked that `args` and `specs` have the same length.
pub fn coerce_all<S: AsRef<str>>(
    args: &[S],
    specs: &[ParameterSpec],
) -> Result<Vec<ParamValue>, CoercionFailure> {
    args.iter()
        .zip(specs)
        .enumerate()
        .map(|(i, (raw, spec))| {
            coerce(raw.as_ref(), spec.ty).ok_or_else(|| CoercionFailure {
                position: i + 1,
                text: raw.as_ref().to_string(),
                expected: spec.ty,
            })
        })
        .collect()
}

// --- HANDLER-SIDE ACCESS ---

/// The coerced arguments handed to a command handler, in positional order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    values: Vec<ParamValue>,
}

impl CommandArgs {
    /// Wraps already coerced values.
    pub fn new(values: Vec<ParamValue>) -> Self {
        Self { values }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the value at `index` (0 is the first argument after the command name).
    pub fn get(&self, index: usize) -> Option<&ParamValue> {
        self.values.get(index)
    }

    /// Iterate over the values.
    pub fn iter(&self) -> impl Iterator<Item = &ParamValue> + '_ {
        self.values.iter()
    }

    /// The integer at `index`.
    pub fn integer(&self, index: usize) -> Result<i64> {
        match self.expect(index)? {
            ParamValue::Integer(v) => Ok(*v),
            other => Err(mismatch(index, ParamType::Integer, other)),
        }
    }

    /// The float at `index`. Integer arguments are widened.
    pub fn float(&self, index: usize) -> Result<f64> {
        match self.expect(index)? {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Integer(v) => Ok(*v as f64),
            other => Err(mismatch(index, ParamType::Float, other)),
        }
    }

    /// The boolean at `index`.
    pub fn boolean(&self, index: usize) -> Result<bool> {
        match self.expect(index)? {
            ParamValue::Boolean(v) => Ok(*v),
            other => Err(mismatch(index, ParamType::Boolean, other)),
        }
    }

    /// The text at `index`.
    pub fn text(&self, index: usize) -> Result<&str> {
        match self.expect(index)? {
            ParamValue::Text(v) => Ok(v.as_str()),
            other => Err(mismatch(index, ParamType::Text, other)),
        }
    }

    fn expect(&self, index: usize) -> Result<&ParamValue> {
        self.values
            .get(index)
            .ok_or_else(|| anyhow!("Missing argument #{} ({} provided)", index + 1, self.len()))
    }
}

fn mismatch(index: usize, expected: ParamType, found: &ParamValue) -> anyhow::Error {
    anyhow!(
        "Argument #{} is {}, not {}",
        index + 1,
        found.param_type(),
        expected
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Type Tag Tests ---

    #[test]
    fn test_type_tags_accept_aliases_case_insensitively() {
        assert_eq!("FLOAT".parse::<ParamType>().unwrap(), ParamType::Float);
        assert_eq!("double".parse::<ParamType>().unwrap(), ParamType::Float);
        assert_eq!("i32".parse::<ParamType>().unwrap(), ParamType::Integer);
        assert_eq!("Boolean".parse::<ParamType>().unwrap(), ParamType::Boolean);
        assert_eq!("str".parse::<ParamType>().unwrap(), ParamType::Text);
    }

    #[test]
    fn test_unknown_type_tag_is_rejected() {
        let err = "vector3".parse::<ParamType>().unwrap_err();
        assert_eq!(err, ParameterError::UnsupportedType("vector3".to_string()));
    }

    // --- Declaration Tests ---

    #[test]
    fn test_parse_declaration_with_and_without_type() {
        let typed = parse_parameter_declaration(" value : float ").unwrap();
        assert_eq!(typed.name, "value");
        assert_eq!(typed.ty, ParamType::Float);

        let untyped = parse_parameter_declaration("scene_name").unwrap();
        assert_eq!(untyped.name, "scene_name");
        assert_eq!(untyped.ty, ParamType::Text);
    }

    #[test]
    fn test_parse_declaration_rejects_malformed_input() {
        for bad in ["", "   ", "1value", "two words", "value:", "a:b:c"] {
            assert!(
                matches!(
                    parse_parameter_declaration(bad),
                    Err(ParameterError::InvalidDeclaration(_))
                ),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_declaration_reports_unsupported_type() {
        let result = parse_parameter_declaration("target:GameObject");
        assert_eq!(
            result,
            Err(ParameterError::UnsupportedType("GameObject".to_string()))
        );
    }

    // --- Parser Table Tests ---

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce("2.0", ParamType::Float), Some(ParamValue::Float(2.0)));
        assert_eq!(coerce("-1e3", ParamType::Float), Some(ParamValue::Float(-1000.0)));
        assert_eq!(coerce("42", ParamType::Integer), Some(ParamValue::Integer(42)));
        assert_eq!(coerce("+7", ParamType::Integer), Some(ParamValue::Integer(7)));
        assert_eq!(coerce("4.5", ParamType::Integer), None);
        assert_eq!(coerce("abc", ParamType::Float), None);
    }

    #[test]
    fn test_coerce_accepts_non_finite_floats() {
        assert_eq!(
            coerce("Infinity", ParamType::Float),
            Some(ParamValue::Float(f64::INFINITY))
        );
        assert_eq!(
            coerce("-inf", ParamType::Float),
            Some(ParamValue::Float(f64::NEG_INFINITY))
        );
        assert!(matches!(
            coerce("NaN", ParamType::Float),
            Some(ParamValue::Float(v)) if v.is_nan()
        ));
        assert_eq!(coerce("nan", ParamType::Integer), None);
    }

    #[test]
    fn test_coerce_booleans_and_text() {
        assert_eq!(coerce("TRUE", ParamType::Boolean), Some(ParamValue::Boolean(true)));
        assert_eq!(coerce("false", ParamType::Boolean), Some(ParamValue::Boolean(false)));
        assert_eq!(coerce("1", ParamType::Boolean), None);
        assert_eq!(
            coerce("Level_01", ParamType::Text),
            Some(ParamValue::Text("Level_01".to_string()))
        );
    }

    #[test]
    fn test_coerce_all_reports_first_failure_position() {
        let specs = vec![
            ParameterSpec { name: "count".to_string(), ty: ParamType::Integer },
            ParameterSpec { name: "scale".to_string(), ty: ParamType::Float },
            ParameterSpec { name: "flag".to_string(), ty: ParamType::Boolean },
        ];

        let ok = coerce_all(&["3", "0.5", "true"], &specs).unwrap();
        assert_eq!(ok.len(), 3);

        let err = coerce_all(&["3", "fast", "maybe"], &specs).unwrap_err();
        assert_eq!(
            err,
            CoercionFailure {
                position: 2,
                text: "fast".to_string(),
                expected: ParamType::Float,
            }
        );
    }

    // --- CommandArgs Tests ---

    #[test]
    fn test_command_args_typed_getters() {
        let args = CommandArgs::new(vec![
            ParamValue::Integer(3),
            ParamValue::Text("menu".to_string()),
        ]);

        assert_eq!(args.integer(0).unwrap(), 3);
        assert_eq!(args.float(0).unwrap(), 3.0);
        assert_eq!(args.text(1).unwrap(), "menu");
        assert!(args.boolean(1).is_err());
        assert!(args.integer(2).is_err());
    }
}
