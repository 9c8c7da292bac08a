//! Configuration validation utilities for the comedor service.
//!
//! This module provides a small framework for validating the TOML
//! configuration tables handed to pluggable implementations: a schema of
//! required and optional fields, typed field checks with bounds, and
//! detailed error reporting with dotted field paths.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Represents the type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	/// A string value.
	String,
	/// An integer value with optional inclusive bounds.
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	/// A boolean value.
	Boolean,
	/// An array of values, all of the same type.
	Array(Box<FieldType>),
	/// A nested table validated against its own schema. A table with an
	/// empty schema accepts arbitrary keys.
	Table(Schema),
}

impl FieldType {
	/// Checks that a TOML value matches this field type.
	///
	/// Integer bounds are inclusive; arrays check every element; nested
	/// tables delegate to their schema with the field path prefixed.
	fn check(&self, field: &str, value: &toml::Value) -> Result<(), ValidationError> {
		let mismatch = |expected: &str| ValidationError::TypeMismatch {
			field: field.to_string(),
			expected: expected.to_string(),
			actual: value.type_str().to_string(),
		};

		match self {
			FieldType::String => {
				value.as_str().ok_or_else(|| mismatch("string"))?;
			}
			FieldType::Boolean => {
				value.as_bool().ok_or_else(|| mismatch("boolean"))?;
			}
			FieldType::Integer { min, max } => {
				let n = value.as_integer().ok_or_else(|| mismatch("integer"))?;
				if min.is_some_and(|lo| n < lo) || max.is_some_and(|hi| n > hi) {
					return Err(ValidationError::InvalidValue {
						field: field.to_string(),
						message: format!("value {} is out of bounds", n),
					});
				}
			}
			FieldType::Array(inner) => {
				let items = value.as_array().ok_or_else(|| mismatch("array"))?;
				for (i, item) in items.iter().enumerate() {
					inner.check(&format!("{}[{}]", field, i), item)?;
				}
			}
			FieldType::Table(schema) => {
				schema.validate(value).map_err(|e| e.prefixed(field))?;
			}
		}

		Ok(())
	}
}

impl ValidationError {
	/// Prefixes the field path of a nested validation error.
	fn prefixed(self, parent: &str) -> Self {
		match self {
			ValidationError::MissingField(f) => {
				ValidationError::MissingField(format!("{}.{}", parent, f))
			}
			ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
				field: format!("{}.{}", parent, field),
				message,
			},
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => ValidationError::TypeMismatch {
				field: format!("{}.{}", parent, field),
				expected,
				actual,
			},
		}
	}
}

/// Represents a named field in a configuration schema.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Defines a validation schema for a TOML configuration table.
///
/// A schema consists of fields that must be present and fields that may be
/// present. Schemas can be nested through `FieldType::Table` to validate
/// hierarchical configurations.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// The value must be a table; required fields must be present and
	/// well-typed; optional fields are checked only when present. Keys not
	/// named by the schema are accepted.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.field_type.check(&field.name, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.field_type.check(&field.name, value)?;
			}
		}

		Ok(())
	}
}

/// Trait defining a configuration schema that can validate TOML values.
///
/// Implemented by each pluggable component so its configuration table can
/// be checked before the component is used.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(raw: &str) -> toml::Value {
		raw.parse().unwrap()
	}

	#[test]
	fn test_required_field_missing() {
		let schema = Schema::new(vec![Field::new("path", FieldType::String)], vec![]);
		let err = schema.validate(&parse("other = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "path"));
	}

	#[test]
	fn test_integer_bounds() {
		let schema = Schema::new(
			vec![Field::new(
				"hour",
				FieldType::Integer {
					min: Some(0),
					max: Some(23),
				},
			)],
			vec![],
		);
		assert!(schema.validate(&parse("hour = 14")).is_ok());
		assert!(schema.validate(&parse("hour = 24")).is_err());
	}

	#[test]
	fn test_nested_table_path_in_error() {
		let inner = Schema::new(vec![Field::new("name", FieldType::String)], vec![]);
		let schema = Schema::new(vec![Field::new("menu", FieldType::Table(inner))], vec![]);
		let err = schema.validate(&parse("[menu]\nother = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "menu.name"));
	}

	#[test]
	fn test_array_elements_checked() {
		let schema = Schema::new(
			vec![Field::new(
				"dishes",
				FieldType::Array(Box::new(FieldType::String)),
			)],
			vec![],
		);
		assert!(schema.validate(&parse("dishes = [\"a\", \"b\"]")).is_ok());
		assert!(schema.validate(&parse("dishes = [1, 2]")).is_err());
	}
}
