use chrono::{DateTime, Utc};

/// A coerced property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	/// Unset property or removed attribute.
	#[default]
	Null,
	String(String),
	/// Numeric value; NaN is a legitimate result of a failed numeric parse.
	Number(f64),
	Bool(bool),
	Json(serde_json::Value),
	/// Calendar instant; `None` is an invalid date.
	Date(Option<DateTime<Utc>>),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_json(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Json(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the date payload; the outer `None` means "not a date".
	pub fn as_date(&self) -> Option<Option<DateTime<Utc>>> {
		match self {
			Self::Date(d) => Some(*d),
			_ => None,
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		Self::Json(value)
	}
}
