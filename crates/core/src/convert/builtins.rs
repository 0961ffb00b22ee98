use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{Converter, ConverterTable};
use crate::value::Value;

pub(super) fn install(table: &mut ConverterTable) {
	table.insert("string", Converter::identity());
	table.insert("integer", Converter::infallible(|raw| Value::Number(parse_int(raw))));
	table.insert("float", Converter::infallible(|raw| Value::Number(parse_float(raw))));
	table.insert("number", Converter::infallible(|raw| Value::Number(parse_number(raw))));
	table.insert(
		"json",
		Converter::new(|raw| Ok(Value::Json(serde_json::from_str(raw)?))),
	);
	table.insert(
		"boolean",
		Converter::infallible(|raw| Value::Bool(raw.eq_ignore_ascii_case("true"))),
	);
	table.insert("date", Converter::infallible(|raw| Value::Date(parse_date(raw))));
	table.insert("ticks", Converter::infallible(|raw| Value::Date(parse_ticks(raw))));
	// Raw attribute text is never null here, so this is always true.
	table.insert("exists", Converter::infallible(|_| Value::Bool(true)));
}

/// Leading-integer parse: optional sign, decimal digits or a `0x` hex prefix.
///
/// Trailing garbage is ignored; NaN when no digit is found.
pub fn parse_int(raw: &str) -> f64 {
	let s = raw.trim_start();
	let (sign, s) = split_sign(s);
	let (radix, s) = match s.get(..2) {
		Some("0x" | "0X") => (16, &s[2..]),
		_ => (10, s),
	};
	let digits = s.find(|c: char| !c.is_digit(radix)).map_or(s, |end| &s[..end]);
	match radix_value(digits, radix) {
		Some(magnitude) => sign * magnitude,
		None => f64::NAN,
	}
}

/// Leading-decimal parse: sign, digits, fraction, exponent or `Infinity`.
///
/// Trailing garbage is ignored; NaN when no numeric prefix is found.
pub fn parse_float(raw: &str) -> f64 {
	let s = raw.trim_start();
	let (sign, s) = split_sign(s);
	if s.starts_with("Infinity") {
		return sign * f64::INFINITY;
	}

	let bytes = s.as_bytes();
	let integer_end = scan_digits(bytes, 0);
	let integer = &s[..integer_end];
	let mut end = integer_end;
	let mut fraction = "";
	if bytes.get(end) == Some(&b'.') {
		let fraction_end = scan_digits(bytes, end + 1);
		fraction = &s[end + 1..fraction_end];
		end = fraction_end;
	}
	if integer.is_empty() && fraction.is_empty() {
		return f64::NAN;
	}

	let mut exponent = "";
	if matches!(bytes.get(end), Some(b'e' | b'E')) {
		let digits_start = match bytes.get(end + 1) {
			Some(b'+' | b'-') => end + 2,
			_ => end + 1,
		};
		let digits_end = scan_digits(bytes, digits_start);
		if digits_end > digits_start {
			exponent = &s[end + 1..digits_end];
		}
	}

	let integer = if integer.is_empty() { "0" } else { integer };
	let fraction = if fraction.is_empty() { "0" } else { fraction };
	let literal = if exponent.is_empty() {
		format!("{integer}.{fraction}")
	} else {
		format!("{integer}.{fraction}e{exponent}")
	};
	literal.parse::<f64>().map_or(f64::NAN, |magnitude| sign * magnitude)
}

/// Whole-string numeric parse.
///
/// Surrounding whitespace is ignored, the empty string is zero, `0x`/`0o`/`0b`
/// select a radix and anything else that is not a decimal literal is NaN.
pub fn parse_number(raw: &str) -> f64 {
	let s = raw.trim();
	if s.is_empty() {
		return 0.0;
	}
	match s {
		"Infinity" | "+Infinity" => return f64::INFINITY,
		"-Infinity" => return f64::NEG_INFINITY,
		_ => {}
	}
	for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
		if let Some(digits) = s.strip_prefix(prefix) {
			let valid = !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
			return if valid { radix_value(digits, radix).unwrap_or(f64::NAN) } else { f64::NAN };
		}
	}
	// Rules out the `inf`/`nan` spellings `f64::from_str` would otherwise accept.
	if !s.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) {
		return f64::NAN;
	}
	s.parse().unwrap_or(f64::NAN)
}

/// Calendar date parse, interpreted as UTC when no offset is given.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
	let s = raw.trim();
	if let Ok(date) = DateTime::parse_from_rfc3339(s) {
		return Some(date.with_timezone(&Utc));
	}
	if let Ok(date) = DateTime::parse_from_rfc2822(s) {
		return Some(date.with_timezone(&Utc));
	}
	for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
		if let Ok(date) = NaiveDateTime::parse_from_str(s, format) {
			return Some(date.and_utc());
		}
	}
	NaiveDate::parse_from_str(s, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|date| date.and_utc())
}

fn parse_ticks(raw: &str) -> Option<DateTime<Utc>> {
	let millis = parse_number(raw);
	if !millis.is_finite() {
		return None;
	}
	DateTime::from_timestamp_millis(millis.trunc() as i64)
}

fn split_sign(s: &str) -> (f64, &str) {
	match s.as_bytes().first() {
		Some(b'-') => (-1.0, &s[1..]),
		Some(b'+') => (1.0, &s[1..]),
		_ => (1.0, s),
	}
}

fn scan_digits(bytes: &[u8], start: usize) -> usize {
	let mut end = start;
	while bytes.get(end).is_some_and(u8::is_ascii_digit) {
		end += 1;
	}
	end
}

fn radix_value(digits: &str, radix: u32) -> Option<f64> {
	if digits.is_empty() {
		return None;
	}
	digits.chars().try_fold(0.0_f64, |acc, c| {
		c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
	})
}
