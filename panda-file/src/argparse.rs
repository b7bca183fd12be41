//! A small `--name value` / `--name=value` command line argument parser,
//! used to drive the assembler and dump binaries instead of pulling in an
//! external argument-parsing crate (see DESIGN.md for why).

use std::collections::HashMap;

const DOUBLE_DASH: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
	String,
	Integer,
	Double,
	Bool,
	List,
	Uint32,
	Uint64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
	String(String),
	Integer(i64),
	Double(f64),
	Bool(bool),
	List(Vec<String>),
	Uint32(u32),
	Uint64(u64),
}

impl ArgValue {
	fn kind(&self) -> ArgKind {
		match self {
			ArgValue::String(_) => ArgKind::String,
			ArgValue::Integer(_) => ArgKind::Integer,
			ArgValue::Double(_) => ArgKind::Double,
			ArgValue::Bool(_) => ArgKind::Bool,
			ArgValue::List(_) => ArgKind::List,
			ArgValue::Uint32(_) => ArgKind::Uint32,
			ArgValue::Uint64(_) => ArgKind::Uint64,
		}
	}
}

/// A declared argument: its name, description, default and current value.
#[derive(Debug, Clone)]
pub struct Arg {
	name: String,
	desc: String,
	default: ArgValue,
	value: ArgValue,
	was_set: bool,
	min_max: Option<(i64, i64)>,
	delimiter: Option<String>,
}

impl Arg {
	pub fn new(name: impl Into<String>, default: ArgValue, desc: impl Into<String>) -> Self {
		Self { name: name.into(), desc: desc.into(), default: default.clone(), value: default, was_set: false, min_max: None, delimiter: None }
	}

	pub fn with_range(name: impl Into<String>, default: ArgValue, desc: impl Into<String>, min: i64, max: i64) -> Self {
		let mut arg = Self::new(name, default, desc);
		arg.min_max = Some((min, max));
		arg
	}

	pub fn list(name: impl Into<String>, default: Vec<String>, desc: impl Into<String>, delimiter: impl Into<String>) -> Self {
		let mut arg = Self::new(name, ArgValue::List(default), desc);
		arg.delimiter = Some(delimiter.into());
		arg
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn desc(&self) -> &str {
		&self.desc
	}

	pub fn kind(&self) -> ArgKind {
		self.default.kind()
	}

	pub fn value(&self) -> &ArgValue {
		&self.value
	}

	pub fn default_value(&self) -> &ArgValue {
		&self.default
	}

	pub fn was_set(&self) -> bool {
		self.was_set
	}

	fn set(&mut self, value: ArgValue) {
		self.value = value;
		self.was_set = true;
	}

	fn reset_default(&mut self) {
		self.value = self.default.clone();
	}

	fn in_range(&self, num: i64) -> bool {
		match self.min_max {
			Some((min, max)) => num >= min && num <= max,
			None => true,
		}
	}
}

fn starts_with(s: &str, prefix: &str) -> bool {
	s.starts_with(prefix)
}

fn is_integer_literal(s: &str) -> bool {
	if s.is_empty() {
		return false;
	}
	let rest = s.strip_prefix('-').unwrap_or(s);
	let rest = rest.strip_prefix("0x").unwrap_or(rest);
	!rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_uint_literal(s: &str) -> bool {
	if s.is_empty() {
		return false;
	}
	let rest = s.strip_prefix("0x").unwrap_or(s);
	!rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_rational_literal(s: &str) -> bool {
	if s.is_empty() {
		return false;
	}
	let rest = s.strip_prefix('-').unwrap_or(s);
	!rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn parse_int_literal(s: &str) -> Option<i64> {
	if let Some(hex) = s.strip_prefix("0x") {
		i64::from_str_radix(hex, 16).ok()
	} else if let Some(hex) = s.strip_prefix("-0x") {
		i64::from_str_radix(hex, 16).ok().map(|v| -v)
	} else {
		s.parse::<i64>().ok()
	}
}

fn parse_uint_literal(s: &str) -> Option<u64> {
	if let Some(hex) = s.strip_prefix("0x") {
		u64::from_str_radix(hex, 16).ok()
	} else {
		s.parse::<u64>().ok()
	}
}

/// Parses a flat `Vec<String>` of command line tokens against a set of
/// declared [`Arg`]s, in the grammar `--name value`, `--name=value`,
/// `--name` (bool flags only), a trailing unflagged run of positional "tail"
/// arguments, and a final `--` remainder capturing everything after it.
#[derive(Debug, Default)]
pub struct ArgParser {
	args: Vec<Arg>,
	by_name: HashMap<String, usize>,
	tail: Vec<usize>,
	tail_flag: bool,
	remainder_flag: bool,
	remainder: Vec<String>,
	errors: Vec<String>,
}

impl ArgParser {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, arg: Arg) -> bool {
		if self.by_name.contains_key(&arg.name) {
			self.errors.push(format!("pandargs: Argument {} has duplicate", arg.name));
			return false;
		}
		let idx = self.args.len();
		self.by_name.insert(arg.name.clone(), idx);
		self.args.push(arg);
		true
	}

	pub fn push_back_tail(&mut self, arg: Arg) -> bool {
		let idx = self.args.len();
		self.args.push(arg);
		self.tail.push(idx);
		true
	}

	pub fn pop_back_tail(&mut self) -> bool {
		self.tail.pop().is_some()
	}

	pub fn clear_tail(&mut self) {
		self.tail.clear();
	}

	pub fn enable_tail(&mut self) {
		self.tail_flag = true;
	}

	pub fn disable_tail(&mut self) {
		self.tail_flag = false;
	}

	pub fn is_tail_enabled(&self) -> bool {
		self.tail_flag
	}

	pub fn tail_size(&self) -> usize {
		self.tail.len()
	}

	pub fn enable_remainder(&mut self) {
		self.remainder_flag = true;
	}

	pub fn disable_remainder(&mut self) {
		self.remainder_flag = false;
	}

	pub fn is_remainder_enabled(&self) -> bool {
		self.remainder_flag
	}

	pub fn remainder(&self) -> &[String] {
		&self.remainder
	}

	pub fn get_arg(&self, name: &str) -> Option<&Arg> {
		self.by_name.get(name).map(|&idx| &self.args[idx])
	}

	pub fn is_arg_set(&self, name: &str) -> bool {
		self.get_arg(name).map(|a| a.was_set).unwrap_or(false)
	}

	pub fn errors(&self) -> &[String] {
		&self.errors
	}

	pub fn error_string(&self) -> String {
		self.errors.iter().map(|e| format!("{e}\n")).collect()
	}

	pub fn help_string(&self) -> String {
		let mut help = String::new();
		for (name, &idx) in &self.by_name {
			help.push_str(&format!("{DOUBLE_DASH}{name}: {}\n", self.args[idx].desc));
		}
		if !self.tail.is_empty() {
			help.push_str("Tail arguments:\n");
			for &idx in &self.tail {
				help.push_str(&format!("{}: {}\n", self.args[idx].name, self.args[idx].desc));
			}
		}
		help
	}

	/// Parses `value` directly into `arg`, as if it had been passed as
	/// `--<arg> <value>` on the command line.
	pub fn parse_single_arg(&mut self, name: &str, value: &str) -> bool {
		let idx = match self.by_name.get(name) {
			Some(&idx) => idx,
			None => return false,
		};
		let mut tokens = vec![value.to_string()];
		let mut pos = 0usize;
		self.consume_value(idx, &mut tokens, &mut pos, false);
		self.errors.is_empty()
	}

	pub fn parse(&mut self, argv: &[String]) -> bool {
		self.errors.clear();
		self.remainder.clear();
		for &idx in &self.tail.clone() {
			self.args[idx].reset_default();
		}

		let mut tokens: Vec<String> = argv.to_vec();
		let mut pos = 0usize;
		let mut tail_parsed = false;

		while pos < tokens.len() {
			let token = tokens[pos].clone();

			if token == DOUBLE_DASH {
				if !self.remainder_flag {
					self.errors.push("pandargs: Remainder arguments are not enabled".into());
					self.errors.push(format!("pandargs: Remainder found at literal \"{token}\""));
					return false;
				}
				pos += 1;
				self.remainder = tokens[pos..].to_vec();
				pos = tokens.len();
				continue;
			}

			if let Some(name) = token.strip_prefix(DOUBLE_DASH) {
				if name.is_empty() {
					unreachable!("handled above");
				}
				let (name, inline_value) = match name.split_once('=') {
					Some((n, v)) => (n.to_string(), Some(v.to_string())),
					None => (name.to_string(), None),
				};
				let idx = match self.by_name.get(&name) {
					Some(&idx) => idx,
					None => {
						self.errors.push(format!("pandargs: Invalid option \"{name}\""));
						return false;
					},
				};
				if let Some(value) = inline_value {
					tokens[pos] = value;
					self.consume_value(idx, &mut tokens, &mut pos, true);
				} else {
					pos += 1;
					self.consume_value(idx, &mut tokens, &mut pos, false);
				}
				if !self.errors.is_empty() {
					return false;
				}
				continue;
			}

			// bare token: start of tail arguments
			if !self.tail_flag {
				self.errors.push("pandargs: Tail arguments are not enabled".into());
				self.errors.push(format!("pandargs: Tail found at literal \"{token}\""));
				return false;
			}
			if tail_parsed {
				self.errors.push("pandargs: Too many tail arguments".into());
				return false;
			}
			self.parse_tail(&mut tokens, &mut pos);
			tail_parsed = true;
			if !self.errors.is_empty() {
				return false;
			}
			if pos < tokens.len() && tokens[pos] != DOUBLE_DASH && !self.remainder_flag {
				self.errors.push("pandargs: Too many tail arguments given".into());
				return false;
			}
		}
		true
	}

	fn parse_tail(&mut self, tokens: &mut [String], pos: &mut usize) {
		for &idx in &self.tail.clone() {
			self.consume_value(idx, tokens, pos, false);
			if *pos >= tokens.len() || !self.errors.is_empty() {
				break;
			}
		}
	}

	fn consume_value(&mut self, idx: usize, tokens: &mut [String], pos: &mut usize, had_equals: bool) {
		let kind = self.args[idx].kind();
		if kind == ArgKind::Bool {
			self.consume_bool(idx, tokens, pos, had_equals);
			return;
		}
		if *pos >= tokens.len() {
			return;
		}
		match kind {
			ArgKind::String => {
				self.args[idx].set(ArgValue::String(tokens[*pos].clone()));
				*pos += 1;
			},
			ArgKind::Integer => {
				let raw = tokens[*pos].clone();
				if is_integer_literal(&raw) {
					match parse_int_literal(&raw) {
						Some(num) if self.args[idx].in_range(num) => self.args[idx].set(ArgValue::Integer(num)),
						_ => self.errors.push(format!("pandargs: \"{}\" argument has out of range parameter value \"{raw}\"", self.args[idx].name)),
					}
				} else {
					self.errors.push(format!("pandargs: \"{}\" argument has out of range parameter value \"{raw}\"", self.args[idx].name));
				}
				*pos += 1;
			},
			ArgKind::Uint32 | ArgKind::Uint64 => {
				let raw = tokens[*pos].clone();
				if is_uint_literal(&raw) {
					match parse_uint_literal(&raw) {
						Some(num) if self.args[idx].in_range(num as i64) => {
							let value = if kind == ArgKind::Uint32 { ArgValue::Uint32(num as u32) } else { ArgValue::Uint64(num) };
							self.args[idx].set(value);
						},
						_ => self.errors.push(format!("pandargs: \"{}\" argument has out of range parameter value \"{raw}\"", self.args[idx].name)),
					}
				} else {
					self.errors.push(format!("pandargs: \"{}\" argument has invalid parameter value \"{raw}\"", self.args[idx].name));
				}
				*pos += 1;
			},
			ArgKind::Double => {
				let raw = tokens[*pos].clone();
				if is_rational_literal(&raw) {
					match raw.parse::<f64>() {
						Ok(num) => self.args[idx].set(ArgValue::Double(num)),
						Err(_) => self.errors.push(format!("pandargs: \"{}\" argument has invalid parameter value \"{raw}\"", self.args[idx].name)),
					}
				} else {
					self.errors.push(format!("pandargs: \"{}\" argument has invalid parameter value \"{raw}\"", self.args[idx].name));
				}
				*pos += 1;
			},
			ArgKind::Bool => unreachable!("handled above"),
			ArgKind::List => self.consume_list(idx, tokens, pos),
		}
	}

	fn consume_bool(&mut self, idx: usize, tokens: &mut [String], pos: &mut usize, had_equals: bool) {
		const TRUE_VALUES: [&str; 3] = ["on", "true", "1"];
		const FALSE_VALUES: [&str; 3] = ["off", "false", "0"];

		let raw = if *pos < tokens.len() { tokens[*pos].clone() } else { String::new() };

		if !had_equals {
			if raw.is_empty() || starts_with(&raw, DOUBLE_DASH) {
				self.args[idx].set(ArgValue::Bool(true));
				return;
			}
		}

		if TRUE_VALUES.contains(&raw.as_str()) {
			self.args[idx].set(ArgValue::Bool(true));
			*pos += 1;
			return;
		}
		if FALSE_VALUES.contains(&raw.as_str()) {
			self.args[idx].set(ArgValue::Bool(false));
			*pos += 1;
			return;
		}

		if !had_equals {
			self.args[idx].set(ArgValue::Bool(true));
		} else {
			self.errors.push(format!("pandargs: Bool argument {} has unexpected parameter value {raw}", self.args[idx].name));
			self.args[idx].reset_default();
		}
	}

	fn consume_list(&mut self, idx: usize, tokens: &mut [String], pos: &mut usize) {
		let raw = tokens[*pos].clone();
		let mut values = match &self.args[idx].value {
			ArgValue::List(v) if self.args[idx].was_set => v.clone(),
			_ => Vec::new(),
		};
		match self.args[idx].delimiter.clone() {
			None => values.push(raw),
			Some(delim) => {
				for part in split_on_any(&raw, &delim) {
					values.push(part);
				}
			},
		}
		self.args[idx].set(ArgValue::List(values));
		*pos += 1;
	}
}

fn split_on_any<'a>(s: &'a str, delimiters: &str) -> Vec<String> {
	s.split(|c| delimiters.contains(c)).filter(|p| !p.is_empty()).map(String::from).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_string_with_space_separated_value() {
		let mut parser = ArgParser::new();
		parser.add(Arg::new("input", ArgValue::String(String::new()), "input file"));
		let argv: Vec<String> = ["--input", "foo.pa"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("input").unwrap().value(), &ArgValue::String("foo.pa".into()));
	}

	#[test]
	fn parses_equals_separated_value() {
		let mut parser = ArgParser::new();
		parser.add(Arg::new("input", ArgValue::String(String::new()), "input file"));
		let argv: Vec<String> = ["--input=foo.pa"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("input").unwrap().value(), &ArgValue::String("foo.pa".into()));
	}

	#[test]
	fn bool_flag_defaults_true_without_value() {
		let mut parser = ArgParser::new();
		parser.add(Arg::new("verbose", ArgValue::Bool(false), "verbose output"));
		let argv: Vec<String> = ["--verbose"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("verbose").unwrap().value(), &ArgValue::Bool(true));
	}

	#[test]
	fn bool_flag_accepts_explicit_value() {
		let mut parser = ArgParser::new();
		parser.add(Arg::new("verbose", ArgValue::Bool(false), "verbose output"));
		let argv: Vec<String> = ["--verbose=off"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("verbose").unwrap().value(), &ArgValue::Bool(false));
	}

	#[test]
	fn rejects_integer_out_of_declared_range() {
		let mut parser = ArgParser::new();
		parser.add(Arg::with_range("opt-level", ArgValue::Integer(0), "optimization level", 0, 3));
		let argv: Vec<String> = ["--opt-level", "9"].iter().map(|s| s.to_string()).collect();
		assert!(!parser.parse(&argv));
		assert!(!parser.errors().is_empty());
	}

	#[test]
	fn hex_integer_literal_parses() {
		let mut parser = ArgParser::new();
		parser.add(Arg::new("addr", ArgValue::Uint64(0), "start address"));
		let argv: Vec<String> = ["--addr", "0x1f"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("addr").unwrap().value(), &ArgValue::Uint64(0x1f));
	}

	#[test]
	fn list_arg_splits_on_delimiter() {
		let mut parser = ArgParser::new();
		parser.add(Arg::list("paths", Vec::new(), "search paths", ":"));
		let argv: Vec<String> = ["--paths", "a:b:c"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("paths").unwrap().value(), &ArgValue::List(vec!["a".into(), "b".into(), "c".into()]));
	}

	#[test]
	fn tail_arguments_consumed_positionally() {
		let mut parser = ArgParser::new();
		parser.enable_tail();
		parser.push_back_tail(Arg::new("source", ArgValue::String(String::new()), "source file"));
		let argv: Vec<String> = ["source.pa"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
	}

	#[test]
	fn remainder_captures_everything_after_double_dash() {
		let mut parser = ArgParser::new();
		parser.enable_remainder();
		let argv: Vec<String> = ["--", "a", "b"].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.remainder(), &["a".to_string(), "b".to_string()]);
	}

	#[test]
	fn unknown_option_reports_error() {
		let mut parser = ArgParser::new();
		let argv: Vec<String> = ["--nope"].iter().map(|s| s.to_string()).collect();
		assert!(!parser.parse(&argv));
		assert!(parser.error_string().contains("Invalid option"));
	}

	#[test]
	fn empty_value_after_equals_is_distinguishable_from_missing_value() {
		let mut parser = ArgParser::new();
		parser.add(Arg::new("name", ArgValue::String("default".into()), "a name"));
		let argv: Vec<String> = ["--name="].iter().map(|s| s.to_string()).collect();
		assert!(parser.parse(&argv), "{:?}", parser.errors());
		assert_eq!(parser.get_arg("name").unwrap().value(), &ArgValue::String(String::new()));
	}
}
