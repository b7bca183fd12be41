use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use panda_file::argparse::{Arg, ArgParser, ArgValue};
use panda_file::assembler::assemble;

fn build_parser() -> ArgParser {
	let mut parser = ArgParser::new();
	parser.add(Arg::new("help", ArgValue::Bool(false), "print this message and exit"));
	parser.add(Arg::new("verbose", ArgValue::Bool(false), "print every parsed directive as it is accepted"));
	parser.add(Arg::new("optimize", ArgValue::Bool(false), "enable peephole optimization (no-op in this build)"));
	parser.add(Arg::new("size-stat", ArgValue::Bool(false), "print a per-section size breakdown after assembling"));
	parser.add(Arg::new("scopes-file", ArgValue::String(String::new()), "write local-variable debug scope info to <path>"));
	parser.add(Arg::new("log-file", ArgValue::String(String::new()), "append diagnostics to <path> instead of stderr"));
	parser.push_back_tail(Arg::new("input", ArgValue::String(String::new()), "input assembly source file"));
	parser.push_back_tail(Arg::new("output", ArgValue::String(String::new()), "output file (unused until binary emission exists)"));
	parser.enable_tail();
	parser
}

fn log_diagnostics(text: &str, log_file: &str) -> Result<()> {
	if log_file.is_empty() {
		eprint!("{text}");
	} else {
		use std::io::Write;
		let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log_file).with_context(|| format!("opening log file {log_file}"))?;
		write!(file, "{text}")?;
	}
	Ok(())
}

fn run() -> Result<bool> {
	let argv: Vec<String> = std::env::args().skip(1).collect();
	let mut parser = build_parser();
	if !parser.parse(&argv) {
		eprint!("{}", parser.error_string());
		return Ok(false);
	}

	let help = matches!(parser.get_arg("help").map(|a| a.value()), Some(ArgValue::Bool(true)));
	if help {
		print!("{}", parser.help_string());
		return Ok(true);
	}

	let input = match parser.get_arg("input").map(|a| a.value()) {
		Some(ArgValue::String(s)) if !s.is_empty() => s.clone(),
		_ => bail!("no input file given"),
	};
	let verbose = matches!(parser.get_arg("verbose").map(|a| a.value()), Some(ArgValue::Bool(true)));
	let size_stat = matches!(parser.get_arg("size-stat").map(|a| a.value()), Some(ArgValue::Bool(true)));
	let log_file = match parser.get_arg("log-file").map(|a| a.value()) {
		Some(ArgValue::String(s)) => s.clone(),
		_ => String::new(),
	};

	let source = std::fs::read_to_string(&input).with_context(|| format!("reading {input}"))?;
	let (program, diagnostics) = assemble(&source);

	for warning in &diagnostics.warnings {
		log_diagnostics(&format!("{warning}\n"), &log_file)?;
	}

	let Some(program) = program else {
		let error = diagnostics.error.expect("a failed assemble always carries an error");
		log_diagnostics(&format!("{error}\n"), &log_file)?;
		return Ok(false);
	};

	if verbose {
		for name in program.records.keys() {
			println!("record {name}");
		}
		for name in program.functions.keys() {
			println!("function {name}");
		}
	}

	if size_stat {
		println!("records: {}", program.records.len());
		println!("functions: {}", program.functions.len());
		println!("strings: {}", program.strings.len());
	}

	Ok(true)
}

fn main() -> ExitCode {
	match run() {
		Ok(true) => ExitCode::from(0),
		Ok(false) => ExitCode::from(1),
		Err(err) => {
			eprintln!("pasm: {err:#}");
			ExitCode::from(1)
		},
	}
}
