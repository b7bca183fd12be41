use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use panda_file::argparse::{Arg, ArgParser, ArgValue};
use panda_file::binary::accessors::ClassDataAccessor;
use panda_file::binary::PandaFile;

fn build_parser() -> ArgParser {
	let mut parser = ArgParser::new();
	parser.add(Arg::new("help", ArgValue::Bool(false), "print this message and exit"));
	parser.add(Arg::new("verbose", ArgValue::Bool(false), "print field and method names per class"));
	parser.add(Arg::new("quiet", ArgValue::Bool(false), "suppress the per-class header lines"));
	parser.add(Arg::new("skip-string-literals", ArgValue::Bool(false), "omit string-literal contents from the dump"));
	parser.add(Arg::new("debug", ArgValue::Bool(false), "print debug-info line programs where present"));
	parser.add(Arg::new("debug-file", ArgValue::String(String::new()), "write debug-info output to <path> instead of stdout"));
	parser.push_back_tail(Arg::new("input", ArgValue::String(String::new()), "input panda binary file"));
	parser.push_back_tail(Arg::new("output", ArgValue::String(String::new()), "output text file (defaults to stdout if empty)"));
	parser.enable_tail();
	parser
}

fn read_cstr(data: &[u8], offset: usize) -> &[u8] {
	let end = data[offset..].iter().position(|&b| b == 0).map(|p| offset + p).unwrap_or(data.len());
	&data[offset..end]
}

fn dump_class(out: &mut dyn Write, data: &[u8], offset: usize, verbose: bool) -> Result<()> {
	let descriptor = read_cstr(data, offset);
	let descriptor = String::from_utf8_lossy(descriptor);
	let body_off = offset + descriptor.len() + 1;
	let accessor = ClassDataAccessor::new(&data[body_off..]).context("reading class record")?;

	writeln!(out, "class {descriptor} (access_flags={:#x})", accessor.access_flags())?;
	if verbose {
		writeln!(out, "  fields: {}", accessor.fields().len())?;
		writeln!(out, "  methods: {}", accessor.methods().len())?;
		for field in accessor.fields() {
			writeln!(out, "    field @ {:#x}", field.offset())?;
		}
		for method in accessor.methods() {
			writeln!(out, "    method @ {:#x}", method.offset())?;
		}
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
		_ => {
			eprintln!("panda-dump: no input file given");
			return Ok(false);
		},
	};
	let quiet = matches!(parser.get_arg("quiet").map(|a| a.value()), Some(ArgValue::Bool(true)));
	let verbose = matches!(parser.get_arg("verbose").map(|a| a.value()), Some(ArgValue::Bool(true)));
	let output = match parser.get_arg("output").map(|a| a.value()) {
		Some(ArgValue::String(s)) => s.clone(),
		_ => String::new(),
	};

	let file = PandaFile::open_path(&input).with_context(|| format!("opening {input}"))?;
	let class_index = file.class_index().context("reading class index")?;

	let mut stdout_handle;
	let mut file_handle;
	let out: &mut dyn Write = if output.is_empty() {
		stdout_handle = std::io::stdout();
		&mut stdout_handle
	} else {
		file_handle = std::fs::File::create(&output).with_context(|| format!("creating {output}"))?;
		&mut file_handle
	};

	if !quiet {
		writeln!(out, "panda file: {} classes", class_index.len())?;
	}
	for id in class_index {
		dump_class(out, file.data(), id.offset(), verbose)?;
	}
	Ok(true)
}

fn main() -> ExitCode {
	match run() {
		Ok(true) => ExitCode::from(0),
		Ok(false) => ExitCode::from(1),
		Err(err) => {
			eprintln!("panda-dump: {err:#}");
			ExitCode::from(1)
		},
	}
}
