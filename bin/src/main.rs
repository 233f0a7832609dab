use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
};

use anyhow::anyhow;
use clap::Parser;
use itertools::Itertools;

use interpreter::{DefaultResolver, Expression, Variables};
use parser::ParseFlags;
use value::Value;

/// Evaluates expressions, one per line, from a file or an interactive prompt.
#[derive(clap::Parser)]
struct Args {
    file: Option<PathBuf>,

    /// Defines a variable, `-D gain=0.5`. Text that is not a literal becomes a string.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_define)]
    defines: Vec<(String, Value)>,

    /// Print the parsed expression tree instead of evaluating it.
    #[arg(long)]
    ast: bool,

    /// Accept `;`-separated lists of expressions.
    #[arg(long)]
    multiple: bool,
}

fn parse_define(arg: &str) -> Result<(String, Value), String> {
    let (name, text) =
        arg.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got `{arg}`"))?;
    let value = Value::from(text).cast_non_string().unwrap_or_else(|_| Value::from(text));
    Ok((name.trim().to_string(), value))
}

struct Session<'a> {
    vars: Variables<'a>,
    flags: ParseFlags,
    ast: bool,
}

impl Session<'_> {
    fn run(&self, line: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let expression = Expression::parse(line, self.flags)?;
        if self.ast {
            for expr in expression.exprs() {
                writeln!(out, "{expr}")?;
            }
            return Ok(());
        }

        let results = expression.evaluate_all(&self.vars)?;
        writeln!(out, "{}", results.into_iter().map(Value::cast_string_ext).join("; "))?;
        Ok(())
    }
}

fn run_file(path: PathBuf, session: &Session) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let mut failed = 0;
    for (i, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Err(e) = session.run(line, &mut stdout()) {
            println!("[line {}] {}", i + 1, e);
            failed += 1;
        }
    }

    match failed {
        0 => Ok(()),
        n => Err(anyhow!("{n} expression(s) failed")),
    }
}

fn run_prompt(session: &Session) -> anyhow::Result<()> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = session.run(line.trim(), &mut stdout()) {
            println!("{}", e);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut vars = Variables::with_resolver(&DefaultResolver);
    for (name, value) in args.defines {
        log::debug!("Defining {name} = {value:?}");
        vars.set(name, value);
    }

    let flags = if args.multiple { ParseFlags::MULTIPLE } else { ParseFlags::NONE };
    let session = Session { vars, flags, ast: args.ast };

    match args.file {
        Some(file) => run_file(file, &session),
        None => run_prompt(&session),
    }
}
