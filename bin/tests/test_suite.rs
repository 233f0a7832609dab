use interpreter::{DefaultResolver, Expression, Variables};
use itertools::Itertools;
use lazy_regex::regex;
use parser::ParseFlags;
use test_suite_proc_macro::generate_tests;
use value::Value;

use pretty_assertions::assert_eq;

/// Runs one suite file. Every expression line carries its expected outcome:
///
/// ```text
/// 2 + 3 * 4 // expect: 14
/// 1 idiv 0 // error: Integer division by zero
/// // set gain = 0.5 * 2
/// ```
///
/// `set` lines evaluate the expression and store it as a variable for the
/// lines that follow. Expression lines may hold `;`-separated lists, their
/// results are joined with `; `.
pub fn expr_expect(code: &str) {
    let set_regex = regex!(r"^// set (\w+) = (.*)$");
    let line_regex = regex!(r"^(.*?)\s*// (expect|error): (.*)$");

    let mut vars = Variables::with_resolver(&DefaultResolver);
    let mut expected = Vec::new();
    let mut actual = Vec::new();

    for (i, line) in code.lines().enumerate() {
        let line = line.trim();
        if let Some(cap) = set_regex.captures(line) {
            let value = Expression::parse(&cap[2], ParseFlags::NONE)
                .and_then(|expression| expression.evaluate(&vars))
                .unwrap_or_else(|e| panic!("[line {}] can't set {}: {}", i + 1, &cap[1], e));
            vars.set(&cap[1], value);
        } else if let Some(cap) = line_regex.captures(line) {
            expected.push((i + 1, format!("{}: {}", &cap[2], &cap[3])));
            actual.push((i + 1, run(&cap[1], &vars)));
        } else {
            assert!(
                line.is_empty() || line.starts_with("//"),
                "[line {}] expression without expectation: {}",
                i + 1,
                line
            );
        }
    }

    assert_eq!(actual, expected, "Actual results (left) do not match expected results (right)");
}

fn run(source: &str, vars: &Variables) -> String {
    let results = Expression::parse(source, ParseFlags::MULTIPLE)
        .and_then(|expression| expression.evaluate_all(vars));
    match results {
        Ok(values) => {
            format!("expect: {}", values.into_iter().map(Value::cast_string_ext).join("; "))
        }
        Err(e) => format!("error: {e}"),
    }
}

generate_tests!();
