//! Tally Sheets CLI - evaluate spreadsheet criteria functions from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tally_sheets::coerce::{format_number, to_boolean, to_date_in, to_number, to_text};
use tally_sheets::{DateSystem, ErrorCode, FunctionRegistry, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(
    author,
    version,
    about = "Evaluate spreadsheet criteria, conditional aggregates and lookups"
)]
struct Cli {
    /// Log criteria compilation and rejected calls to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a function, e.g. `tally call SUMIF {1,2,3,4} "<=2" {10,20,30,40}`
    Call {
        /// Function name (case-insensitive)
        function: String,

        /// Arguments as spreadsheet literals: {1,2;3,4}, 42, TRUE, #N/A, "text" or text
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Coerce a literal to a number, boolean, date or text
    Coerce {
        /// Target type
        #[arg(value_enum)]
        target: Target,

        /// Value as a spreadsheet literal
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Read serial numbers in the 1904 date system
        #[arg(long)]
        date_1904: bool,
    },

    /// List the callable functions
    Functions,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Number,
    Boolean,
    Date,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Call { function, args } => call(&function, &args),
        Commands::Coerce {
            target,
            value,
            date_1904,
        } => coerce(target, &value, date_1904),
        Commands::Functions => {
            for name in FunctionRegistry::global().names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn call(function: &str, raw_args: &[String]) -> Result<()> {
    let args = raw_args
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            parse_literal(raw).with_context(|| format!("Invalid argument {}: '{}'", i + 1, raw))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(function, args = ?args, "parsed call");

    let result = FunctionRegistry::global()
        .call(function, &args)
        .with_context(|| format!("Failed to call {}", function))?;
    println!("{}", result);
    Ok(())
}

fn coerce(target: Target, raw: &str, date_1904: bool) -> Result<()> {
    let value = parse_literal(raw).with_context(|| format!("Invalid value '{}'", raw))?;
    let system = if date_1904 {
        DateSystem::Excel1904
    } else {
        DateSystem::Excel1900
    };
    tracing::debug!(value = ?value, ?system, "parsed coercion input");

    let shown = match target {
        Target::Number => to_number(&value).map(format_number),
        Target::Boolean => to_boolean(&value).map(|b| Value::Boolean(b).to_string()),
        Target::Date => to_date_in(&value, system).map(|d| d.format("%Y-%m-%d").to_string()),
        Target::Text => to_text(&value),
    };
    match shown {
        Ok(s) => println!("{}", s),
        Err(e) => {
            tracing::debug!(error = %e, "coercion produced an error value");
            println!("{}", e);
        }
    }
    Ok(())
}

/// Parse a spreadsheet literal.
///
/// Array constants use `,` between columns and `;` between rows; a single row stays flat.
fn parse_literal(raw: &str) -> Result<Value> {
    let s = raw.trim();
    let Some(inner) = s.strip_prefix('{') else {
        return parse_scalar(s);
    };
    let Some(inner) = inner.strip_suffix('}') else {
        bail!("Unterminated array constant");
    };

    let mut rows = split_outside_quotes(inner, ';')
        .into_iter()
        .map(|row| {
            split_outside_quotes(row, ',')
                .into_iter()
                .map(|item| parse_scalar(item.trim()))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != width) {
        bail!("Array rows must all have the same number of columns");
    }

    Ok(if rows.len() == 1 {
        Value::Array(rows.remove(0))
    } else {
        Value::Array(rows.into_iter().map(Value::Array).collect())
    })
}

fn parse_scalar(s: &str) -> Result<Value> {
    if s.is_empty() {
        return Ok(Value::Empty);
    }
    if let Some(quoted) = s.strip_prefix('"') {
        let Some(body) = quoted.strip_suffix('"') else {
            bail!("Unterminated string {}", s);
        };
        return Ok(Value::Text(body.replace("\"\"", "\"")));
    }
    if s.starts_with('#') {
        let code: ErrorCode = s.parse().with_context(|| format!("Unknown error value {}", s))?;
        return Ok(Value::Error(code));
    }
    if s.eq_ignore_ascii_case("TRUE") {
        return Ok(Value::Boolean(true));
    }
    if s.eq_ignore_ascii_case("FALSE") {
        return Ok(Value::Boolean(false));
    }
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Value::Number(n)),
        _ => Ok(Value::Text(s.to_string())),
    }
}

/// Split on `sep`, ignoring separators inside double-quoted text
fn split_outside_quotes(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_literal("42").unwrap(), Value::Number(42.0));
        assert_eq!(parse_literal("-1.5").unwrap(), Value::Number(-1.5));
        assert_eq!(parse_literal("true").unwrap(), Value::Boolean(true));
        assert_eq!(parse_literal("#N/A").unwrap(), Value::Error(ErrorCode::Na));
        assert_eq!(parse_literal("\"42\"").unwrap(), Value::from("42"));
        assert_eq!(parse_literal("\"say \"\"hi\"\"\"").unwrap(), Value::from("say \"hi\""));
        assert_eq!(parse_literal(">=10").unwrap(), Value::from(">=10"));
        assert_eq!(parse_literal("inf").unwrap(), Value::from("inf"));
        assert_eq!(parse_literal("").unwrap(), Value::Empty);
    }

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            parse_literal("{1,\"a\",TRUE}").unwrap(),
            Value::Array(vec![Value::Number(1.0), Value::from("a"), Value::Boolean(true)])
        );
        assert_eq!(
            parse_literal("{1,2;3,4}").unwrap(),
            Value::Array(vec![Value::from(vec![1, 2]), Value::from(vec![3, 4])])
        );
        assert_eq!(
            parse_literal("{\"a,b\";\"c;d\"}").unwrap(),
            Value::Array(vec![
                Value::Array(vec![Value::from("a,b")]),
                Value::Array(vec![Value::from("c;d")]),
            ])
        );
        assert_eq!(
            parse_literal("{1,,3}").unwrap(),
            Value::Array(vec![Value::Number(1.0), Value::Empty, Value::Number(3.0)])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_literal("{1,2").is_err());
        assert!(parse_literal("{1,2;3}").is_err());
        assert!(parse_literal("#BOGUS!").is_err());
        assert!(parse_literal("\"open").is_err());
    }

    #[test]
    fn test_call_end_to_end() {
        let args: Vec<Value> = ["{1,2,3,4}", "<=2", "{10,20,30,40}"]
            .iter()
            .map(|raw| parse_literal(raw).unwrap())
            .collect();
        let result = FunctionRegistry::global().call("SUMIF", &args).unwrap();
        assert_eq!(result.to_string(), "30");
    }

    #[test]
    fn test_commands_under_debug_logging() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let args = ["{1,2,3}".to_string(), ">1".to_string()];
            assert!(call("COUNTIF", &args).is_ok());
            assert!(coerce(Target::Number, "abc", false).is_ok());
            assert!(call("NOPE", &args).is_err());
        });
    }
}
