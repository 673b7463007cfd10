use clap::{Parser, ValueEnum};
use serde_json::Value;

/// Package version with the short commit hash embedded by the build script.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_SHORT"), ")");

/// Query used when none is given: the account holder's name.
pub const DEFAULT_QUERY: &str = "{ viewer { name } }";

/// Send a single GraphQL query to the Tibber API and print its data.
#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,

    /// GraphQL query document
    #[arg(long, short, default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Query variables as a JSON object
    #[arg(long, value_parser = parse_variables)]
    pub variables: Option<Value>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    Pretty,
    Json,
}

/// Pretty in development, JSON in release builds.
fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

fn parse_variables(raw: &str) -> Result<Value, String> {
    match serde_json::from_str(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("variables must be a JSON object, got {other}")),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["tibber"]).unwrap();
        assert_eq!(args.query, DEFAULT_QUERY);
        assert!(args.variables.is_none());
    }

    #[test]
    fn variables_must_be_an_object() {
        let args = Args::try_parse_from([
            "tibber",
            "--tracing",
            "json",
            "--variables",
            r#"{"homeId": "abc"}"#,
        ])
        .unwrap();
        assert_eq!(args.tracing, TracingFormat::Json);
        assert_eq!(args.variables.unwrap()["homeId"], "abc");

        assert!(Args::try_parse_from(["tibber", "--variables", "[1]"]).is_err());
        assert!(Args::try_parse_from(["tibber", "--variables", "{"]).is_err());
    }

    #[test]
    fn version_includes_commit() {
        use clap::CommandFactory;
        let command = Args::command();
        let version = command.get_version().unwrap();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(env!("GIT_COMMIT_SHORT")));
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
