use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    write_output(&mut stdout, output, format, pretty)
}

fn write_output(
    writer: &mut impl Write,
    output: &CommandOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => write!(writer, "{output}")?,
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(output)?
            } else {
                serde_json::to_string(output)?
            };
            writeln!(writer, "{payload}")?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use fairval_engine::{LinearFit, Projection};

    use super::*;
    use crate::commands::TrendProjection;

    fn projection() -> CommandOutput {
        CommandOutput::Projection(TrendProjection {
            history: vec![2.0, 1.0],
            fit: LinearFit {
                slope: 1.0,
                intercept: 1.0,
            },
            forecast: Projection::from_furthest_first([7.0, 6.0, 5.0, 4.0, 3.0]),
        })
    }

    #[test]
    fn json_output_is_untagged() {
        let mut buffer = Vec::new();
        write_output(&mut buffer, &projection(), OutputFormat::Json, false).expect("render");

        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("json");
        assert_eq!(value["forecast"]["+4Y"], 7.0);
        assert_eq!(value["fit"]["slope"], 1.0);
    }

    #[test]
    fn text_output_uses_display() {
        let mut buffer = Vec::new();
        write_output(&mut buffer, &projection(), OutputFormat::Text, false).expect("render");

        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.starts_with("slope     = 1.0000\n"));
    }
}
