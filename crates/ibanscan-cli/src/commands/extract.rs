//! Extract command - find IBANs in already recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use ibanscan_core::{Iban, IbanExtractor, format_iban};

use super::{RecognizerArgs, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file to read (default or "-": stdin)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    recognizer: RecognizerArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// One IBAN per line, grouped in fours
    Text,
}

#[derive(Serialize)]
struct IbanRecord {
    iban: String,
    formatted: String,
    country_code: String,
}

impl IbanRecord {
    fn new(iban: &str) -> Self {
        // Extracted IBANs are already validated; parse only to split the parts.
        let country_code = Iban::parse(iban)
            .map(|parsed| parsed.country_code().to_string())
            .unwrap_or_default();

        Self {
            iban: iban.to_string(),
            formatted: format_iban(iban),
            country_code,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let extractor = IbanExtractor::from_config(&args.recognizer.apply(&config.recognizer))?;

    let text = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            info!("Reading text from {}", path.display());
            fs::read_to_string(path)?
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let ibans = extractor.extract_ibans(&text);
    debug!("Extracted {} IBAN(s)", ibans.len());

    print!("{}", format_ibans(&ibans, args.format)?);

    Ok(())
}

/// Render an IBAN list in the requested output format.
pub fn format_ibans(ibans: &[String], format: OutputFormat) -> anyhow::Result<String> {
    let records: Vec<IbanRecord> = ibans.iter().map(|iban| IbanRecord::new(iban)).collect();

    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&records)?)),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["iban", "formatted", "country_code"])?;
            for record in &records {
                wtr.write_record([&record.iban, &record.formatted, &record.country_code])?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(records
            .iter()
            .map(|record| format!("{}\n", record.formatted))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<String> {
        vec![
            "DE89370400440532013000".to_string(),
            "NO9386011117947".to_string(),
        ]
    }

    #[test]
    fn test_text_format_groups_in_fours() {
        let output = format_ibans(&sample(), OutputFormat::Text).unwrap();
        assert_eq!(output, "DE89 3704 0044 0532 0130 00\nNO93 8601 1117 947\n");
    }

    #[test]
    fn test_csv_format_has_header() {
        let output = format_ibans(&sample(), OutputFormat::Csv).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("iban,formatted,country_code"));
        assert_eq!(
            lines.next(),
            Some("DE89370400440532013000,DE89 3704 0044 0532 0130 00,DE")
        );
    }

    #[test]
    fn test_json_format_records() {
        let output = format_ibans(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[1]["country_code"], "NO");
        assert_eq!(value[0]["formatted"], "DE89 3704 0044 0532 0130 00");
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_ibans(&[], OutputFormat::Text).unwrap(), "");
        assert_eq!(format_ibans(&[], OutputFormat::Json).unwrap(), "[]\n");
    }
}
