//! Validate command - check IBANs given on the command line.

use clap::Args;
use console::style;
use serde::Serialize;

use ibanscan_core::{Iban, IbanError};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// IBANs to validate (quote IBANs containing spaces)
    #[arg(required = true)]
    ibans: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Verdict<'a> {
    input: &'a str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    iban: Option<Iban>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<IbanError>,
}

pub async fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let verdicts: Vec<Verdict> = args
        .ibans
        .iter()
        .map(|input| match Iban::parse(input) {
            Ok(iban) => Verdict {
                input,
                valid: true,
                iban: Some(iban),
                error: None,
            },
            Err(e) => Verdict {
                input,
                valid: false,
                iban: None,
                error: Some(e),
            },
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdicts)?);
    } else {
        for verdict in &verdicts {
            match (&verdict.iban, &verdict.error) {
                (Some(iban), _) => println!("{} {}", style("OK").green(), iban.formatted()),
                (None, Some(e)) => println!(
                    "{} {}: {} ({})",
                    style("ERR").red(),
                    verdict.input,
                    e.kind(),
                    e
                ),
                (None, None) => {}
            }
        }
    }

    let invalid = verdicts.iter().filter(|v| !v.valid).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} IBAN(s) invalid", invalid, verdicts.len());
    }

    Ok(())
}
