use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut format = "debug".to_string();
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                format = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing format name after {arg}"))?;
            }
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let module = match pyast::parse_source(&source) {
        Ok(module) => module,
        Err(err) => {
            let (line, column) = err.position();
            bail!("{err} (line {line}, column {column})");
        }
    };

    match format.as_str() {
        "debug" => println!("{module:#?}"),
        "json" => {
            let rendered =
                serde_json::to_string_pretty(&module).context("Serializing the tree")?;
            println!("{rendered}");
        }
        other => bail!("Unknown format '{other}' (expected 'debug' or 'json')"),
    }

    Ok(())
}
