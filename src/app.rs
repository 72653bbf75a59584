use std::path::Path;

use anyhow::{bail, Context};

use crate::config::Config;
use crate::session::Session;

const USAGE: &str = "usage: faddit-canvas <command> [args]

commands:
  decode <file.svg>                                  print the layer model as JSON
  encode <layers.json> [--select <id>] [--config <file.json>]
                                                     print the model as SVG
  roundtrip <file.svg>                               decode then encode
  stats <file.svg>                                   print layer and element counts";

struct Args {
    command: String,
    input: String,
    select: Option<String>,
    config: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let Some(command) = args.next() else {
        bail!("missing command\n\n{}", USAGE);
    };
    let Some(input) = args.next() else {
        bail!("missing input file for {:?}\n\n{}", command, USAGE);
    };

    let mut select = None;
    let mut config = None;
    while let Some(flag) = args.next() {
        let slot = match flag.as_str() {
            "--select" => &mut select,
            "--config" => &mut config,
            other => bail!("unknown option {:?}\n\n{}", other, USAGE),
        };
        *slot = Some(args.next().with_context(|| format!("{} needs a value", flag))?);
    }

    Ok(Args { command, input, select, config })
}

fn read_input(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(Path::new(path)).with_context(|| format!("failed to read {}", path))
}

/// Entry point of the `faddit-canvas` command line tool.
pub fn run() -> anyhow::Result<()> {
    crate::init_logging();

    let args = parse_args(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    let output = match args.command.as_str() {
        "decode" => {
            let session = Session::from_svg(&read_input(&args.input)?, config);
            log::info!("Decoded {} elements from {}", session.element_count(), args.input);
            session.to_json()?
        }
        "encode" => {
            let mut session = Session::from_json(&read_input(&args.input)?, config)
                .with_context(|| format!("in {}", args.input))?;
            session.select(args.select.as_deref())?;
            log::info!("Encoding {} elements from {}", session.element_count(), args.input);
            session.render()
        }
        "roundtrip" => {
            let session = Session::from_svg(&read_input(&args.input)?, config);
            session.to_svg()
        }
        "stats" => {
            let session = Session::from_svg(&read_input(&args.input)?, config);
            let mut out = format!(
                "{} layers, {} elements\n",
                session.layers().len(),
                session.element_count()
            );
            for layer in session.layers() {
                out.push_str(&format!(
                    "  {} {:?}{}: {} elements\n",
                    layer.id,
                    layer.name,
                    if layer.visible { "" } else { " (hidden)" },
                    layer.elements.len()
                ));
            }
            out
        }
        other => bail!("unknown command {:?}\n\n{}", other, USAGE),
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(args(&["encode", "m.json", "--select", "r1", "--config", "c.json"]))
            .unwrap();
        assert_eq!(parsed.command, "encode");
        assert_eq!(parsed.input, "m.json");
        assert_eq!(parsed.select.as_deref(), Some("r1"));
        assert_eq!(parsed.config.as_deref(), Some("c.json"));

        let parsed = parse_args(args(&["stats", "a.svg"])).unwrap();
        assert!(parsed.select.is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["decode"])).is_err());
        assert!(parse_args(args(&["encode", "m.json", "--select"])).is_err());
        assert!(parse_args(args(&["encode", "m.json", "--bogus", "x"])).is_err());
    }
}
