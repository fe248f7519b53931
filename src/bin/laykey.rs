// Laykey CLI
// Validates keymap configurations and replays event scripts against the
// resolution engine, printing the emitted effects.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use laykey_core::{
    Config, Disposition, Effect, EffectHandler, Engine, HandlerChain, LayerId, Position,
};

/// Keymap layer-resolution engine driver
#[derive(Parser, Debug)]
#[command(name = "laykey")]
#[command(about = "Keymap layer-resolution engine driver", long_about = None)]
struct Args {
    /// TOML keymap configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,

    /// List the configured layers and exit
    #[arg(long)]
    list_layers: bool,

    /// Event script to replay (see `--help` for the line format)
    ///
    /// One event per line: "<ms> press <row> <col>", "<ms> release <row>
    /// <col>" or "<ms> tick". Blank lines and '#' comments are skipped.
    #[arg(short, long, value_name = "SCRIPT")]
    simulate: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Consumes forwarded vendor tokens, standing in for the vendor callback
/// collaborator; everything else passes through to the printing sink.
struct VendorSink;

impl EffectHandler for VendorSink {
    fn name(&self) -> &str {
        "vendor"
    }

    fn handle(&mut self, effect: &Effect) -> Disposition {
        match effect {
            Effect::Forward(token) => {
                println!("    vendor <- {}", token);
                Disposition::Consumed
            }
            _ => Disposition::Passthrough,
        }
    }
}

/// Prints everything the vendor sink left alone, standing in for the HID
/// reporter.
struct PrintSink;

impl EffectHandler for PrintSink {
    fn name(&self) -> &str {
        "print"
    }

    fn handle(&mut self, effect: &Effect) -> Disposition {
        println!("    {}", effect);
        Disposition::Consumed
    }
}

#[derive(Debug, Clone, Copy)]
enum ScriptEvent {
    Press(Position),
    Release(Position),
    Tick,
}

fn parse_script_line(line: &str) -> Result<Option<(u64, ScriptEvent)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let at: u64 = parts
        .next()
        .context("missing timestamp")?
        .parse()
        .context("bad timestamp")?;
    let verb = parts.next().context("missing event kind")?;

    let mut position = || -> Result<Position> {
        let row: u8 = parts.next().context("missing row")?.parse()?;
        let col: u8 = parts.next().context("missing col")?.parse()?;
        Ok(Position::new(row, col))
    };

    let event = match verb {
        "press" => ScriptEvent::Press(position()?),
        "release" => ScriptEvent::Release(position()?),
        "tick" => ScriptEvent::Tick,
        other => bail!("unknown event kind '{}'", other),
    };
    Ok(Some((at, event)))
}

fn run_script(engine: &mut Engine, chain: &mut HandlerChain, script: &str) -> Result<()> {
    for (lineno, line) in script.lines().enumerate() {
        let Some((at, event)) = parse_script_line(line)
            .with_context(|| format!("script line {}", lineno + 1))?
        else {
            continue;
        };
        let effects = match event {
            ScriptEvent::Press(pos) => {
                println!("[{:>6}ms] press {}", at, pos);
                engine.press(pos, at)?
            }
            ScriptEvent::Release(pos) => {
                println!("[{:>6}ms] release {}", at, pos);
                engine.release(pos, at)?
            }
            ScriptEvent::Tick => engine.tick(at),
        };
        chain.dispatch_all(&effects);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let config = Config::from_toml_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if args.check_config {
        println!(
            "Configuration is valid: {} layers on a {}x{} matrix",
            config.table.layer_count(),
            config.table.rows(),
            config.table.cols()
        );
        return Ok(());
    }

    if args.list_layers {
        for index in 0..config.table.layer_count() {
            let id = LayerId::new(index as u8);
            let marker = if config.table.is_base_layer(id) {
                " (base)"
            } else {
                ""
            };
            println!("{}: {}{}", id, config.table.layer_name(id), marker);
        }
        return Ok(());
    }

    let Some(script_path) = args.simulate else {
        bail!("nothing to do; pass --check-config, --list-layers or --simulate");
    };

    let mut engine = config.into_engine()?;
    let mut chain = HandlerChain::new();
    chain.register(Box::new(VendorSink));
    chain.register(Box::new(PrintSink));

    let script = std::fs::read_to_string(&script_path)
        .with_context(|| format!("reading {}", script_path.display()))?;
    run_script(&mut engine, &mut chain, &script)
}
