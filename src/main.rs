// twrpgen/src/main.rs
mod arch;
mod cli;
mod defs;
mod fstab;
mod rules;
mod template;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::{Cli, Commands};
use rules::PartitionRules;
use template::{DeviceContext, TEMPLATES, TemplateRenderer};

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.filter_level(level).init();
}

fn render_device_tree(
    out_dir: &PathBuf,
    codename: &str,
    manufacturer: &str,
    arch_arg: Option<&str>,
    probe: Option<&PathBuf>,
    fstab_path: Option<&PathBuf>,
) -> Result<()> {
    let arch = match (arch_arg, probe) {
        (Some(a), _) => a.to_string(),
        (None, Some(binary)) => match arch::detect(binary)? {
            Some(a) => {
                log::info!("Detected architecture {} from {}", a, binary.display());
                a.to_string()
            }
            None => bail!("{} is not a recognizable ELF binary", binary.display()),
        },
        (None, None) => bail!("Either --arch or --probe is required"),
    };

    let facts = match fstab_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read source fstab {}", path.display()))?;
            fstab::device_facts(&text)
        }
        None => {
            log::warn!("No fstab given; partition facts default to false");
            fstab::DeviceFacts::default()
        }
    };

    let ctx = DeviceContext {
        codename: codename.to_string(),
        manufacturer: manufacturer.to_string(),
        arch,
        has_dtbo: facts.has_dtbo,
        has_vendor: facts.has_vendor,
        has_logical: facts.has_logical,
    };

    let renderer = TemplateRenderer::new()?;
    for (name, _) in TEMPLATES {
        renderer.render_to_file(out_dir, name, &ctx)?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(command) = &cli.command {
        match command {
            Commands::GenRules { output } => {
                PartitionRules::default().save_to_file(output)?;
                return Ok(());
            }
            Commands::ShowRules => {
                let rules = PartitionRules::load(cli.rules.as_deref())?;
                println!("{}", serde_json::to_string(&rules)?);
                return Ok(());
            }
            Commands::Arch { binary } => {
                match arch::detect(binary)? {
                    Some(a) => println!("{a}"),
                    None => bail!("{} is not a recognizable ELF binary", binary.display()),
                }
                return Ok(());
            }
            Commands::Render {
                out_dir,
                codename,
                manufacturer,
                arch,
                probe,
                fstab,
            } => {
                return render_device_tree(
                    out_dir,
                    codename,
                    manufacturer,
                    arch.as_deref(),
                    probe.as_ref(),
                    fstab.as_ref(),
                );
            }
        }
    }

    let (Some(source), Some(dest)) = (&cli.fstab, &cli.output) else {
        bail!("Both --fstab and --output are required (or use a subcommand, see --help)");
    };

    let rules = PartitionRules::load(cli.rules.as_deref())?;
    log::info!("Converting {} -> {}", source.display(), dest.display());

    let report = fstab::transform(source, dest, &rules)?;
    if report.dropped > 0 {
        log::info!("Dropped {} unrecognized partitions", report.dropped);
    }
    if report.malformed > 0 {
        log::warn!("Skipped {} malformed lines", report.malformed);
    }
    log::info!("Conversion complete");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Fatal Error: {:#}", e);
        eprintln!("Fatal Error: {:#}", e);
        std::process::exit(1);
    }
}
