use std::{
  fs,
  io::{self, Read, Write},
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, debug, info};
use marklink_config::Config;
use marklink_html::{Metas, PostProcessor, find_all_mentions};
use rayon::prelude::*;

mod cli;

use cli::{Cli, Commands, RewriteArgs};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => init(&output, &format, force),
    command => {
      let config = Config::load(&cli.config_files, &cli.config_overrides)
        .wrap_err("Failed to load configuration")?;
      run(command, &config)
    },
  }
}

fn run(command: Commands, config: &Config) -> Result<()> {
  match command {
    Commands::Render { args, wiki } => {
      let processor = post_processor(config)?;
      let metas = metas(config, &args.meta)?;
      let prefix = args.prefix.as_deref().unwrap_or(config.url_prefix());
      let is_wiki = wiki || config.wiki;
      debug!("Rendering with prefix {prefix}, wiki mode {is_wiki}");

      rewrite(&args, |raw| {
        Ok(processor.post_process(raw, prefix, &metas, is_wiki)?)
      })
    },
    Commands::Commit { args, default_link } => {
      let processor = post_processor(config)?;
      let metas = metas(config, &args.meta)?;
      let prefix = args.prefix.as_deref().unwrap_or(config.url_prefix());
      let default_link = default_link
        .as_deref()
        .or(config.default_link.as_deref())
        .unwrap_or_default();

      rewrite(&args, |raw| {
        Ok(processor.render_commit_message(raw, prefix, default_link, &metas)?)
      })
    },
    Commands::Mentions { inputs } => {
      let mut out = io::stdout().lock();
      for (_, content) in read_inputs(&inputs)? {
        let content = String::from_utf8_lossy(&content);
        for name in find_all_mentions(&content) {
          writeln!(out, "{name}")?;
        }
      }
      Ok(())
    },
    // Handled in `main` before any configuration is loaded.
    Commands::Init { .. } => Ok(()),
  }
}

fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!("Configuration file created successfully. Edit it to match your instance.");
  Ok(())
}

fn post_processor(config: &Config) -> Result<PostProcessor> {
  PostProcessor::new(config.settings()).wrap_err_with(|| {
    format!("Invalid application URL: {}", config.app_url)
  })
}

/// Configured metas with `--meta KEY=VALUE` pairs applied on top.
fn metas(config: &Config, extra: &[String]) -> Result<Metas> {
  let mut metas = config.metas();
  for pair in extra {
    let Some((key, value)) = pair.split_once('=') else {
      bail!("Invalid meta '{pair}'. Expected KEY=VALUE");
    };
    metas.insert(key.trim().to_string(), value.trim().to_string());
  }
  Ok(metas)
}

/// Run `process` over every input in parallel and write the results to
/// standard output in input order.
fn rewrite<F>(args: &RewriteArgs, process: F) -> Result<()>
where
  F: Fn(&[u8]) -> Result<String> + Sync,
{
  let inputs = read_inputs(&args.inputs)?;
  let outputs = inputs
    .par_iter()
    .map(|(name, raw)| {
      process(raw.as_slice()).wrap_err_with(|| format!("Failed to process {name}"))
    })
    .collect::<Result<Vec<_>>>()?;

  let mut out = io::stdout().lock();
  for html in outputs {
    out.write_all(html.as_bytes())?;
  }
  out.flush()?;
  Ok(())
}

/// Read every input file, or standard input when there are none. Each entry
/// is paired with a display name for error messages.
fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>> {
  if inputs.is_empty() {
    let mut raw = Vec::new();
    io::stdin()
      .read_to_end(&mut raw)
      .wrap_err("Failed to read standard input")?;
    return Ok(vec![("<stdin>".to_string(), raw)]);
  }

  inputs
    .par_iter()
    .map(|path| {
      fs::read(path)
        .map(|raw| (path.display().to_string(), raw))
        .wrap_err_with(|| format!("Failed to read {}", path.display()))
    })
    .collect()
}
