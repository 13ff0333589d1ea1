use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command line interface for marklink
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Link mentions, issues, commits and short-links in rendered HTML"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// Options shared by the rewriting subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct RewriteArgs {
  /// HTML fragments to process. Standard input is read when none are given.
  pub inputs: Vec<PathBuf>,

  /// Prefix relative links are resolved against. Overrides `url_prefix`.
  #[arg(short, long)]
  pub prefix: Option<String>,

  /// Extra metas (KEY=VALUE, can be used multiple times)
  #[arg(short, long, action = clap::ArgAction::Append)]
  pub meta: Vec<String>,
}

/// All supported subcommands for the marklink CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new marklink configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "marklink.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Post-process issue, comment or wiki page HTML.
  Render {
    #[command(flatten)]
    args: RewriteArgs,

    /// Resolve relative short-links through the wiki.
    #[arg(short, long)]
    wiki: bool,
  },

  /// Post-process rendered commit message HTML.
  Commit {
    #[command(flatten)]
    args: RewriteArgs,

    /// Link every remaining text run to this URL. Overrides `default_link`.
    #[arg(short, long)]
    default_link: Option<String>,
  },

  /// Print the users mentioned in plain text, one per line.
  Mentions {
    /// Files to scan. Standard input is read when none are given.
    inputs: Vec<PathBuf>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_render_arguments() {
    let cli = Cli::try_parse_from([
      "marklink",
      "render",
      "--wiki",
      "-p",
      "/owner/repo",
      "-m",
      "style=alphanumeric",
      "a.html",
      "b.html",
      "-c",
      "marklink.toml",
    ])
    .unwrap();

    assert_eq!(cli.config_files, [PathBuf::from("marklink.toml")]);
    let Commands::Render { args, wiki } = cli.command else {
      panic!("expected render");
    };
    assert!(wiki);
    assert_eq!(args.prefix.as_deref(), Some("/owner/repo"));
    assert_eq!(args.meta, ["style=alphanumeric"]);
    assert_eq!(args.inputs, [PathBuf::from("a.html"), PathBuf::from("b.html")]);
  }

  #[test]
  fn test_init_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["marklink", "init", "-F", "yaml"]).is_err());
  }
}
