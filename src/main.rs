use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use newslens::{
    analysis::{Analyzer, InputKind},
    config::Config,
    telemetry,
};
use std::io::Read;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Url,
    Text,
}

impl From<Mode> for InputKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Url => InputKind::Url,
            Mode::Text => InputKind::Text,
        }
    }
}

/// Rate the credibility of a news article.
#[derive(Debug, Parser)]
#[command(name = "newslens", version)]
struct Cli {
    /// How to interpret VALUE.
    #[arg(value_enum)]
    mode: Mode,

    /// Article URL, or the article text itself. `-` reads from stdin.
    value: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    telemetry::init_tracing(config.log_format());

    let value = if cli.value == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        cli.value
    };

    let analyzer = Analyzer::from_config(&config)?;
    match analyzer.run_analysis(cli.mode.into(), &value).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(err) => bail!("{err} ({:?})", err.kind()),
    }
}
