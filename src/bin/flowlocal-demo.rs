// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive walkthrough of flowlocal's propagation rules.

use clap::{Parser, ValueEnum};
use flowlocal::config::{CorrelationConfig, IdFormat, TimeZone};
use flowlocal::console_logger::ConsoleLogger;
use flowlocal::correlation::CorrelationService;
use flowlocal::demo::Demo;
use std::io::{BufRead, Write};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IdFormatArg {
    Simple,
    Hyphenated,
}

impl From<IdFormatArg> for IdFormat {
    fn from(value: IdFormatArg) -> Self {
        match value {
            IdFormatArg::Simple => IdFormat::Simple,
            IdFormatArg::Hyphenated => IdFormat::Hyphenated,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "flowlocal-demo", version, about = "Context propagation demonstrations")]
struct Cli {
    /// Run one demo (1-3) and exit instead of showing the menu
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    demo: Option<u8>,

    /// Shape of generated correlation ids
    #[arg(long, value_enum, default_value = "simple")]
    id_format: IdFormatArg,

    /// Stamp log lines with local time instead of UTC
    #[arg(long)]
    local_time: bool,

    /// Write output to stderr instead of stdout
    #[arg(long)]
    stderr: bool,
}

impl Cli {
    fn config(&self) -> CorrelationConfig {
        CorrelationConfig::default()
            .with_id_format(self.id_format.into())
            .with_time_zone(if self.local_time {
                TimeZone::Local
            } else {
                TimeZone::Utc
            })
    }
}

fn prompt(text: &str) -> std::io::Result<Option<String>> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    Ok((read > 0).then_some(line))
}

async fn menu() -> anyhow::Result<()> {
    loop {
        // clear screen
        print!("\x1B[2J\x1B[1;1H");
        println!("Context Propagation Demonstration");
        println!("=================================\n");
        for (n, demo) in Demo::ALL.iter().enumerate() {
            println!("{}. {demo}", n + 1);
        }
        println!("{}. Exit\n", Demo::ALL.len() + 1);

        let Some(choice) = prompt(&format!("Select an option (1-{}): ", Demo::ALL.len() + 1))? else {
            return Ok(());
        };
        match Demo::from_choice(&choice) {
            Some(demo) => {
                if let Err(e) = demo.run().await {
                    flowlocal::dispatch::error(&format!("An error occurred: {e:#}"));
                }
            }
            None if choice.trim() == (Demo::ALL.len() + 1).to_string() => {
                println!("\nThank you for exploring flowlocal!");
                return Ok(());
            }
            None => println!("\nInvalid option. Please try again."),
        }
        flowlocal::global_logger::prepare_to_die();
        if prompt("\nPress Enter to continue...")?.is_none() {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.stderr {
        flowlocal::set_global_loggers(vec![Arc::new(ConsoleLogger::stderr())]);
    }
    CorrelationService::init_global(CorrelationService::new(cli.config()))
        .map_err(|_| anyhow::anyhow!("correlation service already initialized"))?;

    let result = match cli.demo {
        Some(n) => match Demo::from_choice(&n.to_string()) {
            Some(demo) => demo.run().await,
            None => Err(anyhow::anyhow!("no demo numbered {n}")),
        },
        None => menu().await,
    };
    flowlocal::global_logger::prepare_to_die();
    result
}
