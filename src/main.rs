use std::io::{BufWriter, Write};

use anyhow::Result;
use perfagg::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the data lines; logs go to stderr.
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "{} starting",
        env!("CARGO_PKG_NAME")
    );

    let app_config = config::AppConfig::load()?;
    let rule_set = rules::RuleSet::load(&app_config.rules.path, &app_config.rules.section)?;
    let mut processor = pipeline::Processor::from_rule_set(&rule_set)?;
    for unit in processor.pipeline().units() {
        tracing::debug!(
            object = unit.source_object(),
            expression = unit.expression().source(),
            "aggregator ready"
        );
    }

    // Parse the whole input before encoding anything: a bad line must not leave
    // half-populated dictionaries behind.
    let samples = input::read_samples(&app_config.input.path, app_config.input.read_options())?;
    let encoded = processor.process(samples);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    output::write_samples(&mut out, &encoded)?;
    if app_config.output.print_dictionaries {
        output::write_dictionaries(&mut out, processor.encoder())?;
    }
    out.flush()?;

    Ok(())
}
