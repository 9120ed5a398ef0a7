use std::path::PathBuf;
use structopt::StructOpt;

use smtpcheck::config::Config;
use smtpcheck::output::{OutputHandler, Report};
use smtpcheck::scanner::Scanner;

/// Report postfix smtpd retries from hosts without reverse DNS
#[derive(StructOpt, Debug)]
#[structopt(name = "smtpcheck", about = "Count smtpd connections from unknown hosts")]
pub struct Cli {
    /// Log file to read, repeatable; "-" reads standard input [default: /var/log/mail.log]
    #[structopt(short = "f", long = "file", parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Minimum number of connections for an address to be reported [default: 20]
    #[structopt(short = "l", long = "limit")]
    limit: Option<u64>,

    /// TOML configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Output format: text, json or jsonl
    #[structopt(long)]
    format: Option<String>,

    /// Skip addresses that are not valid IPv4 (octets above 255, leading zeros)
    #[structopt(long)]
    strict_addresses: bool,

    /// Write the effective configuration to this path and exit
    #[structopt(long, parse(from_os_str))]
    write_config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Cli {
    /// Layer command-line overrides on top of the loaded configuration
    fn apply(&self, mut config: Config) -> Config {
        if !self.files.is_empty() {
            config.input.log_files = self.files.clone();
        }
        if let Some(limit) = self.limit {
            config.detection.threshold = limit;
        }
        if let Some(ref format) = self.format {
            config.output.format = format.clone();
        }
        if self.strict_addresses {
            config.detection.strict_addresses = true;
        }
        config
    }
}

fn main() {
    let cli = Cli::from_args();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("smtpcheck: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let base = match cli.config {
        Some(ref path) => {
            let config = Config::from_file(path)?;
            log::info!("Configuration loaded from {:?}", path);
            config
        }
        None => Config::default(),
    };
    let config = cli.apply(base);
    config.validate()?;

    if let Some(ref output) = cli.write_config {
        config.to_file(output)?;
        println!("Configuration written to: {:?}", output);
        return Ok(());
    }

    let format = config.output_format()?;

    let mut scanner = Scanner::from_config(&config)?;
    scanner.scan_sources(&config.input.log_files)?;
    let summary = scanner.finish();

    let report = Report::build(&summary, config.detection.threshold);
    let mut output_handler = OutputHandler::stdout(format);
    output_handler.write_report(&report)?;

    Ok(())
}
