use std::{
    fs,
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::Parser;
use linkcore::{
    LineInterface, LinkError,
    config::{LinkConfig, Sampling},
    protocol::{SessionClock, session::Session, test_harness::VirtualClock},
    std::{LoopbackLines, SysfsLines, SystemClock},
};
use log::{error, info, warn};

use crate::{
    backend::Backend,
    report::{Tally, TestReport},
    util::serde::deserialize_from_json_file,
};

mod backend;
mod report;
mod util;

/// Sends drill descriptors over the link in loopback and checks they come back unaltered.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// File with one drill descriptor per line
    #[arg(long, default_value = "drills.txt")]
    drills: PathBuf,
    /// How many drills to run, all of them when omitted
    #[arg(short = 'n', long)]
    count: Option<usize>,
    /// loopback, virtual, sysfs or sysfs:<gpio root>
    #[arg(long, default_value = "loopback", value_parser = Backend::parse)]
    backend: Backend,
    /// JSON file with the link configuration, defaults are used for missing fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    pulse_us: Option<u64>,
    #[arg(long)]
    startup_ms: Option<u64>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// level or edge
    #[arg(long, value_parser = parse_sampling)]
    sampling: Option<Sampling>,
    /// Print one JSON object per test instead of the colored report
    #[arg(long)]
    json: bool,
}

fn parse_sampling(s: &str) -> Result<Sampling, String> {
    match s {
        "level" => Ok(Sampling::Level),
        "edge" => Ok(Sampling::Edge),
        _ => Err(format!("unknown sampling {s:?}, expected level or edge")),
    }
}

fn load_config(args: &Args) -> anyhow::Result<LinkConfig> {
    let mut config = match &args.config {
        Some(file) => deserialize_from_json_file(file)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Could not read link configuration from {file:?}"))?,
        None => LinkConfig::default(),
    };
    if let Some(pulse_us) = args.pulse_us {
        config.pulse_width_us = pulse_us;
    }
    if let Some(startup_ms) = args.startup_ms {
        config.startup_delay_ms = startup_ms;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.receive_timeout_ms = timeout_ms;
    }
    if let Some(sampling) = args.sampling {
        config.sampling = sampling;
    }
    Ok(config)
}

/// Reads the descriptors, one per line, skipping blank lines.
fn read_drills(file: &Path, count: Option<usize>) -> anyhow::Result<Vec<String>> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Could not read drills from {file:?}"))?;
    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .take(count.unwrap_or(usize::MAX))
        .map(str::to_string)
        .collect())
}

/// Runs every drill in its own session, one after the other, until `stop` completes.
///
/// A malformed descriptor is a failed test, a line failure stops the whole run. When `stop`
/// completes the running session is still waited for and reported.
async fn run_drills<L, C, S>(
    session: Session<L, C>,
    drills: Vec<String>,
    json: bool,
    stop: S,
) -> anyhow::Result<Tally>
where
    L: LineInterface + Send + Sync + 'static,
    C: SessionClock + Send + Sync + 'static,
    S: Future<Output = ()>,
{
    info!("Running {} drills with {:?}", drills.len(), session.config());
    let session = Arc::new(session);
    let mut tally = Tally::default();
    tokio::pin!(stop);
    for (i, descriptor) in drills.iter().enumerate() {
        let test = i + 1;
        let mut worker = {
            let session = session.clone();
            let descriptor = descriptor.clone();
            tokio::task::spawn_blocking(move || session.transfer(&descriptor))
        };
        let joined = tokio::select! {
            biased;
            _ = &mut stop => None,
            joined = &mut worker => Some(joined),
        };
        let stopping = joined.is_none();
        let result = match joined {
            Some(joined) => joined?,
            None => {
                warn!("Interrupted, stopping after test {test}");
                worker.await?
            }
        };

        let report = TestReport::new(test, descriptor);
        let report = match result {
            Ok(transfer) => report.with_transfer(&transfer),
            Err(e @ LinkError::MalformedDescriptor(_)) => {
                error!("Test {test}: {e}");
                report.with_error(e)
            }
            Err(e) => return Err(e).with_context(|| format!("Test {test} aborted the run")),
        };
        tally.record(report.passed);
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", report::test_line(test, report.passed));
        }
        if stopping {
            break;
        }
    }
    Ok(tally)
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let drills = read_drills(&args.drills, args.count)?;

    if !args.json {
        println!("{}", report::header());
    }
    let tally = match &args.backend {
        Backend::Loopback => {
            let session = Session::new(Arc::new(LoopbackLines::new()), SystemClock, config)?;
            run_drills(session, drills, args.json, ctrl_c()).await?
        }
        Backend::Virtual => {
            let session = Session::new(Arc::new(LoopbackLines::new()), VirtualClock, config)?;
            run_drills(session, drills, args.json, ctrl_c()).await?
        }
        Backend::Sysfs(root) => {
            let lines = SysfsLines::with_root(root, config.pins);
            let session = Session::new(Arc::new(lines), SystemClock, config)?;
            run_drills(session, drills, args.json, ctrl_c()).await?
        }
    };
    if !args.json {
        for line in report::summary(&tally) {
            println!("{line}");
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    const SAMPLE: &str = "072.4188,166.2855;031.2016,035.1107;027.4153,030.8499;000.0,000.0";

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(["comm-accuracy"].iter().chain(extra))
    }

    #[test]
    fn reads_drills() {
        let dir = TempDir::new("drills").unwrap();
        let file = dir.path().join("drills.txt");
        fs::write(&file, format!("{SAMPLE}\r\n\n1,2;3,4;5,6;7,8  \n9,9;9,9;9,9;9,9\n")).unwrap();

        let drills = read_drills(&file, None).unwrap();
        assert_eq!(drills, vec![SAMPLE, "1,2;3,4;5,6;7,8", "9,9;9,9;9,9;9,9"]);
        assert_eq!(read_drills(&file, Some(2)).unwrap().len(), 2);
        assert!(read_drills(&dir.path().join("missing"), None).is_err());
    }

    #[test]
    fn config_file_and_overrides() {
        let dir = TempDir::new("config").unwrap();
        let file = dir.path().join("link.json");
        fs::write(&file, r#"{"pulse_width_us": 250, "sampling": "edge", "pins": {"data_out": 5}}"#)
            .unwrap();

        let config = load_config(&args(&["--config", file.to_str().unwrap()])).unwrap();
        assert_eq!(config.pulse_width_us, 250);
        assert_eq!(config.sampling, Sampling::Edge);
        assert_eq!(config.pins.data_out, 5);
        assert_eq!(config.pins.clock_out, 23);
        assert_eq!(config.startup_delay_ms, 1_000);

        let config = load_config(&args(&[
            "--config",
            file.to_str().unwrap(),
            "--pulse-us",
            "100",
            "--timeout-ms",
            "50",
            "--sampling",
            "level",
        ]))
        .unwrap();
        assert_eq!(config.pulse_width_us, 100);
        assert_eq!(config.receive_timeout_ms, 50);
        assert_eq!(config.sampling, Sampling::Level);

        fs::write(&file, "{").unwrap();
        assert!(load_config(&args(&["--config", file.to_str().unwrap()])).is_err());
    }

    #[tokio::test]
    async fn malformed_drills_count_as_failures() {
        let session =
            Session::new(Arc::new(LoopbackLines::new()), VirtualClock, LinkConfig::default())
                .unwrap();
        let drills = vec![SAMPLE.to_string(), "1,2;3".to_string()];
        let tally = run_drills(session, drills, true, std::future::pending())
            .await
            .unwrap();
        assert_eq!(tally, Tally { passed: 1, failed: 1 });
    }

    #[tokio::test]
    async fn line_failures_abort_the_run() {
        let lines = LoopbackLines::new().with_fault(linkcore::Pin::ClockIn);
        let session = Session::new(Arc::new(lines), VirtualClock, LinkConfig::default()).unwrap();
        let result =
            run_drills(session, vec![SAMPLE.to_string()], true, std::future::pending()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn stopping_finishes_the_running_drill() {
        let session =
            Session::new(Arc::new(LoopbackLines::new()), VirtualClock, LinkConfig::default())
                .unwrap();
        let drills = vec![SAMPLE.to_string(); 3];
        let tally = run_drills(session, drills, true, std::future::ready(()))
            .await
            .unwrap();
        assert_eq!(tally, Tally { passed: 1, failed: 0 });
    }
}
