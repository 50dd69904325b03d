use definitions::Drill;
use linkcore::protocol::session::Transfer;
use serde::Serialize;

const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const MAGENTA: &str = "\x1b[95m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Rounded percentage of passed tests, None when nothing ran.
    pub fn success_rate(&self) -> Option<f64> {
        (self.total() > 0).then(|| (self.passed as f64 / self.total() as f64 * 100.0).round())
    }
}

/// One JSON line of `--json` output.
#[derive(Debug, Serialize)]
pub struct TestReport<'a> {
    pub test: usize,
    pub descriptor: &'a str,
    pub drill: Option<Drill>,
    pub passed: bool,
    pub sent_bits: Option<usize>,
    pub captured_bits: Option<usize>,
    pub first_mismatch: Option<usize>,
    pub error: Option<String>,
}

impl<'a> TestReport<'a> {
    pub fn new(test: usize, descriptor: &'a str) -> Self {
        Self {
            test,
            descriptor,
            drill: Drill::parse(descriptor).ok(),
            passed: false,
            sent_bits: None,
            captured_bits: None,
            first_mismatch: None,
            error: None,
        }
    }

    pub fn with_transfer(mut self, transfer: &Transfer) -> Self {
        self.passed = transfer.verdict();
        self.sent_bits = Some(transfer.sent.len());
        self.captured_bits = Some(transfer.record.len());
        self.first_mismatch = transfer.first_mismatch();
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.passed = false;
        self.error = Some(error.to_string());
        self
    }
}

pub fn header() -> String {
    format!("{MAGENTA}TESTING COMM ACCURACY...{RESET}")
}

pub fn test_line(test: usize, passed: bool) -> String {
    let verdict = if passed {
        format!("{GREEN}PASSED{RESET}")
    } else {
        format!("{RED}FAILED{RESET}")
    };
    format!("TEST {test:03}: [{verdict}]")
}

pub fn summary(tally: &Tally) -> Vec<String> {
    let counts = format!("{GREEN}{}{RESET}/{RED}{}{RESET}", tally.passed, tally.failed);
    let mut lines = vec![format!("{counts:>36}")];
    if let Some(rate) = tally.success_rate() {
        let color = if rate > 99.0 {
            GREEN
        } else if rate > 95.0 {
            YELLOW
        } else {
            RED
        };
        let rate = format!("{rate}%");
        lines.push(format!("{color}{rate:>18}{RESET}"));
    }
    lines
}
