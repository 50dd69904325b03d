use std::path::PathBuf;

use linkcore::std::SYSFS_GPIO_ROOT;

/// Where the sessions run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// in-memory loopback wiring, real time
    Loopback,
    /// in-memory loopback wiring, simulated time: fast and deterministic
    Virtual,
    /// real pins through the Linux sysfs interface, DATA_OUT/CLOCK_OUT have to be wired to
    /// DATA_IN/CLOCK_IN
    Sysfs(PathBuf),
}

impl Backend {
    pub fn parse(s: &str) -> Result<Backend, String> {
        match s {
            "loopback" => Ok(Backend::Loopback),
            "virtual" => Ok(Backend::Virtual),
            "sysfs" => Ok(Backend::Sysfs(PathBuf::from(SYSFS_GPIO_ROOT))),
            _ => match s.strip_prefix("sysfs:") {
                Some(root) if !root.is_empty() => Ok(Backend::Sysfs(PathBuf::from(root))),
                _ => Err(format!(
                    "unknown backend {s:?}, expected loopback, virtual, sysfs or sysfs:<gpio root>"
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backends() {
        assert_eq!(Backend::parse("loopback"), Ok(Backend::Loopback));
        assert_eq!(Backend::parse("virtual"), Ok(Backend::Virtual));
        assert_eq!(
            Backend::parse("sysfs"),
            Ok(Backend::Sysfs(PathBuf::from("/sys/class/gpio")))
        );
        assert_eq!(
            Backend::parse("sysfs:/tmp/gpio"),
            Ok(Backend::Sysfs(PathBuf::from("/tmp/gpio")))
        );
        assert!(Backend::parse("sysfs:").is_err());
        assert!(Backend::parse("serial").is_err());
    }
}
