use std::fmt;
use std::str::FromStr;

/// What happens when the store write succeeded but mirroring it into the
/// cache did not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheWritePolicy {
    /// Fail the call with a cache error.
    #[default]
    Strict,
    /// Log, drop the local copy and report success.
    BestEffort,
}

impl FromStr for CacheWritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "best-effort" => Ok(Self::BestEffort),
            other => Err(format!(
                "CACHE_WRITE_POLICY must be 'strict' or 'best-effort', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for CacheWritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_policies() {
        assert_eq!("strict".parse(), Ok(CacheWritePolicy::Strict));
        assert_eq!("best-effort".parse(), Ok(CacheWritePolicy::BestEffort));
        assert!("Strict".parse::<CacheWritePolicy>().is_err());
        assert_eq!(CacheWritePolicy::default(), CacheWritePolicy::Strict);
    }
}
