use std::time::Duration;

/// One write against the distributed tier. Commands are always sent in
/// batches through `DistributedCacheTrait::exec_atomic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    SetEx {
        key: String,
        value: String,
        ttl: Duration,
    },
    Del {
        key: String,
    },
    SAdd {
        key: String,
        member: String,
    },
    SRem {
        key: String,
        member: String,
    },
}

impl CacheCommand {
    pub fn set_ex(key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        Self::SetEx {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }

    pub fn del(key: impl Into<String>) -> Self {
        Self::Del { key: key.into() }
    }

    pub fn sadd(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self::SAdd {
            key: key.into(),
            member: member.into(),
        }
    }

    pub fn srem(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self::SRem {
            key: key.into(),
            member: member.into(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::SetEx { key, .. }
            | Self::Del { key }
            | Self::SAdd { key, .. }
            | Self::SRem { key, .. } => key,
        }
    }
}
