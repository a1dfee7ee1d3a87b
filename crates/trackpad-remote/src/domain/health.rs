//! Last-known connectivity to the remote executor.
//!
//! This is the only "error" the user ever sees: a passive indicator, refreshed
//! whenever the channel connects or drops and whenever a fallback request
//! completes.

/// Which path, if any, is currently reaching the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityHealth {
    /// Nothing has been observed yet.
    #[default]
    Unknown,
    /// The low-latency channel is connected.
    Channel,
    /// The channel is down but HTTP requests reach the executor.
    Fallback,
    /// The last fallback request failed at the network level.
    Unreachable,
}

impl ConnectivityHealth {
    /// Background tint for the status indicator.
    pub fn tint(self) -> &'static str {
        match self {
            ConnectivityHealth::Unknown => "neutral",
            ConnectivityHealth::Channel => "green",
            ConnectivityHealth::Fallback => "amber",
            ConnectivityHealth::Unreachable => "red",
        }
    }
}

impl std::fmt::Display for ConnectivityHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectivityHealth::Unknown => "unknown",
            ConnectivityHealth::Channel => "channel",
            ConnectivityHealth::Fallback => "http fallback",
            ConnectivityHealth::Unreachable => "unreachable",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_a_distinct_tint() {
        let tints = [
            ConnectivityHealth::Unknown.tint(),
            ConnectivityHealth::Channel.tint(),
            ConnectivityHealth::Fallback.tint(),
            ConnectivityHealth::Unreachable.tint(),
        ];
        for (i, a) in tints.iter().enumerate() {
            for b in &tints[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
