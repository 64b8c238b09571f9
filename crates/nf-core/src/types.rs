//! Core domain types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Token that selects the "bring terminal to front" action
pub const SILENT_TOKEN: &str = "SILENT";

/// A remote machine the coordinator tunnels to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    /// Logical name, unique within a run
    pub name: String,
    /// Address handed to ssh when opening the tunnel
    pub address: String,
}

impl Host {
    /// Create a new host
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.address {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} @ {}", self.name, self.address)
        }
    }
}

/// The fixed set of hosts known for a run, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet {
    hosts: Vec<Host>,
}

impl HostSet {
    /// Create an empty host set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a host set from `(name, address)` pairs
    pub fn from_pairs<I, N, A>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: Into<String>,
    {
        let mut set = Self::new();
        for (name, address) in pairs {
            set.insert(Host::new(name, address))?;
        }
        Ok(set)
    }

    /// Add a host, rejecting duplicate names
    pub fn insert(&mut self, host: Host) -> Result<(), ConfigError> {
        if self.get(&host.name).is_some() {
            return Err(ConfigError::DuplicateHost(host.name));
        }
        self.hosts.push(host);
        Ok(())
    }

    /// Look up a host by logical name
    pub fn get(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Resolve a caller's declared identity.
    ///
    /// Names take priority; an address is only considered when no host has
    /// that name. Either way the match must be unique.
    pub fn resolve(&self, declared: &str) -> Option<&Host> {
        if let Some(host) = self.get(declared) {
            return Some(host);
        }
        let mut by_address = self.hosts.iter().filter(|h| h.address == declared);
        let first = by_address.next()?;
        if by_address.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Iterate hosts in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Host> {
        self.hosts.iter()
    }

    /// Number of hosts
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl<'a> IntoIterator for &'a HostSet {
    type Item = &'a Host;
    type IntoIter = std::slice::Iter<'a, Host>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.iter()
    }
}

/// Lifecycle state of a reverse tunnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelState {
    /// Registered, process not yet spawned
    Pending,
    /// Process spawned, waiting for the login marker
    Connecting,
    /// Login marker seen, port forward live
    Established,
    /// Shutdown requested
    Closing,
    /// Process gone, resources released
    Closed,
    /// Did not connect, or dropped unexpectedly
    Failed,
}

impl TunnelState {
    /// Whether moving from `self` to `next` is a legal step.
    ///
    /// Teardown may close a tunnel from any state.
    pub fn can_transition_to(self, next: TunnelState) -> bool {
        use TunnelState::*;
        matches!(
            (self, next),
            (Pending, Connecting)
                | (Pending, Failed)
                | (Connecting, Established)
                | (Connecting, Failed)
                | (Established, Failed)
                | (Established, Closing)
                | (Connecting, Closing)
                | (Failed, Closing)
                | (_, Closed)
        ) && self != Closed
    }
}

impl fmt::Display for TunnelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TunnelState::Pending => "pending",
            TunnelState::Connecting => "connecting",
            TunnelState::Established => "established",
            TunnelState::Closing => "closing",
            TunnelState::Closed => "closed",
            TunnelState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A configured local action invoked on success or failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum ActionSpec {
    /// Run these tokens as a process
    Command(Vec<String>),
    /// Bring the terminal window to the foreground
    FocusTerminal,
}

impl ActionSpec {
    /// Resolve CLI/config tokens into an action.
    ///
    /// A lone `SILENT` selects [`ActionSpec::FocusTerminal`]. A single token
    /// containing spaces is split on whitespace, so `-c "say done"` and
    /// `-c say done` are equivalent.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();

        if tokens.len() == 1 {
            tokens = tokens[0].split_whitespace().map(str::to_string).collect();
        }

        match tokens.as_slice() {
            [] => Err(ConfigError::EmptyAction),
            [only] if only == SILENT_TOKEN => Ok(ActionSpec::FocusTerminal),
            _ => Ok(ActionSpec::Command(tokens)),
        }
    }

    /// Default action when a command succeeds
    pub fn default_success() -> Self {
        ActionSpec::Command(vec!["say".to_string(), "your thing is done".to_string()])
    }

    /// Default action when a command fails
    pub fn default_failure() -> Self {
        ActionSpec::Command(vec!["say".to_string(), "your thing has failed".to_string()])
    }
}

impl TryFrom<Vec<String>> for ActionSpec {
    type Error = ConfigError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        // Config files carry explicit token lists, so no whitespace splitting here
        match tokens.as_slice() {
            [] => Err(ConfigError::EmptyAction),
            [only] if only == SILENT_TOKEN => Ok(ActionSpec::FocusTerminal),
            _ => Ok(ActionSpec::Command(tokens)),
        }
    }
}

impl From<ActionSpec> for Vec<String> {
    fn from(action: ActionSpec) -> Self {
        match action {
            ActionSpec::Command(tokens) => tokens,
            ActionSpec::FocusTerminal => vec![SILENT_TOKEN.to_string()],
        }
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSpec::Command(tokens) => write!(f, "<{}>", tokens.join(" ")),
            ActionSpec::FocusTerminal => write!(f, "<bring terminal to front>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> HostSet {
        HostSet::from_pairs([
            ("build1", "10.0.0.5"),
            ("build2", "10.0.0.6"),
            ("mirror-a", "10.0.0.9"),
            ("mirror-b", "10.0.0.9"),
        ])
        .unwrap()
    }

    #[test]
    fn test_host_set_rejects_duplicate_names() {
        let err = HostSet::from_pairs([("a", "1.1.1.1"), ("a", "2.2.2.2")]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateHost(name) if name == "a"));
    }

    #[test]
    fn test_resolve_by_name() {
        let set = hosts();
        assert_eq!(set.resolve("build1").map(|h| h.name.as_str()), Some("build1"));
    }

    #[test]
    fn test_resolve_by_unique_address() {
        let set = hosts();
        assert_eq!(set.resolve("10.0.0.6").map(|h| h.name.as_str()), Some("build2"));
    }

    #[test]
    fn test_resolve_ambiguous_address_fails() {
        let set = hosts();
        assert!(set.resolve("10.0.0.9").is_none());
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(hosts().resolve("laptop").is_none());
    }

    #[test]
    fn test_tunnel_transitions() {
        use TunnelState::*;
        assert!(Pending.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Established));
        assert!(Connecting.can_transition_to(Failed));
        assert!(Established.can_transition_to(Failed));
        assert!(Established.can_transition_to(Closing));
        assert!(Closing.can_transition_to(Closed));
        assert!(Failed.can_transition_to(Closed));

        assert!(!Pending.can_transition_to(Established));
        assert!(!Established.can_transition_to(Connecting));
        assert!(!Closed.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Connecting));
    }

    #[test]
    fn test_action_from_tokens() {
        assert_eq!(
            ActionSpec::from_tokens(["echo", "done"]).unwrap(),
            ActionSpec::Command(vec!["echo".into(), "done".into()])
        );
        assert_eq!(
            ActionSpec::from_tokens(["echo done"]).unwrap(),
            ActionSpec::Command(vec!["echo".into(), "done".into()])
        );
        assert_eq!(
            ActionSpec::from_tokens(["SILENT"]).unwrap(),
            ActionSpec::FocusTerminal
        );
        assert!(matches!(
            ActionSpec::from_tokens(Vec::<String>::new()),
            Err(ConfigError::EmptyAction)
        ));
        assert!(matches!(
            ActionSpec::from_tokens(["   "]),
            Err(ConfigError::EmptyAction)
        ));
    }

    #[test]
    fn test_silent_only_when_alone() {
        assert_eq!(
            ActionSpec::from_tokens(["echo", "SILENT"]).unwrap(),
            ActionSpec::Command(vec!["echo".into(), "SILENT".into()])
        );
    }

    #[test]
    fn test_action_serde() {
        let json = serde_json::to_string(&ActionSpec::FocusTerminal).unwrap();
        assert_eq!(json, r#"["SILENT"]"#);

        let parsed: ActionSpec = serde_json::from_str(r#"["notify-send","build done"]"#).unwrap();
        assert_eq!(
            parsed,
            ActionSpec::Command(vec!["notify-send".into(), "build done".into()])
        );

        assert!(serde_json::from_str::<ActionSpec>("[]").is_err());
    }
}
