//! Connectivity monitor: a two-state machine fed with reachability signals.
//! It only reports edges; probing the network is someone else's job.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn from_online(online: bool) -> Self {
        if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Online => write!(f, "Online"),
            Connectivity::Offline => write!(f, "Offline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOffline,
    CameOnline,
}

/// Whatever tells us whether the server can be reached right now.
pub trait Reachability {
    fn is_online(&self) -> bool;
}

/// Reachability pinned to one answer (`--offline`, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedReachability(pub bool);

impl Reachability for FixedReachability {
    fn is_online(&self) -> bool {
        self.0
    }
}

#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: Connectivity,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        Self { state: initial }
    }

    /// Start from what the platform reports right now.
    pub fn from_probe(probe: &dyn Reachability) -> Self {
        Self::new(Connectivity::from_online(probe.is_online()))
    }

    pub fn state(&self) -> Connectivity {
        self.state
    }

    /// Feed one platform signal. Every change of state yields exactly one
    /// transition; a signal repeating the current state yields none.
    pub fn signal(&mut self, reported: Connectivity) -> Option<Transition> {
        if reported == self.state {
            return None;
        }
        self.state = reported;
        Some(match reported {
            Connectivity::Online => Transition::CameOnline,
            Connectivity::Offline => Transition::WentOffline,
        })
    }

    /// Ask the probe and feed its answer.
    pub fn poll(&mut self, probe: &dyn Reachability) -> Option<Transition> {
        self.signal(Connectivity::from_online(probe.is_online()))
    }
}
