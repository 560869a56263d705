//! Acting user identity passed explicitly into every core operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::UserId;

/// Role a user acts under for a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A client booking consultations.
    Client,

    /// An advisor offering consultations.
    Advisor,
}

impl ActorRole {
    /// Parses a role from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "client" => Some(ActorRole::Client),
            "advisor" => Some(ActorRole::Advisor),
            _ => None,
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorRole::Client => "client",
            ActorRole::Advisor => "advisor",
        };
        write!(f, "{}", s)
    }
}

/// The authenticated user on whose behalf an operation runs.
///
/// Core operations never consult request-scoped ambient state; the acting
/// identity is always an explicit parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: UserId, role: ActorRole) -> Self {
        Self { id, role }
    }

    /// Convenience constructor for a client actor.
    pub fn client(id: UserId) -> Self {
        Self::new(id, ActorRole::Client)
    }

    /// Convenience constructor for an advisor actor.
    pub fn advisor(id: UserId) -> Self {
        Self::new(id, ActorRole::Advisor)
    }

    pub fn is_client(&self) -> bool {
        self.role == ActorRole::Client
    }

    pub fn is_advisor(&self) -> bool {
        self.role == ActorRole::Advisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_accepts_known_roles() {
        assert_eq!(ActorRole::parse("client"), Some(ActorRole::Client));
        assert_eq!(ActorRole::parse("advisor"), Some(ActorRole::Advisor));
        assert_eq!(ActorRole::parse("Client"), Some(ActorRole::Client));
    }

    #[test]
    fn role_parse_rejects_unknown_roles() {
        assert_eq!(ActorRole::parse("admin"), None);
        assert_eq!(ActorRole::parse(""), None);
    }

    #[test]
    fn role_display_matches_wire_format() {
        assert_eq!(ActorRole::Client.to_string(), "client");
        assert_eq!(ActorRole::Advisor.to_string(), "advisor");
    }

    #[test]
    fn actor_role_predicates() {
        let actor = Actor::client(UserId::new());
        assert!(actor.is_client());
        assert!(!actor.is_advisor());
    }
}
