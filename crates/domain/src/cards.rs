//! Influence cards and the role they represent.

use serde::{Deserialize, Serialize};

/// The five role kinds. Each starts the deck with three copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Duke,
        Role::Assassin,
        Role::Captain,
        Role::Ambassador,
        Role::Contessa,
    ];

    /// Copies of this role in a starting 15-card deck.
    pub const COPIES_PER_ROLE: usize = 3;
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Duke => "duke",
            Role::Assassin => "assassin",
            Role::Captain => "captain",
            Role::Ambassador => "ambassador",
            Role::Contessa => "contessa",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_multiset_has_fifteen_cards() {
        assert_eq!(Role::ALL.len() * Role::COPIES_PER_ROLE, 15);
    }
}
