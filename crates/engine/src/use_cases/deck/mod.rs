//! Deck Manager: shuffle, draw, return, reveal, swap. All operations
//! are pure transformations of a `Vec<Role>` pair (deck, revealed); the
//! caller persists the result within the same transaction as whatever
//! triggered the draw.

use coup_domain::Role;
use rand::seq::SliceRandom;
use rand::Rng;

pub struct DeckManager;

impl DeckManager {
    /// Builds a fresh 15-card deck (three of each role) and shuffles it.
    pub fn init<R: Rng>(rng: &mut R) -> Vec<Role> {
        let mut deck: Vec<Role> = Role::ALL
            .iter()
            .flat_map(|r| std::iter::repeat(*r).take(Role::COPIES_PER_ROLE))
            .collect();
        deck.shuffle(rng);
        deck
    }

    /// Pops `n` cards off the deck. Returns fewer than `n` if the deck
    /// is short — insufficient deck is never an error.
    pub fn draw(deck: &mut Vec<Role>, n: usize) -> Vec<Role> {
        (0..n).filter_map(|_| deck.pop()).collect()
    }

    /// Returns cards to the deck, optionally reshuffling.
    pub fn return_cards<R: Rng>(deck: &mut Vec<Role>, cards: Vec<Role>, shuffle: bool, rng: &mut R) {
        deck.extend(cards);
        if shuffle {
            deck.shuffle(rng);
        }
    }

    /// Deals two cards to each of `player_count` players, in order.
    pub fn deal(deck: &mut Vec<Role>, player_count: usize) -> Vec<Vec<Role>> {
        (0..player_count).map(|_| Self::draw(deck, 2)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn init_produces_fifteen_cards_three_of_each() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let deck = DeckManager::init(&mut rng);
        assert_eq!(deck.len(), 15);
        for role in Role::ALL {
            assert_eq!(deck.iter().filter(|r| **r == role).count(), 3);
        }
    }

    #[test]
    fn deal_gives_two_cards_per_player() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut deck = DeckManager::init(&mut rng);
        let hands = DeckManager::deal(&mut deck, 3);
        assert_eq!(hands.len(), 3);
        assert!(hands.iter().all(|h| h.len() == 2));
        assert_eq!(deck.len(), 9);
    }

    #[test]
    fn draw_beyond_deck_size_does_not_panic() {
        let mut deck = vec![Role::Duke];
        let drawn = DeckManager::draw(&mut deck, 5);
        assert_eq!(drawn.len(), 1);
        assert!(deck.is_empty());
    }
}
