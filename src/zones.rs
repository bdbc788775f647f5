//! Card piles (Deck, Hand, Discard)
//!
//! Every card a player owns sits in exactly one pile. Multi-pile updates
//! (draw, reshuffle) are computed as one transition producing the next set
//! of piles, then swapped in, so no caller can observe a half-moved card.

use crate::core::CardId;
use crate::{BattleError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Different piles where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand,
    Discard,
}

/// An ordered pile of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,

    /// Cards in this pile; for the deck the top is the end of the vec
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: Zone) -> Self {
        CardZone {
            zone_type,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            // remove() keeps hand order stable for deterministic controllers
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw from top (for the deck)
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    /// Look at top card without removing it
    pub fn peek_top(&self) -> Option<CardId> {
        self.cards.last().copied()
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// Result of a draw request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawOutcome {
    pub drawn: SmallVec<[CardId; 4]>,
    /// The discard pile was shuffled back into the deck during the draw
    pub reshuffled: bool,
}

impl DrawOutcome {
    /// Deck and discard ran dry before anything was drawn
    pub fn is_exhausted(&self) -> bool {
        self.drawn.is_empty()
    }
}

/// Deck, hand and discard of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPiles {
    pub deck: CardZone,
    pub hand: CardZone,
    pub discard: CardZone,
    /// Cards owned, fixed for the whole battle
    total: usize,
}

impl CardPiles {
    /// Put every owned card in the deck (unshuffled)
    pub fn new(cards: Vec<CardId>) -> Self {
        let total = cards.len();
        CardPiles {
            deck: CardZone {
                zone_type: Zone::Deck,
                cards,
            },
            hand: CardZone::new(Zone::Hand),
            discard: CardZone::new(Zone::Discard),
            total,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn shuffle_deck(&mut self, rng: &mut impl Rng) {
        self.deck.shuffle(rng);
    }

    /// Compute the piles after drawing `count` cards
    ///
    /// When the deck runs out and the discard pile has cards, the discard pile
    /// is shuffled into the deck and drawing continues. When both are empty
    /// the draw simply yields fewer cards.
    pub fn drawn(&self, count: usize, rng: &mut impl Rng) -> (CardPiles, DrawOutcome) {
        let mut next = self.clone();
        let mut outcome = DrawOutcome::default();

        for _ in 0..count {
            if next.deck.is_empty() {
                if next.discard.is_empty() {
                    break;
                }
                next.deck.cards.append(&mut next.discard.cards);
                next.deck.shuffle(rng);
                outcome.reshuffled = true;
            }
            if let Some(card) = next.deck.draw_top() {
                next.hand.add(card);
                outcome.drawn.push(card);
            }
        }

        debug_assert_eq!(next.count_all(), self.total);
        (next, outcome)
    }

    /// Draw `count` cards in one step
    pub fn draw(&mut self, count: usize, rng: &mut impl Rng) -> DrawOutcome {
        let (next, outcome) = self.drawn(count, rng);
        *self = next;
        outcome
    }

    /// Draw until the hand holds `cap` cards (never discards down)
    pub fn draw_up_to(&mut self, cap: usize, rng: &mut impl Rng) -> DrawOutcome {
        let missing = cap.saturating_sub(self.hand.len());
        self.draw(missing, rng)
    }

    /// Move a card from hand to discard (played or manually discarded)
    pub fn discard_from_hand(&mut self, card_id: CardId) -> bool {
        if !self.hand.remove(card_id) {
            return false;
        }
        self.discard.add(card_id);
        true
    }

    /// Add a newly owned card straight to the hand
    pub fn add_to_hand(&mut self, card_id: CardId) {
        self.hand.add(card_id);
        self.total += 1;
    }

    fn count_all(&self) -> usize {
        self.deck.len() + self.hand.len() + self.discard.len()
    }

    /// Verify that no card was lost or duplicated
    pub fn check_total(&self) -> Result<()> {
        let count = self.count_all();
        if count != self.total {
            return Err(BattleError::InvariantViolation(format!(
                "piles hold {count} cards, expected {}",
                self.total
            )));
        }
        let mut seen: Vec<CardId> = self
            .deck
            .cards
            .iter()
            .chain(&self.hand.cards)
            .chain(&self.discard.cards)
            .copied()
            .collect();
        seen.sort();
        seen.dedup();
        if seen.len() != self.total {
            return Err(BattleError::InvariantViolation(
                "a card sits in two piles".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn piles(n: u32) -> CardPiles {
        CardPiles::new((0..n).map(EntityId::new).collect())
    }

    #[test]
    fn test_card_zone() {
        let mut zone = CardZone::new(Zone::Hand);
        let card1 = EntityId::new(10);
        let card2 = EntityId::new(11);

        zone.add(card1);
        zone.add(card2);
        assert_eq!(zone.len(), 2);
        assert!(zone.contains(card1));

        assert!(zone.remove(card1));
        assert!(!zone.remove(card1));
        assert_eq!(zone.len(), 1);
        assert_eq!(zone.peek_top(), Some(card2));
    }

    #[test]
    fn test_draw_up_to_cap() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let mut p = piles(10);

        let out = p.draw_up_to(5, &mut rng);
        assert_eq!(out.drawn.len(), 5);
        assert_eq!(p.hand.len(), 5);

        // Already at cap: nothing drawn, nothing discarded
        let out = p.draw_up_to(5, &mut rng);
        assert!(out.drawn.is_empty());
        assert_eq!(p.hand.len(), 5);

        // Above cap is never forced down
        p.draw(2, &mut rng);
        p.draw_up_to(5, &mut rng);
        assert_eq!(p.hand.len(), 7);
    }

    #[test]
    fn test_reshuffle_when_deck_empty() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let mut p = piles(4);
        p.draw(4, &mut rng);
        let hand: Vec<_> = p.hand.cards.clone();
        for card in &hand[..3] {
            assert!(p.discard_from_hand(*card));
        }
        assert!(p.deck.is_empty());
        assert_eq!(p.discard.len(), 3);

        let out = p.draw(2, &mut rng);
        assert!(out.reshuffled);
        assert_eq!(out.drawn.len(), 2);
        assert!(p.discard.is_empty());
        assert_eq!(p.deck.len(), 1);
        p.check_total().unwrap();
    }

    #[test]
    fn test_exhausted_source_yields_nothing() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let mut p = piles(2);
        p.draw(2, &mut rng);

        let out = p.draw(3, &mut rng);
        assert!(out.is_exhausted());
        assert!(!out.reshuffled);
        assert_eq!(p.hand.len(), 2);
    }

    #[test]
    fn test_drawn_leaves_original_untouched() {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let p = piles(6);
        let (next, out) = p.drawn(3, &mut rng);
        assert_eq!(p.hand.len(), 0);
        assert_eq!(next.hand.len(), 3);
        assert_eq!(out.drawn.len(), 3);
    }

    #[test]
    fn test_cardinality_invariant_over_random_operations() {
        use rand::Rng;

        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let mut p = piles(12);
        p.shuffle_deck(&mut rng);

        for _ in 0..500 {
            match rng.gen_range(0..3) {
                0 => {
                    let n = rng.gen_range(0..4);
                    p.draw(n, &mut rng);
                }
                1 => {
                    if !p.hand.is_empty() {
                        let idx = rng.gen_range(0..p.hand.len());
                        let card = p.hand.cards[idx];
                        assert!(p.discard_from_hand(card));
                    }
                }
                _ => {
                    p.draw_up_to(5, &mut rng);
                }
            }
            assert_eq!(p.deck.len() + p.hand.len() + p.discard.len(), 12);
        }
        p.check_total().unwrap();
    }
}
