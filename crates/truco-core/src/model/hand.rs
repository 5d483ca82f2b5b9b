use crate::model::card::Card;
use serde::{Deserialize, Serialize};
use std::vec::Vec;

/// An ordered hand of at most three cards.
///
/// Order is the deal order and is preserved: actions address cards by index,
/// so sorting here would silently change what a `PlayCard` action means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn index_of(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn highest(&self) -> Option<Card> {
        self.cards.iter().copied().max_by_key(|c| c.hierarchy())
    }

    pub fn lowest(&self) -> Option<Card> {
        self.cards.iter().copied().min_by_key(|c| c.hierarchy())
    }
}
