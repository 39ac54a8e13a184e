//! Evidence board: card categorization under a capped commit budget.
//!
//! A card enters the committed set the first time it receives a category.
//! Once committed it can be re-categorized freely; that never touches the
//! budget. A card can only get a category through [`EvidenceBoard::commit`],
//! so the categorized cards are always exactly the committed set and never
//! exceed the capacity.

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::content::CardSpec;
use crate::error::{CasebookError, ReferenceKind, Result};

/// Runtime state of one evidence card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCard {
    /// Stable unique identifier.
    pub id: String,
    /// Display text.
    pub text: String,
    /// Hint text.
    pub hint: String,
    /// Suggested category from content (informational only).
    pub category_hint: Option<Category>,
    /// Category the player assigned, if any.
    pub category: Option<Category>,
}

impl EvidenceCard {
    /// Create an unassigned card from its content definition.
    pub fn from_content(card: &CardSpec) -> Self {
        Self {
            id: card.id.clone(),
            text: card.text.clone(),
            hint: card.hint.clone(),
            category_hint: card.category_hint,
            category: None,
        }
    }

    /// Whether the player has assigned a category.
    pub fn is_assigned(&self) -> bool {
        self.category.is_some()
    }
}

/// What a successful commit changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
    /// True the first time this card was committed (budget consumed).
    pub newly_committed: bool,
    /// Category held before this commit.
    pub previous: Option<Category>,
}

/// Per-category counts over categorized cards, in [`Category::all`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally([usize; 3]);

impl Tally {
    /// Count for one category.
    pub fn count(&self, category: Category) -> usize {
        self.0[category.index()]
    }

    /// Total categorized cards.
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Category with a strict plurality, if any.
    ///
    /// `None` when nothing is categorized or when the two highest counts tie.
    pub fn leader(&self) -> Option<Category> {
        let mut ranked: Vec<(Category, usize)> = Category::all()
            .iter()
            .map(|&category| (category, self.count(category)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        match ranked.as_slice() {
            [(_, 0), ..] => None,
            [(_, top), (_, second), ..] if top == second => None,
            [(leader, _), ..] => Some(*leader),
            [] => None,
        }
    }
}

/// Cards plus the ordered set of committed card ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBoard {
    cards: Vec<EvidenceCard>,
    committed: Vec<String>,
    capacity: usize,
}

impl EvidenceBoard {
    /// Create a board with every card unassigned.
    pub fn new(specs: &[CardSpec], capacity: usize) -> Self {
        Self {
            cards: specs.iter().map(EvidenceCard::from_content).collect(),
            committed: Vec::new(),
            capacity,
        }
    }

    /// All cards, in content order.
    pub fn cards(&self) -> &[EvidenceCard] {
        &self.cards
    }

    /// Find a card by id.
    pub fn card(&self, id: &str) -> Option<&EvidenceCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Committed card ids, in commit order.
    pub fn committed(&self) -> &[String] {
        &self.committed
    }

    /// Number of committed cards.
    pub fn committed_count(&self) -> usize {
        self.committed.len()
    }

    /// Maximum number of committed cards.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the commit budget is used up.
    pub fn is_full(&self) -> bool {
        self.committed.len() >= self.capacity
    }

    /// Assign `category` to a card.
    ///
    /// Fails with `UnknownReference` for an id not on the board and with
    /// `CapacityExceeded` when an uncommitted card meets a full board. A
    /// failed commit changes nothing.
    pub fn commit(&mut self, card_id: &str, category: Category) -> Result<Commitment> {
        let full = self.is_full();
        let capacity = self.capacity;
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| CasebookError::unknown(ReferenceKind::Card, card_id))?;

        let previous = card.category;
        let newly_committed = previous.is_none();
        if newly_committed && full {
            return Err(CasebookError::capacity_exceeded(capacity));
        }

        card.category = Some(category);
        if newly_committed {
            self.committed.push(card_id.to_string());
        }

        Ok(Commitment {
            newly_committed,
            previous,
        })
    }

    /// Count categorized cards per category.
    pub fn tally(&self) -> Tally {
        let mut counts = [0usize; 3];
        for category in self.cards.iter().filter_map(|c| c.category) {
            counts[category.index()] += 1;
        }
        Tally(counts)
    }

    /// Leading hypothesis derived from the current assignments.
    pub fn hypothesis(&self) -> Option<Category> {
        self.tally().leader()
    }
}
