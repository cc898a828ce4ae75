//! Single-pass catalog index builder
//!
//! Consumes walker events for the master catalog and fills one
//! `ContainerIndex` per set. State is limited to the current set code, the
//! section being read and the record in flight (a sealed product or card,
//! one deck's card list, or one booster code's sheets). A set's tables are
//! only committed when its object closes, so a set is either fully present
//! in the index or absent.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{walk_reader, EventSink, JsonEvent, PathSegment, Scalar};
use super::index::{CardRef, CatalogIndex, ContainerIndex, Finish};
use crate::diagnostics::Diagnostics;

/// Failures that stop the catalog pass entirely
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to open catalog {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which part of a set object the walker is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Booster,
    Decks,
    SealedProduct,
    Cards,
}

impl Section {
    fn from_key(key: &str) -> Self {
        match key {
            "booster" => Section::Booster,
            "decks" => Section::Decks,
            "sealedProduct" => Section::SealedProduct,
            "cards" => Section::Cards,
            _ => Section::None,
        }
    }
}

/// Fields of the sealed product or card currently being read
#[derive(Debug, Default)]
struct PendingRecord {
    key: Option<String>,
    id: Option<String>,
    name: Option<String>,
}

/// One entry of a deck's card list
#[derive(Debug, Default)]
struct PendingDeckCard {
    id: Option<String>,
    foil: bool,
    etched: bool,
    finish: Option<Finish>,
}

/// The deck currently being read
#[derive(Debug, Default)]
struct PendingDeck {
    name: Option<String>,
    cards: BTreeSet<CardRef>,
    card: PendingDeckCard,
}

#[derive(Debug, Default)]
struct PendingSheet {
    cards: Vec<Uuid>,
    foil: bool,
}

/// Sheets of the booster code currently being read
#[derive(Debug, Default)]
struct PendingBooster {
    used_sheets: BTreeSet<String>,
    sheets: BTreeMap<String, PendingSheet>,
}

/// Deck boards that list tokens rather than cards
const TOKEN_BOARD: &str = "tokens";

/// Event-driven builder for [`CatalogIndex`]
pub struct IndexBuilder<'d> {
    root: Option<String>,
    index: CatalogIndex,
    diagnostics: &'d mut Diagnostics,
    current: Option<String>,
    building: Option<ContainerIndex>,
    section: Section,
    pending: PendingRecord,
    deck: PendingDeck,
    booster: PendingBooster,
}

impl<'d> IndexBuilder<'d> {
    /// Builder for a document whose top-level object is keyed by set code
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            root: None,
            index: CatalogIndex::new(),
            diagnostics,
            current: None,
            building: None,
            section: Section::None,
            pending: PendingRecord::default(),
            deck: PendingDeck::default(),
            booster: PendingBooster::default(),
        }
    }

    /// Read sets from under a top-level key (`data` in AllPrintings.json)
    pub fn under_key(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Run the pass over `reader` and return the frozen index
    pub fn build<R: Read>(mut self, reader: R) -> Result<CatalogIndex, CatalogError> {
        walk_reader(reader, &mut self)?;
        info!(
            containers = self.index.container_count(),
            "Catalog index built"
        );
        Ok(self.index)
    }

    /// Path relative to the set map, or `None` for events outside it
    fn relative<'p>(&self, path: &'p [PathSegment]) -> Option<&'p [PathSegment]> {
        match &self.root {
            None => Some(path),
            Some(root) => match path.split_first() {
                Some((PathSegment::Key(first), rest)) if first == root => Some(rest),
                _ => None,
            },
        }
    }

    fn container_code(&self) -> &str {
        self.current.as_deref().unwrap_or_default()
    }

    fn enter_container(&mut self, code: &str) {
        self.current = Some(code.to_string());
        self.building = None;
        self.section = Section::None;
        self.deck = PendingDeck::default();
        self.booster = PendingBooster::default();
    }

    fn finish_container(&mut self) {
        if let (Some(code), Some(container)) = (self.current.as_deref(), self.building.take()) {
            debug!(
                set = code,
                boosters = container.booster_codes.len(),
                decks = container.deck_names.len(),
                sealed = container.sealed_product_ids.len(),
                cards = container.card_ids.len(),
                "Indexed set"
            );
            self.index.insert(code, container);
        }
        self.section = Section::None;
    }

    fn on_set_event(&mut self, event: JsonEvent<'_>) {
        match event {
            JsonEvent::StartMap => self.building = Some(ContainerIndex::default()),
            JsonEvent::EndMap => self.finish_container(),
            JsonEvent::MapKey(key) => self.section = Section::from_key(key),
            JsonEvent::StartArray | JsonEvent::Scalar(_) => {
                let code = self.container_code().to_string();
                self.diagnostics
                    .catalog_anomaly(&code, "Set entry is not an object, skipped");
            }
            JsonEvent::EndArray => {}
        }
    }

    fn on_section_event(&mut self, inner: &[PathSegment], event: JsonEvent<'_>) {
        if self.building.is_none() {
            return;
        }

        use PathSegment::{Item, Key};

        match (self.section, inner, event) {
            (Section::Booster, [], JsonEvent::MapKey(code)) => {
                if let Some(container) = self.building.as_mut() {
                    container.booster_codes.insert(code.to_string());
                }
            }
            (Section::Booster, [Key(_)], JsonEvent::StartMap) => {
                self.booster = PendingBooster::default();
            }
            (
                Section::Booster,
                [Key(_), Key(boosters), Item, Key(contents)],
                JsonEvent::MapKey(sheet),
            ) if boosters == "boosters" && contents == "contents" => {
                self.booster.used_sheets.insert(sheet.to_string());
            }
            (
                Section::Booster,
                [Key(_), Key(sheets), Key(sheet), Key(cards)],
                JsonEvent::MapKey(id),
            ) if sheets == "sheets" && cards == "cards" => self.sheet_card(sheet, id),
            (
                Section::Booster,
                [Key(_), Key(sheets), Key(sheet), Key(foil)],
                JsonEvent::Scalar(Scalar::Bool(value)),
            ) if sheets == "sheets" && foil == "foil" => {
                self.booster.sheets.entry(sheet.clone()).or_default().foil = value;
            }
            (Section::Booster, [Key(code)], JsonEvent::EndMap) => self.commit_booster(code),
            (Section::Decks, [Item], JsonEvent::StartMap) => self.deck = PendingDeck::default(),
            (Section::Decks, [Item, Key(field)], JsonEvent::Scalar(value)) if field == "name" => {
                if let (Some(container), Scalar::Str(name)) = (self.building.as_mut(), value) {
                    container.deck_names.insert(name.to_string());
                    self.deck.name = Some(name.to_string());
                }
            }
            (Section::Decks, [Item, Key(board), Item], JsonEvent::StartMap) if board != TOKEN_BOARD => {
                self.deck.card = PendingDeckCard::default();
            }
            (Section::Decks, [Item, Key(board), Item, Key(field)], JsonEvent::Scalar(value))
                if board != TOKEN_BOARD =>
            {
                self.deck_card_field(field, value)
            }
            (Section::Decks, [Item, Key(board), Item], JsonEvent::EndMap) if board != TOKEN_BOARD => {
                self.commit_deck_card()
            }
            (Section::Decks, [Item], JsonEvent::EndMap) => self.commit_deck(),
            (Section::SealedProduct | Section::Cards, [PathSegment::Item], JsonEvent::StartMap) => {
                self.pending = PendingRecord::default();
            }
            (
                Section::SealedProduct | Section::Cards,
                [PathSegment::Item, PathSegment::Key(field)],
                JsonEvent::Scalar(value),
            ) => self.record_field(field, value),
            (Section::SealedProduct, [PathSegment::Item], JsonEvent::EndMap) => {
                self.commit_sealed_product()
            }
            (Section::Cards, [PathSegment::Item], JsonEvent::EndMap) => self.commit_card(),
            _ => {}
        }
    }

    fn sheet_card(&mut self, sheet: &str, raw_id: &str) {
        match Uuid::parse_str(raw_id) {
            Ok(id) => self
                .booster
                .sheets
                .entry(sheet.to_string())
                .or_default()
                .cards
                .push(id),
            Err(_) => {
                let code = self.container_code().to_string();
                self.diagnostics.catalog_anomaly(
                    &code,
                    format!("Booster sheet {sheet} has an invalid card uuid {raw_id}, skipped"),
                );
            }
        }
    }

    /// Keep the cards of every sheet a booster of `code` draws from
    fn commit_booster(&mut self, code: &str) {
        let booster = std::mem::take(&mut self.booster);
        let mut cards = BTreeSet::new();

        for (name, sheet) in booster.sheets {
            if !booster.used_sheets.contains(&name) {
                continue;
            }
            let finish = if name.to_lowercase().contains("etched") {
                Finish::Etched
            } else {
                Finish::from_flags(sheet.foil, false)
            };
            cards.extend(sheet.cards.into_iter().map(|uuid| CardRef { uuid, finish }));
        }

        if let (Some(container), false) = (self.building.as_mut(), cards.is_empty()) {
            container.booster_cards.insert(code.to_string(), cards);
        }
    }

    fn deck_card_field(&mut self, field: &str, value: Scalar<'_>) {
        let card = &mut self.deck.card;
        match (field, value) {
            ("uuid", value) => card.id = value.to_text(),
            ("isFoil", Scalar::Bool(flag)) => card.foil = flag,
            ("isEtched", Scalar::Bool(flag)) => card.etched = flag,
            ("finish", Scalar::Str(finish)) => card.finish = Finish::parse(finish),
            _ => {}
        }
    }

    /// Deck list entries without a usable uuid are not cards we can link
    fn commit_deck_card(&mut self) {
        let card = std::mem::take(&mut self.deck.card);
        let Some(uuid) = card.id.and_then(|id| Uuid::parse_str(&id).ok()) else {
            return;
        };
        let finish = card
            .finish
            .unwrap_or_else(|| Finish::from_flags(card.foil, card.etched));
        self.deck.cards.insert(CardRef { uuid, finish });
    }

    fn commit_deck(&mut self) {
        let deck = std::mem::take(&mut self.deck);
        if let (Some(container), Some(name), false) =
            (self.building.as_mut(), deck.name, deck.cards.is_empty())
        {
            container.deck_cards.entry(name).or_default().extend(deck.cards);
        }
    }

    fn record_field(&mut self, field: &str, value: Scalar<'_>) {
        let key_field = match self.section {
            Section::SealedProduct => "name",
            _ => "number",
        };

        if field == key_field {
            self.pending.key = value.to_text();
        } else if field == "uuid" {
            self.pending.id = value.to_text();
        } else if field == "name" {
            self.pending.name = value.to_text();
        }
    }

    /// Validate the pending record, reporting anything unusable
    fn take_pending(&mut self, what: &str) -> Option<(String, Uuid, Option<String>)> {
        let pending = std::mem::take(&mut self.pending);
        let code = self.container_code().to_string();

        let Some(key) = pending.key.filter(|k| !k.is_empty()) else {
            self.diagnostics
                .catalog_anomaly(&code, format!("{what} without a name or number, skipped"));
            return None;
        };

        let Some(raw_id) = pending.id else {
            self.diagnostics
                .catalog_anomaly(&code, format!("{what} {key} has no uuid, skipped"));
            return None;
        };

        match Uuid::parse_str(&raw_id) {
            Ok(id) => Some((key, id, pending.name)),
            Err(_) => {
                self.diagnostics.catalog_anomaly(
                    &code,
                    format!("{what} {key} has an invalid uuid {raw_id}, skipped"),
                );
                None
            }
        }
    }

    fn commit_sealed_product(&mut self) {
        if let Some((name, id, _)) = self.take_pending("Sealed product") {
            if let Some(container) = self.building.as_mut() {
                container.sealed_product_ids.insert(name, id);
            }
        }
    }

    fn commit_card(&mut self) {
        if let Some((number, id, name)) = self.take_pending("Card") {
            if let Some(container) = self.building.as_mut() {
                container.add_card(number, id, name);
            }
        }
    }
}

impl EventSink for IndexBuilder<'_> {
    fn on_event(&mut self, path: &[PathSegment], event: JsonEvent<'_>) {
        let Some(relative) = self.relative(path) else {
            return;
        };

        match relative {
            [] => {
                if let JsonEvent::MapKey(code) = event {
                    self.enter_container(code);
                }
            }
            [_] => self.on_set_event(event),
            [_, _, inner @ ..] => self.on_section_event(inner, event),
        }
    }
}

/// Build the index from a catalog file on disk
pub fn build_index_from_path(
    path: &Path,
    root: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Result<CatalogIndex, CatalogError> {
    let file = std::fs::File::open(path).map_err(|source| CatalogError::Open {
        path: path.display().to_string(),
        source,
    })?;

    info!("Building catalog index from {}", path.display());

    let builder = IndexBuilder::new(diagnostics);
    let builder = match root {
        Some(root) => builder.under_key(root),
        None => builder,
    };
    builder.build(file)
}
