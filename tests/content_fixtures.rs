//! Content table fixtures
//!
//! Every file under `content/valid/` must load and validate; every file
//! under `content/invalid/` must be rejected. Add a file to either directory
//! and the `dir-test` macro generates a test for it.

use card_battle_rs::loader::{BattleInitializer, ContentTables, DeckList};
use card_battle_rs::game::PlayerSetup;
use dir_test::{dir_test, Fixture};
use similar_asserts::assert_eq;

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/content/valid",
    glob: "**/*.json",
)]
fn test_valid_content(fixture: Fixture<&str>) {
    let content = ContentTables::from_json(fixture.content())
        .unwrap_or_else(|e| panic!("{} failed to load: {e}", fixture.path()));

    // Content survives a save and reload unchanged
    let json = serde_json::to_string_pretty(&content).unwrap();
    let reloaded = ContentTables::from_json(&json).unwrap();
    assert_eq!(content, reloaded);

    // Every enemy can be fought with a deck of the first card
    let Some(first_card) = content.cards.first() else {
        return;
    };
    let deck = DeckList::parse(&format!("10 {}", first_card.name)).unwrap();
    for enemy in content.enemy_names() {
        let session = BattleInitializer::new(&content)
            .init_from_deck(PlayerSetup::new("Hero", 50, 3), &deck, enemy, 1)
            .unwrap();
        session.check_invariants().unwrap();
    }
}

#[dir_test(
    dir: "$CARGO_MANIFEST_DIR/content/invalid",
    glob: "**/*.json",
)]
fn test_invalid_content(fixture: Fixture<&str>) {
    assert!(
        ContentTables::from_json(fixture.content()).is_err(),
        "{} should have been rejected",
        fixture.path()
    );
}

#[test]
fn test_builtin_content_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("content.json");

    let builtin = ContentTables::builtin();
    builtin.save_to_file(&path).unwrap();
    let loaded = ContentTables::load_from_file(&path).unwrap();
    assert_eq!(builtin, loaded);
}
