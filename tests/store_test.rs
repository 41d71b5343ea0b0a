mod common;

use assert2::{check, let_assert};
use common::{fixture, fixture_store};
use rstest::rstest;
use searchdata_mcp::{Category, Entry, FormatErrorKind, IndexStore, SearchQuery, ShardName};

fn keys(entries: &[&Entry]) -> Vec<String> {
    entries.iter().map(|e| e.key().to_string()).collect()
}

const FUNCTIONS_A_KEYS: &[&str] = &[
    "k",
    "kappa_times_p_over_rho_squared_from_density",
    "kappa_times_p_over_rho_squared_from_density_and_energy",
    "kerr_horizon_radius",
    "key_comp",
    "key_eq",
    "keys_of",
    "kinetic_energy_density",
    "knuth_b",
    "kxrcf_indicator",
];

/// Test: `k` matches the whole functions_a shard, in source order.
#[test]
fn lookup_k_returns_every_entry_in_source_order() {
    let store = IndexStore::load(&fixture("functions_a.js")).unwrap();
    check!(keys(&store.lookup("k")) == FUNCTIONS_A_KEYS);
    check!(keys(&store.lookup("")) == FUNCTIONS_A_KEYS);
}

/// Test: `ka` only matches the two kappa entries.
#[test]
fn lookup_ka_returns_only_kappa_entries() {
    let store = IndexStore::load(&fixture("functions_a.js")).unwrap();
    let found = store.lookup("ka");
    check!(keys(&found) == &FUNCTIONS_A_KEYS[1..3]);
    check!(found.iter().all(|e| e.key().starts_with("kappa_")));
}

#[rstest]
#[case("ke", &["kerr_horizon_radius", "key_comp", "key_eq", "keys_of"])]
#[case("key", &["key_comp", "key_eq", "keys_of"])]
#[case("key_", &["key_comp", "key_eq"])]
#[case("kxrcf_indicator", &["kxrcf_indicator"])]
#[case("kxrcf_indicators", &[])]
#[case("z", &[])]
fn lookup_prefix_cases(#[case] prefix: &str, #[case] expected: &[&str]) {
    let store = IndexStore::load(&fixture("functions_a.js")).unwrap();
    let found = store.lookup(prefix);
    check!(keys(&found) == expected);
    check!(found.iter().all(|e| e.key().starts_with(prefix)));
}

/// Test: every entry is retrievable by its own key.
#[rstest]
fn get_returns_entry_for_every_key(fixture_store: IndexStore) {
    for entry in fixture_store.iter() {
        let_assert!(Some(found) = fixture_store.get(entry.key()));
        check!(found == entry);
    }
}

#[rstest]
fn get_decodes_keys_and_keeps_raw_form(fixture_store: IndexStore) {
    let_assert!(Some(header) = fixture_store.get("xcts.hpp"));
    check!(header.raw_key() == "xcts_2ehpp_5091");
    check!(header.id() == Some(5091));
    check!(header.label() == "Xcts.hpp");

    let_assert!(Some(comp) = fixture_store.get("key_comp"));
    check!(comp.destinations().len() == 8);
    check!(comp.is_overloaded());
    check!(comp.primary().owner() == "std::map::key_comp()");

    check!(fixture_store.get("Xcts").is_none());
    check!(fixture_store.get("xc").is_none());
    check!(fixture_store.get_by_id(9343).map(Entry::key) == Some("key_comp"));
}

#[rstest]
fn markup_in_labels_and_owners_is_decoded(fixture_store: IndexStore) {
    let_assert!(Some(keys_of) = fixture_store.get("keys_of"));
    let owner = keys_of.primary().plain_owner();
    check!(owner == "keys_of(const std::unordered_map< K, V, H > &m):\u{a0}StdHelpers.hpp");
    check!(keys_of.primary().owner().contains("&lt;"));
}

/// Test: merged shards keep every entry, including duplicate keys.
#[test]
fn merge_preserves_entries_and_duplicates() {
    let functions = fixture("functions_a.js");
    let first = IndexStore::load_shard(ShardName::parse("functions_a"), &functions).unwrap();
    let second = IndexStore::load_shard(ShardName::parse("functions_b"), &functions).unwrap();
    let all = IndexStore::load_shard(ShardName::parse("all_17"), &fixture("all_17.js")).unwrap();

    let merged = first.merge(all).merge(second);
    check!(merged.len() == 29);
    check!(merged.shards().len() == 3);
    check!(merged.get_all("key_eq").len() == 2);
    check!(merged.lookup("k").len() == 20);
    check!(merged.lookup("x").len() == 6);
}

#[test]
fn missing_destinations_is_a_format_error() {
    let_assert!(Err(err) = IndexStore::load("var searchData=\n[\n  ['k_1',['k']]\n];"));
    check!(err.kind == FormatErrorKind::MissingDestinations);
    check!(err.entry == Some(0));
}

/// Test: syntax errors point at the line in the original file.
#[test]
fn syntax_error_reports_its_line() {
    let_assert!(Err(err) = IndexStore::load("var searchData=\n[\n  ['k_1' ['k',['../k.html',1,'']]]\n];"));
    check!(matches!(err.kind, FormatErrorKind::Syntax(_)));
    check!(err.entry.is_none());
    check!(err.position.map(|pos| pos.line) == Some(3));
}

#[test]
fn empty_destination_list_is_a_format_error() {
    let_assert!(Err(err) = IndexStore::load("[['k_1',['k',[]]], ['j_2',['j',['../j.html',1,'']]]]"));
    check!(err.kind == FormatErrorKind::EmptyDestinations);
}

#[rstest]
fn search_folds_case_and_filters_category(fixture_store: IndexStore) {
    let results = fixture_store.search(&SearchQuery::new("XCTS"));
    check!(results.total == 2);
    check!(results.hits[1].entry.label() == "Xcts.hpp");

    let functions = fixture_store.search(&SearchQuery::new("k").category(Category::Functions));
    check!(functions.total == 10);
    check!(fixture_store.search(&SearchQuery::new("k").category(Category::All)).is_empty());
}

#[rstest]
fn stats_count_destinations(fixture_store: IndexStore) {
    let stats = fixture_store.stats();
    check!(stats.shards == 2);
    check!(stats.entries == 19);
    check!(stats.destinations >= stats.entries);
    check!(stats.external_destinations > 0);
    check!(stats.overloaded_entries >= 4);
}
