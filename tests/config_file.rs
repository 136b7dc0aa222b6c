// tests/config_file.rs
//
// End-to-end checks on the shipped default configuration: it must parse,
// every order entry must resolve, and the key/value tree must survive a
// serialize/parse round trip.

use statusline_rs::core::config::Config;
use statusline_rs::core::parse::ConfigTree;

const DEFAULT_CONF: &str = include_str!("../config/default.conf");

#[test]
fn default_config_parses() {
    let cfg = Config::parse(DEFAULT_CONF).unwrap();
    assert_eq!(cfg.general.interval, 5);
    assert!(cfg.general.colors);
    assert_eq!(cfg.order.len(), 6);
}

#[test]
fn every_order_entry_has_a_block() {
    let tree = ConfigTree::parse(DEFAULT_CONF).unwrap();
    for (kind, instance) in &tree.order {
        assert!(
            tree.section(kind, instance.as_deref()).is_some(),
            "order entry `{kind}` has no matching block in default.conf"
        );
    }
}

#[test]
fn default_config_round_trips() {
    let tree = ConfigTree::parse(DEFAULT_CONF).unwrap();
    let reparsed = ConfigTree::parse(&tree.serialize()).unwrap();
    assert_eq!(tree, reparsed);
}
