// tests/registry.rs

use statusline_rs::core::config::Config;
use statusline_rs::core::registry::ModuleRegistry;

#[test]
fn load_modules_in_order() {
    let cfg = Config::parse(
        "order += \"disk /\"\norder += \"tztime local\"\ndisk \"/\" { format = \"%avail\" }",
    )
    .unwrap();
    let registry = ModuleRegistry::load(&cfg);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.modules()[0].module.name(), "disk");
    assert_eq!(registry.modules()[0].module.instance(), Some("/"));
    assert_eq!(registry.modules()[1].module.name(), "tztime");
}

#[test]
fn skip_unknown_modules() {
    let cfg = Config::parse("order += \"cpu_usage\"\norder += \"tztime local\"").unwrap();
    let registry = ModuleRegistry::load(&cfg);

    // "cpu_usage" is unknown and should be skipped
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.modules()[0].module.name(), "tztime");
}

#[test]
fn order_entry_without_block_gets_defaults() {
    // no disk block declared; the registry builds the module from the
    // documented defaults
    let cfg = Config::parse("order += \"disk /\"").unwrap();
    let registry = ModuleRegistry::load(&cfg);

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.modules()[0].module.instance(), Some("/"));
}

#[test]
fn module_interval_falls_back_to_global() {
    let cfg = Config::parse(
        "general { interval = 7 }\norder += \"tztime local\"\norder += \"disk /\"\ndisk \"/\" { interval = 30 }",
    )
    .unwrap();
    let registry = ModuleRegistry::load(&cfg);

    assert_eq!(registry.modules()[0].interval, 7);
    assert_eq!(registry.modules()[1].interval, 30);
}

#[test]
fn net_modules_always_construct() {
    // wireless/ethernet resolve their interface lazily, so loading them
    // works even on hosts without that hardware
    let cfg = Config::parse("order += \"wireless _first_\"\norder += \"ethernet _first_\"").unwrap();
    let registry = ModuleRegistry::load(&cfg);
    assert_eq!(registry.len(), 2);
}
