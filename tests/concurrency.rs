use std::sync::Arc;

use rayon::prelude::*;
use type_info::{ClassLookup, ClassTable, TypeResolver};

const WORLD: &str = include_str!("fixtures/shop.json");

const INPUTS: &[&str] = &[
    "Shop\\Model\\Product",
    "?Shop\\Value\\Money",
    "list<Shop\\Model\\Status>",
    "Shop\\Model\\TagCollection<string>",
    "Shop\\Model\\Box<Shop\\Model\\Product>",
    "Shop\\Missing",
    "int|string",
    "array<",
];

fn render(resolver: &TypeResolver, text: &str) -> Result<String, bool> {
    resolver.resolve_string(text, None).map(|ty| ty.to_string()).map_err(|err| err.is_unsupported())
}

#[test]
fn caches_fill_consistently_from_many_threads() {
    let table = Arc::new(ClassTable::from_json_str(WORLD).unwrap());

    let reference = TypeResolver::doc_aware(Arc::new(ClassLookup::new(table.clone())));
    let expected: Vec<_> = INPUTS.iter().map(|text| render(&reference, text)).collect();

    let lookup = Arc::new(ClassLookup::new(table));
    let resolver = TypeResolver::doc_aware(lookup.clone());
    let results: Vec<_> = (0..512)
        .into_par_iter()
        .map(|i| (i % INPUTS.len(), render(&resolver, INPUTS[i % INPUTS.len()])))
        .collect();

    for (index, result) in results {
        assert_eq!(result, expected[index], "{}", INPUTS[index]);
    }
    assert!(lookup.cached_entries() > 0);

    lookup.clear();
    assert_eq!(lookup.cached_entries(), 0);
    let again: Vec<_> = INPUTS.par_iter().map(|text| render(&resolver, text)).collect();
    assert_eq!(again, expected);
}

#[test]
fn resolvers_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TypeResolver>();
    assert_send_sync::<ClassLookup>();
    assert_send_sync::<type_info::Type>();
}
