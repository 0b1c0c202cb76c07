/*! Named fuzzy spellchecking dictionaries with aliases and crash-safe persistence.

A [`Registry`](registry::Registry) owns a directory of dictionaries keyed by a
code. Each dictionary is an opaque engine implementing the
[`Dictionary`](dictionary::Dictionary) capability; the bundled
[`FuzzyDictionary`](dictionary::FuzzyDictionary) suggests corrections by
weighted Damerau–Levenshtein distance.

# Usage examples

```no_run
use spellserve::dictionary::{Dictionary, DictionaryOptions};
use spellserve::registry::Registry;

let registry: Registry = Registry::open("./dictionaries").unwrap();
let en = registry
    .add("en", DictionaryOptions::new("abcdefghijklmnopqrstuvwxyz", 2))
    .unwrap();
en.add_weighted(1, &["hello", "world"]);
registry.set_alias("english", "en").unwrap();

let suggestions = registry.get("english").unwrap().suggest("helo", 5);
assert!(!suggestions.exact_match);
registry.save("en").unwrap();
```

The HTTP server built on top of this library lives in the `spellserve-bin`
crate of the same repository.
*/

#![warn(missing_docs)]
pub mod checker;
pub mod dictionary;
pub mod registry;
pub mod storage;
pub mod tokenizer;

pub(crate) mod constants;
