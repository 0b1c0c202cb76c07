use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{Dictionary, DictionaryError, DictionaryOptions, Suggestion, Suggestions};
use crate::constants::{DEFAULT_MAX_ERRORS, STATE_FORMAT_VERSION};

/// Weighted word list answering queries by Damerau–Levenshtein distance.
///
/// Candidates are pre-filtered by length and by the set of alphabet letters
/// they contain: one edit changes that set by at most two letters, so a word
/// whose set differs by more than `2 * max_errors` cannot be within reach.
/// Surviving candidates are scored `ln(1 + weight) / (1 + distance)`.
#[derive(Debug)]
pub struct FuzzyDictionary {
    alphabet: Alphabet,
    max_errors: u32,
    words: RwLock<HashMap<SmolStr, Entry>>,
}

#[derive(Debug)]
struct Entry {
    weight: u64,
    len: usize,
    letters: LetterSet,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct State {
    version: u32,
    alphabet: String,
    max_errors: u32,
    words: Vec<(SmolStr, u64)>,
}

impl FuzzyDictionary {
    fn with_parts(alphabet: Alphabet, max_errors: u32) -> FuzzyDictionary {
        let max_errors = if max_errors == 0 {
            DEFAULT_MAX_ERRORS
        } else {
            max_errors
        };

        FuzzyDictionary {
            alphabet,
            max_errors,
            words: RwLock::new(HashMap::new()),
        }
    }

    /// Effective maximum edit distance of suggestions.
    pub fn max_errors(&self) -> u32 {
        self.max_errors
    }

    /// Number of distinct words known to the dictionary.
    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    /// Whether no word has been added yet.
    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    /// Accumulated weight of `word`, if known.
    pub fn weight(&self, word: &str) -> Option<u64> {
        self.words.read().get(word).map(|e| e.weight)
    }
}

impl Dictionary for FuzzyDictionary {
    fn new(options: &DictionaryOptions) -> Result<Self, DictionaryError> {
        let alphabet = Alphabet::new(&options.alphabet)?;
        Ok(FuzzyDictionary::with_parts(alphabet, options.max_errors))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, DictionaryError> {
        if bytes.is_empty() {
            return Err(DictionaryError::Empty);
        }

        let state: State = serde_json::from_slice(bytes).map_err(DictionaryError::Malformed)?;
        if state.version != STATE_FORMAT_VERSION {
            return Err(DictionaryError::UnsupportedVersion(state.version));
        }

        let dictionary =
            FuzzyDictionary::with_parts(Alphabet::new(&state.alphabet)?, state.max_errors);

        {
            let mut words = dictionary.words.write();
            for (word, weight) in state.words {
                match dictionary.alphabet.letter_set(&word) {
                    Some(letters) => {
                        let len = word.chars().count();
                        words.insert(
                            word,
                            Entry {
                                weight,
                                len,
                                letters,
                            },
                        );
                    }
                    None => log::warn!("dropping stored word {:?} outside the alphabet", word),
                }
            }
        }

        Ok(dictionary)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, DictionaryError> {
        let mut words: Vec<(SmolStr, u64)> = self
            .words
            .read()
            .iter()
            .map(|(word, entry)| (word.clone(), entry.weight))
            .collect();
        words.sort_unstable();

        let state = State {
            version: STATE_FORMAT_VERSION,
            alphabet: self.alphabet.chars.clone(),
            max_errors: self.max_errors,
            words,
        };

        serde_json::to_vec(&state).map_err(DictionaryError::Encode)
    }

    fn add_weighted(&self, weight: u32, words: &[&str]) {
        let weight = u64::from(weight.max(1));
        let mut table = self.words.write();

        for word in words.iter().filter(|w| !w.is_empty()) {
            if let Some(entry) = table.get_mut(*word) {
                entry.weight = entry.weight.saturating_add(weight);
                continue;
            }

            match self.alphabet.letter_set(word) {
                Some(letters) => {
                    table.insert(
                        SmolStr::new(word),
                        Entry {
                            weight,
                            len: word.chars().count(),
                            letters,
                        },
                    );
                }
                None => log::debug!("ignoring {:?}: outside the alphabet", word),
            }
        }
    }

    fn suggest(&self, word: &str, limit: usize) -> Suggestions {
        let words = self.words.read();

        if words.contains_key(word) {
            return Suggestions {
                exact_match: true,
                suggestions: vec![],
            };
        }

        if limit == 0 || word.is_empty() {
            return Suggestions::default();
        }

        let max = self.max_errors as usize;
        let len = word.chars().count();
        let letters = self.alphabet.query_set(word);

        let mut out = words
            .iter()
            .filter(|(_, entry)| entry.len.abs_diff(len) <= max)
            .filter(|(_, entry)| entry.letters.difference(&letters) <= 2 * max)
            .filter_map(|(candidate, entry)| {
                let distance = strsim::damerau_levenshtein(word, candidate);
                if distance > max {
                    return None;
                }

                Some(Suggestion::new(
                    candidate.clone(),
                    score(entry.weight, distance),
                ))
            })
            .collect::<Vec<_>>();

        out.sort();
        out.truncate(limit);

        Suggestions {
            exact_match: false,
            suggestions: out,
        }
    }
}

fn score(weight: u64, distance: usize) -> f64 {
    (weight as f64).ln_1p() / (1 + distance) as f64
}

#[derive(Debug)]
struct Alphabet {
    chars: String,
    index: HashMap<char, usize>,
}

impl Alphabet {
    fn new(chars: &str) -> Result<Alphabet, DictionaryError> {
        if chars.is_empty() {
            return Err(DictionaryError::InvalidAlphabet("alphabet is empty".into()));
        }

        let mut index = HashMap::new();
        for (i, ch) in chars.chars().enumerate() {
            if index.insert(ch, i).is_some() {
                return Err(DictionaryError::InvalidAlphabet(format!(
                    "character {:?} is repeated",
                    ch
                )));
            }
        }

        Ok(Alphabet {
            chars: chars.to_string(),
            index,
        })
    }

    /// Letter set of a dictionary word, `None` if it leaves the alphabet.
    fn letter_set(&self, word: &str) -> Option<LetterSet> {
        let mut set = LetterSet::with_capacity(self.index.len());
        for ch in word.chars() {
            set.insert(*self.index.get(&ch)?);
        }
        Some(set)
    }

    /// Letter set of a query; characters outside the alphabet are skipped.
    fn query_set(&self, word: &str) -> LetterSet {
        let mut set = LetterSet::with_capacity(self.index.len());
        for i in word.chars().filter_map(|ch| self.index.get(&ch)) {
            set.insert(*i);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LetterSet(Box<[u64]>);

impl LetterSet {
    fn with_capacity(letters: usize) -> LetterSet {
        LetterSet(vec![0u64; (letters + 63) / 64].into_boxed_slice())
    }

    fn insert(&mut self, letter: usize) {
        self.0[letter / 64] |= 1 << (letter % 64);
    }

    /// Size of the symmetric difference.
    fn difference(&self, other: &LetterSet) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }
}
