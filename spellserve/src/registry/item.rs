//! On-disk record of a single dictionary.
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dictionary::{Dictionary, DictionaryError, DictionaryOptions};

/// A registered dictionary together with the options it was created with.
#[derive(Debug)]
pub struct RegistryItem<D> {
    /// shared engine handle
    pub dictionary: Arc<D>,
    /// options the dictionary was created with
    pub options: DictionaryOptions,
}

#[derive(Serialize, Deserialize)]
struct Record {
    options: DictionaryOptions,
    #[serde(
        default,
        serialize_with = "encode_state",
        deserialize_with = "decode_state"
    )]
    spellchecker: Vec<u8>,
}

fn encode_state<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn decode_state<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let text = Option::<String>::deserialize(deserializer)?;
    match text {
        Some(text) => STANDARD.decode(text).map_err(serde::de::Error::custom),
        None => Ok(vec![]),
    }
}

impl<D: Dictionary> RegistryItem<D> {
    /// Creates an empty dictionary.
    pub fn new(options: DictionaryOptions) -> Result<RegistryItem<D>, DictionaryError> {
        Ok(RegistryItem {
            dictionary: Arc::new(D::new(&options)?),
            options,
        })
    }

    /// Serializes the record: `{"options": .., "spellchecker": "<base64 state>"}`.
    pub fn encode(&self) -> Result<Vec<u8>, DictionaryError> {
        let record = Record {
            options: self.options.clone(),
            spellchecker: self.dictionary.to_bytes()?,
        };

        serde_json::to_vec(&record).map_err(DictionaryError::Encode)
    }

    /// Restores a record written by [`RegistryItem::encode`].
    pub fn decode(bytes: &[u8]) -> Result<RegistryItem<D>, Box<dyn std::error::Error + Send + Sync>> {
        let record: Record = serde_json::from_slice(bytes)?;
        let dictionary = D::from_bytes(&record.spellchecker)?;

        Ok(RegistryItem {
            dictionary: Arc::new(dictionary),
            options: record.options,
        })
    }
}
