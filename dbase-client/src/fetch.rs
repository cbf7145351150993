//! Fetch by key: single lookups, fan-out lookups and the key-less scan
use crate::base::Base;
use crate::error::{ClientError, Result};
use crate::fanout;
use crate::transport::Method;
use dbase_core::Item;
use tracing::{debug, warn};

/// Outcome of looking up one key
#[derive(Debug)]
pub enum Lookup {
    /// The server returned the item
    Found(Item),
    /// The server answered with a status outside the success family
    Absent,
    /// The request itself failed
    Failed(ClientError),
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            Lookup::Found(item) => Some(item),
            _ => None,
        }
    }
}

/// Per-key outcomes of a multi-key fetch, in request order
#[derive(Debug, Default)]
pub struct KeyedFetch {
    entries: Vec<(String, Lookup)>,
}

impl KeyedFetch {
    pub fn entries(&self) -> &[(String, Lookup)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcome for a key (the first one if the key was requested twice)
    pub fn lookup(&self, key: &str) -> Option<&Lookup> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, lookup)| lookup)
    }

    /// Found items with their keys
    pub fn found(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.entries.iter().filter_map(|(key, lookup)| match lookup {
            Lookup::Found(item) => Some((key.as_str(), item)),
            _ => None,
        })
    }

    /// Keys the server reported as not present
    pub fn absent(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(key, lookup)| match lookup {
            Lookup::Absent => Some(key.as_str()),
            _ => None,
        })
    }

    /// Keys whose request failed, with the failure
    pub fn failed(&self) -> impl Iterator<Item = (&str, &ClientError)> {
        self.entries.iter().filter_map(|(key, lookup)| match lookup {
            Lookup::Failed(err) => Some((key.as_str(), err)),
            _ => None,
        })
    }

    /// Collapse into the plain fetch result.
    ///
    /// The first failure (in key order) becomes the error. Otherwise the found
    /// items are returned, or `None` when no key was found.
    pub fn into_items(self) -> Result<Option<Vec<Item>>> {
        let mut items = Vec::with_capacity(self.entries.len());
        for (_, lookup) in self.entries {
            match lookup {
                Lookup::Found(item) => items.push(item),
                Lookup::Absent => {}
                Lookup::Failed(err) => return Err(err),
            }
        }
        Ok(if items.is_empty() { None } else { Some(items) })
    }
}

/// Fetch items by key; with no keys, scan the whole Base.
pub(crate) async fn get<K: AsRef<str>>(base: &Base, keys: &[K]) -> Result<Option<Vec<Item>>> {
    if keys.is_empty() {
        warn!(base = %base, "no keys provided, returning all records; this may be slow for larger bases");
        return crate::scan::scan_all(base).await.map(Some);
    }

    get_many(base, keys).await?.into_items()
}

/// Look up every key concurrently, recording each outcome against its key.
///
/// Transport failures are recorded per key instead of aborting the siblings.
pub(crate) async fn get_many<K: AsRef<str>>(base: &Base, keys: &[K]) -> Result<KeyedFetch> {
    let requests = keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            base.item_url(key).map(|url| (key.to_string(), url))
        })
        .collect::<Result<Vec<_>>>()?;

    if requests.len() > 1 {
        debug!(base = %base, keys = requests.len(), "fetching keys concurrently");
    }

    let lookups = fanout::join_ordered(
        requests.iter().map(|(_, url)| lookup_one(base, url)),
        base.fanout_limit(),
    )
    .await;

    let entries: Vec<(String, Lookup)> = requests
        .into_iter()
        .map(|(key, _)| key)
        .zip(lookups)
        .collect();

    Ok(KeyedFetch { entries })
}

async fn lookup_one(base: &Base, url: &str) -> Lookup {
    let response = match base.send(Method::Get, url, None).await {
        Ok(response) => response,
        Err(err) => return Lookup::Failed(err),
    };

    if !response.is_success() {
        return Lookup::Absent;
    }

    match response.json::<Item>() {
        Ok(item) => Lookup::Found(item),
        Err(err) => Lookup::Failed(err),
    }
}
