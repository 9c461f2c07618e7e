//! Run-scoped read-through cache over [`LoadStore::resolve`].

use std::collections::HashMap;

use painel_core::{
  CanonicalName,
  dimension::{Dimension, DimensionKey, DimensionMode, Member, Resolution},
  store::LoadStore,
};

use crate::{Error, Result};

/// Name → key maps for every dimension touched during one run.
///
/// Hits never reach the database. Misses go through the store and, once
/// resolved, are cached for the rest of the run. Unresolved names are not
/// cached, so a later seed of the dimension is picked up.
#[derive(Debug, Default)]
pub struct Resolver {
  cache: HashMap<&'static str, HashMap<String, DimensionKey>>,
}

impl Resolver {
  pub fn new() -> Self { Self::default() }

  /// Resolve `names` against `dimension`.
  ///
  /// Spelling conflicts are only detected for names that miss the cache.
  pub async fn resolve<S, I>(
    &mut self,
    store: &S,
    dimension: Dimension,
    names: I,
    mode: DimensionMode,
  ) -> Result<Resolution>
  where
    S: LoadStore,
    I: IntoIterator<Item = CanonicalName>,
  {
    let cached = self.cache.entry(dimension.table).or_default();
    let mut resolution = Resolution::default();
    let mut misses = Vec::new();

    for name in names {
      match cached.get(name.key()) {
        Some(&id) => {
          resolution.keys.insert(name.key().to_owned(), id);
        }
        None => misses.push(Member::new(name)),
      }
    }

    if !misses.is_empty() {
      let fetched = store
        .resolve(dimension, misses, mode)
        .await
        .map_err(Error::store)?;
      cached.extend(fetched.keys.iter().map(|(k, v)| (k.clone(), *v)));
      resolution.merge(fetched);
    }

    Ok(resolution)
  }

  /// Key of a single reference that must already exist.
  pub async fn require<S: LoadStore>(
    &mut self,
    store: &S,
    dimension: Dimension,
    name: &CanonicalName,
  ) -> Result<DimensionKey> {
    let resolution = self
      .resolve(store, dimension, [name.clone()], DimensionMode::Closed)
      .await?;
    resolution.get(name).ok_or_else(|| Error::MissingReference {
      dimension: dimension.table,
      name:      name.display().to_owned(),
    })
  }

  /// Number of cached keys for `dimension`.
  pub fn cached(&self, dimension: Dimension) -> usize {
    self.cache.get(dimension.table).map_or(0, HashMap::len)
  }
}

#[cfg(test)]
mod tests {
  use painel_core::fact::Cell;
  use painel_store_sqlite::SqliteStore;

  use super::*;
  use crate::tables::{REGIAO, UF, UF_SEED};

  fn name(raw: &str) -> CanonicalName { CanonicalName::new(raw).unwrap() }

  #[tokio::test]
  async fn misses_are_cached_after_resolution() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut resolver = Resolver::new();

    let first = resolver
      .resolve(&store, REGIAO, [name("Gama"), name("Guará")], DimensionMode::Open)
      .await
      .unwrap();
    assert_eq!(first.inserted, 2);
    assert_eq!(resolver.cached(REGIAO), 2);

    let second = resolver
      .resolve(&store, REGIAO, [name("GAMA")], DimensionMode::Closed)
      .await
      .unwrap();
    assert_eq!(second.get(&name("gama")), first.get(&name("Gama")));
    assert_eq!(second.inserted, 0);
  }

  #[tokio::test]
  async fn require_reports_missing_reference() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut resolver = Resolver::new();

    let err = resolver.require(&store, UF, &name("DF")).await.unwrap_err();
    assert!(matches!(err, Error::MissingReference { dimension: "unidade_da_federacao", .. }));

    store
      .seed(UF_SEED, vec![Member::with_extras(name("DF"), vec![Cell::Text(
        "Distrito Federal".into(),
      )])])
      .await
      .unwrap();
    assert!(resolver.require(&store, UF, &name("df")).await.is_ok());
  }
}
