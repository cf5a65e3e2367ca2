use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CatalogueError;
use crate::state::NameIndexEntry;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamedResource {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiResource {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct ListResponse {
    #[serde(deserialize_with = "null_as_default")]
    results: Vec<NamedResource>,
}

/// Detail payload for a single creature, as returned by `/pokemon/{id}`.
///
/// Every field is defaulted: upstream occasionally nulls or drops fields and
/// normalisation degrades instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPokemon {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub height: Option<u32>,
    pub weight: Option<u32>,
    pub base_experience: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub types: Vec<RawTypeSlot>,
    #[serde(deserialize_with = "null_as_default")]
    pub stats: Vec<RawStatSlot>,
    #[serde(deserialize_with = "null_as_default")]
    pub abilities: Vec<RawAbilitySlot>,
    #[serde(deserialize_with = "null_as_default")]
    pub moves: Vec<RawMoveSlot>,
    pub sprites: serde_json::Value,
    pub species: Option<NamedResource>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawTypeSlot {
    #[serde(rename = "type")]
    #[serde(deserialize_with = "null_as_default")]
    pub type_info: NamedResource,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawStatSlot {
    pub base_stat: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub stat: NamedResource,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawAbilitySlot {
    #[serde(deserialize_with = "null_as_default")]
    pub ability: NamedResource,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawMoveSlot {
    #[serde(rename = "move")]
    #[serde(deserialize_with = "null_as_default")]
    pub move_info: NamedResource,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawSpecies {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawEvolutionChain {
    #[serde(deserialize_with = "null_as_default")]
    pub chain: ChainLink,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainLink {
    #[serde(deserialize_with = "null_as_default")]
    pub species: NamedResource,
    #[serde(deserialize_with = "null_as_default")]
    pub evolves_to: Vec<ChainLink>,
}

/// Read-only access to the upstream creature catalogue.
///
/// Every call is a single attempt. Implementations must not retry.
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// One page of the listing, in upstream order.
    async fn list_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<NameIndexEntry>, CatalogueError>;

    async fn fetch_detail(&self, url: &str) -> Result<RawPokemon, CatalogueError>;

    async fn fetch_species(&self, url: &str) -> Result<RawSpecies, CatalogueError>;

    async fn fetch_evolution_chain(&self, url: &str)
        -> Result<RawEvolutionChain, CatalogueError>;

    /// Detail endpoint for a creature addressed by name.
    fn detail_url(&self, name: &str) -> String;
}

pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogueError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CatalogueError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogueError> {
        tracing::debug!(%url, "catalogue request");
        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogueError::NotFound(url.to_string()));
        }
        let bytes = response.error_for_status()?.bytes().await?;
        decode_object(&bytes)
    }
}

#[async_trait]
impl Catalogue for PokeApiClient {
    async fn list_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<NameIndexEntry>, CatalogueError> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url);
        let response: ListResponse = self.get_json(&url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|entry| NameIndexEntry {
                name: entry.name,
                detail_url: entry.url,
            })
            .collect())
    }

    async fn fetch_detail(&self, url: &str) -> Result<RawPokemon, CatalogueError> {
        self.get_json(url).await
    }

    async fn fetch_species(&self, url: &str) -> Result<RawSpecies, CatalogueError> {
        self.get_json(url).await
    }

    async fn fetch_evolution_chain(
        &self,
        url: &str,
    ) -> Result<RawEvolutionChain, CatalogueError> {
        self.get_json(url).await
    }

    fn detail_url(&self, name: &str) -> String {
        format!("{}/pokemon/{name}", self.base_url)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a JSON body that must be an object. Arrays, scalars and malformed
/// text are parse errors even when the target type is fully defaulted.
pub fn decode_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CatalogueError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(CatalogueError::Parse("expected a JSON object".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}
