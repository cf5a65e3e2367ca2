//! Turns raw catalogue payloads into display records.

use crate::api::{Catalogue, ChainLink, RawPokemon};
use crate::error::CatalogueError;
use crate::state::{Evolution, NameIndexEntry, Record, Stat, StatKind};

const FIRST_MOVES: usize = 3;

/// Sprite pointers tried in order: artistic rendering, official artwork, default.
const IMAGE_POINTERS: [&str; 3] = [
    "/other/dream_world/front_default",
    "/other/official-artwork/front_default",
    "/front_default",
];

/// Builds a record from a detail payload. Missing fields degrade to empty or
/// zero values; evolution is left unresolved.
pub fn normalize(raw: &RawPokemon) -> Record {
    let stats = StatKind::ALL
        .iter()
        .map(|kind| Stat {
            kind: *kind,
            base_value: raw
                .stats
                .iter()
                .find(|slot| slot.stat.name == kind.api_name())
                .and_then(|slot| slot.base_stat)
                .unwrap_or(0),
        })
        .collect();

    Record {
        id: raw.id.unwrap_or(0),
        name: raw.name.clone().unwrap_or_default(),
        image_url: select_image(&raw.sprites),
        types: raw
            .types
            .iter()
            .map(|slot| slot.type_info.name.clone())
            .filter(|name| !name.is_empty())
            .collect(),
        height: raw.height.unwrap_or(0),
        weight: raw.weight.unwrap_or(0),
        base_experience: raw.base_experience.unwrap_or(0),
        abilities: raw
            .abilities
            .iter()
            .map(|slot| slot.ability.name.clone())
            .filter(|name| !name.is_empty())
            .collect(),
        first_moves: raw
            .moves
            .iter()
            .map(|slot| slot.move_info.name.clone())
            .filter(|name| !name.is_empty())
            .take(FIRST_MOVES)
            .collect(),
        stats,
        evolution: None,
    }
}

pub fn select_image(sprites: &serde_json::Value) -> String {
    IMAGE_POINTERS
        .iter()
        .find_map(|pointer| pointer_string(sprites, pointer))
        .unwrap_or_default()
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Stage names along the first branch of a chain, at most three.
pub fn first_branch_stages(chain: &ChainLink) -> Vec<String> {
    let mut stages = Vec::new();
    let mut link = Some(chain);
    while let Some(current) = link {
        if stages.len() == 3 || current.species.name.is_empty() {
            break;
        }
        stages.push(current.species.name.clone());
        link = current.evolves_to.first();
    }
    stages
}

/// Best-effort evolution lookup. Any failure along species, chain or stage
/// image lookups yields `None`; the record itself is still usable.
pub async fn resolve_evolution(catalogue: &dyn Catalogue, raw: &RawPokemon) -> Option<Evolution> {
    match try_resolve_evolution(catalogue, raw).await {
        Ok(evolution) => evolution,
        Err(err) => {
            tracing::debug!(
                pokemon = raw.name.as_deref().unwrap_or_default(),
                error = %err,
                "evolution lookup failed"
            );
            None
        }
    }
}

async fn try_resolve_evolution(
    catalogue: &dyn Catalogue,
    raw: &RawPokemon,
) -> Result<Option<Evolution>, CatalogueError> {
    let Some(species_url) = raw
        .species
        .as_ref()
        .map(|species| species.url.as_str())
        .filter(|url| !url.is_empty())
    else {
        return Ok(None);
    };
    let species = catalogue.fetch_species(species_url).await?;
    let Some(chain_url) = species
        .evolution_chain
        .as_ref()
        .map(|chain| chain.url.as_str())
        .filter(|url| !url.is_empty())
    else {
        return Ok(None);
    };
    let chain = catalogue.fetch_evolution_chain(chain_url).await?;

    let names = first_branch_stages(&chain.chain);
    if names.is_empty() {
        return Ok(None);
    }
    let mut images = Vec::with_capacity(names.len());
    for name in &names {
        let detail = catalogue.fetch_detail(&catalogue.detail_url(name)).await?;
        images.push(select_image(&detail.sprites));
    }

    let mut stages = names.into_iter().zip(images);
    let Some((stage_one_name, stage_one_image)) = stages.next() else {
        return Ok(None);
    };
    let (stage_two_name, stage_two_image) = stages.next().unzip();
    let (stage_three_name, stage_three_image) = stages.next().unzip();
    Ok(Some(Evolution {
        stage_one_name,
        stage_one_image,
        stage_two_name,
        stage_two_image,
        stage_three_name,
        stage_three_image,
    }))
}

/// Fetches one detail payload and turns it into a full record.
pub async fn enrich(catalogue: &dyn Catalogue, detail_url: &str) -> Result<Record, CatalogueError> {
    let raw = catalogue.fetch_detail(detail_url).await?;
    let mut record = normalize(&raw);
    record.evolution = resolve_evolution(catalogue, &raw).await;
    Ok(record)
}

/// Enriches entries one after another in listing order. The first failing
/// detail fetch aborts the whole batch.
pub async fn enrich_entries(
    catalogue: &dyn Catalogue,
    entries: &[NameIndexEntry],
) -> Result<Vec<Record>, CatalogueError> {
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        records.push(enrich(catalogue, &entry.detail_url).await?);
    }
    Ok(records)
}

/// A fully enriched listing page along with how many entries were listed.
#[derive(Clone, Debug, PartialEq)]
pub struct PageBatch {
    pub records: Vec<Record>,
    pub listed: usize,
}

pub async fn load_page(
    catalogue: &dyn Catalogue,
    offset: usize,
    limit: usize,
) -> Result<PageBatch, CatalogueError> {
    let entries = catalogue.list_page(offset, limit).await?;
    let records = enrich_entries(catalogue, &entries).await?;
    tracing::info!(offset, limit, listed = entries.len(), "page loaded");
    Ok(PageBatch {
        records,
        listed: entries.len(),
    })
}
