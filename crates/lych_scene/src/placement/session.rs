//! Placement session

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info, warn};
use rand::Rng;

use super::candidate::{sample_candidate, score_candidate, CatalogEntry, SampledObject, SceneBox, Score};
use super::config::{PlacementConfig, SamplingConfig};
use crate::bounds::{ioa, Aabb};
use crate::error::SceneResult;
use crate::foundation::math::{vec3, Vec3};
use crate::sim::{ObjectCommands, STATUS_OK};

const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NAME_SUFFIX_LEN: usize = 4;

/// Surface kind of a placement region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Floor-standing objects
    Floor,
    /// Objects resting on a table, after the table top is cleared
    Table,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor => write!(f, "floor"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// A region to populate and how many objects it should receive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionTarget {
    /// Simulator id of the region's anchor object
    pub region_id: String,
    /// Objects to place per pass
    pub count: usize,
}

/// Why a region was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The anchor object is not in the scene
    MissingRegion,
    /// Fewer catalog entries than requested objects
    CatalogTooSmall {
        /// Objects requested
        requested: usize,
        /// Catalog entries available
        available: usize,
    },
    /// No candidate reached the acceptable score
    NoAcceptableCandidate {
        /// Best score seen
        best: Score,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRegion => write!(f, "region is not in the scene"),
            Self::CatalogTooSmall { requested, available } => {
                write!(f, "{requested} objects requested from a catalog of {available}")
            }
            Self::NoAcceptableCandidate { best } => write!(f, "best candidate scored {best}"),
        }
    }
}

/// Result of sampling one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementResult {
    /// The best candidate was committed
    Placed {
        /// Names of the created instances
        created: Vec<String>,
        /// Objects deleted because the candidate displaced them
        removed: Vec<String>,
        /// Committed score
        score: i64,
    },
    /// Nothing was committed
    Skipped {
        /// Why
        reason: SkipReason,
    },
}

/// Outcome of one region in a placement pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOutcome {
    /// Region anchor id
    pub region_id: String,
    /// Region kind
    pub kind: RegionKind,
    /// Objects removed from the table top before sampling
    pub cleared: Vec<String>,
    /// Sampling result
    pub result: PlacementResult,
}

/// Outcomes of a placement pass, floors first, then tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// One outcome per registered region
    pub outcomes: Vec<RegionOutcome>,
}

impl PlacementReport {
    /// Names of every created instance
    pub fn created(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .flat_map(|o| match &o.result {
                PlacementResult::Placed { created, .. } => created.as_slice(),
                PlacementResult::Skipped { .. } => &[][..],
            })
            .map(String::as_str)
    }

    /// Number of skipped regions
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, PlacementResult::Skipped { .. }))
            .count()
    }
}

/// Registered regions, catalogs and thresholds for placement passes
#[derive(Debug, Clone)]
pub struct PlacementSession {
    config: PlacementConfig,
    floor_catalog: Vec<CatalogEntry>,
    table_catalog: Vec<CatalogEntry>,
    floors: Vec<RegionTarget>,
    tables: Vec<RegionTarget>,
}

impl PlacementSession {
    /// Create a session, resolving catalog extents through the simulator
    ///
    /// Catalog entries the simulator cannot measure are dropped with a warning.
    pub fn new<S: ObjectCommands + ?Sized>(config: PlacementConfig, sim: &mut S) -> SceneResult<Self> {
        config.validate()?;

        let mut ids: Vec<String> = Vec::new();
        for id in config.floor_catalog.iter().chain(&config.table_catalog) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        let extents: HashMap<String, Vec3> = if ids.is_empty() {
            HashMap::new()
        } else {
            sim.get_mesh_extent(&ids)?
                .into_iter()
                .filter(|m| m.status == STATUS_OK)
                .map(|m| (m.mesh_path, vec3(m.extent)))
                .collect()
        };

        let resolve = |catalog: &[String], kind: RegionKind| -> Vec<CatalogEntry> {
            catalog
                .iter()
                .filter_map(|id| match extents.get(id) {
                    Some(extent) => Some(CatalogEntry { id: id.clone(), extent: *extent }),
                    None => {
                        warn!("{kind} object {id} not found in the scene");
                        None
                    }
                })
                .collect()
        };
        let floor_catalog = resolve(&config.floor_catalog, RegionKind::Floor);
        let table_catalog = resolve(&config.table_catalog, RegionKind::Table);

        Ok(Self { config, floor_catalog, table_catalog, floors: Vec::new(), tables: Vec::new() })
    }

    /// Session configuration
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Registered floor regions
    pub fn floors(&self) -> &[RegionTarget] {
        &self.floors
    }

    /// Registered table regions
    pub fn tables(&self) -> &[RegionTarget] {
        &self.tables
    }

    /// Resolved catalog for a region kind
    pub fn catalog(&self, kind: RegionKind) -> &[CatalogEntry] {
        match kind {
            RegionKind::Floor => &self.floor_catalog,
            RegionKind::Table => &self.table_catalog,
        }
    }

    fn sampling(&self, kind: RegionKind) -> &SamplingConfig {
        match kind {
            RegionKind::Floor => &self.config.floor,
            RegionKind::Table => &self.config.table,
        }
    }

    /// Register a region; returns `false` if the same target is already registered
    pub fn add_region(&mut self, kind: RegionKind, region_id: impl Into<String>, count: usize) -> bool {
        let target = RegionTarget { region_id: region_id.into(), count };
        let regions = match kind {
            RegionKind::Floor => &mut self.floors,
            RegionKind::Table => &mut self.tables,
        };
        if regions.contains(&target) {
            return false;
        }
        regions.push(target);
        true
    }

    fn add_selection<S: ObjectCommands + ?Sized>(&mut self, sim: &mut S, kind: RegionKind, count: usize) -> SceneResult<usize> {
        let selected = sim.list_selected()?;
        let before = match kind {
            RegionKind::Floor => self.floors.len(),
            RegionKind::Table => self.tables.len(),
        };
        let added = selected
            .into_iter()
            .filter(|s| self.add_region(kind, s.object_id.clone(), count))
            .count();
        info!("Added {added} object(s) to the {kind} list (prev={before} -> now={})", before + added);
        Ok(added)
    }

    /// Register every selected simulator object as a floor region
    pub fn add_selection_as_floor<S: ObjectCommands + ?Sized>(&mut self, sim: &mut S, count: usize) -> SceneResult<usize> {
        self.add_selection(sim, RegionKind::Floor, count)
    }

    /// Register every selected simulator object as a table region
    pub fn add_selection_as_table<S: ObjectCommands + ?Sized>(&mut self, sim: &mut S, count: usize) -> SceneResult<usize> {
        self.add_selection(sim, RegionKind::Table, count)
    }

    /// Run one placement pass over every registered region
    ///
    /// Regions are processed floors first, in registration order. Simulator
    /// faults abort the pass; mutations already issued are not rolled back.
    pub fn sample_random_placement<S, R>(&self, sim: &mut S, rng: &mut R) -> SceneResult<PlacementReport>
    where
        S: ObjectCommands + ?Sized,
        R: Rng + ?Sized,
    {
        let mut snapshot: Vec<SceneBox> = sim
            .get_obj_aabb(None)?
            .into_iter()
            .filter_map(|record| record.aabb().map(|aabb| SceneBox { id: record.object_id, aabb }))
            .collect();
        debug!("Scene snapshot holds {} objects", snapshot.len());

        let mut report = PlacementReport::default();
        for target in &self.floors {
            let outcome = self.place_region(sim, rng, &mut snapshot, RegionKind::Floor, target, Vec::new())?;
            report.outcomes.push(outcome);
        }
        for target in &self.tables {
            let cleared = self.clear_table(sim, &mut snapshot, &target.region_id)?;
            let outcome = self.place_region(sim, rng, &mut snapshot, RegionKind::Table, target, cleared)?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    /// Slab above a table top whose contents are cleared before sampling
    fn table_slab(&self, table: &Aabb) -> Aabb {
        let (low, high) = (self.config.table_margin_low, self.config.table_margin_high);
        let center = table.world_center();
        Aabb::from_center_extent(
            Vec3::new(center.x, center.y, table.top() + (low + high) / 2.0),
            Vec3::new(table.extent.x, table.extent.y, (high - low) / 2.0),
        )
    }

    fn clear_table<S: ObjectCommands + ?Sized>(
        &self,
        sim: &mut S,
        snapshot: &mut Vec<SceneBox>,
        table_id: &str,
    ) -> SceneResult<Vec<String>> {
        let Some(table) = snapshot.iter().find(|b| b.id == table_id) else {
            return Ok(Vec::new());
        };
        let slab = self.table_slab(&table.aabb);
        let on_table: Vec<String> = snapshot
            .iter()
            .filter(|b| b.id != table_id && ioa(&b.aabb, &slab) >= self.config.table_ioa_threshold)
            .map(|b| b.id.clone())
            .collect();

        for id in &on_table {
            sim.del_obj(id)?;
            snapshot.retain(|b| &b.id != id);
        }
        if !on_table.is_empty() {
            debug!("Cleared {} object(s) from table {table_id}", on_table.len());
        }
        Ok(on_table)
    }

    fn place_region<S, R>(
        &self,
        sim: &mut S,
        rng: &mut R,
        snapshot: &mut Vec<SceneBox>,
        kind: RegionKind,
        target: &RegionTarget,
        cleared: Vec<String>,
    ) -> SceneResult<RegionOutcome>
    where
        S: ObjectCommands + ?Sized,
        R: Rng + ?Sized,
    {
        let skip = |reason: SkipReason| -> SceneResult<RegionOutcome> {
            warn!("Skipping {kind} {}: {reason}", target.region_id);
            Ok(RegionOutcome {
                region_id: target.region_id.clone(),
                kind,
                cleared: cleared.clone(),
                result: PlacementResult::Skipped { reason },
            })
        };

        let Some(region) = snapshot.iter().find(|b| b.id == target.region_id).map(|b| b.aabb) else {
            return skip(SkipReason::MissingRegion);
        };
        let catalog = self.catalog(kind);
        if target.count > catalog.len() {
            return skip(SkipReason::CatalogTooSmall { requested: target.count, available: catalog.len() });
        }

        let sampling = self.sampling(kind);
        let protected: HashSet<String> = self
            .tables
            .iter()
            .map(|t| t.region_id.clone())
            .chain(std::iter::once(target.region_id.clone()))
            .collect();

        let mut best: Option<(Score, Vec<SampledObject>, Vec<String>)> = None;
        for _ in 0..sampling.trials {
            let candidate = sample_candidate(rng, catalog, target.count, &region, self.config.footprint_fraction);
            let (score, displaced) = score_candidate(&candidate, snapshot, &protected, sampling.iou_threshold);
            if best.as_ref().map_or(true, |(b, _, _)| score > *b) {
                best = Some((score, candidate, displaced));
            }
        }

        let (score, candidate, displaced) = match best {
            Some((Score::Value(score), candidate, displaced)) if score >= sampling.worst_score => {
                (score, candidate, displaced)
            }
            Some((best, _, _)) => return skip(SkipReason::NoAcceptableCandidate { best }),
            None => return skip(SkipReason::NoAcceptableCandidate { best: Score::Rejected }),
        };

        for id in &displaced {
            sim.del_obj(id)?;
            snapshot.retain(|b| &b.id != id);
        }
        let mut created = Vec::with_capacity(candidate.len());
        for object in candidate {
            let name = instance_name(rng, &object.catalog_id);
            sim.add_obj(&name, &object.catalog_id, object.location(), object.rotation())?;
            snapshot.push(SceneBox { id: name.clone(), aabb: object.aabb });
            created.push(name);
        }
        info!(
            "Placed {} object(s) on {kind} {} (removed {}, score {score})",
            created.len(),
            target.region_id,
            displaced.len()
        );

        Ok(RegionOutcome {
            region_id: target.region_id.clone(),
            kind,
            cleared,
            result: PlacementResult::Placed { created, removed: displaced, score },
        })
    }
}

/// Instance name for a catalog id: its last `.` segment plus a random suffix
fn instance_name<R: Rng + ?Sized>(rng: &mut R, catalog_id: &str) -> String {
    let stem = catalog_id.rsplit('.').next().unwrap_or(catalog_id);
    let suffix: String = (0..NAME_SUFFIX_LEN)
        .map(|_| char::from(NAME_ALPHABET[rng.gen_range(0..NAME_ALPHABET.len())]))
        .collect();
    format!("{stem}_{suffix}")
}
