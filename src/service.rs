//! Taxonomy service: the boundary operations offered to a request-handling host.
//!
//! Concurrency contract:
//! - the live store sits behind an `Arc` that refresh swaps in one step, so a
//!   reader holding the old handle keeps a consistent view
//! - mutations, refreshes and version-control calls are serialized by a single
//!   writer gate
//! - lookups and pages take the live store's read lock and never the gate

use crate::cache::SnapshotCache;
use crate::config::TaxonomyConfig;
use crate::error::TaxonomyError;
use crate::loader::ArtifactLoader;
use crate::model::{
    Base, Behavior, BehaviorGroup, PropertySet, Taxonomy, TemplateDefinition, TemplateFormula,
    TokenSpecification, TokenTemplate,
};
use crate::mutation::{
    DeleteArtifactRequest, DeleteArtifactResponse, MutationPipeline, MutationResponse,
    NewArtifactRequest, NewArtifactResponse, UpdateArtifactRequest, UpdateArtifactResponse,
};
use crate::query::{self, QueryOptions, QueryResult};
use crate::repository::{
    ArtifactRepository, DisabledVersionControl, FsArtifactRepository, GitVersionControl,
    VersionControl,
};
use crate::store::TaxonomyStore;
use crate::symbol;
use crate::types::{ArtifactSymbol, ArtifactType};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct TaxonomyService {
    config: TaxonomyConfig,
    loader: ArtifactLoader,
    live: RwLock<Arc<TaxonomyStore>>,
    cache: SnapshotCache,
    pipeline: MutationPipeline,
    version_control: Arc<dyn VersionControl>,
    write_gate: Mutex<()>,
}

impl TaxonomyService {
    /// Load the artifact tree configured for `workspace_root`.
    ///
    /// Uses git for version control when the tree sits inside a git working copy.
    pub fn load(config: TaxonomyConfig, workspace_root: &Path) -> Result<Self, TaxonomyError> {
        let root = config.resolve_artifact_path(workspace_root);
        let repository: Arc<dyn ArtifactRepository> = Arc::new(FsArtifactRepository::new(
            &root,
            config.loader.descriptor_extension.clone(),
        ));
        let version_control: Arc<dyn VersionControl> =
            if root.ancestors().any(|dir| dir.join(".git").exists()) {
                Arc::new(GitVersionControl::new(&root))
            } else {
                Arc::new(DisabledVersionControl)
            };
        Self::with_backends(config, root, repository, version_control)
    }

    /// Load `root` with explicit persistence backends
    pub fn with_backends(
        config: TaxonomyConfig,
        root: impl Into<PathBuf>,
        repository: Arc<dyn ArtifactRepository>,
        version_control: Arc<dyn VersionControl>,
    ) -> Result<Self, TaxonomyError> {
        let loader = ArtifactLoader::new(root, config.loader.clone());
        let pipeline = MutationPipeline::new(repository, config.mutation.max_unique_attempts);
        let service = Self {
            config,
            loader,
            live: RwLock::new(Arc::new(TaxonomyStore::default())),
            cache: SnapshotCache::new(),
            pipeline,
            version_control,
            write_gate: Mutex::new(()),
        };
        service.refresh_locked()?;
        Ok(service)
    }

    pub fn config(&self) -> &TaxonomyConfig {
        &self.config
    }

    pub fn artifact_root(&self) -> &Path {
        self.loader.root()
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Handle on the live store; stays valid across a refresh
    pub fn live(&self) -> Arc<TaxonomyStore> {
        Arc::clone(&*self.live.read())
    }

    pub fn current_version(&self) -> String {
        self.live().version()
    }

    /// The live taxonomy when `version` is current or empty, otherwise a cached snapshot
    pub fn get_full_taxonomy(&self, version: &str) -> Result<Arc<Taxonomy>, TaxonomyError> {
        let live = self.live();
        if version.is_empty() || live.version() == version {
            return Ok(Arc::new(live.snapshot()));
        }
        self.cache.get(version)
    }

    pub fn get_base_artifact(&self, symbol: &ArtifactSymbol) -> Result<Base, TaxonomyError> {
        self.live().get(&symbol.tooling)
    }

    pub fn get_behavior_artifact(&self, symbol: &ArtifactSymbol) -> Result<Behavior, TaxonomyError> {
        self.live().get(&symbol.tooling)
    }

    pub fn get_behavior_group_artifact(
        &self,
        symbol: &ArtifactSymbol,
    ) -> Result<BehaviorGroup, TaxonomyError> {
        self.live().get(&symbol.tooling)
    }

    pub fn get_property_set_artifact(
        &self,
        symbol: &ArtifactSymbol,
    ) -> Result<PropertySet, TaxonomyError> {
        self.live().get(&symbol.tooling)
    }

    pub fn get_template_formula_artifact(
        &self,
        formula_id: &str,
    ) -> Result<TemplateFormula, TaxonomyError> {
        self.live().read().template_formula(formula_id)
    }

    pub fn get_template_definition_artifact(
        &self,
        formula_id: &str,
    ) -> Result<TemplateDefinition, TaxonomyError> {
        self.live().read().template_definition(formula_id)
    }

    pub fn get_token_template(&self, formula_id: &str) -> Result<TokenTemplate, TaxonomyError> {
        self.live().get(formula_id)
    }

    pub fn get_token_specification(
        &self,
        formula_id: &str,
    ) -> Result<TokenSpecification, TaxonomyError> {
        self.live()
            .read()
            .token_specification(formula_id, self.config.templates.max_depth)
    }

    pub fn list_by_type(&self, options: &QueryOptions) -> Result<QueryResult, TaxonomyError> {
        let store = self.live();
        let taxonomy = store.read();
        query::list_by_type(&taxonomy, options, self.config.query.default_page_size)
    }

    pub fn check_unique(&self, artifact_type: ArtifactType, name: &str, tooling: &str) -> bool {
        symbol::check_unique(&self.live().read(), artifact_type, name, tooling)
    }

    pub fn resolve_folder_name(&self, artifact_type: ArtifactType, tooling: &str) -> String {
        symbol::resolve_folder_name(&self.live().read(), artifact_type, tooling)
    }

    #[instrument(skip_all, fields(tooling = %request.artifact.tooling()))]
    pub fn create_artifact(&self, request: NewArtifactRequest) -> NewArtifactResponse {
        let _gate = self.write_gate.lock();
        let response = self.pipeline.create(&self.live(), request);
        if response.success {
            self.after_persist();
        }
        response
    }

    #[instrument(skip_all, fields(tooling = %request.artifact.tooling()))]
    pub fn update_artifact(&self, request: UpdateArtifactRequest) -> UpdateArtifactResponse {
        let _gate = self.write_gate.lock();
        let response = self.pipeline.update(&self.live(), request);
        if response.success {
            self.after_persist();
        }
        response
    }

    #[instrument(skip_all, fields(tooling = %request.symbol.tooling))]
    pub fn delete_artifact(&self, request: DeleteArtifactRequest) -> DeleteArtifactResponse {
        let _gate = self.write_gate.lock();
        let response = self.pipeline.delete(&self.live(), request);
        if response.success {
            self.after_persist();
        }
        response
    }

    /// Reload from disk and swap the live store; returns the loaded version
    pub fn refresh_taxonomy(&self) -> Result<String, TaxonomyError> {
        let _gate = self.write_gate.lock();
        self.refresh_locked()
    }

    pub fn commit_local_updates(&self, message: &str) -> MutationResponse {
        let _gate = self.write_gate.lock();
        let result = self.version_control.commit(message);
        if let Err(e) = &result {
            error!("Commit failed: {}", e);
        }
        result.into()
    }

    /// Pull remote changes and reload the tree
    pub fn pull_updates(&self) -> MutationResponse {
        let _gate = self.write_gate.lock();
        let result = self
            .version_control
            .pull()
            .and_then(|()| self.refresh_locked().map(|_| ()));
        if let Err(e) = &result {
            error!("Pull failed: {}", e);
        }
        result.into()
    }

    /// Caller holds the write gate.
    fn refresh_locked(&self) -> Result<String, TaxonomyError> {
        let taxonomy = self.loader.load()?;
        let version = taxonomy.version.clone();
        self.cache.put(
            version.clone(),
            Arc::new(taxonomy.clone()),
            Utc::now() + self.config.cache.ttl(),
        );
        *self.live.write() = Arc::new(TaxonomyStore::new(taxonomy));
        info!(version = %version, "Live taxonomy replaced");
        Ok(version)
    }

    /// Caller holds the write gate.
    fn after_persist(&self) {
        if self.config.mutation.refresh_after_persist {
            if let Err(e) = self.refresh_locked() {
                error!("Refresh after persist failed, keeping in-memory state: {}", e);
            }
            return;
        }
        let live = self.live();
        let snapshot = live.snapshot();
        self.cache.put(
            snapshot.version.clone(),
            Arc::new(snapshot),
            Utc::now() + self.config.cache.ttl(),
        );
    }
}
