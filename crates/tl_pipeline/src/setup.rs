//! Scope settings, tier configuration and the daily song rotation.

use tl_core::{ItemId, PostTime, ScopeConfig, ScopeId};
use tl_io::{Catalog, ScopeSetup, TierStore};

use crate::{Aggregator, PipelineError, PipelineResult};

impl<S: TierStore> Aggregator<S> {
    /// The scope's stored configuration, or the default table when it has
    /// none or the stored one fails validation.
    pub fn effective_config(&self, scope: &ScopeId) -> PipelineResult<ScopeConfig> {
        match self.store.load_config(scope)? {
            Some(config) => match config.validate() {
                Ok(()) => Ok(config),
                Err(e) => {
                    tracing::warn!(%scope, error = %e, "stored scope config rejected; using default tiers");
                    Ok(ScopeConfig::default())
                }
            },
            None => {
                tracing::warn!(%scope, "scope has no config; using default tiers");
                Ok(ScopeConfig::default())
            }
        }
    }

    /// Store where and when `scope` gets its daily song. Fields passed as
    /// `None` keep their stored value; the tier config and rotation index are
    /// never touched. A first setup seeds the default tier config.
    pub fn setup_scope(
        &self,
        scope: &ScopeId,
        channel: Option<String>,
        role: Option<String>,
        post_time: Option<PostTime>,
    ) -> PipelineResult<ScopeSetup> {
        self.exclusive(scope, || {
            let mut setup = self.store.load_setup(scope)?.unwrap_or_default();
            if channel.is_some() {
                setup.channel = channel;
            }
            if role.is_some() {
                setup.role = role;
            }
            if post_time.is_some() {
                setup.post_time = post_time;
            }
            self.store.save_setup(scope, &setup)?;
            tracing::info!(
                %scope,
                channel = setup.channel.as_deref().unwrap_or("-"),
                post_time = %setup.post_time.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
                "scope set up"
            );
            Ok(setup)
        })
    }

    /// Validate and replace `scope`'s tier configuration.
    pub fn set_config(&self, scope: &ScopeId, config: ScopeConfig) -> PipelineResult<()> {
        config.validate()?;
        self.exclusive(scope, || {
            let mut setup = self.store.load_setup(scope)?.unwrap_or_default();
            setup.tiers = config;
            self.store.save_setup(scope, &setup)?;
            tracing::info!(%scope, tiers = setup.tiers.active_tiers().len(), damping = setup.tiers.damping, "scope config replaced");
            Ok(())
        })
    }

    /// Catalog entry due for `scope`'s next daily post. Advances the scope's
    /// rotation index, wrapping at the end of the catalog.
    pub fn next_item(&self, scope: &ScopeId, catalog: &Catalog) -> PipelineResult<ItemId> {
        if catalog.is_empty() {
            return Err(PipelineError::EmptyCatalog);
        }
        if !self.store.load_setup(scope)?.is_some_and(|s| s.channel.is_some()) {
            return Err(PipelineError::NotSetUp(scope.clone()));
        }
        self.exclusive(scope, || {
            let mut setup = match self.store.load_setup(scope)? {
                Some(s) if s.channel.is_some() => s,
                _ => return Err(PipelineError::NotSetUp(scope.clone())),
            };
            let item = catalog
                .at_rotation(setup.rotation_index)
                .cloned()
                .ok_or(PipelineError::EmptyCatalog)?;
            setup.rotation_index = (setup.rotation_index + 1) % catalog.len() as u64;
            self.store.save_setup(scope, &setup)?;
            tracing::info!(%scope, %item, next_index = setup.rotation_index, "daily song picked");
            Ok(item)
        })
    }
}
