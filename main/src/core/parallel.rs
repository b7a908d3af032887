use crate::api::config::ProfileConfig;
use crate::api::error::ProfileResult;
use crate::api::types::{Batch, ModelType};
use crate::core::model_profile::ModelProfile;
use rayon::prelude::*;

/// Profile each shard on the rayon pool and reduce the results with merge.
///
/// Every worker starts from an empty profile declared as `model_type`. With
/// `ModelType::Unknown` each shard infers its own type, and shards that infer
/// different types make the reduction fail.
pub fn profile_shards(
    model_type: ModelType,
    shards: &[Batch],
    config: ProfileConfig,
) -> ProfileResult<ModelProfile> {
    let empty = || ModelProfile::new().with_config(config).with_model_type(model_type);
    log::debug!("profiling {} shards as {model_type}", shards.len());
    shards
        .par_iter()
        .map(|shard| {
            let mut profile = empty();
            profile.compute_metrics(&shard.targets, &shard.predictions, shard.scores.as_deref())?;
            Ok(profile)
        })
        .try_reduce(|| empty(), |a, b| a.merge(&b))
}
