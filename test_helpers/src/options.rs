//! Loading [`MergeOptions`] against a sandboxed environment.
//!
//! Each helper runs inside a [`figment::Jail`], so files written and
//! `PATCHWISE_*` variables set by the setup closure vanish once the load
//! returns.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use figment::Jail;
use patchwise::{MergeError, MergeOptions, PatchResult};

fn load_in_jail<F>(setup: F) -> Result<PatchResult<MergeOptions>>
where
    F: FnOnce(&mut Jail) -> figment::error::Result<()>,
{
    let mut loaded = None;
    Jail::try_with(|jail| {
        setup(jail)?;
        loaded = Some(MergeOptions::load());
        Ok(())
    })
    .map_err(|err| anyhow!("jail setup failed: {err}"))?;
    loaded.ok_or_else(|| anyhow!("options were never loaded"))
}

/// Load options after `setup` has prepared the config file and environment.
///
/// # Errors
///
/// Returns an error when `setup` fails or the options are rejected.
pub fn load_options<F>(setup: F) -> Result<MergeOptions>
where
    F: FnOnce(&mut Jail) -> figment::error::Result<()>,
{
    load_in_jail(setup)?.map_err(|err| anyhow!("{err}"))
}

/// Load options that `setup` has made invalid and return the rejection.
///
/// # Errors
///
/// Returns an error when `setup` fails or the options load cleanly.
pub fn load_failure<F>(setup: F) -> Result<Arc<MergeError>>
where
    F: FnOnce(&mut Jail) -> figment::error::Result<()>,
{
    load_in_jail(setup)?
        .err()
        .ok_or_else(|| anyhow!("options loaded despite the invalid setup"))
}
