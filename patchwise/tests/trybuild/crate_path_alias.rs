//! Derive output resolves `patchwise` through a re-exported module path.

use patchwise::{OptionalValue, PartialRecord};

mod deps {
    pub use patchwise;
}

#[derive(Debug, Default)]
struct Settings {
    theme: Option<String>,
}

/// Expands against `deps::patchwise` instead of `::patchwise`.
#[derive(Default, PartialRecord)]
#[patch(target = Settings, crate = "deps::patchwise")]
struct SettingsPatch {
    theme: OptionalValue<String>,
}

fn main() {
    let mut settings = Settings::default();
    let patch = SettingsPatch {
        theme: OptionalValue::present("dark".to_owned()),
    };
    let result: patchwise::PatchResult<()> = patchwise::merge(&mut settings, patch);
    let _ = result;
}
