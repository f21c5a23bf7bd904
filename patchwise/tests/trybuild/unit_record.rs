//! Field-less records derive without unused-variable errors.

use patchwise::PartialRecord;

struct Marker;

/// A record with no fields never changes its target.
#[derive(PartialRecord)]
#[patch(target = Marker)]
struct MarkerPatch;

fn main() {
    let mut marker = Marker;
    let result = patchwise::merge(&mut marker, MarkerPatch);
    let _ = result;
}
