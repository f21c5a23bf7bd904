//! Every field kind of the derive expands against the engine helpers.

use patchwise::{FieldPath, OptionalValue, PartialRecord, PatchResult};

#[derive(Clone, Debug, Default)]
struct Tag {
    label: String,
    colour: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct Owner {
    login: String,
}

#[derive(Clone, Debug, Default)]
struct Meta {
    source: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct Board {
    title: String,
    summary: Option<String>,
    meta: Option<Meta>,
    owner: Owner,
    tags: Vec<Tag>,
}

#[derive(Default, PartialRecord)]
#[patch(target = Tag)]
struct TagPatch {
    #[patch(key, required)]
    label: OptionalValue<String>,
    colour: OptionalValue<String>,
}

#[derive(Default, PartialRecord)]
#[patch(target = Owner)]
struct OwnerPatch {
    #[patch(required)]
    login: OptionalValue<String>,
}

#[derive(Default, PartialRecord)]
#[patch(target = Meta)]
struct MetaPatch {
    source: OptionalValue<String>,
}

fn new_tag(_path: &FieldPath) -> PatchResult<Tag> {
    Ok(Tag::default())
}

#[derive(Default, PartialRecord)]
#[patch(target = Board)]
struct BoardPatch {
    #[patch(required)]
    title: OptionalValue<String>,
    summary: OptionalValue<String>,
    #[patch(nested)]
    meta: OptionalValue<MetaPatch>,
    #[patch(nested, required)]
    owner: OptionalValue<OwnerPatch>,
    #[patch(collection, create = "new_tag")]
    tags: OptionalValue<Vec<TagPatch>>,
}

fn main() {
    let board = Board::default();
    let patch = BoardPatch {
        summary: OptionalValue::Null,
        ..BoardPatch::default()
    };
    let paths: Vec<FieldPath> = patch.present_paths();
    let updated: PatchResult<Board> = patchwise::Merger::default().merged(&board, patch);
    let _ = (paths, updated);
}
