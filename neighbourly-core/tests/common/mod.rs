use neighbourly_core::{DataShape, InMemoryDataset};

/// The four-point line `{A: 0, B: 1, C: 2, D: 10}`.
#[must_use]
pub fn line() -> InMemoryDataset<char, f32> {
    scalars("line", [('A', 0.0), ('B', 1.0), ('C', 2.0), ('D', 10.0)])
}

/// Builds a named scalar dataset with the scalar shape attached.
#[must_use]
pub fn scalars<I: neighbourly_core::ItemId>(
    name: &str,
    entries: impl IntoIterator<Item = (I, f32)>,
) -> InMemoryDataset<I, f32> {
    InMemoryDataset::new(name, entries).with_shape(DataShape::scalars())
}
