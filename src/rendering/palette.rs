use crate::annotations::class_registry::{ClassIndex, ClassRegistry};
use crate::rendering::color::{Color, Hsv, hsv_to_rgb};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Evenly spaced, fully saturated hues: index `i` of `n` gets hue `i / n`.
pub fn evenly_spaced_hues(num_classes: usize) -> Vec<Hsv> {
    (0..num_classes)
        .map(|index| Hsv::pure(index as f64 / num_classes as f64))
        .collect()
}

/// Shuffles the colors uniformly. Only the order changes, never the colors themselves.
pub fn permute<R: Rng + ?Sized>(mut colors: Vec<Color>, rng: &mut R) -> Vec<Color> {
    colors.shuffle(rng);
    colors
}

/// Generates one distinct color per class, in shuffled order.
pub fn generate_palette<R: Rng + ?Sized>(num_classes: usize, rng: &mut R) -> Vec<Color> {
    let colors = evenly_spaced_hues(num_classes)
        .into_iter()
        .map(hsv_to_rgb)
        .collect();
    permute(colors, rng)
}

/// The color each class is drawn with.
///
/// Colors are keyed by class index rather than by position in a list, so a registry and a
/// palette built for a different registry never silently line up.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: BTreeMap<ClassIndex, Color>,
}

impl Palette {
    /// Builds a palette for every class of the registry.
    ///
    /// With a seed the assignment of hues to classes is reproducible; without one a fresh
    /// permutation is drawn from the thread rng.
    pub fn for_registry(registry: &ClassRegistry, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::for_registry_with_rng(registry, &mut StdRng::seed_from_u64(seed)),
            None => Self::for_registry_with_rng(registry, &mut rand::rng()),
        }
    }

    pub fn for_registry_with_rng<R: Rng + ?Sized>(registry: &ClassRegistry, rng: &mut R) -> Self {
        let shuffled = generate_palette(registry.len(), rng);
        let colors = registry
            .iter()
            .map(|(index, _)| index)
            .zip(shuffled)
            .collect();
        Palette { colors }
    }

    /// Builds a palette from explicit assignments.
    pub fn from_assignments(assignments: impl IntoIterator<Item = (ClassIndex, Color)>) -> Self {
        Palette { colors: assignments.into_iter().collect() }
    }

    pub fn get(&self, index: ClassIndex) -> Option<Color> {
        self.colors.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
