//! Data shapes reported by datasets and input restrictions declared by metrics.
//!
//! The factory compares the two before any distance is evaluated so an
//! incompatible pairing fails with a configuration error instead of deep
//! inside the selector.

use core::fmt;

/// Broad category of the items held by a [`crate::Dataset`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ItemKind {
    /// One floating-point value per item.
    Scalar,
    /// Fixed-length numeric vectors.
    Vector,
    /// UTF-8 strings.
    Text,
    /// Any other representation; only metrics accepting any input apply.
    Opaque,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::Vector => f.write_str("vector"),
            Self::Text => f.write_str("text"),
            Self::Opaque => f.write_str("opaque"),
        }
    }
}

/// Shape of the items held by a [`crate::Dataset`].
///
/// # Examples
/// ```
/// use neighbourly_core::{DataShape, ItemKind};
///
/// let shape = DataShape::vectors(3);
/// assert_eq!(shape.kind(), ItemKind::Vector);
/// assert_eq!(shape.dimension(), Some(3));
/// assert_eq!(shape.to_string(), "vector[3]");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DataShape {
    kind: ItemKind,
    dimension: Option<usize>,
}

impl DataShape {
    /// Shape of a dataset of scalars.
    #[must_use]
    pub const fn scalars() -> Self {
        Self {
            kind: ItemKind::Scalar,
            dimension: None,
        }
    }

    /// Shape of a dataset of vectors sharing `dimension`.
    #[must_use]
    pub const fn vectors(dimension: usize) -> Self {
        Self {
            kind: ItemKind::Vector,
            dimension: Some(dimension),
        }
    }

    /// Shape of a dataset of strings.
    #[must_use]
    pub const fn text() -> Self {
        Self {
            kind: ItemKind::Text,
            dimension: None,
        }
    }

    /// Shape of a dataset whose items carry no declared structure.
    #[must_use]
    pub const fn opaque() -> Self {
        Self {
            kind: ItemKind::Opaque,
            dimension: None,
        }
    }

    /// Returns the item category.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns the vector dimension, if the shape carries one.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

impl fmt::Display for DataShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimension {
            Some(dimension) => write!(f, "{}[{dimension}]", self.kind),
            None => self.kind.fmt(f),
        }
    }
}

/// Input restriction declared by a [`crate::Metric`].
///
/// # Examples
/// ```
/// use neighbourly_core::{DataShape, InputRestriction};
///
/// let restriction = InputRestriction::vectors();
/// assert!(restriction.admits(&DataShape::vectors(8)));
/// assert!(!restriction.admits(&DataShape::text()));
/// assert!(InputRestriction::any().admits(&DataShape::opaque()));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct InputRestriction {
    kind: Option<ItemKind>,
    dimension: Option<usize>,
}

impl InputRestriction {
    /// Accepts every dataset.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            kind: None,
            dimension: None,
        }
    }

    /// Accepts datasets of the given kind, whatever their dimension.
    #[must_use]
    pub const fn of_kind(kind: ItemKind) -> Self {
        Self {
            kind: Some(kind),
            dimension: None,
        }
    }

    /// Accepts vector datasets of any positive dimension.
    #[must_use]
    pub const fn vectors() -> Self {
        Self::of_kind(ItemKind::Vector)
    }

    /// Accepts vector datasets of exactly `dimension` components.
    #[must_use]
    pub const fn vectors_of_dimension(dimension: usize) -> Self {
        Self {
            kind: Some(ItemKind::Vector),
            dimension: Some(dimension),
        }
    }

    /// Returns the required item kind, if any.
    #[must_use]
    pub const fn kind(&self) -> Option<ItemKind> {
        self.kind
    }

    /// Returns the required dimension, if any.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Explains why no dataset could ever satisfy this restriction.
    ///
    /// Returns `None` for usable restrictions.
    #[must_use]
    pub fn unusable_reason(&self) -> Option<&'static str> {
        match (self.kind, self.dimension) {
            (_, Some(0)) => Some("required vector dimension must be positive"),
            (Some(kind), Some(_)) if kind != ItemKind::Vector => {
                Some("only vector restrictions may require a dimension")
            }
            (None, Some(_)) => Some("a dimension requires the vector item kind"),
            _ => None,
        }
    }

    /// Reports whether a dataset of `shape` satisfies this restriction.
    #[must_use]
    pub fn admits(&self, shape: &DataShape) -> bool {
        let Some(kind) = self.kind else {
            return true;
        };
        if kind != shape.kind() {
            return false;
        }
        if kind == ItemKind::Vector && shape.dimension().is_none_or(|dim| dim == 0) {
            return false;
        }
        self.dimension
            .is_none_or(|required| shape.dimension() == Some(required))
    }
}

impl Default for InputRestriction {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for InputRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.dimension) {
            (None, _) => f.write_str("any"),
            (Some(kind), Some(dimension)) => write!(f, "{kind}[{dimension}]"),
            (Some(kind), None) => kind.fmt(f),
        }
    }
}
