//! Type table consulted by every stage that needs per-type decisions.

use std::collections::BTreeMap;

use geometry::scales::UPPER_SCALE;
use serde::{Deserialize, Serialize};

/// One classification type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub code: u32,
    pub name: String,
    /// Coarsest zoom the type is drawn at.
    pub min_scale: u8,
    /// Finest zoom the type is drawn at.
    #[serde(default = "default_max_scale")]
    pub max_scale: u8,
    #[serde(default)]
    pub road: bool,
    #[serde(default)]
    pub coastline: bool,
}

fn default_max_scale() -> u8 {
    UPPER_SCALE
}

impl TypeInfo {
    pub fn new(code: u32, name: impl Into<String>, min_scale: u8, max_scale: u8) -> Self {
        Self {
            code,
            name: name.into(),
            min_scale,
            max_scale,
            road: false,
            coastline: false,
        }
    }

    #[must_use]
    pub fn road(mut self) -> Self {
        self.road = true;
        self
    }

    #[must_use]
    pub fn coastline(mut self) -> Self {
        self.coastline = true;
        self
    }
}

#[derive(Deserialize)]
struct ClassificatorDef {
    #[serde(default)]
    types: Vec<TypeInfo>,
}

/// Immutable lookup table from type code to [`TypeInfo`].
///
/// Built once from configuration and shared by reference with the sorter,
/// collector and packer. Unknown codes are ignored by every query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ClassificatorDef")]
pub struct Classificator {
    types: BTreeMap<u32, TypeInfo>,
}

impl TryFrom<ClassificatorDef> for Classificator {
    type Error = String;

    fn try_from(def: ClassificatorDef) -> Result<Self, Self::Error> {
        Classificator::from_types(def.types)
    }
}

impl Classificator {
    /// Builds a table from `types`.
    ///
    /// # Errors
    ///
    /// Returns a message if a code repeats, a range is inverted, or a
    /// scale exceeds the finest zoom.
    pub fn from_types(types: impl IntoIterator<Item = TypeInfo>) -> Result<Self, String> {
        let mut map = BTreeMap::new();
        for info in types {
            if info.min_scale > info.max_scale {
                return Err(format!(
                    "type {} ({}): min_scale {} > max_scale {}",
                    info.code, info.name, info.min_scale, info.max_scale
                ));
            }
            if info.max_scale > UPPER_SCALE {
                return Err(format!(
                    "type {} ({}): max_scale {} exceeds {}",
                    info.code, info.name, info.max_scale, UPPER_SCALE
                ));
            }
            let code = info.code;
            if map.insert(code, info).is_some() {
                return Err(format!("type {} declared twice", code));
            }
        }
        Ok(Self { types: map })
    }

    #[must_use]
    pub fn get(&self, code: u32) -> Option<&TypeInfo> {
        self.types.get(&code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    fn known<'a>(&'a self, types: &'a [u32]) -> impl Iterator<Item = &'a TypeInfo> + 'a {
        types.iter().filter_map(move |t| self.types.get(t))
    }

    /// Union of the drawable ranges of every known type in `types`.
    ///
    /// `None` when no type is known.
    #[must_use]
    pub fn drawable_range(&self, types: &[u32]) -> Option<(u8, u8)> {
        self.known(types).fold(None, |acc, info| match acc {
            None => Some((info.min_scale, info.max_scale)),
            Some((lo, hi)) => Some((lo.min(info.min_scale), hi.max(info.max_scale))),
        })
    }

    /// True if any known type is drawable somewhere in `lo..=hi`.
    #[must_use]
    pub fn is_drawable_in_range(&self, types: &[u32], lo: u8, hi: u8) -> bool {
        self.known(types)
            .any(|info| info.min_scale <= hi && info.max_scale >= lo)
    }

    #[must_use]
    pub fn is_road(&self, types: &[u32]) -> bool {
        self.known(types).any(|info| info.road)
    }

    #[must_use]
    pub fn is_coastline(&self, types: &[u32]) -> bool {
        self.known(types).any(|info| info.coastline)
    }
}
