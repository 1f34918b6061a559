//! Filter and sort pipeline producing the derived product view.
//!
//! [`filter_and_sort`] is a pure function: it borrows the canonical
//! collection and returns a fresh vector. The inventory engine calls it after
//! every command so the derived view never drifts from the collection.

use crate::Product;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field the derived view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Codigo,
    Nombre,
    Cantidad,
    Creacion,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Codigo,
        SortField::Nombre,
        SortField::Cantidad,
        SortField::Creacion,
    ];

    /// Field name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Codigo => "codigo",
            SortField::Nombre => "nombre",
            SortField::Cantidad => "cantidad",
            SortField::Creacion => "creacion",
        }
    }

    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The other direction.
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Current sort cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOption {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortOption {
    /// Newest products first.
    fn default() -> Self {
        Self::new(SortField::Creacion, SortDirection::Desc)
    }
}

impl SortOption {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// The option selected by clicking `field` with no explicit direction:
    /// flip when `field` is already current, otherwise start ascending.
    pub fn toggled(&self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::asc(field)
        }
    }

    /// Resolve a sort request against this option.
    pub fn resolve(&self, field: SortField, direction: Option<SortDirection>) -> Self {
        match direction {
            Some(direction) => Self::new(field, direction),
            None => self.toggled(field),
        }
    }

    /// Compare two products under this option.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.field {
            SortField::Codigo => a.codigo.cmp(&b.codigo),
            SortField::Cantidad => a.cantidad.cmp(&b.cantidad),
            SortField::Nombre => compare_names(&a.nombre, &b.nombre),
            SortField::Creacion => a.creacion.cmp(&b.creacion),
        };
        self.direction.apply(ordering)
    }
}

/// Compute the derived view of `products`.
///
/// Keeps products whose `nombre` contains `search_term` (case-insensitive,
/// Unicode lowercase; an empty term keeps everything), then sorts them with
/// a stable sort so equal keys keep their insertion order.
pub fn filter_and_sort(products: &[Product], search_term: &str, sort: &SortOption) -> Vec<Product> {
    let needle = search_term.to_lowercase();
    let mut result: Vec<Product> = products
        .iter()
        .filter(|p| p.name_contains(&needle))
        .cloned()
        .collect();

    result.sort_by(|a, b| sort.compare(a, b));
    result
}

/// Locale-style comparison of product names.
///
/// Three levels, each consulted only when the previous one ties:
/// 1. base letters, ignoring case and common Latin accents;
/// 2. accents, unaccented first;
/// 3. case, lowercase first.
///
/// A final code-point comparison keeps the order total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(base_letter)
        .cmp(b.chars().flat_map(base_letter));
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = a
        .chars()
        .map(|c| has_accent(c) as u8)
        .cmp(b.chars().map(|c| has_accent(c) as u8));
    if secondary != Ordering::Equal {
        return secondary;
    }

    let tertiary = a
        .chars()
        .map(|c| c.is_uppercase() as u8)
        .cmp(b.chars().map(|c| c.is_uppercase() as u8));
    if tertiary != Ordering::Equal {
        return tertiary;
    }

    a.cmp(b)
}

/// Lowercase base form of `c` with diacritics removed.
fn base_letter(c: char) -> impl Iterator<Item = char> {
    let folded = strip_accent(c).unwrap_or(c);
    folded.to_lowercase()
}

fn has_accent(c: char) -> bool {
    strip_accent(c).is_some()
}

fn strip_accent(c: char) -> Option<char> {
    let base = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => return None,
    };
    Some(base)
}
