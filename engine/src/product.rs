//! Product types held by the inventory.

use crate::{Cantidad, Codigo, Timestamp};
use serde::{Deserialize, Serialize};

/// A product as supplied by the presentation layer.
///
/// Everything a [`Product`] carries except `creacion`, which the engine
/// stamps at insertion time. Field validation (positive `codigo`, non-empty
/// `nombre`) is the caller's job; the engine stores what it is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Identifier, expected to be > 0
    pub codigo: Codigo,
    /// Display name, used for search and name sorting
    pub nombre: String,
    /// Free text description
    #[serde(default)]
    pub descripcion: String,
    /// Units in stock
    pub cantidad: Cantidad,
    /// Opaque image reference (data URL, path, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
}

impl ProductInput {
    /// Create an input with an empty description and no image.
    pub fn new(codigo: Codigo, nombre: impl Into<String>, cantidad: Cantidad) -> Self {
        Self {
            codigo,
            nombre: nombre.into(),
            descripcion: String::new(),
            cantidad,
            imagen: None,
        }
    }

    /// Set the description.
    pub fn with_descripcion(mut self, descripcion: impl Into<String>) -> Self {
        self.descripcion = descripcion.into();
        self
    }

    /// Set the image reference.
    pub fn with_imagen(mut self, imagen: impl Into<String>) -> Self {
        self.imagen = Some(imagen.into());
        self
    }

    /// Turn the input into a stored product created at `creacion`.
    pub fn into_product(self, creacion: Timestamp) -> Product {
        Product {
            codigo: self.codigo,
            nombre: self.nombre,
            descripcion: self.descripcion,
            cantidad: self.cantidad,
            creacion,
            imagen: self.imagen,
        }
    }
}

/// A product in the inventory.
///
/// Serializes to the persisted record shape: `creacion` is written as an
/// RFC 3339 UTC string with millisecond precision and `imagen` is omitted
/// when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub codigo: Codigo,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    pub cantidad: Cantidad,
    /// When the engine inserted the product
    #[serde(with = "crate::snapshot::iso8601")]
    pub creacion: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
}

impl Product {
    /// Whether `nombre` contains `needle`, both compared in lowercase.
    ///
    /// `needle` must already be lowercased.
    pub fn name_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.nombre.to_lowercase().contains(needle)
    }

    /// Whether the product has an image reference.
    pub fn has_imagen(&self) -> bool {
        self.imagen.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether the product is out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.cantidad == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn ts() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn input_into_product_keeps_fields() {
        let product = ProductInput::new(7, "Lámpara", 3)
            .with_descripcion("De mesa")
            .with_imagen("data:image/png;base64,AAAA")
            .into_product(ts());

        assert_eq!(product.codigo, 7);
        assert_eq!(product.nombre, "Lámpara");
        assert_eq!(product.descripcion, "De mesa");
        assert_eq!(product.cantidad, 3);
        assert_eq!(product.creacion, ts());
        assert!(product.has_imagen());
    }

    #[test]
    fn name_contains_is_case_insensitive() {
        let product = ProductInput::new(1, "Widget Deluxe", 5).into_product(ts());
        assert!(product.name_contains("wid"));
        assert!(product.name_contains("deluxe"));
        assert!(product.name_contains(""));
        assert!(!product.name_contains("gadget"));
    }

    #[test]
    fn name_contains_handles_non_ascii() {
        let product = ProductInput::new(1, "ÑANDÚ", 5).into_product(ts());
        assert!(product.name_contains("ñandú"));
    }

    #[test]
    fn serialization_format() {
        let product = ProductInput::new(1, "Widget", 5).into_product(ts());
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(
            value,
            json!({
                "codigo": 1,
                "nombre": "Widget",
                "descripcion": "",
                "cantidad": 5,
                "creacion": "2024-05-01T10:00:00.000Z"
            })
        );
    }

    #[test]
    fn input_deserializes_without_optional_fields() {
        let input: ProductInput =
            serde_json::from_value(json!({"codigo": 2, "nombre": "Gadget", "cantidad": 0}))
                .unwrap();
        assert_eq!(input, ProductInput::new(2, "Gadget", 0));
    }

    #[test]
    fn out_of_stock() {
        let product = ProductInput::new(2, "Gadget", 0).into_product(ts());
        assert!(product.is_out_of_stock());
        assert!(!product.has_imagen());
    }
}
