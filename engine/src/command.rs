//! Commands accepted by the inventory engine.
//!
//! Every change to the inventory is expressed as a [`Command`] and applied
//! by [`Inventory::dispatch`](crate::Inventory::dispatch), one synchronous
//! transition per command.

use crate::{Codigo, ProductInput, SortDirection, SortField};
use serde::{Deserialize, Serialize};

/// A command that can be applied to the inventory.
///
/// On the wire the variant is carried in a `type` tag:
///
/// ```json
/// {"type": "add_product", "codigo": 1, "nombre": "Widget", "cantidad": 5}
/// {"type": "delete_product", "codigo": 1}
/// {"type": "set_search", "term": "wid"}
/// {"type": "set_sort", "field": "cantidad", "direction": "desc"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Append a product; the engine stamps `creacion`.
    AddProduct(ProductInput),
    /// Remove every product with this `codigo`.
    DeleteProduct { codigo: Codigo },
    /// Replace the search term.
    SetSearch { term: String },
    /// Change the sort cursor. Without a direction the engine toggles.
    SetSort {
        field: SortField,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<SortDirection>,
    },
}

impl Command {
    pub fn add(input: ProductInput) -> Self {
        Command::AddProduct(input)
    }

    pub fn delete(codigo: Codigo) -> Self {
        Command::DeleteProduct { codigo }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Command::SetSearch { term: term.into() }
    }

    pub fn sort(field: SortField, direction: Option<SortDirection>) -> Self {
        Command::SetSort { field, direction }
    }

    /// Whether this command can change the canonical collection, and so
    /// needs a persistence write when it does.
    pub fn mutates_products(&self) -> bool {
        matches!(self, Command::AddProduct(_) | Command::DeleteProduct { .. })
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::AddProduct(_) => "add_product",
            Command::DeleteProduct { .. } => "delete_product",
            Command::SetSearch { .. } => "set_search",
            Command::SetSort { .. } => "set_sort",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_product_wire_format() {
        let cmd = Command::add(ProductInput::new(1, "Widget", 5));
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "add_product",
                "codigo": 1,
                "nombre": "Widget",
                "descripcion": "",
                "cantidad": 5
            })
        );
    }

    #[test]
    fn parse_commands() {
        let cmd: Command =
            serde_json::from_str(r#"{"type":"delete_product","codigo":9}"#).unwrap();
        assert_eq!(cmd, Command::delete(9));

        let cmd: Command = serde_json::from_str(r#"{"type":"set_search","term":"wid"}"#).unwrap();
        assert_eq!(cmd, Command::search("wid"));

        let cmd: Command =
            serde_json::from_str(r#"{"type":"set_sort","field":"nombre"}"#).unwrap();
        assert_eq!(cmd, Command::sort(SortField::Nombre, None));

        let cmd: Command =
            serde_json::from_str(r#"{"type":"set_sort","field":"cantidad","direction":"desc"}"#)
                .unwrap();
        assert_eq!(
            cmd,
            Command::sort(SortField::Cantidad, Some(SortDirection::Desc))
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        let result = serde_json::from_str::<Command>(r#"{"type":"update_product","codigo":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn mutation_classification() {
        assert!(Command::add(ProductInput::new(1, "A", 1)).mutates_products());
        assert!(Command::delete(1).mutates_products());
        assert!(!Command::search("a").mutates_products());
        assert!(!Command::sort(SortField::Codigo, None).mutates_products());
    }
}
