//! Inventory - the state container for products.
//!
//! [`InventoryState`] holds the canonical collection and its derived view
//! and knows how to apply a [`Command`]. [`Inventory`] wraps it with the
//! collaborators a running application needs: a clock to stamp `creacion`
//! and a [`ProductStorage`] written after every add or delete.

use crate::{
    error::Result, query, Clock, Codigo, Command, Error, KeyValueStore, Product, ProductInput,
    ProductStorage, SortDirection, SortField, SortOption, SystemClock,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What to do when an added product reuses an existing `codigo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Store it anyway. A later delete of that `codigo` removes every copy.
    #[default]
    Accept,
    /// Fail with [`Error::DuplicateCodigo`] and leave the state untouched.
    Reject,
}

/// The full inventory state as seen by the presentation layer.
///
/// `filtered_products` is always `filter_and_sort(products, search_term,
/// sort_option)`; it is recomputed by every command and never edited
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryState {
    /// Canonical collection in insertion order
    products: Vec<Product>,
    /// Derived view
    filtered_products: Vec<Product>,
    search_term: String,
    sort_option: SortOption,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Outcome of a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Whether the canonical collection changed
    pub products_changed: bool,
    /// Products removed by a delete
    pub removed: usize,
    /// Length of the derived view afterwards
    pub visible: usize,
}

impl InventoryState {
    /// State over `products` with no search term and the default sort.
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_view(products, String::new(), SortOption::default())
    }

    /// State with an explicit search term and sort option.
    pub fn with_view(
        products: Vec<Product>,
        search_term: impl Into<String>,
        sort_option: SortOption,
    ) -> Self {
        let search_term = search_term.into();
        let filtered_products = query::filter_and_sort(&products, &search_term, &sort_option);
        Self {
            products,
            filtered_products,
            search_term,
            sort_option,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn filtered_products(&self) -> &[Product] {
        &self.filtered_products
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    /// Whether any product carries `codigo`.
    pub fn contains(&self, codigo: Codigo) -> bool {
        self.products.iter().any(|p| p.codigo == codigo)
    }

    /// Apply one command.
    ///
    /// `clock` is only read for [`Command::AddProduct`]. On error the state
    /// is left exactly as it was.
    pub fn apply(
        &mut self,
        command: Command,
        clock: &dyn Clock,
        policy: DuplicatePolicy,
    ) -> Result<Transition> {
        let (products_changed, removed) = match command {
            Command::AddProduct(input) => {
                if policy == DuplicatePolicy::Reject && self.contains(input.codigo) {
                    return Err(Error::DuplicateCodigo(input.codigo));
                }
                self.products.push(input.into_product(clock.now()));
                (true, 0)
            }
            Command::DeleteProduct { codigo } => {
                let before = self.products.len();
                self.products.retain(|p| p.codigo != codigo);
                let removed = before - self.products.len();
                (removed > 0, removed)
            }
            Command::SetSearch { term } => {
                self.search_term = term;
                (false, 0)
            }
            Command::SetSort { field, direction } => {
                self.sort_option = self.sort_option.resolve(field, direction);
                (false, 0)
            }
        };

        self.refresh();

        Ok(Transition {
            products_changed,
            removed,
            visible: self.filtered_products.len(),
        })
    }

    fn refresh(&mut self) {
        self.filtered_products =
            query::filter_and_sort(&self.products, &self.search_term, &self.sort_option);
    }
}

/// The inventory engine.
///
/// One instance per application session, passed by reference to whoever
/// needs it. Every add or delete is followed by a persistence write before
/// the next command is accepted; search and sort changes only touch the
/// derived view.
pub struct Inventory<K> {
    state: InventoryState,
    storage: ProductStorage<K>,
    clock: Box<dyn Clock>,
    policy: DuplicatePolicy,
}

impl<K: KeyValueStore> Inventory<K> {
    /// Rehydrate from `store`, falling back to an empty collection when the
    /// stored record is missing or corrupt.
    pub fn open(store: K) -> Self {
        let storage = ProductStorage::new(store);
        let products = storage.load();
        info!(count = products.len(), "Inventory opened");
        Self::from_parts(InventoryState::new(products), storage)
    }

    /// Start from an explicit collection, ignoring anything already stored.
    pub fn with_products(store: K, products: Vec<Product>) -> Self {
        Self::from_parts(InventoryState::new(products), ProductStorage::new(store))
    }

    fn from_parts(state: InventoryState, storage: ProductStorage<K>) -> Self {
        Self {
            state,
            storage,
            clock: Box::new(SystemClock),
            policy: DuplicatePolicy::default(),
        }
    }

    /// Replace the clock used to stamp `creacion`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the duplicate `codigo` policy.
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply a command and persist if it was an add or delete.
    pub fn dispatch(&mut self, command: Command) -> Result<Transition> {
        let kind = command.kind();
        let persist = command.mutates_products();

        let transition = self
            .state
            .apply(command, self.clock.as_ref(), self.policy)?;

        debug!(
            command = kind,
            products = self.state.products.len(),
            visible = transition.visible,
            "Applied command"
        );

        if persist {
            self.storage.save(&self.state.products);
        }

        Ok(transition)
    }

    /// Add a product stamped with the current time.
    pub fn add(&mut self, input: ProductInput) -> Result<()> {
        let codigo = input.codigo;
        self.dispatch(Command::AddProduct(input))?;
        info!(codigo, "Product added");
        Ok(())
    }

    /// Remove every product with `codigo`. Returns how many were removed.
    pub fn delete(&mut self, codigo: Codigo) -> usize {
        let removed = self.apply_infallible(Command::DeleteProduct { codigo }).removed;
        info!(codigo, removed, "Product deleted");
        removed
    }

    /// Replace the search term.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.apply_infallible(Command::SetSearch { term: term.into() });
    }

    /// Change the sort option; without a direction, toggle.
    pub fn set_sort(&mut self, field: SortField, direction: Option<SortDirection>) {
        self.apply_infallible(Command::SetSort { field, direction });
    }

    // Only adds under `DuplicatePolicy::Reject` can fail.
    fn apply_infallible(&mut self, command: Command) -> Transition {
        debug_assert!(!matches!(command, Command::AddProduct(_)));
        match self.dispatch(command) {
            Ok(transition) => transition,
            Err(_) => Transition {
                products_changed: false,
                removed: 0,
                visible: self.state.filtered_products.len(),
            },
        }
    }

    pub fn state(&self) -> &InventoryState {
        &self.state
    }

    /// Owned copy of the current state for rendering.
    pub fn snapshot(&self) -> InventoryState {
        self.state.clone()
    }

    pub fn products(&self) -> &[Product] {
        self.state.products()
    }

    pub fn filtered_products(&self) -> &[Product] {
        self.state.filtered_products()
    }

    pub fn search_term(&self) -> &str {
        self.state.search_term()
    }

    pub fn sort_option(&self) -> SortOption {
        self.state.sort_option()
    }

    /// First product with `codigo`, in insertion order.
    pub fn get(&self, codigo: Codigo) -> Option<&Product> {
        self.state.products.iter().find(|p| p.codigo == codigo)
    }

    pub fn len(&self) -> usize {
        self.state.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.products.is_empty()
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn storage(&self) -> &ProductStorage<K> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::FailingStore;
    use crate::{snapshot, FixedClock, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
    }

    fn test_inventory() -> Inventory<MemoryStore> {
        Inventory::open(MemoryStore::new()).with_clock(clock())
    }

    fn codigos(products: &[Product]) -> Vec<Codigo> {
        products.iter().map(|p| p.codigo).collect()
    }

    fn stored(inventory: &Inventory<MemoryStore>) -> Vec<Product> {
        inventory.storage().try_load().unwrap()
    }

    #[test]
    fn open_empty_store() {
        let inventory = test_inventory();
        assert!(inventory.is_empty());
        assert!(inventory.filtered_products().is_empty());
        assert_eq!(inventory.search_term(), "");
        assert_eq!(inventory.sort_option(), SortOption::default());
    }

    #[test]
    fn open_rehydrates_stored_products() {
        let mut first = test_inventory();
        first.add(ProductInput::new(1, "Widget", 5)).unwrap();
        first.add(ProductInput::new(2, "Gadget", 0)).unwrap();

        let store = first.storage().store().clone();
        let reopened = Inventory::open(store);

        assert_eq!(reopened.products(), first.products());
        // Newest first by default.
        assert_eq!(codigos(reopened.filtered_products()), vec![2, 1]);
    }

    #[test]
    fn open_recovers_from_corrupt_store() {
        let store = MemoryStore::with_entry(snapshot::STORAGE_KEY, r#"[{"codigo":"x"}]"#);
        let inventory = Inventory::open(store);
        assert!(inventory.is_empty());
    }

    #[test]
    fn add_stamps_creacion_and_persists() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        inventory.add(ProductInput::new(2, "Gadget", 0)).unwrap();

        let products = inventory.products();
        assert_eq!(codigos(products), vec![1, 2]);
        assert!(products[0].creacion < products[1].creacion);
        assert_eq!(stored(&inventory), products);
    }

    #[test]
    fn delete_removes_and_persists() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        inventory.add(ProductInput::new(2, "Gadget", 0)).unwrap();

        assert_eq!(inventory.delete(1), 1);
        assert_eq!(codigos(inventory.products()), vec![2]);
        assert_eq!(codigos(&stored(&inventory)), vec![2]);
    }

    #[test]
    fn delete_missing_is_noop() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        let before = inventory.snapshot();

        assert_eq!(inventory.delete(99), 0);
        assert_eq!(inventory.snapshot(), before);
    }

    #[test]
    fn search_and_sort_do_not_persist() {
        let mut store = MemoryStore::new();
        store.set(snapshot::STORAGE_KEY, "[]").unwrap();
        let mut inventory = Inventory::with_products(store, Vec::new()).with_clock(clock());

        inventory.set_search_term("wid");
        inventory.set_sort(SortField::Nombre, None);

        assert_eq!(
            inventory
                .storage()
                .store()
                .get(snapshot::STORAGE_KEY)
                .unwrap()
                .as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn widget_gadget_scenario() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        inventory.add(ProductInput::new(2, "Gadget", 0)).unwrap();

        inventory.set_search_term("wid");
        assert_eq!(codigos(inventory.filtered_products()), vec![1]);

        inventory.set_search_term("");
        inventory.set_sort(SortField::Cantidad, Some(SortDirection::Desc));
        let view: Vec<_> = inventory
            .filtered_products()
            .iter()
            .map(|p| (p.nombre.as_str(), p.cantidad))
            .collect();
        assert_eq!(view, vec![("Widget", 5), ("Gadget", 0)]);
    }

    #[test]
    fn set_sort_toggles_and_resets() {
        let mut inventory = test_inventory();

        inventory.set_sort(SortField::Codigo, None);
        assert_eq!(inventory.sort_option(), SortOption::asc(SortField::Codigo));

        inventory.set_sort(SortField::Codigo, None);
        assert_eq!(inventory.sort_option(), SortOption::desc(SortField::Codigo));

        inventory.set_sort(SortField::Nombre, None);
        assert_eq!(inventory.sort_option(), SortOption::asc(SortField::Nombre));

        // Default is creacion desc, so toggling creacion first flips to asc.
        let mut fresh = test_inventory();
        fresh.set_sort(SortField::Creacion, None);
        assert_eq!(fresh.sort_option(), SortOption::asc(SortField::Creacion));
    }

    #[test]
    fn derived_view_tracks_every_command() {
        let mut inventory = test_inventory();
        inventory.set_search_term("get");
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        inventory.add(ProductInput::new(2, "Gadget", 0)).unwrap();
        inventory.add(ProductInput::new(3, "Tornillo", 9)).unwrap();
        inventory.set_sort(SortField::Codigo, Some(SortDirection::Asc));

        let state = inventory.state();
        let expected =
            query::filter_and_sort(state.products(), state.search_term(), &state.sort_option());
        assert_eq!(state.filtered_products(), expected.as_slice());
        assert_eq!(codigos(state.filtered_products()), vec![1, 2]);
    }

    #[test]
    fn duplicates_accepted_by_default() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        inventory.add(ProductInput::new(1, "Widget bis", 2)).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.get(1).unwrap().nombre, "Widget");

        // One delete removes every copy.
        assert_eq!(inventory.delete(1), 2);
        assert!(inventory.is_empty());
    }

    #[test]
    fn duplicates_rejected_by_policy() {
        let mut inventory = test_inventory().with_policy(DuplicatePolicy::Reject);
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        let before = inventory.snapshot();

        let result = inventory.add(ProductInput::new(1, "Otro", 1));
        assert_eq!(result, Err(Error::DuplicateCodigo(1)));
        assert_eq!(inventory.snapshot(), before);
        assert_eq!(stored(&inventory).len(), 1);
    }

    #[test]
    fn add_then_delete_restores_membership() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        inventory.add(ProductInput::new(2, "Gadget", 0)).unwrap();
        let before = inventory.products().to_vec();

        inventory.add(ProductInput::new(3, "Tornillo", 9)).unwrap();
        inventory.delete(3);

        assert_eq!(inventory.products(), before.as_slice());
    }

    #[test]
    fn dispatch_reports_transition() {
        let mut inventory = test_inventory();
        let t = inventory
            .dispatch(Command::add(ProductInput::new(1, "Widget", 5)))
            .unwrap();
        assert!(t.products_changed);
        assert_eq!(t.visible, 1);

        let t = inventory.dispatch(Command::search("zzz")).unwrap();
        assert!(!t.products_changed);
        assert_eq!(t.visible, 0);

        let t = inventory.dispatch(Command::delete(1)).unwrap();
        assert!(t.products_changed);
        assert_eq!(t.removed, 1);
    }

    #[test]
    fn write_failures_do_not_reach_caller() {
        let mut inventory = Inventory::open(FailingStore::default()).with_clock(clock());
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        assert_eq!(inventory.delete(1), 1);
        assert_eq!(inventory.storage().store().attempts, 2);
    }

    #[test]
    fn state_serializes_camel_case() {
        let mut inventory = test_inventory();
        inventory.add(ProductInput::new(1, "Widget", 5)).unwrap();
        let value = serde_json::to_value(inventory.snapshot()).unwrap();

        assert!(value.get("filteredProducts").is_some());
        assert_eq!(value["searchTerm"], "");
        assert_eq!(value["sortOption"]["field"], "creacion");
        assert_eq!(value["sortOption"]["direction"], "desc");
        assert_eq!(value["products"][0]["creacion"], "2024-05-01T10:00:00.000Z");
    }
}
