//! One console session: the inventory, the featured carousel, and the
//! text rendering of both.

use std::fmt::Write as _;

use serde::Serialize;
use vitrina_engine::{
    CarouselConfig, CarouselController, CarouselState, Inventory, InventoryState, Key,
    KeyValueStore, Product, Scheduler, TimerToken,
};

use crate::console::{ConsoleCommand, HELP};
use crate::error::Result;

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Both snapshots, for the `state` command.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionState<'a> {
    inventory: &'a InventoryState,
    carousel: &'a CarouselState,
}

/// The inventory and the carousel showing its products.
pub struct Session<K: KeyValueStore, S: Scheduler> {
    inventory: Inventory<K>,
    carousel: CarouselController<S>,
}

impl<K: KeyValueStore, S: Scheduler> Session<K, S> {
    /// The carousel's item count is taken from the inventory, overriding
    /// whatever `carousel` was built with.
    pub fn new(inventory: Inventory<K>, mut carousel: CarouselController<S>) -> Self {
        carousel.set_item_count(inventory.len());
        Self {
            inventory,
            carousel,
        }
    }

    pub fn inventory(&self) -> &Inventory<K> {
        &self.inventory
    }

    pub fn carousel(&self) -> &CarouselController<S> {
        &self.carousel
    }

    /// Run one command, appending anything to show to `out`.
    pub fn execute(&mut self, command: ConsoleCommand, out: &mut String) -> Result<Flow> {
        match command {
            ConsoleCommand::Add(input) => {
                let codigo = input.codigo;
                self.inventory.add(input)?;
                self.sync_carousel();
                let _ = writeln!(out, "Added product {codigo}");
            }
            ConsoleCommand::Delete(codigo) => {
                let removed = self.inventory.delete(codigo);
                self.sync_carousel();
                if removed == 0 {
                    let _ = writeln!(out, "No product with codigo {codigo}");
                } else {
                    let _ = writeln!(out, "Deleted {removed} product(s) with codigo {codigo}");
                }
            }
            ConsoleCommand::Search(term) => {
                self.inventory.set_search_term(term);
                self.render_list(out);
            }
            ConsoleCommand::Sort { field, direction } => {
                self.inventory.set_sort(field, direction);
                self.render_list(out);
            }
            ConsoleCommand::List => self.render_list(out),
            ConsoleCommand::Next => {
                self.carousel.next();
                self.render_carousel(out);
            }
            ConsoleCommand::Prev => {
                self.carousel.prev();
                self.render_carousel(out);
            }
            ConsoleCommand::Key(name) => {
                self.carousel.on_key(Key::from_name(&name));
                self.render_carousel(out);
            }
            ConsoleCommand::Drag(points) => {
                self.drag(&points);
                let _ = writeln!(out, "Scroll offset {:.0}px", self.carousel.state().scroll_offset);
            }
            ConsoleCommand::Viewport(width) => {
                self.carousel.set_viewport_width(width);
                self.render_carousel(out);
            }
            ConsoleCommand::AutoPlay { enabled, speed_ms } => {
                let current = *self.carousel.config();
                self.carousel.configure(CarouselConfig {
                    auto_play: enabled,
                    auto_play_speed: speed_ms.unwrap_or(current.auto_play_speed),
                    ..current
                });
                let _ = writeln!(
                    out,
                    "Autoplay {} ({} ms)",
                    if enabled { "on" } else { "off" },
                    self.carousel.config().auto_play_speed
                );
            }
            ConsoleCommand::Show => self.render_carousel(out),
            ConsoleCommand::State => {
                let state = SessionState {
                    inventory: self.inventory.state(),
                    carousel: self.carousel.state(),
                };
                let json = serde_json::to_string_pretty(&state)
                    .map_err(vitrina_engine::Error::from)?;
                let _ = writeln!(out, "{json}");
            }
            ConsoleCommand::Help => {
                let _ = writeln!(out, "{HELP}");
            }
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Deliver an autoplay firing. Renders the carousel if it moved.
    pub fn on_timer(&mut self, token: TimerToken, out: &mut String) -> bool {
        let moved = self.carousel.on_timer(token);
        if moved {
            self.render_carousel(out);
        }
        moved
    }

    /// Stop the carousel timer.
    pub fn teardown(&mut self) {
        self.carousel.teardown();
    }

    fn sync_carousel(&mut self) {
        self.carousel.set_item_count(self.inventory.len());
    }

    fn drag(&mut self, points: &[f64]) {
        let Some((first, moves)) = points.split_first() else {
            return;
        };
        self.carousel.start_drag(*first);
        for x in moves {
            self.carousel.move_drag(*x);
        }
        self.carousel.end_drag();
    }

    fn render_list(&self, out: &mut String) {
        let sort = self.inventory.sort_option();
        let visible = self.inventory.filtered_products();
        let _ = writeln!(
            out,
            "{} of {} product(s), search '{}', sorted by {} {}",
            visible.len(),
            self.inventory.len(),
            self.inventory.search_term(),
            sort.field.as_str(),
            sort.direction.as_str()
        );
        for product in visible {
            let _ = writeln!(out, "  {}", render_product(product));
        }
    }

    fn render_carousel(&self, out: &mut String) {
        let state = self.carousel.state();
        let products = self.inventory.products();
        let window: Vec<String> = self
            .carousel
            .visible_range()
            .filter_map(|i| products.get(i))
            .map(|p| format!("[{} {}]", p.codigo, p.nombre))
            .collect();

        let _ = writeln!(
            out,
            "{} {} {}   {}/{} ({} visible, {})",
            if self.carousel.can_prev() { "<" } else { " " },
            if window.is_empty() {
                "(no products)".to_string()
            } else {
                window.join(" ")
            },
            if self.carousel.can_next() { ">" } else { " " },
            state.current_index,
            state.max_index,
            state.visible_items,
            if self.carousel.timer_token().is_some() {
                "autoplay"
            } else {
                "paused"
            }
        );
    }
}

fn render_product(product: &Product) -> String {
    let mut line = format!(
        "#{:<6} {:<24} qty {:>5}  {}",
        product.codigo,
        product.nombre,
        product.cantidad,
        product.creacion.format("%Y-%m-%d %H:%M")
    );
    if product.is_out_of_stock() {
        line.push_str("  OUT OF STOCK");
    }
    if !product.descripcion.is_empty() {
        let _ = write!(line, "  - {}", product.descripcion);
    }
    if product.has_imagen() {
        line.push_str("  [img]");
    }
    line
}
