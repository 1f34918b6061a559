//! Console protocol: one command per input line.
//!
//! Raw input is validated here, before anything reaches the engine, with the
//! same rules the product form applies.

use crate::error::{AppError, Result};
use vitrina_engine::{Codigo, ProductInput, SortDirection, SortField};

/// Largest accepted image reference.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

pub const HELP: &str = "\
Inventory
  add <codigo> <cantidad> <nombre> [| <descripcion> [| <imagen>]]
  delete <codigo>
  search [term]
  sort <codigo|nombre|cantidad|creacion> [asc|desc]
  list
Carousel
  next | prev
  key <ArrowLeft|ArrowRight>
  drag <x> <x>...        start at the first x, move through the rest, release
  viewport <width>
  autoplay on|off [ms]
  show
Other
  state | help | quit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Add(ProductInput),
    Delete(Codigo),
    Search(String),
    Sort {
        field: SortField,
        direction: Option<SortDirection>,
    },
    List,
    Next,
    Prev,
    Key(String),
    Drag(Vec<f64>),
    Viewport(u32),
    AutoPlay {
        enabled: bool,
        speed_ms: Option<u64>,
    },
    Show,
    State,
    Help,
    Quit,
}

/// Raw product form fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub codigo: String,
    pub nombre: String,
    pub descripcion: String,
    pub cantidad: String,
    pub imagen: Option<String>,
}

impl ProductForm {
    /// Check the fields and build the engine input.
    pub fn validate(&self) -> Result<ProductInput> {
        let codigo_raw = self.codigo.trim();
        let nombre = self.nombre.trim();
        let cantidad_raw = self.cantidad.trim();

        if codigo_raw.is_empty() || nombre.is_empty() || cantidad_raw.is_empty() {
            return Err(AppError::invalid("please fill in all required fields"));
        }

        let codigo = match codigo_raw.parse::<Codigo>() {
            Ok(c) if c > 0 => c,
            _ => return Err(AppError::invalid("codigo must be a positive number")),
        };

        let cantidad = cantidad_raw
            .parse()
            .map_err(|_| AppError::invalid("cantidad must be a non-negative number"))?;

        let mut input =
            ProductInput::new(codigo, nombre, cantidad).with_descripcion(self.descripcion.trim());

        if let Some(imagen) = self.imagen.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            validate_image(imagen)?;
            input = input.with_imagen(imagen);
        }

        Ok(input)
    }
}

fn validate_image(imagen: &str) -> Result<()> {
    if imagen.len() > MAX_IMAGE_BYTES {
        return Err(AppError::invalid("image must not exceed 5MB"));
    }

    let lower = imagen.to_ascii_lowercase();
    let is_image = lower.starts_with("data:image/")
        || IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext));
    if !is_image {
        return Err(AppError::invalid("please choose a valid image file"));
    }
    Ok(())
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "add" => ConsoleCommand::Add(parse_add(rest).validate()?),
        "delete" | "del" | "rm" => {
            let codigo = rest
                .parse()
                .map_err(|_| AppError::invalid(format!("'{rest}' is not a codigo")))?;
            ConsoleCommand::Delete(codigo)
        }
        "search" => ConsoleCommand::Search(rest.to_string()),
        "sort" => parse_sort(rest)?,
        "list" | "ls" => ConsoleCommand::List,
        "next" => ConsoleCommand::Next,
        "prev" => ConsoleCommand::Prev,
        "key" => {
            if rest.is_empty() {
                return Err(AppError::invalid("usage: key <name>"));
            }
            ConsoleCommand::Key(rest.to_string())
        }
        "drag" => {
            let points = rest
                .split_whitespace()
                .map(|p| {
                    p.parse::<f64>()
                        .ok()
                        .filter(|x| x.is_finite())
                        .ok_or_else(|| AppError::invalid(format!("'{p}' is not a position")))
                })
                .collect::<Result<Vec<_>>>()?;
            if points.is_empty() {
                return Err(AppError::invalid("usage: drag <x> <x>..."));
            }
            ConsoleCommand::Drag(points)
        }
        "viewport" => {
            let width = rest
                .parse()
                .map_err(|_| AppError::invalid(format!("'{rest}' is not a width")))?;
            ConsoleCommand::Viewport(width)
        }
        "autoplay" => parse_autoplay(rest)?,
        "show" => ConsoleCommand::Show,
        "state" => ConsoleCommand::State,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => {
            return Err(AppError::invalid(format!(
                "unknown command '{other}', try 'help'"
            )))
        }
    };

    Ok(Some(command))
}

fn parse_add(rest: &str) -> ProductForm {
    let mut head = rest.splitn(3, char::is_whitespace);
    let codigo = head.next().unwrap_or_default().to_string();
    let cantidad = head.next().unwrap_or_default().to_string();
    let tail = head.next().unwrap_or_default();

    let mut parts = tail.splitn(3, '|');
    let nombre = parts.next().unwrap_or_default().to_string();
    let descripcion = parts.next().unwrap_or_default().to_string();
    let imagen = parts.next().map(str::to_string);

    ProductForm {
        codigo,
        nombre,
        descripcion,
        cantidad,
        imagen,
    }
}

fn parse_sort(rest: &str) -> Result<ConsoleCommand> {
    let mut words = rest.split_whitespace();
    let field_name = words
        .next()
        .ok_or_else(|| AppError::invalid("usage: sort <field> [asc|desc]"))?;
    let field = SortField::parse(field_name)
        .ok_or_else(|| AppError::invalid(format!("unknown sort field '{field_name}'")))?;

    let direction = match words.next() {
        Some(dir) => Some(
            SortDirection::parse(dir)
                .ok_or_else(|| AppError::invalid(format!("unknown direction '{dir}'")))?,
        ),
        None => None,
    };

    Ok(ConsoleCommand::Sort { field, direction })
}

fn parse_autoplay(rest: &str) -> Result<ConsoleCommand> {
    let mut words = rest.split_whitespace();
    let enabled = match words.next() {
        Some("on") => true,
        Some("off") => false,
        _ => return Err(AppError::invalid("usage: autoplay on|off [ms]")),
    };

    let speed_ms = match words.next() {
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Some(ms),
            _ => return Err(AppError::invalid(format!("'{raw}' is not an interval"))),
        },
        None => None,
    };

    Ok(ConsoleCommand::AutoPlay { enabled, speed_ms })
}
