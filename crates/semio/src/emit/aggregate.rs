//! The aggregate struct of an abstraction level.
//!
//! A derived level holds its parent's aggregate as `base` and declares only
//! its own collections. Accessors cover every effective collection,
//! ancestors first; inherited ones go through `base`.

use log::trace;

use semio_core::{naming, resolved::ResolvedLevel};

use super::{EmitError, module_name, writer::CodeWriter};

pub(super) fn emit_aggregate(
    w: &mut CodeWriter,
    level: &ResolvedLevel,
    derives: &str,
) -> Result<(), EmitError> {
    trace!(
        level:% = level.name(),
        collections = level.collections().len();
        "Emitting level aggregate",
    );

    let name = naming::rust_ident(&level.name().to_string());
    let base = level
        .parent()
        .map(|parent| format!("super::{}::{}", module_name(parent), naming::rust_ident(&parent.to_string())));

    w.line(format_args!(
        "/// Object model of the `{}` abstraction level.",
        level.name()
    ))?;
    w.line("///")?;
    w.line("/// Collections are created with the aggregate and never replaced; only")?;
    w.line("/// their contents change.")?;
    if !derives.is_empty() {
        w.line(format_args!("#[derive({derives})]"))?;
    }
    w.open(format_args!("pub struct {name}"))?;
    if let Some(base) = &base {
        w.line(format_args!("base: {base},"))?;
    }
    for collection in level.own_collections() {
        let field = naming::to_snake_case(&collection.name().to_string());
        let element = naming::rust_ident(&collection.object().name().to_string());
        w.line(format_args!("{field}: Vec<{element}>,"))?;
    }
    w.close()?;
    w.blank()?;

    w.open(format_args!("impl {name}"))?;
    w.open("pub fn new() -> Self")?;
    w.open("Self")?;
    if let Some(base) = &base {
        w.line(format_args!("base: {base}::new(),"))?;
    }
    for collection in level.own_collections() {
        let field = naming::to_snake_case(&collection.name().to_string());
        w.line(format_args!("{field}: Vec::new(),"))?;
    }
    w.close()?;
    w.close()?;

    if let Some(base) = &base {
        w.blank()?;
        w.open(format_args!("pub fn base(&self) -> &{base}"))?;
        w.line("&self.base")?;
        w.close()?;
        w.blank()?;
        w.open(format_args!("pub fn base_mut(&mut self) -> &mut {base}"))?;
        w.line("&mut self.base")?;
        w.close()?;
    }

    for collection in level.collections() {
        let accessor = naming::to_snake_case(&collection.name().to_string());
        let element = naming::rust_ident(&collection.object().name().to_string());
        let (get, get_mut) = if collection.declared_in() == level.name() {
            (format!("&self.{accessor}"), format!("&mut self.{accessor}"))
        } else {
            (
                format!("self.base.{accessor}()"),
                format!("self.base.{accessor}_mut()"),
            )
        };

        w.blank()?;
        w.open(format_args!("pub fn {accessor}(&self) -> &[{element}]"))?;
        w.line(get)?;
        w.close()?;
        w.blank()?;
        w.open(format_args!("pub fn {accessor}_mut(&mut self) -> &mut Vec<{element}>"))?;
        w.line(get_mut)?;
        w.close()?;
    }
    w.close()?;

    Ok(())
}
