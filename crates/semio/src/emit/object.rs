//! Object types become structs with one private `Option` field per effective
//! property and a getter/setter pair for each.

use log::trace;

use semio_core::{naming, resolved::ResolvedObjectType, schema::TypeRef};

use super::{EmitError, writer::CodeWriter};

/// How a property is stored and handed out.
enum Storage {
    /// Primitive values, borrowed out.
    Value(String),
    /// Parameter types are `Copy` and returned by value.
    Parameter(String),
    /// Singular relation to another object, boxed.
    Relation(String),
}

impl Storage {
    fn of(ty: TypeRef) -> Result<Self, EmitError> {
        let name = naming::rust_ident(&ty.name().to_string());
        match ty {
            TypeRef::Primitive(_) => Ok(Storage::Value(name)),
            TypeRef::Parameter(_) => Ok(Storage::Parameter(name)),
            TypeRef::Object(_) => Ok(Storage::Relation(name)),
            TypeRef::Unresolved(name) => Err(EmitError::Internal(format!(
                "property type `{name}` reached the emitter unresolved"
            ))),
        }
    }

    fn field_type(&self) -> String {
        match self {
            Storage::Value(ty) | Storage::Parameter(ty) => format!("Option<{ty}>"),
            Storage::Relation(ty) => format!("Option<Box<{ty}>>"),
        }
    }
}

pub(super) fn emit_object(
    w: &mut CodeWriter,
    object: &ResolvedObjectType,
    derives: &str,
) -> Result<(), EmitError> {
    trace!(object:% = object.path(), properties = object.properties().len(); "Emitting object type");

    let name = naming::rust_ident(&object.name().to_string());
    let fields = object
        .properties()
        .iter()
        .map(|property| {
            let field = naming::rust_ident(&naming::to_snake_case(&property.name().to_string()));
            Ok((property, field, Storage::of(property.ty())?))
        })
        .collect::<Result<Vec<_>, EmitError>>()?;

    w.doc(object.description())?;
    if let Some(parent) = object.parent() {
        if object.description().is_some() {
            w.line("///")?;
        }
        w.line(format_args!("/// Specializes `{parent}`."))?;
    }
    if !derives.is_empty() {
        w.line(format_args!("#[derive({derives})]"))?;
    }
    if fields.is_empty() {
        w.line(format_args!("pub struct {name} {{}}"))?;
    } else {
        w.open(format_args!("pub struct {name}"))?;
        for (_, field, storage) in &fields {
            w.line(format_args!("{field}: {},", storage.field_type()))?;
        }
        w.close()?;
    }
    w.blank()?;

    w.open(format_args!("impl {name}"))?;
    w.open("pub fn new() -> Self")?;
    if fields.is_empty() {
        w.line("Self {}")?;
    } else {
        w.open("Self")?;
        for (_, field, _) in &fields {
            w.line(format_args!("{field}: None,"))?;
        }
        w.close()?;
    }
    w.close()?;

    for (property, field, storage) in &fields {
        let setter = format!("set_{}", naming::to_snake_case(&property.name().to_string()));
        w.blank()?;
        w.doc(property.description())?;
        match storage {
            Storage::Value(ty) => {
                w.open(format_args!("pub fn {field}(&self) -> Option<&{ty}>"))?;
                w.line(format_args!("self.{field}.as_ref()"))?;
                w.close()?;
                w.blank()?;
                w.open(format_args!("pub fn {setter}(&mut self, value: Option<{ty}>)"))?;
                w.line(format_args!("self.{field} = value;"))?;
                w.close()?;
            }
            Storage::Parameter(ty) => {
                w.open(format_args!("pub fn {field}(&self) -> Option<{ty}>"))?;
                w.line(format_args!("self.{field}"))?;
                w.close()?;
                w.blank()?;
                w.open(format_args!("pub fn {setter}(&mut self, value: Option<{ty}>)"))?;
                w.line(format_args!("self.{field} = value;"))?;
                w.close()?;
            }
            Storage::Relation(ty) => {
                w.open(format_args!("pub fn {field}(&self) -> Option<&{ty}>"))?;
                w.line(format_args!("self.{field}.as_deref()"))?;
                w.close()?;
                w.blank()?;
                w.open(format_args!("pub fn {setter}(&mut self, value: Option<{ty}>)"))?;
                w.line(format_args!("self.{field} = value.map(Box::new);"))?;
                w.close()?;
            }
        }
    }
    w.close()?;

    Ok(())
}
