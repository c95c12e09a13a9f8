//! Parameter types: enumerations become `#[repr(u32)]` enums, flag sets a
//! `u32` newtype with one constant per member.

use log::trace;

use semio_core::{
    naming,
    schema::{ParameterKind, ParameterType, TypePath},
};

use super::{EmitError, writer::CodeWriter};

pub(super) fn emit_parameter(
    w: &mut CodeWriter,
    path: TypePath,
    param: &ParameterType,
) -> Result<(), EmitError> {
    trace!(parameter:% = path, kind:% = param.kind; "Emitting parameter type");

    match param.kind {
        ParameterKind::Enumeration => emit_enumeration(w, path, param),
        ParameterKind::FlagSet => emit_flag_set(w, path, param),
    }
}

fn emit_enumeration(w: &mut CodeWriter, path: TypePath, param: &ParameterType) -> Result<(), EmitError> {
    let name = naming::rust_ident(&path.name().to_string());
    if param.members.is_empty() {
        return Err(EmitError::Internal(format!("enumeration `{path}` has no member")));
    }

    w.doc(param.description.as_deref())?;
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]")?;
    w.line("#[repr(u32)]")?;
    w.open(format_args!("pub enum {name}"))?;
    for (i, member) in param.members.iter().enumerate() {
        w.doc(member.description.as_deref())?;
        if i == 0 {
            w.line("#[default]")?;
        }
        let variant = naming::rust_ident(&member.name.to_string());
        w.line(format_args!("{variant} = {},", member.value))?;
    }
    w.close()?;
    w.blank()?;

    let variants: Vec<String> = param
        .members
        .iter()
        .map(|member| format!("Self::{}", naming::rust_ident(&member.name.to_string())))
        .collect();

    w.open(format_args!("impl {name}"))?;
    w.line("/// Every member, in declaration order.")?;
    w.line(format_args!(
        "pub const ALL: [Self; {}] = [{}];",
        variants.len(),
        variants.join(", ")
    ))?;
    w.blank()?;
    w.open("pub const fn value(self) -> u32")?;
    w.line("self as u32")?;
    w.close()?;
    w.close()?;

    Ok(())
}

fn emit_flag_set(w: &mut CodeWriter, path: TypePath, param: &ParameterType) -> Result<(), EmitError> {
    let name = naming::rust_ident(&path.name().to_string());

    let mut all = 0u32;
    for member in &param.members {
        if !member.value.is_power_of_two() || all & member.value != 0 {
            return Err(EmitError::Internal(format!(
                "flag `{path}::{}` with value {} overlaps another member",
                member.name, member.value
            )));
        }
        all |= member.value;
    }

    w.doc(param.description.as_deref())?;
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]")?;
    w.line(format_args!("pub struct {name}(u32);"))?;
    w.blank()?;

    w.open(format_args!("impl {name}"))?;
    for member in &param.members {
        w.doc(member.description.as_deref())?;
        let constant = naming::to_screaming_snake_case(&member.name.to_string());
        w.line(format_args!("pub const {constant}: Self = Self({});", member.value))?;
    }
    w.blank()?;
    w.open("pub const fn empty() -> Self")?;
    w.line("Self(0)")?;
    w.close()?;
    w.blank()?;
    w.open("pub const fn all() -> Self")?;
    w.line(format_args!("Self({all})"))?;
    w.close()?;
    w.blank()?;
    w.open("pub const fn bits(self) -> u32")?;
    w.line("self.0")?;
    w.close()?;
    w.blank()?;
    w.open("pub const fn contains(self, other: Self) -> bool")?;
    w.line("self.0 & other.0 == other.0")?;
    w.close()?;
    w.blank()?;
    w.open("pub const fn is_empty(self) -> bool")?;
    w.line("self.0 == 0")?;
    w.close()?;
    w.close()?;
    w.blank()?;

    w.open(format_args!("impl std::ops::BitOr for {name}"))?;
    w.line("type Output = Self;")?;
    w.blank()?;
    w.open("fn bitor(self, rhs: Self) -> Self")?;
    w.line("Self(self.0 | rhs.0)")?;
    w.close()?;
    w.close()?;
    w.blank()?;

    w.open(format_args!("impl std::ops::BitOrAssign for {name}"))?;
    w.open("fn bitor_assign(&mut self, rhs: Self)")?;
    w.line("self.0 |= rhs.0;")?;
    w.close()?;
    w.close()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use semio_core::{identifier::Id, schema::Member, span::{Span, Spanned}};

    use super::*;

    fn parameter(kind: ParameterKind, members: &[(&str, u32)]) -> ParameterType {
        ParameterType {
            name: Spanned::new(Id::new("Panels"), Span::default()),
            kind,
            description: Some("Panel placement".to_string()),
            members: members
                .iter()
                .map(|(name, value)| Member {
                    name: Spanned::new(Id::new(name), Span::default()),
                    value: *value,
                    description: None,
                })
                .collect(),
            span: Span::default(),
        }
    }

    fn render(param: &ParameterType) -> Result<String, EmitError> {
        let mut w = CodeWriter::new();
        let path = TypePath::new(Id::new("Site"), param.name.get());
        emit_parameter(&mut w, path, param)?;
        Ok(w.finish())
    }

    #[test]
    fn test_enumeration() {
        let out = render(&parameter(ParameterKind::Enumeration, &[("Rooftop", 0), ("Facade", 1)])).unwrap();
        assert!(out.starts_with("/// Panel placement\n"));
        assert!(out.contains("#[repr(u32)]\npub enum Panels {\n    #[default]\n    Rooftop = 0,\n    Facade = 1,\n}"));
        assert!(out.contains("pub const ALL: [Self; 2] = [Self::Rooftop, Self::Facade];"));
    }

    #[test]
    fn test_flag_set() {
        let out = render(&parameter(ParameterKind::FlagSet, &[("Rooftop", 1), ("SideFacade", 4)])).unwrap();
        assert!(out.contains("pub struct Panels(u32);"));
        assert!(out.contains("pub const ROOFTOP: Self = Self(1);"));
        assert!(out.contains("pub const SIDE_FACADE: Self = Self(4);"));
        assert!(out.contains("pub const fn all() -> Self {\n        Self(5)\n    }"));
        assert!(out.contains("impl std::ops::BitOrAssign for Panels {"));
    }

    #[test]
    fn test_overlapping_flags_are_internal_errors() {
        let err = render(&parameter(ParameterKind::FlagSet, &[("A", 1), ("B", 1)])).unwrap_err();
        assert!(matches!(err, EmitError::Internal(_)));
        assert!(err.to_string().contains("Site::Panels::B"));
    }
}
