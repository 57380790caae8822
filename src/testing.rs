//! Class fixtures shared by the unit tests.

use std::sync::Arc;

use crate::ir::TypeIdentifier;
use crate::reflect::{
    ClassInfo, ClassKind, ClassLookup, ClassTable, FunctionInfo, ParameterInfo, PropertyInfo, ReflectionType,
};

fn property(class: &str, name: &str, ty: Option<ReflectionType>, doc: Option<&str>) -> PropertyInfo {
    PropertyInfo {
        name: name.into(),
        declaring_class: class.into(),
        doc_comment: doc.map(Into::into),
        ty,
    }
}

fn method(
    class: &str,
    name: &str,
    parameters: &[(&str, Option<ReflectionType>)],
    return_type: Option<ReflectionType>,
    doc: Option<&str>,
) -> FunctionInfo {
    FunctionInfo {
        name: name.into(),
        declaring_class: Some(class.into()),
        doc_comment: doc.map(Into::into),
        return_type,
        parameters: parameters
            .iter()
            .map(|(name, ty)| ParameterInfo { name: (*name).into(), ty: ty.clone() })
            .collect(),
    }
}

pub fn fixture_table() -> ClassTable {
    let mut table = ClassTable::with_builtins();

    table.insert(ClassInfo::new("Fixtures\\AbstractDummy", ClassKind::Class));

    let name = "Fixtures\\Dummy";
    let mut dummy = ClassInfo::new(name, ClassKind::Class);
    dummy.parent = Some("Fixtures\\AbstractDummy".into());
    dummy.properties = vec![
        property(name, "id", Some(ReflectionType::builtin("int")), None),
        property(name, "untyped", None, None),
    ];
    dummy.methods = vec![
        method(name, "getId", &[], Some(ReflectionType::builtin("int")), None),
        method(name, "setId", &[("id", Some(ReflectionType::builtin("int")))], Some(ReflectionType::builtin("void")), None),
        method(name, "getSelf", &[], Some(ReflectionType::class("self")), None),
        method(name, "untyped", &[("value", None)], None, None),
    ];
    table.insert(dummy);

    let mut unit = ClassInfo::new("Fixtures\\DummyEnum", ClassKind::Enum);
    unit.interfaces = vec!["UnitEnum".into()];
    table.insert(unit);

    let mut backed = ClassInfo::new("Fixtures\\DummyBackedEnum", ClassKind::Enum);
    backed.interfaces = vec!["BackedEnum".into()];
    backed.backing = Some(TypeIdentifier::String);
    table.insert(backed);

    let mut bag = ClassInfo::new("Fixtures\\DummyCollection", ClassKind::Class);
    bag.interfaces = vec!["IteratorAggregate".into(), "ArrayAccess".into()];
    table.insert(bag);

    let name = "Fixtures\\DummyWithTemplates";
    let mut templated = ClassInfo::new(name, ClassKind::Class);
    templated.doc_comment = Some(
        "/**\n * @template T of int|string\n * @template U\n */".into(),
    );
    templated.properties = vec![property(name, "price", Some(ReflectionType::builtin("int")), Some("/** @var T */"))];
    templated.methods = vec![method(
        name,
        "getPrice",
        &[("inCents", Some(ReflectionType::builtin("bool")))],
        Some(ReflectionType::builtin("int")),
        Some("/**\n * @template T of int|float\n * @template V\n *\n * @return T\n */"),
    )];
    table.insert(templated);

    let mut used = ClassInfo::new("Fixtures\\DummyTrait", ClassKind::Trait);
    used.uses.insert("Collection".into(), "Fixtures\\DummyCollection".into());
    table.insert(used);

    let name = "Fixtures\\DummyWithUses";
    let mut with_uses = ClassInfo::new(name, ClassKind::Class);
    with_uses.uses.insert("Type".into(), "TypeInfo\\Type".into());
    with_uses.uses.insert("DateTime".into(), "\\DateTimeImmutable".into());
    with_uses.traits = vec!["Fixtures\\DummyTrait".into()];
    with_uses.properties = vec![property(name, "createdAt", Some(ReflectionType::class("DateTimeInterface")), None)];
    with_uses.methods = vec![method(
        name,
        "setCreatedAt",
        &[("createdAt", Some(ReflectionType::class("DateTimeInterface")))],
        Some(ReflectionType::builtin("void")),
        Some("/** @param DateTime $createdAt */"),
    )];
    table.insert(with_uses);

    let name = "Fixtures\\DummyWithPhpDoc";
    let mut documented = ClassInfo::new(name, ClassKind::Class);
    documented.properties = vec![property(
        name,
        "arrayOfDummies",
        Some(ReflectionType::builtin("array")),
        Some("/**\n * @var Dummy[]\n */"),
    )];
    documented.methods = vec![method(
        name,
        "getNextDummy",
        &[
            ("dummy", Some(ReflectionType::builtin("mixed"))),
            ("fallback", Some(ReflectionType::builtin("bool"))),
        ],
        Some(ReflectionType::builtin("mixed")),
        Some("/**\n * Returns the next one.\n *\n * @param Dummy $dummy\n *\n * @return Dummy\n */"),
    )];
    table.insert(documented);

    table
}

pub fn fixture_lookup() -> Arc<ClassLookup> {
    Arc::new(ClassLookup::new(Arc::new(fixture_table())))
}
