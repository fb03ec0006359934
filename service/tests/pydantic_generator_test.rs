//! Tests for the Pydantic generator

use linkml_core::types::{SchemaDefinition, SlotDefinition};
use linkml_pydantic::generator::pydantic::hooks::GenerationHooks;
use linkml_pydantic::generator::pydantic::template::ClassResult;
use linkml_pydantic::generator::pydantic::{
    ArrayRepresentation, ExtraFields, MetadataMode, PydanticGenerator, PydanticGeneratorOptions,
};
use linkml_pydantic::generator::{Generator, GeneratorError, GeneratorResult};
use linkml_pydantic::schema_view::SchemaView;
use pretty_assertions::assert_eq;

const LIBRARY: &str = r#"
id: https://example.org/library
name: library
description: Books and shelves
version: "1.2"
default_prefix: library
default_range: string
prefixes:
  library: https://example.org/library/
enums:
  shelf_status:
    permissible_values:
      open: {}
      closed: {}
classes:
  Entity:
    slots: [id]
  Book:
    is_a: Entity
    description: A printed book
    slots: [title, pages, copies, isbn_code]
  Anything:
    class_uri: linkml:Any
  Shelf:
    slots: [label, status, books, extras, settings]
  Setting:
    slots: [key_name, value]
slots:
  id:
    identifier: true
  title:
    required: true
    description: Title of the book
  pages:
    range: integer
    minimum_value: 1
  copies:
    range: integer
    ifabsent: int(1)
  isbn_code:
    pattern: "^[0-9-]+$"
  label: {}
  status:
    range: shelf_status
  books:
    range: Book
    multivalued: true
    inlined_as_list: true
  extras:
    range: Anything
  settings:
    range: Setting
    multivalued: true
    inlined: true
  key_name:
    key: true
  value:
    range: integer
"#;

const CATALOG: &str = r"
id: https://example.org/catalog
name: catalog
default_prefix: catalog
default_range: string
classes:
  Identified:
    mixin: true
  Author:
    mixins: [Identified]
    slots: [orcid]
  Publisher:
    mixins: [Identified]
    slots: [registry_number]
  Citation:
    slots: [source, value]
slots:
  orcid:
    identifier: true
  registry_number:
    identifier: true
    range: integer
  source:
    range: Identified
  value:
    any_of:
      - range: string
      - range: integer
      - range: ncname
";

fn options(metadata_mode: MetadataMode) -> PydanticGeneratorOptions {
    PydanticGeneratorOptions {
        metadata_mode,
        ..PydanticGeneratorOptions::default()
    }
}

fn generate(yaml: &str, options: PydanticGeneratorOptions) -> GeneratorResult<String> {
    let schema = SchemaDefinition::from_yaml(yaml)?;
    PydanticGenerator::new(SchemaView::new(schema), options)?.serialize()
}

#[test]
fn test_field_lines() -> GeneratorResult<()> {
    let code = generate(LIBRARY, options(MetadataMode::None))?;

    assert!(code.contains("class Book(Entity):"));
    assert!(code.contains("    id: str = Field(...)"));
    assert!(code.contains("    title: str = Field(..., description=\"\"\"Title of the book\"\"\")"));
    assert!(code.contains("    pages: Optional[int] = Field(None, ge=1)"));
    assert!(code.contains("    copies: Optional[int] = Field(1)"));
    assert!(code.contains("    status: Optional[ShelfStatus] = Field(None)"));
    assert!(code.contains("    books: Optional[List[Book]] = Field(default_factory=list)"));
    assert!(code.contains(
        "    settings: Optional[Dict[str, Union[int, Setting]]] = Field(default_factory=dict)"
    ));
    assert!(code.contains("@field_validator('isbn_code')"));
    Ok(())
}

#[test]
fn test_mandatory_fields_never_optional() -> GeneratorResult<()> {
    let code = generate(LIBRARY, options(MetadataMode::None))?;
    assert!(!code.contains("id: Optional"));
    assert!(!code.contains("title: Optional"));
    assert!(code.contains("    key_name: str = Field(...)"));
    Ok(())
}

#[test]
fn test_any_class_not_emitted() -> GeneratorResult<()> {
    let code = generate(LIBRARY, options(MetadataMode::None))?;
    assert!(code.contains("    extras: Optional[Any] = Field(None)"));
    assert!(!code.contains("class Anything"));
    assert!(!code.contains("Anything.model_rebuild()"));
    Ok(())
}

#[test]
fn test_parents_before_children() -> GeneratorResult<()> {
    let code = generate(LIBRARY, options(MetadataMode::None))?;
    let entity = code.find("class Entity(ConfiguredBaseModel):");
    let book = code.find("class Book(Entity):");
    assert!(entity.is_some() && book.is_some());
    assert!(entity < book);

    let rebuilds: Vec<&str> = code
        .lines()
        .skip_while(|line| *line != "# Model rebuild")
        .filter(|line| line.ends_with(".model_rebuild()"))
        .collect();
    assert_eq!(
        rebuilds,
        vec![
            "Entity.model_rebuild()",
            "Book.model_rebuild()",
            "Shelf.model_rebuild()",
            "Setting.model_rebuild()",
        ]
    );
    Ok(())
}

#[test]
fn test_enum_rendered_before_classes() -> GeneratorResult<()> {
    let code = generate(LIBRARY, options(MetadataMode::None))?;
    let enum_at = code.find("class ShelfStatus(str, Enum):");
    assert!(enum_at.is_some());
    assert!(enum_at < code.find("class Entity("));
    assert!(code.contains("    open = \"open\""));
    assert!(code.contains("    closed = \"closed\""));
    Ok(())
}

#[test]
fn test_module_header() -> GeneratorResult<()> {
    let code = generate(LIBRARY, options(MetadataMode::None))?;
    assert!(code.starts_with("from __future__ import annotations"));
    assert!(code.contains("version = \"1.2\""));
    assert!(code.contains("class ConfiguredBaseModel(BaseModel):"));
    assert!(code.contains("        extra = \"forbid\","));
    assert!(code.contains("class LinkMLMeta(RootModel):"));
    Ok(())
}

#[test]
fn test_metadata_modes() -> GeneratorResult<()> {
    let none = generate(LIBRARY, options(MetadataMode::None))?;
    assert!(!none.contains("linkml_meta = LinkMLMeta("));
    assert!(!none.contains("json_schema_extra"));

    let auto = generate(LIBRARY, options(MetadataMode::Auto))?;
    assert!(auto.contains("linkml_meta = LinkMLMeta("));
    assert!(auto.contains("linkml_meta: ClassVar[LinkMLMeta] = LinkMLMeta("));
    assert!(auto.contains("json_schema_extra = { \"linkml_meta\": "));

    let full = generate(LIBRARY, options(MetadataMode::Full))?;
    assert!(full.contains("'description': 'A printed book'"));
    Ok(())
}

#[test]
fn test_extra_fields_policy() -> GeneratorResult<()> {
    let code = generate(
        LIBRARY,
        PydanticGeneratorOptions {
            extra_fields: ExtraFields::Allow,
            ..options(MetadataMode::None)
        },
    )?;
    assert!(code.contains("        extra = \"allow\","));
    Ok(())
}

#[test]
fn test_mixin_identifier_union() -> GeneratorResult<()> {
    let code = generate(CATALOG, options(MetadataMode::None))?;
    assert!(code.contains("class Author(Identified):"));
    assert!(code.contains("    source: Optional[Union[int, str]] = Field(None)"));

    let code = generate(
        CATALOG,
        PydanticGeneratorOptions {
            gen_mixin_inheritance: false,
            ..options(MetadataMode::None)
        },
    )?;
    assert!(code.contains("class Author(ConfiguredBaseModel):"));
    assert!(code.contains("    source: Optional[str] = Field(None)"));
    Ok(())
}

#[test]
fn test_mixin_identifiers_of_one_type_collapse() -> GeneratorResult<()> {
    let yaml = r"
id: https://example.org/reviews
name: reviews
default_range: string
classes:
  Identified:
    mixin: true
  Author:
    mixins: [Identified]
    slots: [orcid]
  Reviewer:
    mixins: [Identified]
    slots: [handle]
  Review:
    slots: [src]
slots:
  orcid:
    identifier: true
  handle:
    identifier: true
  src:
    range: Identified
";
    let code = generate(yaml, options(MetadataMode::None))?;
    assert!(code.contains("    src: Optional[str] = Field(None)"));
    assert!(!code.contains("Union[str"));
    Ok(())
}

#[test]
fn test_enum_keywords_and_quoted_description() -> GeneratorResult<()> {
    let yaml = r#"
id: https://example.org/flags
name: flags
default_range: string
enums:
  answer:
    description: Says """maybe"""
    permissible_values:
      None: {}
      class: {}
      maybe: {}
classes:
  Poll:
    attributes:
      answer:
        range: answer
"#;
    let schema = SchemaDefinition::from_yaml(yaml)?;
    let code = PydanticGenerator::new(SchemaView::new(schema), options(MetadataMode::None))?.compile_module()?;
    assert!(code.contains(r#"    None_ = "None""#));
    assert!(code.contains(r#"    class_ = "class""#));
    assert!(code.contains(r#"    maybe = "maybe""#));
    assert!(code.contains(r#"Says \"\"\"maybe\"\"\""#));
    Ok(())
}

/// Marks `Book` as auditable and stamps the module
#[derive(Debug)]
struct AuditHooks;

impl GenerationHooks for AuditHooks {
    fn before_generate_slot(&self, mut slot: SlotDefinition, _view: &SchemaView) -> SlotDefinition {
        if slot.name == "pages" {
            slot.required = Some(true);
        }
        slot
    }

    fn after_generate_class(&self, mut result: ClassResult, _view: &SchemaView) -> ClassResult {
        if result.cls.name == "Book" {
            result.cls.bases.push("Auditable".to_string());
        }
        result
    }

    fn after_render_template(&self, code: String, _view: &SchemaView) -> String {
        format!("# audited\n{code}")
    }
}

#[test]
fn test_hooks_change_rendered_output() -> GeneratorResult<()> {
    let schema = SchemaDefinition::from_yaml(LIBRARY)?;
    let plain = generate(LIBRARY, options(MetadataMode::None))?;
    assert!(plain.contains("class Book(Entity):"));
    assert!(plain.contains("    pages: Optional[int] = Field(None, ge=1)"));

    let generator =
        PydanticGenerator::new(SchemaView::new(schema.clone()), options(MetadataMode::None))?.with_hooks(AuditHooks);
    let code = generator.serialize()?;
    assert!(code.starts_with("# audited\n"));
    assert!(code.contains("class Book(Entity, Auditable):"));
    assert!(code.contains("    pages: int = Field(..., ge=1)"));
    assert!(!code.contains("Shelf(ConfiguredBaseModel, Auditable)"));

    // the trait entry point keeps the hooks
    assert_eq!(generator.generate(&schema)?, code);
    Ok(())
}

#[test]
fn test_any_of_union() -> GeneratorResult<()> {
    let code = generate(CATALOG, options(MetadataMode::None))?;
    assert!(code.contains("    value: Optional[Union[int, str]] = Field(None)"));
    Ok(())
}

#[test]
fn test_array_slot() -> GeneratorResult<()> {
    let yaml = r"
id: https://example.org/img
name: img
default_range: string
classes:
  Image:
    attributes:
      pixels:
        range: integer
        array:
          exact_number_dimensions: 2
";
    let code = generate(yaml, options(MetadataMode::None))?;
    assert!(code.contains("    pixels: Optional[List[List[int]]] = Field(None)"));

    let code = generate(
        yaml,
        PydanticGeneratorOptions {
            array_representations: vec![ArrayRepresentation::Numpydantic],
            ..options(MetadataMode::None)
        },
    )?;
    assert!(code.contains("NDArray[Shape[\"*, *\"], int]"));
    assert!(code.contains("from numpydantic import"));
    Ok(())
}

#[test]
fn test_empty_schema() -> GeneratorResult<()> {
    let code = generate(
        "id: https://example.org/empty\nname: empty\n",
        options(MetadataMode::None),
    )?;
    assert!(code.contains("class ConfiguredBaseModel(BaseModel):"));
    assert!(code.trim_end().ends_with("# see https://pydantic-docs.helpmanual.io/usage/models/#rebuilding-a-model"));
    Ok(())
}

#[test]
fn test_generation_is_deterministic() -> GeneratorResult<()> {
    let first = generate(LIBRARY, PydanticGeneratorOptions::default())?;
    let second = generate(LIBRARY, PydanticGeneratorOptions::default())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_compile_check_passes() -> GeneratorResult<()> {
    let schema = SchemaDefinition::from_yaml(LIBRARY)?;
    let generator = PydanticGenerator::new(SchemaView::new(schema), PydanticGeneratorOptions::default())?;
    assert_eq!(generator.compile_module()?, generator.serialize()?);
    Ok(())
}

#[test]
fn test_undefined_range_is_integrity_error() -> GeneratorResult<()> {
    let schema = SchemaDefinition::from_yaml(
        r"
id: https://example.org/bad
name: bad
classes:
  Thing:
    attributes:
      part:
        range: Missing
",
    )?;
    let result = PydanticGenerator::new(SchemaView::new(schema), PydanticGeneratorOptions::default())
        .and_then(|generator| generator.serialize());
    assert!(matches!(result, Err(GeneratorError::SchemaIntegrity(_))));
    Ok(())
}

#[test]
fn test_template_override() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("class.py.tmpl"),
        "class {{ name }}({{ bases }}):  # generated\n    pass\n",
    )?;

    let code = generate(
        LIBRARY,
        PydanticGeneratorOptions {
            template_dir: Some(dir.path().to_path_buf()),
            ..options(MetadataMode::None)
        },
    )?;
    assert!(code.contains("class Book(Entity):  # generated"));
    assert!(!code.contains("title: str = Field("));
    Ok(())
}

#[test]
fn test_generator_trait_output() -> GeneratorResult<()> {
    let schema = SchemaDefinition::from_yaml(LIBRARY)?;
    let generator = PydanticGenerator::new(SchemaView::new(schema.clone()), PydanticGeneratorOptions::default())?;
    assert_eq!(generator.name(), "pydantic");
    assert_eq!(generator.generate(&schema)?, generator.serialize()?);
    Ok(())
}
