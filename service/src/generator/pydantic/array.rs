//! Array-shaped slots
//!
//! A slot with an `array` expression holds an n-dimensional array. Each
//! [`ArrayRepresentation`] renders the shape as a different Python type.

use clap::ValueEnum;
use linkml_core::types::{ArrayExpression, DimensionExpression, MaximumDimensions};
use serde::{Deserialize, Serialize};

use super::template::{Import, Imports, PydanticAttribute, SlotResult};
use crate::generator::traits::{GeneratorError, GeneratorResult};

/// Python representation of an array slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArrayRepresentation {
    /// Nested `List[...]` types
    List,
    /// `numpydantic` `NDArray` with a shape specification
    Numpydantic,
}

impl ArrayRepresentation {
    /// The range generator for this representation
    #[must_use]
    pub fn generator(self) -> &'static dyn ArrayRangeGenerator {
        match self {
            Self::List => &ListOfListsArray,
            Self::Numpydantic => &NumpydanticArray,
        }
    }
}

/// Builds the field type for an array slot
pub trait ArrayRangeGenerator {
    /// The representation this generator produces
    fn representation(&self) -> ArrayRepresentation;

    /// Field type for `array` with element type `dtype`, plus the imports
    /// and injected classes it needs
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::SchemaIntegrity`] when the dimension bounds
    /// contradict each other.
    fn make(&self, array: &ArrayExpression, dtype: &str) -> GeneratorResult<SlotResult>;
}

/// Resolved dimensionality of an array expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimensionality {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

fn dimensionality(array: &ArrayExpression) -> GeneratorResult<Dimensionality> {
    let declared = array.dimensions.len();
    if let Some(exact) = array.exact_number_dimensions {
        return Ok(Dimensionality::Exact(exact as usize));
    }

    let min = array
        .minimum_number_dimensions
        .map_or(declared, |m| (m as usize).max(declared));
    match array.maximum_number_dimensions {
        Some(MaximumDimensions::Bounded(max)) => {
            let max = max as usize;
            if max < min {
                return Err(GeneratorError::integrity(format!(
                    "array has maximum_number_dimensions {max} below its minimum of {min}"
                )));
            }
            if max == min {
                Ok(Dimensionality::Exact(max))
            } else {
                Ok(Dimensionality::Range(min.max(1), max))
            }
        }
        Some(MaximumDimensions::Unbounded(_)) => Ok(Dimensionality::AtLeast(min)),
        None if array.minimum_number_dimensions.is_none() && declared > 0 => {
            Ok(Dimensionality::Exact(declared))
        }
        None => Ok(Dimensionality::AtLeast(min)),
    }
}

fn union(types: Vec<String>) -> String {
    if types.len() == 1 {
        types.into_iter().next().unwrap_or_default()
    } else {
        format!("Union[{}]", types.join(", "))
    }
}

fn result(range: String, imports: Imports, injected: Vec<String>) -> SlotResult {
    SlotResult {
        attribute: PydanticAttribute {
            range: Some(range),
            ..PydanticAttribute::default()
        },
        imports: (!imports.is_empty()).then_some(imports),
        injected_classes: (!injected.is_empty()).then_some(injected),
    }
}

/// Generic recursive list alias used for arrays of unbounded depth
pub const ANY_SHAPE_ARRAY: &str = r#"_T = TypeVar("_T")

AnyShapeArray = TypeAliasType(
    "AnyShapeArray", List[Union[_T, "AnyShapeArray[_T]"]], type_params=(_T,)
)
"#;

/// Arrays as nested Python lists
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOfListsArray;

impl ListOfListsArray {
    fn nested(depth: usize, dimensions: &[DimensionExpression], dtype: &str, imports: &mut Imports) -> String {
        let mut inner = dtype.to_string();
        for i in (0..depth).rev() {
            let (min, max) = dimensions.get(i).map_or((None, None), |d| {
                (
                    d.exact_cardinality.or(d.minimum_cardinality),
                    d.exact_cardinality.or(d.maximum_cardinality),
                )
            });
            inner = if min.is_none() && max.is_none() {
                format!("List[{inner}]")
            } else {
                imports.push(Import::from_objects("pydantic", &["conlist"]));
                let mut args = vec![inner];
                if let Some(min) = min {
                    args.push(format!("min_length={min}"));
                }
                if let Some(max) = max {
                    args.push(format!("max_length={max}"));
                }
                format!("conlist({})", args.join(", "))
            };
        }
        inner
    }
}

impl ArrayRangeGenerator for ListOfListsArray {
    fn representation(&self) -> ArrayRepresentation {
        ArrayRepresentation::List
    }

    fn make(&self, array: &ArrayExpression, dtype: &str) -> GeneratorResult<SlotResult> {
        let mut imports = Imports::new();
        let mut injected = Vec::new();

        let range = match dimensionality(array)? {
            Dimensionality::Exact(n) => Self::nested(n, &array.dimensions, dtype, &mut imports),
            Dimensionality::Range(min, max) => union(
                (min..=max)
                    .map(|n| Self::nested(n, &array.dimensions, dtype, &mut imports))
                    .collect(),
            ),
            Dimensionality::AtLeast(min) => {
                imports.push(Import::from_objects("typing", &["TypeVar"]));
                imports.push(Import::from_objects("typing_extensions", &["TypeAliasType"]));
                injected.push(ANY_SHAPE_ARRAY.to_string());
                let any_shape = format!("AnyShapeArray[{dtype}]");
                let fixed = min.saturating_sub(1);
                let mut range = any_shape;
                for _ in 0..fixed {
                    range = format!("List[{range}]");
                }
                range
            }
        };

        Ok(result(range, imports, injected))
    }
}

/// Arrays as `numpydantic.NDArray` with a `Shape` specification
#[derive(Debug, Clone, Copy, Default)]
pub struct NumpydanticArray;

impl NumpydanticArray {
    fn shape(depth: usize, dimensions: &[DimensionExpression]) -> String {
        let parts: Vec<String> = (0..depth)
            .map(|i| {
                let dim = dimensions.get(i);
                let size = dim
                    .and_then(|d| d.exact_cardinality)
                    .map_or_else(|| "*".to_string(), |n| n.to_string());
                match dim.and_then(|d| d.alias.as_deref()) {
                    Some(alias) => format!("{size} {alias}"),
                    None => size,
                }
            })
            .collect();
        format!("Shape[\"{}\"]", parts.join(", "))
    }
}

impl ArrayRangeGenerator for NumpydanticArray {
    fn representation(&self) -> ArrayRepresentation {
        ArrayRepresentation::Numpydantic
    }

    fn make(&self, array: &ArrayExpression, dtype: &str) -> GeneratorResult<SlotResult> {
        let imports = Imports::new() + Import::from_objects("numpydantic", &["NDArray", "Shape"]);

        let range = match dimensionality(array)? {
            Dimensionality::Exact(n) => {
                format!("NDArray[{}, {dtype}]", Self::shape(n, &array.dimensions))
            }
            Dimensionality::Range(min, max) => union(
                (min..=max)
                    .map(|n| format!("NDArray[{}, {dtype}]", Self::shape(n, &array.dimensions)))
                    .collect(),
            ),
            Dimensionality::AtLeast(_) => format!("NDArray[Shape[\"*, ...\"], {dtype}]"),
        };

        Ok(result(range, imports, Vec::new()))
    }
}
