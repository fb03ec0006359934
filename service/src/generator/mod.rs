//! Code generators for `LinkML` schemas
//!
//! [`pydantic::PydanticGenerator`] produces Pydantic v2 models. The shared
//! [`traits::Generator`] and [`traits::CodeFormatter`] traits and the Python
//! string helpers in [`base`] are what a further target would plug into.

pub mod base;
pub mod pydantic;
pub mod traits;

pub use base::{BaseCodeFormatter, PythonFormatter};
pub use pydantic::{PydanticGenerator, PydanticGeneratorOptions};
pub use traits::{CodeFormatter, Generator, GeneratorError, GeneratorResult, IndentStyle};
