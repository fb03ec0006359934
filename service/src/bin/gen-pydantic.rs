//! `gen-pydantic` command-line tool
//!
//! Generates Pydantic v2 models from a `LinkML` schema.

use linkml_pydantic::cli::GenPydanticApp;

fn main() -> anyhow::Result<()> {
    let app = GenPydanticApp::from_args();
    app.init_logging();
    app.run()?;
    Ok(())
}
