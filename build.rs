use vergen::EmitBuilder;

// Emits VERGEN_* build and git metadata, logged at startup.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder().all_build().all_git().emit()?;

    // Man page and completions are generated by `cargo run -p xtask -- generate-docs`.
    Ok(())
}
