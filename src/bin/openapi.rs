use anyhow::Result;

fn main() -> Result<()> {
    let spec = authgate::api::openapi();
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}
